pub mod page_url;
pub mod time_window;

pub use page_url::{normalize_page_url, page_url_hash};
pub use time_window::{
    TimeWindow, clamp_window, day_diff, days_ago, parse_date_lenient, parse_datetime_lenient,
    start_of_day, start_of_next_day, whole_days_between,
};
