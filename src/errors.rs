use std::fmt;

#[derive(Debug, Clone)]
pub enum CtaError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Validation(String),
    NotFound(String),
    Serialization(String),
    DateParse(String),
    SettingsConflict(String),
    Config(String),
    FileOperation(String),
}

impl CtaError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            CtaError::DatabaseConfig(_) => "E001",
            CtaError::DatabaseConnection(_) => "E002",
            CtaError::DatabaseOperation(_) => "E003",
            CtaError::Validation(_) => "E004",
            CtaError::NotFound(_) => "E005",
            CtaError::Serialization(_) => "E006",
            CtaError::DateParse(_) => "E007",
            CtaError::SettingsConflict(_) => "E008",
            CtaError::Config(_) => "E009",
            CtaError::FileOperation(_) => "E010",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            CtaError::DatabaseConfig(_) => "Database Configuration Error",
            CtaError::DatabaseConnection(_) => "Database Connection Error",
            CtaError::DatabaseOperation(_) => "Database Operation Error",
            CtaError::Validation(_) => "Validation Error",
            CtaError::NotFound(_) => "Resource Not Found",
            CtaError::Serialization(_) => "Serialization Error",
            CtaError::DateParse(_) => "Date Parse Error",
            CtaError::SettingsConflict(_) => "Settings Conflict",
            CtaError::Config(_) => "Configuration Error",
            CtaError::FileOperation(_) => "File Operation Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            CtaError::DatabaseConfig(msg)
            | CtaError::DatabaseConnection(msg)
            | CtaError::DatabaseOperation(msg)
            | CtaError::Validation(msg)
            | CtaError::NotFound(msg)
            | CtaError::Serialization(msg)
            | CtaError::DateParse(msg)
            | CtaError::SettingsConflict(msg)
            | CtaError::Config(msg)
            | CtaError::FileOperation(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于终端）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// Storage failures the caller may want to retry; nothing in this crate retries them.
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            CtaError::DatabaseConnection(_)
                | CtaError::DatabaseOperation(_)
                | CtaError::SettingsConflict(_)
        )
    }
}

impl fmt::Display for CtaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CtaError {}

// 便捷的构造函数
impl CtaError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        CtaError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        CtaError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        CtaError::DatabaseOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        CtaError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        CtaError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        CtaError::Serialization(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        CtaError::DateParse(msg.into())
    }

    pub fn settings_conflict<T: Into<String>>(msg: T) -> Self {
        CtaError::SettingsConflict(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        CtaError::Config(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        CtaError::FileOperation(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for CtaError {
    fn from(err: sea_orm::DbErr) -> Self {
        CtaError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for CtaError {
    fn from(err: std::io::Error) -> Self {
        CtaError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for CtaError {
    fn from(err: serde_json::Error) -> Self {
        CtaError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for CtaError {
    fn from(err: chrono::ParseError) -> Self {
        CtaError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CtaError>;
