use clap::Parser;

use ctapulse::cli::{Cli, run_cli_command};
use ctapulse::config::StaticConfig;
use ctapulse::system::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = StaticConfig::load(cli.config.as_deref());

    // guard 必须活到进程结束，否则文件日志不会刷盘
    let _log_guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
    };

    if let Err(e) = run_cli_command(cli.command, &config).await {
        eprintln!("{}", e.format_colored());
        std::process::exit(1);
    }

    Ok(())
}
