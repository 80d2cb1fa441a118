use clap::Parser;

use gacounter::cli::Cli;
use gacounter::config::{get_config, init_config};
use gacounter::runtime::modes::{self, Mode};
use gacounter::system::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    init_config(cli.config.as_deref());
    let config = get_config();

    match modes::detect_mode(cli.command.as_ref()) {
        #[cfg(feature = "cli")]
        Mode::Cli => {
            let Some(cmd) = cli.command else {
                return Ok(());
            };
            // CLI 模式只输出警告以上的日志，避免干扰命令输出
            let mut logging = config.logging.clone();
            if std::env::var("RUST_LOG").is_err() {
                logging.level = "warn".to_string();
            }
            let _guard = init_logging(&logging);

            if let Err(e) = modes::run_cli(cmd).await {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
            Ok(())
        }
        #[cfg(feature = "server")]
        Mode::Server => {
            let _guard = init_logging(&config.logging);
            modes::run_server().await
        }
        Mode::Unknown => {
            eprintln!("No execution mode available, enable the `server` or `cli` feature");
            std::process::exit(1);
        }
    }
}
