use anyhow::{Context, Result};
use fish_feeder::config::Config;
use fish_feeder::device::rest::DeviceRest;
use fish_feeder::device::FeederDevice;
use fish_feeder::engine::{Engine, EngineCommand};
use fish_feeder::feeder::controller::FeedController;
use fish_feeder::tui::{self, state::AppState};
use std::fs::File;
use std::path::Path;
use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "config.toml";
const LOG_FILE: &str = "fish-feeder.log";

/// Value following `flag` on the command line, e.g. `--config path.toml`.
fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn open_log_file(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("failed to create log file {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let log_file = open_log_file(Path::new(LOG_FILE))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fish_feeder=info")),
        )
        .with_ansi(false)
        .with_writer(log_file)
        .init();

    let config_path = arg_value(&args, "--config").unwrap_or(DEFAULT_CONFIG);
    let mut config = Config::load_or_default(Path::new(config_path))?;

    // Saved overrides from .env (real env vars take precedence)
    Config::load_env_file();
    config.apply_env_overrides();

    let device = DeviceRest::new(&config.device)?;
    tracing::info!(url = %device.base_url(), "starting");

    // --- Headless one-shot modes ---
    if args.iter().any(|a| a == "--probe") {
        let status = device.probe().await;
        println!("{}: {}", device.base_url(), status.label());
        std::process::exit(if status.is_online() { 0 } else { 1 });
    }

    if args.iter().any(|a| a == "--feed") {
        let mut controller = FeedController::new(&config.feeder);
        let outcome = controller.feed_now(&device).await;
        for entry in controller.history().entries().iter().rev() {
            println!("{}  {}", entry.timestamp, entry.result);
        }
        println!("connection: {}", controller.connection().label());
        let ok = outcome.is_some_and(|o| o.is_success());
        std::process::exit(if ok { 0 } else { 1 });
    }

    // --- Interactive dashboard ---
    let (state_tx, state_rx) = watch::channel(AppState::new());
    let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>(16);

    let engine = Engine::new(device, &config, state_tx);
    let engine_task = tokio::spawn(engine.run(cmd_rx));

    // Blocks until quit
    let result = tui::run_tui(state_rx, cmd_tx).await;

    let _ = engine_task.await;
    tracing::debug!("shutting down");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_arg_value() {
        let a = args(&["fish-feeder", "--config", "alt.toml", "--probe"]);
        assert_eq!(arg_value(&a, "--config"), Some("alt.toml"));
        assert_eq!(arg_value(&a, "--missing"), None);
        let trailing = args(&["fish-feeder", "--config"]);
        assert_eq!(arg_value(&trailing, "--config"), None);
    }

    #[test]
    fn test_log_file_error_names_path() {
        let path = std::env::temp_dir().join("fish-feeder-missing-dir").join("out.log");
        let err = open_log_file(&path).unwrap_err();
        assert!(format!("{err}").contains("fish-feeder-missing-dir"));
    }
}
