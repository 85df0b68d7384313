use clap::{Parser, ValueEnum};
use log::{error, info, LevelFilter};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracker_conf::{ResolvedConfiguration, StorageIdRegistry, TrackerState};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Summary,
    Yaml,
    Json,
}

/// Resolve and validate a tracker configuration file
#[derive(Parser, Debug)]
#[command(name = "tracker-conf")]
struct Args {
    /// Tracker config file
    conf_file: PathBuf,

    /// Output format for the resolved settings
    #[arg(short, long, value_enum, default_value_t = Format::Summary)]
    format: Format,

    /// log4rs config file, env_logger is used when it does not exist.
    /// Its root level should stay at trace; the config's log_level filters.
    #[arg(long, default_value = "tracker_log.yaml")]
    log_config: PathBuf,
}

#[derive(Serialize)]
struct Snapshot<'a> {
    config: &'a ResolvedConfiguration,
    storage_ids: &'a StorageIdRegistry,
}

/// Level used until the config file's `log_level` is known
const STARTUP_LEVEL: LevelFilter = LevelFilter::Info;

/// Backends pass every level through; `log::set_max_level` is the only
/// gate, so the resolved `log_level` can raise verbosity as well as lower it.
fn init_logging(log_config: &Path) {
    let initialized = log_config.exists()
        && match log4rs::init_file(log_config, Default::default()) {
            Ok(()) => true,
            Err(e) => {
                eprintln!("log config {} unusable: {}", log_config.display(), e);
                false
            }
        };
    if !initialized {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("trace")).init();
    }
    log::set_max_level(STARTUP_LEVEL);
}

fn render(state: &TrackerState, format: Format) -> Result<String, Box<dyn std::error::Error>> {
    let snapshot = Snapshot {
        config: &state.config,
        storage_ids: &state.storage_ids,
    };
    Ok(match format {
        Format::Summary => {
            let mut out = state.config.summary(state.storage_ids.len());
            for record in state.storage_ids.iter() {
                out.push_str(&format!("\n{}  {}  {}", record.id, record.group_name, record.ip_addr));
            }
            out
        }
        Format::Yaml => serde_yaml::to_string(&snapshot)?,
        Format::Json => serde_json::to_string_pretty(&snapshot)?,
    })
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_config);
    info!("Loading tracker config {}", args.conf_file.display());

    let state = match TrackerState::load(&args.conf_file) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    log::set_max_level(state.config.log_level);

    match render(&state, args.format) {
        Ok(out) => {
            println!("{}", out);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to render resolved config: {}", e);
            ExitCode::FAILURE
        }
    }
}
