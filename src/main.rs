use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use hostsnap::config::{self, load_config, load_config_from_path};
use hostsnap::format::summary_line;
use hostsnap::logging::{LogFormat, init_tracing};
use hostsnap::scheduler::{CycleEvent, Scheduler};
use hostsnap::system::collector::Collector;
use hostsnap::system::host::HostPlatform;
use hostsnap::system::sensors::{SensorsCommand, TemperaturePatterns, TemperatureReader};
use hostsnap::system::snapshot::SystemSnapshot;
use hostsnap::system::store::SnapshotStore;
use tokio::sync::mpsc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
enum Output {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    name = "hostsnap",
    about = "Periodically sample CPU, memory and sensor temperatures"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sampling interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Collect a single snapshot, print it and exit.
    #[arg(long, default_value_t = false)]
    once: bool,

    /// Snapshot output format on stdout.
    #[arg(long, value_enum, default_value_t = Output::Text)]
    output: Output,

    /// Log format on stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.log_format)?;
    let config = load_config_for_cli(&cli);

    let patterns = TemperaturePatterns::from_config(&config.sensors)?;
    let command = SensorsCommand::from_config(&config.sensors)?;
    let collector = Collector::new(
        HostPlatform::new(),
        TemperatureReader::new(command, patterns),
    );

    if cli.once {
        let snapshot = collector.collect(1).await?;
        print_snapshot(&snapshot, cli.output)?;
        return Ok(());
    }

    let interval = config.general.interval();
    tracing::info!(interval_ms = interval.as_millis() as u64, "starting sampler");

    let store = SnapshotStore::new();
    let (tx, mut events) = mpsc::unbounded_channel();
    let handle = Scheduler::new(collector, store.clone(), interval)
        .with_events(tx)
        .spawn();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(CycleEvent::Published { .. }) => {
                        let latest: Arc<SystemSnapshot> = store.latest();
                        print_snapshot(&latest, cli.output)?;
                    }
                    Some(_) => {}
                    None => break,
                }
            }
            result = &mut shutdown => {
                result?;
                tracing::info!("interrupted, shutting down");
                break;
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}

fn load_config_for_cli(cli: &Cli) -> config::Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(interval_ms) = cli.interval_ms {
        config.general.interval_ms = interval_ms;
    }

    config
}

fn print_snapshot(snapshot: &SystemSnapshot, output: Output) -> Result<()> {
    match output {
        Output::Text => println!("{}", summary_line(snapshot)),
        Output::Json => println!("{}", serde_json::to_string(snapshot)?),
    }
    Ok(())
}
