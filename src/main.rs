use std::time::Duration;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use devconsole::cli::{parse_args, run_cli_command};
use devconsole::config::ConsoleConfig;
use devconsole::panels::{self, Applied, PanelRegistry, PanelStore};
use devconsole::websocket::{ConnectionStatus, ConsoleClient, EventEnvelope};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "devconsole=info";
const SUMMARY_INTERVAL: Duration = Duration::from_secs(5);

enum Step {
    Status(ConnectionStatus),
    Envelope(EventEnvelope),
    Summary,
    Stop,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .init();
}

fn toolbar_summary(store: &PanelStore, registry: &PanelRegistry) -> String {
    store
        .toolbar_counts(registry)
        .iter()
        .map(|(id, count)| format!("{}={}", id, count))
        .collect::<Vec<_>>()
        .join(" ")
}

async fn run(config: ConsoleConfig) -> Result<()> {
    let registry = panels::init();
    let mut store = PanelStore::new();

    let mut client = ConsoleClient::spawn(&config);
    let mut status_rx = client.status_receiver();
    let mut errors = client.errors();
    let mut summary = tokio::time::interval(SUMMARY_INTERVAL);
    let mut dirty = false;

    info!(url = %config.ws_url(), "Connecting to debug console");
    client.resync(&registry.ids())?;
    client.connect()?;

    loop {
        let step = tokio::select! {
            changed = status_rx.changed() => match changed {
                Ok(()) => Step::Status(*status_rx.borrow_and_update()),
                Err(_) => Step::Stop,
            },
            envelope = client.recv() => match envelope {
                Some(envelope) => Step::Envelope(envelope),
                None => Step::Stop,
            },
            error = errors.recv() => {
                match error {
                    Ok(error) => warn!(code = error.error_code(), "Transport error: {}", error),
                    Err(RecvError::Lagged(skipped)) => debug!(skipped, "Missed transport errors"),
                    Err(RecvError::Closed) => {}
                }
                continue;
            }
            _ = summary.tick() => Step::Summary,
            _ = tokio::signal::ctrl_c() => Step::Stop,
        };

        match step {
            Step::Status(status) => {
                info!(%status, "Connection status changed");
                match status {
                    ConnectionStatus::Reconnecting => client.resync(&registry.ids())?,
                    ConnectionStatus::Disconnected => {
                        client.join().await;
                        return Err(eyre!(
                            "Gave up after {} reconnect attempts",
                            config.max_reconnect_attempts
                        ));
                    }
                    _ => {}
                }
            }
            Step::Envelope(envelope) => {
                match store.apply(registry, &envelope) {
                    Applied::Updated(panel) => debug!(%panel, "Panel updated"),
                    Applied::Snapshot(panels) => info!(?panels, "Snapshot applied"),
                    Applied::Cleared(panels) => info!(?panels, "Panels cleared"),
                    Applied::Unrouted => {}
                }
                dirty = true;
            }
            Step::Summary => {
                if dirty {
                    info!("{}", toolbar_summary(&store, registry));
                    dirty = false;
                }
            }
            Step::Stop => break,
        }
    }

    client.join().await;
    Ok(())
}

fn main() -> Result<()> {
    let command = parse_args(std::env::args())?;
    let Some(overrides) = run_cli_command(command) else {
        return Ok(());
    };

    color_eyre::install()?;
    init_tracing();

    let config = overrides.apply(ConsoleConfig::from_env()?);
    config.validate()?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(config))
}
