//! Capability Host
//!
//! Reads one JSON invocation per line from stdin, dispatches it to the
//! registered capability and writes one JSON reply per line to stdout.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use app_actions::capabilities::dismiss_alarm::CAPABILITY_NAME as DISMISS_ALARM;
use app_actions::binding::Property;
use app_actions::host::{AlarmClock, ConfigManager};
use app_actions::{CapabilityRegistry, DismissAlarm};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let config_manager = ConfigManager::from_env();
    let config = config_manager.load().await?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting {} (config: {:?})", config.service_name, config_manager.path());

    let registry = Arc::new(CapabilityRegistry::new());
    if config.is_enabled(DISMISS_ALARM) {
        let capability = DismissAlarm::builder()
            .set_alarm_property(Property::new().required(true))
            .set_execution_session(AlarmClock::new(config.active_alarms.clone()))
            .build()
            .context("Failed to build DISMISS_ALARM capability")?;
        registry.register_instance(capability).await?;
    }
    info!("Capabilities: {}", registry.capability_names().await.join(", "));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let reply = registry.handle_line(&line).await;
        stdout.write_all(reply.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    info!("Input closed, shutting down");
    Ok(())
}
