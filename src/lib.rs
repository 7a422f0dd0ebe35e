pub mod channels;    // Inter-component communication channels
pub mod config;      // Configuration management
pub mod coordinator; // Command orchestration and publication
pub mod influx;      // InfluxDB integration
pub mod inverter;    // Serial-over-TCP transport to the inverter
pub mod mqtt;        // MQTT client and messaging
pub mod options;     // Command line options parsing
pub mod pi30;        // PI30 protocol implementation
pub mod prelude;     // Common imports and types
pub mod scheduler;   // Periodic status polling

const CARGO_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

use crate::prelude::*;
use std::error::Error;
use std::sync::{Arc, Mutex};

use crate::coordinator::ReadingStats;

/// Holds all major components of the application and coordinates their
/// shutdown order.
#[derive(Clone)]
pub struct Components {
    pub coordinator: Arc<Coordinator>,
    pub scheduler: Arc<Scheduler>,
    pub mqtt: Option<Arc<Mqtt>>,
    pub influx: Option<Arc<Influx>>,
    pub inverters: Vec<Arc<Inverter>>,
    pub channels: Channels,
}

impl Components {
    /// Gracefully stops all components: coordinator first so no new
    /// commands are processed, then the sinks, then the transports.
    pub async fn stop(&mut self) {
        info!("Stopping all components...");

        self.coordinator.stop();

        if let Some(influx) = &self.influx {
            influx.stop();
        }
        if let Some(mqtt) = &self.mqtt {
            let _ = mqtt.stop().await;
        }
        for inverter in &self.inverters {
            inverter.stop();
        }

        info!("Shutdown complete");
    }
}

fn init_logging(loglevel: &str) {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(loglevel))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.level(),
                record.module_path().unwrap_or(""),
                record.args()
            )
        })
        .write_style(env_logger::WriteStyle::Never)
        .try_init();
}

/// Main application entry point: starts every component in dependency
/// order, then waits for the shutdown signal.
pub async fn app(
    mut shutdown_rx: tokio::sync::broadcast::Receiver<()>,
    config: Arc<ConfigWrapper>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    init_logging(&config.loglevel());

    info!("pi30-bridge {} starting", CARGO_PKG_VERSION);

    let channels = Channels::new();

    info!("  Creating Coordinator...");
    let coordinator = Coordinator::new((*config).clone(), channels.clone())?;
    let coordinator_clone = coordinator.clone();
    let coordinator_handle = tokio::spawn(async move {
        if let Err(e) = coordinator_clone.start().await {
            error!("Coordinator task failed: {}", e);
        }
    });

    info!("  Creating Scheduler...");
    let scheduler = Arc::new(Scheduler::new((*config).clone(), channels.clone()));
    let scheduler_clone = scheduler.clone();
    let scheduler_handle = tokio::spawn(async move {
        if let Err(e) = scheduler_clone.start().await {
            error!("Scheduler task failed: {}", e);
        }
    });

    info!("  Creating MQTT client...");
    let mqtt = Mqtt::new(
        (*config).clone(),
        channels.clone(),
        coordinator.shared_stats.clone(),
    );
    let mqtt_clone = mqtt.clone();
    let mqtt_handle = tokio::spawn(async move {
        if let Err(e) = mqtt_clone.start().await {
            error!("MQTT task failed: {}", e);
        }
    });

    info!("  Creating InfluxDB client...");
    let influx = Influx::new(
        (*config).clone(),
        channels.clone(),
        coordinator.shared_stats.clone(),
    );
    let influx_clone = influx.clone();
    let influx_handle = tokio::spawn(async move {
        if let Err(e) = influx_clone.start().await {
            error!("InfluxDB task failed: {}", e);
        }
    });

    info!("  Creating Inverter instances...");
    let inverters: Vec<_> = config
        .enabled_inverters()
        .iter()
        .map(|inverter| Arc::new(Inverter::new((*config).clone(), inverter, channels.clone())))
        .collect();
    let mut inverter_handles = Vec::new();
    for inverter in &inverters {
        let inverter_clone = inverter.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = inverter_clone.start().await {
                error!("Inverter task failed: {}", e);
            }
        });
        inverter_handles.push(handle);
    }
    info!("Inverters started successfully");

    info!("Waiting for shutdown signal...");
    let _ = shutdown_rx.recv().await;

    info!("Shutdown signal received, stopping components...");
    let shared_stats = coordinator.shared_stats.clone();
    let mut components = Components {
        coordinator: Arc::new(coordinator),
        scheduler,
        mqtt: Some(Arc::new(mqtt)),
        influx: Some(Arc::new(influx)),
        inverters,
        channels: channels.clone(),
    };
    components.stop().await;

    if let Err(e) = coordinator_handle.await {
        error!("Error waiting for coordinator task: {}", e);
    }
    scheduler_handle.abort();
    if let Err(e) = mqtt_handle.await {
        error!("Error waiting for MQTT task: {}", e);
    }
    if let Err(e) = influx_handle.await {
        error!("Error waiting for InfluxDB task: {}", e);
    }
    for handle in inverter_handles {
        if let Err(e) = handle.await {
            error!("Error waiting for inverter task: {}", e);
        }
    }

    print_final_stats(&shared_stats);

    info!("Application shutdown complete");
    Ok(())
}

fn print_final_stats(stats: &Arc<Mutex<ReadingStats>>) {
    if let Ok(stats) = stats.lock() {
        stats.print_summary();
    }
}

/// Convenience entry point used by the binary: wires the Ctrl+C signal
/// into the shutdown channel and runs the app.
pub async fn run(config: Config) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);
    let config = Arc::new(ConfigWrapper::from_config(config));

    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl+c: {}", e);
        }
        let _ = shutdown_tx_clone.send(());
    });

    app(shutdown_rx, config)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
