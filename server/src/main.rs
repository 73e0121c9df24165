//! `mergeflow` binary: loads configuration, starts the scheduler loop and
//! serves the HTTP API until interrupted.

use anyhow::Context;
use mergeflow_server::build::{BuildSettingsStore, JenkinsTrigger};
use mergeflow_server::infrastructure::{
    audit, config::Settings, server, telemetry::TelemetryBuilder,
};
use mergeflow_server::scheduler::SystemClock;
use mergeflow_server::service::{MergeService, ServiceConfig, ServiceDeps};
use mergeflow_server::vcs::GitCli;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal outside local development.
    let _ = dotenvy::dotenv();

    let config = Settings::new().context("Failed to load configuration")?;

    TelemetryBuilder::new("mergeflow", env!("CARGO_PKG_VERSION"))
        .with_log_level(config.telemetry.log_level.clone())
        .with_json(config.telemetry.json)
        .init()
        .context("Failed to initialize telemetry")?;

    info!("Mergeflow starting...");
    audit::log_audit(&audit::AuditEvent::SystemStartup {
        component: "mergeflow".into(),
    });

    let vcs = match GitCli::open(&config.repository.path).await {
        Ok(vcs) => Arc::new(vcs),
        Err(e) => {
            error!(
                error = %e,
                path = %config.repository.path.display(),
                "Cannot open repository"
            );
            return Err(e.into());
        }
    };

    let build_settings = Arc::new(BuildSettingsStore::load(
        config.storage.build_settings_file.clone(),
    ));
    let build = Arc::new(JenkinsTrigger::new(build_settings.clone()));

    let service = MergeService::new(
        ServiceConfig::from_settings(&config),
        ServiceDeps {
            vcs,
            build,
            build_settings,
            clock: Arc::new(SystemClock),
        },
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = service.scheduler_loop(config.scheduler.poll_interval());
    let scheduler_task = tokio::spawn(scheduler.run(shutdown_rx));

    info!(jobs = service.jobs().len(), "Mergeflow initialized");

    let served = server::run_server(&config, service, shutdown_signal()).await;

    info!("Shutdown signal received, cleaning up...");
    let _ = shutdown_tx.send(true);
    if let Err(e) = scheduler_task.await {
        error!(error = %e, "Scheduler task panicked");
    }

    audit::log_audit(&audit::AuditEvent::SystemShutdown {
        reason: if served.is_ok() {
            "Signal received".into()
        } else {
            "Server error".into()
        },
    });

    served.inspect_err(|e| error!(error = ?e, "HTTP server failed"))?;
    info!("Mergeflow shutdown complete.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
