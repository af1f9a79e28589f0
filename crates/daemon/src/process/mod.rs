mod logging;
pub mod utils;

use std::net::SocketAddr;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::http_server;
use crate::service_state::StateSetupError;
use crate::{ServiceConfig, ServiceState};

pub use logging::LogGuards;

/// How long the spawned tasks get to finish once shutdown has begun.
const FINAL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Anything that keeps the service from coming up.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to install signal handlers: {0}")]
    Signals(#[source] std::io::Error),
    #[error("error creating server state: {0}")]
    State(#[from] StateSetupError),
    #[error("invalid API server config: {0}")]
    HttpConfig(#[from] http_server::ConfigError),
}

impl StartupError {
    /// Process exit code for a failed startup.
    pub fn exit_code(&self) -> i32 {
        3
    }
}

/// Handle for gracefully shutting down the daemon service.
pub struct ShutdownHandle {
    signal_task: JoinHandle<()>,
    tasks: Vec<JoinHandle<()>>,
    shutdown_tx: watch::Sender<()>,
}

impl ShutdownHandle {
    /// Wait for a signal or a call to [`ShutdownHandle::shutdown`], then give
    /// the service tasks [`FINAL_SHUTDOWN_TIMEOUT`] to drain.
    ///
    /// Returns `false` when they did not finish in time.
    pub async fn wait(self) -> bool {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        tokio::select! {
            _ = self.signal_task => {}
            _ = shutdown_rx.changed() => {}
        }

        // the signal task may have fired without anyone telling the server
        let _ = self.shutdown_tx.send(());

        match tokio::time::timeout(FINAL_SHUTDOWN_TIMEOUT, join_all(self.tasks)).await {
            Ok(_) => true,
            Err(_) => {
                tracing::error!(
                    timeout_secs = FINAL_SHUTDOWN_TIMEOUT.as_secs(),
                    "service tasks did not shut down in time"
                );
                false
            }
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Build the shared state and start the API server in the background.
///
/// Dropping the returned handle does not stop the service.
pub async fn start_service(
    service_config: &ServiceConfig,
) -> Result<(ServiceState, ShutdownHandle), StartupError> {
    let utils::SignalWatch { task, tx, rx } =
        utils::watch_signals().map_err(StartupError::Signals)?;
    let state = ServiceState::from_config(service_config).await?;

    let api_addr = SocketAddr::from(([0, 0, 0, 0], service_config.api_port));
    let api_config = http_server::Config::new(
        api_addr,
        service_config.public_url.clone(),
        service_config.log_level,
    )?;

    let api_state = state.clone();
    let api_task = tokio::spawn(async move {
        if let Err(e) = http_server::run_api(api_config, api_state, rx).await {
            tracing::error!(error = %e, "API server stopped");
        }
    });

    tracing::info!(
        backend = service_config.store.kind(),
        port = service_config.api_port,
        "sharebox is running"
    );

    let handle = ShutdownHandle {
        signal_task: task,
        tasks: vec![api_task],
        shutdown_tx: tx,
    };
    Ok((state, handle))
}

/// Run the daemon until it is told to stop. Startup failures exit with
/// code 3, a shutdown that overruns its timeout with code 4.
pub async fn spawn_service(service_config: &ServiceConfig) {
    let guards = logging::init(service_config.log_level, service_config.log_dir.as_deref());
    utils::register_panic_logger();
    utils::report_build_info();

    let handle = match start_service(service_config).await {
        Ok((_, handle)) => handle,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            drop(guards);
            std::process::exit(e.exit_code());
        }
    };

    let drained = handle.wait().await;
    drop(guards);
    if !drained {
        std::process::exit(4);
    }
}
