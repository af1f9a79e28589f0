use std::time::Duration;

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// In-flight requests get this long after SIGTERM. SIGINT stops at once.
const SIGTERM_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// The signal listener task plus both ends of the shutdown channel.
pub struct SignalWatch {
    pub task: JoinHandle<()>,
    pub tx: watch::Sender<()>,
    pub rx: watch::Receiver<()>,
}

/// Listen for SIGINT and SIGTERM in the background and fire the returned
/// channel when either arrives.
pub fn watch_signals() -> std::io::Result<SignalWatch> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    let (tx, rx) = watch::channel(());
    let notify = tx.clone();

    let task = tokio::spawn(async move {
        let received = tokio::select! {
            _ = sigint.recv() => "SIGINT",
            _ = sigterm.recv() => {
                tracing::info!(
                    grace_secs = SIGTERM_GRACE_PERIOD.as_secs(),
                    "SIGTERM received, draining requests"
                );
                tokio::time::sleep(SIGTERM_GRACE_PERIOD).await;
                "SIGTERM"
            }
        };
        tracing::info!(signal = received, "shutting down");
        let _ = notify.send(());
    });

    Ok(SignalWatch { task, tx, rx })
}

/// Route panics through `tracing` so they land in the log files too.
pub fn register_panic_logger() {
    std::panic::set_hook(Box::new(|info| {
        let location = info.location();
        tracing::error!(
            message = %info,
            panic.file = location.map(|l| l.file()),
            panic.line = location.map(|l| l.line()),
            "panic"
        );
    }));
}

pub fn report_build_info() {
    let build = crate::version::build_info();
    tracing::info!(
        version = build.version,
        repo_version = build.repo_version,
        profile = build.build_profile,
        features = build.build_features,
        "sharebox daemon starting"
    );
}
