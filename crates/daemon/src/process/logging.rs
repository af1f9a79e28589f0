use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const LOG_FILE_NAME: &str = "sharebox.log";

/// Flushes the non-blocking writers when dropped. Hold it for the life of
/// the process.
#[must_use]
pub struct LogGuards(#[allow(dead_code)] Vec<WorkerGuard>);

/// `RUST_LOG` wins, otherwise everything at or above `level`.
fn level_filter(level: tracing::Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
}

/// Install the global subscriber: compact stdout, plus a daily rolling
/// `sharebox.log` under `log_dir` when one is given.
pub fn init(level: tracing::Level, log_dir: Option<&Path>) -> LogGuards {
    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    let mut guards = vec![stdout_guard];

    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(stdout_writer)
        .with_filter(level_filter(level));

    let file_layer = log_dir.and_then(|dir| {
        // logging is not up yet, so this can only go to stderr
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("sharebox: cannot create log directory {}: {}", dir.display(), e);
            return None;
        }
        let (file_writer, file_guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, LOG_FILE_NAME));
        guards.push(file_guard);
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_span_events(FmtSpan::CLOSE)
                .with_filter(level_filter(level)),
        )
    });

    // an `Option<Layer>` is itself a layer, a `None` one is a no-op
    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    LogGuards(guards)
}
