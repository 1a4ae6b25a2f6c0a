use std::fs::OpenOptions;
use std::path::Path;
use tracing_subscriber::filter::EnvFilter;

/// Installs the global subscriber: `RUST_LOG` or INFO, to stderr or appended
/// to `log_file`.
pub fn init(log_file: Option<&Path>, verbose: bool) {
    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    if let Some(path) = log_file {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(file)
                    .init();
                return;
            }
            Err(err) => {
                eprintln!("Cannot open log file {}: {}", path.display(), err);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
