//! Stderr logging for the `lanms` binary.
//!
//! Library code only talks to the `log` facade; installing a sink is left to
//! the executable.

use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

struct StderrLogger {
    started: Instant,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!(
                "[{:7.3}s {:>5} {}] {}",
                self.started.elapsed().as_secs_f64(),
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Send `log` records at `level` and above to stderr as
/// `[elapsed LEVEL target] message`.
///
/// The first call installs the logger; later calls only change the level.
/// If another logger is already installed it is left in place.
pub fn init_with_level(level: LevelFilter) {
    let logger = LOGGER.get_or_init(|| StderrLogger {
        started: Instant::now(),
    });
    if log::set_logger(logger).is_err() {
        log::debug!("a logger is already installed; keeping it");
    }
    log::set_max_level(level);
}

/// Map a `-v` count to a level: 0 = warn, 1 = info, 2 = debug, 3+ = trace.
pub fn level_from_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install a `tracing` subscriber on stderr filtered by `RUST_LOG`
/// (default `info`). Span close events carry the pass timings.
#[cfg(feature = "tracing")]
pub fn init_tracing() {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .finish()
        .try_init();
    if installed.is_err() {
        log::debug!("a tracing subscriber is already installed; keeping it");
    }
}
