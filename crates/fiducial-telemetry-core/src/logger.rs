//! Process-wide logging setup for the tracking tools.
//!
//! [`init_with_level`] installs a stderr logger whose lines read
//! `[   1.234s DEBUG pattern::matcher] message`: seconds since start, level,
//! and the emitting stage with the `fiducial_telemetry_` crate prefix
//! dropped. With the `tracing` feature, `init_tracing` installs a `tracing`
//! subscriber instead and forwards `log` records into it.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_log::LogTracer;
#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

const CRATE_PREFIX: &str = "fiducial_telemetry_";

/// Module path of a record relative to the workspace crates.
///
/// `fiducial_telemetry_pattern::matcher` becomes `pattern::matcher`; the
/// facade crate reports as `tracker`; foreign targets pass through.
fn stage(target: &str) -> &str {
    if let Some(rest) = target.strip_prefix(CRATE_PREFIX) {
        return rest;
    }
    match target.strip_prefix("fiducial_telemetry") {
        Some("") => "tracker",
        Some(rest) => rest.strip_prefix("::").unwrap_or(rest),
        None => target,
    }
}

fn format_line(
    elapsed: f64,
    level: log::Level,
    target: &str,
    msg: &std::fmt::Arguments,
) -> String {
    format!("[{elapsed:8.3}s {level:>5} {}] {msg}", stage(target))
}

struct StageLogger {
    max: LevelFilter,
    t0: Instant,
}

impl Log for StageLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(
            self.t0.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            record.args(),
        );
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StageLogger> = OnceLock::new();

/// Install the stderr logger at `level`.
///
/// Only the first call installs anything; later calls return `Ok(())`.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = LOGGER.get_or_init(|| StageLogger {
        max: level,
        t0: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// `EnvFilter` directive used when `RUST_LOG` is unset.
#[cfg(any(feature = "tracing", test))]
fn default_directive(level: LevelFilter) -> String {
    level.as_str().to_ascii_lowercase()
}

/// Install a `tracing` subscriber with span close timings.
///
/// `RUST_LOG` wins when set; otherwise events at `default_level` and above
/// are shown. `log` records from the pipeline crates are bridged through
/// [`LogTracer`]. An already installed logger or subscriber is left alone.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool, default_level: LevelFilter) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(default_level)));
    let _ = LogTracer::init();
    let builder = fmt().with_env_filter(filter).with_span_events(FmtSpan::CLOSE);
    if json {
        let subscriber = builder.json().flatten_event(true).finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    } else {
        let subscriber = builder.with_timer(fmt::time::Uptime::default()).finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}
