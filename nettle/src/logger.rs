use std::io::Write;

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use termcolor::{Color, ColorSpec, WriteColor};

use crate::cli::stderr_buffer_writer;

/// Writes log records to stderr, coloured by level.
struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let color = match record.level() {
            Level::Error => Color::Red,
            Level::Warn => Color::Yellow,
            Level::Info => Color::Green,
            Level::Debug => Color::Blue,
            Level::Trace => Color::Magenta,
        };

        let buffer_writer = stderr_buffer_writer();
        let mut buffer = buffer_writer.buffer();

        // a failed log write has nowhere to be reported
        let _ = buffer.set_color(ColorSpec::new().set_bold(true).set_fg(Some(color)));
        let _ = write!(buffer, "[{:<5}]", record.level());
        let _ = buffer.set_color(&ColorSpec::new());
        let _ = writeln!(buffer, " {}: {}", record.target(), record.args());
        let _ = buffer_writer.print(&buffer);
    }

    fn flush(&self) {}
}

/// `NETTLE_LOG` wins over the `-v` count.
fn level(verbosity: u8) -> LevelFilter {
    if let Some(level) = std::env::var("NETTLE_LOG").ok().and_then(|level| level.parse().ok()) {
        return level;
    }

    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn init(verbosity: u8) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level(verbosity));

    Ok(())
}
