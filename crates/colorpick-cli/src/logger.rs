use std::io::Write;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use prettytty::opt::Volume;

/// A logger writing to standard error.
pub struct Logger {
    filter: LevelFilter,
}

impl Logger {
    pub fn new(volume: Volume) -> Self {
        Self {
            filter: level_filter(volume),
        }
    }
}

/// Map the volume to the most detailed enabled level.
pub fn level_filter(volume: Volume) -> LevelFilter {
    match volume {
        Volume::Silent => LevelFilter::Warn,
        Volume::Regular => LevelFilter::Info,
        Volume::Detailed => LevelFilter::Trace,
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.filter
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            // Logging must not fail the program.
            let _ = writeln!(
                std::io::stderr().lock(),
                "{} - {}",
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Install the logger for the given volume.
pub fn init(volume: Volume) -> Result<(), SetLoggerError> {
    let logger = Logger::new(volume);
    let filter = logger.filter;
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(filter);
    Ok(())
}
