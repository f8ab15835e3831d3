use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::{Mutex, MutexGuard, PoisonError};

static BUFFER: Mutex<Option<Vec<String>>> = Mutex::new(None);

fn buffer() -> MutexGuard<'static, Option<Vec<String>>> {
    BUFFER.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Activate buffering. While active, log records are stored instead of being
/// printed to stderr.
pub fn activate() {
    *buffer() = Some(Vec::new());
}

/// Deactivate buffering and return all collected messages.
pub fn drain() -> Vec<String> {
    buffer().take().unwrap_or_default()
}

/// Write a message. If buffering is active the message is stored;
/// otherwise it is printed to stderr immediately.
pub fn warn(msg: String) {
    let mut guard = buffer();
    if let Some(buf) = guard.as_mut() {
        buf.push(msg);
    } else {
        drop(guard);
        eprintln!("{}", msg);
    }
}

/// `log` backend that routes every record through the buffer.
pub struct BufferedLogger {
    level: LevelFilter,
}

impl BufferedLogger {
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }
}

impl Log for BufferedLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = match record.level() {
            Level::Error => format!("error: {}", record.args()),
            Level::Warn => format!("warning: {}", record.args()),
            _ => format!("{}", record.args()),
        };
        warn(msg);
    }

    fn flush(&self) {}
}

/// Install the buffered logger. `verbose` raises the level from warn to debug.
pub fn init_logger(verbose: bool) -> Result<(), log::SetLoggerError> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    log::set_boxed_logger(Box::new(BufferedLogger::new(level)))?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_collects_while_active() {
        activate();
        warn("first".to_string());
        BufferedLogger::new(LevelFilter::Warn).log(
            &Record::builder()
                .level(Level::Warn)
                .args(format_args!("second"))
                .build(),
        );
        BufferedLogger::new(LevelFilter::Warn).log(
            &Record::builder()
                .level(Level::Debug)
                .args(format_args!("filtered"))
                .build(),
        );

        let messages = drain();
        assert_eq!(messages, vec!["first".to_string(), "warning: second".to_string()]);
        assert!(drain().is_empty());
    }
}
