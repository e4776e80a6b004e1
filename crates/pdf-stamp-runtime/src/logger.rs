use chrono::{DateTime, Local};
use log::{Level, Metadata, Record};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Clone, Debug)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {:<5} {}: {}",
            self.timestamp.format("%H:%M:%S%.3f"),
            self.level,
            self.target,
            self.message
        )
    }
}

/// Bounded in-memory log sink.
///
/// Keeps the diagnostic trail of the pipeline apart from the messages shown
/// to the user, so failures can be inspected after the fact.
#[derive(Clone)]
pub struct DiagnosticLog {
    entries: Arc<Mutex<Vec<LogEntry>>>,
    max_entries: usize,
    max_level: Level,
}

impl DiagnosticLog {
    pub fn new(max_entries: usize, max_level: Level) -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            max_entries,
            max_level,
        }
    }

    /// Install as the global logger
    pub fn init(self) -> Result<(), log::SetLoggerError> {
        let filter = self.max_level.to_level_filter();
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(filter);
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_entries(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    /// Entries at warning level or worse
    pub fn problems(&self) -> Vec<LogEntry> {
        self.lock()
            .iter()
            .filter(|entry| entry.level <= Level::Warn)
            .cloned()
            .collect()
    }

    pub fn latest_message(&self) -> Option<String> {
        self.lock().last().map(|entry| entry.message.clone())
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn push(&self, entry: LogEntry) {
        let mut entries = self.lock();
        entries.push(entry);

        // Keep only the most recent entries
        if entries.len() > self.max_entries {
            let excess = entries.len() - self.max_entries;
            entries.drain(0..excess);
        }
    }
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::new(500, Level::Info)
    }
}

impl log::Log for DiagnosticLog {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.push(LogEntry {
                timestamp: Local::now(),
                level: record.level(),
                target: record.target().to_string(),
                message: format!("{}", record.args()),
            });
        }
    }

    fn flush(&self) {}
}

/// Level matching a verbosity count (0 = info, 1 = debug, 2+ = trace)
pub fn level_for_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::Info,
        1 => Level::Debug,
        _ => Level::Trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    fn record(log: &DiagnosticLog, level: Level, message: &str) {
        log.log(
            &Record::builder()
                .level(level)
                .target("pdf_stamp")
                .args(format_args!("{}", message))
                .build(),
        );
    }

    #[test]
    fn test_keeps_most_recent_entries() {
        let log = DiagnosticLog::new(2, Level::Info);
        record(&log, Level::Info, "one");
        record(&log, Level::Info, "two");
        record(&log, Level::Info, "three");

        let messages: Vec<_> = log.get_entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, ["two", "three"]);
        assert_eq!(log.latest_message().as_deref(), Some("three"));
    }

    #[test]
    fn test_filters_by_level() {
        let log = DiagnosticLog::new(10, Level::Info);
        record(&log, Level::Debug, "hidden");
        record(&log, Level::Warn, "Error processing file a.pdf");
        record(&log, Level::Info, "Selected 1 documents");

        assert_eq!(log.get_entries().len(), 2);
        let problems = log.problems();
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].level, Level::Warn);

        log.clear();
        assert!(log.get_entries().is_empty());
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_for_verbosity(0), Level::Info);
        assert_eq!(level_for_verbosity(1), Level::Debug);
        assert_eq!(level_for_verbosity(5), Level::Trace);
    }
}
