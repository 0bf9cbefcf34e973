use crate::{Value, elapsed_millis, truncate_long};
use time::OffsetDateTime;

/// One executed statement, as seen by the dispatcher.
#[derive(Debug, Clone)]
pub struct SqlRecord {
    /// The text sent to the driver.
    pub sql: String,
    pub args: Vec<Value>,
    /// `sql` with every argument interpolated as a literal, for humans only.
    pub format: String,
    /// Rendered driver error, if the statement failed.
    pub error: Option<String>,
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
}

impl SqlRecord {
    pub fn elapsed_millis(&self) -> i64 {
        elapsed_millis(self.start, self.end)
    }
}

/// Receiver of the statements recorded while debug is enabled.
pub trait Diagnostics: Send + Sync {
    fn record(&self, record: &SqlRecord);
}

/// Writes every record to the `log` facade: `debug` on success, `error` on failure.
#[derive(Default, Debug, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn record(&self, record: &SqlRecord) {
        let message = format!(
            "[{} ms] {}",
            record.elapsed_millis(),
            truncate_long!(record.format)
        );
        match &record.error {
            Some(error) => log::error!("{}\nError: {}", message, error),
            None => log::debug!("{}", message),
        }
    }
}
