use crate::error::{EngineError, Result};
use serde::Deserialize;
use std::io::Read;

/// One raw notification row from a batch-extraction CSV.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct NotificationRecord {
    pub app_package: String,
    pub app_name: Option<String>,
    pub title: String,
    pub text: String,
}

/// Reads raw notifications from a CSV source.
///
/// Wraps `csv::Reader` with whitespace trimming and flexible record lengths,
/// and yields `Result<NotificationRecord>` lazily so large exports stream
/// without loading everything into memory.
pub struct NotificationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> NotificationReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn records(self) -> impl Iterator<Item = Result<NotificationRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(EngineError::from))
    }
}
