use crate::error::Result;
use crate::extract::{OperationKind, Signal};
use std::io::Write;

/// Writes extracted signals as CSV, one row per input notification.
///
/// Absent signal fields become empty cells, never errors; the output is
/// meant for manual or external reconciliation.
pub struct SignalWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> SignalWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_header(&mut self) -> Result<()> {
        self.writer
            .write_record(["app_package", "amount", "card_last4", "operation"])?;
        Ok(())
    }

    pub fn write_signal(&mut self, app_package: &str, signal: &Signal) -> Result<()> {
        let amount = signal.amount.map(|a| a.to_string()).unwrap_or_default();
        let operation = match signal.operation {
            Some(OperationKind::Credit) => "credit",
            Some(OperationKind::Debit) => "debit",
            None => "",
        };
        self.writer.write_record([
            app_package,
            &amount,
            signal.card_last4.as_deref().unwrap_or_default(),
            operation,
        ])?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
