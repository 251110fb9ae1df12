use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tradepay_core::extract;
use tradepay_core::interfaces::csv::notification_reader::NotificationReader;
use tradepay_core::interfaces::csv::signal_writer::SignalWriter;

/// Batch signal extraction over a CSV of raw bank notifications
/// (app_package, app_name, title, text), for offline reconciliation.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input notifications CSV file
    input: PathBuf,

    /// Output CSV path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

fn run(input: PathBuf, sink: Box<dyn io::Write>) -> Result<()> {
    let file = File::open(input).into_diagnostic()?;
    let reader = NotificationReader::new(file);
    let mut writer = SignalWriter::new(sink);
    writer.write_header().into_diagnostic()?;

    for record in reader.records() {
        match record {
            Ok(record) => {
                // Extraction never fails; unmatched fields are empty cells.
                let signal = extract::extract(&record.title, &record.text);
                writer
                    .write_signal(&record.app_package, &signal)
                    .into_diagnostic()?;
            }
            Err(e) => {
                tracing::warn!("Error reading notification: {e}");
            }
        }
    }
    writer.flush().into_diagnostic()?;
    Ok(())
}

fn main() -> Result<()> {
    // Diagnostics go to stderr so stdout stays valid CSV.
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let sink: Box<dyn io::Write> = match &cli.output {
        Some(path) => Box::new(File::create(path).into_diagnostic()?),
        None => Box::new(io::stdout().lock()),
    };
    run(cli.input, sink)
}
