pub mod notification_reader;
pub mod signal_writer;
