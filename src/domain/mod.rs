pub mod account;
pub mod dispute;
pub mod money;
pub mod notification;
pub mod ports;
pub mod requisite;
pub mod transaction;
