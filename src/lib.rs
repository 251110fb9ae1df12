pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod extract;
pub mod infrastructure;
pub mod interfaces;
