//! Infrastructure: ports plus the adapters behind them.

pub mod completion_http;
pub mod config;
pub mod memory;
pub mod ports;
pub mod random;
pub mod save_files;
pub mod script_book;
