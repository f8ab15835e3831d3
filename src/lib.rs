pub mod autosave;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod fetch;
pub mod output;
pub mod scoring;
pub mod session;
pub mod stderr_buffer;
pub mod store;
pub mod tui;
