// Screenwright terminal host

pub mod app;
pub mod buffer;
pub mod config;
pub mod file_manager;
pub mod status;
pub mod ui;

pub use app::App;
pub use buffer::TextBuffer;
pub use config::Config;
