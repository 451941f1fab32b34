pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod scheduler;
pub mod system;
