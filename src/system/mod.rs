pub mod collector;
pub mod cpu;
pub mod host;
pub mod memory;
pub mod platform;
pub mod sensors;
pub mod snapshot;
pub mod store;
