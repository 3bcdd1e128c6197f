pub mod config;
pub mod device;
pub mod engine;
pub mod feeder;
pub mod tui;
