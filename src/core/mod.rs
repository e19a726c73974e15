// Core business logic module

pub mod config;
pub mod system_monitor;
