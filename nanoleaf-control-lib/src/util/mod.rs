pub mod config;
pub mod effect;
pub mod error;
pub mod observer;
