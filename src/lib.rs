pub mod config;
pub mod error;
pub mod market;
pub mod net;
pub mod render;
pub mod engine;
