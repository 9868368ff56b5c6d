pub mod pipeline;

pub use pipeline::{LoadStats, MarketEngine, SceneResult};
