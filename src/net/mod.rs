pub mod fetch;

pub use fetch::{fetch_snapshots, AssetSource, HttpAssetSource};
