use crate::config::LayoutConfig;
use crate::error::LoadError;
use crate::market::grouping::{group_instruments, snapshot_symbols, GroupSet};
use crate::market::{Instrument, SnapshotMap};
use crate::net::fetch::{fetch_snapshots, AssetSource};
use crate::render::scene::{compose_scene, ComposedScene};
use crate::render::IndicatorStyle;

/// Result of loading and composing one market scene
pub struct SceneResult {
    pub groups: GroupSet,
    pub snapshots: SnapshotMap,
    pub scene: ComposedScene,
    pub stats: LoadStats,
}

/// Counters shown in the stats overlay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub instruments_received: usize,
    pub instruments_placed: usize,
    pub groups: usize,
    pub snapshots_requested: usize,
    pub snapshots_loaded: usize,
}

/// The load pipeline: Fetch → Group → Snapshot batch → Layout → Scene
pub struct MarketEngine {
    cfg: LayoutConfig,
}

impl MarketEngine {
    pub fn new(cfg: LayoutConfig) -> Self {
        Self { cfg }
    }

    pub fn with_style(mut self, style: IndicatorStyle) -> Self {
        self.cfg.indicator_style = style;
        self
    }

    /// Run the full pipeline against a source.
    pub fn load(&self, source: &dyn AssetSource) -> Result<SceneResult, LoadError> {
        // Phase 1: Fetch
        let instruments = source.list_instruments()?;
        if instruments.is_empty() {
            return Err(LoadError::NoAssets);
        }
        log::info!("assets: {} received", instruments.len());

        // Phase 2: Group & cap
        let groups = group_instruments(&instruments, &self.cfg);
        if groups.is_empty() {
            log::warn!("no groups to visualize");
        }

        // Phase 3: Snapshot batch
        let symbols = snapshot_symbols(&groups, self.cfg.max_snapshots_per_group);
        let snapshots = fetch_snapshots(source, &symbols);

        // Phase 4-5: Layout and scene composition
        let mut result = self.compose(groups, snapshots);
        result.stats.instruments_received = instruments.len();
        result.stats.snapshots_requested = symbols.len();
        Ok(result)
    }

    /// Run grouping, layout and composition on data already in hand
    /// (for testing and style changes).
    pub fn process(&self, instruments: &[Instrument], snapshots: SnapshotMap) -> SceneResult {
        let groups = group_instruments(instruments, &self.cfg);
        let mut result = self.compose(groups, snapshots);
        result.stats.instruments_received = instruments.len();
        result
    }

    /// Rebuild the scene for already grouped data, e.g. after a style switch.
    pub fn recompose(&self, previous: SceneResult) -> SceneResult {
        let stats = previous.stats;
        let mut result = self.compose(previous.groups, previous.snapshots);
        result.stats.instruments_received = stats.instruments_received;
        result.stats.snapshots_requested = stats.snapshots_requested;
        result
    }

    fn compose(&self, groups: GroupSet, snapshots: SnapshotMap) -> SceneResult {
        let scene = compose_scene(&groups, &snapshots, &self.cfg);
        let stats = LoadStats {
            instruments_received: 0,
            instruments_placed: groups.instrument_count(),
            groups: groups.len(),
            snapshots_requested: 0,
            snapshots_loaded: snapshots.len(),
        };
        SceneResult {
            groups,
            snapshots,
            scene,
            stats,
        }
    }
}

impl Default for MarketEngine {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}
