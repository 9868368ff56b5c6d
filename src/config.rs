//! Static visual and capping configuration.
//!
//! Every knob is a compile-time constant; `LayoutConfig::default()` bundles
//! them so the grouping, layout and composition passes can be exercised with
//! smaller caps in tests.

use crate::render::IndicatorStyle;

/// Maximum number of exchange groups on the ring.
pub const MAX_GROUPS: usize = 11;
/// Maximum number of instruments kept per group.
pub const MAX_STOCKS_PER_GROUP: usize = 15;
/// Snapshot requests issued per group (first members only).
pub const MAX_SNAPSHOTS_PER_GROUP: usize = 5;

/// Radius of the horizontal ring that carries the group anchors.
pub const GROUP_RING_RADIUS: f32 = 150.0;
/// Grid pitch between instruments inside one group.
pub const STOCK_SPACING: f32 = 15.0;

pub const NODE_SIZE_DEFAULT: f32 = 1.5;
pub const NODE_SIZE_MIN: f32 = 1.0;
pub const NODE_SIZE_MAX: f32 = 10.0;
/// Daily volume → node radius.
pub const VOLUME_SCALE_FACTOR: f64 = 0.000_001;

pub const INTENSITY_DEFAULT: f32 = 0.8;
pub const INTENSITY_MIN: f32 = 0.2;
pub const INTENSITY_MAX: f32 = 2.5;
/// Daily volume → indicator intensity.
pub const VOLUME_INTENSITY_SCALE_FACTOR: f64 = 0.000_000_5;

/// Spotlight apex distance in front of its node (+Z).
pub const SPOTLIGHT_DISTANCE: f32 = 30.0;
/// Spotlight cone half-angle.
pub const SPOTLIGHT_ANGLE: f32 = std::f32::consts::PI / 6.0;

/// Flow beam start distance above (gain) or below (loss) its node.
pub const BEAM_OFFSET: f32 = 12.0;
pub const BEAM_RADIUS: f32 = 0.6;

/// Pick tolerance around connector edges, in world units.
pub const LINE_PICK_THRESHOLD: f32 = 1.0;

/// Group key used when an instrument carries no exchange.
pub const FALLBACK_GROUP: &str = "Other";

/// Default market-data endpoint. Expected to be a proxy that attaches
/// credentials; this program never holds any.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8787";
/// Environment variable overriding [`DEFAULT_ENDPOINT`] at startup.
pub const ENDPOINT_ENV: &str = "MARKET_ORRERY_ENDPOINT";

/// Indicator and scene colours (linear RGBA, 0.0–1.0).
pub struct Palette;

impl Palette {
    /// Gain or flat day: green.
    pub const GAIN: [f32; 4] = [0.40, 1.0, 0.40, 1.0];
    /// Losing day: red.
    pub const LOSS: [f32; 4] = [1.0, 0.40, 0.40, 1.0];
    /// No snapshot data.
    pub const NEUTRAL: [f32; 4] = [0.667, 0.667, 0.667, 1.0];
    pub const CONNECTOR: [f32; 4] = [0.333, 0.333, 0.333, 0.3];
    pub const BACKGROUND: [f32; 4] = [0.067, 0.067, 0.067, 1.0];

    /// Marker colours, picked deterministically per symbol.
    pub const MARKERS: &'static [[f32; 4]] = &[
        [0.0, 0.85, 1.0, 1.0],  // Cyan
        [1.0, 0.0, 0.65, 1.0],  // Magenta
        [1.0, 0.95, 0.0, 1.0],  // Yellow
        [0.0, 1.0, 0.5, 1.0],   // Spring Green
        [0.55, 0.0, 1.0, 1.0],  // Violet
        [1.0, 0.45, 0.0, 1.0],  // Vivid Orange
        [0.0, 0.55, 1.0, 1.0],  // Azure
        [1.0, 0.0, 0.35, 1.0],  // Rose
    ];
}

/// Bundle of the layout constants plus the selected indicator style.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    pub max_groups: usize,
    pub max_stocks_per_group: usize,
    pub max_snapshots_per_group: usize,
    pub ring_radius: f32,
    pub stock_spacing: f32,
    pub indicator_style: IndicatorStyle,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_groups: MAX_GROUPS,
            max_stocks_per_group: MAX_STOCKS_PER_GROUP,
            max_snapshots_per_group: MAX_SNAPSHOTS_PER_GROUP,
            ring_radius: GROUP_RING_RADIUS,
            stock_spacing: STOCK_SPACING,
            indicator_style: IndicatorStyle::default(),
        }
    }
}

impl LayoutConfig {
    pub fn with_style(mut self, style: IndicatorStyle) -> Self {
        self.indicator_style = style;
        self
    }
}

/// Resolve the startup endpoint from the environment.
pub fn endpoint_from_env() -> String {
    std::env::var(ENDPOINT_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
}
