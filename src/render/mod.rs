pub mod layout;
pub mod scene;
pub mod camera;
pub mod pick;
pub mod info;

/// How each instrument's activity indicator is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorStyle {
    /// Cone of light aimed at the node, sized by volume, coloured by day change
    Spotlight,
    /// Static directional beam: from above on gains, from below on losses
    FlowBeam,
}

impl Default for IndicatorStyle {
    fn default() -> Self {
        Self::Spotlight
    }
}

impl IndicatorStyle {
    pub fn label(self) -> &'static str {
        match self {
            IndicatorStyle::Spotlight => "Spotlights",
            IndicatorStyle::FlowBeam => "Flow beams",
        }
    }
}
