//! Selection details shown in the info panel.

use crate::render::layout::VisualEntity;

const NA: &str = "N/A";

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionDetails {
    pub symbol: String,
    pub name: Option<String>,
    pub group: Option<String>,
    pub last_price: Option<f64>,
    pub day_change_percent: Option<f64>,
    pub volume: Option<f64>,
    /// False when no snapshot was loaded for this instrument
    pub has_snapshot: bool,
}

impl SelectionDetails {
    pub fn from_entity(entity: &VisualEntity) -> Self {
        let snap = entity.snapshot.as_ref();
        Self {
            symbol: entity.instrument.symbol.clone(),
            name: entity.instrument.display_name.clone(),
            group: entity.instrument.exchange_key().map(str::to_string),
            last_price: snap.and_then(|s| s.latest_trade_price),
            day_change_percent: snap.and_then(|s| s.change_percent()),
            volume: snap.and_then(|s| s.daily_volume),
            has_snapshot: snap.is_some(),
        }
    }

    /// `(label, value)` rows in display order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let mut rows = vec![
            ("Symbol", self.symbol.clone()),
            (
                "Name",
                self.name
                    .as_deref()
                    .filter(|n| !n.is_empty())
                    .unwrap_or(NA)
                    .to_string(),
            ),
        ];
        if self.has_snapshot {
            rows.push(("Last Price", fmt_opt(self.last_price, |p| format!("{}", p))));
            rows.push((
                "Day Change %",
                fmt_opt(self.day_change_percent, |c| format!("{:.2}%", c)),
            ));
            rows.push(("Volume", fmt_opt(self.volume, format_volume)));
        }
        rows
    }

    /// Plain-text rendering, one row per line.
    pub fn to_text(&self) -> String {
        let mut out: Vec<String> = self
            .rows()
            .into_iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect();
        if !self.has_snapshot {
            out.push("(Snapshot data not loaded for this stock)".to_string());
        }
        out.join("\n")
    }
}

fn fmt_opt(v: Option<f64>, f: impl Fn(f64) -> String) -> String {
    v.map(f).unwrap_or_else(|| NA.to_string())
}

/// Whole shares with thousands separators.
pub fn format_volume(v: f64) -> String {
    if !v.is_finite() {
        return NA.to_string();
    }
    let whole = v.round().abs() as u64;
    let digits = whole.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if v < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::grouping::equity;
    use crate::market::Snapshot;
    use crate::render::layout::build_entity;
    use crate::render::IndicatorStyle;
    use glam::Vec3;

    #[test]
    fn full_snapshot_rows() {
        let snap = Snapshot {
            latest_trade_price: Some(187.4),
            daily_volume: Some(51_234_567.0),
            todays_change_percent: Some(-1.23456),
        };
        let entity = build_entity(&equity("AAPL", Some("NASDAQ")), Some(&snap), Vec3::ZERO, IndicatorStyle::Spotlight);
        let details = SelectionDetails::from_entity(&entity);
        assert_eq!(
            details.to_text(),
            "Symbol: AAPL\nName: AAPL Corp\nLast Price: 187.4\nDay Change %: -1.23%\nVolume: 51,234,567"
        );
        assert_eq!(details.group.as_deref(), Some("NASDAQ"));
    }

    #[test]
    fn missing_fields_show_na() {
        let snap = Snapshot {
            latest_trade_price: None,
            daily_volume: None,
            todays_change_percent: Some(0.5),
        };
        let mut inst = equity("ZZ", None);
        inst.display_name = None;
        let entity = build_entity(&inst, Some(&snap), Vec3::ZERO, IndicatorStyle::FlowBeam);
        let rows = SelectionDetails::from_entity(&entity).rows();
        assert_eq!(rows[1], ("Name", "N/A".to_string()));
        assert_eq!(rows[2], ("Last Price", "N/A".to_string()));
        assert_eq!(rows[3], ("Day Change %", "0.50%".to_string()));
        assert_eq!(rows[4], ("Volume", "N/A".to_string()));
    }

    #[test]
    fn no_snapshot_note() {
        let entity = build_entity(&equity("NOPE", Some("X")), None, Vec3::ZERO, IndicatorStyle::Spotlight);
        let text = SelectionDetails::from_entity(&entity).to_text();
        assert!(text.ends_with("(Snapshot data not loaded for this stock)"));
        assert!(!text.contains("Volume"));
    }

    #[test]
    fn volume_grouping() {
        assert_eq!(format_volume(0.0), "0");
        assert_eq!(format_volume(999.0), "999");
        assert_eq!(format_volume(1000.0), "1,000");
        assert_eq!(format_volume(1_234_567.4), "1,234,567");
    }
}
