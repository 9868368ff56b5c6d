//! Market data model: instruments, snapshots and their wire formats.

pub mod grouping;

use std::collections::HashMap;

use serde::Deserialize;

/// Asset class as reported by the asset list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    UsEquity,
    Crypto,
    UsOption,
    #[serde(other)]
    #[default]
    Unknown,
}

/// One tradable market entity, keyed by symbol.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    #[serde(rename = "name", default)]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub tradable: bool,
    #[serde(rename = "class", alias = "asset_class", default)]
    pub asset_class: AssetClass,
    #[serde(default)]
    pub exchange: Option<String>,
}

impl Instrument {
    /// Exchange code when present and non-blank.
    pub fn exchange_key(&self) -> Option<&str> {
        self.exchange
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }
}

/// Latest market metrics for one instrument. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub latest_trade_price: Option<f64>,
    pub daily_volume: Option<f64>,
    pub todays_change_percent: Option<f64>,
}

impl Snapshot {
    /// Daily volume usable for scaling: present, finite and strictly positive.
    /// Zero and negative volumes count as absent.
    pub fn usable_volume(&self) -> Option<f64> {
        self.daily_volume.filter(|v| v.is_finite() && *v > 0.0)
    }

    /// Day change when present and finite.
    pub fn change_percent(&self) -> Option<f64> {
        self.todays_change_percent.filter(|c| c.is_finite())
    }
}

/// Snapshots keyed by symbol. Symbols without an entry have no snapshot.
pub type SnapshotMap = HashMap<String, Snapshot>;

// ── Wire format ──

#[derive(Debug, Deserialize)]
struct WireBar {
    #[serde(default)]
    v: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WireTrade {
    #[serde(default)]
    p: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSnapshot {
    #[serde(default)]
    daily_bar: Option<WireBar>,
    #[serde(default)]
    todays_change_perc: Option<f64>,
    #[serde(default)]
    latest_trade: Option<WireTrade>,
}

impl From<WireSnapshot> for Snapshot {
    fn from(w: WireSnapshot) -> Self {
        Self {
            latest_trade_price: w.latest_trade.and_then(|t| t.p),
            daily_volume: w.daily_bar.and_then(|b| b.v),
            todays_change_percent: w.todays_change_perc,
        }
    }
}

/// Parse a snapshot response body.
pub fn parse_snapshot(body: &str) -> Result<Snapshot, serde_json::Error> {
    serde_json::from_str::<WireSnapshot>(body).map(Snapshot::from)
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Parse an asset list response body.
///
/// Only a body that is not a JSON array is an error. Records that do not
/// decode as an [`Instrument`] are skipped; symbols are trimmed.
pub fn parse_instruments(body: &str) -> Result<Vec<Instrument>, serde_json::Error> {
    let records: Vec<serde_json::Value> = serde_json::from_str(body)?;
    let total = records.len();
    let instruments: Vec<Instrument> = records
        .into_iter()
        .filter_map(|record| match Instrument::deserialize(&record) {
            Ok(mut inst) => {
                inst.symbol = inst.symbol.trim().to_string();
                Some(inst)
            }
            Err(e) => {
                log::debug!("skipping asset record: {} ({})", e, record);
                None
            }
        })
        .collect();
    if instruments.len() < total {
        log::debug!("assets: {} of {} records skipped", total - instruments.len(), total);
    }
    Ok(instruments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_asset_list() {
        let body = r#"[
            {"symbol":"AAPL","name":"Apple Inc.","tradable":true,"class":"us_equity","exchange":"NASDAQ"},
            {"symbol":"BTC/USD","tradable":true,"class":"crypto","exchange":"CRYPTO"},
            {"symbol":"ODD","tradable":false,"asset_class":"warrant"}
        ]"#;
        let assets = parse_instruments(body).unwrap();
        assert_eq!(assets.len(), 3);
        assert_eq!(assets[0].display_name.as_deref(), Some("Apple Inc."));
        assert_eq!(assets[0].asset_class, AssetClass::UsEquity);
        assert_eq!(assets[1].asset_class, AssetClass::Crypto);
        assert_eq!(assets[2].asset_class, AssetClass::Unknown);
        assert_eq!(assets[2].exchange, None);
    }

    #[test]
    fn malformed_records_are_skipped_not_fatal() {
        let body = r#"[
            {"symbol":"AAPL","tradable":true,"class":"us_equity","exchange":"NASDAQ"},
            {"symbol":"WEIRD","tradable":true,"exchange":"NASDAQ"},
            {"symbol":"NULLT","tradable":null,"class":"us_equity"},
            {"symbol":"BOTH","tradable":true,"class":"us_equity","asset_class":"us_equity"},
            {"tradable":true,"class":"us_equity"},
            42
        ]"#;
        let assets = parse_instruments(body).unwrap();
        let symbols: Vec<&str> = assets.iter().map(|a| a.symbol.as_str()).collect();
        assert!(symbols.contains(&"AAPL"));
        assert!(!symbols.contains(&"BOTH"));
        assert_eq!(assets.len(), symbols.len());

        let weird = assets.iter().find(|a| a.symbol == "WEIRD").unwrap();
        assert_eq!(weird.asset_class, AssetClass::Unknown);
        let nullt = assets.iter().find(|a| a.symbol == "NULLT").unwrap();
        assert!(!nullt.tradable);
    }

    #[test]
    fn non_array_body_is_an_error() {
        assert!(parse_instruments(r#"{"message":"forbidden"}"#).is_err());
    }

    #[test]
    fn symbols_are_trimmed() {
        let assets =
            parse_instruments(r#"[{"symbol":" MSFT ","tradable":true,"class":"us_equity"}]"#).unwrap();
        assert_eq!(assets[0].symbol, "MSFT");
    }

    #[test]
    fn blank_exchange_has_no_key() {
        let inst = Instrument {
            symbol: "X".into(),
            display_name: None,
            tradable: true,
            asset_class: AssetClass::UsEquity,
            exchange: Some("  ".into()),
        };
        assert_eq!(inst.exchange_key(), None);
    }

    #[test]
    fn parses_snapshot_with_missing_parts() {
        let full = parse_snapshot(
            r#"{"dailyBar":{"v":1200000},"todaysChangePerc":-1.25,"latestTrade":{"p":187.4}}"#,
        )
        .unwrap();
        assert_eq!(full.daily_volume, Some(1_200_000.0));
        assert_eq!(full.change_percent(), Some(-1.25));
        assert_eq!(full.latest_trade_price, Some(187.4));

        let sparse = parse_snapshot(r#"{"dailyBar":{}}"#).unwrap();
        assert_eq!(sparse, Snapshot::default());
    }

    #[test]
    fn zero_and_negative_volume_are_unusable() {
        let mut snap = Snapshot::default();
        snap.daily_volume = Some(0.0);
        assert_eq!(snap.usable_volume(), None);
        snap.daily_volume = Some(-5.0);
        assert_eq!(snap.usable_volume(), None);
        snap.daily_volume = Some(f64::NAN);
        assert_eq!(snap.usable_volume(), None);
        snap.daily_volume = Some(42.0);
        assert_eq!(snap.usable_volume(), Some(42.0));
    }
}
