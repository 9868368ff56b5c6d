use std::time::Duration;

use rayon::prelude::*;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use url::Url;

use crate::error::LoadError;
use crate::market::{parse_instruments, parse_snapshot, Instrument, Snapshot, SnapshotMap};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Where instrument records and snapshots come from.
///
/// `Sync` so the snapshot batch can fan out over rayon's pool.
pub trait AssetSource: Sync {
    /// Full asset list. Any failure here aborts the load.
    fn list_instruments(&self) -> Result<Vec<Instrument>, LoadError>;

    /// Snapshot for one symbol. `Ok(None)` when the source has none.
    fn snapshot(&self, symbol: &str) -> Result<Option<Snapshot>, LoadError>;
}

/// Asset source backed by an HTTP market-data endpoint (blocking).
///
/// Requests go to `{base}/v2/assets` and `{base}/v2/stocks/{symbol}/snapshot`.
/// The endpoint is expected to be a proxy that adds any credentials itself.
pub struct HttpAssetSource {
    base: Url,
    client: Client,
}

impl HttpAssetSource {
    pub fn new(endpoint: &str) -> Result<Self, LoadError> {
        let base = normalize_endpoint(endpoint)?;

        let client = Client::builder()
            .user_agent(concat!("market-orrery/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { base, client })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn get_text(&self, url: &Url) -> Result<(StatusCode, String), LoadError> {
        log::debug!("GET {}", url);
        let response = self
            .client
            .get(url.as_str())
            .header("Accept", "application/json")
            .send()?;
        let status = response.status();
        let body = response.text()?;
        Ok((status, body))
    }
}

impl AssetSource for HttpAssetSource {
    fn list_instruments(&self) -> Result<Vec<Instrument>, LoadError> {
        let url = join_segments(&self.base, &["v2", "assets"])?;
        let (status, body) = self.get_text(&url)?;
        if !status.is_success() {
            return Err(LoadError::http(status.as_u16(), &body));
        }
        Ok(parse_instruments(&body)?)
    }

    fn snapshot(&self, symbol: &str) -> Result<Option<Snapshot>, LoadError> {
        let url = join_segments(&self.base, &["v2", "stocks", symbol, "snapshot"])?;
        let (status, body) = self.get_text(&url)?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(LoadError::http(status.as_u16(), &body));
        }
        Ok(Some(parse_snapshot(&body)?))
    }
}

/// Parse the user-supplied endpoint, defaulting the scheme to http.
pub fn normalize_endpoint(endpoint: &str) -> Result<Url, LoadError> {
    let trimmed = endpoint.trim();
    if trimmed.is_empty() {
        return Err(LoadError::InvalidEndpoint("empty endpoint".to_string()));
    }
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };
    let url = Url::parse(&with_scheme)?;
    if url.cannot_be_a_base() {
        return Err(LoadError::InvalidEndpoint(with_scheme));
    }
    Ok(url)
}

/// Append path segments to `base`, percent-encoding each one.
pub fn join_segments(base: &Url, segments: &[&str]) -> Result<Url, LoadError> {
    let mut url = base.clone();
    url.set_query(None);
    url.path_segments_mut()
        .map_err(|_| LoadError::InvalidEndpoint(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Fetch snapshots for every symbol in parallel.
///
/// Failed requests are logged and left out of the map, so the affected
/// instruments render with defaults.
pub fn fetch_snapshots(source: &dyn AssetSource, symbols: &[String]) -> SnapshotMap {
    let results: Vec<(String, Option<Snapshot>)> = symbols
        .par_iter()
        .map(|sym| match source.snapshot(sym) {
            Ok(snap) => (sym.clone(), snap),
            Err(e) => {
                log::warn!("snapshot for {} failed: {}", sym, e);
                (sym.clone(), None)
            }
        })
        .collect();

    let requested = results.len();
    let map: SnapshotMap = results
        .into_iter()
        .filter_map(|(sym, snap)| snap.map(|s| (sym, s)))
        .collect();
    log::info!("snapshots: {}/{} loaded", map.len(), requested);
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FlakySource {
        calls: AtomicUsize,
    }

    impl AssetSource for FlakySource {
        fn list_instruments(&self) -> Result<Vec<Instrument>, LoadError> {
            Ok(Vec::new())
        }

        fn snapshot(&self, symbol: &str) -> Result<Option<Snapshot>, LoadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match symbol {
                "FAIL" => Err(LoadError::Transport("connection reset".into())),
                "NONE" => Ok(None),
                _ => Ok(Some(Snapshot {
                    latest_trade_price: Some(1.0),
                    daily_volume: Some(100.0),
                    todays_change_percent: Some(0.1),
                })),
            }
        }
    }

    #[test]
    fn endpoint_scheme_defaults_to_http() {
        let url = normalize_endpoint("localhost:8787").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.port(), Some(8787));
        assert!(normalize_endpoint("   ").is_err());
    }

    #[test]
    fn joins_paths_under_base() {
        let base = normalize_endpoint("https://proxy.example/market/").unwrap();
        let url = join_segments(&base, &["v2", "assets"]).unwrap();
        assert_eq!(url.as_str(), "https://proxy.example/market/v2/assets");

        let bare = normalize_endpoint("http://127.0.0.1:8787").unwrap();
        let url = join_segments(&bare, &["v2", "stocks", "BRK.B", "snapshot"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8787/v2/stocks/BRK.B/snapshot");
    }

    #[test]
    fn symbols_are_percent_encoded() {
        let base = normalize_endpoint("http://h").unwrap();
        let url = join_segments(&base, &["v2", "stocks", "BTC/USD", "snapshot"]).unwrap();
        assert_eq!(url.path(), "/v2/stocks/BTC%2FUSD/snapshot");
    }

    #[test]
    fn batch_recovers_failures_as_absence() {
        let source = FlakySource {
            calls: AtomicUsize::new(0),
        };
        let symbols: Vec<String> = ["AAPL", "FAIL", "NONE", "MSFT"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let map = fetch_snapshots(&source, &symbols);
        assert_eq!(source.calls.load(Ordering::SeqCst), 4);
        assert_eq!(map.len(), 2);
        assert!(map.contains_key("AAPL") && map.contains_key("MSFT"));
        assert!(!map.contains_key("FAIL"));
        assert!(!map.contains_key("NONE"));
    }

    #[test]
    fn client_builds() {
        let source = HttpAssetSource::new("127.0.0.1:1").unwrap();
        assert_eq!(source.base().host_str(), Some("127.0.0.1"));
    }
}
