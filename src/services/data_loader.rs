//! Snapshot loading from the backend API or a directory of saved responses
//!
//! Every backend response is a `{ success, message, data }` envelope. The
//! envelope is unwrapped exactly once here so the reporting core only ever
//! sees typed collections.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::report::ReportInputs;
use crate::types::{DashError, Dealer, DebtRecord, Order, Result, Staff, VehicleRequest};

/// Backend response envelope
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

/// Collections a dashboard can be built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Orders,
    Debts,
    Dealers,
    Staff,
    Requests,
}

impl Collection {
    /// Snapshot file stem
    pub fn name(&self) -> &'static str {
        match self {
            Self::Orders => "orders",
            Self::Debts => "debts",
            Self::Dealers => "dealers",
            Self::Staff => "staff",
            Self::Requests => "requests",
        }
    }

    /// API path relative to the base URL
    pub fn api_path(&self) -> &'static str {
        match self {
            Self::Orders => "orders",
            Self::Debts => "debts",
            Self::Dealers => "dealers",
            Self::Staff => "staff",
            Self::Requests => "vehicle-requests",
        }
    }
}

/// Unwrap an envelope. `success: false` becomes [`DashError::Api`].
pub fn unwrap_envelope<T: DeserializeOwned>(bytes: &mut [u8]) -> Result<T> {
    let envelope: Envelope<T> =
        simd_json::from_slice(bytes).map_err(|e| DashError::Parse(e.to_string()))?;

    if !envelope.success {
        let message = if envelope.message.is_empty() {
            "request was not successful".to_string()
        } else {
            envelope.message
        };
        return Err(DashError::Api { message });
    }

    envelope
        .data
        .ok_or_else(|| DashError::Parse("envelope has no data".into()))
}

/// Unwrap a collection envelope and decode each record on its own.
///
/// Records that fail to decode are skipped with a warning so one bad row
/// does not take the rest of the collection down with it.
pub fn unwrap_records<T: DeserializeOwned>(bytes: &mut [u8]) -> Result<Vec<T>> {
    let items: Vec<serde_json::Value> = unwrap_envelope(bytes)?;
    let total = items.len();

    let records: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(index, "skipping malformed record: {}", e);
                None
            }
        })
        .collect();

    if records.len() < total {
        tracing::warn!(
            kept = records.len(),
            skipped = total - records.len(),
            "collection had malformed records"
        );
    }
    Ok(records)
}

/// Trait for anything that can hand out raw snapshot envelopes
pub trait SnapshotSource: Send + Sync {
    /// Source name for log messages
    fn name(&self) -> &str;

    /// Raw envelope bytes for one collection
    fn fetch_raw(&self, collection: Collection) -> Result<Vec<u8>>;
}

/// Fetch and unwrap one collection
pub fn fetch_collection<T: DeserializeOwned>(
    source: &dyn SnapshotSource,
    collection: Collection,
) -> Result<Vec<T>> {
    let mut bytes = source.fetch_raw(collection)?;
    unwrap_records(&mut bytes)
}

/// Reads `<dir>/<collection>.json`
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SnapshotSource for DirectorySource {
    fn name(&self) -> &str {
        "directory"
    }

    fn fetch_raw(&self, collection: Collection) -> Result<Vec<u8>> {
        let path = self.dir.join(format!("{}.json", collection.name()));
        Ok(fs::read(path)?)
    }
}

/// Blocking HTTP client for the backend API
pub struct HttpSource {
    base_url: String,
    token: Option<String>,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DashError::Http(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    pub fn url_for(&self, collection: Collection) -> String {
        format!("{}/{}", self.base_url, collection.api_path())
    }
}

impl SnapshotSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch_raw(&self, collection: Collection) -> Result<Vec<u8>> {
        let url = self.url_for(collection);
        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|e| DashError::Http(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DashError::Http(format!("{} returned {}", url, status)));
        }

        let body = response
            .bytes()
            .map_err(|e| DashError::Http(format!("reading {} failed: {}", url, e)))?;
        Ok(body.to_vec())
    }
}

/// Loads every collection a dashboard needs
pub struct DataLoaderService {
    source: Box<dyn SnapshotSource>,
}

impl DataLoaderService {
    pub fn new(source: Box<dyn SnapshotSource>) -> Self {
        Self { source }
    }

    /// Fetch all collections in parallel. A collection that fails to load is
    /// left as `None` so the rest of the dashboard still renders.
    pub fn load(&self) -> ReportInputs {
        let ((orders, debts), ((dealers, staff), requests)) = rayon::join(
            || {
                rayon::join(
                    || self.fetch::<Order>(Collection::Orders),
                    || self.fetch::<DebtRecord>(Collection::Debts),
                )
            },
            || {
                rayon::join(
                    || {
                        rayon::join(
                            || self.fetch::<Dealer>(Collection::Dealers),
                            || self.fetch::<Staff>(Collection::Staff),
                        )
                    },
                    || self.fetch::<VehicleRequest>(Collection::Requests),
                )
            },
        );

        ReportInputs {
            orders,
            debts,
            dealers,
            staff,
            requests,
        }
    }

    /// Load only debts (for the debt overview)
    pub fn load_debts(&self) -> Option<Vec<DebtRecord>> {
        self.fetch(Collection::Debts)
    }

    fn fetch<T: DeserializeOwned>(&self, collection: Collection) -> Option<Vec<T>> {
        match fetch_collection::<T>(self.source.as_ref(), collection) {
            Ok(items) => {
                tracing::debug!(
                    source = self.source.name(),
                    collection = collection.name(),
                    count = items.len(),
                    "loaded snapshot"
                );
                Some(items)
            }
            Err(e) => {
                tracing::warn!(
                    source = self.source.name(),
                    collection = collection.name(),
                    "failed to load: {}",
                    e
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixtures() -> DirectorySource {
        DirectorySource::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures"))
    }

    // ========== unwrap_envelope() ==========

    #[test]
    fn test_unwrap_success() {
        let mut raw =
            br#"{"success":true,"message":"ok","data":[{"id":1,"name":"North"}]}"#.to_vec();
        let dealers: Vec<Dealer> = unwrap_envelope(&mut raw).unwrap();
        assert_eq!(dealers.len(), 1);
        assert_eq!(dealers[0].name, "North");
    }

    #[test]
    fn test_unwrap_failure_is_api_error() {
        let mut raw = br#"{"success":false,"message":"Token expired","data":null}"#.to_vec();
        let err = unwrap_envelope::<Vec<Dealer>>(&mut raw).unwrap_err();
        match err {
            DashError::Api { message } => assert_eq!(message, "Token expired"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unwrap_missing_data_is_parse_error() {
        let mut raw = br#"{"success":true,"message":"ok"}"#.to_vec();
        let err = unwrap_envelope::<Vec<Dealer>>(&mut raw).unwrap_err();
        assert!(matches!(err, DashError::Parse(_)));
    }

    #[test]
    fn test_unwrap_invalid_json() {
        let mut raw = b"<html>502 Bad Gateway</html>".to_vec();
        let err = unwrap_envelope::<Vec<Dealer>>(&mut raw).unwrap_err();
        assert!(matches!(err, DashError::Parse(_)));
    }

    #[test]
    fn test_unwrap_records_skips_malformed_rows() {
        let mut raw = br#"{"success":true,"message":"","data":[
            {"id":1,"customerId":7,"totalPrice":100,"status":"COMPLETED","createdAt":"2025-01-05T10:00:00Z"},
            {"id":2,"customerId":8,"totalPrice":50,"status":"PENDING","createdAt":"05/02/2025"},
            {"id":"three","customerId":9,"totalPrice":70,"status":"PENDING","createdAt":"2025-02-03"},
            {"id":4,"customerId":9,"totalPrice":30,"createdAt":"2025-02-03"},
            {"id":5,"customerId":9,"totalPrice":20,"status":"PARTIAL","createdAt":"2025-02-04"}
        ]}"#
        .to_vec();

        let orders: Vec<Order> = unwrap_records(&mut raw).unwrap();

        let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1, 5]);
    }

    #[test]
    fn test_unwrap_records_failure_envelope_still_errors() {
        let mut raw = br#"{"success":false,"message":"Forbidden","data":null}"#.to_vec();
        let err = unwrap_records::<Order>(&mut raw).unwrap_err();
        assert!(matches!(err, DashError::Api { .. }));
    }

    // ========== DirectorySource ==========

    #[test]
    fn test_directory_source_fixture_orders() {
        let source = fixtures();
        let orders: Vec<Order> = fetch_collection(&source, Collection::Orders).unwrap();
        assert_eq!(orders.len(), 5);
        // "12,5 tr" is not numeric and coerces to zero
        assert_eq!(orders[4].total_price, 0.0);
        assert_eq!(orders.iter().filter(|o| o.customer_id.is_none()).count(), 1);
    }

    #[test]
    fn test_directory_source_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let source = DirectorySource::new(dir.path());
        let err = fetch_collection::<Order>(&source, Collection::Orders).unwrap_err();
        assert!(matches!(err, DashError::Io(_)));
    }

    // ========== DataLoaderService ==========

    #[test]
    fn test_load_all_fixtures() {
        let loader = DataLoaderService::new(Box::new(fixtures()));
        let inputs = loader.load();

        assert!(inputs.missing().is_empty(), "missing: {:?}", inputs.missing());
        assert_eq!(inputs.dealers.as_ref().map(Vec::len), Some(3));
        assert_eq!(inputs.staff.as_ref().map(Vec::len), Some(2));
        assert_eq!(inputs.debts.as_ref().map(Vec::len), Some(3));
        assert_eq!(inputs.requests.as_ref().map(Vec::len), Some(3));
    }

    #[test]
    fn test_load_partial_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("dealers.json"),
            r#"{"success":true,"message":"","data":[{"id":1,"name":"North"}]}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("staff.json"),
            r#"{"success":false,"message":"Forbidden","data":null}"#,
        )
        .unwrap();

        let inputs = DataLoaderService::new(Box::new(DirectorySource::new(dir.path()))).load();

        assert!(inputs.dealers.is_some());
        assert_eq!(
            inputs.missing(),
            vec!["orders", "debts", "staff", "requests"]
        );
    }

    #[test]
    fn test_load_keeps_valid_orders_around_bad_one() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("orders.json"),
            r#"{"success":true,"message":"","data":[
                {"id":1,"customerId":7,"totalPrice":100,"status":"COMPLETED","createdAt":"2025-01-05T10:00:00Z"},
                {"id":2,"customerId":8,"totalPrice":50,"status":"PENDING","createdAt":"05/02/2025"},
                {"id":3,"customerId":9,"totalPrice":70,"status":"PENDING","createdAt":"2025-02-03"}
            ]}"#,
        )
        .unwrap();

        let inputs = DataLoaderService::new(Box::new(DirectorySource::new(dir.path()))).load();

        let orders = inputs.orders.expect("orders should load");
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, 1);
        assert_eq!(orders[1].id, 3);
    }

    #[test]
    fn test_load_debts_only() {
        let loader = DataLoaderService::new(Box::new(fixtures()));
        let debts = loader.load_debts().unwrap();
        assert_eq!(debts.len(), 3);
    }

    // ========== HttpSource ==========

    #[test]
    fn test_http_url_for() {
        let source = HttpSource::new(
            "https://portal.example.com/api/",
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            source.url_for(Collection::Requests),
            "https://portal.example.com/api/vehicle-requests"
        );
        assert_eq!(
            source.url_for(Collection::Orders),
            "https://portal.example.com/api/orders"
        );
    }

    #[test]
    fn test_http_unreachable_is_http_error() {
        // Port 9 (discard) on localhost is expected to refuse connections
        let source = HttpSource::new("http://127.0.0.1:9", None, Duration::from_secs(1)).unwrap();
        let err = source.fetch_raw(Collection::Orders).unwrap_err();
        assert!(matches!(err, DashError::Http(_)));
    }
}
