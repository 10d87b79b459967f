use crate::kv::KvStore;
use prayer_core::record::field;
use prayer_core::{CacheRecord, Result, WidgetError};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Key under which the main application stores its whole-record document.
pub const FALLBACK_KEY: &str = "widget_cache";

/// Fields of a fast-tier record, in write order.  The timestamp goes last and
/// doubles as the "record present" marker.
const FAST_FIELDS: [&str; 12] = [
    "fajr",
    "sunrise",
    "dhuhr",
    "asr",
    "maghrib",
    "isha",
    field::SOURCE,
    field::LOCATION,
    field::HUE,
    field::DARK_MODE,
    field::BG_TRANSPARENCY,
    field::CACHE_DATE,
];

/// Read-through cache over the fast and fallback tiers.
#[derive(Clone)]
pub struct CacheStore {
    fast:     Arc<dyn KvStore>,
    fallback: Arc<dyn KvStore>,
    writer:   Arc<Mutex<()>>,
}

impl CacheStore {
    pub fn new(fast: Arc<dyn KvStore>, fallback: Arc<dyn KvStore>) -> Self {
        Self {
            fast,
            fallback,
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// Current record: the fast tier if it holds one, otherwise a normalized
    /// copy of the fallback tier (not written back).  Read errors and
    /// unparseable data count as "no record".
    pub fn read(&self) -> Option<CacheRecord> {
        if let Some(record) = self.read_fast() {
            return Some(record);
        }
        let record = self.read_fallback();
        if record.is_some() {
            debug!("fast tier empty; serving fallback record");
        }
        record
    }

    /// Whole-record document published by the main application.
    pub fn read_fallback(&self) -> Option<CacheRecord> {
        match self.fallback.get(FALLBACK_KEY) {
            Ok(Some(raw)) => CacheRecord::from_json(&raw),
            Ok(None) => None,
            Err(e) => {
                warn!("fallback tier unreadable: {e}");
                None
            }
        }
    }

    /// Fast-tier record, assembled field by field.
    pub fn read_fast(&self) -> Option<CacheRecord> {
        let timestamp = self.fast_value(field::CACHE_TIMESTAMP)?;

        let mut map = Map::new();
        map.insert(field::CACHE_TIMESTAMP.to_string(), timestamp);
        for key in FAST_FIELDS {
            if let Some(value) = self.fast_value(key) {
                map.insert(key.to_string(), value);
            }
        }
        Some(CacheRecord::from_map(&map))
    }

    /// Timestamp of the fast-tier record, `0` when there is none.
    pub fn fast_timestamp(&self) -> i64 {
        self.read_fast().map_or(0, |r| r.cache_timestamp)
    }

    /// Overwrite the fast tier with `record`, one field at a time.
    ///
    /// Returns `false` without writing when the fast tier already holds a
    /// newer record.  Writers sharing this store are serialised.
    pub fn write(&self, record: &CacheRecord) -> Result<bool> {
        let _writer = self
            .writer
            .lock()
            .map_err(|_| WidgetError::Store("fast tier writer lock poisoned".into()))?;

        let current = self.fast_timestamp();
        if record.cache_timestamp < current {
            debug!(
                timestamp = record.cache_timestamp,
                current, "fast tier already newer; write skipped"
            );
            return Ok(false);
        }

        let map = record.to_map();
        for key in FAST_FIELDS.iter().copied().chain([field::CACHE_TIMESTAMP]) {
            if let Some(value) = map.get(key) {
                self.fast.put(key, &value.to_string())?;
            }
        }
        debug!(timestamp = record.cache_timestamp, "fast tier updated");
        Ok(true)
    }

    fn fast_value(&self, key: &str) -> Option<Value> {
        let raw = match self.fast.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("fast tier field '{key}' unreadable: {e}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("fast tier field '{key}' is corrupt ({e}); using default");
                None
            }
        }
    }
}
