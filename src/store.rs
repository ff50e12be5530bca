//! # Scan History Store
//!
//! Key-value storage for the scan history list.
//!
//! The scanner side of the app appends to a JSON array under
//! [`SCAN_HISTORY_KEY`]; the map screen only reads it. Two stores are
//! provided:
//!
//! - [`SqliteStore`]: single `kv_store` table, survives restarts
//! - [`MemoryStore`]: `HashMap` backed, for tests and hosts that persist
//!   elsewhere

use std::collections::HashMap;

use log::{debug, info};
use serde_json::Value;

use crate::error::{Result, ScanMapError};
use crate::ScanRecord;

#[cfg(feature = "persistence")]
use rusqlite::{params, Connection, OptionalExtension};

/// Storage key holding the JSON array of scan records.
pub const SCAN_HISTORY_KEY: &str = "scanHistory";

/// String-keyed storage of JSON values.
pub trait KeyValueStore {
    /// Raw value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

// ============================================================================
// In-memory store
// ============================================================================

/// `HashMap`-backed store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `history` under the scan history key.
    pub fn with_history(history: &[ScanRecord]) -> Result<Self> {
        let mut store = Self::new();
        save_scan_history(&mut store, history)?;
        Ok(store)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

// ============================================================================
// SQLite store
// ============================================================================

/// SQLite-backed key-value store.
#[cfg(feature = "persistence")]
pub struct SqliteStore {
    db: Connection,
}

#[cfg(feature = "persistence")]
impl SqliteStore {
    /// Open (or create) the store at `db_path`.
    pub fn new(db_path: &str) -> Result<Self> {
        let db = Connection::open(db_path)?;
        Self::init_schema(&db)?;
        info!("[ScanMap] Opened store at {}", db_path);

        Ok(Self { db })
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> Result<Self> {
        Self::new(":memory:")
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER DEFAULT (strftime('%s', 'now'))
            );
            "#,
        )?;
        Ok(())
    }
}

#[cfg(feature = "persistence")]
impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .db
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.db.execute(
            "INSERT OR REPLACE INTO kv_store (key, value) VALUES (?, ?)",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.db
            .execute("DELETE FROM kv_store WHERE key = ?", params![key])?;
        Ok(())
    }
}

// ============================================================================
// Scan history helpers
// ============================================================================

/// Read the scan history list.
///
/// A missing key or a stored `null` yields an empty list. Anything that is
/// not a JSON array is reported as [`ScanMapError::MalformedHistory`].
pub fn load_scan_history<S: KeyValueStore + ?Sized>(store: &S) -> Result<Vec<ScanRecord>> {
    let raw = match store.get(SCAN_HISTORY_KEY)? {
        Some(raw) => raw,
        None => {
            debug!("[ScanMap] No scan history stored");
            return Ok(Vec::new());
        }
    };

    let history = parse_scan_history(SCAN_HISTORY_KEY, &raw)?;
    info!("[ScanMap] Loaded {} scan records", history.len());
    Ok(history)
}

/// Parse a JSON scan history read from `source`.
///
/// Only the top level is checked: `null` is an empty list and any other
/// non-array value is [`ScanMapError::MalformedHistory`]. Entries are read
/// with [`ScanRecord::from_json_value`], so a badly typed field falls back
/// to its default instead of dropping the history.
pub fn parse_scan_history(source: &str, json: &str) -> Result<Vec<ScanRecord>> {
    let malformed = |message: String| ScanMapError::MalformedHistory {
        key: source.to_string(),
        message,
    };

    let entries: Option<Vec<Value>> =
        serde_json::from_str(json).map_err(|e| malformed(e.to_string()))?;
    Ok(entries
        .unwrap_or_default()
        .iter()
        .map(ScanRecord::from_json_value)
        .collect())
}

/// Replace the stored scan history with `history`.
pub fn save_scan_history<S: KeyValueStore + ?Sized>(
    store: &mut S,
    history: &[ScanRecord],
) -> Result<()> {
    let json = serde_json::to_string(history)?;
    store.set(SCAN_HISTORY_KEY, &json)
}

/// Append one scan to the end of the stored history.
pub fn append_scan<S: KeyValueStore + ?Sized>(store: &mut S, record: ScanRecord) -> Result<()> {
    let mut history = load_scan_history(&*store)?;
    history.push(record);
    save_scan_history(store, &history)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScanPoint;

    fn sample_history() -> Vec<ScanRecord> {
        vec![
            ScanRecord::new("A", 1.0, 1.0).with_timestamp("d1", "t1"),
            ScanRecord::new("B", 5.0, 5.0).with_timestamp("d3", "t3"),
        ]
    }

    #[test]
    fn test_missing_history_is_empty() {
        let store = MemoryStore::new();
        assert!(load_scan_history(&store).unwrap().is_empty());
    }

    #[test]
    fn test_null_history_is_empty() {
        let mut store = MemoryStore::new();
        store.set(SCAN_HISTORY_KEY, "null").unwrap();
        assert!(load_scan_history(&store).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_history_propagates() {
        let mut store = MemoryStore::new();
        store.set(SCAN_HISTORY_KEY, r#"{"data":"A"}"#).unwrap();
        let result = load_scan_history(&store);
        assert!(matches!(result, Err(ScanMapError::MalformedHistory { .. })));
    }

    #[test]
    fn test_append_preserves_order() {
        let mut store = MemoryStore::with_history(&sample_history()).unwrap();
        append_scan(&mut store, ScanRecord::new("A", 2.0, 2.0)).unwrap();

        let history = load_scan_history(&store).unwrap();
        let codes: Vec<&str> = history.iter().map(|r| r.data.as_str()).collect();
        assert_eq!(codes, vec!["A", "B", "A"]);
    }

    #[test]
    fn test_loads_host_written_json() {
        let mut store = MemoryStore::new();
        store
            .set(
                SCAN_HISTORY_KEY,
                r#"[{"data":"A","latitude":3.1,"longitude":-76.2,"date":"1/2/2024","time":"10:00"},
                    {"data":"B"}]"#,
            )
            .unwrap();

        let history = load_scan_history(&store).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].latitude, Some(3.1));
        assert_eq!(history[1].latitude, None);
    }

    #[test]
    fn test_badly_typed_record_keeps_history() {
        let mut store = MemoryStore::new();
        store
            .set(
                SCAN_HISTORY_KEY,
                r#"[{"data":"A","latitude":1.0,"longitude":1.0},
                    {"data":"B","latitude":"3.4","longitude":5.0},
                    {"data":null,"latitude":2.0,"longitude":2.0}]"#,
            )
            .unwrap();

        let history = load_scan_history(&store).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].data, "B");
        assert_eq!(history[1].point(), ScanPoint::new(0.0, 5.0));
        assert_eq!(history[2].data, "");
        assert_eq!(history[2].point(), ScanPoint::new(2.0, 2.0));
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(parse_scan_history("file", "null").unwrap().is_empty());
        let err = parse_scan_history("file", r#""A""#).unwrap_err();
        assert!(matches!(err, ScanMapError::MalformedHistory { ref key, .. } if key == "file"));
    }

    #[cfg(feature = "persistence")]
    #[test]
    fn test_sqlite_get_set_remove() {
        let mut store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "1").unwrap();
        store.set("k", "2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("2"));

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[cfg(feature = "persistence")]
    #[test]
    fn test_sqlite_history_survives_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("scans.db");
        let path = path.to_str().unwrap();

        {
            let mut store = SqliteStore::new(path).unwrap();
            save_scan_history(&mut store, &sample_history()).unwrap();
        }

        let store = SqliteStore::new(path).unwrap();
        let history = load_scan_history(&store).unwrap();
        assert_eq!(history, sample_history());
    }
}
