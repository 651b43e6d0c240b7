// ==========================================
// Fiber-splice billing - SQLite repository
// ==========================================
// Storage: work_record (persisted batches), device_type / splice_tier
// (tariff configuration), config_kv (key-value settings, scoped).
// Schema initialization is idempotent; saving a batch is one
// transaction.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{BillingPolicy, DeviceType, PricedRecord, SpliceTier};
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::billing_repo::BillingRepository;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tracing::info;

const BILLING_POLICY_KEY: &str = "billing/policy";

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS work_record (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    record_type   TEXT,
    map           TEXT,
    splices       INTEGER NOT NULL DEFAULT 0,
    device        TEXT,
    created_date  TEXT,
    splicer       TEXT,
    source_sheet  TEXT NOT NULL,
    splice_charge REAL NOT NULL,
    device_charge REAL NOT NULL,
    total         REAL NOT NULL,
    created_at    TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS device_type (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT NOT NULL UNIQUE COLLATE NOCASE,
    unit_value REAL NOT NULL CHECK (unit_value >= 0)
);

CREATE TABLE IF NOT EXISTS splice_tier (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    min_splices INTEGER NOT NULL CHECK (min_splices >= 0),
    max_splices INTEGER,
    unit_price  REAL NOT NULL CHECK (unit_price >= 0)
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL,
    key      TEXT NOT NULL,
    value    TEXT NOT NULL,
    PRIMARY KEY (scope_id, key)
);
"#;

// ==========================================
// BillingRepositoryImpl
// ==========================================
pub struct BillingRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl BillingRepositoryImpl {
    /// Open (or create) the billing database at db_path.
    pub fn new(db_path: &str) -> ImportResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ImportError::DatabaseConnection(e.to_string()))?;
        let repo = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        repo.init_schema()?;
        Ok(repo)
    }

    /// Wrap an already-open connection (tests, shared pools). The
    /// unified PRAGMAs are re-applied so behavior matches `new`.
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ImportResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ImportError::DatabaseConnection(format!("lock poisoned: {e}")))?;
            crate::db::configure_sqlite_connection(&guard)
                .map_err(|e| ImportError::DatabaseConnection(e.to_string()))?;
        }
        let repo = Self { conn };
        repo.init_schema()?;
        Ok(repo)
    }

    fn init_schema(&self) -> ImportResult<()> {
        let conn = self.lock_conn()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    fn lock_conn(&self) -> ImportResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ImportError::DatabaseConnection(format!("lock poisoned: {e}")))
    }

    // ===== Settings-collaborator write side =====
    // Used by seeding, tests and the maintenance binary; the ingestion
    // core itself only reads.

    pub fn upsert_device_type(&self, name: &str, unit_value: f64) -> ImportResult<()> {
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO device_type (name, unit_value) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET unit_value = excluded.unit_value",
            params![name, unit_value],
        )?;
        Ok(())
    }

    pub fn insert_splice_tier(
        &self,
        min_splices: i64,
        max_splices: Option<i64>,
        unit_price: f64,
    ) -> ImportResult<()> {
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO splice_tier (min_splices, max_splices, unit_price) VALUES (?1, ?2, ?3)",
            params![min_splices, max_splices, unit_price],
        )?;
        Ok(())
    }

    pub fn set_billing_policy(&self, policy: BillingPolicy) -> ImportResult<()> {
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = excluded.value",
            params![BILLING_POLICY_KEY, policy.as_config_value()],
        )?;
        Ok(())
    }
}

impl BillingRepository for BillingRepositoryImpl {
    fn save_records(&self, records: &[PricedRecord]) -> ImportResult<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| ImportError::DatabaseTransaction(e.to_string()))?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO work_record
                 (record_type, map, splices, device, created_date, splicer,
                  source_sheet, splice_charge, device_charge, total)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for row in records {
                let created = row
                    .record
                    .created_date
                    .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string());
                stmt.execute(params![
                    row.record.record_type,
                    row.record.map,
                    row.record.splices,
                    row.record.device,
                    created,
                    row.record.splicer,
                    row.record.source_sheet,
                    row.splice_charge,
                    row.device_charge,
                    row.total,
                ])?;
            }
        }

        tx.commit()
            .map_err(|e| ImportError::DatabaseTransaction(e.to_string()))?;
        info!(rows = records.len(), "work records persisted");
        Ok(())
    }

    fn lookup_device_types(&self) -> ImportResult<Vec<DeviceType>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare("SELECT name, unit_value FROM device_type ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(DeviceType {
                name: row.get(0)?,
                unit_value: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn lookup_splice_tiers(&self) -> ImportResult<Vec<SpliceTier>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn
            .prepare("SELECT min_splices, max_splices, unit_price FROM splice_tier ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(SpliceTier {
                min_splices: row.get(0)?,
                max_splices: row.get(1)?,
                unit_price: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn billing_policy(&self) -> ImportResult<BillingPolicy> {
        let conn = self.lock_conn()?;
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![BILLING_POLICY_KEY],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        match value {
            None => Ok(BillingPolicy::default()),
            Some(raw) => {
                BillingPolicy::from_config_value(&raw).ok_or_else(|| ImportError::ConfigValue {
                    key: BILLING_POLICY_KEY.to_string(),
                    value: raw,
                    message: "expected charge_all or first_splice_free".to_string(),
                })
            }
        }
    }

    fn record_count(&self) -> ImportResult<i64> {
        let conn = self.lock_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM work_record", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CanonicalRecord;

    fn in_memory_repo() -> BillingRepositoryImpl {
        let conn = Connection::open_in_memory().unwrap();
        BillingRepositoryImpl::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    fn priced(splices: i64, total: f64) -> PricedRecord {
        let mut record = CanonicalRecord::empty("Sheet1");
        record.splices = splices;
        PricedRecord {
            record,
            splice_charge: total,
            device_charge: 0.0,
            total,
        }
    }

    #[test]
    fn test_save_and_count() {
        let repo = in_memory_repo();
        repo.save_records(&[priced(3, 6.0), priced(5, 10.0)]).unwrap();
        assert_eq!(repo.record_count().unwrap(), 2);
    }

    #[test]
    fn test_tariff_round_trip() {
        let repo = in_memory_repo();
        repo.upsert_device_type("ONT", 15.0).unwrap();
        repo.insert_splice_tier(0, Some(10), 2.0).unwrap();
        repo.insert_splice_tier(11, None, 1.5).unwrap();

        let snapshot = repo.load_tariff_snapshot().unwrap();
        assert_eq!(snapshot.device_types.len(), 1);
        assert_eq!(snapshot.splice_tiers.len(), 2);
        assert_eq!(snapshot.splice_tiers[1].max_splices, None);
        assert_eq!(snapshot.policy, BillingPolicy::ChargeAll);
    }

    #[test]
    fn test_billing_policy_default_and_override() {
        let repo = in_memory_repo();
        assert_eq!(repo.billing_policy().unwrap(), BillingPolicy::ChargeAll);

        repo.set_billing_policy(BillingPolicy::FirstSpliceFree).unwrap();
        assert_eq!(
            repo.billing_policy().unwrap(),
            BillingPolicy::FirstSpliceFree
        );
    }

    #[test]
    fn test_device_type_upsert_overwrites() {
        let repo = in_memory_repo();
        repo.upsert_device_type("ONT", 15.0).unwrap();
        repo.upsert_device_type("ont", 18.0).unwrap(); // NOCASE key
        let devices = repo.lookup_device_types().unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].unit_value, 18.0);
    }
}
