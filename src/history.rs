//! Append-only price history persisted as a parquet file.
//!
//! The file is read and rewritten through an in-memory DuckDB database.
//! Rewrites go to a temporary file in the same directory which is then
//! renamed over the target, so readers never observe a partial file.
//! Concurrent appends are serialised by an advisory lock on a sibling
//! `.lock` file. The OS releases it when the holder exits, so a killed run
//! never leaves the history locked.
//!
//! Schema: `provider VARCHAR, date VARCHAR, total DOUBLE, build BIGINT` plus
//! one nullable `DOUBLE` column per tracked item.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use duckdb::types::Value;
use duckdb::Connection as DuckDbConnection;
use fs2::FileExt;
use tracing::{debug, info, warn};

use crate::config::HISTORY_FILE_NAME;
use crate::error::{Result, TrackerError};
use crate::models::{AggregatedRow, DeltaDataset, HistoryRow, PriceRecord};

const TABLE: &str = "price_history";
const FIXED_COLUMNS: [&str; 4] = ["provider", "date", "total", "build"];
const LOCK_ATTEMPTS: u32 = 50;
const LOCK_WAIT: Duration = Duration::from_millis(100);

/// Handle on the persisted history dataset.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// Store backed by the parquet file at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Store backed by `pc_prices.parquet` inside `location`.
    pub fn in_location<P: AsRef<Path>>(location: P) -> Self {
        Self::new(location.as_ref().join(HISTORY_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every persisted row, oldest first.
    ///
    /// Returns an empty vector when the file does not exist yet.
    pub fn load(&self) -> Result<Vec<HistoryRow>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let conn = DuckDbConnection::open_in_memory()?;
        self.load_into(&conn)?;
        read_rows(&conn)
    }

    /// Append the rows of one run and persist the result.
    ///
    /// All inserted rows share `build = previous max + 1` (1 for an empty
    /// history). Rows whose `(provider, date)` is already present are
    /// skipped, as are repeats within `dataset`. Returns the full history
    /// after the append.
    pub fn append(&self, dataset: &DeltaDataset) -> Result<Vec<HistoryRow>> {
        for key in dataset.keys() {
            if FIXED_COLUMNS.iter().any(|c| c.eq_ignore_ascii_case(key)) {
                return Err(TrackerError::InvalidArgument(format!(
                    "item identifier '{}' clashes with a history column",
                    key
                )));
            }
        }

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;
        let _lock = FileLock::acquire(&self.lock_path())?;

        let conn = DuckDbConnection::open_in_memory()?;
        if self.path.exists() {
            self.load_into(&conn)?;
        } else {
            conn.execute_batch(&format!(
                "CREATE TABLE {} (provider VARCHAR, date VARCHAR, total DOUBLE, build BIGINT)",
                TABLE
            ))?;
        }

        let mut columns = item_columns(&conn)?;
        let items = dataset
            .keys()
            .iter()
            .map(String::as_str)
            .chain(dataset.rows().iter().flat_map(|row| row.record.items()));
        for item in items {
            if !columns.iter().any(|c| c.eq_ignore_ascii_case(item)) {
                conn.execute_batch(&format!(
                    "ALTER TABLE {} ADD COLUMN {} DOUBLE",
                    TABLE,
                    quote_ident(item)
                ))?;
                columns.push(item.to_string());
            }
        }

        let build: i64 = conn.query_row(
            &format!("SELECT COALESCE(MAX(build), 0) + 1 FROM {}", TABLE),
            [],
            |r| r.get(0),
        )?;

        let mut inserted = 0usize;
        for row in dataset.rows() {
            let exists: i64 = conn.query_row(
                &format!(
                    "SELECT COUNT(*) FROM {} WHERE provider = ? AND date = ?",
                    TABLE
                ),
                duckdb::params![row.provider(), row.date()],
                |r| r.get(0),
            )?;
            if exists > 0 {
                debug!(provider = row.provider(), date = row.date(), "row already in history");
                continue;
            }
            insert_row(&conn, &columns, row, build)?;
            inserted += 1;
        }

        if inserted > 0 {
            self.persist(&conn, &dir)?;
            info!(
                path = %self.path.display(),
                build,
                inserted,
                "history updated"
            );
        }

        read_rows(&conn)
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }

    fn load_into(&self, conn: &DuckDbConnection) -> Result<()> {
        conn.execute_batch(&format!(
            "CREATE TABLE {} AS SELECT * FROM read_parquet('{}')",
            TABLE,
            sql_path(&self.path)
        ))?;
        Ok(())
    }

    /// Write the table to a temp file next to the target, then rename it
    /// into place.
    fn persist(&self, conn: &DuckDbConnection, dir: &Path) -> Result<()> {
        let staging = tempfile::Builder::new()
            .prefix(".pc_prices-")
            .tempdir_in(dir)?;
        let tmp_path = staging.path().join(HISTORY_FILE_NAME);

        conn.execute_batch(&format!(
            "COPY {} TO '{}' (FORMAT PARQUET)",
            TABLE,
            sql_path(&tmp_path)
        ))?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

/// Item columns of the history table, in table order.
fn item_columns(conn: &DuckDbConnection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT column_name FROM (DESCRIBE SELECT * FROM {})",
        TABLE
    ))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        let name: String = row.get(0)?;
        if !FIXED_COLUMNS.iter().any(|c| c.eq_ignore_ascii_case(&name)) {
            columns.push(name);
        }
    }
    Ok(columns)
}

fn insert_row(
    conn: &DuckDbConnection,
    columns: &[String],
    row: &AggregatedRow,
    build: i64,
) -> Result<()> {
    let mut names: Vec<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();
    let mut values = vec![
        Value::Text(row.provider().to_string()),
        Value::Text(row.date().to_string()),
        Value::Double(row.total),
        Value::BigInt(build),
    ];

    for column in columns {
        let price = row
            .record
            .prices
            .iter()
            .find(|(id, _)| id.eq_ignore_ascii_case(column))
            .and_then(|(_, p)| *p);
        names.push(column.clone());
        values.push(price.map(Value::Double).unwrap_or(Value::Null));
    }

    let placeholders = vec!["?"; names.len()].join(", ");
    let quoted: Vec<String> = names.iter().map(|n| quote_ident(n)).collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        TABLE,
        quoted.join(", "),
        placeholders
    );
    conn.execute(&sql, duckdb::params_from_iter(values))?;
    Ok(())
}

fn read_rows(conn: &DuckDbConnection) -> Result<Vec<HistoryRow>> {
    let columns = item_columns(conn)?;
    let mut select = vec![
        "provider".to_string(),
        "CAST(date AS VARCHAR)".to_string(),
        "total".to_string(),
        "build".to_string(),
    ];
    select.extend(columns.iter().map(|c| quote_ident(c)));

    let mut stmt = conn.prepare(&format!("SELECT {} FROM {}", select.join(", "), TABLE))?;
    let mut rows = stmt.query([])?;

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let provider: String = row.get(0)?;
        let date: String = row.get(1)?;
        let total: Option<f64> = row.get(2)?;
        let build: Option<i64> = row.get(3)?;

        let mut prices = Vec::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            let price: Option<f64> = row.get(4 + i)?;
            prices.push((column.clone(), price));
        }

        out.push(HistoryRow {
            row: AggregatedRow {
                record: PriceRecord {
                    provider,
                    date,
                    prices,
                },
                total: total.unwrap_or(0.0),
            },
            build: build.unwrap_or(0),
        });
    }
    Ok(out)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Forward-slashed, quote-escaped path for embedding in a SQL literal.
fn sql_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").replace('\'', "''")
}

// ---------------------------------------------------------------------------
// FileLock
// ---------------------------------------------------------------------------

/// Exclusive advisory lock on the history's lock file, held until drop.
///
/// The lock file itself stays on disk; only the lock on its handle matters.
struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        let contended = fs2::lock_contended_error().raw_os_error();

        for attempt in 1..=LOCK_ATTEMPTS {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    return Ok(Self {
                        file,
                        path: path.to_path_buf(),
                    })
                }
                Err(e) if e.raw_os_error() == contended => {
                    debug!(path = %path.display(), attempt, "history lock busy");
                    if attempt < LOCK_ATTEMPTS {
                        thread::sleep(LOCK_WAIT);
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(io::Error::new(
            io::ErrorKind::WouldBlock,
            format!("history is locked by another run: {}", path.display()),
        )
        .into())
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), error = %e, "could not release history lock");
        }
    }
}
