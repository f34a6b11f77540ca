//! # Storage Module - Save Records and Exports
//!
//! Flat-file persistence for the trader. Every piece of durable state is a small JSON
//! document that is rewritten whole on save:
//!
//! ```text
//! saves/
//! ├── market_state.json   ← category multipliers + reputation
//! ├── player_data.json    ← credits, stats, discovery sets
//! └── collection.json     ← id → artifact (kept apart so metadata saves stay cheap)
//! artifacts/
//! └── <name>_<id>.txt     ← human-readable exports
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use voidtrader::config::StorageConfig;
//! use voidtrader::storage::GameStorage;
//!
//! # fn main() -> Result<(), voidtrader::economy::EconomyError> {
//! let storage = GameStorage::new(&StorageConfig::default());
//! storage.write_record("market_state.json", &serde_json::json!({"player_reputation": 1.0}))?;
//! let back: Option<serde_json::Value> = storage.read_record("market_state.json")?;
//! assert!(back.is_some());
//! # Ok(())
//! # }
//! ```
//!
//! ## Write Safety
//!
//! Writes take an exclusive `fs2` lock on the destination, write a uniquely named temp file
//! in the same directory, fsync it, rename it over the destination, then fsync the directory
//! (best effort). A crash mid-save leaves either the old record or the new one, never a
//! truncated file.

use crate::config::StorageConfig;
use crate::economy::EconomyError;
use fs2::FileExt;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Record holding market multipliers and reputation.
pub const MARKET_RECORD: &str = "market_state.json";
/// Record holding player credits, stats and discovery sets.
pub const PLAYER_RECORD: &str = "player_data.json";
/// Record holding the artifact collection.
pub const COLLECTION_RECORD: &str = "collection.json";

/// Location-aware handle for save records and artifact exports.
///
/// Cheap to clone; the market and the player each hold their own copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameStorage {
    save_dir: PathBuf,
    output_dir: PathBuf,
}

impl GameStorage {
    pub fn new(config: &StorageConfig) -> Self {
        Self::from_dirs(&config.save_dir, &config.output_dir)
    }

    pub fn from_dirs(save_dir: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> Self {
        Self {
            save_dir: save_dir.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn record_path(&self, name: &str) -> PathBuf {
        self.save_dir.join(name)
    }

    pub fn record_exists(&self, name: &str) -> bool {
        self.record_path(name).is_file()
    }

    /// Read and decode a record. `Ok(None)` when the file does not exist or is empty.
    pub fn read_record<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, EconomyError> {
        let path = self.record_path(name);
        let content = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no save record at {}", path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        // Files written by older builds could carry NUL padding from in-place truncation
        let cleaned = content.trim_start_matches('\0');
        // The writer locks the destination before the rename, so a crash can leave it empty
        if cleaned.trim().is_empty() {
            warn!("save record {} is empty; treating it as absent", path.display());
            return Ok(None);
        }
        serde_json::from_str(cleaned)
            .map(Some)
            .map_err(|source| EconomyError::Json {
                record: name.to_string(),
                source,
            })
    }

    pub fn write_record<T: Serialize>(&self, name: &str, value: &T) -> Result<(), EconomyError> {
        let content = serde_json::to_string_pretty(value).map_err(|source| EconomyError::Json {
            record: name.to_string(),
            source,
        })?;
        fs::create_dir_all(&self.save_dir)?;
        write_file_atomic(&self.record_path(name), &content)?;
        debug!("saved {} ({} bytes)", name, content.len());
        Ok(())
    }

    /// Write an export document into the output directory and return its path.
    pub fn write_export(&self, file_name: &str, content: &str) -> Result<PathBuf, EconomyError> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(file_name);
        write_file_atomic(&path, content)?;
        Ok(path)
    }
}

/// Replace `path` with `content` via lock + temp file + rename.
pub fn write_file_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    // Step 1: Open (or create) the destination file to acquire an exclusive lock
    let lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(path)?;
    lock_file.lock_exclusive()?;

    // Step 2: Create a unique temp file in the same directory
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let base = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("record.json");
    let mut counter = 0u32;
    let tmp_path = loop {
        let candidate = dir.join(format!(".{}.tmp-{}-{}", base, std::process::id(), counter));
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(mut tmp) => {
                tmp.write_all(content.as_bytes())?;
                tmp.flush()?;
                let _ = tmp.sync_all();
                break candidate;
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                counter = counter.saturating_add(1);
            }
            Err(e) => return Err(e),
        }
    };

    // Step 3: Atomically replace the destination with the temp file
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    // Step 4: Fsync the directory to persist the rename (best-effort)
    if let Ok(dir_file) = File::open(dir) {
        let _ = dir_file.sync_all();
    }

    drop(lock_file);
    Ok(())
}
