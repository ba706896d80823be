use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::types::{DigestError, Result};

pub const WATERMARK_FILE: &str = "watermarks.json";

/// One persisted record: the newest delivered item timestamp for an origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WatermarkRecord {
    origin: String,
    timestamp: DateTime<Utc>,
}

/// The persisted mapping of feed origin URL to the newest item timestamp
/// already delivered for it. Loaded once at run start, written back wholesale
/// after a successful delivery. Only the orchestrating task touches it.
#[derive(Debug)]
pub struct WatermarkStore {
    path: PathBuf,
    marks: HashMap<String, DateTime<Utc>>,
}

impl WatermarkStore {
    /// Reads the persisted mapping from `<data_dir>/watermarks.json`.
    ///
    /// A missing file is an empty mapping. Unreadable or malformed content is
    /// fatal for the run: dedup correctness cannot be guaranteed without it.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(WATERMARK_FILE);
        let marks = match fs::read_to_string(&path) {
            Ok(raw) => {
                let records: Vec<WatermarkRecord> =
                    serde_json::from_str(&raw).map_err(|e| DigestError::WatermarkLoad {
                        path: path.clone(),
                        reason: e.to_string(),
                    })?;
                records
                    .into_iter()
                    .map(|r| (r.origin, r.timestamp))
                    .collect()
            }
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(DigestError::WatermarkLoad {
                    path,
                    reason: e.to_string(),
                })
            }
        };
        debug!(path = %path.display(), count = marks.len(), "loaded watermarks");
        Ok(Self { path, marks })
    }

    pub fn get(&self, origin: &str) -> Option<DateTime<Utc>> {
        self.marks.get(origin).copied()
    }

    /// Replaces any prior watermark for `origin`.
    pub fn set(&mut self, origin: &str, timestamp: DateTime<Utc>) {
        self.marks.insert(origin.to_string(), timestamp);
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Writes the full mapping back, replacing the previous file wholesale.
    pub fn save(&self) -> Result<()> {
        let mut records: Vec<WatermarkRecord> = self
            .marks
            .iter()
            .map(|(origin, timestamp)| WatermarkRecord {
                origin: origin.clone(),
                timestamp: *timestamp,
            })
            .collect();
        records.sort_by(|a, b| a.origin.cmp(&b.origin));

        let body =
            serde_json::to_string_pretty(&records).map_err(|e| DigestError::WatermarkSave {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        fs::write(&self.path, body).map_err(|e| DigestError::WatermarkSave {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        info!(path = %self.path.display(), count = records.len(), "saved watermarks");
        Ok(())
    }
}
