//! Post history and the six-month dedupe policy.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Months, NaiveDate};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::error::BotError;
use crate::models::PostRecord;

/// How long a subject stays deduplicated after a main-timeline post.
pub const COOLDOWN_MONTHS: u32 = 6;

/// Pure dedupe decision: post when the subject has never been posted, or
/// when its latest record is at least the cooldown old. The boundary day
/// itself allows the post.
pub fn should_post(records: &[PostRecord], subject_id: u64, today: NaiveDate) -> bool {
    let latest = records
        .iter()
        .filter(|record| record.subject_id == subject_id)
        .map(|record| record.date_posted)
        .max();
    match latest {
        None => true,
        Some(posted) => match posted.checked_add_months(Months::new(COOLDOWN_MONTHS)) {
            Some(expiry) => today >= expiry,
            // Date arithmetic overflowed; keep the subject deduplicated.
            None => false,
        },
    }
}

/// JSON-file-backed record of main-timeline posts.
///
/// `subject_guard` hands out one async lock per subject id. The pipeline
/// holds it from the dedupe check through recording, so concurrent runs
/// for the same subject serialize while unrelated subjects proceed.
pub struct HistoryStore {
    path: PathBuf,
    subject_locks: Mutex<HashMap<u64, Arc<Mutex<()>>>>,
    file_lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            subject_locks: Mutex::new(HashMap::new()),
            file_lock: Mutex::new(()),
        }
    }

    pub async fn subject_guard(&self, subject_id: u64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.subject_locks.lock().await;
            Arc::clone(locks.entry(subject_id).or_default())
        };
        lock.lock_owned().await
    }

    /// Load the full history. A missing file is an empty history; any
    /// other failure is a read error.
    pub fn load(&self) -> Result<Vec<PostRecord>, BotError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("History file missing, starting empty - path={}", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(BotError::HistoryRead(format!("{}: {e}", self.path.display())))
            }
        };
        serde_json::from_slice(&bytes)
            .map_err(|e| BotError::HistoryRead(format!("{}: {e}", self.path.display())))
    }

    /// Append one record. The file is rewritten through a temp file and a
    /// rename so prior entries survive a failed write.
    pub async fn append(&self, record: PostRecord) -> Result<(), BotError> {
        let _file = self.file_lock.lock().await;

        let mut records = self.load()?;
        records.push(record);
        let json = serde_json::to_vec_pretty(&records)
            .map_err(|e| BotError::HistoryWrite(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)
            .map_err(|e| BotError::HistoryWrite(format!("{}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| BotError::HistoryWrite(format!("{}: {e}", self.path.display())))?;
        Ok(())
    }
}
