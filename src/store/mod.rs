//! Flat-file appointment table.
//!
//! Every read loads the whole CSV and every mutation rewrites it in full. There
//! is no version column and no lock: two requests that read the table, mutate
//! different copies and write them back race, and the last writer wins. Writes
//! go to a sibling temp file that is renamed over the table, so a reader never
//! observes a half-written file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::models::AppointmentSlot;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Date format not recognized. Please use DD-MM-YYYY HH:MM format")]
    DateFormat,
}

#[derive(Debug, Clone)]
pub struct AppointmentStore {
    path: PathBuf,
}

impl AppointmentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Vec<AppointmentSlot>, StoreError> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let slots = reader
            .deserialize()
            .collect::<Result<Vec<AppointmentSlot>, csv::Error>>()?;
        Ok(slots)
    }

    pub fn save(&self, slots: &[AppointmentSlot]) -> Result<(), StoreError> {
        let tmp = self.path.with_extension("csv.tmp");
        {
            let mut writer = csv::Writer::from_path(&tmp)?;
            for slot in slots {
                writer.serialize(slot)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(
            path = %self.path.display(),
            rows = slots.len(),
            "appointment table rewritten"
        );
        Ok(())
    }
}
