use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::domain::UViewError;
use crate::record::{Record, RecordId};

/// Per-id cache used to hand a selected record to the detail view.
pub trait RecordStore<T> {
    fn save(&mut self, record: T) -> Result<(), UViewError>;
    fn get_by_id(&self, id: &RecordId) -> Result<Option<T>, UViewError>;
    fn get_all(&self) -> Result<Vec<T>, UViewError>;
    fn delete(&mut self, id: &RecordId) -> Result<(), UViewError>;
}

#[derive(Debug)]
pub struct MemoryStore<T> {
    records: BTreeMap<RecordId, T>,
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        MemoryStore {
            records: BTreeMap::new(),
        }
    }
}

impl<T: Record> RecordStore<T> for MemoryStore<T> {
    fn save(&mut self, record: T) -> Result<(), UViewError> {
        self.records.insert(record.id(), record);
        Ok(())
    }

    fn get_by_id(&self, id: &RecordId) -> Result<Option<T>, UViewError> {
        Ok(self.records.get(id).cloned())
    }

    fn get_all(&self) -> Result<Vec<T>, UViewError> {
        Ok(self.records.values().cloned().collect())
    }

    fn delete(&mut self, id: &RecordId) -> Result<(), UViewError> {
        self.records.remove(id);
        Ok(())
    }
}

/// Write-through cache persisted as one JSON array.
#[derive(Debug)]
pub struct JsonFileStore<T> {
    path: PathBuf,
    cache: MemoryStore<T>,
}

impl<T> JsonFileStore<T>
where
    T: Record + Serialize + DeserializeOwned,
{
    pub fn open(path: PathBuf) -> Result<Self, UViewError> {
        let mut cache = MemoryStore::default();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let records: Vec<T> = serde_json::from_str(&content)?;
            info!("Opened record cache {} with {} records", path.display(), records.len());
            for record in records {
                cache.save(record)?;
            }
        }
        Ok(JsonFileStore { path, cache })
    }

    fn flush(&self) -> Result<(), UViewError> {
        let records = self.cache.get_all()?;
        fs::write(&self.path, serde_json::to_string_pretty(&records)?)?;
        debug!("Wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}

impl<T> RecordStore<T> for JsonFileStore<T>
where
    T: Record + Serialize + DeserializeOwned,
{
    fn save(&mut self, record: T) -> Result<(), UViewError> {
        self.cache.save(record)?;
        self.flush()
    }

    fn get_by_id(&self, id: &RecordId) -> Result<Option<T>, UViewError> {
        self.cache.get_by_id(id)
    }

    fn get_all(&self) -> Result<Vec<T>, UViewError> {
        self.cache.get_all()
    }

    fn delete(&mut self, id: &RecordId) -> Result<(), UViewError> {
        self.cache.delete(id)?;
        self.flush()
    }
}
