// src/core/medium.rs
use anyhow::Result;

use super::{MemoryMedium, StateDatabase};

/// Durable (or test) key-value medium the persisted slices write to.
#[derive(Debug, Clone)]
pub enum StateMedium {
    Sqlite(StateDatabase),
    Memory(MemoryMedium),
}

impl StateMedium {
    pub fn memory() -> Self {
        StateMedium::Memory(MemoryMedium::new())
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        match self {
            StateMedium::Sqlite(db) => db.get(key).await,
            StateMedium::Memory(mem) => Ok(mem.get(key)),
        }
    }

    pub async fn put(&self, key: &str, value: &str) -> Result<()> {
        match self {
            StateMedium::Sqlite(db) => db.put(key, value).await,
            StateMedium::Memory(mem) => {
                mem.put(key, value);
                Ok(())
            }
        }
    }

    pub async fn remove(&self, key: &str) -> Result<bool> {
        match self {
            StateMedium::Sqlite(db) => db.remove(key).await,
            StateMedium::Memory(mem) => Ok(mem.remove(key)),
        }
    }

    pub async fn keys(&self) -> Result<Vec<String>> {
        match self {
            StateMedium::Sqlite(db) => db.keys().await,
            StateMedium::Memory(mem) => Ok(mem.keys()),
        }
    }
}

impl From<StateDatabase> for StateMedium {
    fn from(db: StateDatabase) -> Self {
        StateMedium::Sqlite(db)
    }
}

impl From<MemoryMedium> for StateMedium {
    fn from(mem: MemoryMedium) -> Self {
        StateMedium::Memory(mem)
    }
}
