//! In-memory store, used by tests and by callers that stage inputs themselves.

use super::{Presence, Store};
use crate::error::{BookletError, Result};
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `bytes` under `key`, builder style.
    pub fn with(self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(key, bytes);
        self
    }

    pub fn insert(&self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.lock().insert(key.into(), bytes.into());
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        // A poisoned map is still structurally valid.
        self.objects.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Store for MemoryStore {
    fn probe(&self, key: &str) -> Result<Presence> {
        Ok(if self.lock().contains_key(key) {
            Presence::Found
        } else {
            Presence::Missing
        })
    }

    fn read(&self, key: &str) -> Result<Vec<u8>> {
        self.get(key)
            .ok_or_else(|| BookletError::unavailable(key, "no such object"))
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.insert(key, bytes);
        Ok(())
    }

    fn describe(&self, key: &str) -> String {
        format!("memory://{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_and_probe() {
        let store = MemoryStore::new().with("liste.csv", "JOUE\n");
        assert_eq!(store.probe("liste.csv").unwrap(), Presence::Found);
        assert_eq!(store.probe("other.csv").unwrap(), Presence::Missing);

        store.write("out.pdf", b"%PDF-1.5").unwrap();
        assert_eq!(store.read("out.pdf").unwrap(), b"%PDF-1.5");
        assert_eq!(store.keys(), vec!["liste.csv".to_string(), "out.pdf".to_string()]);
    }

    #[test]
    fn read_missing_is_error() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.read("nope"),
            Err(BookletError::ResourceUnavailable { .. })
        ));
    }
}
