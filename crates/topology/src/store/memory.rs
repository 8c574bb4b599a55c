use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{Entry, Error, Store};
use crate::time::Timestamp;

#[derive(Debug, Default)]
struct State {
    entries: BTreeMap<String, BTreeMap<String, Entry>>,
    writes: usize,
    read_only: bool,
}

/// In-memory store.
///
/// Clones share the same entries, the way instances of one cluster share a
/// repository.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful writes and deletions so far.
    pub fn writes(&self) -> usize {
        self.state().writes
    }

    /// Reject all further writes with [`Error::ReadOnly`].
    pub fn set_read_only(&self, read_only: bool) {
        self.state().read_only = read_only;
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn writable(&self) -> Result<MutexGuard<'_, State>, Error> {
        let state = self.state();
        if state.read_only {
            return Err(Error::ReadOnly);
        }
        Ok(state)
    }
}

impl Store for MemoryStore {
    fn instances(&self) -> Result<Vec<String>, Error> {
        Ok(self
            .state()
            .entries
            .iter()
            .filter(|(_, owners)| !owners.is_empty())
            .map(|(instance, _)| instance.clone())
            .collect())
    }

    fn announcements(&self, instance: &str) -> Result<Vec<Entry>, Error> {
        Ok(self
            .state()
            .entries
            .get(instance)
            .map(|owners| owners.values().cloned().collect())
            .unwrap_or_default())
    }

    fn get(&self, instance: &str, owner: &str) -> Result<Option<Entry>, Error> {
        Ok(self
            .state()
            .entries
            .get(instance)
            .and_then(|owners| owners.get(owner))
            .cloned())
    }

    fn put(
        &mut self,
        instance: &str,
        owner: &str,
        json: &str,
        timestamp: Timestamp,
    ) -> Result<(), Error> {
        let mut state = self.writable()?;
        let entry = Entry {
            owner: owner.to_owned(),
            json: json.to_owned(),
            timestamp,
        };
        state
            .entries
            .entry(instance.to_owned())
            .or_default()
            .insert(owner.to_owned(), entry);
        state.writes += 1;

        Ok(())
    }

    fn remove(&mut self, instance: &str, owner: &str) -> Result<bool, Error> {
        let mut state = self.writable()?;
        let removed = state
            .entries
            .get_mut(instance)
            .and_then(|owners| owners.remove(owner))
            .is_some();
        if removed {
            state.writes += 1;
        }
        Ok(removed)
    }

    fn transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        E: From<Error>,
        F: FnOnce(&mut Self) -> Result<T, E>,
    {
        let snapshot = self.state().entries.clone();

        match f(self) {
            Ok(result) => Ok(result),
            Err(err) => {
                self.state().entries = snapshot;
                Err(err)
            }
        }
    }
}
