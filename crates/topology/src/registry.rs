//! Registry of the announcements received by the local instance.
//!
//! The in-memory cache is the source of truth for announcements registered
//! against this instance. Every registered announcement is also persisted
//! under the local instance id, so that the other instances of the cluster
//! can read it when assembling the topology. Heartbeats that don't change an
//! announcement only touch the cache.
//!
//! All operations are serialized by a single lock: the duplicate membership
//! check and the reconciliation of the persisted copies both need a stable
//! view of the whole cache.
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::*;
use thiserror::Error;

use crate::announcement::{self, Announcement};
use crate::cached::CachedAnnouncement;
use crate::cluster::{ClusterView, Instance};
use crate::config::Config;
use crate::store::{self, Store};
use crate::time::Timestamp;

#[derive(Debug, Error)]
pub enum Error {
    /// The announcement store failed.
    #[error("announcement store error: {0}")]
    Store(#[from] store::Error),
    /// An announcement couldn't be encoded.
    #[error(transparent)]
    Announcement(#[from] announcement::Error),
}

/// Why an announcement was not registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The announcement is malformed, see [`Announcement::is_valid`].
    Invalid,
    /// The owner is already a member of the cluster claimed by another
    /// active announcement: registering it would create a loop.
    DuplicateMembership { owner: String, claimed_by: String },
}

/// Outcome of registering an announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// New or changed announcement, now cached and persisted.
    Registered,
    /// Unchanged announcement: the heartbeat was recorded, and the peer
    /// should use the given backoff, in seconds.
    Refreshed { backoff: u64 },
    /// The announcement was not registered.
    Rejected(Rejection),
}

impl Registration {
    /// Legacy status code: `-1` when rejected, the backoff when refreshed,
    /// `0` otherwise.
    pub fn status_code(&self) -> i64 {
        match self {
            Self::Registered => 0,
            Self::Refreshed { backoff } => i64::try_from(*backoff).unwrap_or(i64::MAX),
            Self::Rejected(_) => -1,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

struct Inner<S> {
    cache: BTreeMap<String, CachedAnnouncement>,
    store: S,
}

/// Announcements registered against the local instance.
pub struct Registry<S> {
    local: String,
    config: Config,
    inner: Mutex<Inner<S>>,
}

impl<S: Store> Registry<S> {
    /// Create a registry for the given local instance, with an empty cache.
    ///
    /// Entries persisted by a previous run are removed on the first call to
    /// [`Registry::check_expired_announcements`].
    pub fn new(local: impl Into<String>, config: Config, store: S) -> Self {
        Self {
            local: local.into(),
            config,
            inner: Mutex::new(Inner {
                cache: BTreeMap::new(),
                store,
            }),
        }
    }

    pub fn local_instance(&self) -> &str {
        &self.local
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register an announcement received from a peer.
    pub fn register_announcement(
        &self,
        mut incoming: Announcement,
        now: Timestamp,
    ) -> Result<Registration, Error> {
        if !incoming.is_valid() {
            debug!(target: "registry", "Rejecting invalid announcement {incoming}");
            return Ok(Registration::Rejected(Rejection::Invalid));
        }
        incoming.set_received_at(now);

        let owner = incoming.owner_id().to_owned();
        let mut inner = self.lock();

        if let Some(cached) = inner.cache.get_mut(&owner) {
            if cached.announcement().corresponds_to(&incoming) {
                let backoff = cached.register_ping(&incoming, &self.config, now);
                trace!(target: "registry", "Heartbeat from {owner} (backoff={backoff}s)");

                return Ok(Registration::Refreshed { backoff });
            }
        }

        let claimed_by = inner
            .cache
            .iter()
            .filter(|(other, _)| **other != owner)
            .filter(|(_, cached)| !cached.has_expired(&self.config, now))
            .find(|(_, cached)| cached.announcement().contains_instance(&owner))
            .map(|(other, _)| other.clone());

        if let Some(claimed_by) = claimed_by {
            warn!(
                target: "registry",
                "Rejecting announcement of {owner}: already a member of the topology announced by {claimed_by}"
            );
            return Ok(Registration::Rejected(Rejection::DuplicateMembership {
                owner,
                claimed_by,
            }));
        }
        let json = incoming.to_json()?;

        inner
            .cache
            .insert(owner.clone(), CachedAnnouncement::new(incoming, now));
        inner
            .store
            .transaction(|s| s.put(&self.local, &owner, &json, now))?;

        debug!(target: "registry", "Registered announcement of {owner}");

        Ok(Registration::Registered)
    }

    /// Remove the announcement of `owner`. Returns whether there was one.
    pub fn unregister_announcement(&self, owner: &str) -> Result<bool, Error> {
        let mut inner = self.lock();
        let cached = inner.cache.remove(owner).is_some();
        let persisted = inner.store.transaction(|s| s.remove(&self.local, owner))?;

        if cached || persisted {
            debug!(target: "registry", "Unregistered announcement of {owner}");
        }
        Ok(cached || persisted)
    }

    /// Whether `owner` has a registered announcement that hasn't expired.
    pub fn has_active_announcement(&self, owner: &str, now: Timestamp) -> bool {
        self.lock()
            .cache
            .get(owner)
            .is_some_and(|cached| !cached.has_expired(&self.config, now))
    }

    /// Seconds until the announcement of `owner` expires, if there is one.
    pub fn seconds_until_timeout(&self, owner: &str, now: Timestamp) -> Option<i64> {
        self.lock()
            .cache
            .get(owner)
            .map(|cached| cached.seconds_until_timeout(&self.config, now))
    }

    /// All active announcements registered against the local instance.
    pub fn list_local_announcements(&self, now: Timestamp) -> Vec<Announcement> {
        self.active(&self.lock(), now).cloned().collect()
    }

    /// Like [`Registry::list_local_announcements`], without the replies
    /// inherited from servers we connected to.
    pub fn list_local_incoming_announcements(&self, now: Timestamp) -> Vec<Announcement> {
        self.active(&self.lock(), now)
            .filter(|a| !a.is_inherited())
            .cloned()
            .collect()
    }

    /// Announcements registered against any instance of the given cluster.
    ///
    /// Those of the local instance come from the cache, the others from the
    /// store. Persisted announcements of instances that aren't part of the
    /// view are ignored: those instances have left the cluster.
    pub fn list_announcements_in_same_cluster(
        &self,
        view: &ClusterView,
        now: Timestamp,
    ) -> Result<Vec<Announcement>, Error> {
        let inner = self.lock();
        let mut announcements = self.active(&inner, now).cloned().collect::<Vec<_>>();

        for instance in inner.store.instances()? {
            if instance == self.local {
                continue;
            }
            if !view.contains(&instance) {
                debug!(
                    target: "registry",
                    "Ignoring announcements of {instance}: not part of cluster {}", view.id()
                );
                continue;
            }
            announcements.extend(self.persisted(&inner.store, &instance)?);
        }
        Ok(announcements)
    }

    /// Fold the announcements registered against the instances of `view`
    /// into `target`, keeping only those accepted by `filter`.
    ///
    /// The filter is called with the id of the instance the announcement was
    /// registered against. It lets the caller leave out announcements that
    /// would lead back to the peer the result is sent to.
    pub fn add_all_except<F>(
        &self,
        target: &mut Announcement,
        view: &ClusterView,
        now: Timestamp,
        mut filter: F,
    ) -> Result<(), Error>
    where
        F: FnMut(&str, &Announcement) -> bool,
    {
        let inner = self.lock();

        for instance in view.ids() {
            let announcements: Vec<Announcement> = if instance == self.local {
                self.active(&inner, now).cloned().collect()
            } else {
                self.persisted(&inner.store, instance)?
            };
            for a in announcements {
                if filter(instance, &a) {
                    target.add_incoming_topology_announcement(a);
                }
            }
        }
        Ok(())
    }

    /// Evict expired announcements, and bring the persisted copies in line
    /// with the cache. Returns the owners of the evicted announcements.
    pub fn check_expired_announcements(&self, now: Timestamp) -> Result<Vec<String>, Error> {
        let mut inner = self.lock();
        let Inner { cache, store } = &mut *inner;

        let expired = cache
            .iter()
            .filter(|(_, cached)| cached.has_expired(&self.config, now))
            .map(|(owner, _)| owner.clone())
            .collect::<Vec<_>>();

        for owner in &expired {
            cache.remove(owner);
            info!(target: "registry", "Announcement of {owner} expired");
        }

        store.transaction(|s| {
            let mut persisted = BTreeSet::new();

            for entry in s.announcements(&self.local)? {
                let current = cache.get(&entry.owner).is_some_and(|cached| {
                    Announcement::from_json(&entry.json)
                        .is_ok_and(|a| a.corresponds_to(cached.announcement()))
                });
                if cache.contains_key(&entry.owner) {
                    if current {
                        persisted.insert(entry.owner);
                    }
                    continue;
                }
                if !expired.contains(&entry.owner) {
                    debug!(target: "registry", "Removing stale announcement of {}", entry.owner);
                }
                s.remove(&self.local, &entry.owner)?;
            }
            for (owner, cached) in cache.iter() {
                if !persisted.contains(owner) {
                    debug!(target: "registry", "Persisting announcement of {owner}");
                    s.put(&self.local, owner, &cached.announcement().to_json()?, now)?;
                }
            }
            Ok::<_, Error>(())
        })?;

        Ok(expired)
    }

    /// All instances of the topology seen by the given cluster, each listed once.
    pub fn list_instances(&self, view: &ClusterView, now: Timestamp) -> Result<Vec<Instance>, Error> {
        let mut seen = BTreeSet::new();
        let instances = self
            .list_announcements_in_same_cluster(view, now)?
            .iter()
            .flat_map(Announcement::list_instances)
            .filter(|i| seen.insert(i.id().to_owned()))
            .cloned()
            .collect();

        Ok(instances)
    }

    fn lock(&self) -> MutexGuard<'_, Inner<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn active<'a>(
        &'a self,
        inner: &'a Inner<S>,
        now: Timestamp,
    ) -> impl Iterator<Item = &'a Announcement> + 'a {
        inner
            .cache
            .values()
            .filter(move |cached| !cached.has_expired(&self.config, now))
            .map(CachedAnnouncement::announcement)
    }

    /// Decode the announcements persisted by another instance. Entries that
    /// can't be decoded are skipped.
    fn persisted(&self, store: &S, instance: &str) -> Result<Vec<Announcement>, Error> {
        let announcements = store
            .announcements(instance)?
            .into_iter()
            .filter_map(|entry| match Announcement::from_json(&entry.json) {
                Ok(a) => Some(a),
                Err(e) => {
                    warn!(
                        target: "registry",
                        "Skipping announcement of {} stored by {instance}: {e}", entry.owner
                    );
                    None
                }
            })
            .collect();

        Ok(announcements)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::assert_matches;
    use crate::store::MemoryStore;
    use crate::test::fixtures;
    use pretty_assertions::assert_eq;

    fn config() -> Config {
        Config::new(40, 20, 5)
    }

    fn registry(local: &str, store: &MemoryStore) -> Registry<MemoryStore> {
        Registry::new(local, config(), store.clone())
    }

    fn owners(announcements: &[Announcement]) -> Vec<&str> {
        let mut owners = announcements.iter().map(|a| a.owner_id()).collect::<Vec<_>>();
        owners.sort();
        owners
    }

    #[test]
    fn test_heartbeat_then_expiry() {
        let store = MemoryStore::new();
        let registry = registry("local", &store);
        let t0 = Timestamp::from_secs(1_000);
        let a = fixtures::announcement("A", "c1", &["A"]);

        assert_eq!(
            registry.register_announcement(a.clone(), t0).unwrap(),
            Registration::Registered
        );
        assert_eq!(store.writes(), 1);
        assert!(store.get("local", "A").unwrap().is_some());

        let t1 = t0.add_secs(39);
        let status = registry.register_announcement(a, t1).unwrap();
        assert_matches!(status, Registration::Refreshed { .. });
        assert!(status.status_code() >= 0);
        assert_eq!(store.writes(), 1, "heartbeats don't write to the store");
        assert!(registry.has_active_announcement("A", t1));
        assert_eq!(registry.seconds_until_timeout("A", t1), Some(40));

        let t2 = t0.add_secs(100);
        assert_eq!(registry.check_expired_announcements(t2).unwrap(), vec!["A"]);
        assert!(!registry.has_active_announcement("A", t2));
        assert!(store.get("local", "A").unwrap().is_none());
        assert!(registry.list_local_announcements(t2).is_empty());
    }

    #[test]
    fn test_heartbeat_updates_last_ping() {
        let store = MemoryStore::new();
        let registry = registry("local", &store);
        let t0 = Timestamp::from_secs(0);
        let a = fixtures::announcement("A", "c1", &["A"]);

        registry.register_announcement(a.clone(), t0).unwrap();
        registry.register_announcement(a, t0.add_secs(30)).unwrap();

        assert!(registry.has_active_announcement("A", t0.add_secs(60)));
        assert!(!registry.has_active_announcement("A", t0.add_secs(70)));
    }

    #[test]
    fn test_stable_heartbeats_get_backoff() {
        let store = MemoryStore::new();
        let registry = registry("local", &store);
        let t0 = Timestamp::from_secs(0);
        let a = fixtures::announcement("A", "c1", &["A"]);

        registry.register_announcement(a.clone(), t0).unwrap();
        let mut now = t0;
        let mut status = Registration::Registered;
        for _ in 0..10 {
            now = now.add_secs(20);
            status = registry.register_announcement(a.clone(), now).unwrap();
        }
        assert_eq!(status, Registration::Refreshed { backoff: 100 });
        assert_eq!(status.status_code(), 100);
    }

    #[test]
    fn test_decoded_copy_is_a_heartbeat() {
        let store = MemoryStore::new();
        let registry = registry("local", &store);
        let t0 = Timestamp::from_secs(1);
        let a: Announcement = crate::test::arbitrary::gen(3);
        let copy = Announcement::from_json(&a.to_json().unwrap()).unwrap();

        assert_eq!(
            registry.register_announcement(a, t0).unwrap(),
            Registration::Registered
        );
        assert_matches!(
            registry.register_announcement(copy, t0.add_secs(1)).unwrap(),
            Registration::Refreshed { .. }
        );
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn test_changed_announcement_is_persisted() {
        let store = MemoryStore::new();
        let registry = registry("local", &store);
        let t0 = Timestamp::from_secs(0);

        registry
            .register_announcement(fixtures::announcement("A", "c1", &["A"]), t0)
            .unwrap();
        let changed = fixtures::announcement("A", "c1", &["A", "B"]);
        assert_eq!(
            registry.register_announcement(changed, t0.add_secs(1)).unwrap(),
            Registration::Registered
        );
        assert_eq!(store.writes(), 2);

        let persisted = store.get("local", "A").unwrap().unwrap();
        let persisted = Announcement::from_json(&persisted.json).unwrap();
        assert!(persisted.contains_instance("B"));
    }

    #[test]
    fn test_invalid_rejected() {
        let store = MemoryStore::new();
        let registry = registry("local", &store);
        let status = registry
            .register_announcement(fixtures::announcement("A", "c1", &["B"]), Timestamp::EPOCH)
            .unwrap();

        assert_eq!(status, Registration::Rejected(Rejection::Invalid));
        assert_eq!(status.status_code(), -1);
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn test_duplicate_membership_rejected() {
        let store = MemoryStore::new();
        let registry = registry("local", &store);
        let t0 = Timestamp::from_secs(0);

        let mut a = fixtures::announcement("A", "c1", &["A"]);
        a.add_incoming_topology_announcement(fixtures::announcement("C", "c2", &["C", "D"]));
        registry.register_announcement(a, t0).unwrap();

        let status = registry
            .register_announcement(fixtures::announcement("D", "c3", &["D"]), t0)
            .unwrap();
        assert_eq!(
            status,
            Registration::Rejected(Rejection::DuplicateMembership {
                owner: "D".to_owned(),
                claimed_by: "A".to_owned(),
            })
        );
        assert!(status.is_rejected());
        assert!(!registry.has_active_announcement("D", t0));
        assert_eq!(owners(&registry.list_local_announcements(t0)), vec!["A"]);
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn test_expired_claims_dont_block() {
        let store = MemoryStore::new();
        let registry = registry("local", &store);
        let t0 = Timestamp::from_secs(0);

        registry
            .register_announcement(fixtures::announcement("A", "c1", &["A", "B"]), t0)
            .unwrap();
        let status = registry
            .register_announcement(fixtures::announcement("B", "c2", &["B"]), t0.add_secs(50))
            .unwrap();

        assert_eq!(status, Registration::Registered);
    }

    #[test]
    fn test_unregister() {
        let store = MemoryStore::new();
        let registry = registry("local", &store);
        let t0 = Timestamp::from_secs(0);

        registry
            .register_announcement(fixtures::announcement("A", "c1", &["A"]), t0)
            .unwrap();

        assert!(registry.unregister_announcement("A").unwrap());
        assert!(!registry.has_active_announcement("A", t0));
        assert!(store.get("local", "A").unwrap().is_none());
        assert!(!registry.unregister_announcement("A").unwrap());
    }

    #[test]
    fn test_list_local_incoming() {
        let store = MemoryStore::new();
        let registry = registry("local", &store);
        let t0 = Timestamp::from_secs(0);
        let mut server = fixtures::announcement("S", "c2", &["S"]);
        server.set_inherited(true);

        registry.register_announcement(server, t0).unwrap();
        registry
            .register_announcement(fixtures::announcement("A", "c1", &["A"]), t0.add_secs(30))
            .unwrap();

        assert_eq!(
            owners(&registry.list_local_announcements(t0.add_secs(30))),
            vec!["A", "S"]
        );
        assert_eq!(
            owners(&registry.list_local_incoming_announcements(t0.add_secs(30))),
            vec!["A"]
        );
        assert_eq!(
            owners(&registry.list_local_announcements(t0.add_secs(50))),
            vec!["A"],
            "expired entries are not listed"
        );
    }

    #[test]
    fn test_list_announcements_in_same_cluster() {
        let store = MemoryStore::new();
        let i1 = registry("i1", &store);
        let i2 = registry("i2", &store);
        let gone = registry("i3", &store);
        let t0 = Timestamp::from_secs(0);

        i1.register_announcement(fixtures::announcement("A", "x", &["A"]), t0)
            .unwrap();
        i2.register_announcement(fixtures::announcement("B", "y", &["B", "B2"]), t0)
            .unwrap();
        gone.register_announcement(fixtures::announcement("C", "z", &["C"]), t0)
            .unwrap();

        let view = fixtures::local_cluster("cluster", "i1", &["i1", "i2"]);
        let announcements = i1.list_announcements_in_same_cluster(&view, t0).unwrap();
        assert_eq!(owners(&announcements), vec!["A", "B"]);

        let instances = i1.list_instances(&view, t0).unwrap();
        let mut ids = instances.iter().map(Instance::id).collect::<Vec<_>>();
        ids.sort();
        assert_eq!(ids, vec!["A", "B", "B2"]);
    }

    #[test]
    fn test_list_instances_deduplicates() {
        let store = MemoryStore::new();
        let i1 = registry("i1", &store);
        let i2 = registry("i2", &store);
        let t0 = Timestamp::from_secs(0);

        i1.register_announcement(fixtures::announcement("A", "x", &["A", "B"]), t0)
            .unwrap();
        i2.register_announcement(fixtures::announcement("B", "x", &["A", "B"]), t0)
            .unwrap();

        let view = fixtures::cluster("cluster", &["i1", "i2"]);
        let instances = i1.list_instances(&view, t0).unwrap();

        assert_eq!(instances.len(), 2);
    }

    #[test]
    fn test_corrupt_persisted_entries_are_skipped() {
        let mut store = MemoryStore::new();
        let i1 = registry("i1", &store);
        store.put("i2", "X", "{", Timestamp::EPOCH).unwrap();
        store
            .put(
                "i2",
                "B",
                &fixtures::announcement("B", "y", &["B"]).to_json().unwrap(),
                Timestamp::EPOCH,
            )
            .unwrap();

        let view = fixtures::cluster("cluster", &["i1", "i2"]);
        let announcements = i1
            .list_announcements_in_same_cluster(&view, Timestamp::EPOCH)
            .unwrap();

        assert_eq!(owners(&announcements), vec!["B"]);
    }

    #[test]
    fn test_add_all_except() {
        let store = MemoryStore::new();
        let i1 = registry("i1", &store);
        let i2 = registry("i2", &store);
        let t0 = Timestamp::from_secs(0);

        i1.register_announcement(fixtures::announcement("A", "x", &["A"]), t0)
            .unwrap();
        i2.register_announcement(fixtures::announcement("B", "y", &["B"]), t0)
            .unwrap();
        i2.register_announcement(fixtures::announcement("P", "z", &["P"]), t0)
            .unwrap();

        // The outbound announcement for peer "P" must not lead back to it.
        let mut target = fixtures::announcement("i1", "cluster", &["i1", "i2"]);
        let view = fixtures::local_cluster("cluster", "i1", &["i1", "i2"]);
        let mut registered_at = Vec::new();
        i1.add_all_except(&mut target, &view, t0, |instance, a| {
            registered_at.push((instance.to_owned(), a.owner_id().to_owned()));
            a.owner_id() != "P"
        })
        .unwrap();

        assert_eq!(
            registered_at,
            vec![
                ("i1".to_owned(), "A".to_owned()),
                ("i2".to_owned(), "B".to_owned()),
                ("i2".to_owned(), "P".to_owned()),
            ]
        );

        assert_eq!(owners(target.incomings()), vec!["A", "B"]);
        assert!(target.contains_instance("B"));
        assert!(!target.contains_instance("P"));
    }

    #[test]
    fn test_stale_persisted_entries_removed() {
        let mut store = MemoryStore::new();
        let stale = fixtures::announcement("Z", "c9", &["Z"]).to_json().unwrap();
        store.put("local", "Z", &stale, Timestamp::EPOCH).unwrap();
        store.put("other", "Y", &stale, Timestamp::EPOCH).unwrap();

        let registry = registry("local", &store);
        let t0 = Timestamp::from_secs(0);
        registry
            .register_announcement(fixtures::announcement("A", "c1", &["A"]), t0)
            .unwrap();

        assert!(registry.check_expired_announcements(t0).unwrap().is_empty());
        assert!(store.get("local", "Z").unwrap().is_none());
        assert!(store.get("local", "A").unwrap().is_some());
        assert!(
            store.get("other", "Y").unwrap().is_some(),
            "other instances' entries are left alone"
        );
    }

    #[test]
    fn test_store_failure_reconciled() {
        let store = MemoryStore::new();
        let registry = registry("local", &store);
        let t0 = Timestamp::from_secs(0);

        store.set_read_only(true);
        assert_matches!(
            registry.register_announcement(fixtures::announcement("A", "c1", &["A"]), t0),
            Err(Error::Store(store::Error::ReadOnly))
        );
        assert!(registry.has_active_announcement("A", t0), "the cache is ahead");
        assert!(store.get("local", "A").unwrap().is_none());

        store.set_read_only(false);
        registry.check_expired_announcements(t0.add_secs(1)).unwrap();

        assert!(store.get("local", "A").unwrap().is_some());
    }

    #[test]
    fn test_concurrent_registrations() {
        let store = MemoryStore::new();
        let registry = Arc::new(registry("local", &store));
        let t0 = Timestamp::from_secs(0);

        let handles = (0..8)
            .map(|i| {
                let registry = registry.clone();
                thread::spawn(move || {
                    let owner = format!("owner-{i}");
                    let a = fixtures::announcement(&owner, "c", &[owner.as_str()]);
                    for n in 0..10 {
                        registry.register_announcement(a.clone(), t0.add_secs(n)).unwrap();
                    }
                    registry.check_expired_announcements(t0.add_secs(10)).unwrap();
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.list_local_announcements(t0.add_secs(10)).len(), 8);
        assert_eq!(store.announcements("local").unwrap().len(), 8);
    }
}
