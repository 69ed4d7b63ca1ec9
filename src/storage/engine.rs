//! The Keyspace and its Operations
//!
//! This module implements the core storage engine for EmberKV: a keyspace
//! mapping names to scalar strings or string sets, per-key expiration
//! metadata, and a single-slot snapshot with deep-copy save/restore.
//!
//! ## Design Decisions
//!
//! 1. **One lock for the keyspace**: the three mappings and the snapshot
//!    slot live under a single `RwLock`, so every operation sees them in a
//!    consistent state.
//! 2. **A second lock for the expiration index**: the index is ordered by
//!    absolute deadline and is walked by the background sweeper. When both
//!    locks are needed, the keyspace lock is always acquired first.
//! 3. **Lazy + active expiry**: keys named by a command are pruned on
//!    access if their deadline has passed; the sweeper reclaims the rest.
//!
//! ## Type Invariant
//!
//! A name is present in `metas` iff it is present in exactly one of
//! `strings` or `sets`, and the metadata's kind matches the map holding the
//! value. Operations check the kind *before* mutating, so a rejected
//! command leaves no partial state behind.

use crate::storage::index::ExpiryIndex;
use crate::storage::sweeper::Sweeper;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock, Weak};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// Errors surfaced by keyspace operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The verb requires a key that is absent
    #[error("key not found")]
    NotFound,

    /// The verb was attempted on a key of the wrong kind
    #[error(
        "key is not valid, this key may be a {} key and does not support {} command",
        .found.label(),
        .verb
    )]
    TypeMismatch {
        /// The verb that was rejected
        verb: &'static str,
        /// The kind the key actually has
        found: KeyKind,
    },

    /// TTL on a key with no expiry set
    #[error("key has no expiration time")]
    NoExpiration,

    /// TTL on a key whose deadline has passed
    #[error("key expired")]
    Expired,

    /// RESTORE with no prior SAVE
    #[error("no snapshot to restore")]
    SnapshotAbsent,
}

/// The two value shapes a key can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// A single string value
    Scalar,
    /// An unordered set of unique strings
    Set,
}

impl KeyKind {
    /// The user-facing label used in type-mismatch messages.
    pub fn label(self) -> &'static str {
        match self {
            KeyKind::Scalar => "string",
            KeyKind::Set => "set",
        }
    }
}

/// Per-key expiration metadata. The key's name is the map key in the
/// keyspace, so it is not repeated here.
#[derive(Debug, Clone, Copy)]
pub struct KeyMeta {
    /// The value shape this key holds
    pub kind: KeyKind,
    /// Advanced to now on SET and EXPIRE (never on SADD/SREM or reads)
    pub last_renewed: Instant,
    /// Zero means the key never expires
    pub ttl: Duration,
}

impl KeyMeta {
    fn new(kind: KeyKind) -> Self {
        Self {
            kind,
            last_renewed: Instant::now(),
            ttl: Duration::ZERO,
        }
    }

    /// The absolute deadline, `last_renewed + ttl`. Only meaningful when
    /// `ttl` is nonzero.
    pub fn expires_at(&self) -> Instant {
        self.last_renewed + self.ttl
    }

    /// Returns true if the key has a ttl and its deadline has passed.
    pub fn is_expired(&self) -> bool {
        !self.ttl.is_zero() && self.expires_at() <= Instant::now()
    }

    fn renew(&mut self) {
        self.last_renewed = Instant::now();
    }
}

/// The three mappings plus the snapshot slot, guarded together by one lock.
#[derive(Debug, Default)]
struct Keyspace {
    strings: HashMap<String, String>,
    sets: HashMap<String, HashSet<String>>,
    metas: HashMap<String, KeyMeta>,
    snapshot: Option<Box<Snapshot>>,
}

/// A deep copy of the keyspace and its expiration index. The copies are
/// disjoint from the live store: strings are copied by value, sets
/// element-by-element, and the index is rebuilt from the copied metadata.
#[derive(Debug)]
struct Snapshot {
    strings: HashMap<String, String>,
    sets: HashMap<String, HashSet<String>>,
    metas: HashMap<String, KeyMeta>,
    index: ExpiryIndex,
}

/// The shared store: keyspace, expiration index, and the sweeper handle.
///
/// # Thread Safety
///
/// `Store::new` returns an `Arc<Store>` shared across all request handlers
/// and the background sweeper. Read-only operations take the keyspace lock
/// shared; mutators take it exclusively. The expiration index has its own
/// lock, always acquired *after* the keyspace lock when both are held.
///
/// # Example
///
/// ```
/// use emberkv::storage::Store;
/// use std::time::Duration;
///
/// let store = Store::new();
/// store.set("name", "ember").unwrap();
/// assert_eq!(store.get("name").unwrap(), "ember");
///
/// store.expire("name", Duration::from_secs(60)).unwrap();
/// assert_eq!(store.ttl("name").unwrap(), 60);
/// ```
#[derive(Debug)]
pub struct Store {
    keyspace: RwLock<Keyspace>,
    index: RwLock<ExpiryIndex>,
    sweeper: Mutex<Option<Sweeper>>,
    /// Weak self-handle passed to sweepers so they never keep the store
    /// alive on their own.
    handle: Weak<Store>,
}

impl Store {
    /// Creates an empty store.
    ///
    /// The store has no running sweeper until [`Store::start_sweeper`] is
    /// called (which requires a tokio runtime); lazy on-access pruning
    /// works either way.
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            keyspace: RwLock::new(Keyspace::default()),
            index: RwLock::new(ExpiryIndex::new()),
            sweeper: Mutex::new(None),
            handle: me.clone(),
        })
    }

    /// Starts the background sweeper for this store, replacing any prior
    /// one. Must be called from within a tokio runtime.
    pub fn start_sweeper(&self) {
        let mut slot = self.sweeper.lock().unwrap();
        *slot = Some(Sweeper::start(self.handle.clone()));
    }

    /// Number of live keys (expired-but-unswept keys included).
    pub fn len(&self) -> usize {
        self.keyspace.read().unwrap().metas.len()
    }

    /// Returns true if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ========================================================================
    // Scalar operations
    // ========================================================================

    /// Creates or overwrites a scalar value. Fails without mutating if the
    /// key already holds a set. Renews the key.
    pub fn set(&self, name: &str, value: &str) -> Result<(), StoreError> {
        let mut ks = self.keyspace.write().unwrap();
        if let Some(meta) = ks.metas.get(name) {
            if meta.kind != KeyKind::Scalar {
                return Err(StoreError::TypeMismatch {
                    verb: "SET",
                    found: meta.kind,
                });
            }
        }
        ks.strings.insert(name.to_string(), value.to_string());

        let meta = ks
            .metas
            .entry(name.to_string())
            .or_insert_with(|| KeyMeta::new(KeyKind::Scalar));
        let mut index = self.index.write().unwrap();
        reindex_renewed(&mut index, meta, name, None);
        Ok(())
    }

    /// Returns the scalar value for `name`. Does not renew.
    pub fn get(&self, name: &str) -> Result<String, StoreError> {
        let ks = self.keyspace.read().unwrap();
        let meta = ks.metas.get(name).ok_or(StoreError::NotFound)?;
        if meta.kind != KeyKind::Scalar {
            return Err(StoreError::TypeMismatch {
                verb: "GET",
                found: meta.kind,
            });
        }
        Ok(ks.strings[name].clone())
    }

    // ========================================================================
    // Set operations
    // ========================================================================

    /// Inserts elements into the set at `name`, creating it if absent.
    /// Duplicates are no-ops. Fails without mutating if the key holds a
    /// scalar. Does not renew.
    pub fn sadd(&self, name: &str, values: &[String]) -> Result<(), StoreError> {
        let mut ks = self.keyspace.write().unwrap();
        if let Some(meta) = ks.metas.get(name) {
            if meta.kind != KeyKind::Set {
                return Err(StoreError::TypeMismatch {
                    verb: "SADD",
                    found: meta.kind,
                });
            }
        } else {
            ks.metas.insert(name.to_string(), KeyMeta::new(KeyKind::Set));
        }
        let set = ks.sets.entry(name.to_string()).or_default();
        for value in values {
            set.insert(value.clone());
        }
        Ok(())
    }

    /// Removes elements from the set at `name`. Absent elements are
    /// no-ops; a set left empty remains a valid key. Does not renew.
    pub fn srem(&self, name: &str, values: &[String]) -> Result<(), StoreError> {
        let mut ks = self.keyspace.write().unwrap();
        let meta = ks.metas.get(name).ok_or(StoreError::NotFound)?;
        if meta.kind != KeyKind::Set {
            return Err(StoreError::TypeMismatch {
                verb: "SREM",
                found: meta.kind,
            });
        }
        if let Some(set) = ks.sets.get_mut(name) {
            for value in values {
                set.remove(value);
            }
        }
        Ok(())
    }

    /// Returns all elements of the set at `name`, in unspecified order.
    pub fn smembers(&self, name: &str) -> Result<Vec<String>, StoreError> {
        let ks = self.keyspace.read().unwrap();
        let meta = ks.metas.get(name).ok_or(StoreError::NotFound)?;
        if meta.kind != KeyKind::Set {
            return Err(StoreError::TypeMismatch {
                verb: "SMEMBERS",
                found: meta.kind,
            });
        }
        Ok(ks.sets[name].iter().cloned().collect())
    }

    /// Intersects the sets named by `names`, in unspecified order. Every
    /// referenced key must exist and hold a set. The smallest set is used
    /// as the probe; each of its elements is kept iff present in every
    /// other set.
    pub fn sinter(&self, names: &[String]) -> Result<Vec<String>, StoreError> {
        let ks = self.keyspace.read().unwrap();
        let mut sets: Vec<&HashSet<String>> = Vec::with_capacity(names.len());
        for name in names {
            let meta = ks.metas.get(name).ok_or(StoreError::NotFound)?;
            if meta.kind != KeyKind::Set {
                return Err(StoreError::TypeMismatch {
                    verb: "SINTER",
                    found: meta.kind,
                });
            }
            sets.push(&ks.sets[name]);
        }

        let Some(probe) = (0..sets.len()).min_by_key(|&i| sets[i].len()) else {
            return Ok(Vec::new());
        };

        let result = sets[probe]
            .iter()
            .filter(|value| {
                sets.iter()
                    .enumerate()
                    .all(|(i, set)| i == probe || set.contains(*value))
            })
            .cloned()
            .collect();
        Ok(result)
    }

    // ========================================================================
    // Key operations
    // ========================================================================

    /// Returns every live key name. Keys observed as expired during the
    /// scan are deleted before returning.
    pub fn keys(&self) -> Vec<String> {
        let (live, dead) = {
            let ks = self.keyspace.read().unwrap();
            let mut live = Vec::with_capacity(ks.metas.len());
            let mut dead = Vec::new();
            for (name, meta) in &ks.metas {
                if meta.is_expired() {
                    dead.push(name.clone());
                } else {
                    live.push(name.clone());
                }
            }
            (live, dead)
        };
        for name in &dead {
            self.remove_if_expired(name);
        }
        live
    }

    /// Deletes a key and its value. Fails if the key is absent.
    pub fn del(&self, name: &str) -> Result<(), StoreError> {
        let mut ks = self.keyspace.write().unwrap();
        let meta = *ks.metas.get(name).ok_or(StoreError::NotFound)?;
        let mut index = self.index.write().unwrap();
        remove_key(&mut ks, &mut index, name, meta);
        Ok(())
    }

    /// Sets the key's ttl and renews it. A zero ttl clears the expiry.
    /// The expiration index entry is reconciled either way.
    pub fn expire(&self, name: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut ks = self.keyspace.write().unwrap();
        let meta = ks.metas.get_mut(name).ok_or(StoreError::NotFound)?;
        let mut index = self.index.write().unwrap();
        reindex_renewed(&mut index, meta, name, Some(ttl));
        Ok(())
    }

    /// Remaining time before the key expires, in whole seconds with
    /// partial seconds rounded up (so a key expiring in 900 ms reports 1).
    pub fn ttl(&self, name: &str) -> Result<u64, StoreError> {
        let ks = self.keyspace.read().unwrap();
        let meta = ks.metas.get(name).ok_or(StoreError::NotFound)?;
        if meta.ttl.is_zero() {
            return Err(StoreError::NoExpiration);
        }
        let now = Instant::now();
        let deadline = meta.expires_at();
        if deadline <= now {
            return Err(StoreError::Expired);
        }
        let remaining = deadline - now;
        let mut secs = remaining.as_secs();
        if remaining.subsec_nanos() > 0 {
            secs += 1;
        }
        Ok(secs)
    }

    // ========================================================================
    // Expiration pruning
    // ========================================================================

    /// On-access pruning: deletes each named key whose deadline has
    /// passed, so the verb body never observes an expired key.
    pub fn prune_expired(&self, names: &[String]) {
        for name in names {
            if self.remove_if_expired(name) {
                debug!(key = %name, "pruned expired key on access");
            }
        }
    }

    /// One sweep pass: collects every index entry whose deadline is at or
    /// before now, releases the index lock, then deletes each key. A key
    /// renewed (or already deleted) in between is silently skipped.
    ///
    /// Returns the number of keys removed.
    pub fn sweep_expired(&self) -> usize {
        let due = self.index.read().unwrap().due(Instant::now());
        let mut removed = 0;
        for (_, name) in due {
            if self.remove_if_expired(&name) {
                removed += 1;
            }
        }
        removed
    }

    /// Deletes the key iff its deadline has passed. Silent on absence and
    /// on a deadline that moved into the future (a racing renewal).
    fn remove_if_expired(&self, name: &str) -> bool {
        let mut ks = self.keyspace.write().unwrap();
        let Some(meta) = ks.metas.get(name).copied() else {
            return false;
        };
        if !meta.is_expired() {
            return false;
        }
        let mut index = self.index.write().unwrap();
        remove_key(&mut ks, &mut index, name, meta);
        true
    }

    // ========================================================================
    // Snapshot
    // ========================================================================

    /// Stores a deep copy of the keyspace in the snapshot slot, replacing
    /// any prior snapshot. The copy's expiration index is rebuilt from the
    /// copied metadata so it references the copies, not the live keys.
    pub fn save(&self) -> Result<(), StoreError> {
        let mut ks = self.keyspace.write().unwrap();
        let snapshot = Snapshot {
            strings: ks.strings.clone(),
            sets: ks.sets.clone(),
            metas: ks.metas.clone(),
            index: index_of(&ks.metas),
        };
        ks.snapshot = Some(Box::new(snapshot));
        debug!("keyspace snapshot saved");
        Ok(())
    }

    /// Replaces the live keyspace with the saved snapshot and clears the
    /// slot, so a second RESTORE without an intervening SAVE fails. If a
    /// sweeper is running it is stopped and a fresh one is bound to the
    /// restored state.
    pub fn restore(&self) -> Result<(), StoreError> {
        {
            let mut ks = self.keyspace.write().unwrap();
            let snapshot = ks.snapshot.take().ok_or(StoreError::SnapshotAbsent)?;
            ks.strings = snapshot.strings;
            ks.sets = snapshot.sets;
            ks.metas = snapshot.metas;
            let mut index = self.index.write().unwrap();
            *index = snapshot.index;
        }
        self.restart_sweeper();
        debug!("keyspace restored from snapshot");
        Ok(())
    }

    /// Replaces a running sweeper with a fresh one. A no-op when no
    /// sweeper was started (dropping the old handle stops its task).
    fn restart_sweeper(&self) {
        let mut slot = self.sweeper.lock().unwrap();
        if slot.is_some() {
            *slot = Some(Sweeper::start(self.handle.clone()));
        }
    }
}

/// Removes `name` from its value mapping, the metadata map, and (when it
/// had a ttl) the expiration index. Both locks are held by the caller.
fn remove_key(ks: &mut Keyspace, index: &mut ExpiryIndex, name: &str, meta: KeyMeta) {
    match meta.kind {
        KeyKind::Scalar => {
            ks.strings.remove(name);
        }
        KeyKind::Set => {
            ks.sets.remove(name);
        }
    }
    if !meta.ttl.is_zero() {
        index.remove(meta.expires_at(), name);
    }
    ks.metas.remove(name);
}

/// Renews the key and reconciles its index entry: the old entry (if any)
/// is removed, `last_renewed` advances to now, and a new entry is inserted
/// iff the ttl is nonzero. `new_ttl` updates the ttl in the same step.
fn reindex_renewed(
    index: &mut ExpiryIndex,
    meta: &mut KeyMeta,
    name: &str,
    new_ttl: Option<Duration>,
) {
    if !meta.ttl.is_zero() {
        index.remove(meta.expires_at(), name);
    }
    if let Some(ttl) = new_ttl {
        meta.ttl = ttl;
    }
    meta.renew();
    if !meta.ttl.is_zero() {
        index.insert(meta.expires_at(), name.to_string());
    }
}

/// Builds a fresh expiration index over the given metadata map.
fn index_of(metas: &HashMap<String, KeyMeta>) -> ExpiryIndex {
    let mut index = ExpiryIndex::new();
    for (name, meta) in metas {
        if !meta.ttl.is_zero() {
            index.insert(meta.expires_at(), name.clone());
        }
    }
    index
}

#[cfg(test)]
impl Store {
    /// Number of entries in the expiration index.
    fn index_len(&self) -> usize {
        self.index.read().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn sorted(mut values: Vec<String>) -> Vec<String> {
        values.sort();
        values
    }

    #[test]
    fn test_set_and_get() {
        let store = Store::new();
        store.set("key", "value").unwrap();
        assert_eq!(store.get("key").unwrap(), "value");
    }

    #[test]
    fn test_set_overwrites() {
        let store = Store::new();
        store.set("key", "one").unwrap();
        store.set("key", "two").unwrap();
        assert_eq!(store.get("key").unwrap(), "two");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_missing_key() {
        let store = Store::new();
        assert_eq!(store.get("nope"), Err(StoreError::NotFound));
    }

    #[test]
    fn test_set_on_set_key_is_rejected_without_mutation() {
        let store = Store::new();
        store.sadd("s", &strings(&["a"])).unwrap();
        assert!(matches!(
            store.set("s", "value"),
            Err(StoreError::TypeMismatch { verb: "SET", .. })
        ));
        // The rejected write must leave no scalar behind.
        assert_eq!(sorted(store.smembers("s").unwrap()), strings(&["a"]));
        assert!(matches!(
            store.get("s"),
            Err(StoreError::TypeMismatch { verb: "GET", .. })
        ));
    }

    #[test]
    fn test_sadd_on_scalar_key_is_rejected() {
        let store = Store::new();
        store.set("k", "v").unwrap();
        assert!(matches!(
            store.sadd("k", &strings(&["a"])),
            Err(StoreError::TypeMismatch { verb: "SADD", .. })
        ));
        assert_eq!(store.get("k").unwrap(), "v");
    }

    #[test]
    fn test_sadd_is_idempotent_per_element() {
        let store = Store::new();
        store.sadd("s", &strings(&["a", "b", "a"])).unwrap();
        store.sadd("s", &strings(&["b"])).unwrap();
        assert_eq!(sorted(store.smembers("s").unwrap()), strings(&["a", "b"]));
    }

    #[test]
    fn test_srem_absent_element_is_noop() {
        let store = Store::new();
        store.sadd("s", &strings(&["a", "b"])).unwrap();
        store.srem("s", &strings(&["z"])).unwrap();
        assert_eq!(sorted(store.smembers("s").unwrap()), strings(&["a", "b"]));
    }

    #[test]
    fn test_srem_missing_key() {
        let store = Store::new();
        assert_eq!(
            store.srem("nope", &strings(&["a"])),
            Err(StoreError::NotFound)
        );
    }

    #[test]
    fn test_emptied_set_remains_a_key() {
        let store = Store::new();
        store.sadd("s", &strings(&["a"])).unwrap();
        store.srem("s", &strings(&["a"])).unwrap();
        assert_eq!(store.smembers("s").unwrap(), Vec::<String>::new());
        assert_eq!(store.keys(), vec!["s".to_string()]);
    }

    #[test]
    fn test_sinter_basic() {
        let store = Store::new();
        store.sadd("a", &strings(&["1", "2", "3"])).unwrap();
        store.sadd("b", &strings(&["2", "3", "4"])).unwrap();
        assert_eq!(
            sorted(store.sinter(&strings(&["a", "b"])).unwrap()),
            strings(&["2", "3"])
        );
    }

    #[test]
    fn test_sinter_is_commutative() {
        let store = Store::new();
        store.sadd("a", &strings(&["1", "2", "3", "4"])).unwrap();
        store.sadd("b", &strings(&["2", "4"])).unwrap();
        store.sadd("c", &strings(&["4", "2", "9"])).unwrap();
        let abc = sorted(store.sinter(&strings(&["a", "b", "c"])).unwrap());
        let cba = sorted(store.sinter(&strings(&["c", "b", "a"])).unwrap());
        assert_eq!(abc, cba);
        assert_eq!(abc, strings(&["2", "4"]));
    }

    #[test]
    fn test_sinter_with_empty_set_is_empty() {
        let store = Store::new();
        store.sadd("a", &strings(&["1", "2"])).unwrap();
        store.sadd("b", &strings(&["x"])).unwrap();
        store.srem("b", &strings(&["x"])).unwrap();
        assert_eq!(
            store.sinter(&strings(&["a", "b"])).unwrap(),
            Vec::<String>::new()
        );
    }

    #[test]
    fn test_sinter_single_key_returns_members() {
        let store = Store::new();
        store.sadd("a", &strings(&["1", "2"])).unwrap();
        assert_eq!(
            sorted(store.sinter(&strings(&["a"])).unwrap()),
            strings(&["1", "2"])
        );
    }

    #[test]
    fn test_sinter_requires_all_keys_to_be_sets() {
        let store = Store::new();
        store.sadd("a", &strings(&["1"])).unwrap();
        store.set("k", "v").unwrap();
        assert_eq!(
            store.sinter(&strings(&["a", "missing"])),
            Err(StoreError::NotFound)
        );
        assert!(matches!(
            store.sinter(&strings(&["a", "k"])),
            Err(StoreError::TypeMismatch { verb: "SINTER", .. })
        ));
    }

    #[test]
    fn test_del() {
        let store = Store::new();
        store.set("key", "value").unwrap();
        store.del("key").unwrap();
        assert_eq!(store.get("key"), Err(StoreError::NotFound));
        assert_eq!(store.del("key"), Err(StoreError::NotFound));
    }

    #[test]
    fn test_del_removes_index_entry() {
        let store = Store::new();
        store.set("key", "value").unwrap();
        store.expire("key", Duration::from_secs(60)).unwrap();
        assert_eq!(store.index_len(), 1);
        store.del("key").unwrap();
        assert_eq!(store.index_len(), 0);
    }

    #[test]
    fn test_expire_and_ttl_round_up() {
        let store = Store::new();
        store.set("key", "value").unwrap();
        store.expire("key", Duration::from_secs(10)).unwrap();
        // Immediately after EXPIRE the remaining 9.99... s reports as 10.
        assert_eq!(store.ttl("key").unwrap(), 10);
    }

    #[test]
    fn test_ttl_failure_taxonomy() {
        let store = Store::new();
        assert_eq!(store.ttl("missing"), Err(StoreError::NotFound));

        store.set("persistent", "v").unwrap();
        assert_eq!(store.ttl("persistent"), Err(StoreError::NoExpiration));

        store.set("gone", "v").unwrap();
        store.expire("gone", Duration::from_millis(20)).unwrap();
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(store.ttl("gone"), Err(StoreError::Expired));
    }

    #[test]
    fn test_expire_missing_key() {
        let store = Store::new();
        assert_eq!(
            store.expire("nope", Duration::from_secs(1)),
            Err(StoreError::NotFound)
        );
    }

    #[test]
    fn test_expire_zero_clears_expiry() {
        let store = Store::new();
        store.set("key", "value").unwrap();
        store.expire("key", Duration::from_secs(60)).unwrap();
        assert_eq!(store.index_len(), 1);

        store.expire("key", Duration::ZERO).unwrap();
        assert_eq!(store.index_len(), 0);
        assert_eq!(store.ttl("key"), Err(StoreError::NoExpiration));
    }

    #[test]
    fn test_expire_refresh_renews_deadline() {
        let store = Store::new();
        store.set("key", "value").unwrap();
        store.expire("key", Duration::from_millis(50)).unwrap();
        std::thread::sleep(Duration::from_millis(30));
        store.expire("key", Duration::from_secs(60)).unwrap();
        std::thread::sleep(Duration::from_millis(40));
        // The original 50 ms deadline has passed; the renewal wins.
        assert_eq!(store.get("key").unwrap(), "value");
        assert_eq!(store.ttl("key").unwrap(), 60);
        assert_eq!(store.index_len(), 1);
    }

    #[test]
    fn test_set_renews_but_sadd_does_not() {
        let store = Store::new();
        store.set("scalar", "v").unwrap();
        store.expire("scalar", Duration::from_millis(100)).unwrap();
        store.sadd("set", &strings(&["a"])).unwrap();
        store.expire("set", Duration::from_millis(100)).unwrap();

        std::thread::sleep(Duration::from_millis(60));
        store.set("scalar", "v2").unwrap();
        store.sadd("set", &strings(&["b"])).unwrap();
        std::thread::sleep(Duration::from_millis(60));

        // SET advanced the scalar's deadline; SADD left the set's alone.
        store.prune_expired(&strings(&["scalar", "set"]));
        assert_eq!(store.get("scalar").unwrap(), "v2");
        assert_eq!(store.smembers("set"), Err(StoreError::NotFound));
    }

    #[test]
    fn test_keys_lists_live_and_deletes_expired() {
        let store = Store::new();
        store.set("live", "v").unwrap();
        store.set("dead", "v").unwrap();
        store.expire("dead", Duration::from_millis(20)).unwrap();
        std::thread::sleep(Duration::from_millis(40));

        assert_eq!(store.keys(), vec!["live".to_string()]);
        // The expired key was deleted during the scan, index included.
        assert_eq!(store.len(), 1);
        assert_eq!(store.index_len(), 0);
    }

    #[test]
    fn test_keys_on_empty_store() {
        let store = Store::new();
        assert_eq!(store.keys(), Vec::<String>::new());
    }

    #[test]
    fn test_prune_expired_only_touches_due_keys() {
        let store = Store::new();
        store.set("due", "v").unwrap();
        store.expire("due", Duration::from_millis(20)).unwrap();
        store.set("fresh", "v").unwrap();
        store.expire("fresh", Duration::from_secs(60)).unwrap();
        std::thread::sleep(Duration::from_millis(40));

        store.prune_expired(&strings(&["due", "fresh", "absent"]));
        assert_eq!(store.get("due"), Err(StoreError::NotFound));
        assert_eq!(store.get("fresh").unwrap(), "v");
    }

    #[test]
    fn test_sweep_expired_removes_due_keys_only() {
        let store = Store::new();
        store.set("due1", "v").unwrap();
        store.expire("due1", Duration::from_millis(20)).unwrap();
        store.sadd("due2", &strings(&["a"])).unwrap();
        store.expire("due2", Duration::from_millis(20)).unwrap();
        store.set("later", "v").unwrap();
        store.expire("later", Duration::from_secs(60)).unwrap();
        std::thread::sleep(Duration::from_millis(40));

        assert_eq!(store.sweep_expired(), 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.index_len(), 1);
        assert_eq!(store.get("later").unwrap(), "v");
    }

    #[test]
    fn test_index_tracks_expiring_keys_exactly() {
        let store = Store::new();
        store.set("a", "v").unwrap();
        store.sadd("b", &strings(&["x"])).unwrap();
        assert_eq!(store.index_len(), 0);

        store.expire("a", Duration::from_secs(30)).unwrap();
        store.expire("b", Duration::from_secs(30)).unwrap();
        assert_eq!(store.index_len(), 2);

        // A renewal replaces the entry rather than duplicating it.
        store.expire("a", Duration::from_secs(60)).unwrap();
        assert_eq!(store.index_len(), 2);

        store.expire("a", Duration::ZERO).unwrap();
        assert_eq!(store.index_len(), 1);
    }

    #[test]
    fn test_save_restore_round_trip() {
        let store = Store::new();
        store.set("k1", "a").unwrap();
        store.sadd("k2", &strings(&["x", "y"])).unwrap();
        store.save().unwrap();

        store.del("k1").unwrap();
        store.sadd("k2", &strings(&["z"])).unwrap();
        store.set("k3", "new").unwrap();

        store.restore().unwrap();
        assert_eq!(store.get("k1").unwrap(), "a");
        assert_eq!(sorted(store.smembers("k2").unwrap()), strings(&["x", "y"]));
        assert_eq!(store.get("k3"), Err(StoreError::NotFound));
    }

    #[test]
    fn test_restore_without_save_fails() {
        let store = Store::new();
        assert_eq!(store.restore(), Err(StoreError::SnapshotAbsent));
    }

    #[test]
    fn test_restore_clears_the_snapshot_slot() {
        let store = Store::new();
        store.set("k", "v").unwrap();
        store.save().unwrap();
        store.restore().unwrap();
        assert_eq!(store.restore(), Err(StoreError::SnapshotAbsent));
    }

    #[test]
    fn test_save_overwrites_prior_snapshot() {
        let store = Store::new();
        store.set("k", "first").unwrap();
        store.save().unwrap();
        store.set("k", "second").unwrap();
        store.save().unwrap();
        store.set("k", "third").unwrap();

        store.restore().unwrap();
        assert_eq!(store.get("k").unwrap(), "second");
    }

    #[test]
    fn test_snapshot_is_a_disjoint_copy() {
        let store = Store::new();
        store.sadd("s", &strings(&["a"])).unwrap();
        store.save().unwrap();
        // Mutating the live set must not leak into the snapshot.
        store.sadd("s", &strings(&["b"])).unwrap();
        store.restore().unwrap();
        assert_eq!(sorted(store.smembers("s").unwrap()), strings(&["a"]));
    }

    #[test]
    fn test_restore_rebuilds_the_expiration_index() {
        let store = Store::new();
        store.set("k", "v").unwrap();
        store.expire("k", Duration::from_secs(60)).unwrap();
        store.save().unwrap();
        store.del("k").unwrap();
        assert_eq!(store.index_len(), 0);

        store.restore().unwrap();
        assert_eq!(store.index_len(), 1);
        assert_eq!(store.ttl("k").unwrap(), 60);
    }

    #[test]
    fn test_concurrent_access() {
        use std::thread;

        let store = Store::new();
        let mut handles = vec![];

        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for j in 0..100 {
                    let key = format!("key-{}-{}", i, j);
                    store.set(&key, "value").unwrap();
                    store.get(&key).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 800);
    }
}
