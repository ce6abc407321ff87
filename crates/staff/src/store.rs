//! Tenant-isolated record storage.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

use consultdesk_core::{Entity, TenantId};

/// Tenant-isolated key/value store abstraction for directory records.
///
/// `list` returns records in first-insertion order; re-upserting an existing
/// key keeps its position.
pub trait TenantStore<K, V>: Send + Sync {
    fn get(&self, tenant_id: TenantId, key: &K) -> Option<V>;
    fn upsert(&self, tenant_id: TenantId, key: K, value: V);
    fn remove(&self, tenant_id: TenantId, key: &K) -> Option<V>;
    fn list(&self, tenant_id: TenantId) -> Vec<V>;

    /// Upsert a record under its own identifier.
    fn save(&self, tenant_id: TenantId, value: V)
    where
        K: Clone,
        V: Entity<Id = K>,
    {
        self.upsert(tenant_id, value.id().clone(), value);
    }
}

impl<K, V, S> TenantStore<K, V> for Arc<S>
where
    S: TenantStore<K, V> + ?Sized,
{
    fn get(&self, tenant_id: TenantId, key: &K) -> Option<V> {
        (**self).get(tenant_id, key)
    }

    fn upsert(&self, tenant_id: TenantId, key: K, value: V) {
        (**self).upsert(tenant_id, key, value)
    }

    fn remove(&self, tenant_id: TenantId, key: &K) -> Option<V> {
        (**self).remove(tenant_id, key)
    }

    fn list(&self, tenant_id: TenantId) -> Vec<V> {
        (**self).list(tenant_id)
    }
}

#[derive(Debug)]
struct Slots<K, V> {
    next_seq: u64,
    entries: HashMap<(TenantId, K), (u64, V)>,
}

/// In-memory tenant-isolated store.
#[derive(Debug)]
pub struct InMemoryTenantStore<K, V> {
    inner: RwLock<Slots<K, V>>,
}

impl<K, V> InMemoryTenantStore<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Slots {
                next_seq: 0,
                entries: HashMap::new(),
            }),
        }
    }
}

impl<K, V> Default for InMemoryTenantStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> TenantStore<K, V> for InMemoryTenantStore<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, tenant_id: TenantId, key: &K) -> Option<V> {
        let slots = self.inner.read().ok()?;
        slots
            .entries
            .get(&(tenant_id, key.clone()))
            .map(|(_, v)| v.clone())
    }

    fn upsert(&self, tenant_id: TenantId, key: K, value: V) {
        if let Ok(mut slots) = self.inner.write() {
            let Slots { next_seq, entries } = &mut *slots;
            match entries.entry((tenant_id, key)) {
                Entry::Occupied(mut slot) => slot.get_mut().1 = value,
                Entry::Vacant(slot) => {
                    slot.insert((*next_seq, value));
                    *next_seq += 1;
                }
            }
        }
    }

    fn remove(&self, tenant_id: TenantId, key: &K) -> Option<V> {
        let mut slots = self.inner.write().ok()?;
        slots
            .entries
            .remove(&(tenant_id, key.clone()))
            .map(|(_, v)| v)
    }

    fn list(&self, tenant_id: TenantId) -> Vec<V> {
        let slots = match self.inner.read() {
            Ok(s) => s,
            Err(_) => return vec![],
        };

        let mut rows: Vec<(u64, V)> = slots
            .entries
            .iter()
            .filter(|((t, _k), _)| *t == tenant_id)
            .map(|(_, (seq, v))| (*seq, v.clone()))
            .collect();
        rows.sort_by_key(|(seq, _)| *seq);
        rows.into_iter().map(|(_, v)| v).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_preserves_insertion_order_across_updates() {
        let store: InMemoryTenantStore<&'static str, u32> = InMemoryTenantStore::new();
        let tenant = TenantId::new();

        store.upsert(tenant, "c", 1);
        store.upsert(tenant, "a", 2);
        store.upsert(tenant, "b", 3);
        store.upsert(tenant, "c", 10);

        assert_eq!(store.list(tenant), vec![10, 2, 3]);
    }

    #[test]
    fn tenants_are_isolated() {
        let store: InMemoryTenantStore<u8, &'static str> = InMemoryTenantStore::new();
        let t1 = TenantId::new();
        let t2 = TenantId::new();

        store.upsert(t1, 1, "one");
        assert_eq!(store.get(t2, &1), None);
        assert!(store.list(t2).is_empty());
        assert_eq!(store.get(t1, &1), Some("one"));
    }

    #[test]
    fn remove_returns_the_record() {
        let store: InMemoryTenantStore<u8, &'static str> = InMemoryTenantStore::new();
        let tenant = TenantId::new();

        store.upsert(tenant, 7, "seven");
        assert_eq!(store.remove(tenant, &7), Some("seven"));
        assert_eq!(store.remove(tenant, &7), None);
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Badge {
        code: String,
        holder: &'static str,
    }

    impl Entity for Badge {
        type Id = String;

        fn id(&self) -> &Self::Id {
            &self.code
        }
    }

    #[test]
    fn save_keys_records_by_their_own_id() {
        let store: Arc<dyn TenantStore<String, Badge>> = Arc::new(InMemoryTenantStore::new());
        let tenant = TenantId::new();
        let badge = |holder| Badge { code: "b-1".into(), holder };

        store.save(tenant, badge("sita"));
        store.save(tenant, badge("hari"));

        assert_eq!(store.get(tenant, &"b-1".to_string()), Some(badge("hari")));
        assert_eq!(store.list(tenant).len(), 1);
    }
}
