use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tikmap_api::mapping::{Entity, EntityMetadata};

type AnyMetadata = Arc<dyn Any + Send + Sync>;

/// Per-entity-type cache of accessor lists.
///
/// Metadata is built outside the lock on first request. When two callers
/// race on the same type, the first insert wins and the other copy is
/// dropped, so every caller gets the same `Arc`.
#[derive(Default)]
pub struct EntityMetadataCache {
    entries: RwLock<HashMap<TypeId, AnyMetadata>>,
}

impl std::fmt::Debug for EntityMetadataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityMetadataCache")
            .field("types", &self.len())
            .finish()
    }
}

static GLOBAL: LazyLock<EntityMetadataCache> = LazyLock::new(EntityMetadataCache::new);

/// Process-wide cache used by the load strategies.
pub fn global() -> &'static EntityMetadataCache {
    &GLOBAL
}

/// Metadata of `T` from the process-wide cache.
pub fn metadata<T: Entity>() -> Arc<EntityMetadata<T>> {
    GLOBAL.get::<T>()
}

impl EntityMetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: Entity>(&self) -> Arc<EntityMetadata<T>> {
        if let Some(found) = self.lookup::<T>() {
            return found;
        }

        let built = Arc::new(EntityMetadata::<T>::build());
        tracing::debug!(entity = built.entity(), fields = built.len(), "built entity metadata");

        let stored = {
            let mut guard = self.write();
            guard
                .entry(TypeId::of::<T>())
                .or_insert_with(|| built.clone() as AnyMetadata)
                .clone()
        };

        match stored.downcast::<EntityMetadata<T>>() {
            Ok(metadata) => metadata,
            Err(_) => {
                tracing::error!(entity = built.entity(), "metadata cache entry has wrong type");
                built
            }
        }
    }

    pub fn contains<T: Entity>(&self) -> bool {
        self.read().contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup<T: Entity>(&self) -> Option<Arc<EntityMetadata<T>>> {
        let entry = self.read().get(&TypeId::of::<T>()).cloned()?;
        entry.downcast::<EntityMetadata<T>>().ok()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<TypeId, AnyMetadata>> {
        match self.entries.read() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("metadata cache read lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<TypeId, AnyMetadata>> {
        match self.entries.write() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("metadata cache write lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}
