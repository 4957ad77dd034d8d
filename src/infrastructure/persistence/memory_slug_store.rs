//! In-process slug store.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::domain::entities::LinkRecord;
use crate::domain::repositories::{SlugStore, StoreError};

/// Slug store backed by a sharded concurrent map.
///
/// Put-if-absent goes through the map's entry API, which holds the shard lock
/// for the check and the insert, so concurrent creations of the same slug
/// resolve to exactly one winner. Used when no database is configured and in
/// tests; contents are lost on restart.
#[derive(Default)]
pub struct MemorySlugStore {
    links: DashMap<String, LinkRecord>,
}

impl MemorySlugStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[async_trait]
impl SlugStore for MemorySlugStore {
    async fn get(&self, slug: &str) -> Result<Option<LinkRecord>, StoreError> {
        Ok(self.links.get(slug).map(|r| r.value().clone()))
    }

    async fn put(&self, record: LinkRecord, overwrite: bool) -> Result<(), StoreError> {
        match self.links.entry(record.slug.clone()) {
            Entry::Occupied(mut existing) => {
                if !overwrite {
                    return Err(StoreError::Conflict { slug: record.slug });
                }
                existing.insert(record);
            }
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
        }

        Ok(())
    }

    async fn delete(&self, slug: &str) -> Result<(), StoreError> {
        self.links
            .remove(slug)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                slug: slug.to_string(),
            })
    }

    async fn health_check(&self) -> bool {
        true
    }
}
