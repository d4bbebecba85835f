//! Item storage for the API service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ItemError {
    #[error("{0}")]
    Validation(String),

    #[error("item {0} not found")]
    NotFound(Uuid),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Body of an item creation request.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NewItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A thread-safe keyed item store. Cloning shares the underlying map.
#[derive(Clone, Default)]
pub struct ItemStore {
    inner: Arc<DashMap<Uuid, Item>>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, new: NewItem) -> Result<Item, ItemError> {
        if new.name.trim().is_empty() {
            return Err(ItemError::Validation("item name must not be empty".to_string()));
        }

        let item = loop {
            let id = Uuid::new_v4();
            if let dashmap::mapref::entry::Entry::Vacant(slot) = self.inner.entry(id) {
                let item = Item {
                    id,
                    name: new.name,
                    description: new.description,
                    created_at: Utc::now(),
                };
                slot.insert(item.clone());
                break item;
            }
        };

        tracing::info!(item_id = %item.id, item_name = %item.name, "Item created");
        Ok(item)
    }

    pub fn get(&self, id: Uuid) -> Result<Item, ItemError> {
        self.inner
            .get(&id)
            .map(|r| r.value().clone())
            .ok_or(ItemError::NotFound(id))
    }

    /// All items, oldest first.
    pub fn list(&self) -> Vec<Item> {
        let mut items: Vec<Item> = self.inner.iter().map(|r| r.value().clone()).collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        items
    }

    pub fn delete(&self, id: Uuid) -> Result<Item, ItemError> {
        let (_, item) = self.inner.remove(&id).ok_or(ItemError::NotFound(id))?;
        tracing::info!(item_id = %id, "Item deleted");
        Ok(item)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
