//! An [`ItemStore`] that keeps everything in memory.

use super::{
    item::{CheckoutLine, Item, ItemPatch, NewItem},
    item_store::{ItemStore, StoreError, StoreResult},
};
use crate::infra::validation::Valid;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::instrument;

#[derive(Debug, Default)]
struct Inventory {
    last_id: i32,
    items: Vec<Item>,
}

impl Inventory {
    fn position(&self, barcode: &str) -> Option<usize> {
        self.items.iter().position(|item| item.barcode == barcode)
    }
}

/// An in-memory store.
///
/// One lock is held for the whole of every operation,
/// so concurrent checkouts of the same item never lose an update.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inventory: Mutex<Inventory>,
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn init(&self) -> StoreResult<()> {
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self) -> StoreResult<Vec<Item>> {
        let inventory = self.inventory.lock().await;
        tracing::debug!("Listed {} items", inventory.items.len());
        Ok(inventory.items.clone())
    }

    #[instrument(skip(self))]
    async fn get(&self, barcode: &str) -> StoreResult<Item> {
        let inventory = self.inventory.lock().await;
        inventory
            .items
            .iter()
            .find(|item| item.barcode == barcode)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(barcode.to_string()))
    }

    #[instrument(skip(self))]
    async fn insert(&self, new_item: Valid<NewItem>) -> StoreResult<Item> {
        let new_item = new_item.into_inner();
        let mut inventory = self.inventory.lock().await;
        if inventory.position(&new_item.barcode).is_some() {
            return Err(StoreError::Conflict(new_item.barcode));
        }
        inventory.last_id += 1;
        let item = Item::new(inventory.last_id, new_item);
        inventory.items.push(item.clone());
        Ok(item)
    }

    #[instrument(skip(self))]
    async fn update(&self, barcode: &str, patch: Valid<ItemPatch>) -> StoreResult<Item> {
        let patch = patch.into_inner();
        let mut inventory = self.inventory.lock().await;
        let index = inventory
            .position(barcode)
            .ok_or_else(|| StoreError::NotFound(barcode.to_string()))?;
        if let Some(new_barcode) = &patch.barcode {
            if inventory
                .position(new_barcode)
                .is_some_and(|other| other != index)
            {
                return Err(StoreError::Conflict(new_barcode.clone()));
            }
        }
        let item = &mut inventory.items[index];
        item.apply(patch);
        Ok(item.clone())
    }

    #[instrument(skip(self))]
    async fn delete(&self, barcode: &str) -> StoreResult<()> {
        let mut inventory = self.inventory.lock().await;
        let index = inventory
            .position(barcode)
            .ok_or_else(|| StoreError::NotFound(barcode.to_string()))?;
        inventory.items.remove(index);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn checkout(&self, lines: Vec<CheckoutLine>) -> StoreResult<()> {
        let mut inventory = self.inventory.lock().await;
        for line in &lines {
            match inventory.position(&line.barcode) {
                Some(index) => inventory.items[index].take(line.quantity),
                None => tracing::debug!("Skipping unknown barcode {:?}", line.barcode),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_item(barcode: &str, quantity: i32) -> Valid<NewItem> {
        Valid::new(NewItem {
            barcode: barcode.to_string(),
            name: format!("Item {barcode}"),
            quantity,
            description: Some("Something".to_string()),
            price: 1.5,
        })
        .unwrap()
    }

    fn line(barcode: &str, quantity: i32) -> CheckoutLine {
        CheckoutLine {
            barcode: barcode.to_string(),
            quantity,
        }
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = MemoryStore::default();
        let first = store.insert(new_item("A1", 1)).await.unwrap();
        let second = store.insert(new_item("B2", 1)).await.unwrap();
        assert_eq!(1, first.id);
        assert_eq!(2, second.id);
        assert_eq!(vec![first, second], store.list().await.unwrap());
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = MemoryStore::default();
        store.insert(new_item("A1", 1)).await.unwrap();
        store.delete("A1").await.unwrap();
        let item = store.insert(new_item("A1", 1)).await.unwrap();
        assert_eq!(2, item.id);
    }

    #[tokio::test]
    async fn duplicate_barcode_conflicts() {
        let store = MemoryStore::default();
        store.insert(new_item("A1", 1)).await.unwrap();
        let result = store.insert(new_item("A1", 5)).await;
        assert!(matches!(result, Err(StoreError::Conflict(b)) if b == "A1"));
        assert_eq!(1, store.list().await.unwrap().len());
    }

    #[tokio::test]
    async fn update_to_taken_barcode_conflicts() {
        let store = MemoryStore::default();
        store.insert(new_item("A1", 1)).await.unwrap();
        store.insert(new_item("B2", 1)).await.unwrap();
        let patch = Valid::new(ItemPatch {
            barcode: Some("B2".to_string()),
            ..Default::default()
        })
        .unwrap();
        let result = store.update("A1", patch).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert_eq!("A1", store.get("A1").await.unwrap().barcode);
    }

    #[tokio::test]
    async fn update_may_keep_own_barcode() {
        let store = MemoryStore::default();
        store.insert(new_item("A1", 1)).await.unwrap();
        let patch = Valid::new(ItemPatch {
            barcode: Some("A1".to_string()),
            quantity: Some(8),
            ..Default::default()
        })
        .unwrap();
        let item = store.update("A1", patch).await.unwrap();
        assert_eq!(8, item.quantity);
    }

    #[tokio::test]
    async fn checkout_decrements_and_clamps() {
        let store = MemoryStore::default();
        store.insert(new_item("A1", 10)).await.unwrap();
        store.insert(new_item("B2", 4)).await.unwrap();

        store
            .checkout(vec![line("A1", 3), line("B2", 9), line("ZZ", 5)])
            .await
            .unwrap();

        assert_eq!(7, store.get("A1").await.unwrap().quantity);
        assert_eq!(0, store.get("B2").await.unwrap().quantity);
    }

    #[tokio::test]
    async fn repeated_lines_are_applied_in_order() {
        let store = MemoryStore::default();
        store.insert(new_item("A1", 10)).await.unwrap();
        store
            .checkout(vec![line("A1", 4), line("A1", 4), line("A1", 4)])
            .await
            .unwrap();
        assert_eq!(0, store.get("A1").await.unwrap().quantity);
    }

    #[tokio::test]
    async fn concurrent_checkouts_do_not_lose_updates() {
        let store = Arc::new(MemoryStore::default());
        store.insert(new_item("A1", 100)).await.unwrap();

        let tasks: Vec<_> = (0..10)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.checkout(vec![line("A1", 3)]).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(70, store.get("A1").await.unwrap().quantity);
    }
}
