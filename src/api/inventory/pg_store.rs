//! An [`ItemStore`] backed by PostgreSQL.

use super::{
    item::{CheckoutLine, Item, ItemPatch, NewItem},
    item_store::{ItemStore, StoreError, StoreResult},
};
use crate::infra::{database::DbPool, validation::Valid};
use async_trait::async_trait;
use tracing::{instrument, Instrument};

/// Turns a unique violation on `items.barcode` into [`StoreError::Conflict`].
fn conflict_on(barcode: &str) -> impl FnOnce(sqlx::Error) -> StoreError + '_ {
    move |e| match e {
        sqlx::Error::Database(e) if e.is_unique_violation() => {
            StoreError::Conflict(barcode.to_string())
        }
        e => StoreError::Unavailable(e),
    }
}

/// A PostgreSQL store.
#[derive(Clone, Debug)]
pub struct PgStore {
    db: DbPool,
}

impl PgStore {
    /// Creates a store on top of a connection pool.
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ItemStore for PgStore {
    #[instrument(skip(self))]
    async fn init(&self) -> StoreResult<()> {
        tracing::info!("Running migrations");
        sqlx::migrate!("./migrations").run(&self.db).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self) -> StoreResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, barcode, name, quantity, description, price FROM items
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .instrument(tracing::info_span!("fetch_all"))
        .await?;
        tracing::debug!("Listed {} items", items.len());
        Ok(items)
    }

    #[instrument(skip(self))]
    async fn get(&self, barcode: &str) -> StoreResult<Item> {
        sqlx::query_as::<_, Item>(
            r#"
            SELECT id, barcode, name, quantity, description, price FROM items
            WHERE barcode = $1
            "#,
        )
        .bind(barcode)
        .fetch_optional(&self.db)
        .instrument(tracing::info_span!("fetch_optional"))
        .await?
        .ok_or_else(|| StoreError::NotFound(barcode.to_string()))
    }

    #[instrument(skip(self))]
    async fn insert(&self, new_item: Valid<NewItem>) -> StoreResult<Item> {
        let new_item = new_item.into_inner();
        let item = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (barcode, name, quantity, description, price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, barcode, name, quantity, description, price
            "#,
        )
        .bind(&new_item.barcode)
        .bind(&new_item.name)
        .bind(new_item.quantity)
        .bind(&new_item.description)
        .bind(new_item.price)
        .fetch_one(&self.db)
        .await
        .map_err(conflict_on(&new_item.barcode))?;
        Ok(item)
    }

    #[instrument(skip(self))]
    async fn update(&self, barcode: &str, patch: Valid<ItemPatch>) -> StoreResult<Item> {
        let patch = patch.into_inner();
        let mut tx = self.db.begin().await?;
        let mut current = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, barcode, name, quantity, description, price FROM items
            WHERE barcode = $1
            FOR UPDATE
            "#,
        )
        .bind(barcode)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::NotFound(barcode.to_string()))?;

        current.apply(patch);
        let item = sqlx::query_as::<_, Item>(
            r#"
            UPDATE items
            SET barcode = $2, name = $3, quantity = $4, description = $5, price = $6
            WHERE id = $1
            RETURNING id, barcode, name, quantity, description, price
            "#,
        )
        .bind(current.id)
        .bind(&current.barcode)
        .bind(&current.name)
        .bind(current.quantity)
        .bind(&current.description)
        .bind(current.price)
        .fetch_one(&mut *tx)
        .await
        .map_err(conflict_on(&current.barcode))?;
        tx.commit().await?;
        Ok(item)
    }

    #[instrument(skip(self))]
    async fn delete(&self, barcode: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM items WHERE barcode = $1")
            .bind(barcode)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(barcode.to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn checkout(&self, mut lines: Vec<CheckoutLine>) -> StoreResult<()> {
        // Rows are locked in barcode order so concurrent batches cannot deadlock.
        // The clamped result does not depend on the order of the lines.
        lines.sort_by(|a, b| a.barcode.cmp(&b.barcode));
        // Dropping the transaction on error rolls back every line.
        let mut tx = self.db.begin().await?;
        for line in &lines {
            let result = sqlx::query(
                r#"
                UPDATE items
                SET quantity = GREATEST(quantity - $2, 0)
                WHERE barcode = $1
                "#,
            )
            .bind(&line.barcode)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() == 0 {
                tracing::debug!("Skipping unknown barcode {:?}", line.barcode);
            }
        }
        tx.commit().await?;
        Ok(())
    }
}
