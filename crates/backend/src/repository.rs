//! Typed access to a table.

use std::marker::PhantomData;
use std::sync::Arc;

use forgepilot_core::{Record, RowId};
use serde_json::Value;

use crate::error::BackendError;
use crate::query::Query;
use crate::store::{Row, TableStore};

/// Reads and writes rows of `T::TABLE` as `T`.
///
/// Rows are validated on the way in. List reads skip invalid rows with a
/// warning so one bad row can't blank a page; single-row reads report them.
pub struct Repository<T> {
    store: Arc<dyn TableStore>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _record: PhantomData,
        }
    }
}

impl<T: Record> Repository<T> {
    #[must_use]
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    /// All rows in the record's default order.
    ///
    /// # Errors
    ///
    /// Returns error if the backend call fails.
    pub async fn list(&self) -> Result<Vec<T>, BackendError> {
        self.list_where(&Query::for_record::<T>()).await
    }

    /// Rows matching `query`, skipping rows that fail validation.
    ///
    /// # Errors
    ///
    /// Returns error if the backend call fails.
    pub async fn list_where(&self, query: &Query) -> Result<Vec<T>, BackendError> {
        let rows = self.store.select(T::TABLE, query).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| match decode::<T>(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(table = T::TABLE, error = %e, "Skipping invalid row");
                    None
                }
            })
            .collect())
    }

    /// First row matching `query`.
    ///
    /// # Errors
    ///
    /// Returns error if the backend call fails or the row is invalid.
    pub async fn find(&self, query: Query) -> Result<Option<T>, BackendError> {
        let rows = self.store.select(T::TABLE, &query.limit(1)).await?;
        rows.into_iter().next().map(decode::<T>).transpose()
    }

    /// First row matching `column = value`.
    ///
    /// # Errors
    ///
    /// Returns error if the backend call fails or the row is invalid.
    pub async fn find_by(&self, column: &str, value: &str) -> Result<Option<T>, BackendError> {
        self.find(Query::new().eq(column, value)).await
    }

    /// The row with primary key `id`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if no row has that id.
    pub async fn get(&self, id: RowId) -> Result<T, BackendError> {
        self.find(Query::new().eq("id", id))
            .await?
            .ok_or_else(|| BackendError::NotFound(format!("{} row {id}", T::TABLE)))
    }

    /// The table's only (or first) row, for single-row tables.
    ///
    /// # Errors
    ///
    /// Returns error if the backend call fails or the row is invalid.
    pub async fn single(&self) -> Result<Option<T>, BackendError> {
        self.find(Query::for_record::<T>()).await
    }

    /// Insert a new row.
    ///
    /// # Errors
    ///
    /// Returns error if the record is invalid or the backend call fails.
    pub async fn insert(&self, record: &T) -> Result<T, BackendError> {
        let row = encode(record)?;
        decode(self.store.insert(T::TABLE, row).await?)
    }

    /// Replace the row with primary key `id`.
    ///
    /// # Errors
    ///
    /// Returns error if the record is invalid, the row doesn't exist, or the
    /// backend call fails.
    pub async fn update(&self, id: RowId, record: &T) -> Result<T, BackendError> {
        let row = encode(record)?;
        decode(self.store.update(T::TABLE, id, row).await?)
    }

    /// Insert when the record has no id yet, update otherwise.
    ///
    /// # Errors
    ///
    /// See [`Self::insert`] and [`Self::update`].
    pub async fn save(&self, record: &T) -> Result<T, BackendError> {
        match record.id() {
            Some(id) => self.update(id, record).await,
            None => self.insert(record).await,
        }
    }

    /// Insert or merge by id.
    ///
    /// # Errors
    ///
    /// Returns error if the record is invalid or the backend call fails.
    pub async fn upsert(&self, record: &T) -> Result<T, BackendError> {
        let row = encode(record)?;
        decode(self.store.upsert(T::TABLE, row).await?)
    }

    /// Delete the row with primary key `id`. Deleting a missing row succeeds.
    ///
    /// # Errors
    ///
    /// Returns error if the backend call fails.
    pub async fn delete(&self, id: RowId) -> Result<(), BackendError> {
        self.store.delete(T::TABLE, id).await
    }
}

/// Null columns are dropped before decoding so record field defaults apply.
fn decode<T: Record>(mut row: Row) -> Result<T, BackendError> {
    row.retain(|_, v| !v.is_null());
    let record: T =
        serde_json::from_value(Value::Object(row)).map_err(|e| BackendError::Decode {
            table: T::TABLE.to_string(),
            reason: e.to_string(),
        })?;
    record.validate().map_err(|e| BackendError::Invalid {
        table: T::TABLE.to_string(),
        reason: e.to_string(),
    })?;
    Ok(record)
}

fn encode<T: Record>(record: &T) -> Result<Row, BackendError> {
    record.validate().map_err(|e| BackendError::Invalid {
        table: T::TABLE.to_string(),
        reason: e.to_string(),
    })?;
    match serde_json::to_value(record) {
        Ok(Value::Object(row)) => Ok(row),
        Ok(_) => Err(BackendError::Decode {
            table: T::TABLE.to_string(),
            reason: "record did not serialize to an object".to_string(),
        }),
        Err(e) => Err(BackendError::Decode {
            table: T::TABLE.to_string(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use forgepilot_core::{Faq, Post, PublishStatus, Testimonial};
    use serde_json::json;

    use super::*;
    use crate::memory::MemoryBackend;

    fn setup() -> (MemoryBackend, Arc<dyn TableStore>) {
        let backend = MemoryBackend::new();
        let store: Arc<dyn TableStore> = Arc::new(backend.clone());
        (backend, store)
    }

    #[tokio::test]
    async fn test_save_inserts_then_updates() {
        let (_, store) = setup();
        let repo = Repository::<Faq>::new(store);
        let created = repo
            .save(&Faq {
                question: "Do you do retainers?".into(),
                answer: "Yes".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let id = created.id.unwrap();

        let updated = repo
            .save(&Faq {
                answer: "Yes, monthly".into(),
                ..created
            })
            .await
            .unwrap();
        assert_eq!(updated.id, Some(id));
        assert_eq!(repo.get(id).await.unwrap().answer, "Yes, monthly");
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_record_never_written() {
        let (backend, store) = setup();
        let repo = Repository::<Faq>::new(store);
        let err = repo.insert(&Faq::default()).await.unwrap_err();
        assert!(matches!(err, BackendError::Invalid { .. }));
        assert!(backend.rows("faqs").await.is_empty());
    }

    #[tokio::test]
    async fn test_list_skips_invalid_rows_and_nulls_default() {
        let (backend, store) = setup();
        for row in [
            json!({"author": "Sam", "quote": "Great", "rating": 5, "avatar_url": null}),
            json!({"author": "Bad", "quote": "Rating out of range", "rating": 9}),
        ] {
            backend
                .insert("testimonials", row.as_object().unwrap().clone())
                .await
                .unwrap();
        }

        let repo = Repository::<Testimonial>::new(store);
        let rows = repo.list().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].author, "Sam");
        assert_eq!(rows[0].avatar_url, "");
    }

    #[tokio::test]
    async fn test_single_row_read_reports_invalid() {
        let (backend, store) = setup();
        backend
            .insert(
                "posts",
                json!({"title": "Hi", "slug": "Not A Slug"})
                    .as_object()
                    .unwrap()
                    .clone(),
            )
            .await
            .unwrap();
        let repo = Repository::<Post>::new(store);
        let err = repo.find_by("title", "Hi").await.unwrap_err();
        assert!(matches!(err, BackendError::Invalid { .. }));
    }

    #[tokio::test]
    async fn test_find_by_slug() {
        let (_, store) = setup();
        let repo = Repository::<Post>::new(store);
        repo.insert(&Post {
            title: "Launch".into(),
            slug: "launch".into(),
            status: PublishStatus::Published,
            ..Default::default()
        })
        .await
        .unwrap();
        assert!(repo.find_by("slug", "launch").await.unwrap().is_some());
        assert!(repo.find_by("slug", "missing").await.unwrap().is_none());
    }
}
