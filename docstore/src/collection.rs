use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::Row;
use tracing::{debug, info};

use crate::{Database, Result, StoreError};

/// Collection-scoped document operations.
///
/// Each collection is one table holding whole documents as JSON text. The
/// store is keyed by plain strings; callers that need a particular id format
/// validate it before calling in here. "Not found" is always reported as
/// [`StoreError::NotFound`] so callers can tell absence apart from real
/// failures.
pub struct Collection<'a> {
    db: &'a Database,
    name: String,
    table: String,
}

impl<'a> Collection<'a> {
    /// Create a handle for one named collection
    pub fn new(db: &'a Database, name: &str) -> Self {
        let table = format!("docs_{}", name);
        Self {
            db,
            name: name.to_string(),
            table,
        }
    }

    /// Name of the collection this handle is scoped to
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create the backing table if it does not exist yet
    pub async fn ensure(&self) -> Result<()> {
        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY,
                doc TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            self.table
        );
        sqlx::query(&sql).execute(self.db.pool()).await?;
        debug!("Ensured collection table: {}", self.table);
        Ok(())
    }

    /// Fetch up to `limit` documents in insertion order
    pub async fn find<T: DeserializeOwned>(&self, limit: i64) -> Result<Vec<T>> {
        let sql = format!(
            "SELECT doc FROM {} ORDER BY created_at, id LIMIT ?",
            self.table
        );

        let rows = sqlx::query(&sql)
            .bind(limit)
            .fetch_all(self.db.pool())
            .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let doc: String = row.try_get("doc")?;
            records.push(serde_json::from_str(&doc)?);
        }

        Ok(records)
    }

    /// Fetch a single document by id
    pub async fn find_by_id<T: DeserializeOwned>(&self, id: &str) -> Result<T> {
        let sql = format!("SELECT doc FROM {} WHERE id = ?", self.table);

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", self.name, id)))?;

        let doc: String = row.try_get("doc")?;
        Ok(serde_json::from_str(&doc)?)
    }

    /// Insert a new document under the given id
    pub async fn insert<T: Serialize>(&self, id: &str, record: &T) -> Result<()> {
        let doc = serde_json::to_string(record)?;
        let sql = format!("INSERT INTO {} (id, doc) VALUES (?, ?)", self.table);

        match sqlx::query(&sql)
            .bind(id)
            .bind(doc)
            .execute(self.db.pool())
            .await
        {
            Ok(_) => {
                info!("Created {}/{}", self.name, id);
                Ok(())
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::Duplicate(format!("{}/{}", self.name, id)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replace a document wholesale (no merge)
    pub async fn replace_by_id<T: Serialize>(&self, id: &str, record: &T) -> Result<()> {
        let doc = serde_json::to_string(record)?;
        let sql = format!(
            "UPDATE {} SET doc = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            self.table
        );

        let result = sqlx::query(&sql)
            .bind(doc)
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("{}/{}", self.name, id)));
        }

        info!("Replaced {}/{}", self.name, id);
        Ok(())
    }

    /// Remove a document by id
    pub async fn remove_by_id(&self, id: &str) -> Result<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?", self.table);

        let result = sqlx::query(&sql)
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("{}/{}", self.name, id)));
        }

        info!("Removed {}/{}", self.name, id);
        Ok(())
    }

    /// Count all documents in the collection
    pub async fn count(&self) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table);

        let result: (i64,) = sqlx::query_as(&sql).fetch_one(self.db.pool()).await?;

        Ok(result.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DocumentId;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct TestDoc {
        id: String,
        name: String,
        count: i64,
    }

    async fn create_test_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        std::fs::File::create(&db_path).unwrap();
        let db = Database::new(db_path.to_str().unwrap()).await.unwrap();
        (db, temp_dir)
    }

    fn sample(name: &str) -> TestDoc {
        TestDoc {
            id: DocumentId::new().to_string(),
            name: name.to_string(),
            count: 1,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_by_id() {
        let (db, _dir) = create_test_db().await;
        let docs = db.collection("things");
        docs.ensure().await.unwrap();

        let record = sample("first");
        docs.insert(&record.id, &record).await.unwrap();

        let loaded: TestDoc = docs.find_by_id(&record.id).await.unwrap();
        assert_eq!(loaded, record);
    }

    #[tokio::test]
    async fn test_find_by_id_missing_is_not_found() {
        let (db, _dir) = create_test_db().await;
        let docs = db.collection("things");
        docs.ensure().await.unwrap();

        let result = docs.find_by_id::<TestDoc>("absent").await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_insert_duplicate_id() {
        let (db, _dir) = create_test_db().await;
        let docs = db.collection("things");
        docs.ensure().await.unwrap();

        let record = sample("first");
        docs.insert(&record.id, &record).await.unwrap();

        let result = docs.insert(&record.id, &record).await;
        assert!(matches!(result, Err(StoreError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_replace_by_id() {
        let (db, _dir) = create_test_db().await;
        let docs = db.collection("things");
        docs.ensure().await.unwrap();

        let mut record = sample("before");
        docs.insert(&record.id, &record).await.unwrap();

        record.name = "after".to_string();
        record.count = 2;
        docs.replace_by_id(&record.id, &record).await.unwrap();

        let loaded: TestDoc = docs.find_by_id(&record.id).await.unwrap();
        assert_eq!(loaded.name, "after");
        assert_eq!(loaded.count, 2);
    }

    #[tokio::test]
    async fn test_replace_missing_is_not_found() {
        let (db, _dir) = create_test_db().await;
        let docs = db.collection("things");
        docs.ensure().await.unwrap();

        let record = sample("orphan");
        let result = docs.replace_by_id("absent", &record).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_by_id() {
        let (db, _dir) = create_test_db().await;
        let docs = db.collection("things");
        docs.ensure().await.unwrap();

        let record = sample("doomed");
        docs.insert(&record.id, &record).await.unwrap();
        docs.remove_by_id(&record.id).await.unwrap();

        let result = docs.find_by_id::<TestDoc>(&record.id).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));

        let result = docs.remove_by_id(&record.id).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_respects_limit() {
        let (db, _dir) = create_test_db().await;
        let docs = db.collection("things");
        docs.ensure().await.unwrap();

        for i in 0..8 {
            let record = sample(&format!("doc-{}", i));
            docs.insert(&record.id, &record).await.unwrap();
        }

        let all: Vec<TestDoc> = docs.find(50).await.unwrap();
        assert_eq!(all.len(), 8);

        let capped: Vec<TestDoc> = docs.find(5).await.unwrap();
        assert_eq!(capped.len(), 5);
        assert_eq!(docs.count().await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let (db, _dir) = create_test_db().await;
        let things = db.collection("things");
        let others = db.collection("others");
        things.ensure().await.unwrap();
        others.ensure().await.unwrap();

        let record = sample("only-in-things");
        things.insert(&record.id, &record).await.unwrap();

        assert_eq!(things.count().await.unwrap(), 1);
        assert_eq!(others.count().await.unwrap(), 0);
        let result = others.find_by_id::<TestDoc>(&record.id).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
