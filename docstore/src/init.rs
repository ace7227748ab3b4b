use crate::{Database, Result, StoreError};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Database initialization configuration
pub struct DatabaseConfig {
    /// Path to the database file
    pub database_path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data").join("corbel.db"),
        }
    }
}

impl DatabaseConfig {
    /// Create a new database configuration with default paths
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new database configuration with a specific database path
    pub fn new_with_path(database_path: PathBuf) -> Self {
        Self { database_path }
    }

    /// Set a custom database path
    pub fn with_database_path(mut self, path: PathBuf) -> Self {
        self.database_path = path;
        self
    }
}

/// Initialize the database with the given configuration
pub async fn initialize_database(config: DatabaseConfig) -> Result<Arc<Database>> {
    // Ensure the data directory exists
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
        info!("Created data directory at: {:?}", parent);
    }

    // Create the database file if it doesn't exist
    if !config.database_path.exists() {
        std::fs::File::create(&config.database_path)?;
        info!("Created new database file at: {:?}", config.database_path);
    }

    let db_path_str = config
        .database_path
        .to_str()
        .ok_or_else(|| StoreError::Other("Invalid database path".into()))?;

    let db = Database::new(db_path_str).await?;
    info!("Database connection established");

    Ok(Arc::new(db))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_database_initialization() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("test.db");

        let config = DatabaseConfig::new().with_database_path(db_path.clone());
        let db = initialize_database(config).await.unwrap();

        // Verify database file was created
        assert!(db_path.exists());

        // Verify we can get a pool
        assert!(db.pool().acquire().await.is_ok());
    }
}
