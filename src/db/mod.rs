mod device_types;
mod interface_templates;
mod manufacturers;
pub(crate) mod row_helpers;

use anyhow::{Context, Result};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite, Transaction};

use crate::models::*;

pub use device_types::DeviceTypeRepo;
pub use interface_templates::InterfaceTemplateRepo;
pub use manufacturers::ManufacturerRepo;

/// Typed error for "resource not found". Enables reliable downcast
/// in the API error handler instead of fragile string matching.
#[derive(Debug)]
pub struct NotFoundError {
    pub resource: String,
    pub id: String,
}

impl NotFoundError {
    pub fn new(resource: &str, id: &str) -> Self {
        Self {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }
}

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} not found: {}", self.resource, self.id)
    }
}

impl std::error::Error for NotFoundError {}

/// Store handles all database operations, delegating to per-entity repo modules.
#[derive(Clone)]
pub struct Store {
    pool: Pool<Sqlite>,
}

impl Store {
    /// Create a new database store with a specific pool size
    pub async fn with_pool_size(db_path: &str, max_connections: u32) -> Result<Self> {
        let db_url = format!("sqlite:{}?mode=rwc", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&db_url)
            .await
            .context("Failed to connect to database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Run database migrations
    async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Open a transaction. Dropping it without `commit` rolls every write back.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .context("Failed to begin transaction")
    }

    // ========== Manufacturer Operations ==========

    pub async fn list_manufacturers(&self) -> Result<Vec<Manufacturer>> {
        ManufacturerRepo::list(&self.pool).await
    }

    // ========== Device Type Operations ==========

    pub async fn list_device_types(&self) -> Result<Vec<DeviceType>> {
        DeviceTypeRepo::list(&self.pool).await
    }

    pub async fn get_device_type_by_model(&self, model: &str) -> Result<Option<DeviceType>> {
        let mut conn = self.pool.acquire().await?;
        DeviceTypeRepo::get_by_model(&mut conn, model).await
    }

    /// Fetch a device type together with its interface templates
    pub async fn get_device_type_detail(&self, model: &str) -> Result<DeviceTypeDetail> {
        let device_type = self
            .get_device_type_by_model(model)
            .await?
            .ok_or_else(|| NotFoundError::new("Device type", model))?;
        let interfaces = self.list_interface_templates(device_type.id).await?;
        Ok(DeviceTypeDetail {
            device_type,
            interfaces,
        })
    }

    // ========== Interface Template Operations ==========

    pub async fn list_interface_templates(&self, device_type_id: i64) -> Result<Vec<InterfaceTemplate>> {
        InterfaceTemplateRepo::list_for_device_type(&self.pool, device_type_id).await
    }
}
