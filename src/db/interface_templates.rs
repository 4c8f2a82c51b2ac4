use anyhow::{Context, Result};
use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::models::*;

use super::row_helpers::map_interface_template_row;

const SELECT_INTERFACE_TEMPLATE: &str = r#"
    SELECT it.id, it.device_type_id, it.name, it.type, it.mgmt_only,
           it.created_at, it.updated_at
    FROM interface_templates it
"#;

pub struct InterfaceTemplateRepo;

impl InterfaceTemplateRepo {
    /// List all interface templates of a device type
    pub async fn list_for_device_type(pool: &Pool<Sqlite>, device_type_id: i64) -> Result<Vec<InterfaceTemplate>> {
        let rows = sqlx::query(&format!(
            "{} WHERE it.device_type_id = ? ORDER BY it.id",
            SELECT_INTERFACE_TEMPLATE
        ))
        .bind(device_type_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.iter().map(map_interface_template_row).collect())
    }

    /// Upsert an interface template keyed by (device_type_id, name)
    pub async fn update_or_create(
        conn: &mut SqliteConnection,
        device_type_id: i64,
        iface: &InterfaceDocument,
    ) -> Result<InterfaceTemplate> {
        let now = chrono::Utc::now();
        sqlx::query(
            r#"
            INSERT INTO interface_templates (device_type_id, name, type, mgmt_only, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(device_type_id, name) DO UPDATE SET
                type = excluded.type,
                mgmt_only = excluded.mgmt_only,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(device_type_id)
        .bind(&iface.name)
        .bind(&iface.interface_type)
        .bind(iface.mgmt_only)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await
        .with_context(|| format!("Failed to upsert interface template '{}'", iface.name))?;

        // Return the upserted row
        let row = sqlx::query(&format!(
            "{} WHERE it.device_type_id = ? AND it.name = ?",
            SELECT_INTERFACE_TEMPLATE
        ))
        .bind(device_type_id)
        .bind(&iface.name)
        .fetch_optional(&mut *conn)
        .await?;

        row.as_ref()
            .map(map_interface_template_row)
            .context("Interface template not found after upsert")
    }
}
