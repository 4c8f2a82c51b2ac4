use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::models::*;

use super::row_helpers::map_device_type_row;

const SELECT_DEVICE_TYPE: &str = r#"
    SELECT dt.id, dt.manufacturer_id, m.name AS manufacturer, dt.model, dt.part_number,
           dt.u_height, dt.is_full_depth, dt.subdevice_role, dt.comments,
           dt.created_at, dt.updated_at,
           COALESCE(COUNT(it.id), 0) as interface_count
    FROM device_types dt
    JOIN manufacturers m ON m.id = dt.manufacturer_id
    LEFT JOIN interface_templates it ON it.device_type_id = dt.id
"#;

pub struct DeviceTypeRepo;

impl DeviceTypeRepo {
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<DeviceType>> {
        let rows = sqlx::query(&format!(
            "{} GROUP BY dt.id ORDER BY m.name, dt.model",
            SELECT_DEVICE_TYPE
        ))
        .fetch_all(pool)
        .await?;

        Ok(rows.iter().map(map_device_type_row).collect())
    }

    pub async fn get(conn: &mut SqliteConnection, id: i64) -> Result<Option<DeviceType>> {
        let row = sqlx::query(&format!(
            "{} WHERE dt.id = ? GROUP BY dt.id",
            SELECT_DEVICE_TYPE
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.as_ref().map(map_device_type_row))
    }

    pub async fn get_by_model(conn: &mut SqliteConnection, model: &str) -> Result<Option<DeviceType>> {
        let row = sqlx::query(&format!(
            "{} WHERE dt.model = ? GROUP BY dt.id",
            SELECT_DEVICE_TYPE
        ))
        .bind(model)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.as_ref().map(map_device_type_row))
    }

    pub async fn create(
        conn: &mut SqliteConnection,
        manufacturer_id: i64,
        model: &str,
        fields: &DeviceTypeFields,
    ) -> Result<DeviceType> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO device_types (manufacturer_id, model, part_number, u_height, is_full_depth,
                                      subdevice_role, comments, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(manufacturer_id)
        .bind(model)
        .bind(&fields.part_number)
        .bind(fields.u_height)
        .bind(fields.is_full_depth)
        .bind(&fields.subdevice_role)
        .bind(&fields.comments)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await
        .with_context(|| format!("Failed to create device type '{}'", model))?;

        Self::get(conn, result.last_insert_rowid())
            .await?
            .context("Device type not found after creation")
    }

    /// Overwrite the descriptive fields of an existing device type.
    /// The manufacturer and model are left untouched.
    pub async fn update_details(
        conn: &mut SqliteConnection,
        id: i64,
        fields: &DeviceTypeFields,
    ) -> Result<DeviceType> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE device_types SET part_number = ?, u_height = ?, is_full_depth = ?,
                                    subdevice_role = ?, comments = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&fields.part_number)
        .bind(fields.u_height)
        .bind(fields.is_full_depth)
        .bind(&fields.subdevice_role)
        .bind(&fields.comments)
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await
        .with_context(|| format!("Failed to update device type {}", id))?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Device type", &id.to_string()).into());
        }

        Self::get(conn, id)
            .await?
            .context("Device type not found after update")
    }
}
