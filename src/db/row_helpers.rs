use sqlx::{Row, sqlite::SqliteRow};

use crate::models::*;

/// Map a SQLite row to a Manufacturer struct
pub fn map_manufacturer_row(row: &SqliteRow) -> Manufacturer {
    Manufacturer {
        id: row.get("id"),
        name: row.get("name"),
        device_type_count: row.try_get::<Option<i32>, _>("device_type_count").ok().flatten(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Map a SQLite row (joined with its manufacturer) to a DeviceType struct
pub fn map_device_type_row(row: &SqliteRow) -> DeviceType {
    let is_full_depth: i32 = row.get("is_full_depth");
    DeviceType {
        id: row.get("id"),
        manufacturer_id: row.get("manufacturer_id"),
        manufacturer: row.get("manufacturer"),
        model: row.get("model"),
        part_number: row.get("part_number"),
        u_height: row.get("u_height"),
        is_full_depth: is_full_depth == 1,
        subdevice_role: row.get("subdevice_role"),
        comments: row.get("comments"),
        interface_count: Some(row.get("interface_count")),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Map a SQLite row to an InterfaceTemplate struct
pub fn map_interface_template_row(row: &SqliteRow) -> InterfaceTemplate {
    let mgmt_only: i32 = row.get("mgmt_only");
    InterfaceTemplate {
        id: row.get("id"),
        device_type_id: row.get("device_type_id"),
        name: row.get("name"),
        interface_type: row.get("type"),
        mgmt_only: mgmt_only == 1,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
