use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

/// Manufacturer is the vendor owning one or more device types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manufacturer {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type_count: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DeviceType is a hardware model definition, unique by model name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceType {
    pub id: i64,
    pub manufacturer_id: i64,
    pub manufacturer: String,
    pub model: String,
    pub part_number: String,
    pub u_height: i32,
    pub is_full_depth: bool,
    pub subdevice_role: String,
    pub comments: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface_count: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// InterfaceTemplate is a named port definition attached to a device type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceTemplate {
    pub id: i64,
    pub device_type_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub interface_type: String,
    pub mgmt_only: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DeviceTypeDetail is a device type together with its interface templates
#[derive(Debug, Clone, Serialize)]
pub struct DeviceTypeDetail {
    #[serde(flatten)]
    pub device_type: DeviceType,
    pub interfaces: Vec<InterfaceTemplate>,
}

/// Keys every device type document must carry at the top level
pub const REQUIRED_DOCUMENT_KEYS: &[&str] = &[
    "manufacturer",
    "model",
    "part_number",
    "u_height",
    "is_full_depth",
];

/// DeviceTypeDocument is the typed form of an uploaded device type YAML file
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceTypeDocument {
    #[serde(deserialize_with = "scalar_string")]
    pub manufacturer: String,
    #[serde(deserialize_with = "scalar_string")]
    pub model: String,
    #[serde(deserialize_with = "scalar_string")]
    pub part_number: String,
    pub u_height: i32,
    pub is_full_depth: bool,
    #[serde(default, deserialize_with = "scalar_string")]
    pub subdevice_role: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub comments: String,
    #[serde(default)]
    pub interfaces: Vec<InterfaceDocument>,
}

/// InterfaceDocument is one entry of the `interfaces` list
#[derive(Debug, Clone, Deserialize)]
pub struct InterfaceDocument {
    #[serde(deserialize_with = "scalar_string")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "scalar_string")]
    pub interface_type: String,
    #[serde(default)]
    pub mgmt_only: bool,
}

/// Text fields accept any YAML scalar (`part_number: 12345`, `name: 1`)
/// and keep its textual form.
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(de::Error::custom(format!(
            "expected a string or other scalar, found {:?}",
            other
        ))),
    }
}

/// Fields written to a device type on create or update
#[derive(Debug, Clone)]
pub struct DeviceTypeFields {
    pub part_number: String,
    pub u_height: i32,
    pub is_full_depth: bool,
    pub subdevice_role: String,
    pub comments: String,
}

impl From<&DeviceTypeDocument> for DeviceTypeFields {
    fn from(doc: &DeviceTypeDocument) -> Self {
        Self {
            part_number: doc.part_number.clone(),
            u_height: doc.u_height,
            is_full_depth: doc.is_full_depth,
            subdevice_role: doc.subdevice_role.clone(),
            comments: doc.comments.clone(),
        }
    }
}
