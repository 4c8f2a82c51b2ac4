//! Device type import: YAML document in, manufacturer / device type /
//! interface template rows out, applied in one transaction.

use anyhow::Context;
use sqlx::SqliteConnection;
use thiserror::Error;

use crate::db::{DeviceTypeRepo, InterfaceTemplateRepo, ManufacturerRepo, Store};
use crate::jobs::JobLogger;
use crate::models::*;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to load YAML data: {0}")]
    Parse(#[source] serde_yaml::Error),

    #[error("YAML data missing one or more required keys: {}", .missing.join(", "))]
    Validation { missing: Vec<String> },

    #[error("Invalid device type document: {0}")]
    InvalidDocument(#[source] serde_yaml::Error),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl ImportError {
    /// Parse and missing-key errors stop the import before the store is
    /// touched and are reported as log lines rather than job failures.
    pub fn is_clean_abort(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::Validation { .. })
    }
}

/// Names of the required top-level keys absent from a decoded document.
/// Anything other than a mapping is missing all of them.
pub fn missing_required_keys(value: &serde_yaml::Value) -> Vec<String> {
    let mapping = value.as_mapping();
    REQUIRED_DOCUMENT_KEYS
        .iter()
        .filter(|key| !mapping.is_some_and(|m| m.contains_key(**key)))
        .map(|key| key.to_string())
        .collect()
}

/// Decode, check required keys, then convert into the typed document.
pub fn parse_document(content: &[u8]) -> Result<DeviceTypeDocument, ImportError> {
    let value: serde_yaml::Value = serde_yaml::from_slice(content).map_err(ImportError::Parse)?;

    let missing = missing_required_keys(&value);
    if !missing.is_empty() {
        return Err(ImportError::Validation { missing });
    }

    serde_yaml::from_value(value).map_err(ImportError::InvalidDocument)
}

/// DeviceTypeImporter reconciles one uploaded document against the store
pub struct DeviceTypeImporter {
    store: Store,
}

impl DeviceTypeImporter {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Import a YAML document. Either every write commits or none does, and
    /// the created/updated status line is only logged once the commit succeeded.
    pub async fn import(&self, content: &[u8], log: &mut JobLogger) -> Result<ImportSummary, ImportError> {
        let doc = parse_document(content)?;

        let mut tx = self.store.begin().await?;
        match apply_document(&mut tx, &doc, log).await {
            Ok(summary) => {
                tx.commit()
                    .await
                    .context("Failed to commit device type import")?;
                if summary.created {
                    log.info(format!(
                        "Device type '{}' successfully added.",
                        summary.device_type.model
                    ));
                } else {
                    log.info(format!(
                        "Device type '{}' already exists. Updating details.",
                        summary.device_type.model
                    ));
                }
                Ok(summary)
            }
            Err(e) => {
                if let Err(rb) = tx.rollback().await {
                    tracing::warn!("Failed to roll back device type import: {}", rb);
                }
                Err(e.into())
            }
        }
    }
}

async fn apply_document(
    conn: &mut SqliteConnection,
    doc: &DeviceTypeDocument,
    log: &mut JobLogger,
) -> anyhow::Result<ImportSummary> {
    let (manufacturer, manufacturer_created) =
        ManufacturerRepo::get_or_create(conn, &doc.manufacturer).await?;
    if manufacturer_created {
        tracing::debug!("Created manufacturer '{}'", manufacturer.name);
    }

    let fields = DeviceTypeFields::from(doc);

    let (device_type, created) = match DeviceTypeRepo::get_by_model(conn, &doc.model).await? {
        None => {
            let dt = DeviceTypeRepo::create(conn, manufacturer.id, &doc.model, &fields).await?;
            (dt, true)
        }
        Some(existing) => {
            // The owning manufacturer of an existing device type is never reassigned
            if existing.manufacturer_id != manufacturer.id {
                log.warning(format!(
                    "Device type '{}' belongs to manufacturer '{}'; keeping it instead of '{}'",
                    existing.model, existing.manufacturer, manufacturer.name
                ));
            }
            let dt = DeviceTypeRepo::update_details(conn, existing.id, &fields).await?;
            (dt, false)
        }
    };

    let mut interfaces = Vec::with_capacity(doc.interfaces.len());
    for iface in &doc.interfaces {
        let template = InterfaceTemplateRepo::update_or_create(conn, device_type.id, iface).await?;
        interfaces.push(template);
    }

    // Re-read so the interface count reflects this import
    let device_type = DeviceTypeRepo::get(conn, device_type.id)
        .await?
        .context("Device type not found after import")?;

    Ok(ImportSummary {
        manufacturer,
        device_type,
        created,
        interfaces,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::temp_store;

    const X100: &str = r#"
manufacturer: Acme
model: X100
part_number: PN1
u_height: 1
is_full_depth: true
interfaces:
  - name: eth0
    type: 1000base-t
"#;

    fn messages(log: JobLogger) -> Vec<String> {
        log.into_entries().into_iter().map(|e| e.message).collect()
    }

    async fn assert_store_empty(store: &Store) {
        assert!(store.list_manufacturers().await.unwrap().is_empty());
        assert!(store.list_device_types().await.unwrap().is_empty());
    }

    #[test]
    fn test_missing_required_keys() {
        let value: serde_yaml::Value =
            serde_yaml::from_str("manufacturer: Acme\nmodel: X100\npart_number: PN1").unwrap();
        assert_eq!(missing_required_keys(&value), vec!["u_height", "is_full_depth"]);
    }

    #[test]
    fn test_non_mapping_is_missing_every_key() {
        let value: serde_yaml::Value = serde_yaml::from_str("- just\n- a list").unwrap();
        assert_eq!(missing_required_keys(&value).len(), REQUIRED_DOCUMENT_KEYS.len());
    }

    #[test]
    fn test_empty_and_scalar_documents_are_missing_every_key() {
        for content in [&b""[..], &b"42"[..]] {
            match parse_document(content).unwrap_err() {
                ImportError::Validation { missing } => {
                    assert_eq!(missing, REQUIRED_DOCUMENT_KEYS.to_vec());
                }
                other => panic!("expected validation error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_parse_document_defaults() {
        let doc = parse_document(X100.as_bytes()).unwrap();
        assert_eq!(doc.subdevice_role, "");
        assert_eq!(doc.comments, "");
        assert_eq!(doc.interfaces.len(), 1);
        assert_eq!(doc.interfaces[0].interface_type, "1000base-t");
        assert!(!doc.interfaces[0].mgmt_only);
    }

    #[test]
    fn test_parse_document_without_interfaces() {
        let doc = parse_document(
            b"manufacturer: Acme\nmodel: X100\npart_number: PN1\nu_height: 2\nis_full_depth: false",
        )
        .unwrap();
        assert!(doc.interfaces.is_empty());
        assert!(!doc.is_full_depth);
    }

    #[test]
    fn test_parse_document_malformed_yaml() {
        let err = parse_document(b"manufacturer: Acme\nmodel: [X100").unwrap_err();
        assert!(matches!(err, ImportError::Parse(_)));
        assert!(err.is_clean_abort());
        assert!(err.to_string().starts_with("Failed to load YAML data:"));
    }

    #[test]
    fn test_parse_document_type_mismatch_is_not_validation() {
        let err = parse_document(
            b"manufacturer: Acme\nmodel: X100\npart_number: PN1\nu_height: tall\nis_full_depth: true",
        )
        .unwrap_err();
        assert!(matches!(err, ImportError::InvalidDocument(_)));
        assert!(!err.is_clean_abort());
    }

    #[tokio::test]
    async fn test_import_creates_records() {
        let (_dir, store) = temp_store().await;
        let importer = DeviceTypeImporter::new(store.clone());
        let mut log = JobLogger::default();

        let summary = importer.import(X100.as_bytes(), &mut log).await.unwrap();
        assert!(summary.created);
        assert_eq!(summary.manufacturer.name, "Acme");
        assert_eq!(summary.device_type.model, "X100");
        assert_eq!(summary.device_type.u_height, 1);
        assert!(summary.device_type.is_full_depth);
        assert_eq!(summary.device_type.subdevice_role, "");
        assert_eq!(summary.device_type.comments, "");
        assert_eq!(summary.device_type.interface_count, Some(1));
        assert_eq!(messages(log), vec!["Device type 'X100' successfully added."]);

        let detail = store.get_device_type_detail("X100").await.unwrap();
        assert_eq!(detail.interfaces.len(), 1);
        assert_eq!(detail.interfaces[0].name, "eth0");
        assert_eq!(detail.interfaces[0].interface_type, "1000base-t");
        assert!(!detail.interfaces[0].mgmt_only);
    }

    #[tokio::test]
    async fn test_reimport_updates_in_place() {
        let (_dir, store) = temp_store().await;
        let importer = DeviceTypeImporter::new(store.clone());
        importer.import(X100.as_bytes(), &mut JobLogger::default()).await.unwrap();

        let mut log = JobLogger::default();
        let second = X100.replace("u_height: 1", "u_height: 2");
        let summary = importer.import(second.as_bytes(), &mut log).await.unwrap();
        assert!(!summary.created);
        assert_eq!(
            messages(log),
            vec!["Device type 'X100' already exists. Updating details."]
        );

        let types = store.list_device_types().await.unwrap();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].u_height, 2);
        assert_eq!(store.list_manufacturers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reimport_overwrites_optional_fields_with_defaults() {
        let (_dir, store) = temp_store().await;
        let importer = DeviceTypeImporter::new(store.clone());
        let with_comments = format!("{}comments: rack mounted\nsubdevice_role: parent\n", X100);
        importer
            .import(with_comments.as_bytes(), &mut JobLogger::default())
            .await
            .unwrap();

        importer.import(X100.as_bytes(), &mut JobLogger::default()).await.unwrap();
        let dt = store.get_device_type_by_model("X100").await.unwrap().unwrap();
        assert_eq!(dt.comments, "");
        assert_eq!(dt.subdevice_role, "");
    }

    #[tokio::test]
    async fn test_interfaces_upsert_without_duplicates_or_deletes() {
        let (_dir, store) = temp_store().await;
        let importer = DeviceTypeImporter::new(store.clone());
        let doc = r#"
manufacturer: Acme
model: X200
part_number: PN2
u_height: 1
is_full_depth: false
interfaces:
  - name: eth0
    type: 1000base-t
  - name: eth1
    type: 1000base-t
  - name: mgmt0
    type: 1000base-t
    mgmt_only: true
"#;
        importer.import(doc.as_bytes(), &mut JobLogger::default()).await.unwrap();
        let detail = store.get_device_type_detail("X200").await.unwrap();
        assert_eq!(detail.interfaces.len(), 3);
        assert!(detail.interfaces.iter().any(|i| i.name == "mgmt0" && i.mgmt_only));

        let changed = r#"
manufacturer: Acme
model: X200
part_number: PN2
u_height: 1
is_full_depth: false
interfaces:
  - name: eth0
    type: 10gbase-x-sfpp
"#;
        importer.import(changed.as_bytes(), &mut JobLogger::default()).await.unwrap();
        let after = store.get_device_type_detail("X200").await.unwrap();
        assert_eq!(after.interfaces.len(), 3);

        let eth0_before = detail.interfaces.iter().find(|i| i.name == "eth0").unwrap();
        let eth0_after = after.interfaces.iter().find(|i| i.name == "eth0").unwrap();
        assert_eq!(eth0_before.id, eth0_after.id);
        assert_eq!(eth0_after.interface_type, "10gbase-x-sfpp");
    }

    #[tokio::test]
    async fn test_manufacturer_is_shared_between_models() {
        let (_dir, store) = temp_store().await;
        let importer = DeviceTypeImporter::new(store.clone());
        importer.import(X100.as_bytes(), &mut JobLogger::default()).await.unwrap();
        let other = X100.replace("model: X100", "model: X300");
        importer.import(other.as_bytes(), &mut JobLogger::default()).await.unwrap();

        let manufacturers = store.list_manufacturers().await.unwrap();
        assert_eq!(manufacturers.len(), 1);
        assert_eq!(manufacturers[0].device_type_count, Some(2));
    }

    #[tokio::test]
    async fn test_reimport_keeps_original_manufacturer() {
        let (_dir, store) = temp_store().await;
        let importer = DeviceTypeImporter::new(store.clone());
        importer.import(X100.as_bytes(), &mut JobLogger::default()).await.unwrap();

        let mut log = JobLogger::default();
        let moved = X100.replace("manufacturer: Acme", "manufacturer: Globex");
        let summary = importer.import(moved.as_bytes(), &mut log).await.unwrap();
        assert_eq!(summary.device_type.manufacturer, "Acme");
        assert!(log
            .into_entries()
            .iter()
            .any(|e| e.level == LogLevel::Warning && e.message.contains("Globex")));
    }

    #[tokio::test]
    async fn test_missing_keys_abort_without_mutation() {
        let (_dir, store) = temp_store().await;
        let importer = DeviceTypeImporter::new(store.clone());
        let err = importer
            .import(b"manufacturer: Acme\nmodel: X100\n", &mut JobLogger::default())
            .await
            .unwrap_err();
        match &err {
            ImportError::Validation { missing } => {
                assert_eq!(missing, &vec!["part_number", "u_height", "is_full_depth"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(err.to_string().contains("part_number, u_height, is_full_depth"));
        assert_store_empty(&store).await;
    }

    #[tokio::test]
    async fn test_malformed_yaml_aborts_without_mutation() {
        let (_dir, store) = temp_store().await;
        let importer = DeviceTypeImporter::new(store.clone());
        let err = importer
            .import(b"manufacturer: Acme\nmodel: [X100", &mut JobLogger::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Parse(_)));
        assert_store_empty(&store).await;
    }

    #[tokio::test]
    async fn test_interface_without_type_fails_without_mutation() {
        let (_dir, store) = temp_store().await;
        let importer = DeviceTypeImporter::new(store.clone());
        let doc = X100.replace("    type: 1000base-t\n", "");
        let err = importer
            .import(doc.as_bytes(), &mut JobLogger::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::InvalidDocument(_)));
        assert_store_empty(&store).await;
    }

    #[tokio::test]
    async fn test_numeric_scalars_are_stored_as_text() {
        let (_dir, store) = temp_store().await;
        let importer = DeviceTypeImporter::new(store.clone());
        let doc = r#"
manufacturer: Acme
model: 7050
part_number: 12345
u_height: 1
is_full_depth: true
interfaces:
  - name: 1
    type: 1000base-t
"#;
        let summary = importer
            .import(doc.as_bytes(), &mut JobLogger::default())
            .await
            .unwrap();
        assert_eq!(summary.device_type.model, "7050");
        assert_eq!(summary.device_type.part_number, "12345");

        let detail = store.get_device_type_detail("7050").await.unwrap();
        assert_eq!(detail.interfaces.len(), 1);
        assert_eq!(detail.interfaces[0].name, "1");
    }

    #[test]
    fn test_nested_value_for_text_field_is_invalid() {
        let err = parse_document(
            b"manufacturer: [Acme]\nmodel: X100\npart_number: PN1\nu_height: 1\nis_full_depth: true",
        )
        .unwrap_err();
        assert!(matches!(err, ImportError::InvalidDocument(_)));
    }

    #[tokio::test]
    async fn test_store_failure_rolls_back_everything() {
        let (_dir, store) = temp_store().await;
        let importer = DeviceTypeImporter::new(store.clone());
        let doc = format!("{}subdevice_role: sibling\n", X100);
        let err = importer
            .import(doc.as_bytes(), &mut JobLogger::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Store(_)));
        assert!(!err.is_clean_abort());
        assert_store_empty(&store).await;

        // The store is still usable after the rollback
        importer.import(X100.as_bytes(), &mut JobLogger::default()).await.unwrap();
        assert_eq!(store.list_device_types().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_update_leaves_previous_values() {
        let (_dir, store) = temp_store().await;
        let importer = DeviceTypeImporter::new(store.clone());
        importer.import(X100.as_bytes(), &mut JobLogger::default()).await.unwrap();

        let bad = X100
            .replace("u_height: 1", "u_height: -1")
            .replace("manufacturer: Acme", "manufacturer: Globex");
        let mut log = JobLogger::default();
        assert!(importer.import(bad.as_bytes(), &mut log).await.is_err());
        // Only the manufacturer warning; no "Updating details." for a rolled back update
        let entries = log.into_entries();
        assert!(entries.iter().all(|e| e.level != LogLevel::Info));
        assert!(entries.iter().all(|e| !e.message.contains("Updating details")));

        let dt = store.get_device_type_by_model("X100").await.unwrap().unwrap();
        assert_eq!(dt.u_height, 1);
        let manufacturers = store.list_manufacturers().await.unwrap();
        assert_eq!(manufacturers.len(), 1);
        assert_eq!(manufacturers[0].name, "Acme");
    }
}
