use chrono::Utc;
use tracing::Instrument;

use crate::db::Store;
use crate::importer::DeviceTypeImporter;
use crate::models::*;

/// JobLogger collects the operator-facing log of one job run and mirrors
/// every line to tracing.
#[derive(Debug, Default)]
pub struct JobLogger {
    entries: Vec<JobLogEntry>,
}

impl JobLogger {
    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", message);
        self.push(LogLevel::Info, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.push(LogLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("{}", message);
        self.push(LogLevel::Error, message);
    }

    pub fn into_entries(self) -> Vec<JobLogEntry> {
        self.entries
    }

    fn push(&mut self, level: LogLevel, message: String) {
        self.entries.push(JobLogEntry { level, message });
    }
}

/// Run one device type import as a job.
///
/// Parse and missing-key errors end the job as `aborted` with an error log
/// line. Anything raised once the document is past validation marks the job
/// `failed`, after the transaction has been rolled back.
pub async fn run_import_job(store: &Store, content: &[u8]) -> JobResult {
    let id = uuid::Uuid::new_v4().to_string();
    let span = tracing::info_span!("job", id = %id, job = job_name::IMPORT_DEVICE_TYPE);
    execute_import(store, content, id).instrument(span).await
}

async fn execute_import(store: &Store, content: &[u8], id: String) -> JobResult {
    let started_at = Utc::now();
    tracing::info!("Starting device type import ({} bytes)", content.len());

    let mut log = JobLogger::default();
    let importer = DeviceTypeImporter::new(store.clone());

    let (status, summary, error) = match importer.import(content, &mut log).await {
        Ok(summary) => (job_status::COMPLETED, Some(summary), None),
        Err(e) if e.is_clean_abort() => {
            let msg = e.to_string();
            log.error(msg.clone());
            (job_status::ABORTED, None, Some(msg))
        }
        Err(e) => {
            let msg = format!("{:#}", e);
            log.error(format!("Device type import failed: {}", msg));
            (job_status::FAILED, None, Some(msg))
        }
    };

    tracing::info!("Device type import finished: {}", status);

    JobResult {
        id,
        name: job_name::IMPORT_DEVICE_TYPE.to_string(),
        status: status.to_string(),
        logs: log.into_entries(),
        summary,
        error,
        started_at,
        completed_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::temp_store;

    #[test]
    fn test_job_logger_records_levels_in_order() {
        let mut log = JobLogger::default();
        log.info("one");
        log.warning("two");
        log.error("three");
        let entries = log.into_entries();
        let levels: Vec<LogLevel> = entries.iter().map(|e| e.level).collect();
        assert_eq!(levels, vec![LogLevel::Info, LogLevel::Warning, LogLevel::Error]);
        assert_eq!(entries[2].message, "three");
    }

    #[tokio::test]
    async fn test_run_import_job_completed() {
        let (_dir, store) = temp_store().await;
        let result = run_import_job(
            &store,
            b"manufacturer: Acme\nmodel: X100\npart_number: PN1\nu_height: 1\nis_full_depth: true\n",
        )
        .await;
        assert_eq!(result.status, job_status::COMPLETED);
        assert_eq!(result.name, job_name::IMPORT_DEVICE_TYPE);
        assert!(result.error.is_none());
        assert!(result.summary.unwrap().created);
        assert_eq!(result.logs.len(), 1);
        assert_eq!(result.logs[0].level, LogLevel::Info);
    }

    #[tokio::test]
    async fn test_run_import_job_aborted_on_missing_keys() {
        let (_dir, store) = temp_store().await;
        let result = run_import_job(&store, b"manufacturer: Acme\n").await;
        assert_eq!(result.status, job_status::ABORTED);
        assert!(result.summary.is_none());
        assert_eq!(result.logs.len(), 1);
        assert_eq!(result.logs[0].level, LogLevel::Error);
        assert!(result.logs[0].message.contains("model, part_number, u_height, is_full_depth"));
    }

    #[tokio::test]
    async fn test_run_import_job_aborted_on_parse_error() {
        let (_dir, store) = temp_store().await;
        let result = run_import_job(&store, b"model: [X100").await;
        assert_eq!(result.status, job_status::ABORTED);
        assert!(result.logs[0].message.starts_with("Failed to load YAML data:"));
    }

    #[tokio::test]
    async fn test_run_import_job_failed_on_store_error() {
        let (_dir, store) = temp_store().await;
        let result = run_import_job(
            &store,
            b"manufacturer: Acme\nmodel: X100\npart_number: PN1\nu_height: -4\nis_full_depth: true\n",
        )
        .await;
        assert_eq!(result.status, job_status::FAILED);
        assert!(result.error.is_some());
        assert!(store.list_manufacturers().await.unwrap().is_empty());
    }
}
