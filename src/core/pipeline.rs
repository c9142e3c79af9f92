use crate::adapters::http::SocrataClient;
use crate::core::{cleaner, persister, window};
use crate::domain::model::{Origin, ServiceRequestTable, TimeWindow};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::Result;

/// 311 rolling-window pipeline: Socrata extract, timestamp cleaning, CSV load.
pub struct ServiceRequestPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) client: SocrataClient,
}

impl<S: Storage, C: ConfigProvider> ServiceRequestPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        let client = SocrataClient::from_config(&config);
        Self {
            storage,
            config,
            client,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ServiceRequestPipeline<S, C> {
    fn time_window(&self, hours: i64) -> Result<TimeWindow> {
        window::rolling_window(hours, self.config.origin().timezone)
    }

    fn origin(&self) -> &Origin {
        self.config.origin()
    }

    async fn extract(&self, window: &TimeWindow) -> Result<ServiceRequestTable> {
        tracing::info!(
            "🚀 Starting extraction from: {} (since {})",
            self.config.api_endpoint(),
            window.utc_start_iso
        );
        self.client.fetch_since(&window.utc_start_iso).await
    }

    async fn transform(
        &self,
        table: ServiceRequestTable,
        window: &TimeWindow,
    ) -> Result<ServiceRequestTable> {
        tracing::info!("🔧 Cleaning {} records", table.len());
        let cleaned = cleaner::clean_and_filter(table, window.utc_start, self.config.origin());
        tracing::info!("✅ Clean complete: {} records kept", cleaned.len());
        Ok(cleaned)
    }

    async fn load(&self, table: &ServiceRequestTable, destination: &str) -> Result<String> {
        tracing::info!("💾 Saving {} records to {}", table.len(), destination);
        let data = persister::to_csv_bytes(table)?;
        self.storage.write_file(destination, &data).await?;

        println!("✅ Data saved to {}", destination);
        Ok(destination.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::domain::model::Record;
    use crate::utils::error::EtlError;
    use chrono::{Duration, Utc};
    use httpmock::prelude::*;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn settings(endpoint: String) -> Settings {
        Settings {
            endpoint,
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn test_extract_uses_window_boundary() {
        let server = MockServer::start_async().await;
        let pipeline = ServiceRequestPipeline::new(
            MockStorage::new(),
            settings(server.url("/resource/erm2-nwe9.json")),
        );
        let window = pipeline.time_window(24).unwrap();
        let expected_where = format!("created_date >= '{}'", window.utc_start_iso);

        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/resource/erm2-nwe9.json")
                    .query_param("$limit", "50000")
                    .query_param("$where", expected_where.as_str());
                then.status(200).json_body(json!([]));
            })
            .await;

        let raw = pipeline.extract(&window).await.unwrap();

        api_mock.assert_async().await;
        assert!(raw.is_empty());
    }

    #[tokio::test]
    async fn test_transform_applies_window() {
        let pipeline = ServiceRequestPipeline::new(
            MockStorage::new(),
            settings("http://test.invalid".to_string()),
        );
        let window = pipeline.time_window(24).unwrap();
        let stale = (Utc::now() - Duration::hours(25))
            .format("%Y-%m-%dT%H:%M:%S%.3f")
            .to_string();
        let fresh = (Utc::now() - Duration::hours(2))
            .format("%Y-%m-%dT%H:%M:%S%.3f")
            .to_string();
        let raw = ServiceRequestTable::from_records(vec![
            Record::from(json!({"unique_key": "old", "created_date": stale}).as_object().unwrap().clone()),
            Record::from(json!({"unique_key": "new", "created_date": fresh}).as_object().unwrap().clone()),
        ]);

        let cleaned = pipeline.transform(raw, &window).await.unwrap();

        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned.records()[0].get("unique_key"), Some(&json!("new")));
        assert!(cleaned.records()[0]
            .get("created_date_nyc")
            .and_then(Value::as_str)
            .is_some());
    }

    #[tokio::test]
    async fn test_load_writes_csv_to_storage() {
        let storage = MockStorage::new();
        let pipeline = ServiceRequestPipeline::new(
            storage.clone(),
            settings("http://test.invalid".to_string()),
        );
        let table = ServiceRequestTable::from_records(vec![Record::from(
            json!({"unique_key": "1", "created_date": "2024-05-01T12:00:00.000+00:00"})
                .as_object()
                .unwrap()
                .clone(),
        )]);

        let path = pipeline.load(&table, "out/nyc311.csv").await.unwrap();

        assert_eq!(path, "out/nyc311.csv");
        let written = String::from_utf8(storage.get_file("out/nyc311.csv").await.unwrap()).unwrap();
        assert_eq!(
            written,
            "unique_key,created_date\n1,2024-05-01T12:00:00.000+00:00\n"
        );
        assert_eq!(storage.read_file("out/nyc311.csv").await.unwrap().len(), written.len());
    }
}
