use crate::core::Pipeline;
use crate::domain::model::ServiceRequestTable;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Window, fetch and clean, without persisting anything.
    pub async fn fetch_and_clean(&self, hours: i64) -> Result<ServiceRequestTable> {
        let label = self.pipeline.origin().label.to_uppercase();
        println!("📡 Fetching 311 data from the last {} {} hours...", hours, label);

        let window = self.pipeline.time_window(hours)?;
        println!(
            "🕒 {} Time Window Start: {}",
            label,
            window.local_start.format("%Y-%m-%d %H:%M:%S")
        );

        let raw = self.pipeline.extract(&window).await?;
        self.monitor.log_stats("Fetch");

        let cleaned = self.pipeline.transform(raw, &window).await?;
        self.monitor.log_stats("Clean");

        println!("✅ Retrieved {} records.", cleaned.len());
        Ok(cleaned)
    }

    pub async fn save(&self, table: &ServiceRequestTable, destination: &str) -> Result<String> {
        let path = self.pipeline.load(table, destination).await?;
        self.monitor.log_stats("Save");
        Ok(path)
    }

    /// Runs the whole pipeline and returns the cleaned table.
    ///
    /// When `output` is set the table is also written there; a failed write
    /// fails the call. Use [`fetch_and_clean`](Self::fetch_and_clean) and
    /// [`save`](Self::save) to keep the table when saving fails.
    pub async fn run(&self, hours: i64, output: Option<&str>) -> Result<ServiceRequestTable> {
        tracing::info!("Starting 311 rolling-window ETL ({}h)", hours);

        let cleaned = self.fetch_and_clean(hours).await?;
        if let Some(destination) = output {
            self.save(&cleaned, destination).await?;
        }

        self.monitor.log_final_stats();
        Ok(cleaned)
    }
}
