use crate::domain::model::{Origin, ServiceRequestTable, TimeWindow};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn row_limit(&self) -> usize;
    fn origin(&self) -> &Origin;
    fn app_token(&self) -> Option<&str>;
    fn request_timeout(&self) -> Option<Duration>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    fn time_window(&self, hours: i64) -> Result<TimeWindow>;
    fn origin(&self) -> &Origin;
    async fn extract(&self, window: &TimeWindow) -> Result<ServiceRequestTable>;
    async fn transform(
        &self,
        table: ServiceRequestTable,
        window: &TimeWindow,
    ) -> Result<ServiceRequestTable>;
    async fn load(&self, table: &ServiceRequestTable, destination: &str) -> Result<String>;
}
