pub mod cleaner;
pub mod etl;
pub mod persister;
pub mod pipeline;
pub mod window;

pub use crate::domain::model::{Origin, Record, ServiceRequestTable, TimeWindow};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
