// Adapters layer: concrete implementations for external systems (Socrata HTTP, local files).

pub mod http;
pub mod storage;
