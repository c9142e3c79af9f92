// Domain layer: 311 records, the rolling window and the ports the pipeline depends on.

pub mod model;
pub mod ports;
