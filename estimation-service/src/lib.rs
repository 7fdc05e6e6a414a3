pub mod audit;
pub mod config;
pub mod evaluate;
pub mod observability;
pub mod pipeline;
pub mod regression;
pub mod sinks;
pub mod sources;
pub mod split;
pub mod transform;

pub use pipeline::{Pipeline, PipelineError, Report};
