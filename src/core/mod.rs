pub mod check;
pub mod converters;
pub mod etl;
pub mod extractor;
pub mod helpers;
pub mod manifest;
pub mod pipeline;
pub mod report;
pub mod sources;

pub use crate::domain::model::{TransformResult, UpdateOutcome};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
