//! Automatic classification and routing of new reports.

pub mod models;
pub mod services;
pub mod workers;

pub use services::{DispatchService, OpenAiClassifier};
pub use workers::DispatchWorker;
