mod classifier;
mod dispatch_service;

pub use classifier::{Classifier, OpenAiClassifier};
pub use dispatch_service::{DispatchOutcome, DispatchService};
