//! The prediction cascade and its unified result record.

pub mod cascade;
pub mod result;

pub use cascade::PredictionCascade;
pub use result::{ClassProbability, Prediction, PredictionReport, ScoredClasses, SpeciesPrediction};
