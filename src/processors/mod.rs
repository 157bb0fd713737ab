//! Image preprocessing and score post-processing.
//!
//! [`NormalizeImage`] turns decoded RGB images into NCHW tensors for the
//! inference engine; [`transform`] holds the pure score math (softmax,
//! percentage scaling, argmax) shared by both cascade stages.

pub mod normalization;
pub mod transform;

pub use normalization::NormalizeImage;
pub use transform::{argmax, softmax, to_percentages};
