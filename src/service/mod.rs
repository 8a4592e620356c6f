//! Course progress, quiz grading and certification rules.
//!
//! Route handlers stay thin and call into here; everything below talks to the
//! database through the model layer and to external platforms through the
//! gateway traits.

pub mod access;
pub mod certificate;
pub mod enrollment;
pub mod error;
pub mod media;
pub mod progress;
pub mod quiz;

pub use error::{ServiceError, ServiceResult};
