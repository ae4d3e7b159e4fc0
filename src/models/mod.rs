//! Data models for face service entities.
//!
//! This module contains the structures used to represent
//! face service data including:
//!
//! - `PersonGroup`, `Person`: enrollment entities with cached member lists
//! - `TrainingStatus`, `TrainingState`: recognition-model training state
//! - `DetectedFace`, `FaceRectangle`: detection results and bounding boxes
//! - `VerifyResult`, `FaceGrouping`: verification and similarity grouping

pub mod face;
pub mod group;

pub use face::{DetectedFace, FaceAttributeKind, FaceGrouping, FaceRectangle, VerifyResult};
pub use group::{Person, PersonGroup, TrainingState, TrainingStatus};
