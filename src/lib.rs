//! Async client for a cloud face-recognition service.
//!
//! The entry point is [`FaceClient`]: an asynchronous facade over the
//! service's person-group, person, training, detection, and verification
//! endpoints, with an in-memory cache of the last-known groups and people.
//! Thumbnail cropping for detected faces is handled locally by the
//! [`thumbnails`] module.
//!
//! ```no_run
//! use facegate::{Config, FaceClient};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = Config::new("https://westus.api.cognitive.microsoft.com/face/v1.0", "key");
//! let client = FaceClient::new(&config)?;
//!
//! let group = client.create_person_group("Team A", None).await?;
//! let person = client.create_person(&group.id, "Ada", None).await?;
//! println!("enrolled {} in {}", person.name, group.name);
//! client.train_person_group(&group.id).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod models;
pub mod thumbnails;

pub use api::{ApiError, FaceApi, RestFaceApi};
pub use client::FaceClient;
pub use config::Config;
pub use models::{
    DetectedFace, FaceAttributeKind, FaceGrouping, FaceRectangle, Person, PersonGroup,
    TrainingState, TrainingStatus, VerifyResult,
};
