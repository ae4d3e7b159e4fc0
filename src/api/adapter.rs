//! Remote adapter trait for the face service.
//!
//! `FaceApi` is the seam between the `FaceClient` facade and the wire. The
//! production implementation is [`RestFaceApi`](super::RestFaceApi); tests
//! substitute an in-memory fake. Every method can fail - no return value
//! signals failure through a sentinel.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{
    DetectedFace, FaceAttributeKind, FaceGrouping, FaceRectangle, Person, PersonGroup,
    TrainingStatus, VerifyResult,
};

#[async_trait]
pub trait FaceApi: Send + Sync {
    // ===== Person groups =====

    /// List all person groups. Returned groups have no member lists loaded.
    async fn list_person_groups(&self) -> Result<Vec<PersonGroup>>;

    /// Get a single person group by id.
    async fn get_person_group(&self, group_id: &str) -> Result<PersonGroup>;

    /// Create a person group under a caller-chosen id.
    async fn create_person_group(
        &self,
        group_id: &str,
        name: &str,
        user_data: Option<&str>,
    ) -> Result<()>;

    /// Update a person group's name and user data.
    async fn update_person_group(
        &self,
        group_id: &str,
        name: &str,
        user_data: Option<&str>,
    ) -> Result<()>;

    /// Delete a person group and everything enrolled under it.
    async fn delete_person_group(&self, group_id: &str) -> Result<()>;

    /// Kick off server-side training for a group. Progress is polled via
    /// [`get_training_status`](Self::get_training_status).
    async fn train_person_group(&self, group_id: &str) -> Result<()>;

    async fn get_training_status(&self, group_id: &str) -> Result<TrainingStatus>;

    // ===== Persons =====

    /// List the people enrolled in a group.
    async fn list_persons(&self, group_id: &str) -> Result<Vec<Person>>;

    /// Create a person in a group, returning the service-assigned person id.
    /// The id is returned as-is; the facade validates usability.
    async fn create_person(
        &self,
        group_id: &str,
        name: &str,
        user_data: Option<&str>,
    ) -> Result<String>;

    async fn update_person(
        &self,
        group_id: &str,
        person_id: &str,
        name: &str,
        user_data: Option<&str>,
    ) -> Result<()>;

    async fn delete_person(&self, group_id: &str, person_id: &str) -> Result<()>;

    // ===== Persisted faces =====

    /// Add a face image to a person, cropped server-side to `target_face`.
    /// Returns the persisted face id.
    async fn add_person_face(
        &self,
        group_id: &str,
        person_id: &str,
        image: &[u8],
        user_data: Option<&str>,
        target_face: Option<FaceRectangle>,
    ) -> Result<String>;

    async fn delete_person_face(
        &self,
        group_id: &str,
        person_id: &str,
        persisted_face_id: &str,
    ) -> Result<()>;

    // ===== Detection / verification / grouping =====

    /// Detect faces in an image.
    async fn detect(
        &self,
        image: &[u8],
        return_face_id: bool,
        return_landmarks: bool,
        attributes: &[FaceAttributeKind],
    ) -> Result<Vec<DetectedFace>>;

    /// Verify whether two detected faces belong to the same person.
    async fn verify_faces(&self, face_id1: &str, face_id2: &str) -> Result<VerifyResult>;

    /// Verify a detected face against an enrolled person.
    async fn verify_person(
        &self,
        face_id: &str,
        group_id: &str,
        person_id: &str,
    ) -> Result<VerifyResult>;

    /// Cluster a set of detected face ids by similarity.
    async fn group_faces(&self, face_ids: &[String]) -> Result<FaceGrouping>;
}
