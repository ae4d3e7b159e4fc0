//! Asynchronous facade over the face service.
//!
//! `FaceClient` forwards each call to the remote adapter, synchronizes the
//! in-memory group cache after successful mutations, and logs every remote
//! failure before propagating it unchanged. Operations are plain `async fn`s;
//! the returned future is the handle the caller awaits, on whatever runtime
//! the caller provides.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use tracing::{debug, error};
use uuid::Uuid;

use crate::api::{ApiError, FaceApi, RestFaceApi};
use crate::cache::GroupCache;
use crate::config::Config;
use crate::models::{
    DetectedFace, FaceAttributeKind, FaceGrouping, FaceRectangle, Person, PersonGroup,
    TrainingStatus, VerifyResult,
};

/// Log a failed operation before handing the error back to the caller.
/// Every remote call on the facade goes through here; nothing is swallowed
/// and nothing is retried.
async fn log_failure<T, F>(operation: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match fut.await {
        Ok(value) => Ok(value),
        Err(e) => {
            error!(operation, error = %e, "Face service operation failed");
            Err(e)
        }
    }
}

/// Client facade for the face service.
/// Clone is cheap - the adapter and cache are shared behind Arcs.
#[derive(Clone)]
pub struct FaceClient {
    api: Arc<dyn FaceApi>,
    cache: Arc<Mutex<GroupCache>>,
}

impl FaceClient {
    /// Create a client backed by the REST adapter.
    pub fn new(config: &Config) -> Result<Self> {
        let api = RestFaceApi::new(config)?;
        Ok(Self::with_api(Arc::new(api)))
    }

    /// Create a client over a custom adapter. Used by tests and by callers
    /// that bring their own transport.
    pub fn with_api(api: Arc<dyn FaceApi>) -> Self {
        Self {
            api,
            cache: Arc::new(Mutex::new(GroupCache::new())),
        }
    }

    // ===== Person groups =====

    /// List person groups, serving from the cache when it already holds a
    /// non-empty list and `force_refresh` is false. A fetch replaces the
    /// cached list wholesale.
    ///
    /// The cache lock is held across the fetch, so concurrent list calls
    /// serialize instead of racing the same request.
    pub async fn get_person_groups(&self, force_refresh: bool) -> Result<Vec<PersonGroup>> {
        log_failure("get_person_groups", async {
            let mut cache = self.cache.lock().await;
            if cache.is_populated() && !force_refresh {
                debug!(count = cache.groups().len(), "Serving groups from cache");
                return Ok(cache.groups().to_vec());
            }

            let groups = self.api.list_person_groups().await?;
            cache.replace(groups);
            Ok(cache.groups().to_vec())
        })
        .await
    }

    /// Fetch a single group from the server. Does not touch the cache.
    pub async fn get_person_group(&self, group_id: &str) -> Result<PersonGroup> {
        log_failure("get_person_group", self.api.get_person_group(group_id)).await
    }

    /// Create a person group. The group id is generated client-side before
    /// the remote call, so the caller knows it even though the server is the
    /// authority that persists it. The new group enters the cache only after
    /// the remote create succeeds, with its people list unloaded.
    pub async fn create_person_group(
        &self,
        name: &str,
        user_data: Option<&str>,
    ) -> Result<PersonGroup> {
        let group_id = Uuid::new_v4().to_string();

        log_failure("create_person_group", async {
            self.api
                .create_person_group(&group_id, name, user_data)
                .await?;

            let group = PersonGroup::new(group_id.as_str(), name, user_data.map(str::to_string));
            self.cache.lock().await.insert(group.clone());
            Ok(group)
        })
        .await
    }

    /// Update a group's name and user data. The passed-in entity and its
    /// cache copy are mutated only after the remote update succeeds; no
    /// local validation happens beforehand.
    pub async fn update_person_group(
        &self,
        group: &mut PersonGroup,
        name: &str,
        user_data: Option<&str>,
    ) -> Result<()> {
        log_failure("update_person_group", async {
            self.api
                .update_person_group(&group.id, name, user_data)
                .await?;

            group.name = name.to_string();
            group.user_data = user_data.map(str::to_string);

            let mut cache = self.cache.lock().await;
            if let Some(cached) = cache.get_mut(&group.id) {
                cached.name = name.to_string();
                cached.user_data = user_data.map(str::to_string);
            }
            Ok(())
        })
        .await
    }

    /// Delete a group. The cache entry is removed only after the remote
    /// delete succeeds.
    pub async fn delete_person_group(&self, group_id: &str) -> Result<()> {
        log_failure("delete_person_group", async {
            self.api.delete_person_group(group_id).await?;
            self.cache.lock().await.remove(group_id);
            Ok(())
        })
        .await
    }

    /// Kick off server-side training for a group.
    pub async fn train_person_group(&self, group_id: &str) -> Result<()> {
        log_failure("train_person_group", self.api.train_person_group(group_id)).await
    }

    /// Poll the training status for a group. Never cached.
    pub async fn get_training_status(&self, group_id: &str) -> Result<TrainingStatus> {
        log_failure("get_training_status", self.api.get_training_status(group_id)).await
    }

    // ===== Persons =====

    /// List the people in a group. A loaded people list - even an empty
    /// one - short-circuits the remote call unless `force_refresh` is set;
    /// an unloaded (`None`) list always fetches. On fetch the cached
    /// group's people list is replaced wholesale.
    pub async fn get_people(&self, group_id: &str, force_refresh: bool) -> Result<Vec<Person>> {
        log_failure("get_people", async {
            let mut cache = self.cache.lock().await;
            if !force_refresh {
                if let Some(people) = cache.people(group_id) {
                    debug!(group_id, count = people.len(), "Serving people from cache");
                    return Ok(people.to_vec());
                }
            }

            let people = self.api.list_persons(group_id).await?;
            if let Some(group) = cache.get_mut(group_id) {
                group.people = Some(people.clone());
            } else {
                debug!(group_id, "Group not cached; people list not retained");
            }
            Ok(people)
        })
        .await
    }

    /// Create a person in a group. A response without a usable person id is
    /// a malformed-response failure raised here, and the cache is left
    /// untouched. On success the person is appended to the group's people
    /// list if that list has been loaded.
    pub async fn create_person(
        &self,
        group_id: &str,
        name: &str,
        user_data: Option<&str>,
    ) -> Result<Person> {
        log_failure("create_person", async {
            let person_id = self.api.create_person(group_id, name, user_data).await?;

            if person_id.is_empty() {
                return Err(ApiError::InvalidResponse(
                    "create person response returned no usable person id".to_string(),
                )
                .into());
            }

            let person = Person::new(person_id, name, user_data.map(str::to_string));

            let mut cache = self.cache.lock().await;
            if let Some(people) = cache.get_mut(group_id).and_then(|g| g.people.as_mut()) {
                people.push(person.clone());
            }
            Ok(person)
        })
        .await
    }

    /// Update a person's name and user data. The passed-in entity and its
    /// cache copy are mutated only after the remote update succeeds.
    pub async fn update_person(
        &self,
        person: &mut Person,
        group_id: &str,
        name: &str,
        user_data: Option<&str>,
    ) -> Result<()> {
        log_failure("update_person", async {
            self.api
                .update_person(group_id, &person.id, name, user_data)
                .await?;

            person.name = name.to_string();
            person.user_data = user_data.map(str::to_string);

            let mut cache = self.cache.lock().await;
            if let Some(people) = cache.get_mut(group_id).and_then(|g| g.people.as_mut()) {
                if let Some(cached) = people.iter_mut().find(|p| p.id == person.id) {
                    cached.name = name.to_string();
                    cached.user_data = user_data.map(str::to_string);
                }
            }
            Ok(())
        })
        .await
    }

    /// Delete a person. The cached people entry is removed only after the
    /// remote delete succeeds.
    pub async fn delete_person(&self, group_id: &str, person_id: &str) -> Result<()> {
        log_failure("delete_person", async {
            self.api.delete_person(group_id, person_id).await?;

            let mut cache = self.cache.lock().await;
            if let Some(people) = cache.get_mut(group_id).and_then(|g| g.people.as_mut()) {
                people.retain(|p| p.id != person_id);
            }
            Ok(())
        })
        .await
    }

    // ===== Persisted faces =====

    /// Add a face image to a person, optionally cropped to `target_face`.
    /// Returns the persisted face id.
    pub async fn add_person_face(
        &self,
        group_id: &str,
        person_id: &str,
        image: &[u8],
        user_data: Option<&str>,
        target_face: Option<FaceRectangle>,
    ) -> Result<String> {
        log_failure(
            "add_person_face",
            self.api
                .add_person_face(group_id, person_id, image, user_data, target_face),
        )
        .await
    }

    /// Delete a persisted face from a person.
    pub async fn delete_person_face(
        &self,
        group_id: &str,
        person_id: &str,
        persisted_face_id: &str,
    ) -> Result<()> {
        log_failure(
            "delete_person_face",
            self.api
                .delete_person_face(group_id, person_id, persisted_face_id),
        )
        .await
    }

    // ===== Detection / verification / grouping =====

    /// Detect faces in an image.
    pub async fn detect(
        &self,
        image: &[u8],
        return_face_id: bool,
        return_landmarks: bool,
        attributes: &[FaceAttributeKind],
    ) -> Result<Vec<DetectedFace>> {
        log_failure(
            "detect",
            self.api
                .detect(image, return_face_id, return_landmarks, attributes),
        )
        .await
    }

    /// Verify whether two detected faces belong to the same person.
    pub async fn verify_faces(&self, face_id1: &str, face_id2: &str) -> Result<VerifyResult> {
        log_failure("verify_faces", self.api.verify_faces(face_id1, face_id2)).await
    }

    /// Verify a detected face against an enrolled person.
    pub async fn verify_person(
        &self,
        face_id: &str,
        group_id: &str,
        person_id: &str,
    ) -> Result<VerifyResult> {
        log_failure(
            "verify_person",
            self.api.verify_person(face_id, group_id, person_id),
        )
        .await
    }

    /// Cluster a set of detected face ids by similarity.
    pub async fn group_faces(&self, face_ids: &[String]) -> Result<FaceGrouping> {
        log_failure("group_faces", self.api.group_faces(face_ids)).await
    }

    // ===== Cache control =====

    /// Drop all cached groups and people. The next list call refetches.
    pub async fn invalidate_cache(&self) {
        self.cache.lock().await.invalidate();
    }
}
