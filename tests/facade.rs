//! Facade behavior tests over an in-memory face service fake.
//!
//! The fake implements `FaceApi`, records call counts per operation, and
//! can be told to fail specific operations, which is enough to pin down
//! the cache-synchronization contract of `FaceClient`.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use facegate::api::ApiError;
use facegate::models::{
    DetectedFace, FaceAttributeKind, FaceGrouping, FaceRectangle, Person, PersonGroup,
    TrainingState, TrainingStatus, VerifyResult,
};
use facegate::{FaceApi, FaceClient};

#[derive(Default)]
struct FakeFaceApi {
    /// Server-side group state. People live in `people`, keyed by group id.
    groups: Mutex<Vec<PersonGroup>>,
    people: Mutex<HashMap<String, Vec<Person>>>,
    calls: Mutex<HashMap<&'static str, usize>>,
    /// Operations that should fail with a server error.
    failing: Mutex<HashSet<&'static str>>,
    /// Override for the id returned by create_person ("" = malformed).
    next_person_id: Mutex<Option<String>>,
}

impl FakeFaceApi {
    fn with_groups(groups: Vec<PersonGroup>) -> Self {
        Self {
            groups: Mutex::new(groups),
            ..Self::default()
        }
    }

    fn calls(&self, operation: &'static str) -> usize {
        *self.calls.lock().unwrap().get(operation).unwrap_or(&0)
    }

    fn fail(&self, operation: &'static str) {
        self.failing.lock().unwrap().insert(operation);
    }

    fn set_next_person_id(&self, id: &str) {
        *self.next_person_id.lock().unwrap() = Some(id.to_string());
    }

    fn record(&self, operation: &'static str) -> Result<()> {
        *self.calls.lock().unwrap().entry(operation).or_insert(0) += 1;
        if self.failing.lock().unwrap().contains(operation) {
            return Err(ApiError::ServerError(format!("{} failed", operation)).into());
        }
        Ok(())
    }
}

fn group(id: &str, name: &str) -> PersonGroup {
    PersonGroup::new(id, name, None)
}

#[async_trait]
impl FaceApi for FakeFaceApi {
    async fn list_person_groups(&self) -> Result<Vec<PersonGroup>> {
        self.record("list_person_groups")?;
        Ok(self.groups.lock().unwrap().clone())
    }

    async fn get_person_group(&self, group_id: &str) -> Result<PersonGroup> {
        self.record("get_person_group")?;
        self.groups
            .lock()
            .unwrap()
            .iter()
            .find(|g| g.id == group_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(group_id.to_string()).into())
    }

    async fn create_person_group(
        &self,
        group_id: &str,
        name: &str,
        user_data: Option<&str>,
    ) -> Result<()> {
        self.record("create_person_group")?;
        self.groups.lock().unwrap().push(PersonGroup::new(
            group_id,
            name,
            user_data.map(str::to_string),
        ));
        Ok(())
    }

    async fn update_person_group(
        &self,
        group_id: &str,
        name: &str,
        user_data: Option<&str>,
    ) -> Result<()> {
        self.record("update_person_group")?;
        let mut groups = self.groups.lock().unwrap();
        let group = groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or_else(|| anyhow::Error::from(ApiError::NotFound(group_id.to_string())))?;
        group.name = name.to_string();
        group.user_data = user_data.map(str::to_string);
        Ok(())
    }

    async fn delete_person_group(&self, group_id: &str) -> Result<()> {
        self.record("delete_person_group")?;
        self.groups.lock().unwrap().retain(|g| g.id != group_id);
        Ok(())
    }

    async fn train_person_group(&self, _group_id: &str) -> Result<()> {
        self.record("train_person_group")
    }

    async fn get_training_status(&self, _group_id: &str) -> Result<TrainingStatus> {
        self.record("get_training_status")?;
        Ok(TrainingStatus {
            status: TrainingState::Succeeded,
            message: None,
            created: None,
            last_action: None,
        })
    }

    async fn list_persons(&self, group_id: &str) -> Result<Vec<Person>> {
        self.record("list_persons")?;
        Ok(self
            .people
            .lock()
            .unwrap()
            .get(group_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_person(
        &self,
        group_id: &str,
        name: &str,
        user_data: Option<&str>,
    ) -> Result<String> {
        self.record("create_person")?;
        let id = self
            .next_person_id
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| format!("person-{}", name));
        if !id.is_empty() {
            self.people
                .lock()
                .unwrap()
                .entry(group_id.to_string())
                .or_default()
                .push(Person::new(&id, name, user_data.map(str::to_string)));
        }
        Ok(id)
    }

    async fn update_person(
        &self,
        _group_id: &str,
        _person_id: &str,
        _name: &str,
        _user_data: Option<&str>,
    ) -> Result<()> {
        self.record("update_person")
    }

    async fn delete_person(&self, group_id: &str, person_id: &str) -> Result<()> {
        self.record("delete_person")?;
        if let Some(people) = self.people.lock().unwrap().get_mut(group_id) {
            people.retain(|p| p.id != person_id);
        }
        Ok(())
    }

    async fn add_person_face(
        &self,
        _group_id: &str,
        _person_id: &str,
        _image: &[u8],
        _user_data: Option<&str>,
        _target_face: Option<FaceRectangle>,
    ) -> Result<String> {
        self.record("add_person_face")?;
        Ok("persisted-face-1".to_string())
    }

    async fn delete_person_face(
        &self,
        _group_id: &str,
        _person_id: &str,
        _persisted_face_id: &str,
    ) -> Result<()> {
        self.record("delete_person_face")
    }

    async fn detect(
        &self,
        _image: &[u8],
        return_face_id: bool,
        _return_landmarks: bool,
        _attributes: &[FaceAttributeKind],
    ) -> Result<Vec<DetectedFace>> {
        self.record("detect")?;
        Ok(vec![DetectedFace {
            face_id: return_face_id.then(|| "face-1".to_string()),
            face_rectangle: FaceRectangle::new(10, 10, 50, 50),
            face_landmarks: None,
            face_attributes: None,
        }])
    }

    async fn verify_faces(&self, _face_id1: &str, _face_id2: &str) -> Result<VerifyResult> {
        self.record("verify_faces")?;
        Ok(VerifyResult {
            is_identical: true,
            confidence: 0.92,
        })
    }

    async fn verify_person(
        &self,
        _face_id: &str,
        _group_id: &str,
        _person_id: &str,
    ) -> Result<VerifyResult> {
        self.record("verify_person")?;
        Ok(VerifyResult {
            is_identical: false,
            confidence: 0.31,
        })
    }

    async fn group_faces(&self, face_ids: &[String]) -> Result<FaceGrouping> {
        self.record("group_faces")?;
        Ok(FaceGrouping {
            groups: vec![face_ids.to_vec()],
            messy_group: vec![],
        })
    }
}

fn client_over(api: Arc<FakeFaceApi>) -> FaceClient {
    FaceClient::with_api(api)
}

/// Group ids are generated client-side as UUIDs: 36 chars, dashed.
fn is_valid_uuid(s: &str) -> bool {
    s.len() == 36
        && s.chars().enumerate().all(|(i, c)| {
            if i == 8 || i == 13 || i == 18 || i == 23 {
                c == '-'
            } else {
                c.is_ascii_hexdigit()
            }
        })
}

// ===== Group list caching =====

#[tokio::test]
async fn group_list_fetches_once_then_serves_cache() {
    let api = Arc::new(FakeFaceApi::with_groups(vec![group("g1", "Team A")]));
    let client = client_over(api.clone());

    let first = client.get_person_groups(false).await.unwrap();
    let second = client.get_person_groups(false).await.unwrap();

    assert_eq!(api.calls("list_person_groups"), 1);
    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].id, "g1");
}

#[tokio::test]
async fn force_refresh_replaces_cache() {
    let api = Arc::new(FakeFaceApi::with_groups(vec![group("g1", "Team A")]));
    let client = client_over(api.clone());

    client.get_person_groups(false).await.unwrap();

    // Server state changes behind the client's back
    api.groups.lock().unwrap().push(group("g2", "Team B"));

    let cached = client.get_person_groups(false).await.unwrap();
    assert_eq!(cached.len(), 1);

    let refreshed = client.get_person_groups(true).await.unwrap();
    assert_eq!(refreshed.len(), 2);
    assert_eq!(api.calls("list_person_groups"), 2);
}

#[tokio::test]
async fn empty_group_list_does_not_populate_cache() {
    let api = Arc::new(FakeFaceApi::default());
    let client = client_over(api.clone());

    assert!(client.get_person_groups(false).await.unwrap().is_empty());
    assert!(client.get_person_groups(false).await.unwrap().is_empty());

    // An empty cached list never short-circuits
    assert_eq!(api.calls("list_person_groups"), 2);
}

#[tokio::test]
async fn list_failure_propagates_and_leaves_cache_empty() {
    let api = Arc::new(FakeFaceApi::with_groups(vec![group("g1", "Team A")]));
    api.fail("list_person_groups");
    let client = client_over(api.clone());

    assert!(client.get_person_groups(false).await.is_err());
}

#[tokio::test]
async fn invalidate_forces_refetch() {
    let api = Arc::new(FakeFaceApi::with_groups(vec![group("g1", "Team A")]));
    let client = client_over(api.clone());

    client.get_person_groups(false).await.unwrap();
    client.invalidate_cache().await;
    client.get_person_groups(false).await.unwrap();

    assert_eq!(api.calls("list_person_groups"), 2);
}

// ===== Group create / update / delete =====

#[tokio::test]
async fn create_group_generates_id_and_caches_unloaded_group() {
    let api = Arc::new(FakeFaceApi::default());
    let client = client_over(api.clone());

    let created = client.create_person_group("Team A", None).await.unwrap();

    assert!(is_valid_uuid(&created.id), "id was {}", created.id);
    assert_eq!(created.name, "Team A");
    assert_eq!(created.user_data, None);
    assert!(created.people.is_none());

    // The fake saw the client-generated id
    assert_eq!(api.groups.lock().unwrap()[0].id, created.id);

    // Present in the cache without a further remote list call
    let groups = client.get_person_groups(false).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].id, created.id);
    assert_eq!(api.calls("list_person_groups"), 0);
}

#[tokio::test]
async fn create_group_failure_leaves_cache_untouched() {
    let api = Arc::new(FakeFaceApi::default());
    api.fail("create_person_group");
    let client = client_over(api.clone());

    assert!(client.create_person_group("Team A", None).await.is_err());

    // Cache stayed empty, so listing goes to the (empty) server
    let groups = client.get_person_groups(false).await.unwrap();
    assert!(groups.is_empty());
}

#[tokio::test]
async fn update_group_mutates_entity_and_cache_after_success() {
    let api = Arc::new(FakeFaceApi::default());
    let client = client_over(api.clone());

    let mut created = client.create_person_group("Team A", None).await.unwrap();
    client
        .update_person_group(&mut created, "Team Alpha", Some("renamed"))
        .await
        .unwrap();

    assert_eq!(created.name, "Team Alpha");
    assert_eq!(created.user_data.as_deref(), Some("renamed"));

    let cached = client.get_person_groups(false).await.unwrap();
    assert_eq!(cached[0].name, "Team Alpha");
    assert_eq!(cached[0].user_data.as_deref(), Some("renamed"));
}

#[tokio::test]
async fn update_group_failure_leaves_entity_unchanged() {
    let api = Arc::new(FakeFaceApi::default());
    let client = client_over(api.clone());

    let mut created = client.create_person_group("Team A", None).await.unwrap();
    api.fail("update_person_group");

    assert!(client
        .update_person_group(&mut created, "Team Alpha", None)
        .await
        .is_err());

    assert_eq!(created.name, "Team A");
    let cached = client.get_person_groups(false).await.unwrap();
    assert_eq!(cached[0].name, "Team A");
}

#[tokio::test]
async fn delete_group_removes_it_from_cache() {
    let api = Arc::new(FakeFaceApi::with_groups(vec![
        group("g1", "Team A"),
        group("g2", "Team B"),
    ]));
    let client = client_over(api.clone());

    client.get_person_groups(false).await.unwrap();
    client.delete_person_group("g1").await.unwrap();

    let groups = client.get_person_groups(false).await.unwrap();
    assert!(!groups.iter().any(|g| g.id == "g1"));
    // Served from cache, no refetch after the delete
    assert_eq!(api.calls("list_person_groups"), 1);
}

#[tokio::test]
async fn delete_group_failure_keeps_cache_entry() {
    let api = Arc::new(FakeFaceApi::with_groups(vec![group("g1", "Team A")]));
    let client = client_over(api.clone());

    client.get_person_groups(false).await.unwrap();
    api.fail("delete_person_group");

    assert!(client.delete_person_group("g1").await.is_err());

    let groups = client.get_person_groups(false).await.unwrap();
    assert!(groups.iter().any(|g| g.id == "g1"));
}

// ===== People =====

#[tokio::test]
async fn people_list_null_fetches_empty_short_circuits() {
    let api = Arc::new(FakeFaceApi::with_groups(vec![group("g1", "Team A")]));
    let client = client_over(api.clone());

    client.get_person_groups(false).await.unwrap();

    // Unloaded: remote fetch, even though the server list is empty
    let people = client.get_people("g1", false).await.unwrap();
    assert!(people.is_empty());
    assert_eq!(api.calls("list_persons"), 1);

    // Loaded-and-empty: short-circuits
    client.get_people("g1", false).await.unwrap();
    assert_eq!(api.calls("list_persons"), 1);

    // Force refresh goes back to the server
    client.get_people("g1", true).await.unwrap();
    assert_eq!(api.calls("list_persons"), 2);
}

#[tokio::test]
async fn create_person_appends_to_loaded_list() {
    let api = Arc::new(FakeFaceApi::with_groups(vec![group("g1", "Team A")]));
    let client = client_over(api.clone());

    client.get_person_groups(false).await.unwrap();
    client.get_people("g1", false).await.unwrap();

    let person = client.create_person("g1", "Ada", Some("lead")).await.unwrap();
    assert_eq!(person.name, "Ada");

    // Cached list grew without another remote fetch
    let people = client.get_people("g1", false).await.unwrap();
    assert_eq!(people.len(), 1);
    assert_eq!(people[0].id, person.id);
    assert_eq!(api.calls("list_persons"), 1);
}

#[tokio::test]
async fn create_person_with_unusable_id_is_malformed_response() {
    let api = Arc::new(FakeFaceApi::with_groups(vec![group("g1", "Team A")]));
    let client = client_over(api.clone());

    client.get_person_groups(false).await.unwrap();
    client.get_people("g1", false).await.unwrap();

    api.set_next_person_id("");
    let err = client.create_person("g1", "Ada", None).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ApiError>(),
        Some(ApiError::InvalidResponse(_))
    ));

    // Not added to the cached people list
    let people = client.get_people("g1", false).await.unwrap();
    assert!(people.is_empty());
}

#[tokio::test]
async fn create_person_failure_leaves_cache_untouched() {
    let api = Arc::new(FakeFaceApi::with_groups(vec![group("g1", "Team A")]));
    let client = client_over(api.clone());

    client.get_person_groups(false).await.unwrap();
    client.get_people("g1", false).await.unwrap();
    api.fail("create_person");

    assert!(client.create_person("g1", "Ada", None).await.is_err());
    assert!(client.get_people("g1", false).await.unwrap().is_empty());
}

#[tokio::test]
async fn create_person_on_unloaded_list_leaves_it_unloaded() {
    let api = Arc::new(FakeFaceApi::with_groups(vec![group("g1", "Team A")]));
    let client = client_over(api.clone());

    client.get_person_groups(false).await.unwrap();
    let person = client.create_person("g1", "Ada", None).await.unwrap();

    // The next people fetch hits the server and sees the person there
    let people = client.get_people("g1", false).await.unwrap();
    assert_eq!(api.calls("list_persons"), 1);
    assert_eq!(people.len(), 1);
    assert_eq!(people[0].id, person.id);
}

#[tokio::test]
async fn update_person_mutates_entity_and_cache() {
    let api = Arc::new(FakeFaceApi::with_groups(vec![group("g1", "Team A")]));
    let client = client_over(api.clone());

    client.get_person_groups(false).await.unwrap();
    client.get_people("g1", false).await.unwrap();
    let mut person = client.create_person("g1", "Ada", None).await.unwrap();

    client
        .update_person(&mut person, "g1", "Ada L.", Some("lead"))
        .await
        .unwrap();

    assert_eq!(person.name, "Ada L.");
    let people = client.get_people("g1", false).await.unwrap();
    assert_eq!(people[0].name, "Ada L.");
    assert_eq!(people[0].user_data.as_deref(), Some("lead"));
}

#[tokio::test]
async fn delete_person_removes_from_cached_list() {
    let api = Arc::new(FakeFaceApi::with_groups(vec![group("g1", "Team A")]));
    let client = client_over(api.clone());

    client.get_person_groups(false).await.unwrap();
    client.get_people("g1", false).await.unwrap();
    let person = client.create_person("g1", "Ada", None).await.unwrap();

    client.delete_person("g1", &person.id).await.unwrap();

    let people = client.get_people("g1", false).await.unwrap();
    assert!(people.is_empty());
    // Still served from cache
    assert_eq!(api.calls("list_persons"), 1);
}

// ===== Pass-through operations =====

#[tokio::test]
async fn training_round_trip() {
    let api = Arc::new(FakeFaceApi::with_groups(vec![group("g1", "Team A")]));
    let client = client_over(api.clone());

    client.train_person_group("g1").await.unwrap();
    let status = client.get_training_status("g1").await.unwrap();

    assert_eq!(status.status, TrainingState::Succeeded);
    assert_eq!(api.calls("train_person_group"), 1);
}

#[tokio::test]
async fn detect_verify_and_group_pass_through() {
    let api = Arc::new(FakeFaceApi::default());
    let client = client_over(api.clone());

    let faces = client
        .detect(b"jpeg bytes", true, false, &[FaceAttributeKind::Age])
        .await
        .unwrap();
    assert_eq!(faces.len(), 1);
    let face_id = faces[0].face_id.clone().unwrap();

    let verify = client.verify_faces(&face_id, "face-2").await.unwrap();
    assert!(verify.is_identical);

    let verify = client.verify_person(&face_id, "g1", "p1").await.unwrap();
    assert!(!verify.is_identical);

    let grouping = client.group_faces(&[face_id.clone()]).await.unwrap();
    assert_eq!(grouping.groups, vec![vec![face_id]]);
}

#[tokio::test]
async fn face_add_and_delete_pass_through() {
    let api = Arc::new(FakeFaceApi::default());
    let client = client_over(api.clone());

    let face_id = client
        .add_person_face(
            "g1",
            "p1",
            b"jpeg bytes",
            None,
            Some(FaceRectangle::new(10, 10, 80, 80)),
        )
        .await
        .unwrap();
    assert_eq!(face_id, "persisted-face-1");

    client.delete_person_face("g1", "p1", &face_id).await.unwrap();
    assert_eq!(api.calls("delete_person_face"), 1);
}

#[tokio::test]
async fn remote_failure_propagates_unchanged() {
    let api = Arc::new(FakeFaceApi::default());
    api.fail("verify_faces");
    let client = client_over(api.clone());

    let err = client.verify_faces("f1", "f2").await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ApiError>(),
        Some(ApiError::ServerError(_))
    ));
}
