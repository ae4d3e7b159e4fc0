//! Person group and person models.

use serde::{Deserialize, Serialize};

/// A named collection of enrolled people, as known to the remote face service.
///
/// `people` is a tri-state: `None` means the member list has never been
/// fetched for this group; `Some(vec![])` means it was fetched and the group
/// has zero members. List operations on the client treat these differently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonGroup {
    #[serde(rename = "personGroupId")]
    pub id: String,
    pub name: String,
    #[serde(rename = "userData")]
    pub user_data: Option<String>,
    #[serde(skip)]
    pub people: Option<Vec<Person>>,
}

impl PersonGroup {
    pub fn new(id: impl Into<String>, name: impl Into<String>, user_data: Option<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            user_data,
            people: None,
        }
    }

    /// Whether the member list has been fetched at least once.
    pub fn people_loaded(&self) -> bool {
        self.people.is_some()
    }
}

/// An enrolled individual within a person group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    #[serde(rename = "personId")]
    pub id: String,
    pub name: String,
    #[serde(rename = "userData")]
    pub user_data: Option<String>,
}

impl Person {
    pub fn new(id: impl Into<String>, name: impl Into<String>, user_data: Option<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            user_data,
        }
    }
}

/// State of a remote training run for a person group.
/// Transient - polled via the training-status endpoint, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingState {
    #[serde(rename = "notstarted")]
    NotStarted,
    Running,
    Succeeded,
    Failed,
}

impl std::fmt::Display for TrainingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrainingState::NotStarted => write!(f, "not started"),
            TrainingState::Running => write!(f, "running"),
            TrainingState::Succeeded => write!(f, "succeeded"),
            TrainingState::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingStatus {
    pub status: TrainingState,
    /// Diagnostic message, populated by the service on failure.
    #[serde(rename = "message")]
    pub message: Option<String>,
    #[serde(rename = "createdDateTime")]
    pub created: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(rename = "lastActionDateTime")]
    pub last_action: Option<chrono::DateTime<chrono::Utc>>,
}

impl TrainingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            TrainingState::Succeeded | TrainingState::Failed
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
