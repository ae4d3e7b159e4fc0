//! Face detection and verification models.

use serde::{Deserialize, Serialize};

/// Axis-aligned face bounding box in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceRectangle {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl FaceRectangle {
    pub fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Query-parameter encoding used by the add-face endpoint: `left,top,width,height`.
    pub fn to_query(&self) -> String {
        format!("{},{},{},{}", self.left, self.top, self.width, self.height)
    }
}

/// A face found by the detect endpoint.
///
/// Landmark and attribute payloads vary with the request options, so they are
/// kept as raw JSON values rather than typed out field by field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedFace {
    #[serde(rename = "faceId")]
    pub face_id: Option<String>,
    #[serde(rename = "faceRectangle")]
    pub face_rectangle: FaceRectangle,
    #[serde(rename = "faceLandmarks", default, skip_serializing_if = "Option::is_none")]
    pub face_landmarks: Option<serde_json::Value>,
    #[serde(rename = "faceAttributes", default, skip_serializing_if = "Option::is_none")]
    pub face_attributes: Option<serde_json::Value>,
}

/// Attribute sets the detect endpoint can be asked to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceAttributeKind {
    Age,
    Gender,
    Smile,
    Glasses,
    FacialHair,
    HeadPose,
    Emotion,
}

impl FaceAttributeKind {
    /// Wire name used in the `returnFaceAttributes` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            FaceAttributeKind::Age => "age",
            FaceAttributeKind::Gender => "gender",
            FaceAttributeKind::Smile => "smile",
            FaceAttributeKind::Glasses => "glasses",
            FaceAttributeKind::FacialHair => "facialHair",
            FaceAttributeKind::HeadPose => "headPose",
            FaceAttributeKind::Emotion => "emotion",
        }
    }
}

/// Result of verifying two faces, or a face against an enrolled person.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerifyResult {
    #[serde(rename = "isIdentical")]
    pub is_identical: bool,
    pub confidence: f64,
}

/// Result of grouping a set of face ids by similarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceGrouping {
    /// Clusters of face ids judged to belong to the same person.
    pub groups: Vec<Vec<String>>,
    /// Faces that could not be clustered with any other face.
    #[serde(rename = "messyGroup", default)]
    pub messy_group: Vec<String>,
}

// ============================================================================
// Tests
// ============================================================================
