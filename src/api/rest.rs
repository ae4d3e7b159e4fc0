//! REST implementation of the face service adapter.
//!
//! This module provides `RestFaceApi`, which speaks the v1.0 face REST
//! surface: `/persongroups` for enrollment and training, `/detect`,
//! `/verify` and `/group` for recognition. Requests authenticate with a
//! subscription key header.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::models::{
    DetectedFace, FaceAttributeKind, FaceGrouping, FaceRectangle, Person, PersonGroup,
    TrainingStatus, VerifyResult,
};

use super::{ApiError, FaceApi};

/// Header carrying the subscription key on every request.
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// REST adapter for the face service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct RestFaceApi {
    client: Client,
    endpoint: String,
    subscription_key: String,
}

impl RestFaceApi {
    /// Create a new adapter from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            subscription_key: config.subscription_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.subscription_key)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let response = self
            .request(Method::GET, &url)
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    /// Send a JSON body; the face service returns empty bodies for most
    /// mutating calls, so only the status is inspected.
    async fn send_json<B: Serialize>(&self, method: Method, path: &str, body: &B) -> Result<()> {
        let url = self.url(path);
        let response = self
            .request(method.clone(), &url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send {} request to {}", method, url))?;

        Self::check_response(response).await?;
        Ok(())
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        let response = self
            .request(Method::POST, &url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send POST request to {}", url))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    /// POST raw image bytes as an octet-stream, parsing a JSON response.
    /// Query values are percent-encoded by reqwest, so free-text user data
    /// round-trips intact.
    async fn post_image<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        image: &[u8],
    ) -> Result<T> {
        let url = self.url(path);
        let response = self
            .request(Method::POST, &url)
            .query(query)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await
            .with_context(|| format!("Failed to send image to {}", url))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }
}

#[async_trait]
impl FaceApi for RestFaceApi {
    async fn list_person_groups(&self) -> Result<Vec<PersonGroup>> {
        let groups: Vec<PersonGroup> = self.get_json("/persongroups").await?;
        debug!(count = groups.len(), "Listed person groups");
        Ok(groups)
    }

    async fn get_person_group(&self, group_id: &str) -> Result<PersonGroup> {
        self.get_json(&format!("/persongroups/{}", group_id)).await
    }

    async fn create_person_group(
        &self,
        group_id: &str,
        name: &str,
        user_data: Option<&str>,
    ) -> Result<()> {
        let body = GroupBody { name, user_data };
        self.send_json(Method::PUT, &format!("/persongroups/{}", group_id), &body)
            .await
    }

    async fn update_person_group(
        &self,
        group_id: &str,
        name: &str,
        user_data: Option<&str>,
    ) -> Result<()> {
        let body = GroupBody { name, user_data };
        self.send_json(Method::PATCH, &format!("/persongroups/{}", group_id), &body)
            .await
    }

    async fn delete_person_group(&self, group_id: &str) -> Result<()> {
        let url = self.url(&format!("/persongroups/{}", group_id));
        let response = self
            .request(Method::DELETE, &url)
            .send()
            .await
            .with_context(|| format!("Failed to send DELETE request to {}", url))?;
        Self::check_response(response).await?;
        Ok(())
    }

    async fn train_person_group(&self, group_id: &str) -> Result<()> {
        // Train takes an empty body
        self.send_json(
            Method::POST,
            &format!("/persongroups/{}/train", group_id),
            &serde_json::json!({}),
        )
        .await
    }

    async fn get_training_status(&self, group_id: &str) -> Result<TrainingStatus> {
        self.get_json(&format!("/persongroups/{}/training", group_id))
            .await
    }

    async fn list_persons(&self, group_id: &str) -> Result<Vec<Person>> {
        let persons: Vec<Person> = self
            .get_json(&format!("/persongroups/{}/persons", group_id))
            .await?;
        debug!(group_id, count = persons.len(), "Listed persons");
        Ok(persons)
    }

    async fn create_person(
        &self,
        group_id: &str,
        name: &str,
        user_data: Option<&str>,
    ) -> Result<String> {
        let body = GroupBody { name, user_data };
        let created: CreatePersonResponse = self
            .post_json(&format!("/persongroups/{}/persons", group_id), &body)
            .await?;
        Ok(created.person_id.unwrap_or_default())
    }

    async fn update_person(
        &self,
        group_id: &str,
        person_id: &str,
        name: &str,
        user_data: Option<&str>,
    ) -> Result<()> {
        let body = GroupBody { name, user_data };
        self.send_json(
            Method::PATCH,
            &format!("/persongroups/{}/persons/{}", group_id, person_id),
            &body,
        )
        .await
    }

    async fn delete_person(&self, group_id: &str, person_id: &str) -> Result<()> {
        let url = self.url(&format!("/persongroups/{}/persons/{}", group_id, person_id));
        let response = self
            .request(Method::DELETE, &url)
            .send()
            .await
            .with_context(|| format!("Failed to send DELETE request to {}", url))?;
        Self::check_response(response).await?;
        Ok(())
    }

    async fn add_person_face(
        &self,
        group_id: &str,
        person_id: &str,
        image: &[u8],
        user_data: Option<&str>,
        target_face: Option<FaceRectangle>,
    ) -> Result<String> {
        let path = format!(
            "/persongroups/{}/persons/{}/persistedFaces",
            group_id, person_id
        );
        let query = add_face_query(user_data, target_face);

        let added: AddFaceResponse = self.post_image(&path, &query, image).await?;
        Ok(added.persisted_face_id)
    }

    async fn delete_person_face(
        &self,
        group_id: &str,
        person_id: &str,
        persisted_face_id: &str,
    ) -> Result<()> {
        let url = self.url(&format!(
            "/persongroups/{}/persons/{}/persistedFaces/{}",
            group_id, person_id, persisted_face_id
        ));
        let response = self
            .request(Method::DELETE, &url)
            .send()
            .await
            .with_context(|| format!("Failed to send DELETE request to {}", url))?;
        Self::check_response(response).await?;
        Ok(())
    }

    async fn detect(
        &self,
        image: &[u8],
        return_face_id: bool,
        return_landmarks: bool,
        attributes: &[FaceAttributeKind],
    ) -> Result<Vec<DetectedFace>> {
        let mut query = vec![
            ("returnFaceId", return_face_id.to_string()),
            ("returnFaceLandmarks", return_landmarks.to_string()),
        ];
        if !attributes.is_empty() {
            let names: Vec<&str> = attributes.iter().map(|a| a.as_str()).collect();
            query.push(("returnFaceAttributes", names.join(",")));
        }

        let faces: Vec<DetectedFace> = self.post_image("/detect", &query, image).await?;
        debug!(count = faces.len(), "Detected faces");
        Ok(faces)
    }

    async fn verify_faces(&self, face_id1: &str, face_id2: &str) -> Result<VerifyResult> {
        let body = serde_json::json!({
            "faceId1": face_id1,
            "faceId2": face_id2,
        });
        self.post_json("/verify", &body).await
    }

    async fn verify_person(
        &self,
        face_id: &str,
        group_id: &str,
        person_id: &str,
    ) -> Result<VerifyResult> {
        let body = serde_json::json!({
            "faceId": face_id,
            "personGroupId": group_id,
            "personId": person_id,
        });
        self.post_json("/verify", &body).await
    }

    async fn group_faces(&self, face_ids: &[String]) -> Result<FaceGrouping> {
        let body = serde_json::json!({ "faceIds": face_ids });
        self.post_json("/group", &body).await
    }
}

/// Query parameters for the add-face endpoint.
fn add_face_query(
    user_data: Option<&str>,
    target_face: Option<FaceRectangle>,
) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(data) = user_data {
        query.push(("userData", data.to_string()));
    }
    if let Some(rect) = target_face {
        query.push(("targetFace", rect.to_query()));
    }
    query
}

// Internal wire types for request/response bodies

#[derive(Debug, Serialize)]
struct GroupBody<'a> {
    name: &'a str,
    #[serde(rename = "userData", skip_serializing_if = "Option::is_none")]
    user_data: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct CreatePersonResponse {
    #[serde(rename = "personId")]
    person_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AddFaceResponse {
    #[serde(rename = "persistedFaceId")]
    persisted_face_id: String,
}
