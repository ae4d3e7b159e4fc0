//! Remote adapter for the face service.
//!
//! `FaceApi` is the trait the facade calls through; `RestFaceApi` is the
//! production implementation speaking the v1.0 REST surface with
//! subscription-key authentication.

pub mod adapter;
pub mod error;
pub mod rest;

pub use adapter::FaceApi;
pub use error::ApiError;
pub use rest::RestFaceApi;
