// coursedeck-api: Async Rust client for the course backend

pub mod auth;
pub mod client;
pub mod courses;
pub mod error;
pub mod models;
pub mod transport;

pub use client::CourseClient;
pub use error::Error;
pub use models::{CourseRecord, Envelope, UserRecord};
pub use transport::TransportConfig;
