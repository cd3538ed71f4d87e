//! In-memory stand-ins for the record and image stores, plus request helpers
//! for exercising the router without Postgres or Cloudinary.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::config::AppConfig;
use crate::database::{DatabaseError, NewSchool, School, SchoolRepository};
use crate::server::AppState;
use crate::services::SchoolSubmission;
use crate::storage::{ImageStore, ImageStoreError};

/// Submission matching the reference scenario: every required field, no image
pub fn submission() -> SchoolSubmission {
    SchoolSubmission {
        name: Some("Test High".into()),
        address: Some("123 Main Street, Area".into()),
        city: Some("Springfield".into()),
        state: Some("State".into()),
        contact: Some("9876543210".into()),
        email_id: Some("a@b.com".into()),
        image: None,
    }
}

pub const SCENARIO_FIELDS: [(&str, &str); 6] = [
    ("name", "Test High"),
    ("address", "123 Main Street, Area"),
    ("city", "Springfield"),
    ("state", "State"),
    ("contact", "9876543210"),
    ("email_id", "a@b.com"),
];

/// Vec-backed repository; ids count up from 1 like a fresh BIGSERIAL
#[derive(Default)]
pub struct MemorySchoolRepository {
    rows: Mutex<Vec<School>>,
    fail: bool,
}

impl MemorySchoolRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails the way an exhausted pool does
    pub fn failing() -> Self {
        Self { rows: Mutex::new(Vec::new()), fail: true }
    }

    pub fn rows(&self) -> Vec<School> {
        self.rows.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), DatabaseError> {
        if self.fail {
            return Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl SchoolRepository for MemorySchoolRepository {
    async fn insert(&self, school: &NewSchool) -> Result<i64, DatabaseError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let id = rows.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        rows.push(School {
            id,
            name: school.name.clone(),
            address: school.address.clone(),
            city: school.city.clone(),
            state: school.state.clone(),
            contact: school.contact,
            email_id: school.email_id.clone(),
            image: school.image.clone(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<School>, DatabaseError> {
        self.check()?;
        let mut rows = self.rows();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.check()
    }
}

enum ImageMode {
    Local,
    Remote,
    Failing,
}

/// Records calls and hands back references in the shape of the real stores
pub struct MemoryImageStore {
    mode: ImageMode,
    stored: Mutex<Vec<(String, usize)>>,
}

impl MemoryImageStore {
    fn with_mode(mode: ImageMode) -> Self {
        Self { mode, stored: Mutex::new(Vec::new()) }
    }

    pub fn local() -> Self {
        Self::with_mode(ImageMode::Local)
    }

    pub fn remote() -> Self {
        Self::with_mode(ImageMode::Remote)
    }

    pub fn failing() -> Self {
        Self::with_mode(ImageMode::Failing)
    }

    pub fn calls(&self) -> usize {
        self.stored.lock().unwrap().len()
    }

    pub fn stored(&self) -> Vec<(String, usize)> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn store(&self, bytes: &[u8], original_name: &str) -> Result<String, ImageStoreError> {
        self.stored.lock().unwrap().push((original_name.to_string(), bytes.len()));
        match self.mode {
            ImageMode::Local => Ok(format!("1700000000000_{original_name}")),
            ImageMode::Remote => Ok(format!("https://res.example.com/schoolImages/{original_name}")),
            ImageMode::Failing => Err(ImageStoreError::Rejected {
                status: 503,
                message: "upstream unavailable".into(),
            }),
        }
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

pub fn test_config() -> AppConfig {
    AppConfig::from_lookup(|_| None).expect("default configuration is valid")
}

pub fn test_state(schools: Arc<MemorySchoolRepository>, images: Arc<MemoryImageStore>) -> AppState {
    AppState::new(test_config(), schools, images)
}

const BOUNDARY: &str = "----school-directory-test-boundary";

/// Encode a multipart/form-data body; returns `(content_type, body)`
pub fn multipart_body(
    fields: &[(&str, &str)],
    image: Option<(&str, &str, &[u8])>,
) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, content_type, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}
