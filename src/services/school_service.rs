use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{info, warn};

use crate::database::{DatabaseError, NewSchool, School, SchoolRepository};
use crate::storage::ImageStore;

/// Largest accepted image, in bytes
pub const MAX_IMAGE_BYTES: usize = 5_000_000;

static CONTACT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[6-9][0-9]{9}$").expect("contact pattern compiles"));
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern compiles")
});

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Raw form input, exactly as received. Nothing here has been checked yet.
#[derive(Debug, Clone, Default)]
pub struct SchoolSubmission {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub contact: Option<String>,
    pub email_id: Option<String>,
    pub image: Option<ImageUpload>,
}

/// An uploaded file part. `size` counts every byte received; `bytes` is only
/// filled while the part stays within [`MAX_IMAGE_BYTES`].
#[derive(Debug, Clone, Default)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub size: usize,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("All fields except image are required")]
    MissingFields(Vec<&'static str>),

    #[error("Image size must be less than 5MB")]
    ImageTooLarge(usize),

    #[error("Only image files are allowed")]
    UnsupportedImageType(String),

    #[error("Please enter a valid 10-digit Indian mobile number")]
    InvalidContact,

    #[error("Please enter a valid email address")]
    InvalidEmail,
}

#[derive(Debug, Error)]
pub enum CreateSchoolError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl SchoolSubmission {
    /// Assign a text field by its form name. Returns false for names that are
    /// not part of the record.
    pub fn set_field(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "name" => &mut self.name,
            "address" => &mut self.address,
            "city" => &mut self.city,
            "state" => &mut self.state,
            "contact" => &mut self.contact,
            "email_id" => &mut self.email_id,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    /// Check the submission and split it into the row to insert (without its
    /// image reference) and the image still to be stored.
    ///
    /// Order: required fields, image size, image type, contact, email.
    pub fn validate(self) -> Result<(NewSchool, Option<ImageUpload>), ValidationError> {
        let fields = [
            ("name", &self.name),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("contact", &self.contact),
            ("email_id", &self.email_id),
        ];
        let missing: Vec<&'static str> = fields
            .iter()
            .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
            .map(|(field, _)| *field)
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        // Empty file inputs still arrive as a part; treat them as no image
        let image = self.image.filter(|upload| upload.size > 0);
        if let Some(upload) = &image {
            if upload.size > MAX_IMAGE_BYTES {
                return Err(ValidationError::ImageTooLarge(upload.size));
            }
            if !upload.is_image() {
                return Err(ValidationError::UnsupportedImageType(
                    upload.content_type.clone().unwrap_or_default(),
                ));
            }
        }

        let text = |value: Option<String>| value.map(|v| v.trim().to_string()).unwrap_or_default();

        let contact = text(self.contact);
        if !CONTACT_PATTERN.is_match(&contact) {
            return Err(ValidationError::InvalidContact);
        }
        let contact = contact.parse::<i64>().map_err(|_| ValidationError::InvalidContact)?;

        let email_id = text(self.email_id);
        if !EMAIL_PATTERN.is_match(&email_id) {
            return Err(ValidationError::InvalidEmail);
        }

        let school = NewSchool {
            name: text(self.name),
            address: text(self.address),
            city: text(self.city),
            state: text(self.state),
            contact,
            email_id,
            image: None,
        };
        Ok((school, image))
    }
}

impl ImageUpload {
    /// Declared type must be `image/*`; without one, fall back to the extension
    pub fn is_image(&self) -> bool {
        match self.content_type.as_deref().map(str::trim) {
            Some(content_type) if !content_type.is_empty() => {
                content_type.to_ascii_lowercase().starts_with("image/")
            }
            _ => self
                .file_name
                .rsplit_once('.')
                .map(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false),
        }
    }
}

impl ValidationError {
    /// Form field the error refers to, per violated field
    pub fn fields(&self) -> Vec<&'static str> {
        match self {
            ValidationError::MissingFields(fields) => fields.clone(),
            ValidationError::ImageTooLarge(_) | ValidationError::UnsupportedImageType(_) => vec!["image"],
            ValidationError::InvalidContact => vec!["contact"],
            ValidationError::InvalidEmail => vec!["email_id"],
        }
    }
}

/// Creates and lists school records on top of the injected record and image
/// stores.
#[derive(Clone)]
pub struct SchoolService {
    schools: Arc<dyn SchoolRepository>,
    images: Arc<dyn ImageStore>,
}

impl SchoolService {
    pub fn new(schools: Arc<dyn SchoolRepository>, images: Arc<dyn ImageStore>) -> Self {
        Self { schools, images }
    }

    /// Validate, store the image (if any), then insert exactly one row.
    ///
    /// Nothing is written when validation fails. An image store failure does
    /// not fail the request: the row is inserted with no image.
    pub async fn create(&self, submission: SchoolSubmission) -> Result<i64, CreateSchoolError> {
        let (mut school, image) = submission.validate()?;

        if let Some(upload) = image {
            school.image = self.store_image(&upload).await;
        }

        let id = self.schools.insert(&school).await?;
        info!(school_id = id, has_image = school.image.is_some(), "School added");
        Ok(id)
    }

    pub async fn list(&self) -> Result<Vec<School>, DatabaseError> {
        self.schools.list().await
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        self.schools.health_check().await
    }

    async fn store_image(&self, upload: &ImageUpload) -> Option<String> {
        match self.images.store(&upload.bytes, &upload.file_name).await {
            Ok(reference) => Some(reference),
            Err(e) => {
                warn!(
                    store = self.images.kind(),
                    file_name = %upload.file_name,
                    "Image upload failed, saving school without image: {}",
                    e
                );
                None
            }
        }
    }
}
