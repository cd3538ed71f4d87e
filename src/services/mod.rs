pub mod school_service;

pub use school_service::{CreateSchoolError, ImageUpload, SchoolService, SchoolSubmission, ValidationError};
