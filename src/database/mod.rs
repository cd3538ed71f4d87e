pub mod manager;
pub mod models;
pub mod repository;

pub use manager::{describe_target, DatabaseError, DatabaseManager};
pub use models::school::{NewSchool, School};
pub use repository::{PgSchoolRepository, SchoolRepository};
