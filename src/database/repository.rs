use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::school::{NewSchool, School};

/// Persistence seam for school records. Handlers only see this trait, so the
/// pool stays owned by the implementation handed over at startup.
#[async_trait]
pub trait SchoolRepository: Send + Sync {
    /// Insert one row and return the generated id
    async fn insert(&self, school: &NewSchool) -> Result<i64, DatabaseError>;

    /// Every row, most recently created first
    async fn list(&self) -> Result<Vec<School>, DatabaseError>;

    /// Round-trip to the store to confirm connectivity
    async fn health_check(&self) -> Result<(), DatabaseError>;
}

pub struct PgSchoolRepository {
    pool: PgPool,
}

impl PgSchoolRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SchoolRepository for PgSchoolRepository {
    async fn insert(&self, school: &NewSchool) -> Result<i64, DatabaseError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO schools (name, address, city, state, contact, email_id, image)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id",
        )
        .bind(&school.name)
        .bind(&school.address)
        .bind(&school.city)
        .bind(&school.state)
        .bind(school.contact)
        .bind(&school.email_id)
        .bind(&school.image)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn list(&self) -> Result<Vec<School>, DatabaseError> {
        // id breaks ties between rows inserted within the same clock tick
        let schools = sqlx::query_as::<_, School>(
            "SELECT id, name, address, city, state, contact, email_id, image, created_at
             FROM schools
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(schools)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
