//! Repository layer for database operations

pub mod categories;
pub mod locations;
pub mod popularity;
pub mod reviews;
pub mod users;
pub mod votes;

use sqlx::{Pool, Postgres};

use crate::error::{AppError, FieldErrors, NON_FIELD_ERRORS};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Round-trip to the database (readiness probe)
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Field-level messages for each named constraint
fn constraint_fields(constraint: &str) -> Option<(&'static [&'static str], &'static str)> {
    match constraint {
        "locations_coordinates_key" => Some((
            &["latitude", "longitude"],
            "A location with these coordinates already exists",
        )),
        "locations_address_key" => Some((&["address"], "A location with this address already exists")),
        "categories_name_key" => Some((&["name"], "A category with this name already exists")),
        "reviews_location_user_key" => Some((
            &[NON_FIELD_ERRORS],
            "You have already reviewed this location",
        )),
        "review_votes_review_user_key" => Some((
            &[NON_FIELD_ERRORS],
            "You have already voted on this review",
        )),
        _ => None,
    }
}

/// Translate constraint violations into client-facing errors.
///
/// Unique violations become per-field validation errors, foreign-key
/// violations become `not_found` (missing parent). Everything else stays a
/// database error.
pub(crate) fn map_write_error(err: sqlx::Error, missing_parent: &str) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            let constraint = db.constraint().unwrap_or_default();
            let (fields, message) = constraint_fields(constraint)
                .unwrap_or((&[NON_FIELD_ERRORS], "Duplicate value"));
            let mut errors = FieldErrors::new();
            for field in fields {
                errors.insert(field.to_string(), vec![message.to_string()]);
            }
            return AppError::InvalidFields(errors);
        }
        if db.is_foreign_key_violation() {
            return AppError::NotFound(missing_parent.to_string());
        }
    }
    AppError::Database(err)
}
