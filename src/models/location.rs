//! Location model and related types

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::{category::CategoryShort, weather::HasCoordinates};
use crate::error::{AppError, AppResult};

/// Stored precision of latitude / longitude
pub const COORDINATE_SCALE: u32 = 6;

/// Convert a request coordinate into the stored 6-decimal representation
pub fn coordinate_to_decimal(field: &str, value: f64) -> AppResult<Decimal> {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp(COORDINATE_SCALE))
        .ok_or_else(|| AppError::field(field, "Not a valid number"))
}

fn decimal_to_f64(value: &Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// Location row as returned by list queries, annotated with review metrics
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LocationSummary {
    pub id: Uuid,
    pub name: String,
    pub category_name: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub address: String,
    pub is_active: bool,
    pub view_count: i64,
    /// Mean review rating, 0 without reviews
    pub average_rating: f64,
    pub review_count: i64,
    /// 0.6 * average_rating + 0.3 * review_count + 0.1 * view_count
    pub popularity_score: f64,
}

impl HasCoordinates for LocationSummary {
    fn coordinates(&self) -> (f64, f64) {
        (decimal_to_f64(&self.latitude), decimal_to_f64(&self.longitude))
    }
}

/// Internal row structure for detail queries
#[derive(Debug, Clone, FromRow)]
pub struct LocationRow {
    id: Uuid,
    name: String,
    description: String,
    category_id: Uuid,
    category_name: String,
    latitude: Decimal,
    longitude: Decimal,
    address: String,
    is_active: bool,
    view_count: i64,
    created_at: DateTime<Utc>,
    average_rating: f64,
    review_count: i64,
    popularity_score: f64,
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Location {
            id: row.id,
            name: row.name,
            description: row.description,
            category: CategoryShort {
                id: row.category_id,
                name: row.category_name,
            },
            latitude: row.latitude,
            longitude: row.longitude,
            address: row.address,
            is_active: row.is_active,
            view_count: row.view_count,
            created_at: row.created_at,
            average_rating: row.average_rating,
            review_count: row.review_count,
            popularity_score: row.popularity_score,
        }
    }
}

/// Full location representation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: CategoryShort,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub address: String,
    pub is_active: bool,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub average_rating: f64,
    pub review_count: i64,
    pub popularity_score: f64,
}

impl HasCoordinates for Location {
    fn coordinates(&self) -> (f64, f64) {
        (decimal_to_f64(&self.latitude), decimal_to_f64(&self.longitude))
    }
}

/// Create location request (also used for full replacement with PUT)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateLocation {
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub name: String,
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: String,
    pub category: Uuid,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: f64,
    #[validate(length(min = 1, max = 255, message = "Address must be 1 to 255 characters"))]
    pub address: String,
}

/// Partial location update
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateLocation {
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,
    pub category: Option<Uuid>,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: Option<f64>,
    #[validate(length(min = 1, max = 255, message = "Address must be 1 to 255 characters"))]
    pub address: Option<String>,
}

impl From<CreateLocation> for UpdateLocation {
    fn from(data: CreateLocation) -> Self {
        UpdateLocation {
            name: Some(data.name),
            description: Some(data.description),
            category: Some(data.category),
            latitude: Some(data.latitude),
            longitude: Some(data.longitude),
            address: Some(data.address),
        }
    }
}

/// Location list query parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct LocationQuery {
    /// Filter by category id
    pub category: Option<Uuid>,
    /// Case-insensitive substring of the category name
    pub category_name: Option<String>,
    pub average_rating_min: Option<f64>,
    pub average_rating_max: Option<f64>,
    /// Case-insensitive search in name and description
    pub search: Option<String>,
    /// Sort field, prefix with `-` for descending (default: -created_at)
    pub ordering: Option<String>,
    /// Page number (default: 1)
    pub page: Option<i64>,
    /// Items per page (default: 30)
    pub page_size: Option<i64>,
}

/// Sortable location fields, including the derived metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationOrderField {
    Name,
    ViewCount,
    AverageRating,
    ReviewCount,
    CreatedAt,
    IsActive,
    PopularityScore,
}

impl LocationOrderField {
    pub fn column(&self) -> &'static str {
        match self {
            LocationOrderField::Name => "name",
            LocationOrderField::ViewCount => "view_count",
            LocationOrderField::AverageRating => "average_rating",
            LocationOrderField::ReviewCount => "review_count",
            LocationOrderField::CreatedAt => "created_at",
            LocationOrderField::IsActive => "is_active",
            LocationOrderField::PopularityScore => "popularity_score",
        }
    }
}

impl std::str::FromStr for LocationOrderField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(LocationOrderField::Name),
            "view_count" => Ok(LocationOrderField::ViewCount),
            "average_rating" => Ok(LocationOrderField::AverageRating),
            "review_count" => Ok(LocationOrderField::ReviewCount),
            "created_at" => Ok(LocationOrderField::CreatedAt),
            "is_active" => Ok(LocationOrderField::IsActive),
            "popularity_score" => Ok(LocationOrderField::PopularityScore),
            _ => Err(format!("Cannot order by '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationOrdering {
    pub field: LocationOrderField,
    pub descending: bool,
}

impl Default for LocationOrdering {
    fn default() -> Self {
        Self {
            field: LocationOrderField::CreatedAt,
            descending: true,
        }
    }
}

impl LocationOrdering {
    /// Parse `name` / `-view_count` style ordering parameters
    pub fn parse(raw: Option<&str>) -> AppResult<Self> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::default());
        };
        let (descending, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let field = name
            .parse()
            .map_err(|e: String| AppError::field("ordering", e))?;
        Ok(Self { field, descending })
    }

    pub fn to_sql(&self) -> String {
        let direction = if self.descending { "DESC" } else { "ASC" };
        // Secondary key keeps pages stable when the primary key ties
        format!("{} {}, id ASC", self.field.column(), direction)
    }
}
