//! Data models for Locus

pub mod category;
pub mod location;
pub mod review;
pub mod user;
pub mod vote;
pub mod weather;

// Re-export commonly used types
pub use category::{Category, CategoryShort};
pub use location::{Location, LocationSummary};
pub use review::Review;
pub use user::{UserClaims, UserShort};
pub use vote::{ReviewVote, VoteValue};
pub use weather::{CurrentWeather, Fingerprint, HasCoordinates, WeatherReport};

use serde::{Deserialize, Serialize};

/// Page-number paginated list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    /// Total number of matching records
    pub count: i64,
    /// Current page number
    pub page: i64,
    /// Records per page
    pub page_size: i64,
    pub results: Vec<T>,
}
