//! Review vote model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;

/// Up or down vote on a review, stored as +1 / -1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub enum VoteValue {
    Upvote,
    Downvote,
}

impl VoteValue {
    pub fn as_i16(self) -> i16 {
        match self {
            VoteValue::Upvote => 1,
            VoteValue::Downvote => -1,
        }
    }
}

impl TryFrom<i16> for VoteValue {
    type Error = String;

    fn try_from(v: i16) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(VoteValue::Upvote),
            -1 => Ok(VoteValue::Downvote),
            other => Err(format!("Invalid vote {}: expected 1 or -1", other)),
        }
    }
}

impl From<VoteValue> for i16 {
    fn from(v: VoteValue) -> Self {
        v.as_i16()
    }
}

impl std::fmt::Display for VoteValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteValue::Upvote => write!(f, "Upvote"),
            VoteValue::Downvote => write!(f, "Downvote"),
        }
    }
}

// SQLx conversion for VoteValue (SMALLINT column)
impl sqlx::Type<Postgres> for VoteValue {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i16 as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for VoteValue {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let v: i16 = Decode::<Postgres>::decode(value)?;
        VoteValue::try_from(v).map_err(|e| e.into())
    }
}

impl Encode<'_, Postgres> for VoteValue {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <i16 as Encode<Postgres>>::encode(self.as_i16(), buf)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ReviewVote {
    pub id: Uuid,
    pub review_id: Uuid,
    pub user_id: Uuid,
    /// 1 = upvote, -1 = downvote
    #[schema(value_type = i16)]
    pub vote: VoteValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create or update vote request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CastVote {
    /// 1 = upvote, -1 = downvote
    #[schema(value_type = i16)]
    pub vote: VoteValue,
}
