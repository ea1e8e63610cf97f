//! Library member model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Member {
    pub member_id: String,
    pub name: String,
    pub address: String,
    pub registration_date: NaiveDate,
}

/// Register member request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateMember {
    #[validate(length(min = 1, message = "Member ID is required"))]
    pub member_id: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub address: String,
    pub registration_date: NaiveDate,
}

impl From<CreateMember> for Member {
    fn from(m: CreateMember) -> Self {
        Self {
            member_id: m.member_id,
            name: m.name,
            address: m.address,
            registration_date: m.registration_date,
        }
    }
}

/// Change of address request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateMemberAddress {
    #[validate(length(min = 1, message = "Address must not be empty"))]
    pub address: String,
}
