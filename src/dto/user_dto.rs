use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

use crate::error::Result;
use crate::models::user::User;
use crate::routes::fields::RequestFields;
use crate::utils::json_text::from_stored_text;

#[derive(Debug, Clone, Default, Validate)]
pub struct RegisterUserPayload {
    #[validate(required(message = "firstName is required"), length(min = 1))]
    pub first_name: Option<String>,
    #[validate(required(message = "lastName is required"), length(min = 1))]
    pub last_name: Option<String>,
    #[validate(required(message = "email is required"), length(min = 1))]
    pub email: Option<String>,
    #[validate(required(message = "password is required"), length(min = 1))]
    pub password: Option<String>,
    #[validate(required(message = "role is required"), length(min = 1))]
    pub role: Option<String>,
    pub phone: Option<String>,
    pub dob: Option<NaiveDate>,
    pub address: Option<JsonValue>,
    pub balance: Option<Decimal>,
    pub legal: Option<JsonValue>,
    pub notes: Option<JsonValue>,
    pub is_available: Option<bool>,
    pub suspended: Option<bool>,
}

impl RegisterUserPayload {
    pub fn from_fields(fields: &RequestFields) -> Result<Self> {
        Ok(Self {
            first_name: fields.text("firstName"),
            last_name: fields.text("lastName"),
            email: fields.text("email"),
            password: fields.text("password"),
            role: fields.text("role"),
            phone: fields.non_empty_text("phone"),
            dob: fields.date("dob")?,
            address: fields.structured("address"),
            balance: fields.decimal("balance")?,
            legal: fields.structured("legal"),
            notes: fields.structured("notes"),
            is_available: fields.flag("isAvailable")?,
            suspended: fields.flag("suspended")?,
        })
    }
}

#[derive(Debug, Clone, Default, Validate)]
pub struct LoginPayload {
    #[validate(required(message = "email is required"), length(min = 1))]
    pub email: Option<String>,
    #[validate(required(message = "password is required"), length(min = 1))]
    pub password: Option<String>,
}

impl LoginPayload {
    pub fn from_fields(fields: &RequestFields) -> Self {
        Self {
            email: fields.text("email"),
            password: fields.text("password"),
        }
    }
}

/// Sparse set of user edits. Text fields and the structured blobs are kept as
/// sent, so the update builder judges "supplied" on what the client wrote.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserEditSet {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<JsonValue>,
    pub dob: Option<NaiveDate>,
    pub role: Option<String>,
    pub balance: Option<Decimal>,
    pub legal: Option<JsonValue>,
    pub notes: Option<JsonValue>,
    pub is_available: Option<bool>,
    pub suspended: Option<bool>,
}

impl UserEditSet {
    pub fn from_fields(fields: &RequestFields) -> Result<Self> {
        Ok(Self {
            first_name: fields.text("firstName"),
            last_name: fields.text("lastName"),
            email: fields.text("email"),
            phone: fields.text("phone"),
            address: fields.raw("address").cloned(),
            dob: fields.date("dob")?,
            role: fields.text("role"),
            balance: fields.decimal("balance")?,
            legal: fields.raw("legal").cloned(),
            notes: fields.raw("notes").cloned(),
            is_available: fields.flag("isAvailable")?,
            suspended: fields.flag("suspended")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub dob: Option<NaiveDate>,
    pub address: Option<String>,
    pub profile_pic_url: Option<String>,
    pub role: String,
    pub balance: Decimal,
    pub legal: Option<JsonValue>,
    pub notes: Option<JsonValue>,
    pub is_available: bool,
    pub suspended: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            phone: u.phone,
            dob: u.dob,
            address: u.address,
            profile_pic_url: u.profile_pic_url,
            role: u.role,
            balance: u.balance,
            legal: u.legal.as_deref().map(from_stored_text),
            notes: u.notes.as_deref().map(from_stored_text),
            is_available: u.is_available,
            suspended: u.suspended,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// What a successful login reveals about the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub phone: Option<String>,
    pub profile_pic_url: Option<String>,
    pub is_available: bool,
    pub suspended: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for LoginUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            role: u.role,
            phone: u.phone,
            profile_pic_url: u.profile_pic_url,
            is_available: u.is_available,
            suspended: u.suspended,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEnvelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub user: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListResponse {
    pub success: bool,
    pub count: usize,
    pub users: Vec<UserResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
