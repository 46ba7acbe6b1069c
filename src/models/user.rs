use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// Row of the `users` table. `password_hash` must never leave the service;
/// responses go through `dto::user_dto::UserResponse`.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub dob: Option<NaiveDate>,
    pub address: Option<String>,
    pub profile_pic_url: Option<String>,
    pub role: String,
    pub balance: Decimal,
    pub legal: Option<String>,
    pub notes: Option<String>,
    pub is_available: bool,
    pub suspended: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
