use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

use crate::error::Result;
use crate::models::customer::Customer;
use crate::routes::fields::RequestFields;
use crate::utils::json_text::from_stored_text;

#[derive(Debug, Clone, Default, Validate)]
pub struct RegisterCustomerPayload {
    #[validate(required(message = "First name is required"), length(min = 1))]
    pub first_name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub landline: Option<String>,
    pub mobile: Option<String>,
    pub address: Option<JsonValue>,
    pub balance: Option<Decimal>,
}

impl RegisterCustomerPayload {
    pub fn from_fields(fields: &RequestFields) -> Result<Self> {
        Ok(Self {
            first_name: fields.text("firstName"),
            surname: fields.non_empty_text("surname"),
            email: fields.non_empty_text("email"),
            landline: fields.non_empty_text("landline"),
            mobile: fields.non_empty_text("mobile"),
            address: fields.structured("address"),
            balance: fields.decimal("balance")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub id: Uuid,
    pub first_name: String,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub landline: Option<String>,
    pub mobile: Option<String>,
    pub address: Option<JsonValue>,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Customer> for CustomerResponse {
    fn from(c: Customer) -> Self {
        Self {
            id: c.id,
            first_name: c.first_name,
            surname: c.surname,
            email: c.email,
            landline: c.landline,
            mobile: c.mobile,
            address: c.address.as_deref().map(from_stored_text),
            balance: c.balance,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub customer: CustomerResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerListResponse {
    pub success: bool,
    pub count: usize,
    pub customers: Vec<CustomerResponse>,
}
