//! Registration checks shared by the user and customer sign-up paths.
//!
//! Preparing a record validates required fields, rejects identifiers that are
//! already taken and fills in defaults. Nothing is written here; the insert
//! is left to the caller, whose unique indexes still have the final word when
//! two registrations race past the lookup.

use async_trait::async_trait;
use rust_decimal::Decimal;
use validator::Validate;

use crate::dto::customer_dto::RegisterCustomerPayload;
use crate::dto::user_dto::RegisterUserPayload;
use crate::error::{Error, Result};
use crate::utils::json_text::{to_free_form_text, to_stored_text};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn email_taken(&self, email: &str) -> Result<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    /// True when any customer already holds `email` or `mobile`.
    async fn contact_taken(&self, email: Option<String>, mobile: Option<String>) -> Result<bool>;
}

/// User row ready for insertion. The password is still plaintext and is
/// hashed by the service right before the write.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub phone: Option<String>,
    pub dob: Option<chrono::NaiveDate>,
    pub address: Option<String>,
    pub profile_pic_url: Option<String>,
    pub balance: Decimal,
    pub legal: Option<String>,
    pub notes: Option<String>,
    pub is_available: bool,
    pub suspended: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreparedCustomer {
    pub first_name: String,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub landline: Option<String>,
    pub mobile: Option<String>,
    pub address: Option<String>,
    pub balance: Decimal,
}

pub async fn prepare_user<D>(directory: &D, candidate: RegisterUserPayload) -> Result<PreparedUser>
where
    D: UserDirectory + ?Sized,
{
    candidate.validate()?;

    let RegisterUserPayload {
        first_name: Some(first_name),
        last_name: Some(last_name),
        email: Some(email),
        password: Some(password),
        role: Some(role),
        phone,
        dob,
        address,
        balance,
        legal,
        notes,
        is_available,
        suspended,
    } = candidate
    else {
        return Err(Error::BadRequest("Missing required fields.".into()));
    };

    if directory.email_taken(&email).await? {
        return Err(Error::Conflict("User already exists.".into()));
    }

    Ok(PreparedUser {
        email,
        password,
        first_name,
        last_name,
        role,
        phone,
        dob,
        address: address.as_ref().map(to_free_form_text),
        profile_pic_url: None,
        balance: balance.unwrap_or(Decimal::ZERO),
        legal: legal.as_ref().map(to_stored_text),
        notes: notes.as_ref().map(to_stored_text),
        is_available: is_available.unwrap_or(true),
        suspended: suspended.unwrap_or(false),
    })
}

pub async fn prepare_customer<D>(
    directory: &D,
    candidate: RegisterCustomerPayload,
) -> Result<PreparedCustomer>
where
    D: CustomerDirectory + ?Sized,
{
    candidate.validate()?;

    let Some(first_name) = candidate.first_name else {
        return Err(Error::BadRequest("First name is required".into()));
    };

    if (candidate.email.is_some() || candidate.mobile.is_some())
        && directory
            .contact_taken(candidate.email.clone(), candidate.mobile.clone())
            .await?
    {
        return Err(Error::Conflict("Customer already exists".into()));
    }

    Ok(PreparedCustomer {
        first_name,
        surname: candidate.surname,
        email: candidate.email,
        landline: candidate.landline,
        mobile: candidate.mobile,
        address: candidate.address.as_ref().map(to_stored_text),
        balance: candidate.balance.unwrap_or(Decimal::ZERO),
    })
}
