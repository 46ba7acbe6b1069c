pub mod customers;
pub mod fields;
pub mod health;
pub mod users;

use uuid::Uuid;

use crate::error::{Error, Result};

/// Path ids are trimmed; anything that is not a UUID cannot name a record.
pub(crate) fn parse_record_id(raw: &str, kind: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| Error::NotFound(format!("{} not found", kind)))
}
