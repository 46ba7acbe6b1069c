//! Turns a sparse [`UserEditSet`] into the list of column assignments for a
//! single `UPDATE users` statement.
//!
//! Text fields (and `dob`, `legal`, `notes`) count as supplied only when they
//! are truthy as sent, so they cannot be cleared through this path. Flags and the
//! balance count as supplied whenever present: `false` and `0` are real edits.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use crate::dto::user_dto::UserEditSet;
use crate::models::user::User;
use crate::utils::json_text::{from_request_value, to_free_form_text, to_stored_text};
use crate::utils::time::now;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserColumn {
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
    Dob,
    Role,
    Balance,
    Legal,
    Notes,
    IsAvailable,
    Suspended,
    ProfilePicUrl,
    UpdatedAt,
}

impl UserColumn {
    pub fn as_str(self) -> &'static str {
        match self {
            UserColumn::FirstName => "first_name",
            UserColumn::LastName => "last_name",
            UserColumn::Email => "email",
            UserColumn::Phone => "phone",
            UserColumn::Address => "address",
            UserColumn::Dob => "dob",
            UserColumn::Role => "role",
            UserColumn::Balance => "balance",
            UserColumn::Legal => "legal",
            UserColumn::Notes => "notes",
            UserColumn::IsAvailable => "is_available",
            UserColumn::Suspended => "suspended",
            UserColumn::ProfilePicUrl => "profile_pic_url",
            UserColumn::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
    Decimal(Decimal),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserUpdate {
    /// Assignments in statement order; always ends with `updated_at`.
    pub fields: Vec<(UserColumn, FieldValue)>,
    /// Edited columns, not counting `updated_at`.
    pub touched_count: usize,
    /// Stored profile picture that a new upload replaces. Safe to discard once
    /// the update has been written.
    pub superseded_upload: Option<String>,
}

impl UserUpdate {
    pub fn get(&self, column: UserColumn) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, v)| v)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdatePlan {
    /// Nothing recognised was supplied; no write should happen.
    NoOp,
    Apply(UserUpdate),
}

fn truthy_text(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.is_empty()).cloned()
}

/// Truthiness of a value as the client sent it. Form fields are strings, so
/// `"0"` and `"false"` count as supplied there.
fn truthy_json(value: &Option<JsonValue>) -> Option<&JsonValue> {
    value.as_ref().filter(|v| match v {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    })
}

/// Edit columns in statement order, without the upload or the timestamp.
fn edit_fields(edits: &UserEditSet) -> Vec<(UserColumn, FieldValue)> {
    let mut fields = Vec::new();

    let texts = [
        (UserColumn::FirstName, &edits.first_name),
        (UserColumn::LastName, &edits.last_name),
        (UserColumn::Email, &edits.email),
        (UserColumn::Phone, &edits.phone),
    ];
    for (column, value) in texts {
        if let Some(text) = truthy_text(value) {
            fields.push((column, FieldValue::Text(text)));
        }
    }
    if let Some(address) = truthy_json(&edits.address) {
        fields.push((UserColumn::Address, FieldValue::Text(to_free_form_text(address))));
    }
    if let Some(dob) = edits.dob {
        fields.push((UserColumn::Dob, FieldValue::Date(dob)));
    }
    if let Some(role) = truthy_text(&edits.role) {
        fields.push((UserColumn::Role, FieldValue::Text(role)));
    }
    if let Some(balance) = edits.balance {
        fields.push((UserColumn::Balance, FieldValue::Decimal(balance)));
    }
    let blobs = [(UserColumn::Legal, &edits.legal), (UserColumn::Notes, &edits.notes)];
    for (column, value) in blobs {
        if let Some(blob) = truthy_json(value) {
            let stored = to_stored_text(&from_request_value(blob));
            fields.push((column, FieldValue::Text(stored)));
        }
    }
    if let Some(available) = edits.is_available {
        fields.push((UserColumn::IsAvailable, FieldValue::Bool(available)));
    }
    if let Some(suspended) = edits.suspended {
        fields.push((UserColumn::Suspended, FieldValue::Bool(suspended)));
    }
    fields
}

/// True when `edits` alone would change at least one column.
pub fn has_edits(edits: &UserEditSet) -> bool {
    !edit_fields(edits).is_empty()
}

/// Builds the update for `existing` from `edits`.
///
/// `new_upload` is the reference of a freshly stored profile picture. When it
/// is absent the stored reference is left alone.
pub fn build_user_update(existing: &User, edits: &UserEditSet, new_upload: Option<&str>) -> UpdatePlan {
    let mut fields = edit_fields(edits);
    if let Some(reference) = new_upload {
        fields.push((UserColumn::ProfilePicUrl, FieldValue::Text(reference.to_string())));
    }

    if fields.is_empty() {
        return UpdatePlan::NoOp;
    }

    let touched_count = fields.len();
    fields.push((UserColumn::UpdatedAt, FieldValue::Timestamp(now())));
    let superseded_upload = new_upload.and_then(|reference| {
        existing
            .profile_pic_url
            .clone()
            .filter(|old| old != reference)
    });
    UpdatePlan::Apply(UserUpdate {
        fields,
        touched_count,
        superseded_upload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn existing() -> User {
        User {
            id: Uuid::new_v4(),
            email: "a@x.com".into(),
            password_hash: None,
            first_name: "A".into(),
            last_name: "B".into(),
            phone: None,
            dob: None,
            address: None,
            profile_pic_url: Some("/uploads/1-old.png".into()),
            role: "staff".into(),
            balance: Decimal::new(500, 0),
            legal: None,
            notes: None,
            is_available: true,
            suspended: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn applied(plan: UpdatePlan) -> UserUpdate {
        match plan {
            UpdatePlan::Apply(update) => update,
            UpdatePlan::NoOp => panic!("expected an update"),
        }
    }

    #[test]
    fn empty_edit_set_is_noop() {
        assert_eq!(build_user_update(&existing(), &UserEditSet::default(), None), UpdatePlan::NoOp);
    }

    #[test]
    fn empty_strings_are_not_edits() {
        let edits = UserEditSet {
            first_name: Some(String::new()),
            role: Some(String::new()),
            address: Some(json!("")),
            legal: Some(JsonValue::Null),
            ..Default::default()
        };
        assert_eq!(build_user_update(&existing(), &edits, None), UpdatePlan::NoOp);
    }

    #[test]
    fn explicit_false_suspension_is_honored() {
        let edits = UserEditSet {
            suspended: Some(false),
            ..Default::default()
        };
        let update = applied(build_user_update(&existing(), &edits, None));
        assert_eq!(update.get(UserColumn::Suspended), Some(&FieldValue::Bool(false)));
        assert_eq!(update.touched_count, 1);
    }

    #[test]
    fn zero_balance_is_honored() {
        let edits = UserEditSet {
            balance: Some(Decimal::ZERO),
            ..Default::default()
        };
        let update = applied(build_user_update(&existing(), &edits, None));
        assert_eq!(update.get(UserColumn::Balance), Some(&FieldValue::Decimal(Decimal::ZERO)));
    }

    #[test]
    fn timestamp_is_always_last() {
        let edits = UserEditSet {
            first_name: Some("Ada".into()),
            is_available: Some(false),
            notes: Some(json!({"tier": "gold"})),
            ..Default::default()
        };
        let update = applied(build_user_update(&existing(), &edits, None));
        let columns: Vec<_> = update.fields.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            columns,
            vec![UserColumn::FirstName, UserColumn::Notes, UserColumn::IsAvailable, UserColumn::UpdatedAt]
        );
        assert_eq!(update.touched_count, 3);
        assert_eq!(
            update.get(UserColumn::Notes),
            Some(&FieldValue::Text(r#"{"tier":"gold"}"#.into()))
        );
    }

    #[test]
    fn upload_reference_overrides_only_when_supplied() {
        let edits = UserEditSet {
            phone: Some("0700".into()),
            ..Default::default()
        };
        let kept = applied(build_user_update(&existing(), &edits, None));
        assert_eq!(kept.get(UserColumn::ProfilePicUrl), None);
        assert_eq!(kept.superseded_upload, None);

        let replaced = applied(build_user_update(&existing(), &UserEditSet::default(), Some("/uploads/2-new.png")));
        assert_eq!(
            replaced.get(UserColumn::ProfilePicUrl),
            Some(&FieldValue::Text("/uploads/2-new.png".into()))
        );
        assert_eq!(replaced.touched_count, 1);
        assert_eq!(replaced.superseded_upload.as_deref(), Some("/uploads/1-old.png"));
    }

    #[test]
    fn form_text_zero_and_false_are_supplied_blobs() {
        let edits = UserEditSet {
            legal: Some(json!("0")),
            notes: Some(json!("false")),
            ..Default::default()
        };
        assert!(has_edits(&edits));
        let update = applied(build_user_update(&existing(), &edits, None));
        assert_eq!(update.get(UserColumn::Legal), Some(&FieldValue::Text("0".into())));
        assert_eq!(update.get(UserColumn::Notes), Some(&FieldValue::Text("false".into())));
        assert_eq!(update.touched_count, 2);
    }

    #[test]
    fn json_false_and_zero_blobs_are_not_supplied() {
        let edits = UserEditSet {
            legal: Some(json!(0)),
            notes: Some(json!(false)),
            ..Default::default()
        };
        assert!(!has_edits(&edits));
        assert_eq!(build_user_update(&existing(), &edits, None), UpdatePlan::NoOp);
    }

    #[test]
    fn embedded_json_text_is_stored_compactly() {
        let edits = UserEditSet {
            legal: Some(json!(r#"{ "nda": true }"#)),
            ..Default::default()
        };
        let update = applied(build_user_update(&existing(), &edits, None));
        assert_eq!(update.get(UserColumn::Legal), Some(&FieldValue::Text(r#"{"nda":true}"#.into())));
    }
}
