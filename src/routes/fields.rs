use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde_json::{Map, Value as JsonValue};

use crate::error::{Error, Result};
use crate::utils::json_text::from_request_value;
use crate::utils::upload::UploadedFile;

/// Multipart field that carries the profile picture.
pub const UPLOAD_FIELD: &str = "profilePic";

/// Body fields of a request, whatever encoding the client used.
///
/// Multipart and urlencoded values arrive as strings; JSON bodies keep their
/// native types. The typed accessors accept both.
#[derive(Debug, Default, Clone)]
pub struct RequestFields {
    values: Map<String, JsonValue>,
    file: Option<UploadedFile>,
}

#[async_trait]
impl<S> FromRequest<S> for RequestFields
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| Error::BadRequest(e.body_text()))?;
            return Self::from_multipart(multipart).await;
        }

        if content_type.starts_with("application/json") {
            let Json(value) = Json::<JsonValue>::from_request(req, state)
                .await
                .map_err(|e| Error::BadRequest(e.body_text()))?;
            return match value {
                JsonValue::Object(values) => Ok(Self { values, file: None }),
                JsonValue::Null => Ok(Self::default()),
                _ => Err(Error::BadRequest("Request body must be a JSON object".into())),
            };
        }

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(pairs) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| Error::BadRequest(e.body_text()))?;
            return Ok(Self::from_pairs(pairs));
        }

        Ok(Self::default())
    }
}

impl RequestFields {
    pub fn from_pairs(pairs: HashMap<String, String>) -> Self {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k, JsonValue::String(v)))
            .collect();
        Self { values, file: None }
    }

    pub fn from_json(values: Map<String, JsonValue>) -> Self {
        Self { values, file: None }
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut fields = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == UPLOAD_FIELD {
                let file_name = field.file_name().unwrap_or("upload.bin").to_string();
                let data = field.bytes().await?;
                // Browsers send an empty part when no file was picked.
                if !data.is_empty() {
                    fields.file = Some(UploadedFile { file_name, data });
                }
                continue;
            }

            let text = field.text().await?;
            fields.values.insert(name, JsonValue::String(text));
        }
        Ok(fields)
    }

    /// Query parameters fill in keys the body did not supply; the body wins.
    pub fn merge_query(mut self, query: HashMap<String, String>) -> Self {
        for (key, value) in query {
            self.values.entry(key).or_insert(JsonValue::String(value));
        }
        self
    }

    pub fn take_file(&mut self) -> Option<UploadedFile> {
        self.file.take()
    }

    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }

    pub fn raw(&self, key: &str) -> Option<&JsonValue> {
        self.values.get(key).filter(|v| !v.is_null())
    }

    /// Text value as sent; empty strings are kept.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.raw(key)? {
            JsonValue::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Text value, treating an empty string as not supplied.
    pub fn non_empty_text(&self, key: &str) -> Option<String> {
        self.text(key).filter(|s| !s.is_empty())
    }

    pub fn flag(&self, key: &str) -> Result<Option<bool>> {
        let Some(value) = self.raw(key) else {
            return Ok(None);
        };
        match value {
            JsonValue::Bool(b) => Ok(Some(*b)),
            JsonValue::Number(n) => Ok(Some(n.as_f64().is_some_and(|f| f != 0.0))),
            JsonValue::String(s) => parse_flag(s)
                .map(Some)
                .ok_or_else(|| Error::BadRequest(format!("{} must be a boolean", key))),
            _ => Err(Error::BadRequest(format!("{} must be a boolean", key))),
        }
    }

    pub fn decimal(&self, key: &str) -> Result<Option<Decimal>> {
        let Some(value) = self.raw(key) else {
            return Ok(None);
        };
        let text = match value {
            JsonValue::Number(n) => n.to_string(),
            JsonValue::String(s) => s.trim().to_string(),
            _ => return Err(Error::BadRequest(format!("{} must be a number", key))),
        };
        text.parse::<Decimal>()
            .or_else(|_| Decimal::from_scientific(&text))
            .map(Some)
            .map_err(|_| Error::BadRequest(format!("{} must be a number", key)))
    }

    /// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp. Empty means not supplied.
    pub fn date(&self, key: &str) -> Result<Option<NaiveDate>> {
        let Some(text) = self.non_empty_text(key) else {
            return Ok(None);
        };
        let text = text.trim();
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .or_else(|_| DateTime::parse_from_rfc3339(text).map(|dt| dt.date_naive()))
            .map(Some)
            .map_err(|_| Error::BadRequest(format!("{} must be a date (YYYY-MM-DD)", key)))
    }

    /// Structured blob. Text that parses as JSON is taken as that JSON, other
    /// text as a JSON string. Empty strings mean not supplied.
    pub fn structured(&self, key: &str) -> Option<JsonValue> {
        match self.raw(key)? {
            JsonValue::String(s) if s.is_empty() => None,
            other => Some(from_request_value(other)),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}
