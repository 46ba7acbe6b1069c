pub mod crypto;
pub mod json_text;
pub mod time;
pub mod upload;
