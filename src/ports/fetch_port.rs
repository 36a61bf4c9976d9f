//! Source fetching port trait.

use crate::domain::error::EtlError;
use serde_json::Value;

/// Retrieves raw documents from remote sources. Failures map to `EtlError::Fetch`.
pub trait FetchPort {
    fn fetch_text(&self, url: &str) -> Result<String, EtlError>;

    fn fetch_json(&self, url: &str) -> Result<Value, EtlError>;
}
