use crate::document::DocumentDescription;
use crate::error::AppResult;

use super::ExportBackend;

/// Pretty-printed description, used for previews and debugging layouts.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonBackend;

impl ExportBackend for JsonBackend {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn render(&self, document: &DocumentDescription) -> AppResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(document)?)
    }
}
