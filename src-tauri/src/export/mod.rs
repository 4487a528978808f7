//! Export backends turn a [`DocumentDescription`] into file bytes.

mod json;
mod pdf;

use serde::{Deserialize, Serialize};

use crate::document::{project_document_with, DocumentDescription, RenderOptions};
use crate::error::AppResult;
use crate::models::{Invoice, SellerProfile};

pub use json::JsonBackend;
pub use pdf::PdfBackend;

pub trait ExportBackend {
    /// File extension without the dot.
    fn extension(&self) -> &'static str;

    fn render(&self, document: &DocumentDescription) -> AppResult<Vec<u8>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// `Proforma-<client>.pdf` or `Invoice-<client>.pdf`.
pub fn export_file_name(invoice: &Invoice, extension: &str) -> String {
    format!(
        "{}-{}.{}",
        invoice.document_kind(),
        invoice.client_name,
        extension
    )
}

pub fn export_document(
    backend: &dyn ExportBackend,
    invoice: &Invoice,
    seller: Option<&SellerProfile>,
    options: &RenderOptions,
) -> AppResult<ExportedFile> {
    let document = project_document_with(invoice, seller, options);
    let bytes = backend.render(&document)?;
    let file_name = export_file_name(invoice, backend.extension());

    tracing::info!(
        file_name = %file_name,
        size = bytes.len(),
        "document exported"
    );

    Ok(ExportedFile { file_name, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LineItem;

    fn invoice(is_proforma: bool) -> Invoice {
        Invoice {
            client_name: "Hosseini".to_string(),
            is_proforma,
            items: vec![LineItem::new("Laptop", "piece")],
            ..Default::default()
        }
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name(&invoice(false), "pdf"), "Invoice-Hosseini.pdf");
        assert_eq!(export_file_name(&invoice(true), "json"), "Proforma-Hosseini.json");
    }

    #[test]
    fn test_export_document_json() {
        let file = export_document(
            &JsonBackend,
            &invoice(true),
            None,
            &RenderOptions::default(),
        )
        .unwrap();

        assert_eq!(file.file_name, "Proforma-Hosseini.json");
        let parsed: DocumentDescription = serde_json::from_slice(&file.bytes).unwrap();
        assert_eq!(parsed.items.rows.len(), 1);
    }

    #[test]
    fn test_export_document_pdf() {
        let file = export_document(
            &PdfBackend::default(),
            &invoice(false),
            None,
            &RenderOptions::default(),
        )
        .unwrap();

        assert_eq!(file.file_name, "Invoice-Hosseini.pdf");
        assert!(file.bytes.starts_with(b"%PDF"));
    }
}
