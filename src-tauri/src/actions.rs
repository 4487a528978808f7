//! Handlers for the user actions that touch the store. Each one logs its
//! failure and hands it back; none of them panic or consume the edit buffer.

use chrono::Utc;
use serde::Serialize;

use crate::db::Database;
use crate::document::RenderOptions;
use crate::editor::InvoiceEditor;
use crate::error::AppResult;
use crate::export::{export_document, ExportBackend, ExportedFile};
use crate::models::{Invoice, InvoiceSummary, SellerProfile};

/// Writes the invoice (insert or update by identity). Validation runs first
/// and nothing is written when it fails.
pub fn save_invoice(db: &Database, editor: &mut InvoiceEditor) -> AppResult<Invoice> {
    let record = editor.prepare_submission(Utc::now()).map_err(|e| {
        tracing::warn!(error = %e, "invoice rejected");
        e
    })?;

    let saved = match record.id {
        Some(id) => db.update_invoice(id, &record),
        None => db.insert_invoice(&record),
    }
    .map_err(|e| {
        tracing::error!(error = %e, "saving invoice failed");
        e
    })?;

    editor.mark_saved(saved.clone());
    Ok(saved)
}

/// Save, then render the stored record with the current seller profile.
/// The store write has completed before the profile is read and the document
/// projected.
pub fn submit_and_export(
    db: &Database,
    editor: &mut InvoiceEditor,
    backend: &dyn ExportBackend,
    options: &RenderOptions,
) -> AppResult<(Invoice, ExportedFile)> {
    let saved = save_invoice(db, editor)?;
    let file = export_saved(db, &saved, backend, options)?;
    Ok((saved, file))
}

/// Re-export an invoice already in the store.
pub fn export_invoice(
    db: &Database,
    id: i64,
    backend: &dyn ExportBackend,
    options: &RenderOptions,
) -> AppResult<ExportedFile> {
    let invoice = db
        .get_invoice(id)?
        .ok_or(crate::error::AppError::NotFound(id))?;
    export_saved(db, &invoice, backend, options)
}

fn export_saved(
    db: &Database,
    invoice: &Invoice,
    backend: &dyn ExportBackend,
    options: &RenderOptions,
) -> AppResult<ExportedFile> {
    let seller = db.get_seller_profile()?;
    export_document(backend, invoice, seller.as_ref(), options).map_err(|e| {
        tracing::error!(error = %e, id = ?invoice.id, "export failed");
        e
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
    Missing,
}

/// Asks `confirm` before issuing the delete; the store is not touched unless
/// it answers yes.
pub fn delete_with_confirmation<F>(db: &Database, id: i64, confirm: F) -> AppResult<DeleteOutcome>
where
    F: FnOnce(&InvoiceSummary) -> bool,
{
    let Some(target) = db.get_invoice_summary(id)? else {
        tracing::debug!(id, "delete requested for unknown invoice");
        return Ok(DeleteOutcome::Missing);
    };

    if !confirm(&target) {
        return Ok(DeleteOutcome::Cancelled);
    }

    let deleted = db.delete_invoice(id).map_err(|e| {
        tracing::error!(error = %e, id, "deleting invoice failed");
        e
    })?;

    Ok(if deleted {
        DeleteOutcome::Deleted
    } else {
        DeleteOutcome::Missing
    })
}

pub fn save_seller_profile(db: &Database, profile: &SellerProfile) -> AppResult<()> {
    db.put_seller_profile(profile).map_err(|e| {
        tracing::error!(error = %e, "saving seller profile failed");
        e
    })
}
