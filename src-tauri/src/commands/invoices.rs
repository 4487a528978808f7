use serde::Serialize;
use tauri::AppHandle;

use super::AppStateExt;
use crate::actions::{self, DeleteOutcome};
use crate::editor::InvoiceEditor;
use crate::export::ExportedFile;
use crate::models::{Invoice, InvoiceSummary, LineItem, OverallDiscount, Totals};
use crate::totals::compute_totals;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResult {
    pub invoice: Invoice,
    pub file: ExportedFile,
}

#[tauri::command]
pub fn get_invoices(app: AppHandle) -> Result<Vec<InvoiceSummary>, String> {
    app.db().list_invoices().map_err(|e| e.to_string())
}

#[tauri::command]
pub fn get_invoice(app: AppHandle, id: i64) -> Result<Option<Invoice>, String> {
    app.db().get_invoice(id).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn new_invoice(app: AppHandle) -> Result<Invoice, String> {
    let state = app.state_ref();
    InvoiceEditor::new_draft(&state.db, &state.config)
        .map(|editor| editor.invoice().clone())
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub fn next_invoice_number(app: AppHandle) -> Result<String, String> {
    app.db().next_invoice_number().map_err(|e| e.to_string())
}

#[tauri::command]
pub fn compute_invoice_totals(
    items: Vec<LineItem>,
    overall_discount: OverallDiscount,
    tax_percent: f64,
) -> Totals {
    compute_totals(&items, &overall_discount, tax_percent)
}

#[tauri::command]
pub fn save_invoice(app: AppHandle, invoice: Invoice) -> Result<Invoice, String> {
    let state = app.state_ref();
    let mut editor = InvoiceEditor::from_invoice(invoice, &state.config);
    actions::save_invoice(&state.db, &mut editor).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn submit_invoice(
    app: AppHandle,
    invoice: Invoice,
    format: Option<String>,
) -> Result<SubmitResult, String> {
    let state = app.state_ref();
    let mut editor = InvoiceEditor::from_invoice(invoice, &state.config);
    let backend = state.backend(format.as_deref());

    let (invoice, file) = actions::submit_and_export(
        &state.db,
        &mut editor,
        backend.as_ref(),
        &state.render_options(),
    )
    .map_err(|e| e.to_string())?;

    Ok(SubmitResult { invoice, file })
}

#[tauri::command]
pub fn export_invoice(
    app: AppHandle,
    id: i64,
    format: Option<String>,
) -> Result<ExportedFile, String> {
    let state = app.state_ref();
    let backend = state.backend(format.as_deref());
    actions::export_invoice(&state.db, id, backend.as_ref(), &state.render_options())
        .map_err(|e| e.to_string())
}

/// The webview shows its own confirm dialog and passes the answer along.
#[tauri::command]
pub fn delete_invoice(app: AppHandle, id: i64, confirmed: bool) -> Result<DeleteOutcome, String> {
    actions::delete_with_confirmation(app.db(), id, |_| confirmed).map_err(|e| e.to_string())
}
