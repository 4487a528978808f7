pub mod actions;
pub mod calendar;
pub mod config;
pub mod db;
pub mod document;
pub mod editor;
pub mod error;
pub mod export;
pub mod format;
pub mod logging;
pub mod models;
pub mod numbering;
pub mod totals;

#[cfg(feature = "desktop")]
mod commands;


pub use config::AppConfig;
pub use db::Database;
pub use editor::InvoiceEditor;
pub use error::{AppError, AppResult, ValidationError};
pub use export::{ExportBackend, ExportedFile, JsonBackend, PdfBackend};
pub use models::{Invoice, InvoiceSummary, LineItem, SellerProfile, Totals};

#[cfg(feature = "desktop")]
use commands::{invoices, settings, AppState};
#[cfg(feature = "desktop")]
use tauri::Manager;

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    logging::init();

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_fs::init())
        .setup(|app| {
            let config = AppConfig::load(&app.path().app_config_dir()?)?;
            let db = Database::open(&config.database_path(&app.path().app_data_dir()?))?;
            app.manage(AppState { db, config });
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Invoices
            invoices::get_invoices,
            invoices::get_invoice,
            invoices::new_invoice,
            invoices::next_invoice_number,
            invoices::compute_invoice_totals,
            invoices::save_invoice,
            invoices::submit_invoice,
            invoices::export_invoice,
            invoices::delete_invoice,
            // Settings
            settings::get_settings,
            settings::save_settings,
            settings::get_app_config,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
