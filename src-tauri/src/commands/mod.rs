pub mod invoices;
pub mod settings;

use tauri::{AppHandle, Manager};

use crate::config::AppConfig;
use crate::db::Database;
use crate::document::RenderOptions;
use crate::export::{ExportBackend, JsonBackend, PdfBackend};

pub struct AppState {
    pub db: Database,
    pub config: AppConfig,
}

impl AppState {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::from(&self.config)
    }

    /// `pdf` unless the webview asks for `json`.
    pub fn backend(&self, format: Option<&str>) -> Box<dyn ExportBackend> {
        match format {
            Some("json") => Box::new(JsonBackend),
            _ => Box::new(PdfBackend::with_font(self.config.pdf_font_path.clone())),
        }
    }
}

pub trait AppStateExt {
    fn state_ref(&self) -> &AppState;

    fn db(&self) -> &Database {
        &self.state_ref().db
    }
}

impl AppStateExt for AppHandle {
    fn state_ref(&self) -> &AppState {
        self.state::<AppState>().inner()
    }
}
