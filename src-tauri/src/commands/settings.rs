use tauri::AppHandle;

use super::AppStateExt;
use crate::actions;
use crate::config::AppConfig;
use crate::models::SellerProfile;

#[tauri::command]
pub fn get_settings(app: AppHandle) -> Result<SellerProfile, String> {
    app.db()
        .get_seller_profile()
        .map(Option::unwrap_or_default)
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub fn save_settings(app: AppHandle, settings: SellerProfile) -> Result<(), String> {
    actions::save_seller_profile(app.db(), &settings).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn get_app_config(app: AppHandle) -> AppConfig {
    app.state_ref().config.clone()
}
