// Prevents additional console window on Windows in release
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

#[cfg(feature = "desktop")]
fn main() {
    fastinvo_lib::run()
}

#[cfg(not(feature = "desktop"))]
fn main() {
    eprintln!("This binary requires the 'desktop' feature to be enabled.");
    eprintln!("Build with: cargo build --features desktop");
    std::process::exit(1);
}
