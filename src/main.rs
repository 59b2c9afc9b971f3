use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;

mod app;
mod domain;
mod entities;
mod infra;
mod platform;
mod ui;
mod usecase;

#[cfg(test)]
mod tests;

fn main() {
    tracing_subscriber::fmt().init();

    let webview_data_dir =
        default_webview_data_dir().expect("should resolve and create webview data directory");

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new()
                .with_window(dioxus::desktop::WindowBuilder::new().with_title("Leaddesk"))
                .with_data_directory(webview_data_dir),
        )
        .launch(app::App);
}

fn app_data_dir() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("com", "leaddesk", "leaddesk")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))?;
    Ok(project_dirs.data_local_dir().to_path_buf())
}

pub fn default_prefs_db_path() -> Result<PathBuf> {
    Ok(app_data_dir()?.join("uiprefs.sqlite"))
}

fn ensure_webview_data_dir(base_data_dir: &Path) -> Result<PathBuf> {
    let webview_data_dir = base_data_dir.join("webview");
    std::fs::create_dir_all(&webview_data_dir).with_context(|| {
        format!(
            "failed to create webview dir: {}",
            webview_data_dir.display()
        )
    })?;
    Ok(webview_data_dir)
}

fn default_webview_data_dir() -> Result<PathBuf> {
    ensure_webview_data_dir(&app_data_dir()?)
}
