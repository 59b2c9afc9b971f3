use std::sync::Arc;

use anyhow::Result;
use dioxus::prelude::*;

use crate::domain::table::TableConfig;
use crate::entities;
use crate::infra::config::{default_config_path, ensure_default_config_file, load_config};
use crate::infra::http::api::HttpRecordApi;
use crate::infra::http::client::build_clients;
use crate::infra::prefs::store::SqlitePrefs;
use crate::ui::table_page::RecordTablePage;
use crate::usecase::ports::api::RecordApi;
use crate::usecase::ports::prefs::PrefsStore;
use crate::usecase::services::export_service::ExportService;

/// Shared service handles passed down to every page. Equality is identity:
/// the services are built once per process and never swapped.
#[derive(Clone)]
pub struct AppServices {
    pub api: Arc<dyn RecordApi>,
    pub prefs: Arc<dyn PrefsStore>,
    pub export: Arc<ExportService>,
}

impl PartialEq for AppServices {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.api, &other.api)
            && Arc::ptr_eq(&self.prefs, &other.prefs)
            && Arc::ptr_eq(&self.export, &other.export)
    }
}

fn build_services() -> Result<AppServices> {
    let config_path = default_config_path()?;
    ensure_default_config_file(&config_path)?;
    let app_config = load_config(&config_path)?;

    let clients = build_clients(&app_config)?;
    let api: Arc<dyn RecordApi> = Arc::new(HttpRecordApi::new(clients));

    let prefs: Arc<dyn PrefsStore> = Arc::new(SqlitePrefs {
        db_path: crate::default_prefs_db_path()?,
    });
    prefs.init();

    let export = Arc::new(ExportService::new(api.clone()));

    Ok(AppServices { api, prefs, export })
}

#[component]
pub fn App() -> Element {
    let services_result = use_hook(|| build_services().map_err(|err| format!("{err:#}")));
    let mut active_page = use_signal(|| 0_usize);
    let configs = use_hook(|| {
        entities::all_configs()
            .into_iter()
            .map(Arc::new)
            .collect::<Vec<Arc<TableConfig>>>()
    });

    let services = match &services_result {
        Ok(services) => services.clone(),
        Err(err) => {
            return rsx! {
                div {
                    p { "Failed to start: {err}" }
                    p { "Check the config file and restart." }
                }
            };
        }
    };

    let Some(active_config) = configs.get(active_page()).cloned() else {
        return rsx! {
            div {
                p { "No pages configured" }
            }
        };
    };
    let active_entity = active_config.entity;

    rsx! {
        div {
            style: "font-family: sans-serif; padding: 10px;",
            nav {
                style: "display: flex; gap: 8px; align-items: center; flex-wrap: wrap; padding: 8px 0; border-bottom: 1px solid #ddd;",
                {configs.iter().enumerate().map(|(idx, config)| {
                    let is_active = config.entity == active_entity;
                    let background = if is_active { "#eef4ff" } else { "#fff" };
                    let title = config.title;
                    rsx!(
                        button {
                            style: "border: 1px solid #bbb; background: {background}; padding: 5px 12px; border-radius: 6px; cursor: pointer;",
                            onclick: move |_| active_page.set(idx),
                            "{title}"
                        }
                    )
                })}
            }

            RecordTablePage {
                key: "{active_entity}",
                config: active_config,
                services: services,
            }
        }
    }
}
