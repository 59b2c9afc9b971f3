use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use dioxus::prelude::*;
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

use crate::app::AppServices;
use crate::domain::columns::ColumnVisibility;
use crate::domain::query::{FilterKind, FilterSpec, FilterValue, OptionsSource, PerPage};
use crate::domain::table::TableConfig;
use crate::platform::desktop::blocking::run_blocking;
use crate::ui::daterange::DateRangeField;
use crate::ui::state::page_state::{EditForm, PageState};
use crate::usecase::ports::api::{ApiError, RecordApi};
use crate::usecase::ports::prefs::PageScope;
use crate::usecase::services::export_service::ExportOutcome;
use crate::usecase::services::table_session::TableSession;

const CELL_STYLE: &str = "border: 1px solid #bbb; padding: 6px;";
const HEADER_CELL_STYLE: &str = "border: 1px solid #bbb; padding: 6px; background: #f2f2f2;";
const BUTTON_STYLE: &str =
    "border: 1px solid #bbb; background: #fff; padding: 4px 10px; border-radius: 6px; cursor: pointer;";
const MODAL_BACKDROP_STYLE: &str = "position: fixed; inset: 0; background: rgba(0,0,0,0.35); display: flex; align-items: center; justify-content: center; z-index: 1300;";
const MODAL_STYLE: &str = "background: #fff; border-radius: 10px; padding: 16px; min-width: 420px; max-width: 640px; max-height: 80vh; overflow-y: auto;";

/// The one code path that talks to the list endpoint. Every mutation that
/// needs fresh data funnels through here.
fn refresh(
    config: &Arc<TableConfig>,
    api: &Arc<dyn RecordApi>,
    mut session: Signal<TableSession>,
    mut status: Signal<String>,
) {
    let (ticket, query) = {
        let mut guard = session.write();
        let ticket = guard.begin_fetch();
        let query = guard.query();
        (ticket, query)
    };

    let result = run_blocking(|| api.list(config, &query));

    let mut guard = session.write();
    if guard.complete_fetch(ticket, result, config.row_mapper) {
        match &guard.error {
            Some(error) => *status.write() = format!("Load failed: {error}"),
            None => {
                *status.write() =
                    format!("Showing {} of {} records", guard.rows.len(), guard.total);
            }
        }
    }
}

fn confirm(title: &str, description: &str) -> bool {
    MessageDialog::new()
        .set_level(MessageLevel::Warning)
        .set_title(title)
        .set_description(description)
        .set_buttons(MessageButtons::YesNo)
        .show()
        == MessageDialogResult::Yes
}

fn filter_options(
    spec: &FilterSpec,
    facets: &std::collections::BTreeMap<String, Vec<String>>,
) -> Vec<String> {
    match spec.options {
        OptionsSource::None => Vec::new(),
        OptionsSource::Static(options) => options.iter().map(|o| o.to_string()).collect(),
        OptionsSource::Facet(key) => facets.get(key).cloned().unwrap_or_default(),
    }
}

#[component]
pub fn RecordTablePage(config: Arc<TableConfig>, services: AppServices) -> Element {
    let PageState {
        mut session,
        mut visibility,
        mut busy,
        mut status,
        mut columns_menu_open,
        mut detail,
        mut edit,
        mut intake,
    } = PageState::new(&config);

    let entity = config.entity;

    let refresh_now = {
        let api = services.api.clone();
        let config = config.clone();
        Rc::new(RefCell::new(move || {
            refresh(&config, &api, session, status);
        }))
    };

    let refresh_for_init = refresh_now.clone();
    let refresh_for_apply = refresh_now.clone();
    let refresh_for_reset = refresh_now.clone();
    let refresh_for_search = refresh_now.clone();
    let refresh_for_page_prev = refresh_now.clone();
    let refresh_for_page_next = refresh_now.clone();
    let refresh_for_per_page = refresh_now.clone();
    let refresh_for_sort = refresh_now.clone();
    let refresh_for_reload = refresh_now.clone();
    let refresh_for_delete = refresh_now.clone();
    let refresh_for_validate = refresh_now.clone();
    let refresh_for_save = refresh_now.clone();
    let refresh_for_intake = refresh_now.clone();

    let prefs_for_init = services.prefs.clone();
    let prefs_for_columns = services.prefs.clone();
    let prefs_for_per_page = services.prefs.clone();
    let api_for_detail = services.api.clone();
    let api_for_edit = services.api.clone();
    let api_for_delete = services.api.clone();
    let api_for_validate = services.api.clone();
    let api_for_save = services.api.clone();
    let api_for_intake = services.api.clone();
    let export_for_run = services.export.clone();
    let config_for_init = config.clone();
    let config_for_new = config.clone();
    let config_for_columns = config.clone();
    let config_for_detail = config.clone();
    let config_for_edit = config.clone();
    let config_for_delete = config.clone();
    let config_for_validate = config.clone();
    let config_for_save = config.clone();
    let config_for_intake = config.clone();
    let config_for_export = config.clone();

    use_effect(move || {
        let scope = PageScope::new(prefs_for_init.clone(), entity);
        if let Some(keys) = scope.hidden_columns() {
            visibility.set(ColumnVisibility::from_hidden_keys(
                keys,
                &config_for_init.columns,
            ));
        }
        if let Some(per_page) = scope.per_page() {
            let mut guard = session.write();
            let _ = guard.set_per_page(per_page);
        }
        *busy.write() = true;
        (refresh_for_init.borrow_mut())();
        *busy.write() = false;
    });

    // Per-render snapshots: read each signal once, render from the copies.
    let session_snapshot = session();
    let visibility_snapshot = visibility();
    let is_busy = busy();
    let detail_snapshot = detail();
    let edit_snapshot = edit();
    let intake_snapshot = intake();
    let columns_menu_is_open = columns_menu_open();

    let visible_specs: Vec<crate::domain::columns::ColumnSpec> = visibility_snapshot
        .visible_specs(&config.columns)
        .into_iter()
        .cloned()
        .collect();
    let all_columns = config.columns.clone();
    let filter_specs = config.filters.clone();
    let form_fields = config.form_fields;
    let attachment_field = config.attachment_field;
    let rows_snapshot = session_snapshot.rows.clone();
    let facets_snapshot = session_snapshot.facets.clone();
    let pending_snapshot = session_snapshot.pending.clone();
    let quick_search_value = session_snapshot.quick_search.clone();
    let serial_base = (session_snapshot.page.saturating_sub(1))
        * session_snapshot.per_page.as_u64();
    let page_label = format!(
        "Page {} of {} · {} records",
        session_snapshot.page, session_snapshot.last_page, session_snapshot.total
    );
    let per_page_value = session_snapshot.per_page.as_u64().to_string();
    let supports_validate = config.supports_validate;
    let intake_form = config.intake_form;
    let title = config.title;
    let detail_fields: Vec<(&'static str, String)> = detail_snapshot
        .as_ref()
        .map(|record| {
            let mapped = (config.row_mapper)(record);
            config
                .columns
                .iter()
                .filter(|spec| !spec.always_visible)
                .map(|spec| {
                    let value = mapped.fields.get(spec.key).cloned().unwrap_or_default();
                    (spec.label, value)
                })
                .collect()
        })
        .unwrap_or_default();

    rsx! {
        div {
            h2 { "{title}" }

            // Toolbar
            div {
                style: "display: flex; gap: 10px; align-items: center; flex-wrap: wrap; padding: 6px 0;",
                input {
                    disabled: is_busy,
                    value: quick_search_value,
                    placeholder: "Quick search",
                    oninput: move |event| {
                        let refetch = session.write().set_quick_search(event.value());
                        if refetch {
                            *busy.write() = true;
                            (refresh_for_search.borrow_mut())();
                            *busy.write() = false;
                        }
                    },
                }

                button {
                    style: BUTTON_STYLE,
                    disabled: is_busy,
                    onclick: move |_| {
                        let mut guard = session.write();
                        if guard.drawer_open {
                            guard.cancel_drawer();
                        } else {
                            guard.open_drawer();
                        }
                    },
                    if session_snapshot.drawer_open { "Close filters" } else { "Filters" }
                }

                button {
                    style: BUTTON_STYLE,
                    disabled: is_busy,
                    onclick: move |event| {
                        event.stop_propagation();
                        let next = !columns_menu_open();
                        columns_menu_open.set(next);
                    },
                    "Columns"
                }

                button {
                    style: BUTTON_STYLE,
                    disabled: is_busy,
                    onclick: move |_| {
                        *busy.write() = true;
                        (refresh_for_reload.borrow_mut())();
                        *busy.write() = false;
                    },
                    "Reload"
                }

                button {
                    style: BUTTON_STYLE,
                    disabled: is_busy,
                    onclick: move |_| {
                        if busy() {
                            return;
                        }
                        *busy.write() = true;
                        let query = session().query();
                        let rows = session().rows.clone();
                        let visible: Vec<String> = visibility()
                            .visible_specs(&config_for_export.columns)
                            .iter()
                            .map(|spec| spec.key.to_string())
                            .collect();
                        let outcome = run_blocking(|| {
                            export_for_run.run(
                                &config_for_export,
                                &query,
                                &visible,
                                &rows,
                                |suggested| {
                                    FileDialog::new()
                                        .set_file_name(suggested)
                                        .save_file()
                                },
                            )
                        });
                        match outcome {
                            Ok(ExportOutcome::Server { path }) => {
                                *status.write() = format!("Exported to {}", path.display());
                            }
                            Ok(ExportOutcome::Fallback { path, rows }) => {
                                *status.write() = format!(
                                    "Server export failed; saved the {rows} loaded rows to {}",
                                    path.display()
                                );
                            }
                            Ok(ExportOutcome::Cancelled) => {
                                *status.write() = "Export cancelled".to_string();
                            }
                            Err(err) => {
                                *status.write() = format!("{err}");
                            }
                        }
                        *busy.write() = false;
                    },
                    "Export CSV"
                }

                if !intake_form {
                    button {
                        style: BUTTON_STYLE,
                        disabled: is_busy,
                        onclick: move |_| {
                            edit.set(Some(EditForm::empty(&config_for_new)));
                        },
                        "New record"
                    }
                }

                span { " {status}" }
                if session_snapshot.loading {
                    span { "Loading…" }
                }
            }

            if let Some(error) = session_snapshot.error.clone() {
                div {
                    style: "background: #fdecea; border: 1px solid #e6a8a1; color: #8a1f11; padding: 8px 12px; border-radius: 6px; margin: 6px 0;",
                    "{error}"
                }
            }

            // Column visibility menu
            if columns_menu_is_open {
                div {
                    style: "border: 1px solid #bbb; border-radius: 8px; background: #fff; box-shadow: 0 10px 24px rgba(0,0,0,0.15); padding: 8px; margin: 6px 0; max-width: 320px;",
                    onclick: move |event| event.stop_propagation(),
                    {all_columns.iter().map(|spec| {
                        let key = spec.key;
                        let label = spec.label;
                        let locked = spec.always_visible;
                        let hidden = visibility_snapshot.is_hidden(key);
                        let prefs = prefs_for_columns.clone();
                        let config = config_for_columns.clone();
                        rsx!(
                            label {
                                style: "display: flex; align-items: center; gap: 8px; padding: 4px 2px; cursor: pointer;",
                                input {
                                    r#type: "checkbox",
                                    checked: !hidden,
                                    disabled: locked,
                                    onclick: move |_| {
                                        let mut guard = visibility.write();
                                        guard.toggle(key, &config.columns);
                                        let scope = PageScope::new(prefs.clone(), entity);
                                        scope.set_hidden_columns(&guard.hidden_keys());
                                    }
                                }
                                span { "{label}" }
                            }
                        )
                    })}
                    div {
                        style: "display: flex; gap: 6px; margin-top: 6px;",
                        button {
                            style: BUTTON_STYLE,
                            onclick: {
                                let prefs = prefs_for_columns.clone();
                                move |_| {
                                    let mut guard = visibility.write();
                                    guard.show_all();
                                    let scope = PageScope::new(prefs.clone(), entity);
                                    scope.set_hidden_columns(&guard.hidden_keys());
                                }
                            },
                            "Show all"
                        }
                        button {
                            style: BUTTON_STYLE,
                            onclick: {
                                let prefs = prefs_for_columns.clone();
                                let config = config_for_columns.clone();
                                move |_| {
                                    let mut guard = visibility.write();
                                    guard.reset_to_default(&config.columns, config.default_hidden);
                                    let scope = PageScope::new(prefs.clone(), entity);
                                    scope.set_hidden_columns(&guard.hidden_keys());
                                }
                            },
                            "Reset"
                        }
                    }
                }
            }

            // Filter drawer
            if session_snapshot.drawer_open {
                div {
                    style: "border: 1px solid #bbb; border-radius: 8px; background: #fafafa; padding: 10px; margin: 6px 0; display: flex; gap: 14px; flex-wrap: wrap; align-items: flex-start;",
                    {filter_specs.iter().map(|spec| {
                        let key = spec.key;
                        let label = spec.label;
                        let kind = spec.kind;
                        let options = filter_options(spec, &facets_snapshot);
                        let current = pending_snapshot.get(key).cloned();
                        match kind {
                            FilterKind::Text => {
                                let value = match &current {
                                    Some(FilterValue::Text(text)) => text.clone(),
                                    _ => String::new(),
                                };
                                rsx!(
                                    div {
                                        label { "{label} " }
                                        input {
                                            value: value,
                                            oninput: move |event| {
                                                session.write().set_pending(key, FilterValue::Text(event.value()));
                                            },
                                        }
                                    }
                                )
                            }
                            FilterKind::SingleSelect => {
                                let selected = match &current {
                                    Some(FilterValue::Single(Some(value))) => value.clone(),
                                    _ => "All".to_string(),
                                };
                                rsx!(
                                    div {
                                        label { "{label} " }
                                        select {
                                            value: selected,
                                            onchange: move |event| {
                                                let value = event.value();
                                                let next = if value == "All" { None } else { Some(value) };
                                                session.write().set_pending(key, FilterValue::Single(next));
                                            },
                                            option { value: "All", "All" }
                                            for option_value in options.iter().filter(|o| o.as_str() != "All") {
                                                option { value: "{option_value}", "{option_value}" }
                                            }
                                        }
                                    }
                                )
                            }
                            FilterKind::MultiSelect => {
                                let chosen: Vec<String> = match &current {
                                    Some(FilterValue::Multi(values)) => values.clone(),
                                    _ => Vec::new(),
                                };
                                rsx!(
                                    div {
                                        span { "{label}" }
                                        div {
                                            style: "display: flex; flex-direction: column; gap: 2px; max-height: 160px; overflow-y: auto; border: 1px solid #ddd; border-radius: 6px; padding: 4px; background: #fff;",
                                            {options.iter().map(|option_value| {
                                                let option_value = option_value.clone();
                                                let checked = chosen.contains(&option_value);
                                                let chosen = chosen.clone();
                                                rsx!(
                                                    label {
                                                        style: "display: flex; align-items: center; gap: 6px;",
                                                        input {
                                                            r#type: "checkbox",
                                                            checked: checked,
                                                            onclick: move |_| {
                                                                let mut next = chosen.clone();
                                                                if checked {
                                                                    next.retain(|v| v != &option_value);
                                                                } else {
                                                                    next.push(option_value.clone());
                                                                }
                                                                session.write().set_pending(key, FilterValue::Multi(next));
                                                            }
                                                        }
                                                        span { "{option_value}" }
                                                    }
                                                )
                                            })}
                                        }
                                    }
                                )
                            }
                            FilterKind::DateRange => {
                                let (range_start, range_end) = match &current {
                                    Some(FilterValue::DateRange { start, end }) => (*start, *end),
                                    _ => (None, None),
                                };
                                rsx!(
                                    div {
                                        DateRangeField {
                                            label: label.to_string(),
                                            start: range_start,
                                            end: range_end,
                                            on_change: move |(from, to): (Option<chrono::NaiveDate>, Option<chrono::NaiveDate>)| {
                                                session.write().set_pending(key, FilterValue::DateRange { start: from, end: to });
                                            },
                                        }
                                    }
                                )
                            }
                        }
                    })}

                    div {
                        style: "display: flex; gap: 6px; align-self: flex-end;",
                        button {
                            style: BUTTON_STYLE,
                            onclick: move |_| {
                                let refetch = session.write().apply_filters();
                                if refetch {
                                    *busy.write() = true;
                                    (refresh_for_apply.borrow_mut())();
                                    *busy.write() = false;
                                    *status.write() = "Filters applied".to_string();
                                }
                            },
                            "Apply"
                        }
                        button {
                            style: BUTTON_STYLE,
                            onclick: {
                                let config = config.clone();
                                move |_| {
                                    let refetch = session.write().reset_filters(&config);
                                    if refetch {
                                        *busy.write() = true;
                                        (refresh_for_reset.borrow_mut())();
                                        *busy.write() = false;
                                        *status.write() = "Filters reset".to_string();
                                    }
                                }
                            },
                            "Reset"
                        }
                        button {
                            style: BUTTON_STYLE,
                            onclick: move |_| {
                                session.write().cancel_drawer();
                            },
                            "Cancel"
                        }
                    }
                }
            }

            // Intake form
            if intake_form {
                div {
                    style: "border: 1px solid #bbb; border-radius: 8px; background: #f7fbf7; padding: 10px; margin: 6px 0;",
                    h3 { "Log a call" }
                    if let Some(message) = intake_snapshot.message.clone() {
                        p { style: "color: #8a1f11;", "{message}" }
                    }
                    div {
                        style: "display: flex; gap: 10px; flex-wrap: wrap;",
                        {form_fields.iter().map(|(key, label, required)| {
                            let key = *key;
                            let label = *label;
                            let required = *required;
                            let value = intake_snapshot.values.get(key).cloned().unwrap_or_default();
                            let field_errors = intake_snapshot.errors.get(key).cloned().unwrap_or_default();
                            rsx!(
                                div {
                                    label {
                                        if required { "{label} *" } else { "{label}" }
                                    }
                                    input {
                                        value: value,
                                        oninput: move |event| {
                                            intake.write().set(key, event.value());
                                        },
                                    }
                                    for message in field_errors {
                                        p { style: "color: #8a1f11; font-size: 12px; margin: 2px 0;", "{message}" }
                                    }
                                }
                            )
                        })}
                    }
                    button {
                        style: BUTTON_STYLE,
                        disabled: is_busy || intake_snapshot.submitting,
                        onclick: move |_| {
                            let form = intake();
                            let required = form.required_errors(&config_for_intake);
                            if !required.is_empty() {
                                let mut guard = intake.write();
                                guard.errors = required;
                                guard.message = Some("Please fill the required fields".to_string());
                                return;
                            }
                            {
                                let mut guard = intake.write();
                                guard.submitting = true;
                                guard.errors.clear();
                                guard.message = None;
                            }
                            *busy.write() = true;
                            let payload = form.payload(&config_for_intake);
                            let result = run_blocking(|| {
                                api_for_intake.create(&config_for_intake, payload)
                            });
                            match result {
                                Ok(_) => {
                                    intake.set(EditForm::empty(&config_for_intake));
                                    *status.write() = "Call logged".to_string();
                                    (refresh_for_intake.borrow_mut())();
                                }
                                Err(ApiError::Validation { message, errors }) => {
                                    let mut guard = intake.write();
                                    guard.submitting = false;
                                    guard.errors = errors;
                                    guard.message = Some(message);
                                }
                                Err(err) => {
                                    let mut guard = intake.write();
                                    guard.submitting = false;
                                    guard.message = Some(err.to_string());
                                }
                            }
                            *busy.write() = false;
                        },
                        "Log call"
                    }
                }
            }

            // Table
            table { style: "border-collapse: collapse; width: 100%; border: 1px solid #bbb;",
                thead {
                    tr {
                        {visible_specs.iter().map(|spec| {
                            let key = spec.key;
                            let label = spec.label;
                            let sortable = spec.sortable;
                            let arrow = match &session_snapshot.sort {
                                Some(sort) if sort.field == key => match sort.direction {
                                    crate::domain::query::SortDirection::Asc => " ↑",
                                    crate::domain::query::SortDirection::Desc => " ↓",
                                },
                                _ => "",
                            };
                            let cursor = if sortable { "cursor: pointer;" } else { "" };
                            let spec_for_sort = spec.clone();
                            let refresh = refresh_for_sort.clone();
                            rsx!(
                                th {
                                    style: "{HEADER_CELL_STYLE} {cursor}",
                                    onclick: move |_| {
                                        if !sortable || busy() {
                                            return;
                                        }
                                        let refetch = session.write().toggle_sort(&spec_for_sort);
                                        if refetch {
                                            *busy.write() = true;
                                            (refresh.borrow_mut())();
                                            *busy.write() = false;
                                        }
                                    },
                                    "{label}{arrow}"
                                }
                            )
                        })}
                    }
                }
                tbody {
                    if rows_snapshot.is_empty() {
                        tr {
                            td { style: CELL_STYLE,
                                colspan: visible_specs.len().max(1),
                                "No records found"
                            }
                        }
                    } else {
                        {rows_snapshot.iter().enumerate().map(|(idx, row)| {
                            let serial = serial_base + idx as u64 + 1;
                            let row_id = row.id.clone().unwrap_or_default();
                            let fields = row.fields.clone();
                            let visible_specs = visible_specs.clone();
                            let api_for_detail = api_for_detail.clone();
                            let api_for_edit = api_for_edit.clone();
                            let api_for_delete = api_for_delete.clone();
                            let api_for_validate = api_for_validate.clone();
                            let config_for_detail = config_for_detail.clone();
                            let config_for_edit = config_for_edit.clone();
                            let config_for_delete = config_for_delete.clone();
                            let config_for_validate = config_for_validate.clone();
                            let refresh_for_delete = refresh_for_delete.clone();
                            let refresh_for_validate = refresh_for_validate.clone();
                            rsx!(
                                tr {
                                    {visible_specs.iter().map(|spec| {
                                        match spec.key {
                                            "serial" => rsx!(td { style: CELL_STYLE, "{serial}" }),
                                            "actions" => {
                                                let id_for_view = row_id.clone();
                                                let id_for_edit = row_id.clone();
                                                let id_for_delete = row_id.clone();
                                                let id_for_validate = row_id.clone();
                                                let api_view = api_for_detail.clone();
                                                let api_edit = api_for_edit.clone();
                                                let api_delete = api_for_delete.clone();
                                                let api_validate = api_for_validate.clone();
                                                let config_view = config_for_detail.clone();
                                                let config_edit = config_for_edit.clone();
                                                let config_delete = config_for_delete.clone();
                                                let config_validate = config_for_validate.clone();
                                                let refresh_delete = refresh_for_delete.clone();
                                                let refresh_validate = refresh_for_validate.clone();
                                                rsx!(
                                                    td { style: CELL_STYLE,
                                                        div {
                                                            style: "display: flex; gap: 4px;",
                                                            button {
                                                                style: BUTTON_STYLE,
                                                                disabled: is_busy,
                                                                onclick: move |_| {
                                                                    if id_for_view.is_empty() || busy() {
                                                                        return;
                                                                    }
                                                                    *busy.write() = true;
                                                                    let id = id_for_view.clone();
                                                                    let result = run_blocking(|| api_view.detail(&config_view, &id));
                                                                    match result {
                                                                        Ok(record) => detail.set(Some(record)),
                                                                        Err(err) => *status.write() = format!("View failed: {err}"),
                                                                    }
                                                                    *busy.write() = false;
                                                                },
                                                                "View"
                                                            }
                                                            button {
                                                                style: BUTTON_STYLE,
                                                                disabled: is_busy,
                                                                onclick: move |_| {
                                                                    if id_for_edit.is_empty() || busy() {
                                                                        return;
                                                                    }
                                                                    *busy.write() = true;
                                                                    let id = id_for_edit.clone();
                                                                    let result = run_blocking(|| api_edit.detail(&config_edit, &id));
                                                                    match result {
                                                                        Ok(record) => edit.set(Some(EditForm::from_record(&config_edit, &record))),
                                                                        Err(err) => *status.write() = format!("Edit failed: {err}"),
                                                                    }
                                                                    *busy.write() = false;
                                                                },
                                                                "Edit"
                                                            }
                                                            button {
                                                                style: BUTTON_STYLE,
                                                                disabled: is_busy,
                                                                onclick: move |_| {
                                                                    if id_for_delete.is_empty() || busy() {
                                                                        return;
                                                                    }
                                                                    if !confirm(
                                                                        "Confirm delete",
                                                                        "Delete this record? This cannot be undone.",
                                                                    ) {
                                                                        return;
                                                                    }
                                                                    *busy.write() = true;
                                                                    let id = id_for_delete.clone();
                                                                    let result = run_blocking(|| api_delete.delete(&config_delete, &id));
                                                                    match result {
                                                                        Ok(()) => {
                                                                            *status.write() = "Record deleted".to_string();
                                                                            (refresh_delete.borrow_mut())();
                                                                        }
                                                                        Err(err) => *status.write() = format!("Delete failed: {err}"),
                                                                    }
                                                                    *busy.write() = false;
                                                                },
                                                                "Delete"
                                                            }
                                                            if supports_validate {
                                                                button {
                                                                    style: BUTTON_STYLE,
                                                                    disabled: is_busy,
                                                                    onclick: move |_| {
                                                                        if id_for_validate.is_empty() || busy() {
                                                                            return;
                                                                        }
                                                                        if !confirm(
                                                                            "Confirm validation",
                                                                            "Mark this lead as validated?",
                                                                        ) {
                                                                            return;
                                                                        }
                                                                        *busy.write() = true;
                                                                        let id = id_for_validate.clone();
                                                                        let result = run_blocking(|| api_validate.validate(&config_validate, &id));
                                                                        match result {
                                                                            Ok(()) => {
                                                                                *status.write() = "Lead validated".to_string();
                                                                                (refresh_validate.borrow_mut())();
                                                                            }
                                                                            Err(err) => *status.write() = format!("Validate failed: {err}"),
                                                                        }
                                                                        *busy.write() = false;
                                                                    },
                                                                    "Validate"
                                                                }
                                                            }
                                                        }
                                                    }
                                                )
                                            }
                                            _ => {
                                                let text = fields.get(spec.key).cloned().unwrap_or_default();
                                                rsx!(td { style: CELL_STYLE, "{text}" })
                                            }
                                        }
                                    })}
                                }
                            )
                        })}
                    }
                }
            }

            // Pagination bar
            div {
                style: "display: flex; gap: 10px; align-items: center; padding: 8px 0;",
                button {
                    style: BUTTON_STYLE,
                    disabled: is_busy || session_snapshot.page <= 1,
                    onclick: move |_| {
                        let current = session().page;
                        let refetch = session.write().set_page(current.saturating_sub(1));
                        if refetch {
                            *busy.write() = true;
                            (refresh_for_page_prev.borrow_mut())();
                            *busy.write() = false;
                        }
                    },
                    "Previous"
                }
                span { "{page_label}" }
                button {
                    style: BUTTON_STYLE,
                    disabled: is_busy || session_snapshot.page >= session_snapshot.last_page,
                    onclick: move |_| {
                        let current = session().page;
                        let refetch = session.write().set_page(current + 1);
                        if refetch {
                            *busy.write() = true;
                            (refresh_for_page_next.borrow_mut())();
                            *busy.write() = false;
                        }
                    },
                    "Next"
                }
                label { "Per page " }
                select {
                    disabled: is_busy,
                    value: per_page_value,
                    onchange: {
                        let prefs = prefs_for_per_page.clone();
                        move |event| {
                            let Some(per_page) = event
                                .value()
                                .parse::<u64>()
                                .ok()
                                .and_then(PerPage::from_u64)
                            else {
                                return;
                            };
                            let refetch = session.write().set_per_page(per_page);
                            if refetch {
                                let scope = PageScope::new(prefs.clone(), entity);
                                scope.set_per_page(per_page);
                                *busy.write() = true;
                                (refresh_for_per_page.borrow_mut())();
                                *busy.write() = false;
                            }
                        }
                    },
                    for choice in PerPage::ALL {
                        option { value: "{choice.as_u64()}", "{choice.as_u64()}" }
                    }
                }
            }

            // Detail modal
            if detail_snapshot.is_some() {
                div {
                    style: MODAL_BACKDROP_STYLE,
                    onclick: move |_| detail.set(None),
                    div {
                        style: MODAL_STYLE,
                        onclick: move |event| event.stop_propagation(),
                        h3 { "Record details" }
                        table { style: "border-collapse: collapse; width: 100%;",
                            {detail_fields.iter().map(|(field_label, value)| {
                                rsx!(
                                    tr {
                                        td { style: "{CELL_STYLE} font-weight: bold; width: 160px;", "{field_label}" }
                                        td { style: CELL_STYLE, "{value}" }
                                    }
                                )
                            })}
                        }
                        div {
                            style: "display: flex; justify-content: flex-end; margin-top: 10px;",
                            button {
                                style: BUTTON_STYLE,
                                onclick: move |_| detail.set(None),
                                "Close"
                            }
                        }
                    }
                }
            }

            // Create/edit modal
            if let Some(form) = edit_snapshot.clone() {
                div {
                    style: MODAL_BACKDROP_STYLE,
                    div {
                        style: MODAL_STYLE,
                        onclick: move |event| event.stop_propagation(),
                        h3 {
                            if form.id.is_some() { "Edit record" } else { "New record" }
                        }
                        if let Some(message) = form.message.clone() {
                            p { style: "color: #8a1f11;", "{message}" }
                        }
                        {form_fields.iter().map(|(key, label, required)| {
                            let key = *key;
                            let label = *label;
                            let required = *required;
                            let value = form.values.get(key).cloned().unwrap_or_default();
                            let field_errors = form.errors.get(key).cloned().unwrap_or_default();
                            let is_attachment = attachment_field == Some(key);
                            let staged_file = form
                                .attachment
                                .as_ref()
                                .and_then(|p| p.file_name())
                                .and_then(|n| n.to_str())
                                .unwrap_or("no file chosen")
                                .to_string();
                            rsx!(
                                div {
                                    style: "margin-bottom: 8px;",
                                    label {
                                        if required { "{label} *" } else { "{label}" }
                                    }
                                    if is_attachment {
                                        div {
                                            style: "display: flex; gap: 6px; align-items: center;",
                                            button {
                                                style: BUTTON_STYLE,
                                                onclick: move |_| {
                                                    if let Some(path) = FileDialog::new().pick_file() {
                                                        if let Some(form) = edit.write().as_mut() {
                                                            form.attachment = Some(path);
                                                        }
                                                    }
                                                },
                                                "Choose file"
                                            }
                                            span { "{staged_file}" }
                                        }
                                    } else {
                                        input {
                                            style: "width: 100%;",
                                            value: value,
                                            oninput: move |event| {
                                                if let Some(form) = edit.write().as_mut() {
                                                    form.set(key, event.value());
                                                }
                                            },
                                        }
                                    }
                                    for message in field_errors {
                                        p { style: "color: #8a1f11; font-size: 12px; margin: 2px 0;", "{message}" }
                                    }
                                }
                            )
                        })}
                        div {
                            style: "display: flex; justify-content: flex-end; gap: 6px; margin-top: 10px;",
                            button {
                                style: BUTTON_STYLE,
                                disabled: form.submitting,
                                onclick: move |_| edit.set(None),
                                "Cancel"
                            }
                            button {
                                style: BUTTON_STYLE,
                                disabled: form.submitting || is_busy,
                                onclick: move |_| {
                                    let Some(form) = edit() else {
                                        return;
                                    };
                                    let required = form.required_errors(&config_for_save);
                                    if !required.is_empty() {
                                        if let Some(guard) = edit.write().as_mut() {
                                            guard.errors = required;
                                            guard.message =
                                                Some("Please fill the required fields".to_string());
                                        }
                                        return;
                                    }
                                    if let Some(guard) = edit.write().as_mut() {
                                        guard.submitting = true;
                                        guard.errors.clear();
                                        guard.message = None;
                                    }
                                    *busy.write() = true;
                                    let payload = form.payload(&config_for_save);
                                    let result = run_blocking(|| match &form.id {
                                        Some(id) => api_for_save.update(&config_for_save, id, payload),
                                        None => api_for_save.create(&config_for_save, payload),
                                    });
                                    match result {
                                        Ok(_) => {
                                            edit.set(None);
                                            *status.write() = if form.id.is_some() {
                                                "Record updated".to_string()
                                            } else {
                                                "Record created".to_string()
                                            };
                                            (refresh_for_save.borrow_mut())();
                                        }
                                        Err(ApiError::Validation { message, errors }) => {
                                            if let Some(guard) = edit.write().as_mut() {
                                                guard.submitting = false;
                                                guard.errors = errors;
                                                guard.message = Some(message);
                                            }
                                        }
                                        Err(err) => {
                                            if let Some(guard) = edit.write().as_mut() {
                                                guard.submitting = false;
                                                guard.message = Some(err.to_string());
                                            }
                                        }
                                    }
                                    *busy.write() = false;
                                },
                                if form.submitting { "Saving…" } else { "Save" }
                            }
                        }
                    }
                }
            }
        }
    }
}
