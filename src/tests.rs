use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{json, Value};

use crate::domain::list::ListResult;
use crate::domain::query::{FilterValue, ListQuery, PerPage};
use crate::domain::table::TableConfig;
use crate::entities;
use crate::infra::http::query_string;
use crate::infra::prefs::store::SqlitePrefs;
use crate::usecase::ports::api::{ApiError, ExportBlob, RecordApi, WritePayload};
use crate::usecase::ports::prefs::{PageScope, PrefsStore};
use crate::usecase::services::export_service::{ExportError, ExportOutcome, ExportService};
use crate::usecase::services::table_session::TableSession;

fn unique_test_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("leaddesk-{prefix}-{nanos}"))
}

/// Scriptable stand-in for the REST API. Each call is recorded so tests can
/// assert on the queries that actually went out.
#[derive(Default)]
struct MockApi {
    list_results: Mutex<Vec<Result<ListResult, ApiError>>>,
    export_result: Mutex<Option<Result<ExportBlob, ApiError>>>,
    seen_queries: Mutex<Vec<String>>,
}

impl MockApi {
    fn with_list(results: Vec<Result<ListResult, ApiError>>) -> Self {
        MockApi {
            list_results: Mutex::new(results),
            ..MockApi::default()
        }
    }

    fn with_export(result: Result<ExportBlob, ApiError>) -> Self {
        MockApi {
            export_result: Mutex::new(Some(result)),
            ..MockApi::default()
        }
    }

    fn queries(&self) -> Vec<String> {
        self.seen_queries.lock().expect("queries lock").clone()
    }
}

impl RecordApi for MockApi {
    fn list(&self, config: &TableConfig, query: &ListQuery) -> Result<ListResult, ApiError> {
        self.seen_queries
            .lock()
            .expect("queries lock")
            .push(query_string::list_query(config, query));
        let mut results = self.list_results.lock().expect("list lock");
        if results.is_empty() {
            Ok(ListResult::empty())
        } else {
            results.remove(0)
        }
    }

    fn detail(&self, _config: &TableConfig, id: &str) -> Result<Value, ApiError> {
        Ok(json!({ "id": id }))
    }

    fn create(&self, _config: &TableConfig, _payload: WritePayload) -> Result<Value, ApiError> {
        Ok(json!({ "id": 1 }))
    }

    fn update(
        &self,
        _config: &TableConfig,
        id: &str,
        _payload: WritePayload,
    ) -> Result<Value, ApiError> {
        Ok(json!({ "id": id }))
    }

    fn delete(&self, _config: &TableConfig, _id: &str) -> Result<(), ApiError> {
        Ok(())
    }

    fn validate(&self, _config: &TableConfig, _id: &str) -> Result<(), ApiError> {
        Ok(())
    }

    fn export(
        &self,
        _config: &TableConfig,
        _query: &ListQuery,
        _visible_columns: &[String],
    ) -> Result<ExportBlob, ApiError> {
        self.export_result
            .lock()
            .expect("export lock")
            .take()
            .unwrap_or(Err(ApiError::Network("export not scripted".to_string())))
    }
}

fn lead_rows(total: u64) -> ListResult {
    ListResult {
        rows: vec![json!({"id": 1, "name": "Acme", "email": "ops@acme.test"})],
        page: 1,
        per_page: 25,
        total,
        last_page: crate::domain::list::derive_last_page(total, 25),
        facets: BTreeMap::new(),
    }
}

// ----- preference persistence -------------------------------------------

#[test]
fn hidden_columns_and_page_size_persist_per_page() {
    let temp_dir = unique_test_dir("prefs-roundtrip");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let store: Arc<dyn PrefsStore> = Arc::new(SqlitePrefs {
        db_path: temp_dir.join("uiprefs.sqlite"),
    });
    store.init();

    let leads_scope = PageScope::new(store.clone(), "leads");
    let tasks_scope = PageScope::new(store.clone(), "tasks");

    leads_scope.set_hidden_columns(&["email".to_string(), "phone".to_string()]);
    leads_scope.set_per_page(PerPage::Hundred);
    tasks_scope.set_per_page(PerPage::Fifty);

    assert_eq!(
        leads_scope.hidden_columns(),
        Some(vec!["email".to_string(), "phone".to_string()])
    );
    assert_eq!(leads_scope.per_page(), Some(PerPage::Hundred));
    assert_eq!(tasks_scope.hidden_columns(), None, "namespaces are isolated");
    assert_eq!(tasks_scope.per_page(), Some(PerPage::Fifty));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn malformed_stored_preferences_are_discarded_not_fatal() {
    let temp_dir = unique_test_dir("prefs-malformed");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let sqlite = SqlitePrefs {
        db_path: temp_dir.join("uiprefs.sqlite"),
    };
    sqlite.init();
    sqlite.save("leads", "hiddenCols", "not json at all");
    sqlite.save("leads", "perPage", "37");

    let store: Arc<dyn PrefsStore> = Arc::new(sqlite);
    let scope = PageScope::new(store, "leads");
    assert_eq!(scope.hidden_columns(), None);
    assert_eq!(scope.per_page(), None, "unknown page sizes are rejected");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn prefs_store_swallows_missing_schema() {
    let temp_dir = unique_test_dir("prefs-uninit");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    // init() never ran, so the table does not exist.
    let sqlite = SqlitePrefs {
        db_path: temp_dir.join("uiprefs.sqlite"),
    };
    assert_eq!(sqlite.load("leads", "perPage"), None);
    sqlite.save("leads", "perPage", "25");
    sqlite.remove("leads", "perPage");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

// ----- session against the api ------------------------------------------

#[test]
fn cancelled_draft_never_reaches_the_wire() {
    let config = entities::leads::config();
    let api = MockApi::with_list(vec![Ok(lead_rows(1)), Ok(lead_rows(1))]);
    let mut session = TableSession::new(&config);

    let ticket = session.begin_fetch();
    let outcome = api.list(&config, &session.query());
    assert!(session.complete_fetch(ticket, outcome, config.row_mapper));

    session.open_drawer();
    session.set_pending(
        "utm_source",
        FilterValue::Single(Some("Facebook".to_string())),
    );
    session.cancel_drawer();

    let ticket = session.begin_fetch();
    let outcome = api.list(&config, &session.query());
    assert!(session.complete_fetch(ticket, outcome, config.row_mapper));

    for query in api.queries() {
        assert!(
            !query.contains("utm_source"),
            "cancelled filter leaked into: {query}"
        );
    }
}

#[test]
fn applied_filters_change_the_outgoing_query() {
    let config = entities::leads::config();
    let api = MockApi::with_list(vec![Ok(lead_rows(60)), Ok(lead_rows(3))]);
    let mut session = TableSession::new(&config);

    let ticket = session.begin_fetch();
    let outcome = api.list(&config, &session.query());
    assert!(session.complete_fetch(ticket, outcome, config.row_mapper));
    assert_eq!(session.last_page, 3);
    assert!(session.set_page(3));

    session.open_drawer();
    session.set_pending(
        "service",
        FilterValue::Multi(vec!["Roofing".to_string(), "Solar".to_string()]),
    );
    assert!(session.apply_filters());
    assert_eq!(session.page, 1, "apply rewinds pagination");

    let ticket = session.begin_fetch();
    let outcome = api.list(&config, &session.query());
    assert!(session.complete_fetch(ticket, outcome, config.row_mapper));

    let queries = api.queries();
    let last = queries.last().expect("two fetches expected");
    assert!(last.contains("service=[Roofing,Solar]"), "got: {last}");
    assert!(last.starts_with("page=1&"), "got: {last}");
}

#[test]
fn fetch_error_surfaces_and_next_success_recovers() {
    let config = entities::leads::config();
    let api = MockApi::with_list(vec![
        Err(ApiError::Http {
            status: 500,
            message: "server exploded".to_string(),
        }),
        Ok(lead_rows(1)),
    ]);
    let mut session = TableSession::new(&config);

    let ticket = session.begin_fetch();
    let outcome = api.list(&config, &session.query());
    assert!(session.complete_fetch(ticket, outcome, config.row_mapper));
    assert_eq!(session.error.as_deref(), Some("server exploded"));
    assert!(session.rows.is_empty());

    let ticket = session.begin_fetch();
    let outcome = api.list(&config, &session.query());
    assert!(session.complete_fetch(ticket, outcome, config.row_mapper));
    assert!(session.error.is_none());
    assert_eq!(session.rows.len(), 1);
}

// ----- export service ----------------------------------------------------

fn sample_rows(config: &TableConfig) -> Vec<crate::domain::record::RecordRow> {
    vec![(config.row_mapper)(&json!({
        "id": 1,
        "name": "Acme, Inc.",
        "email": "ops@acme.test",
        "service": "Roofing",
        "status": "New",
        "created_at": "2025-06-01 10:00:00"
    }))]
}

#[test]
fn server_export_writes_the_blob_under_the_served_name() {
    let temp_dir = unique_test_dir("export-server");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let config = entities::leads::config();

    let api = Arc::new(MockApi::with_export(Ok(ExportBlob {
        bytes: b"id,name\n1,Acme\n".to_vec(),
        filename: Some("leads_filtered.csv".to_string()),
    })));
    let service = ExportService::new(api);

    let mut suggested_seen = String::new();
    let dest = temp_dir.join("out.csv");
    let outcome = service
        .run(
            &config,
            &TableSession::new(&config).query(),
            &["name".to_string()],
            &sample_rows(&config),
            |suggested| {
                suggested_seen = suggested.to_string();
                Some(dest.clone())
            },
        )
        .expect("export should succeed");

    assert_eq!(outcome, ExportOutcome::Server { path: dest.clone() });
    assert_eq!(suggested_seen, "leads_filtered.csv");
    assert_eq!(fs::read(&dest).expect("file should exist"), b"id,name\n1,Acme\n");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn failed_server_export_degrades_to_in_memory_rows() {
    let temp_dir = unique_test_dir("export-fallback");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let config = entities::leads::config();

    let api = Arc::new(MockApi::with_export(Err(ApiError::Http {
        status: 500,
        message: "export worker offline".to_string(),
    })));
    let service = ExportService::new(api);

    let dest = temp_dir.join("fallback.csv");
    let outcome = service
        .run(
            &config,
            &TableSession::new(&config).query(),
            &["name".to_string()],
            &sample_rows(&config),
            |_suggested| Some(dest.clone()),
        )
        .expect("fallback should succeed");

    assert_eq!(
        outcome,
        ExportOutcome::Fallback {
            path: dest.clone(),
            rows: 1
        }
    );
    let contents = fs::read_to_string(&dest).expect("file should exist");
    assert!(contents.contains("\"Acme, Inc.\""), "got: {contents}");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn export_timeout_is_terminal_and_distinct() {
    let config = entities::leads::config();
    let api = Arc::new(MockApi::with_export(Err(ApiError::Timeout)));
    let service = ExportService::new(api);

    let result = service.run(
        &config,
        &TableSession::new(&config).query(),
        &[],
        &sample_rows(&config),
        |_suggested| panic!("timeout must not reach the save dialog"),
    );
    assert!(matches!(result, Err(ExportError::TimedOut)));
}

#[test]
fn dismissed_save_dialog_cancels_cleanly() {
    let config = entities::leads::config();
    let api = Arc::new(MockApi::with_export(Ok(ExportBlob {
        bytes: Vec::new(),
        filename: None,
    })));
    let service = ExportService::new(api);

    let outcome = service
        .run(
            &config,
            &TableSession::new(&config).query(),
            &[],
            &sample_rows(&config),
            |suggested| {
                assert!(
                    suggested.starts_with("leads_") && suggested.ends_with(".csv"),
                    "synthesized name expected, got: {suggested}"
                );
                None
            },
        )
        .expect("cancel is not an error");
    assert_eq!(outcome, ExportOutcome::Cancelled);
}

// ----- endpoint conventions ----------------------------------------------

#[test]
fn tracked_leads_query_uses_its_legacy_page_param() {
    let config = entities::tracked_leads::config();
    let mut session = TableSession::new(&config);
    session.last_page = 5;
    assert!(session.set_page(2));
    let qs = query_string::list_query(&config, &session.query());
    assert!(qs.starts_with("current_page=2&per_page=25"), "got: {qs}");
}

#[test]
fn info_requests_keep_the_comma_join_convention() {
    let config = entities::info_requests::config();
    let mut session = TableSession::new(&config);
    session.open_drawer();
    session.set_pending(
        "source",
        FilterValue::Single(Some("Website".to_string())),
    );
    assert!(session.apply_filters());
    session.quick_search = "brochure".to_string();
    let qs = query_string::list_query(&config, &session.query());
    assert!(qs.contains("q=brochure"), "got: {qs}");
    assert!(qs.contains("source=Website"), "got: {qs}");
}
