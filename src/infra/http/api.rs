use std::collections::BTreeMap;

use serde_json::Value;

use crate::domain::list::ListResult;
use crate::domain::query::ListQuery;
use crate::domain::table::{DeleteStyle, TableConfig, WriteMethod};
use crate::infra::http::client::ApiClients;
use crate::infra::http::{envelope, query_string};
use crate::usecase::ports::api::{ApiError, ExportBlob, RecordApi, WritePayload};

/// Decodes `%XX` escapes; malformed escapes pass through untouched.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let (Some(hi), Some(lo)) = (
                bytes.get(i + 1).and_then(|b| (*b as char).to_digit(16)),
                bytes.get(i + 2).and_then(|b| (*b as char).to_digit(16)),
            ) {
                out.push((hi * 16 + lo) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Filename from a Content-Disposition header, in either the RFC 5987
/// `filename*=UTF-8''...` form or the plain `filename="..."` form.
pub fn parse_content_disposition(header: &str) -> Option<String> {
    for part in header.split(';') {
        let part = part.trim();
        if let Some(rest) = part
            .strip_prefix("filename*=")
            .or_else(|| part.strip_prefix("FILENAME*="))
        {
            let rest = rest.trim_matches('"');
            let encoded = rest
                .strip_prefix("UTF-8''")
                .or_else(|| rest.strip_prefix("utf-8''"))
                .unwrap_or(rest);
            let decoded = percent_decode(encoded);
            if !decoded.is_empty() {
                return Some(decoded);
            }
        }
    }
    for part in header.split(';') {
        let part = part.trim();
        if let Some(rest) = part.strip_prefix("filename=") {
            let name = rest.trim_matches('"').trim();
            if !name.is_empty() {
                return Some(name.to_string());
            }
        }
    }
    None
}

fn map_transport_err(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Network(err.to_string())
    }
}

/// Maps a non-2xx JSON body onto the error taxonomy. 422 bodies carry
/// `{message, errors: {field: [messages]}}` and keep their field mapping so
/// the form can annotate its inputs.
pub fn parse_error_body(status: u16, body: &Value) -> ApiError {
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("request failed with status {status}"));

    if status == 422 {
        let mut errors = BTreeMap::new();
        if let Some(fields) = body.get("errors").and_then(Value::as_object) {
            for (field, messages) in fields {
                let list = match messages {
                    Value::Array(items) => items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect(),
                    Value::String(single) => vec![single.clone()],
                    _ => Vec::new(),
                };
                if !list.is_empty() {
                    errors.insert(field.clone(), list);
                }
            }
        }
        return ApiError::Validation { message, errors };
    }

    ApiError::Http { status, message }
}

fn handle_json_response(response: reqwest::blocking::Response) -> Result<Value, ApiError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<Value>()
            .map_err(|_| ApiError::UnexpectedShape);
    }
    let body = response.json::<Value>().unwrap_or(Value::Null);
    Err(parse_error_body(status.as_u16(), &body))
}

fn handle_empty_response(response: reqwest::blocking::Response) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.json::<Value>().unwrap_or(Value::Null);
    Err(parse_error_body(status.as_u16(), &body))
}

fn multipart_form(
    fields: Vec<(String, String)>,
    file: Option<crate::usecase::ports::api::FileAttachment>,
) -> Result<reqwest::blocking::multipart::Form, ApiError> {
    let mut form = reqwest::blocking::multipart::Form::new();
    for (name, value) in fields {
        form = form.text(name, value);
    }
    if let Some(attachment) = file {
        form = form
            .file(attachment.field, &attachment.path)
            .map_err(|err| ApiError::Network(format!("failed to read attachment: {err}")))?;
    }
    Ok(form)
}

/// REST implementation of the record port. One instance serves every page;
/// all per-entity variance comes in through the `TableConfig`.
pub struct HttpRecordApi {
    clients: ApiClients,
}

impl HttpRecordApi {
    pub fn new(clients: ApiClients) -> Self {
        HttpRecordApi { clients }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.clients.base_url, path)
    }
}

impl RecordApi for HttpRecordApi {
    fn list(&self, config: &TableConfig, query: &ListQuery) -> Result<ListResult, ApiError> {
        let url = format!(
            "{}?{}",
            self.url(config.endpoints.list_path),
            query_string::list_query(config, query)
        );
        let response = self
            .clients
            .list
            .get(&url)
            .send()
            .map_err(map_transport_err)?;
        let body = handle_json_response(response)?;
        Ok(envelope::normalize(config, &query.page, &body))
    }

    fn detail(&self, config: &TableConfig, id: &str) -> Result<Value, ApiError> {
        let url = format!("{}/{id}", self.url(config.endpoints.detail_path));
        let response = self
            .clients
            .list
            .get(&url)
            .send()
            .map_err(map_transport_err)?;
        let body = handle_json_response(response)?;
        // Detail payloads are sometimes wrapped a second time.
        match body.get("data") {
            Some(inner) if inner.is_object() => Ok(inner.clone()),
            _ => Ok(body),
        }
    }

    fn create(&self, config: &TableConfig, payload: WritePayload) -> Result<Value, ApiError> {
        let url = self.url(config.endpoints.create_path);
        let request = self.clients.list.post(&url);
        let response = match payload {
            WritePayload::Json(body) => request.json(&body).send(),
            WritePayload::Multipart { fields, file } => {
                request.multipart(multipart_form(fields, file)?).send()
            }
        }
        .map_err(map_transport_err)?;
        handle_json_response(response)
    }

    fn update(
        &self,
        config: &TableConfig,
        id: &str,
        payload: WritePayload,
    ) -> Result<Value, ApiError> {
        let url = format!("{}/{id}", self.url(config.endpoints.update_path));
        let request = match config.endpoints.update_method {
            WriteMethod::Post => self.clients.list.post(&url),
            WriteMethod::Put => self.clients.list.put(&url),
        };
        let response = match payload {
            WritePayload::Json(body) => request.json(&body).send(),
            WritePayload::Multipart { fields, file } => {
                request.multipart(multipart_form(fields, file)?).send()
            }
        }
        .map_err(map_transport_err)?;
        handle_json_response(response)
    }

    fn delete(&self, config: &TableConfig, id: &str) -> Result<(), ApiError> {
        let response = match config.endpoints.delete_style {
            DeleteStyle::PathId => {
                let url = format!("{}/{id}", self.url(config.endpoints.delete_path));
                self.clients.list.delete(&url).send()
            }
            DeleteStyle::BodyId => {
                let url = self.url(config.endpoints.delete_path);
                self.clients
                    .list
                    .delete(&url)
                    .json(&serde_json::json!({ "id": id }))
                    .send()
            }
        }
        .map_err(map_transport_err)?;
        handle_empty_response(response)
    }

    fn validate(&self, config: &TableConfig, id: &str) -> Result<(), ApiError> {
        let Some(path) = config.endpoints.validate_path else {
            return Err(ApiError::Http {
                status: 404,
                message: format!("{} records cannot be validated", config.entity),
            });
        };
        let url = format!("{}/{id}", self.url(path));
        let response = self
            .clients
            .list
            .post(&url)
            .send()
            .map_err(map_transport_err)?;
        handle_empty_response(response)
    }

    fn export(
        &self,
        config: &TableConfig,
        query: &ListQuery,
        visible_columns: &[String],
    ) -> Result<ExportBlob, ApiError> {
        let url = format!(
            "{}?{}",
            self.url(config.endpoints.list_path),
            query_string::export_query(config, query, visible_columns)
        );
        let response = self
            .clients
            .export
            .get(&url)
            .send()
            .map_err(map_transport_err)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<Value>().unwrap_or(Value::Null);
            return Err(parse_error_body(status.as_u16(), &body));
        }

        let filename = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_content_disposition);
        let bytes = response
            .bytes()
            .map_err(map_transport_err)?
            .to_vec();
        Ok(ExportBlob { bytes, filename })
    }
}
