//! GraphQL client for the Monday.com API.
//!
//! Wraps the two calls intake needs, `create_item` and
//! `add_file_to_column`, using [`reqwest`].

use std::time::Duration;

use serde_json::{json, Value};

/// Default GraphQL endpoint.
pub const DEFAULT_API_URL: &str = "https://api.monday.com/v2";

/// API version pinned in the `API-Version` header.
const API_VERSION: &str = "2024-10";

/// HTTP request timeout for a single call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const CREATE_ITEM_MUTATION: &str = "\
mutation ($boardId: ID!, $itemName: String!, $columnValues: JSON!) {
  create_item(board_id: $boardId, item_name: $itemName, column_values: $columnValues) {
    id
  }
}";

const ADD_FILE_MUTATION: &str = "\
mutation ($file: File!, $itemId: ID!, $columnId: String!) {
  add_file_to_column(item_id: $itemId, column_id: $columnId, file: $file) {
    id
  }
}";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors from the Monday API layer.
#[derive(Debug, thiserror::Error)]
pub enum CrmError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Monday returned a non-2xx status code.
    #[error("Monday API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The request reached GraphQL but was rejected.
    #[error("Monday GraphQL error: {0}")]
    GraphQl(String),

    /// The response did not have the expected shape.
    #[error("Unexpected Monday response: {0}")]
    InvalidResponse(String),
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// JSON body for the `create_item` mutation.
///
/// `column_values` is sent as a JSON-encoded string, which is what the
/// `JSON!` scalar expects.
pub fn create_item_body(board_id: &str, item_name: &str, column_values: &Value) -> Value {
    json!({
        "query": CREATE_ITEM_MUTATION,
        "variables": {
            "boardId": board_id,
            "itemName": item_name,
            "columnValues": column_values.to_string(),
        },
    })
}

/// The `variables` part of the file-upload multipart request.
pub fn add_file_variables(item_id: &str, column_id: &str) -> Value {
    json!({
        "itemId": item_id,
        "columnId": column_id,
    })
}

/// Extract a GraphQL error message from a response body, if any.
///
/// Monday reports errors either as a GraphQL `errors` array or as a
/// top-level `error_message`.
pub fn graphql_error(body: &Value) -> Option<String> {
    if let Some(errors) = body.get("errors").and_then(Value::as_array) {
        if !errors.is_empty() {
            let messages: Vec<String> = errors
                .iter()
                .map(|e| {
                    e.get("message")
                        .and_then(Value::as_str)
                        .map_or_else(|| e.to_string(), str::to_string)
                })
                .collect();
            return Some(messages.join("; "));
        }
    }
    body.get("error_message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Read `data.<field>.id` from a mutation response. Monday ids may be
/// strings or numbers.
pub fn mutation_id(body: &Value, field: &str) -> Result<String, CrmError> {
    match body.pointer(&format!("/data/{field}/id")) {
        Some(Value::String(id)) => Ok(id.clone()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        _ => Err(CrmError::InvalidResponse(format!(
            "missing data.{field}.id in {body}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the Monday.com API.
#[derive(Debug, Clone)]
pub struct MondayClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl MondayClient {
    /// Create a client for `api_url` (e.g. [`DEFAULT_API_URL`]).
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, CrmError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(client, api_url, api_key))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        api_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Endpoint for multipart file uploads.
    pub fn file_url(&self) -> String {
        format!("{}/file", self.api_url)
    }

    /// Create an item on `board_id`. Returns the new item id.
    pub async fn create_item(
        &self,
        board_id: &str,
        item_name: &str,
        column_values: &Value,
    ) -> Result<String, CrmError> {
        let response = self
            .client
            .post(&self.api_url)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .header("API-Version", API_VERSION)
            .json(&create_item_body(board_id, item_name, column_values))
            .send()
            .await?;

        let body = Self::parse_response(response).await?;
        mutation_id(&body, "create_item")
    }

    /// Attach a file to `column_id` of `item_id`. Returns the asset id.
    pub async fn add_file_to_column(
        &self,
        item_id: &str,
        column_id: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, CrmError> {
        let file_part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;

        let form = reqwest::multipart::Form::new()
            .text("query", ADD_FILE_MUTATION)
            .text("variables", add_file_variables(item_id, column_id).to_string())
            .text("map", json!({"file": "variables.file"}).to_string())
            .part("file", file_part);

        let response = self
            .client
            .post(self.file_url())
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .header("API-Version", API_VERSION)
            .multipart(form)
            .send()
            .await?;

        let body = Self::parse_response(response).await?;
        mutation_id(&body, "add_file_to_column")
    }

    // ---- private helpers ----

    /// Check the status, parse JSON, and surface GraphQL errors.
    async fn parse_response(response: reqwest::Response) -> Result<Value, CrmError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CrmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| CrmError::InvalidResponse(e.to_string()))?;

        match graphql_error(&body) {
            Some(message) => Err(CrmError::GraphQl(message)),
            None => Ok(body),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_item_body_carries_user_text_as_variables() {
        let title = "Save \"fails\"\nwhen { braces } present";
        let columns = json!({"long_text": {"text": "line 1\nline \"2\""}});
        let body = create_item_body("12345", title, &columns);

        // The query document is constant; user text lives only in variables.
        assert_eq!(body["query"], CREATE_ITEM_MUTATION);
        assert!(!body["query"].as_str().unwrap().contains("fails"));
        assert_eq!(body["variables"]["itemName"], title);
        assert_eq!(body["variables"]["boardId"], "12345");

        let encoded = body["variables"]["columnValues"].as_str().unwrap();
        let decoded: Value = serde_json::from_str(encoded).unwrap();
        assert_eq!(decoded, columns);
    }

    #[test]
    fn graphql_error_reads_errors_array() {
        let body = json!({"errors": [{"message": "Board not found"}, {"message": "Bad column"}]});
        assert_eq!(graphql_error(&body).as_deref(), Some("Board not found; Bad column"));
    }

    #[test]
    fn graphql_error_reads_error_message() {
        let body = json!({"error_message": "Not Authenticated", "status_code": 401});
        assert_eq!(graphql_error(&body).as_deref(), Some("Not Authenticated"));
    }

    #[test]
    fn graphql_error_none_on_success() {
        let body = json!({"data": {"create_item": {"id": "1"}}, "errors": []});
        assert!(graphql_error(&body).is_none());
    }

    #[test]
    fn mutation_id_accepts_strings_and_numbers() {
        let s = json!({"data": {"create_item": {"id": "987"}}});
        let n = json!({"data": {"add_file_to_column": {"id": 42}}});
        assert_eq!(mutation_id(&s, "create_item").unwrap(), "987");
        assert_eq!(mutation_id(&n, "add_file_to_column").unwrap(), "42");
        assert!(matches!(
            mutation_id(&json!({"data": {}}), "create_item"),
            Err(CrmError::InvalidResponse(_))
        ));
    }

    #[test]
    fn file_url_appends_segment() {
        let client = MondayClient::new("https://api.monday.com/v2/", "key").unwrap();
        assert_eq!(client.file_url(), "https://api.monday.com/v2/file");
    }

    #[test]
    fn crm_error_display_api() {
        let err = CrmError::Api {
            status: 502,
            body: "bad gateway".into(),
        };
        assert_eq!(err.to_string(), "Monday API error (502): bad gateway");
    }
}
