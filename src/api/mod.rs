use chrono::Utc;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Payload returned by `GET /api/data`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPayload {
    pub message: String,
    pub timestamp: String,
    #[serde(default)]
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
}

/// Record sent to `POST /api/submit`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub name: String,
    pub email: String,
    pub message: String,
    pub timestamp: String,
}

impl SubmissionRecord {
    /// Build a record from form fields, stamped with the current UTC time
    pub fn new(name: impl Into<String>, email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// The canned test record (for the quick-submit path and `--submit`)
    pub fn test() -> Self {
        Self::new("Test User", "test@example.com", "This is a test submission")
    }
}

/// Error body most backend routes return on failure: `{"message": "..."}`
/// Other fields (status, etc.) are ignored.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request could not be sent or the response body could not be parsed
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Response received but the status indicates failure
    #[error("{}", status_display(.status, .message.as_deref()))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },
}

fn status_display(status: &StatusCode, message: Option<&str>) -> String {
    match message {
        Some(msg) => format!("server error ({}): {}", status.as_u16(), msg),
        None => format!("server returned {}", status),
    }
}

/// Extract the human-readable message from an error body, if it has one
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
}

/// Client for the demo backend's two JSON endpoints
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /api/data`
    pub async fn fetch_data(&self) -> Result<DataPayload, ApiError> {
        let url = format!("{}/api/data", self.base_url);
        tracing::debug!("GET {}", url);

        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status,
                message: error_message(&body),
            });
        }

        Ok(resp.json().await?)
    }

    /// `POST /api/submit` — response body is echoed back verbatim
    pub async fn submit(&self, record: &SubmissionRecord) -> Result<serde_json::Value, ApiError> {
        let url = format!("{}/api/submit", self.base_url);
        tracing::debug!("POST {} ({})", url, record.email);

        let resp = self.http.post(&url).json(record).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status,
                message: error_message(&body),
            });
        }

        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_deserialization() {
        let json = r#"{
            "message": "Hello from the API!",
            "timestamp": "2025-07-17",
            "items": [
                {"id": 1, "name": "Item 1", "description": "First item"},
                {"id": 2, "name": "Item 2", "description": "Second item"}
            ]
        }"#;

        let payload: DataPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.message, "Hello from the API!");
        assert_eq!(payload.items.len(), 2);
        assert_eq!(payload.items[0].id, 1);
        assert_eq!(payload.items[1].description, "Second item");
    }

    #[test]
    fn test_payload_without_items() {
        // Items default to empty rather than failing the whole parse
        let payload: DataPayload =
            serde_json::from_str(r#"{"message": "m", "timestamp": "t"}"#).unwrap();
        assert!(payload.items.is_empty());
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"message": "not found"}"#),
            Some("not found".to_string())
        );
        assert_eq!(
            error_message(r#"{"status": "error", "message": "Failed to process data"}"#),
            Some("Failed to process data".to_string())
        );
        assert_eq!(error_message(r#"{"status": "error"}"#), None);
        assert_eq!(error_message("<html>nope</html>"), None);
    }

    #[test]
    fn test_status_error_display() {
        let err = ApiError::Status {
            status: StatusCode::NOT_FOUND,
            message: Some("not found".to_string()),
        };
        let text = err.to_string();
        assert!(text.contains("not found"));
        assert!(text.contains("404"));

        let bare = ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        };
        assert!(bare.to_string().contains("500"));
    }

    #[test]
    fn test_submission_record() {
        let record = SubmissionRecord::test();
        assert_eq!(record.name, "Test User");
        assert_eq!(record.email, "test@example.com");
        // Client-generated RFC 3339 timestamp
        assert!(chrono::DateTime::parse_from_rfc3339(&record.timestamp).is_ok());
    }

    #[test]
    fn test_base_url_normalization() {
        let client = ApiClient::new("http://127.0.0.1:5000/");
        assert_eq!(client.base_url(), "http://127.0.0.1:5000");
    }
}
