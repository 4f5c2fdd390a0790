//! Client tags.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/tags` | All tags |
//! | POST   | `/tags` | Create |

use desk_core::TagId;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::DeskApiError;
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    /// Hex colour such as `#1e88e5`.
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TagsClient {
    transport: Transport,
}

impl TagsClient {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Calls `GET {base}/tags`.
    pub async fn list(&self) -> Result<Vec<Tag>, DeskApiError> {
        self.transport.get_json("tags", Vec::new()).await
    }

    /// Calls `POST {base}/tags`.
    pub async fn create(&self, input: &TagInput) -> Result<Tag, DeskApiError> {
        if input.name.trim().is_empty() {
            return Err(DeskApiError::Invalid("tag name must not be empty".into()));
        }
        self.transport.send_json(Method::POST, "tags", input).await
    }
}
