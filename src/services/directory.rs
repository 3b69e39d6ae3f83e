use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use uuid::Uuid;

use crate::core::store::{LookupError, UserLookup};
use crate::models::UserSummary;

/// HTTP client for the profile directory service
///
/// Identity lives outside this service; the directory is the single
/// source of user existence, consulted before every rating, match read,
/// and message send.
pub struct HttpUserDirectory {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl HttpUserDirectory {
    /// Create a new directory client
    pub fn new(base_url: String, api_key: Option<String>, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            client,
        }
    }
}

#[async_trait]
impl UserLookup for HttpUserDirectory {
    async fn by_id(&self, user_id: Uuid) -> Result<UserSummary, LookupError> {
        let url = format!(
            "{}/v1/users/{}",
            self.base_url.trim_end_matches('/'),
            user_id
        );

        tracing::debug!("Fetching profile from: {}", url);

        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.header("X-Api-Key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound(user_id));
        }

        if !response.status().is_success() {
            return Err(LookupError::Transport(format!(
                "directory returned {}",
                response.status()
            )));
        }

        response
            .json::<UserSummary>()
            .await
            .map_err(|e| LookupError::Transport(format!("invalid directory response: {e}")))
    }
}
