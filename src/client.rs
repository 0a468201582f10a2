use async_trait::async_trait;
use reqwest::Client;

use crate::error::{CourtsideError, Result};
use crate::pagination::QueryKey;
use crate::query::TeamsSource;
use crate::responses::TeamsPage;

pub struct TeamsClient {
    http: Client,
    base_url: String,
}

impl TeamsClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn teams_endpoint(&self) -> String {
        format!("{}/teams", self.base_url)
    }

    /// Fetch one page of teams. `page` is 1-based on the wire.
    pub async fn get_teams(&self, page: u32, per_page: u32) -> Result<TeamsPage> {
        let response = self
            .http
            .get(self.teams_endpoint())
            .query(&[("page", page), ("per_page", per_page)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CourtsideError::Api {
                status: response.status().as_u16(),
                message: response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<failed to read response body>".to_string()),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl TeamsSource for TeamsClient {
    async fn fetch_page(&self, key: QueryKey) -> Result<TeamsPage> {
        self.get_teams(key.request_page(), key.page_size).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = TeamsClient::new("https://api.example.com/v1/".to_string());
        assert_eq!(client.teams_endpoint(), "https://api.example.com/v1/teams");
    }
}
