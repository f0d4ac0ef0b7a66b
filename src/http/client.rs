use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

use crate::errors::FetchError;

/// Plain HTTP client for endpoints that need no rendering
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Self::build_client(user_agent, timeout)?;
        Ok(Self { client })
    }

    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.send_get_request(url).await?;
        Self::check_response_status(url, &response)?;
        Ok(response.text().await?)
    }

    fn build_client(user_agent: &str, timeout: Duration) -> Result<Client> {
        Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")
    }

    async fn send_get_request(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        Ok(self.client.get(url).send().await?)
    }

    fn check_response_status(url: &str, response: &reqwest::Response) -> Result<(), FetchError> {
        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }
}
