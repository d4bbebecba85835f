use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type ClientError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Thin client over either service's HTTP surface.
#[derive(Clone)]
pub struct ServiceClient {
    client: Client,
    base_url: String,
}

impl ServiceClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<Value, ClientError> {
        let resp = self.client.get(self.url("/health")).send().await?;
        json_body(resp).await
    }

    /// Submit a task to the worker service.
    pub async fn submit_task(&self, req: &TaskRequest) -> Result<Value, ClientError> {
        let resp = self.client.post(self.url("/tasks")).json(req).send().await?;
        json_body(resp).await
    }

    pub async fn list_tasks(&self) -> Result<Value, ClientError> {
        let resp = self.client.get(self.url("/tasks")).send().await?;
        json_body(resp).await
    }

    pub async fn get_task(&self, id: &str) -> Result<Value, ClientError> {
        let resp = self.client.get(self.url(&format!("/tasks/{}", id))).send().await?;
        json_body(resp).await
    }

    /// Task counts from the worker's `/status` endpoint.
    pub async fn status(&self) -> Result<Value, ClientError> {
        let resp = self.client.get(self.url("/status")).send().await?;
        json_body(resp).await
    }

    pub async fn create_item(&self, req: &ItemRequest) -> Result<Value, ClientError> {
        let resp = self.client.post(self.url("/items")).json(req).send().await?;
        json_body(resp).await
    }

    pub async fn list_items(&self) -> Result<Value, ClientError> {
        let resp = self.client.get(self.url("/items")).send().await?;
        json_body(resp).await
    }

    /// Raw Prometheus exposition text.
    pub async fn metrics(&self) -> Result<String, ClientError> {
        let resp = self.client.get(self.url("/metrics")).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(format!("Service returned error status {}: {}", status, text).into());
        }
        Ok(text)
    }
}

async fn json_body(resp: Response) -> Result<Value, ClientError> {
    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        return Err(format!("Service returned error status {}: {}", status, text).into());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(value) => Ok(value),
        Err(e) => Err(e.into()),
    }
}
