/// reqwest-backed Remote API Client for the `/api/boards` + `/api/tasks` contract.
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde_json::Value;

use super::{CreateTaskRequest, RemoteApi};
use crate::types::Task;

const TARGET: &str = "canban.remote";

#[derive(Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/api/{}", self.base_url, collection)
    }

    fn item_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/api/{}/{}",
            self.base_url,
            collection,
            utf8_percent_encode(id, NON_ALPHANUMERIC)
        )
    }

    /// Send and decode a JSON body; every failure becomes `None`.
    async fn fetch_json(&self, op: &str, request: reqwest::RequestBuilder) -> Option<Value> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                log::warn!(target: TARGET, "{} failed: {}", op, e);
                return None;
            }
        };
        let status = response.status();
        if !status.is_success() {
            log::warn!(target: TARGET, "{} failed with status {}", op, status);
            return None;
        }
        match response.json::<Value>().await {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!(target: TARGET, "{} returned an undecodable body: {}", op, e);
                None
            }
        }
    }

    /// Send a request whose body we ignore; success status maps to `Some(())`.
    async fn fetch_unit(&self, op: &str, request: reqwest::RequestBuilder) -> Option<()> {
        match request.send().await {
            Ok(response) if response.status().is_success() => Some(()),
            Ok(response) => {
                log::warn!(target: TARGET, "{} failed with status {}", op, response.status());
                None
            }
            Err(e) => {
                log::warn!(target: TARGET, "{} failed: {}", op, e);
                None
            }
        }
    }
}

#[async_trait]
impl RemoteApi for HttpApi {
    async fn list_boards(&self) -> Option<Value> {
        let request = self.client.get(self.collection_url("boards"));
        self.fetch_json("listBoards", request).await
    }

    async fn create_board(&self, name: &str) -> Option<Value> {
        let request = self
            .client
            .post(self.collection_url("boards"))
            .json(&serde_json::json!({ "name": name }));
        self.fetch_json("createBoard", request).await
    }

    async fn update_board(&self, id: &str, name: &str) -> Option<()> {
        let request = self
            .client
            .put(self.item_url("boards", id))
            .json(&serde_json::json!({ "id": id, "name": name }));
        self.fetch_unit("updateBoard", request).await
    }

    async fn delete_board(&self, id: &str) -> Option<()> {
        let request = self.client.delete(self.item_url("boards", id));
        self.fetch_unit("deleteBoard", request).await
    }

    async fn create_task(&self, body: &CreateTaskRequest) -> Option<Value> {
        let request = self.client.post(self.collection_url("tasks")).json(body);
        self.fetch_json("createTask", request).await
    }

    async fn update_task(&self, task: &Task) -> Option<()> {
        let request = self.client.put(self.item_url("tasks", &task.id)).json(task);
        self.fetch_unit("updateTask", request).await
    }

    async fn delete_task(&self, id: &str) -> Option<()> {
        let request = self.client.delete(self.item_url("tasks", id));
        self.fetch_unit("deleteTask", request).await
    }
}
