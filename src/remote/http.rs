//! HTTP implementation of the remote task service.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};

use super::{RemoteError, RemoteResult, RemoteService, TodoDto};

/// Remote service client speaking JSON over HTTP.
pub struct HttpRemoteService {
    client: Client,
    base_url: String,
}

impl HttpRemoteService {
    /// Create a client for the given server base URL, with an optional
    /// bearer token.
    pub fn new(base_url: impl Into<String>, api_token: Option<&str>) -> RemoteResult<Self> {
        let mut builder = Client::builder();
        if let Some(token) = api_token {
            let mut headers = reqwest::header::HeaderMap::new();
            let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| RemoteError::InvalidData(e.to_string()))?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
            builder = builder.default_headers(headers);
        }
        let client = builder.build().map_err(|e| RemoteError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Map transport failures and non-2xx statuses to [`RemoteError`].
    async fn check(result: Result<Response, reqwest::Error>) -> RemoteResult<Response> {
        let response = result.map_err(|e| RemoteError::Network(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn json<T: serde::de::DeserializeOwned>(response: Response) -> RemoteResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::InvalidData(e.to_string()))
    }
}

#[async_trait]
impl RemoteService for HttpRemoteService {
    async fn list_todos(&self) -> RemoteResult<Vec<TodoDto>> {
        let response = Self::check(self.client.get(self.url("todos")).send().await).await?;
        Self::json(response).await
    }

    async fn get_todo(&self, id: &str) -> RemoteResult<TodoDto> {
        let response = Self::check(self.client.get(self.url(&format!("todos/{id}"))).send().await).await?;
        Self::json(response).await
    }

    async fn create_todo(&self, todo: &TodoDto) -> RemoteResult<TodoDto> {
        let response = Self::check(self.client.post(self.url("todos")).json(todo).send().await).await?;
        Self::json(response).await
    }

    async fn update_todo(&self, id: &str, todo: &TodoDto) -> RemoteResult<TodoDto> {
        let response =
            Self::check(self.client.put(self.url(&format!("todos/{id}"))).json(todo).send().await).await?;
        Self::json(response).await
    }

    async fn patch_todo(&self, id: &str, todo: &TodoDto) -> RemoteResult<TodoDto> {
        let response =
            Self::check(self.client.patch(self.url(&format!("todos/{id}"))).json(todo).send().await).await?;
        Self::json(response).await
    }

    async fn delete_todo(&self, id: &str) -> RemoteResult<()> {
        let response = Self::check(self.client.delete(self.url(&format!("todos/{id}"))).send().await).await?;
        // Some servers answer DELETE with 204 and an empty body.
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(());
        }
        let _ = response.bytes().await;
        Ok(())
    }

    async fn list_updated_since(&self, since_millis: i64) -> RemoteResult<Vec<TodoDto>> {
        let response = Self::check(
            self.client
                .get(self.url("todos/sync"))
                .query(&[("lastSync", since_millis)])
                .send()
                .await,
        )
        .await?;
        Self::json(response).await
    }

    async fn sync_batch(&self, todos: &[TodoDto]) -> RemoteResult<Vec<TodoDto>> {
        let response = Self::check(self.client.post(self.url("todos/batch")).json(todos).send().await).await?;
        Self::json(response).await
    }
}
