use std::marker::PhantomData;

use log::error;
use reqwest::{Client, RequestBuilder};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::models::{Envelope, Resource, Task, User};

pub const NETWORK_ERROR: &str = "Network error";

/// Every failure of a service call, with a message fit to show the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ServiceError {
    pub message: String,
}

impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

impl SearchQuery {
    pub fn new(q: impl Into<String>) -> Self {
        Self { q: q.into() }
    }
}

/// Typed client for one `/api/{collection}` endpoint.
pub struct RestService<R: Resource> {
    client: Client,
    base_url: String,
    production: bool,
    _resource: PhantomData<R>,
}

pub type TaskService = RestService<Task>;
pub type UserService = RestService<User>;

impl<R: Resource> Clone for RestService<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            production: self.production,
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> RestService<R> {
    /// `origin` is the API server root, e.g. `http://localhost:8080`.
    pub fn new(origin: &str) -> Self {
        Self::with_client(Client::new(), origin)
    }

    /// A service that logs failures unless `config` is for production.
    pub fn from_config(config: &Config, origin: &str) -> Self {
        Self::new(origin).production(config.production)
    }

    pub fn with_client(client: Client, origin: &str) -> Self {
        Self {
            client,
            base_url: format!("{}/api/{}", origin.trim_end_matches('/'), R::COLLECTION),
            production: false,
            _resource: PhantomData,
        }
    }

    /// In production failures are returned without being logged.
    pub fn production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn member_url(&self, id: &str) -> String {
        format!("{}/{}", self.base_url, id)
    }

    pub async fn create(&self, draft: &R::Draft) -> Result<R, ServiceError> {
        let request = self.client.post(&self.base_url).json(draft);
        let data = self.execute(request, format!("Failed to create {}", R::NOUN)).await?;
        self.require(data)
    }

    pub async fn get_all(&self) -> Result<Vec<R>, ServiceError> {
        let request = self.client.get(&self.base_url);
        let data = self.execute(request, format!("Failed to fetch {}", R::COLLECTION)).await?;
        self.require(data)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<R, ServiceError> {
        let request = self.client.get(self.member_url(id));
        let data = self.execute(request, format!("Failed to fetch {}", R::NOUN)).await?;
        self.require(data)
    }

    pub async fn update(&self, record: &R) -> Result<R, ServiceError> {
        let request = self.client.put(self.member_url(record.id())).json(record);
        let data = self.execute(request, format!("Failed to update {}", R::NOUN)).await?;
        self.require(data)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let request = self.client.delete(self.member_url(id));
        self.execute::<IgnoredAny>(request, format!("Failed to delete {}", R::NOUN))
            .await?;
        Ok(())
    }

    /// `query.q` is form-encoded, so a space is sent as `+`.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<R>, ServiceError> {
        let request = self.client.get(&self.base_url).query(&[("search", &query.q)]);
        let data = self.execute(request, format!("Failed to search {}", R::COLLECTION)).await?;
        self.require(data)
    }

    // Sends the request and unwraps the envelope. A non-success status fails
    // with the server's message or `failure`; anything thrown on the way
    // fails with NETWORK_ERROR.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        failure: String,
    ) -> Result<Option<T>, ServiceError> {
        let response = request.send().await.map_err(|e| self.network_failure(e))?;
        let status = response.status();
        let envelope: Envelope<T> = response.json().await.map_err(|e| self.network_failure(e))?;

        if !status.is_success() {
            let message = envelope.error.unwrap_or(failure);
            if !self.production {
                error!("{}", message);
            }
            return Err(ServiceError::new(message));
        }

        Ok(envelope.data)
    }

    fn require<T>(&self, data: Option<T>) -> Result<T, ServiceError> {
        data.ok_or_else(|| self.network_failure("response envelope carried no data"))
    }

    fn network_failure(&self, cause: impl std::fmt::Display) -> ServiceError {
        if !self.production {
            error!("{} request failed: {}", R::NOUN, cause);
        }
        ServiceError::new(NETWORK_ERROR)
    }
}
