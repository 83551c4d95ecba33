use crate::models::{Resource, Task, User};

use super::service::{RestService, SearchQuery, ServiceError};

/// The `on_*` action names callers expect, forwarded one-to-one to a
/// [`RestService`].
pub struct ResourceActions<R: Resource> {
    service: RestService<R>,
}

pub type TaskActions = ResourceActions<Task>;
pub type UserActions = ResourceActions<User>;

impl<R: Resource> ResourceActions<R> {
    pub fn new(service: RestService<R>) -> Self {
        Self { service }
    }

    pub async fn on_create(&self, draft: &R::Draft) -> Result<R, ServiceError> {
        self.service.create(draft).await
    }

    pub async fn on_list(&self) -> Result<Vec<R>, ServiceError> {
        self.service.get_all().await
    }

    pub async fn on_find(&self, id: &str) -> Result<R, ServiceError> {
        self.service.get_by_id(id).await
    }

    pub async fn on_update(&self, record: &R) -> Result<R, ServiceError> {
        self.service.update(record).await
    }

    pub async fn on_delete(&self, id: &str) -> Result<(), ServiceError> {
        self.service.delete(id).await
    }

    pub async fn on_search(&self, query: &SearchQuery) -> Result<Vec<R>, ServiceError> {
        self.service.search(query).await
    }
}
