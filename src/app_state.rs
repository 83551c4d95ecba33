use crate::config::StorageConfig;
use crate::models::{Task, User};
use crate::store::{Database, Store, StoreError};

#[derive(Clone)]
pub struct AppState {
    pub tasks: Store<Task>,
    pub users: Store<User>,
}

impl AppState {
    pub async fn connect(storage: &StorageConfig) -> Result<Self, StoreError> {
        match storage {
            StorageConfig::Mongo { uri, database } => {
                let database = Database::connect(uri, database).await?;
                Ok(AppState {
                    tasks: Store::mongo(&database),
                    users: Store::mongo(&database),
                })
            }
            StorageConfig::Memory => Ok(Self::in_memory()),
        }
    }

    pub fn in_memory() -> Self {
        AppState {
            tasks: Store::memory(),
            users: Store::memory(),
        }
    }
}
