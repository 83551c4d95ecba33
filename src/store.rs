// src/store.rs

use std::sync::Arc;

use futures_util::TryStreamExt;
use log::info;
use mongodb::bson::{doc, Bson, Document};
use mongodb::{options::ClientOptions, Client, Collection};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::Resource;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

/// Handle on the MongoDB database holding every collection.
#[derive(Clone)]
pub struct Database {
    pub db: mongodb::Database,
}

impl Database {
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, StoreError> {
        let client_options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);
        info!("Connected to MongoDB database {}", db_name);
        Ok(Database { db })
    }

    pub fn collection<R: Resource>(&self) -> Collection<R> {
        self.db.collection::<R>(R::COLLECTION)
    }
}

/// Where the records of one resource live.
pub enum Store<R: Resource> {
    Mongo(Collection<R>),
    Memory(Arc<RwLock<Vec<R>>>),
}

impl<R: Resource> Clone for Store<R> {
    fn clone(&self) -> Self {
        match self {
            Store::Mongo(coll) => Store::Mongo(coll.clone()),
            Store::Memory(records) => Store::Memory(records.clone()),
        }
    }
}

impl<R: Resource> Store<R> {
    pub fn mongo(database: &Database) -> Self {
        Store::Mongo(database.collection::<R>())
    }

    pub fn memory() -> Self {
        Store::Memory(Arc::new(RwLock::new(Vec::new())))
    }

    /// All records, or those matching `search`, in listing order.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<R>, StoreError> {
        let mut records: Vec<R> = match self {
            Store::Mongo(coll) => {
                let filter = search.map(search_filter::<R>).unwrap_or_default();
                coll.find(filter).await?.try_collect().await?
            }
            Store::Memory(records) => {
                let needle = search.map(str::to_lowercase);
                records
                    .read()
                    .await
                    .iter()
                    .filter(|r| needle.as_deref().map_or(true, |n| r.matches(n)))
                    .cloned()
                    .collect()
            }
        };
        records.sort_by(R::ordering);
        Ok(records)
    }

    pub async fn get(&self, id: &str) -> Result<Option<R>, StoreError> {
        match self {
            Store::Mongo(coll) => Ok(coll.find_one(id_filter::<R>(id)).await?),
            Store::Memory(records) => {
                Ok(records.read().await.iter().find(|r| r.id() == id).cloned())
            }
        }
    }

    pub async fn insert(&self, record: &R) -> Result<(), StoreError> {
        match self {
            Store::Mongo(coll) => {
                coll.insert_one(record).await?;
            }
            Store::Memory(records) => records.write().await.push(record.clone()),
        }
        Ok(())
    }

    /// Replaces the stored record with the same id. Returns `false` when
    /// there is none.
    pub async fn replace(&self, record: &R) -> Result<bool, StoreError> {
        match self {
            Store::Mongo(coll) => {
                let res = coll.replace_one(id_filter::<R>(record.id()), record).await?;
                Ok(res.matched_count > 0)
            }
            Store::Memory(records) => {
                let mut records = records.write().await;
                match records.iter_mut().find(|r| r.id() == record.id()) {
                    Some(slot) => {
                        *slot = record.clone();
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }
        }
    }

    /// Returns `false` when no record had that id.
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        match self {
            Store::Mongo(coll) => {
                let res = coll.delete_one(id_filter::<R>(id)).await?;
                Ok(res.deleted_count > 0)
            }
            Store::Memory(records) => {
                let mut records = records.write().await;
                let before = records.len();
                records.retain(|r| r.id() != id);
                Ok(records.len() < before)
            }
        }
    }
}

fn id_filter<R: Resource>(id: &str) -> Document {
    let mut filter = Document::new();
    filter.insert(R::ID_FIELD, id);
    filter
}

// Numeric fields are matched on their decimal text, as the memory backend does.
fn search_filter<R: Resource>(search: &str) -> Document {
    let pattern = regex::escape(search);
    let text = R::SEARCH_FIELDS.iter().map(|field| {
        let mut clause = Document::new();
        clause.insert(*field, doc! { "$regex": pattern.as_str(), "$options": "i" });
        Bson::Document(clause)
    });
    let numeric = R::NUMERIC_SEARCH_FIELDS.iter().map(|field| {
        Bson::Document(doc! {
            "$expr": {
                "$regexMatch": {
                    "input": { "$toString": format!("${}", field) },
                    "regex": pattern.as_str(),
                    "options": "i",
                }
            }
        })
    });
    let clauses: Vec<Bson> = text.chain(numeric).collect();
    doc! { "$or": clauses }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, Status, Task, TaskDraft, User, UserDraft};

    fn task(id: &str, title: &str) -> Task {
        Task::from_draft(id.to_string(), TaskDraft::new(title))
    }

    #[tokio::test]
    async fn memory_store_crud() {
        let store = Store::<Task>::memory();
        store.insert(&task("1", "Buy milk")).await.unwrap();
        store.insert(&task("2", "Walk dog")).await.unwrap();

        assert_eq!(store.list(None).await.unwrap().len(), 2);
        assert_eq!(store.get("1").await.unwrap().unwrap().title, "Buy milk");

        assert!(store.replace(&task("1", "Buy oat milk")).await.unwrap());
        assert!(!store.replace(&task("9", "Ghost")).await.unwrap());
        assert_eq!(store.get("1").await.unwrap().unwrap().title, "Buy oat milk");

        assert!(store.delete("2").await.unwrap());
        assert!(!store.delete("2").await.unwrap());
        assert!(store.get("2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn memory_search_is_case_insensitive() {
        let store = Store::<Task>::memory();
        store.insert(&task("1", "Buy MILK")).await.unwrap();
        store.insert(&task("2", "Walk dog")).await.unwrap();

        let found = store.list(Some("milk")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].task_id, "1");
    }

    #[tokio::test]
    async fn memory_search_covers_priority_status_and_age() {
        let tasks = Store::<Task>::memory();
        let mut urgent = task("1", "Groceries");
        urgent.priority = Priority::High;
        urgent.status = Status::Doing;
        tasks.insert(&urgent).await.unwrap();
        tasks.insert(&task("2", "Walk dog")).await.unwrap();

        for needle in ["high", "DOING"] {
            let found = tasks.list(Some(needle)).await.unwrap();
            assert_eq!(found, vec![urgent.clone()], "searching {}", needle);
        }

        let users = Store::<User>::memory();
        let draft = UserDraft { name: "Ana".to_string(), age: 345, ..UserDraft::default() };
        users.insert(&User::from_draft("u1".to_string(), draft)).await.unwrap();
        assert_eq!(users.list(Some("345")).await.unwrap().len(), 1);
        assert!(users.list(Some("346")).await.unwrap().is_empty());
    }

    #[test]
    fn search_filter_escapes_and_covers_every_field() {
        let filter = search_filter::<Task>("a.b");
        let clauses = filter.get_array("$or").unwrap();
        assert_eq!(clauses.len(), Task::SEARCH_FIELDS.len());
        let title = clauses[0].as_document().unwrap().get_document("title").unwrap();
        assert_eq!(title.get_str("$regex").unwrap(), r"a\.b");
        assert_eq!(title.get_str("$options").unwrap(), "i");
        let status = clauses[2].as_document().unwrap().get_document("status").unwrap();
        assert_eq!(status.get_str("$regex").unwrap(), r"a\.b");
    }

    #[test]
    fn search_filter_matches_numeric_fields_as_text() {
        let filter = search_filter::<User>("34");
        let clauses = filter.get_array("$or").unwrap();
        assert_eq!(
            clauses.len(),
            User::SEARCH_FIELDS.len() + User::NUMERIC_SEARCH_FIELDS.len()
        );
        let age = clauses[2]
            .as_document()
            .unwrap()
            .get_document("$expr")
            .unwrap()
            .get_document("$regexMatch")
            .unwrap();
        assert_eq!(
            age.get_document("input").unwrap().get_str("$toString").unwrap(),
            "$age"
        );
        assert_eq!(age.get_str("regex").unwrap(), "34");
        assert_eq!(age.get_str("options").unwrap(), "i");
    }
}
