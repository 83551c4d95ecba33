mod task;
mod user;

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub use task::{Priority, Status, Task, TaskDraft};
pub use user::{Gender, User, UserDraft};

/// An entity served under `/api/{COLLECTION}`.
///
/// Storage, the HTTP handlers and the typed client are all written once
/// against this trait.
pub trait Resource:
    Clone + Debug + Serialize + DeserializeOwned + Send + Sync + Unpin + 'static
{
    /// The record as submitted for creation or replacement, without an identifier.
    type Draft: Serialize + DeserializeOwned + Send + 'static;

    /// Collection name, also the URL segment and the plural noun.
    const COLLECTION: &'static str;
    /// Lowercase singular noun used in client failure messages.
    const NOUN: &'static str;
    /// Capitalized noun used in server error messages.
    const LABEL: &'static str;
    /// Name of the identifier field on the wire and in storage.
    const ID_FIELD: &'static str;
    /// String fields matched by a search.
    const SEARCH_FIELDS: &'static [&'static str];
    /// Numeric fields matched by a search on their decimal text.
    const NUMERIC_SEARCH_FIELDS: &'static [&'static str] = &[];

    fn id(&self) -> &str;

    fn from_draft(id: String, draft: Self::Draft) -> Self;

    fn validate(draft: &Self::Draft) -> Result<(), ValidationError>;

    /// Values of `SEARCH_FIELDS` and `NUMERIC_SEARCH_FIELDS` for this record,
    /// as stored.
    fn search_values(&self) -> Vec<Cow<'_, str>>;

    /// Listing order.
    fn ordering(a: &Self, b: &Self) -> Ordering;

    /// Case-insensitive substring match; `needle` must already be lowercase.
    fn matches(&self, needle: &str) -> bool {
        self.search_values()
            .iter()
            .any(|value| value.to_lowercase().contains(needle))
    }
}

/// The `{data}` / `{error}` wrapper every API response is sent in.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self { data: Some(data), error: None }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self { data: None, error: Some(message.into()) }
    }

    pub fn empty() -> Self {
        Self { data: None, error: None }
    }
}
