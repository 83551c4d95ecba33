use std::borrow::Cow;
use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use super::Resource;

const NAME_MAX_CHARS: usize = 50;
const OBS_MAX_CHARS: usize = 1000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "MALE")]
    Male,
    #[serde(rename = "FEMALE")]
    Female,
    #[default]
    #[serde(rename = "")]
    Unspecified,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Unspecified => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub gender: Gender,
    pub age: u32,
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub obs: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDraft {
    pub name: String,
    #[serde(default)]
    pub gender: Gender,
    pub age: u32,
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub obs: String,
}

impl Resource for User {
    type Draft = UserDraft;

    const COLLECTION: &'static str = "users";
    const NOUN: &'static str = "user";
    const LABEL: &'static str = "User";
    const ID_FIELD: &'static str = "user_id";
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "gender"];
    const NUMERIC_SEARCH_FIELDS: &'static [&'static str] = &["age"];

    fn id(&self) -> &str {
        &self.user_id
    }

    fn from_draft(id: String, draft: UserDraft) -> Self {
        User {
            user_id: id,
            name: draft.name,
            gender: draft.gender,
            age: draft.age,
            joined_at: draft.joined_at,
            is_active: draft.is_active,
            obs: draft.obs,
        }
    }

    fn validate(draft: &UserDraft) -> Result<(), ValidationError> {
        if draft.name.trim().is_empty() {
            return Err(ValidationError::new("Name is required"));
        }
        if draft.name.chars().count() > NAME_MAX_CHARS {
            return Err(ValidationError::new(format!(
                "Name must be at most {} characters",
                NAME_MAX_CHARS
            )));
        }
        if draft.obs.chars().count() > OBS_MAX_CHARS {
            return Err(ValidationError::new(format!(
                "Observations must be at most {} characters",
                OBS_MAX_CHARS
            )));
        }
        Ok(())
    }

    fn search_values(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.name.as_str()),
            Cow::Borrowed(self.gender.as_str()),
            Cow::Owned(self.age.to_string()),
        ]
    }

    fn ordering(a: &Self, b: &Self) -> Ordering {
        a.name.cmp(&b.name).then_with(|| a.user_id.cmp(&b.user_id))
    }
}
