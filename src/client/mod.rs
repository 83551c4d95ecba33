//! Client side of the task API: the form dispatcher, form extraction, UI
//! toggles and the typed service with its action façade.

pub mod actions;
pub mod dispatcher;
pub mod form;
pub mod service;
pub mod toggle;

pub use actions::{ResourceActions, TaskActions, UserActions};
pub use dispatcher::{Dispatcher, Outcome, RequestOptions, Submission, Ui};
pub use form::{extract, to_utc_iso, FormFields, FormSpec, TASK_FORM, USER_FORM};
pub use service::{RestService, SearchQuery, ServiceError, TaskService, UserService};
pub use toggle::ToggleController;
