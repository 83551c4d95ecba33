use log::error;
use reqwest::{header, Client, Method, StatusCode, Url};
use serde_json::Value;

use super::form::{extract, FormFields, FormSpec, CSRF_FIELD};

const RETRY_HINT: &str = "Try again! If the problem persists, contact the support!";

/// The host page: where alerts are shown and navigation happens.
pub trait Ui {
    /// A blocking notification.
    fn alert(&mut self, message: &str);

    /// Full navigation, replacing the current view.
    fn navigate(&mut self, url: &Url);
}

/// Which of the three terminal actions a dispatch ended in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Navigated(Url),
    StatusError(StatusCode),
    NetworkError,
}

#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self { method, headers: Vec::new(), query: Vec::new(), body: None }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sent form-encoded, so a space in `value` arrives as `+`.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A request built from a submitted form.
#[derive(Debug, Clone)]
pub struct Submission {
    pub url: String,
    pub options: RequestOptions,
}

impl Submission {
    /// `GET {action}?search={q}` from the form's `search` field.
    pub fn search<F: FormFields + ?Sized>(action: &str, form: &F) -> Self {
        let q = form.value("search").unwrap_or("");
        Submission {
            url: action.to_string(),
            options: RequestOptions::new(Method::GET).query("search", q),
        }
    }

    /// Creates (`POST {action}`) or replaces (`PUT {action}/{id}`) the record
    /// the form describes, as JSON.
    pub fn save<F: FormFields + ?Sized>(action: &str, form: &F, spec: &FormSpec) -> Self {
        let record = extract(form, spec);
        let (method, url) = match record.get(spec.id_field).and_then(Value::as_str) {
            Some(id) => (Method::PUT, member_url(action, id)),
            None => (Method::POST, action.to_string()),
        };

        let options = with_csrf(RequestOptions::new(method), form)
            .header(header::CONTENT_TYPE.as_str(), "application/json")
            .body(format!("{:#}", Value::Object(record)));

        Submission { url, options }
    }

    /// `DELETE {action}/{id}`; falls back to `{action}` when the form has no id.
    pub fn delete<F: FormFields + ?Sized>(action: &str, form: &F, spec: &FormSpec) -> Self {
        let url = match form.value(spec.id_field).filter(|id| !id.is_empty()) {
            Some(id) => member_url(action, id),
            None => action.to_string(),
        };
        Submission {
            url,
            options: with_csrf(RequestOptions::new(Method::DELETE), form),
        }
    }
}

fn member_url(action: &str, id: &str) -> String {
    format!("{}/{}", action.trim_end_matches('/'), id)
}

fn with_csrf<F: FormFields + ?Sized>(options: RequestOptions, form: &F) -> RequestOptions {
    match form.value(CSRF_FIELD) {
        Some(token) => options.header("X-CSRFToken", token),
        None => options,
    }
}

pub fn status_message(status: StatusCode) -> String {
    format!(
        "Error {}: {}\n{}",
        status.as_u16(),
        status.canonical_reason().unwrap_or(""),
        RETRY_HINT
    )
}

pub fn network_message() -> String {
    format!("Something went wrong.\n{}", RETRY_HINT)
}

/// Fires one request and turns its outcome into exactly one UI action.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    client: Client,
}

impl Dispatcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn dispatch<U: Ui + ?Sized>(
        &self,
        url: &str,
        options: RequestOptions,
        ui: &mut U,
    ) -> Outcome {
        let mut request = self.client.request(options.method, url);
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        if let Some(body) = options.body {
            request = request.body(body);
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                let location = response.url().clone();
                ui.navigate(&location);
                Outcome::Navigated(location)
            }
            Ok(response) => {
                let status = response.status();
                ui.alert(&status_message(status));
                Outcome::StatusError(status)
            }
            Err(err) => {
                error!("Request to {} failed: {}", url, err);
                ui.alert(&network_message());
                Outcome::NetworkError
            }
        }
    }

    pub async fn submit<U: Ui + ?Sized>(&self, submission: Submission, ui: &mut U) -> Outcome {
        self.dispatch(&submission.url, submission.options, ui).await
    }
}
