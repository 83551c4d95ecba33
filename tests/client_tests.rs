use std::collections::HashMap;
use std::net::TcpListener;

use actix_web::{http::header, web, App, HttpRequest, HttpResponse, HttpServer};
use reqwest::{StatusCode, Url};
use serde_json::json;

use tasknest::client::dispatcher::{network_message, Dispatcher, Outcome, RequestOptions, Submission, Ui};
use tasknest::client::service::NETWORK_ERROR;
use tasknest::client::{SearchQuery, TaskActions, TaskService, TASK_FORM};
use tasknest::models::{Priority, Status, TaskDraft};
use tasknest::{api, AppState};

#[derive(Default)]
struct RecordingUi {
    alerts: Vec<String>,
    navigations: Vec<Url>,
}

impl Ui for RecordingUi {
    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn navigate(&mut self, url: &Url) {
        self.navigations.push(url.clone());
    }
}

/// Serves the real API on an ephemeral port, backed by memory.
fn spawn_api() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().unwrap();
    let state = AppState::in_memory();
    let server = HttpServer::new(move || {
        let state = state.clone();
        App::new().configure(move |cfg| api::configure(cfg, &state))
    })
    .workers(1)
    .listen(listener)
    .unwrap()
    .run();
    tokio::spawn(server);
    format!("http://{}", addr)
}

async fn buy_milk() -> HttpResponse {
    HttpResponse::Created().json(json!({
        "data": { "task_id": "1", "title": "Buy milk", "priority": "LOW", "status": "TODO" }
    }))
}

async fn boom() -> HttpResponse {
    HttpResponse::InternalServerError().json(json!({ "error": "boom" }))
}

async fn bare_failure() -> HttpResponse {
    HttpResponse::BadGateway().json(json!({}))
}

async fn search_echo(req: HttpRequest) -> HttpResponse {
    if req.query_string() == "search=Task" {
        HttpResponse::Ok().json(json!({
            "data": [
                { "task_id": "1", "title": "Task A", "priority": "HIGH", "status": "DOING" },
                { "task_id": "2", "title": "Task B", "priority": "LOW", "status": "DONE" }
            ]
        }))
    } else {
        HttpResponse::BadRequest().json(json!({ "error": req.query_string().to_string() }))
    }
}

async fn redirect_to_done() -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, "/done"))
        .finish()
}

async fn done() -> HttpResponse {
    HttpResponse::Ok().body("done")
}

/// Serves canned responses for the scenarios a real server cannot produce
/// on demand.
fn spawn_stub() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(|| {
        App::new()
            .service(
                web::scope("/ok/api/tasks")
                    .route("", web::post().to(buy_milk))
                    .route("", web::get().to(search_echo)),
            )
            .service(
                web::scope("/boom/api/tasks")
                    .route("", web::post().to(boom))
                    .route("/{id}", web::delete().to(boom)),
            )
            .service(web::scope("/bare/api/tasks").route("", web::get().to(bare_failure)))
            .route("/submit", web::post().to(redirect_to_done))
            .route("/done", web::get().to(done))
    })
    .workers(1)
    .listen(listener)
    .unwrap()
    .run();
    tokio::spawn(server);
    format!("http://{}", addr)
}

/// An address nothing listens on.
fn dead_origin() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn buy_milk_draft() -> TaskDraft {
    TaskDraft {
        priority: Priority::Low,
        status: Status::Todo,
        ..TaskDraft::new("Buy milk")
    }
}

#[tokio::test]
async fn create_resolves_to_the_returned_task() {
    let service = TaskService::new(&format!("{}/ok", spawn_stub()));
    let task = service.create(&buy_milk_draft()).await.unwrap();
    assert_eq!(task.task_id, "1");
    assert_eq!(task.title, "Buy milk");
    assert_eq!(task.priority, Priority::Low);
}

#[tokio::test]
async fn server_error_message_is_passed_through() {
    let service = TaskService::new(&format!("{}/boom", spawn_stub()));
    let err = service.create(&buy_milk_draft()).await.unwrap_err();
    assert_eq!(err.message, "boom");

    let err = service.delete("1").await.unwrap_err();
    assert_eq!(err.message, "boom");
}

#[tokio::test]
async fn missing_error_message_uses_the_fallback() {
    let service = TaskService::new(&format!("{}/bare", spawn_stub()));
    let err = service.get_all().await.unwrap_err();
    assert_eq!(err.message, "Failed to fetch tasks");
}

#[tokio::test]
async fn transport_failure_is_a_network_error() {
    let service = TaskService::new(&dead_origin()).production(true);
    let err = service.create(&buy_milk_draft()).await.unwrap_err();
    assert_eq!(err.message, NETWORK_ERROR);
}

#[tokio::test]
async fn search_encodes_the_query_and_returns_data_unmodified() {
    let service = TaskService::new(&format!("{}/ok", spawn_stub()));
    let tasks = service.search(&SearchQuery::new("Task")).await.unwrap();
    let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Task A", "Task B"]);

    let err = service.search(&SearchQuery::new("a&b c")).await.unwrap_err();
    assert_eq!(err.message, "search=a%26b+c");
}

#[tokio::test]
async fn search_with_spaces_finds_records_on_the_api() {
    let service = TaskService::new(&spawn_api());
    service.create(&buy_milk_draft()).await.unwrap();
    service.create(&TaskDraft::new("Buy bread")).await.unwrap();

    let found = service.search(&SearchQuery::new("buy milk")).await.unwrap();
    let titles: Vec<&str> = found.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Buy milk"]);
}

#[tokio::test]
async fn actions_drive_a_full_lifecycle_against_the_api() {
    let actions = TaskActions::new(TaskService::new(&spawn_api()));

    let created = actions.on_create(&buy_milk_draft()).await.unwrap();
    assert!(!created.task_id.is_empty());

    let mut task = actions.on_find(&created.task_id).await.unwrap();
    assert_eq!(task, created);

    task.status = Status::Done;
    let updated = actions.on_update(&task).await.unwrap();
    assert_eq!(updated.status, Status::Done);

    let found = actions.on_search(&SearchQuery::new("milk")).await.unwrap();
    assert_eq!(found, vec![updated.clone()]);

    actions.on_delete(&created.task_id).await.unwrap();
    assert!(actions.on_list().await.unwrap().is_empty());

    let err = actions.on_find(&created.task_id).await.unwrap_err();
    assert_eq!(err.message, "Task not found");
}

#[tokio::test]
async fn dispatcher_navigates_to_the_resolved_url() {
    let origin = spawn_stub();
    let mut ui = RecordingUi::default();
    let outcome = Dispatcher::default()
        .dispatch(&format!("{}/submit", origin), RequestOptions::new(reqwest::Method::POST), &mut ui)
        .await;

    let expected = Url::parse(&format!("{}/done", origin)).unwrap();
    assert_eq!(outcome, Outcome::Navigated(expected.clone()));
    assert_eq!(ui.navigations, vec![expected]);
    assert!(ui.alerts.is_empty());
}

#[tokio::test]
async fn dispatcher_alerts_once_on_a_status_error() {
    let api = format!("{}/api/tasks", spawn_api());
    let form: HashMap<String, String> = [("title", ""), ("csrfmiddlewaretoken", "tok")]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let mut ui = RecordingUi::default();
    let outcome = Dispatcher::default()
        .submit(Submission::save(&api, &form, &TASK_FORM), &mut ui)
        .await;

    assert_eq!(outcome, Outcome::StatusError(StatusCode::BAD_REQUEST));
    assert_eq!(ui.alerts.len(), 1);
    assert!(ui.alerts[0].contains("400"));
    assert!(ui.navigations.is_empty());
}

#[tokio::test]
async fn dispatcher_submits_forms_and_navigates_on_success() {
    let api = format!("{}/api/tasks", spawn_api());
    let form: HashMap<String, String> = [
        ("title", "Buy groceries"),
        ("description", "Milk, eggs, bread, cheese"),
        ("start_time", "2024-05-01T12:00:00+02:00"),
        ("priority", "HIGH"),
        ("status", "TODO"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let mut ui = RecordingUi::default();
    let dispatcher = Dispatcher::default();
    let outcome = dispatcher.submit(Submission::save(&api, &form, &TASK_FORM), &mut ui).await;
    assert!(matches!(outcome, Outcome::Navigated(_)));

    let tasks = TaskService::new(api.trim_end_matches("/api/tasks")).get_all().await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(
        tasks[0].start_time.map(|t| t.to_rfc3339()),
        Some("2024-05-01T10:00:00+00:00".to_string())
    );
    assert!(ui.alerts.is_empty());
}

#[tokio::test]
async fn dispatcher_reports_network_failures() {
    let mut ui = RecordingUi::default();
    let outcome = Dispatcher::default()
        .dispatch(&dead_origin(), RequestOptions::new(reqwest::Method::GET), &mut ui)
        .await;

    assert_eq!(outcome, Outcome::NetworkError);
    assert_eq!(ui.alerts, vec![network_message()]);
    assert!(ui.navigations.is_empty());
}
