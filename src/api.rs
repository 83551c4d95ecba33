// src/api.rs

use actix_web::{web, HttpResponse};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::models::{Envelope, Resource, Task, User};
use crate::store::Store;

static SEARCH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_\-.\s]{1,48}[a-zA-Z0-9]$").expect("valid search pattern")
});

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

/// Mounts `/api/tasks` and `/api/users` with their stores.
pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::BadRequest(format!("Invalid JSON: {}", err)).into());
    let query_config = web::QueryConfig::default()
        .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into());

    cfg.app_data(json_config)
        .app_data(query_config)
        .app_data(web::Data::new(state.tasks.clone()))
        .app_data(web::Data::new(state.users.clone()))
        .service(
            web::scope("/api")
                .service(resource_scope::<Task>())
                .service(resource_scope::<User>()),
        );
}

fn resource_scope<R: Resource>() -> actix_web::Scope {
    web::scope(&format!("/{}", R::COLLECTION))
        .route("", web::get().to(list::<R>))
        .route("", web::post().to(create::<R>))
        .route("/{id}", web::get().to(get::<R>))
        .route("/{id}", web::put().to(update::<R>))
        .route("/{id}", web::delete().to(delete::<R>))
}

fn not_found<R: Resource>() -> ApiError {
    ApiError::NotFound(format!("{} not found", R::LABEL))
}

/// GET /api/{collection}[?search=q]
pub async fn list<R: Resource>(
    store: web::Data<Store<R>>,
    query: web::Query<SearchParams>,
) -> Result<HttpResponse, ApiError> {
    let search = query.search.as_deref().filter(|s| !s.is_empty());
    if let Some(term) = search {
        if !SEARCH_PATTERN.is_match(term) {
            return Err(ApiError::BadRequest("Invalid search parameters".to_string()));
        }
        debug!("Searching {} for {:?}", R::COLLECTION, term);
    }

    let records = store.list(search).await?;
    Ok(HttpResponse::Ok().json(Envelope::data(records)))
}

/// POST /api/{collection}
pub async fn create<R: Resource>(
    store: web::Data<Store<R>>,
    payload: web::Json<R::Draft>,
) -> Result<HttpResponse, ApiError> {
    let draft = payload.into_inner();
    R::validate(&draft)?;

    let record = R::from_draft(Uuid::new_v4().to_string(), draft);
    store.insert(&record).await?;
    info!("{} created: {}", R::LABEL, record.id());

    Ok(HttpResponse::Created().json(Envelope::data(record)))
}

/// GET /api/{collection}/{id}
pub async fn get<R: Resource>(
    store: web::Data<Store<R>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    match store.get(&id).await? {
        Some(record) => Ok(HttpResponse::Ok().json(Envelope::data(record))),
        None => Err(not_found::<R>()),
    }
}

/// PUT /api/{collection}/{id}
///
/// Full replacement. The id in the path wins over any id in the body.
pub async fn update<R: Resource>(
    store: web::Data<Store<R>>,
    path: web::Path<String>,
    payload: web::Json<R::Draft>,
) -> Result<HttpResponse, ApiError> {
    let draft = payload.into_inner();
    R::validate(&draft)?;

    let record = R::from_draft(path.into_inner(), draft);
    if !store.replace(&record).await? {
        return Err(not_found::<R>());
    }
    info!("{} updated: {}", R::LABEL, record.id());

    Ok(HttpResponse::Ok().json(Envelope::data(record)))
}

/// DELETE /api/{collection}/{id}
pub async fn delete<R: Resource>(
    store: web::Data<Store<R>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if !store.delete(&id).await? {
        return Err(not_found::<R>());
    }
    info!("{} deleted: {}", R::LABEL, id);

    Ok(HttpResponse::Ok().json(Envelope::<()>::empty()))
}
