// src/main.rs

use std::io;

use actix_cors::Cors;
use actix_web::{http, middleware::Logger, App, HttpServer};
use env_logger::Env;
use log::info;

use tasknest::config::{Config, StorageConfig};
use tasknest::{api, AppState};

fn cors(frontend_origin: &str) -> Cors {
    Cors::default()
        .allowed_origin(frontend_origin)
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            http::header::CONTENT_TYPE,
            http::header::ACCEPT,
            http::header::HeaderName::from_static("x-csrftoken"),
        ])
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let state = AppState::connect(&config.storage)
        .await
        .map_err(io::Error::other)?;

    match &config.storage {
        StorageConfig::Mongo { database, .. } => info!("Storage: MongoDB database {}", database),
        StorageConfig::Memory => info!("Storage: in-memory, records are lost on exit"),
    }
    info!("Server running at http://{}", config.bind_addr);
    info!("Allowed CORS Origin: {}", config.frontend_origin);

    let frontend_origin = config.frontend_origin.clone();
    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(Logger::default())
            .wrap(cors(&frontend_origin))
            .configure(move |cfg| api::configure(cfg, &state))
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
