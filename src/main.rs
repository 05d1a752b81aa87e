mod completion;
mod config;
mod conversation;
mod error;
mod persona;
mod web;

use std::sync::Arc;

use actix_web::{web::Data, HttpServer};
use dotenv::dotenv;
use log::{error, info, warn};

use completion::OpenAiClient;
use config::Config;
use persona::Persona;
use web::{routes, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!("Starting persona relay");

    let persona = match Persona::load(&config.persona) {
        Ok(persona) => persona,
        Err(e) => {
            error!("Failed to load persona: {}", e);
            std::process::exit(1);
        }
    };

    let client = match OpenAiClient::new(&config.completion) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build completion client: {}", e);
            std::process::exit(1);
        }
    };

    let static_dir = config.static_dir.clone();
    if !static_dir.is_dir() {
        warn!("Static directory {} not found; only the API will be served", static_dir.display());
    }

    info!(
        "{} running on http://{}:{} (persona: {})",
        persona.assistant_name, config.host, config.port, persona.source
    );

    let app_state = Data::new(AppState {
        persona,
        completion: Arc::new(client),
    });

    HttpServer::new(move || routes::app(app_state.clone(), static_dir.clone()))
        .bind((config.host.as_str(), config.port))?
        .run()
        .await
}
