use std::path::PathBuf;

use actix_cors::Cors;
use actix_files as fs;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{middleware::Logger, web, App, Error};

use crate::web::handlers;
use crate::web::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(handlers::json_config())
            .route("/chat", web::post().to(handlers::chat))
    )
    .route("/health", web::get().to(handlers::health_check));
}

/// The full application: API routes, then the static frontend mounted at `/`,
/// behind permissive CORS and the access log.
pub fn app(
    state: web::Data<AppState>,
    static_dir: PathBuf,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(Logger::default())
        .wrap(Cors::permissive())
        .app_data(state)
        .configure(configure)
        .service(fs::Files::new("/", static_dir).index_file("index.html"))
}
