use std::io;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;

use expense_tracker::{
    config::Config,
    handlers,
    services::{auth::AuthService, database::DatabaseService},
};

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    log::error!("{}: {}", context, err);
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env()
        .map_err(|e| startup_error("Failed to load configuration (is JWT_SECRET set?)", e))?;

    let database_service = DatabaseService::new(&config.database)
        .await
        .map_err(|e| startup_error("Failed to initialize database", e))?;

    let auth_service =
        AuthService::new(&config.auth).map_err(|e| startup_error("Failed to initialize auth", e))?;

    let bind_address = config.bind_address();
    let app_config = config.app.clone();

    log::info!("Starting expense tracker API on {}", bind_address);
    log::info!(
        "Using database {} ({}/{})",
        config.database.url,
        config.database.namespace,
        config.database.name
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .app_data(web::Data::new(database_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(app_config.clone()))
            .configure(handlers::configure)
    })
    .bind(&bind_address)?
    .run()
    .await
}
