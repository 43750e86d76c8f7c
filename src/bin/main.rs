use actix_web::{middleware, web, App, HttpServer};
use tracing_subscriber::EnvFilter;

use roost::{config, core::db, routes};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let pool = db::connect(&config::database_url())
        .await
        .expect("datastore must be reachable");

    let addr = config::listen_addr();
    tracing::info!("listening on {}", addr);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .configure(routes)
    })
    .bind(addr)?
    .run()
    .await
}
