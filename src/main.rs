#![deny(warnings)]

use std::io;

use actix_web::web::Data;
use actix_web::{App, HttpServer};

use tollgate::cache::RedisPool;
use tollgate::controllers::api::ProtectedTarget;
use tollgate::token::TokenCodec;
use tollgate::{config, database, logging, router};

#[actix::main]
async fn main() -> io::Result<()> {
    logging::init();

    let config = match config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    // Postgres failure hands control back to the caller.
    let db = match database::connect(&config.postgres).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(error = %e, "postgres connect failed");
            return Ok(());
        }
    };
    tracing::info!(host = %config.postgres.host, "postgres connected");

    // A dead cache endpoint at startup terminates the process.
    let pool = match RedisPool::connect(&config.redis).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "redis pool construction failed");
            std::process::exit(1);
        }
    };
    tracing::info!(host = %config.redis.host, "redis pool ready");

    let codec = Data::new(TokenCodec::new(&config.token));
    let target = Data::new(ProtectedTarget::local(config.server.port));
    let db = Data::new(db);
    let pool = Data::new(pool);

    tracing::info!(host = %config.server.host, port = config.server.port, "server starting");

    HttpServer::new(move || {
        App::new()
            .app_data(codec.clone())
            .app_data(target.clone())
            .app_data(db.clone())
            .app_data(pool.clone())
            .configure(router::route)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
