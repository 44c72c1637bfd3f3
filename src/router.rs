use actix_web::web::ServiceConfig;

use crate::controllers;

pub fn route(app: &mut ServiceConfig) {
    app.service(controllers::api::index);
    app.service(controllers::api::first);
    app.service(controllers::api::second);

    // Health check endpoints
    app.service(controllers::health::health);
    app.service(controllers::health::health_db);
    app.service(controllers::health::health_cache);
}
