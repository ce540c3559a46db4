//! HTTP surface: session operations, realtime upgrade, health.

pub mod health;
pub mod sessions;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(health::health)))
        .service(web::resource("/ws").route(web::get().to(crate::ws::session::upgrade)))
        .service(web::scope("/api/sessions").configure(sessions::configure_routes));
}
