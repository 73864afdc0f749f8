//! HTTP API over the registry and history.

mod error;
mod history;
mod hosts;
#[cfg(test)]
mod tests;

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::{App, HttpResponse, HttpServer, Responder, get, web};

use pingmon::{HistoryLog, HostRegistry};

use crate::error::AppError;

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct ApiContext {
    pub registry: Arc<HostRegistry>,
    pub history: Arc<HistoryLog>,
}

/// Health check route
/// This route returns no content, the response status is enough.
#[get("/health")]
pub async fn health_route() -> impl Responder {
    HttpResponse::Ok()
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health_route)
        .service(hosts::list_hosts)
        .service(hosts::put_host)
        .service(hosts::delete_host)
        .service(history::host_history);
}

/// Serve the API until the process exits
pub async fn run_server(addr: SocketAddr, context: ApiContext) -> Result<(), AppError> {
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(context.clone()))
            .configure(routes)
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}
