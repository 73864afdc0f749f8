use std::collections::HashMap;

use actix_web::{HttpResponse, Responder, delete, get, put, web};
use serde::Deserialize;

use pingmon::{Host, MAX_DESCRIPTION_LEN, valid_address};

use super::ApiContext;
use super::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct PutHostBody {
    pub address: String,
    #[serde(default)]
    pub description: String,
}

/// All monitored hosts with their latest status, keyed by address
#[get("/hosts")]
pub async fn list_hosts(context: web::Data<ApiContext>) -> impl Responder {
    let hosts: HashMap<String, Host> = context
        .registry
        .all_hosts()
        .await
        .into_iter()
        .map(|host| (host.address.clone(), host))
        .collect();

    HttpResponse::Ok().json(hosts)
}

/// Register a host for monitoring. The body is authoritative; the path
/// segment only names the resource.
#[put("/hosts/{address}")]
pub async fn put_host(
    context: web::Data<ApiContext>,
    body: web::Json<PutHostBody>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();

    if body.address.is_empty() {
        return Err(ApiError::Validation("address required".into()));
    }
    if body.description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ApiError::Validation(format!(
            "description must be {MAX_DESCRIPTION_LEN} characters or less"
        )));
    }
    if !valid_address(&body.address) {
        return Err(ApiError::Validation(format!(
            "{} is not a valid IP or hostname",
            body.address
        )));
    }

    context
        .registry
        .register_host(Host::new(body.address, body.description))
        .await;

    Ok(HttpResponse::Ok().finish())
}

/// Stop monitoring a host. Exact address match only.
#[delete("/hosts/{address}")]
pub async fn delete_host(
    context: web::Data<ApiContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let address = path.into_inner();

    if !context.registry.contains(&address).await {
        return Err(ApiError::UnknownHost(address));
    }
    context.registry.remove_host(&address).await;

    Ok(HttpResponse::Ok().finish())
}
