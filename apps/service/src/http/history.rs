use actix_web::{Responder, get, web};

use super::ApiContext;

/// Observation history for one address, oldest first. Addresses that were
/// never observed yield an empty list rather than an error.
#[get("/history/{address}")]
pub async fn host_history(
    context: web::Data<ApiContext>,
    path: web::Path<String>,
) -> impl Responder {
    let address = path.into_inner();

    web::Json(context.history.entries_for(&address).await)
}
