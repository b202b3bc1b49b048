use actix_web::{get, post, web, HttpResponse, Responder};

use crate::{
    configuration::{AppState, State},
    controller::{check_auth, AuthQuery},
    error::Error,
    helpers::is_valid_address,
    model::Platform_Request,
};

#[get("/platforms/{id}")]
pub async fn index(
    state: web::Data<AppState<State>>,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    let id = path.into_inner();
    let platform = state
        .services()
        .platforms
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("platform {}", id)))?;

    Ok(web::Json(platform))
}

#[post("/platforms")]
pub async fn create(
    state: web::Data<AppState<State>>,
    data: web::Json<Platform_Request>,
    query: web::Query<AuthQuery>,
) -> Result<impl Responder, Error> {
    check_auth(&state, &query)?;

    if data.name.trim().is_empty() {
        return Err(Error::ValidationFailure(String::from(
            "name is required",
        )));
    }

    if !is_valid_address(&data.address) {
        return Err(Error::ValidationFailure(format!(
            "invalid address {}",
            data.address
        )));
    }

    let platform = state.services().platforms.insert(&data).await?;

    Ok(HttpResponse::Created().json(platform))
}
