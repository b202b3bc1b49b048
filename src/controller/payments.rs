use actix_web::{post, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::{
    configuration::{AppState, State},
    controller::{check_auth, AuthQuery},
    error::Error,
    handler::payment,
    model::Payment_Request,
};

#[post("/payments")]
pub async fn create(
    state: web::Data<AppState<State>>,
    data: web::Json<Payment_Request>,
) -> Result<impl Responder, Error> {
    let payment = payment::create_payment(&state.services(), &data).await?;

    Ok(HttpResponse::Created().json(payment))
}

#[post("/payments/{id}/complete")]
pub async fn complete(
    state: web::Data<AppState<State>>,
    path: web::Path<i32>,
    data: web::Json<CompleteRequest>,
) -> Result<impl Responder, Error> {
    let id = path.into_inner();
    let payment = payment::check_and_complete_payment(
        &state.services(),
        id,
        &data.txid,
        data.round,
    )
    .await?;

    Ok(web::Json(payment))
}

#[post("/payments/{id}/cancel")]
pub async fn cancel(
    state: web::Data<AppState<State>>,
    path: web::Path<i32>,
    query: web::Query<AuthQuery>,
) -> Result<impl Responder, Error> {
    check_auth(&state, &query)?;

    let payment =
        payment::cancel_payment(&state.services(), path.into_inner()).await?;

    Ok(web::Json(payment))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompleteRequest {
    pub txid: String,
    pub round: Option<u64>,
}
