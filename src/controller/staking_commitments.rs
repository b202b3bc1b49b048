use actix_web::{get, post, put, web, HttpResponse, Responder};
use anyhow::Context;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    configuration::{AppState, State},
    error::Error,
    handler::staking_commitment,
    model::{Pledges, Staking_Commitment_Request},
    provider::AuthRequest,
};

#[get("/stakingCommitments")]
pub async fn index(
    state: web::Data<AppState<State>>,
    query: web::Query<Query>,
) -> Result<impl Responder, Error> {
    let staking_period_id = query
        .staking_period_id
        .context("stakingPeriodId is required")?;

    let data =
        staking_commitment::find_by_period(&state.services(), staking_period_id)
            .await?;

    Ok(web::Json(data))
}

#[post("/stakingCommitments")]
pub async fn create(
    state: web::Data<AppState<State>>,
    data: web::Json<CreateRequest>,
) -> Result<impl Responder, Error> {
    let commitment = staking_commitment::create_commitment(
        &state.services(),
        &data.commitment,
        &data.auth,
        Utc::now(),
    )
    .await?;

    Ok(HttpResponse::Created().json(commitment))
}

#[put("/stakingCommitments/{id}")]
pub async fn update(
    state: web::Data<AppState<State>>,
    path: web::Path<i32>,
    data: web::Json<UpdateRequest>,
) -> Result<impl Responder, Error> {
    let commitment = staking_commitment::update_commitment(
        &state.services(),
        path.into_inner(),
        &data.pledges,
        &data.auth,
        Utc::now(),
    )
    .await?;

    Ok(web::Json(commitment))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub staking_period_id: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateRequest {
    pub auth: AuthRequest,
    #[serde(flatten)]
    pub commitment: Staking_Commitment_Request,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub auth: AuthRequest,
    #[serde(flatten)]
    pub pledges: Pledges,
}
