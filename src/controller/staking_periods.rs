use actix_web::{get, post, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::{
    configuration::{AppState, State},
    controller::{check_auth, AuthQuery},
    error::Error,
    handler::{reward_apportioner, stake_profit_snapshot, staking_period},
    model::Staking_Period_Request,
};

#[get("/stakingPeriods")]
pub async fn index(
    state: web::Data<AppState<State>>,
) -> Result<impl Responder, Error> {
    let data = state.services().periods.get_all().await?;

    Ok(web::Json(data))
}

#[get("/stakingPeriods/{id}")]
pub async fn get_by_id(
    state: web::Data<AppState<State>>,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    let period =
        staking_period::find_by_id(&state.services(), path.into_inner())
            .await?;

    Ok(web::Json(period))
}

#[post("/stakingPeriods")]
pub async fn create(
    state: web::Data<AppState<State>>,
    data: web::Json<Staking_Period_Request>,
    query: web::Query<AuthQuery>,
) -> Result<impl Responder, Error> {
    check_auth(&state, &query)?;

    let period = staking_period::create_period(&state.services(), &data).await?;

    Ok(HttpResponse::Created().json(period))
}

#[post("/stakingPeriods/{id}/createResult")]
pub async fn create_result(
    state: web::Data<AppState<State>>,
    path: web::Path<i32>,
    data: web::Json<CreateResultRequest>,
    query: web::Query<AuthQuery>,
) -> Result<impl Responder, Error> {
    check_auth(&state, &query)?;

    let services = state.services();
    let period =
        staking_period::find_by_id(&services, path.into_inner()).await?;
    let result =
        reward_apportioner::create_result(&services, &period, data.profit)
            .await?;

    Ok(HttpResponse::Created().json(result))
}

#[get("/stakingPeriods/{id}/profit")]
pub async fn profit(
    state: web::Data<AppState<State>>,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    let snapshot = stake_profit_snapshot::last_known_profit(
        &state.database.stake_profit_snapshot,
        path.into_inner(),
    )
    .await?;

    Ok(web::Json(snapshot))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateResultRequest {
    pub profit: u64,
}
