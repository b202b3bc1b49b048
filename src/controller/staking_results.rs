use actix_web::{get, web, Responder};
use anyhow::Context;
use serde::Deserialize;

use crate::{
    configuration::{AppState, State},
    error::Error,
};

#[get("/stakingResults")]
pub async fn index(
    state: web::Data<AppState<State>>,
    query: web::Query<Query>,
) -> Result<impl Responder, Error> {
    let staking_period_id = query
        .staking_period_id
        .context("stakingPeriodId is required")?;

    let data = state
        .services()
        .results
        .get_by_period(staking_period_id)
        .await?;

    Ok(web::Json(data))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub staking_period_id: Option<i32>,
}
