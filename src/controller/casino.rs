use actix_web::{get, web, Responder};

use crate::{
    configuration::{AppState, State},
    error::Error,
    handler::leaderboard,
};

/// Top ten wagering users of the current week.
#[get("/casino/top")]
pub async fn top(
    state: web::Data<AppState<State>>,
) -> Result<impl Responder, Error> {
    let data = leaderboard::get_leaderboard(&state).await?;

    Ok(web::Json(data))
}
