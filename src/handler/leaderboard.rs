use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
    cache::TimedValue,
    configuration::{AppState, State},
    error::Error,
    helpers::start_of_week,
    model::{Leaderboard, Leaderboard_Entry},
};

/// Weekly leaderboard through `cache`; `fetch` receives the window from
/// Monday 00:00 UTC to `now` and only runs when the cached value expired.
pub async fn weekly_leaderboard<F, Fut>(
    cache: &TimedValue<Leaderboard>,
    now: DateTime<Utc>,
    fetch: F,
) -> Result<Leaderboard, Error>
where
    F: FnOnce(DateTime<Utc>, DateTime<Utc>) -> Fut,
    Fut: Future<Output = Result<Vec<Leaderboard_Entry>, Error>>,
{
    cache
        .get_or_refresh(|| async move {
            let entries = fetch(start_of_week(now), now).await?;
            Ok(Leaderboard {
                last_updated_at: now,
                entries,
            })
        })
        .await
}

pub async fn get_leaderboard(
    app_state: &AppState<State>,
) -> Result<Leaderboard, Error> {
    let casino = app_state.casino.as_ref().ok_or_else(|| {
        Error::NotFound(String::from("casino database is not configured"))
    })?;

    weekly_leaderboard(&app_state.leaderboard, Utc::now(), |start, end| {
        casino.top_wagered(start, end)
    })
    .await
}
