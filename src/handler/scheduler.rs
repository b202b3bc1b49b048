use std::future::Future;

use chrono::{DateTime, NaiveTime, Utc};
use tokio::time::{self, Duration, MissedTickBehavior};
use tracing::{error, info};

use crate::{
    configuration::{AppState, State},
    error::Error,
    handler::{faucet_snapshot, payment_reconciler, staking_check},
    helpers::next_daily_run,
    model::Actions,
    provider::Notifier,
};

/// Time left until the next run of an interval job that last ran at
/// `last_run`. Zero when a run is overdue.
pub fn initial_delay(
    last_run: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    interval: Duration,
) -> Duration {
    let Some(last_run) = last_run else {
        return Duration::ZERO;
    };

    let Ok(elapsed) = (now - last_run).to_std() else {
        return interval;
    };

    interval.saturating_sub(elapsed)
}

async fn report_failure(app_state: &AppState<State>, job: &str, e: &Error) {
    error!("{} failed: {}", job, e);
    app_state
        .http
        .notify(&format!("{} failed: {}", job, e))
        .await;
}

async fn record_run(app_state: &AppState<State>, action: Actions) {
    if let Err(e) = app_state.database.action_history.insert(action).await {
        error!("Could not record {} run: {}", action, e);
    }
}

async fn payment_check(app_state: &AppState<State>) -> Result<(), Error> {
    let config = &app_state.config;
    let services = app_state.services();

    payment_reconciler::reconcile_payments(
        &services,
        &config.payment_platforms,
        &config.reconcile_settings()?,
        Utc::now(),
    )
    .await;

    Ok(())
}

pub async fn payment_task(app_state: AppState<State>) -> Result<(), Error> {
    let interval_value = Duration::from_secs(app_state.config.payment_interval);

    let last_run = app_state
        .database
        .action_history
        .get_last_by_type(Actions::PaymentCheckAction)
        .await?
        .map(|item| item.created_at);

    let delay = initial_delay(last_run, Utc::now(), interval_value);

    tokio::spawn(payment_loop(app_state, delay, interval_value)).await?
}

async fn payment_loop(
    app_state: AppState<State>,
    delay: Duration,
    interval_value: Duration,
) -> Result<(), Error> {
    time::sleep(delay).await;

    let mut interval = time::interval(interval_value);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        match payment_check(&app_state).await {
            Ok(()) => record_run(&app_state, Actions::PaymentCheckAction).await,
            Err(e) => report_failure(&app_state, "Payment check", &e).await,
        }
    }
}

/// Runs `job` at each of `times` (UTC) every day. A run finishes before the
/// next one is scheduled, so a slow run skips the times it overlapped.
async fn daily_task<F, Fut>(
    app_state: AppState<State>,
    name: &'static str,
    times: Vec<NaiveTime>,
    action: Actions,
    job: F,
) -> Result<(), Error>
where
    F: Fn(AppState<State>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), Error>> + Send + 'static,
{
    tokio::spawn(daily_loop(app_state, name, times, action, job)).await?
}

async fn daily_loop<F, Fut>(
    app_state: AppState<State>,
    name: &'static str,
    times: Vec<NaiveTime>,
    action: Actions,
    job: F,
) -> Result<(), Error>
where
    F: Fn(AppState<State>) -> Fut,
    Fut: Future<Output = Result<(), Error>>,
{
    loop {
        let now = Utc::now();
        let next = next_daily_run(now, &times).ok_or_else(|| {
            Error::ConfigurationError(format!("{} has no run times", name))
        })?;

        info!("{} scheduled at {}", name, next);
        time::sleep((next - now).to_std().unwrap_or(Duration::ZERO)).await;

        match job(app_state.clone()).await {
            Ok(()) => record_run(&app_state, action).await,
            Err(e) => report_failure(&app_state, name, &e).await,
        }
    }
}

pub async fn staking_task(app_state: AppState<State>) -> Result<(), Error> {
    let times = app_state.config.staking_check_times.to_owned();

    daily_task(
        app_state,
        "Staking check",
        times,
        Actions::StakingCheckAction,
        staking_check::staking_check_task,
    )
    .await
}

pub async fn snapshot_task(app_state: AppState<State>) -> Result<(), Error> {
    let times = app_state.config.snapshot_times.to_owned();

    daily_task(
        app_state,
        "Faucet snapshot",
        times,
        Actions::SnapshotAction,
        |app_state| async move {
            faucet_snapshot::take_snapshots(app_state).await.map(drop)
        },
    )
    .await
}

pub async fn start_tasks(app_state: AppState<State>) -> Result<(), Error> {
    if !app_state.config.enable_sync {
        return Ok(());
    }

    let (_, _, _) = tokio::try_join!(
        payment_task(app_state.clone()),
        staking_task(app_state.clone()),
        snapshot_task(app_state.clone()),
    )?;

    Ok(())
}
