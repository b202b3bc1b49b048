use std::{env, fs, io::ErrorKind, ops::Deref, str::FromStr, sync::Arc};

use chrono::{Duration, NaiveTime};
use tokio::time;
use url::Url;

use crate::{
    cache::TimedValue,
    dao::get_path,
    error::Error,
    handler::{
        eligibility_auditor::Tier, payment_reconciler::ReconcileSettings,
        Services,
    },
    helpers::parse_tuple_string,
    model::{Leaderboard, Pledge_Tier},
    provider::{CasinoDatabase, DatabasePool, Ed25519Verifier, LedgerClient, HTTP},
};

#[derive(Debug)]
pub struct AppState<T>(Arc<T>);

impl<T> AppState<T> {
    pub fn new(state: T) -> AppState<T> {
        AppState(Arc::new(state))
    }
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> AppState<T> {
        AppState(Arc::clone(&self.0))
    }
}

impl<T> Deref for AppState<T> {
    type Target = Arc<T>;

    fn deref(&self) -> &Arc<T> {
        &self.0
    }
}

#[derive(Debug)]
pub struct State {
    pub config: Config,
    pub database: DatabasePool,
    pub casino: Option<CasinoDatabase>,
    pub ledger: LedgerClient,
    pub http: HTTP,
    pub verifier: Ed25519Verifier,
    pub leaderboard: TimedValue<Leaderboard>,
}

impl State {
    pub async fn new(
        config: Config,
        database: DatabasePool,
        casino: Option<CasinoDatabase>,
        ledger: LedgerClient,
        http: HTTP,
    ) -> Result<State, Error> {
        Self::init_migrations(&database).await?;

        let verifier = Ed25519Verifier::new(config.auth_note.to_owned());
        let leaderboard = TimedValue::new(time::Duration::from_secs(
            config.leaderboard_ttl * 60 * 60,
        ));

        Ok(Self {
            config,
            database,
            casino,
            ledger,
            http,
            verifier,
            leaderboard,
        })
    }

    async fn init_migrations(database: &DatabasePool) -> Result<(), Error> {
        let files = vec![
            "platforms.sql",
            "payments.sql",
            "staking_periods.sql",
            "staking_commitments.sql",
            "staking_results.sql",
            "stake_profit_snapshots.sql",
            "faucet_snapshots.sql",
            "action_history.sql",
        ];

        let dir = env!("CARGO_MANIFEST_DIR");

        for file in files {
            let data = fs::read_to_string(get_path(dir, file))?;
            sqlx::raw_sql(&data).execute(&database.pool).await?;
        }

        Ok(())
    }

    /// Borrowed view of every collaborator the jobs and services consume.
    pub fn services(&self) -> Services<'_> {
        Services {
            ledger: &self.ledger,
            notifier: &self.http,
            webhook: &self.http,
            verifier: &self.verifier,
            payments: &self.database.payment,
            platforms: &self.database.platform,
            periods: &self.database.staking_period,
            commitments: &self.database.staking_commitment,
            results: &self.database.staking_result,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub casino_database_url: Option<String>,
    pub server_host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub timeout: u64,
    pub statement_timeout: u64,
    pub algod_host: String,
    pub algod_token: String,
    pub indexer_host: String,
    pub indexer_token: String,
    pub indexer_page_delay: u64,
    pub slack_webhook_url: Option<String>,
    pub payment_platforms: Vec<i32>,
    pub payment_interval: u64,
    pub payment_min_age: u64,
    pub payment_max_age: u64,
    pub auto_approve_limit: u64,
    pub staking_tiers: Vec<Tier>,
    pub staking_check_times: Vec<NaiveTime>,
    pub snapshot_times: Vec<NaiveTime>,
    pub snapshot_assets: Vec<u64>,
    pub snapshot_minimum_balance: u64,
    pub snapshot_denylist: Vec<String>,
    pub leaderboard_ttl: u64,
    pub auth_note: String,
    pub enable_sync: bool,
    pub auth: String,
}

impl Config {
    pub fn reconcile_settings(&self) -> Result<ReconcileSettings, Error> {
        Ok(ReconcileSettings {
            min_age: seconds("PAYMENT_MIN_AGE_IN_SEC", self.payment_min_age)?,
            max_age: seconds("PAYMENT_MAX_AGE_IN_SEC", self.payment_max_age)?,
            auto_approve_limit: self.auto_approve_limit,
        })
    }

    pub fn get_account_information_url(
        &self,
        address: &str,
    ) -> Result<Url, Error> {
        let url = Url::parse(&format!(
            "{}/v2/accounts/{}",
            self.algod_host, address
        ))?;
        Ok(url)
    }

    pub fn get_wait_for_block_url(&self, round: u64) -> Result<Url, Error> {
        let url = Url::parse(&format!(
            "{}/v2/status/wait-for-block-after/{}",
            self.algod_host, round
        ))?;
        Ok(url)
    }

    pub fn get_asset_balances_url(&self, asset_id: u64) -> Result<Url, Error> {
        let url = Url::parse(&format!(
            "{}/v2/assets/{}/balances",
            self.indexer_host, asset_id
        ))?;
        Ok(url)
    }

    pub fn get_account_transactions_url(
        &self,
        address: &str,
    ) -> Result<Url, Error> {
        let url = Url::parse(&format!(
            "{}/v2/accounts/{}/transactions",
            self.indexer_host, address
        ))?;
        Ok(url)
    }

    pub fn get_transaction_url(&self, id: &str) -> Result<Url, Error> {
        let url = Url::parse(&format!(
            "{}/v2/transactions/{}",
            self.indexer_host, id
        ))?;
        Ok(url)
    }
}

pub fn get_configuration() -> Result<Config, Error> {
    let database_url = env::var("DATABASE_URL")?;
    let casino_database_url = optional_var("CASINO_DATABASE_URL");
    let server_host = env::var("SERVER_HOST")?;
    let port: u16 = env::var("PORT")?.parse()?;
    let allowed_origins = parse_list(&env::var("ALLOWED_ORIGINS")?);
    let timeout = env::var("TIMEOUT")?.parse()?;
    let statement_timeout = env::var("STATEMENT_TIMEOUT")?.parse()?;

    let algod_host = trim_host(env::var("ALGOD_HOST")?);
    let algod_token = env::var("ALGOD_TOKEN")?;
    let indexer_host = trim_host(env::var("INDEXER_HOST")?);
    let indexer_token = env::var("INDEXER_TOKEN")?;
    let indexer_page_delay = env::var("INDEXER_PAGE_DELAY_IN_MS")?.parse()?;
    let slack_webhook_url = optional_var("SLACK_WEBHOOK_URL");

    let mut payment_platforms = vec![];
    for platform in parse_list(&env::var("PAYMENT_PLATFORMS")?) {
        payment_platforms.push(platform.parse::<i32>()?);
    }

    let payment_interval = env::var("PAYMENT_INTERVAL_IN_SEC")?.parse()?;
    let payment_min_age = env::var("PAYMENT_MIN_AGE_IN_SEC")?.parse()?;
    let payment_max_age = env::var("PAYMENT_MAX_AGE_IN_SEC")?.parse()?;
    let auto_approve_limit = env::var("AUTO_APPROVE_LIMIT")?.parse()?;

    if payment_min_age >= payment_max_age {
        return Err(Error::ConfigurationError(String::from(
            "PAYMENT_MIN_AGE_IN_SEC must be lower than PAYMENT_MAX_AGE_IN_SEC",
        )));
    }

    let staking_tiers = get_staking_tiers()?;
    let staking_check_times = parse_times(&env::var("STAKING_CHECK_TIMES")?)?;
    let snapshot_times = parse_times(&env::var("SNAPSHOT_TIMES")?)?;

    let mut snapshot_assets = vec![];
    for asset in parse_list(&env::var("SNAPSHOT_ASSETS")?) {
        snapshot_assets.push(asset.parse::<u64>()?);
    }

    let snapshot_minimum_balance =
        env::var("SNAPSHOT_MINIMUM_BALANCE")?.parse()?;
    let snapshot_denylist = parse_list(&env::var("SNAPSHOT_DENYLIST")?);
    let leaderboard_ttl = env::var("LEADERBOARD_TTL_IN_HOURS")?.parse()?;
    let auth_note = env::var("AUTH_NOTE")?;
    let enable_sync = env::var("ENABLE_SYNC")?.parse()?;
    let auth = env::var("AUTH")?;

    let config = Config {
        database_url,
        casino_database_url,
        server_host,
        port,
        allowed_origins,
        timeout,
        statement_timeout,
        algod_host,
        algod_token,
        indexer_host,
        indexer_token,
        indexer_page_delay,
        slack_webhook_url,
        payment_platforms,
        payment_interval,
        payment_min_age,
        payment_max_age,
        auto_approve_limit,
        staking_tiers,
        staking_check_times,
        snapshot_times,
        snapshot_assets,
        snapshot_minimum_balance,
        snapshot_denylist,
        leaderboard_ttl,
        auth_note,
        enable_sync,
        auth,
    };

    config.reconcile_settings()?;

    Ok(config)
}

pub fn set_configuration() -> Result<(), Error> {
    let config_file: &str = ".env";
    let payapi_config_file: &str = "payapi.conf";

    let directory = env!("CARGO_MANIFEST_DIR");
    let path = format!("{}/{}", directory, config_file);
    let payapi_config_path = format!("{}/{}", directory, payapi_config_file);

    let payapi_config_string = fs::read_to_string(payapi_config_path)?;
    parse_config_string(payapi_config_string);

    // secrets may come from the process environment instead of `.env`
    match fs::read_to_string(path) {
        Ok(config_string) => parse_config_string(config_string),
        Err(error) if error.kind() == ErrorKind::NotFound => {},
        Err(error) => return Err(Error::Io(error)),
    }

    Ok(())
}

fn parse_config_string(config: String) {
    let params: Vec<Option<(&str, &str)>> = config
        .split('\n')
        .map(|s| s.trim_end_matches('\r'))
        .filter(|s| !s.trim_start().starts_with('#'))
        .map(|s| {
            let element = s.find('=');
            if let Some(e) = element {
                return Some(s.split_at(e));
            }
            None
        })
        .map(|value| {
            if let Some((k, v)) = value {
                return Some((k.trim(), &v[1..]));
            }
            None
        })
        .collect();

    for (key, value) in params.into_iter().flatten() {
        std::env::set_var(key, value);
    }
}

fn seconds(key: &str, value: u64) -> Result<Duration, Error> {
    i64::try_from(value)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| {
            Error::ConfigurationError(format!("{} is out of range", key))
        })
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn trim_host(host: String) -> String {
    host.trim_end_matches('/').to_owned()
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().to_owned())
        .filter(|item| !item.is_empty())
        .collect()
}

fn parse_times(value: &str) -> Result<Vec<NaiveTime>, Error> {
    let mut times = vec![];

    for item in parse_list(value) {
        let time = NaiveTime::parse_from_str(&item, "%H:%M").map_err(|e| {
            Error::ConfigurationError(format!("invalid time {}: {}", item, e))
        })?;
        times.push(time);
    }

    if times.is_empty() {
        return Err(Error::ConfigurationError(String::from(
            "at least one time of day is required",
        )));
    }

    times.sort();

    Ok(times)
}

fn get_staking_tiers() -> Result<Vec<Tier>, Error> {
    parse_staking_tiers(env::var("STAKING_TIERS")?)
}

fn parse_staking_tiers(value: String) -> Result<Vec<Tier>, Error> {
    let mut data: Vec<Tier> = Vec::new();

    for item in parse_tuple_string(value) {
        let items: Vec<&str> = item.split(',').map(|s| s.trim()).collect();
        if items.len() != 2 {
            return Err(Error::ConfigurationError(format!(
                "invalid staking tier ({})",
                item
            )));
        }

        let kind = Pledge_Tier::from_str(items[0])?;
        let asset_id = items[1].parse()?;

        if data.iter().any(|tier| tier.kind == kind) {
            return Err(Error::ConfigurationError(format!(
                "staking tier {} configured twice",
                kind
            )));
        }

        data.push(Tier { kind, asset_id });
    }

    for kind in Pledge_Tier::ALL {
        if !data.iter().any(|tier| tier.kind == kind) {
            return Err(Error::ConfigurationError(format!(
                "staking tier {} is missing",
                kind
            )));
        }
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIERS: &str = "(chip,388592191),(lp_v1,552665159),(lp_v2,1002609713),(c_algo,2562903034),(t_algo,2545480441),(m_algo,2536627349),(x_algo,2520645026)";

    #[test]
    fn test_parse_staking_tiers_keeps_order() {
        let tiers = parse_staking_tiers(String::from(TIERS)).unwrap();

        assert_eq!(tiers.len(), 7);
        assert_eq!(tiers[0].kind, Pledge_Tier::Chip);
        assert_eq!(tiers[0].asset_id, 388_592_191);
        assert_eq!(tiers[6].kind, Pledge_Tier::XAlgo);
        assert_eq!(tiers[6].asset_id, 2_520_645_026);
    }

    #[test]
    fn test_parse_staking_tiers_rejects_missing_tier() {
        let result = parse_staking_tiers(String::from(
            "(chip,388592191),(lp_v1,552665159)",
        ));
        assert!(matches!(result, Err(Error::ConfigurationError(_))));
    }

    #[test]
    fn test_parse_staking_tiers_rejects_duplicate_tier() {
        let tiers = format!("{},(chip,1)", TIERS);
        let result = parse_staking_tiers(tiers);
        assert!(matches!(result, Err(Error::ConfigurationError(_))));
    }

    #[test]
    fn test_parse_times_sorted() {
        let times = parse_times("13:45, 01:45,09:45").unwrap();
        assert_eq!(
            times,
            vec![
                NaiveTime::from_hms_opt(1, 45, 0).unwrap(),
                NaiveTime::from_hms_opt(9, 45, 0).unwrap(),
                NaiveTime::from_hms_opt(13, 45, 0).unwrap(),
            ]
        );
        assert!(parse_times("25:00").is_err());
        assert!(parse_times("").is_err());
    }

    #[test]
    fn test_parse_list_skips_blanks() {
        assert_eq!(parse_list("1, 2,,3 "), vec!["1", "2", "3"]);
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_seconds_rejects_out_of_range() {
        assert_eq!(seconds("AGE", 120).unwrap(), Duration::seconds(120));
        assert!(matches!(
            seconds("AGE", u64::MAX),
            Err(Error::ConfigurationError(_))
        ));
        assert!(matches!(
            seconds("AGE", i64::MAX as u64),
            Err(Error::ConfigurationError(_))
        ));
    }
}
