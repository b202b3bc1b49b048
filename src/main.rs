use tracing::{error, info, Level};

use payapi::{
    configuration::{
        get_configuration, set_configuration, AppState, Config, State,
    },
    error::Error,
    handler::scheduler,
    provider::{CasinoDatabase, DatabasePool, LedgerClient, HTTP},
    server,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let result = app_main().await;

    if let Err(err) = &result {
        error!("{}", err);
    }

    result
}

async fn app_main() -> Result<(), Error> {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_level(true)
        .with_max_level(Level::INFO)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let (config, database) = match init().await {
        Ok((config, database)) => (config, database),
        Err(e) => return Err(Error::ConfigurationError(e.to_string())),
    };

    let casino = match &config.casino_database_url {
        Some(url) => Some(CasinoDatabase::new(url).await?),
        None => {
            info!("No casino database configured, leaderboard and profit snapshots are disabled");
            None
        },
    };

    let ledger = LedgerClient::new(&config)?;
    let http = HTTP::new(config.clone())?;

    let state = State::new(config, database, casino, ledger, http).await?;
    let app_state = AppState::new(state);

    let (_, _) = tokio::try_join!(
        server::server_task(&app_state),
        scheduler::start_tasks(app_state.clone()),
    )?;

    Ok(())
}

async fn init() -> Result<(Config, DatabasePool), Error> {
    set_configuration()?;
    let config = get_configuration()?;
    let database = DatabasePool::new(&config).await?;
    Ok((config, database))
}
