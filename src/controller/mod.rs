//! HTTP controllers, one module per resource.

use serde::Deserialize;

use crate::{
    configuration::{AppState, State},
    error::Error,
};

pub mod casino;
pub mod payments;
pub mod platforms;
pub mod staking_commitments;
pub mod staking_periods;
pub mod staking_results;
pub mod version;

#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    pub auth: Option<String>,
}

/// Admin routes carry the shared secret in the `auth` query parameter.
pub fn check_auth(
    state: &AppState<State>,
    query: &AuthQuery,
) -> Result<(), Error> {
    let auth = query
        .auth
        .as_deref()
        .ok_or_else(|| Error::Unauthorized(String::from("Auth is required")))?;

    if auth != state.config.auth {
        return Err(Error::Unauthorized(String::from("Invalid auth")));
    }

    Ok(())
}
