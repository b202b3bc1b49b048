use sqlx::{postgres::PgPoolOptions, PgPool};

pub type PoolType = PgPool;
pub type PoolOption = PgPoolOptions;

/// SQLSTATE raised on unique constraint violations.
pub const DUPLICATE_ERROR: &str = "23505";
