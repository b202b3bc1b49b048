use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, Utc};
use sqlx::{mysql::MySqlPoolOptions, MySqlPool};
use tokio::time::{timeout, Duration};

use crate::{error::Error, model::Leaderboard_Entry};

const LEADERBOARD_TIMEOUT: Duration = Duration::from_secs(30);
const GROSS_PROFIT_TIMEOUT: Duration = Duration::from_secs(15);

/// Read-only access to the casino's MySQL database.
#[derive(Debug)]
pub struct CasinoDatabase {
    pub pool: MySqlPool,
}

impl CasinoDatabase {
    pub async fn new(url: &str) -> Result<CasinoDatabase, Error> {
        let pool = MySqlPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await?;

        Ok(CasinoDatabase { pool })
    }

    /// Ten users with the highest settled bet volume in `[start, end]`.
    pub async fn top_wagered(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Leaderboard_Entry>, Error> {
        const SQL: &str = r#"
        SELECT
            CAST(`users`.`id` AS UNSIGNED) AS `user_id`,
            `users`.`name` AS `name`,
            COUNT(DISTINCT `games`.`id`) AS `bet_count`,
            CAST(IFNULL(SUM(`games`.`bet`), 0) AS DECIMAL(38, 8)) AS `bet_total`
        FROM `users`
        LEFT JOIN `accounts`
            ON `accounts`.`user_id` = `users`.`id`
            AND `accounts`.`updated_at` >= ?
        LEFT JOIN `games`
            ON `accounts`.`id` = `games`.`account_id`
            AND `games`.`status` = 1
            AND `games`.`created_at` BETWEEN ? AND ?
        WHERE
            `users`.`status` = 0 AND
            `users`.`last_login_at` >= ? - INTERVAL 6 MONTH
        GROUP BY `users`.`id`, `users`.`name`
        ORDER BY `bet_total` DESC
        LIMIT 10
        "#;

        let start = start.naive_utc();
        let end = end.naive_utc();

        let query = sqlx::query_as::<_, (u64, Option<String>, i64, BigDecimal)>(
            SQL,
        )
        .bind(start)
        .bind(start)
        .bind(end)
        .bind(start)
        .fetch_all(&self.pool);

        let rows = timeout(LEADERBOARD_TIMEOUT, query).await??;

        let entries = rows
            .into_iter()
            .enumerate()
            .map(|(index, (user_id, name, bet_count, bet_total))| {
                Leaderboard_Entry {
                    rank: index as u32 + 1,
                    user_id,
                    name: name.unwrap_or_default(),
                    bet_count,
                    bet_total: bet_total.to_f64().unwrap_or_default(),
                }
            })
            .collect();

        Ok(entries)
    }

    /// Gross gaming revenue (bets minus wins) of settled games in
    /// `[start, end]`.
    pub async fn gross_profit(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<f64, Error> {
        const SQL: &str = r#"
        SELECT CAST(IFNULL(SUM(`bet`) - SUM(`win`), 0) AS DECIMAL(38, 8))
        FROM `games`
        WHERE
            `games`.`status` = 1 AND
            `games`.`created_at` BETWEEN ? AND ? AND
            EXISTS (
                SELECT 1 FROM `accounts`
                WHERE `games`.`account_id` = `accounts`.`id`
                AND EXISTS (
                    SELECT 1 FROM `users`
                    WHERE `accounts`.`user_id` = `users`.`id`
                )
            )
        "#;

        let query = sqlx::query_as::<_, (BigDecimal,)>(SQL)
            .bind(start.naive_utc())
            .bind(end.naive_utc())
            .fetch_one(&self.pool);

        let (profit,) = timeout(GROSS_PROFIT_TIMEOUT, query).await??;

        profit.to_f64().ok_or_else(|| {
            Error::TaskError(format!("gross profit {} out of range", profit))
        })
    }
}
