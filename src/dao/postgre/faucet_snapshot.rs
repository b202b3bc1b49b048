use chrono::Utc;
use sqlx::{types::Json, Error};

use crate::model::{Faucet_Snapshot, Snapshot_Account, Table};

impl Table<Faucet_Snapshot> {
    pub async fn insert(
        &self,
        asset_id: u64,
        accounts: Vec<Snapshot_Account>,
    ) -> Result<Faucet_Snapshot, crate::error::Error> {
        const SQL: &str = r#"
        INSERT INTO "faucet_snapshots" (
            "asset_id",
            "created_at",
            "accounts"
        )
        VALUES ($1, $2, $3)
        RETURNING *
        "#;

        let data = sqlx::query_as(SQL)
            .bind(i64::try_from(asset_id)?)
            .bind(Utc::now())
            .bind(Json(accounts))
            .fetch_one(&self.pool)
            .await?;

        Ok(data)
    }

    pub async fn get_last(&self) -> Result<Option<Faucet_Snapshot>, Error> {
        const SQL: &str = r#"
        SELECT *
        FROM "faucet_snapshots"
        ORDER BY "created_at" DESC
        LIMIT 1
        "#;

        sqlx::query_as(SQL).fetch_optional(&self.pool).await
    }
}
