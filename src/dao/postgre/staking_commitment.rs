use async_trait::async_trait;
use chrono::Utc;

use crate::{
    dao::{StakingCommitmentRepository, DUPLICATE_ERROR},
    error::Error,
    model::{Pledges, Staking_Commitment, Table},
};

#[async_trait]
impl StakingCommitmentRepository for Table<Staking_Commitment> {
    async fn get(&self, id: i32) -> Result<Option<Staking_Commitment>, Error> {
        const SQL: &str = r#"
        SELECT *
        FROM "staking_commitments"
        WHERE "id" = $1
        "#;

        let data = sqlx::query_as(SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(data)
    }

    async fn get_by_period(
        &self,
        staking_period_id: i32,
    ) -> Result<Vec<Staking_Commitment>, Error> {
        const SQL: &str = r#"
        SELECT *
        FROM "staking_commitments"
        WHERE "staking_period_id" = $1
        ORDER BY "id" ASC
        "#;

        let data = sqlx::query_as(SQL)
            .bind(staking_period_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(data)
    }

    async fn insert(
        &self,
        staking_period_id: i32,
        algorand_address: &str,
        pledges: &Pledges,
    ) -> Result<Staking_Commitment, Error> {
        const SQL: &str = r#"
        INSERT INTO "staking_commitments" (
            "staking_period_id",
            "algorand_address",
            "created_at",
            "chip",
            "liquidity",
            "liquidity_v2",
            "c_algo",
            "t_algo",
            "m_algo",
            "x_algo",
            "eligible"
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, TRUE)
        RETURNING *
        "#;

        let result = sqlx::query_as(SQL)
            .bind(staking_period_id)
            .bind(algorand_address)
            .bind(Utc::now())
            .bind(i64::try_from(pledges.chip)?)
            .bind(i64::try_from(pledges.liquidity)?)
            .bind(i64::try_from(pledges.liquidity_v2)?)
            .bind(i64::try_from(pledges.c_algo)?)
            .bind(i64::try_from(pledges.t_algo)?)
            .bind(i64::try_from(pledges.m_algo)?)
            .bind(i64::try_from(pledges.x_algo)?)
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(commitment) => Ok(commitment),
            Err(sqlx::Error::Database(error))
                if error.code().as_deref() == Some(DUPLICATE_ERROR) =>
            {
                Err(Error::Conflict(String::from("already registered")))
            },
            Err(error) => Err(Error::SQL(error)),
        }
    }

    async fn update_pledges(
        &self,
        id: i32,
        pledges: &Pledges,
    ) -> Result<Option<Staking_Commitment>, Error> {
        const SQL: &str = r#"
        UPDATE "staking_commitments"
        SET
            "updated_at" = $1,
            "chip" = $2,
            "liquidity" = $3,
            "liquidity_v2" = $4,
            "c_algo" = $5,
            "t_algo" = $6,
            "m_algo" = $7,
            "x_algo" = $8
        WHERE "id" = $9
        RETURNING *
        "#;

        let data = sqlx::query_as(SQL)
            .bind(Utc::now())
            .bind(i64::try_from(pledges.chip)?)
            .bind(i64::try_from(pledges.liquidity)?)
            .bind(i64::try_from(pledges.liquidity_v2)?)
            .bind(i64::try_from(pledges.c_algo)?)
            .bind(i64::try_from(pledges.t_algo)?)
            .bind(i64::try_from(pledges.m_algo)?)
            .bind(i64::try_from(pledges.x_algo)?)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(data)
    }

    async fn update_eligibility(
        &self,
        id: i32,
        eligible: bool,
    ) -> Result<Option<Staking_Commitment>, Error> {
        const SQL: &str = r#"
        UPDATE "staking_commitments"
        SET
            "eligible" = $1,
            "updated_at" = $2
        WHERE "id" = $3
        RETURNING *
        "#;

        let data = sqlx::query_as(SQL)
            .bind(eligible)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(data)
    }
}
