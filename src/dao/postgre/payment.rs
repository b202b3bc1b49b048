use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    dao::{PaymentRepository, DUPLICATE_ERROR},
    error::Error,
    model::{Payment, Payment_Request, Payment_Status, Table},
};

#[async_trait]
impl PaymentRepository for Table<Payment> {
    async fn get(&self, id: i32) -> Result<Option<Payment>, Error> {
        const SQL: &str = r#"
        SELECT *
        FROM "payments"
        WHERE "id" = $1
        "#;

        let data = sqlx::query_as(SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(data)
    }

    async fn get_pending(
        &self,
        platform_id: i32,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Payment>, Error> {
        const SQL: &str = r#"
        SELECT *
        FROM "payments"
        WHERE
            "platform_id" = $1 AND
            "status" = $2 AND
            "created_at" >= $3 AND
            "created_at" <= $4
        ORDER BY "created_at" ASC, "id" ASC
        "#;

        let data = sqlx::query_as(SQL)
            .bind(platform_id)
            .bind(Payment_Status::Created)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        Ok(data)
    }

    async fn get_by_transaction_ids(
        &self,
        transaction_ids: &[String],
    ) -> Result<Vec<Payment>, Error> {
        const SQL: &str = r#"
        SELECT *
        FROM "payments"
        WHERE "transaction_id" = ANY($1)
        "#;

        let data = sqlx::query_as(SQL)
            .bind(transaction_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(data)
    }

    async fn insert(&self, data: &Payment_Request) -> Result<Payment, Error> {
        const SQL: &str = r#"
        INSERT INTO "payments" (
            "platform_id",
            "status",
            "created_at",
            "sender",
            "asset_id",
            "amount",
            "external_id"
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#;

        let payment = sqlx::query_as(SQL)
            .bind(data.platform_id)
            .bind(Payment_Status::Created)
            .bind(Utc::now())
            .bind(&data.sender)
            .bind(i64::try_from(data.asset_id)?)
            .bind(i64::try_from(data.amount)?)
            .bind(data.external_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(payment)
    }

    async fn complete_pending(
        &self,
        id: i32,
        transaction_id: &str,
    ) -> Result<Option<Payment>, Error> {
        const SQL: &str = r#"
        UPDATE "payments"
        SET
            "status" = $1,
            "completed_at" = $2,
            "transaction_id" = $3
        WHERE
            "id" = $4 AND
            "status" = $5
        RETURNING *
        "#;

        let result = sqlx::query_as(SQL)
            .bind(Payment_Status::Completed)
            .bind(Utc::now())
            .bind(transaction_id)
            .bind(id)
            .bind(Payment_Status::Created)
            .fetch_optional(&self.pool)
            .await;

        match result {
            Ok(data) => Ok(data),
            Err(sqlx::Error::Database(error))
                if error.code().as_deref() == Some(DUPLICATE_ERROR) =>
            {
                Err(Error::Conflict(format!(
                    "transaction {} already settled a payment",
                    transaction_id
                )))
            },
            Err(error) => Err(Error::SQL(error)),
        }
    }

    async fn cancel_pending(&self, id: i32) -> Result<Option<Payment>, Error> {
        const SQL: &str = r#"
        UPDATE "payments"
        SET
            "status" = $1,
            "cancelled_at" = $2
        WHERE
            "id" = $3 AND
            "status" = $4
        RETURNING *
        "#;

        let data = sqlx::query_as(SQL)
            .bind(Payment_Status::Cancelled)
            .bind(Utc::now())
            .bind(id)
            .bind(Payment_Status::Created)
            .fetch_optional(&self.pool)
            .await?;

        Ok(data)
    }
}
