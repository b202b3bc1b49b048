use async_trait::async_trait;

use crate::{
    dao::PlatformRepository,
    error::Error,
    model::{Platform, Platform_Request, Table},
};

#[async_trait]
impl PlatformRepository for Table<Platform> {
    async fn get(&self, id: i32) -> Result<Option<Platform>, Error> {
        const SQL: &str = r#"
        SELECT *
        FROM "platforms"
        WHERE "id" = $1
        "#;

        let data = sqlx::query_as(SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(data)
    }

    async fn insert(&self, data: &Platform_Request) -> Result<Platform, Error> {
        const SQL: &str = r#"
        INSERT INTO "platforms" (
            "name",
            "active",
            "address",
            "webhook_url"
        )
        VALUES ($1, TRUE, $2, $3)
        RETURNING *
        "#;

        let platform = sqlx::query_as(SQL)
            .bind(&data.name)
            .bind(&data.address)
            .bind(&data.webhook_url)
            .fetch_one(&self.pool)
            .await?;

        Ok(platform)
    }
}
