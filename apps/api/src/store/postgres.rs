use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::debug;

use crate::errors::AppError;
use crate::models::investor::{Investor, InvestorProfile, InvestorRow, StoredRecommendation};
use crate::models::startup::{Startup, StartupRow};
use crate::store::{ProfileStore, StartupFilter};

const INVESTOR_COLUMNS: &str = r#"
    investor_id, email, name, preferred_industries, preferred_funding_stages,
    min_investment, max_investment, recommendations, last_matched,
    daily_recommendations, preferred_time, last_recommendation_sent,
    created_at, updated_at
"#;

/// Postgres-backed profile store.
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn list_startups(&self, filter: &StartupFilter) -> Result<Vec<Startup>, AppError> {
        // LIMIT NULL means no limit in Postgres.
        let rows = sqlx::query_as::<_, StartupRow>(
            r#"
            SELECT * FROM startups
            WHERE ($1::TEXT IS NULL OR industry = $1)
            ORDER BY startup_id
            LIMIT $2
            "#,
        )
        .bind(filter.industry.as_deref())
        .bind(filter.limit.map(i64::from))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "loaded startups");
        Ok(rows.into_iter().map(Startup::from).collect())
    }

    async fn get_startup(&self, startup_id: &str) -> Result<Option<Startup>, AppError> {
        let row = sqlx::query_as::<_, StartupRow>("SELECT * FROM startups WHERE startup_id = $1")
            .bind(startup_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Startup::from))
    }

    async fn list_investors(&self) -> Result<Vec<Investor>, AppError> {
        let rows = sqlx::query_as::<_, InvestorRow>(&format!(
            "SELECT {INVESTOR_COLUMNS} FROM investors ORDER BY investor_id"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "loaded investors");
        Ok(rows.into_iter().map(Investor::from).collect())
    }

    async fn get_investor(&self, investor_id: &str) -> Result<Option<Investor>, AppError> {
        let row = sqlx::query_as::<_, InvestorRow>(&format!(
            "SELECT {INVESTOR_COLUMNS} FROM investors WHERE investor_id = $1"
        ))
        .bind(investor_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Investor::from))
    }

    async fn upsert_investor(&self, profile: &InvestorProfile) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO investors
                (investor_id, email, name, preferred_industries, preferred_funding_stages,
                 min_investment, max_investment, daily_recommendations, preferred_time,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (investor_id) DO UPDATE SET
                email = EXCLUDED.email,
                name = EXCLUDED.name,
                preferred_industries = EXCLUDED.preferred_industries,
                preferred_funding_stages = EXCLUDED.preferred_funding_stages,
                min_investment = EXCLUDED.min_investment,
                max_investment = EXCLUDED.max_investment,
                daily_recommendations = EXCLUDED.daily_recommendations,
                preferred_time = EXCLUDED.preferred_time,
                created_at = COALESCE(investors.created_at, EXCLUDED.created_at),
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&profile.investor_id)
        .bind(&profile.email)
        .bind(&profile.name)
        .bind(&profile.preferred_industries)
        .bind(&profile.preferred_funding_stages)
        .bind(profile.min_investment)
        .bind(profile.max_investment)
        .bind(profile.daily_recommendations)
        .bind(profile.preferred_time.map(|t| t.format("%H:%M").to_string()))
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn write_recommendations(
        &self,
        investor_id: &str,
        recommendations: &[StoredRecommendation],
        matched_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE investors SET recommendations = $2, last_matched = $3 WHERE investor_id = $1",
        )
        .bind(investor_id)
        .bind(Json(recommendations))
        .bind(matched_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Investor {investor_id} not found")));
        }
        Ok(())
    }

    async fn list_digest_subscribers(&self) -> Result<Vec<Investor>, AppError> {
        let rows = sqlx::query_as::<_, InvestorRow>(&format!(
            "SELECT {INVESTOR_COLUMNS} FROM investors WHERE daily_recommendations ORDER BY investor_id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Investor::from).collect())
    }

    async fn mark_recommendation_sent(
        &self,
        investor_id: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let result =
            sqlx::query("UPDATE investors SET last_recommendation_sent = $2 WHERE investor_id = $1")
                .bind(investor_id)
                .bind(sent_at)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Investor {investor_id} not found")));
        }
        Ok(())
    }
}
