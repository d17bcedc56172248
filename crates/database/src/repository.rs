use crate::DbError;
use crate::store::HealthStore;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{NewRun, NewWeighIn, Run, WeighIn};
use sqlx::SqlitePool;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: SqlitePool,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Waits for checked-out connections to be returned and closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl HealthStore for DbRepository {
    async fn ping(&self) -> Result<(), DbError> {
        // The connection goes back to the pool when `conn` drops, on every path.
        let mut conn = self.pool.acquire().await?;
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&mut *conn)
            .await?;
        Ok(())
    }

    async fn insert_weigh_in(&self, weigh_in: &NewWeighIn) -> Result<WeighIn, DbError> {
        let created = sqlx::query_as::<_, WeighIn>(
            r#"
            INSERT INTO weighins (date, weight, bmi, fat, muscle, restingMetab, visceralFat)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, date, weight, bmi, fat, muscle, restingMetab, visceralFat
            "#,
        )
        .bind(weigh_in.date)
        .bind(weigh_in.weight)
        .bind(weigh_in.bmi)
        .bind(weigh_in.fat)
        .bind(weigh_in.muscle)
        .bind(weigh_in.resting_metab)
        .bind(weigh_in.visceral_fat)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(id = created.id, date = %created.date, "Weigh-in stored");
        Ok(created)
    }

    async fn insert_run(&self, run: &NewRun) -> Result<Run, DbError> {
        let created = sqlx::query_as::<_, Run>(
            r#"
            INSERT INTO runs (date, distance, distanceUnit, time)
            VALUES (?, ?, ?, ?)
            RETURNING id, date, distance, distanceUnit, time
            "#,
        )
        .bind(run.date)
        .bind(run.distance)
        .bind(&run.distance_unit)
        .bind(run.time_in_seconds)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(id = created.id, date = %created.date, "Run stored");
        Ok(created)
    }

    async fn count_weigh_ins(&self) -> Result<i64, DbError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM weighins")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_runs(&self) -> Result<i64, DbError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM runs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // Dates are stored as ISO-8601 text, so text order is calendar order.
    async fn last_weigh_in_date(&self) -> Result<Option<NaiveDate>, DbError> {
        let date = sqlx::query_scalar::<_, NaiveDate>(
            "SELECT date FROM weighins ORDER BY date DESC, id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(date)
    }

    async fn last_run_date(&self) -> Result<Option<NaiveDate>, DbError> {
        let date = sqlx::query_scalar::<_, NaiveDate>(
            "SELECT date FROM runs ORDER BY date DESC, id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(date)
    }

    async fn recent_weigh_ins(&self, limit: u32) -> Result<Vec<WeighIn>, DbError> {
        let rows = sqlx::query_as::<_, WeighIn>(
            r#"
            SELECT id, date, weight, bmi, fat, muscle, restingMetab, visceralFat
            FROM weighins
            ORDER BY date DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn recent_runs(&self, limit: u32) -> Result<Vec<Run>, DbError> {
        let rows = sqlx::query_as::<_, Run>(
            r#"
            SELECT id, date, distance, distanceUnit, time
            FROM runs
            ORDER BY date DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
