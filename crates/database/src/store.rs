use crate::error::DbError;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{NewRun, NewWeighIn, Run, WeighIn};

/// The data-access contract the rest of the application is written against.
///
/// [`crate::DbRepository`] is the SQLite-backed implementation; tests swap in
/// their own doubles. Failures caused by an unreachable store come back as
/// [`DbError::ConnectionError`] so callers can report the store as unhealthy
/// instead of crashing.
#[async_trait]
pub trait HealthStore: Send + Sync {
    /// A trivial round trip, used as the liveness check.
    async fn ping(&self) -> Result<(), DbError>;

    /// Persists a weigh-in and returns it with its assigned id.
    async fn insert_weigh_in(&self, weigh_in: &NewWeighIn) -> Result<WeighIn, DbError>;

    /// Persists a run and returns it with its assigned id.
    async fn insert_run(&self, run: &NewRun) -> Result<Run, DbError>;

    async fn count_weigh_ins(&self) -> Result<i64, DbError>;

    async fn count_runs(&self) -> Result<i64, DbError>;

    /// `None` when no weigh-in has been logged yet.
    async fn last_weigh_in_date(&self) -> Result<Option<NaiveDate>, DbError>;

    /// `None` when no run has been logged yet.
    async fn last_run_date(&self) -> Result<Option<NaiveDate>, DbError>;

    /// Up to `limit` weigh-ins, newest first.
    async fn recent_weigh_ins(&self, limit: u32) -> Result<Vec<WeighIn>, DbError>;

    /// Up to `limit` runs, newest first.
    async fn recent_runs(&self, limit: u32) -> Result<Vec<Run>, DbError>;
}
