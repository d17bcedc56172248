use async_trait::async_trait;
use core_types::AboutInfo;
use database::{DbError, HealthStore};
use std::sync::Arc;

/// Reported as `apiVersion` by `GET /about`.
pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The service-level contract behind `/health` and `/about`.
///
/// Neither operation can fail: store errors are absorbed here and turned into
/// a `false` liveness result or zero-valued summary fields.
#[async_trait]
pub trait HealthService: Send + Sync {
    /// One lightweight round trip to the store.
    async fn is_healthy(&self) -> bool;

    /// Counts and most recent dates, computed fresh on every call.
    async fn get_about_info(&self) -> AboutInfo;
}

/// The `HealthService` backed by a [`HealthStore`].
pub struct StoreHealthService {
    store: Arc<dyn HealthStore>,
    api_version: String,
}

impl StoreHealthService {
    pub fn new(store: Arc<dyn HealthStore>) -> Self {
        Self::with_version(store, API_VERSION)
    }

    pub fn with_version(store: Arc<dyn HealthStore>, api_version: impl Into<String>) -> Self {
        Self {
            store,
            api_version: api_version.into(),
        }
    }
}

fn degraded<T>(field: &'static str, err: &DbError, fallback: T) -> T {
    tracing::warn!(field, error = %err, "About info field degraded to its zero value");
    fallback
}

#[async_trait]
impl HealthService for StoreHealthService {
    async fn is_healthy(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Database health check failed");
                false
            }
        }
    }

    // Four sequential round trips. Each field degrades on its own, so a
    // partially failing store still yields a 200 with whatever could be read.
    async fn get_about_info(&self) -> AboutInfo {
        let weigh_ins_count = self
            .store
            .count_weigh_ins()
            .await
            .unwrap_or_else(|e| degraded("weighInsCount", &e, 0));
        let runs_count = self
            .store
            .count_runs()
            .await
            .unwrap_or_else(|e| degraded("runsCount", &e, 0));
        let last_weigh_in_date = self
            .store
            .last_weigh_in_date()
            .await
            .unwrap_or_else(|e| degraded("lastWeighInDate", &e, None));
        let last_run_date = self
            .store
            .last_run_date()
            .await
            .unwrap_or_else(|e| degraded("lastRunDate", &e, None));

        AboutInfo {
            api_version: self.api_version.clone(),
            weigh_ins_count,
            runs_count,
            last_weigh_in_date,
            last_run_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::{NewRun, NewWeighIn, Run, WeighIn};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A store double with canned answers. `reachable == false` makes every
    /// call fail the way a missing database file does; `broken_runs` only
    /// breaks the run queries.
    #[derive(Default)]
    struct StubStore {
        reachable: bool,
        broken_runs: bool,
        weigh_ins: i64,
        runs: i64,
        last_weigh_in: Option<NaiveDate>,
        last_run: Option<NaiveDate>,
        calls: AtomicUsize,
    }

    impl StubStore {
        fn reachable() -> Self {
            Self {
                reachable: true,
                ..Self::default()
            }
        }

        fn check(&self, part_broken: bool) -> Result<(), DbError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.reachable || part_broken {
                return Err(DbError::ConnectionError(sqlx::Error::PoolTimedOut));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl HealthStore for StubStore {
        async fn ping(&self) -> Result<(), DbError> {
            self.check(false)
        }
        async fn insert_weigh_in(&self, weigh_in: &NewWeighIn) -> Result<WeighIn, DbError> {
            self.check(false)?;
            Ok(weigh_in.clone().with_id(1))
        }
        async fn insert_run(&self, run: &NewRun) -> Result<Run, DbError> {
            self.check(self.broken_runs)?;
            Ok(run.clone().with_id(1))
        }
        async fn count_weigh_ins(&self) -> Result<i64, DbError> {
            self.check(false).map(|_| self.weigh_ins)
        }
        async fn count_runs(&self) -> Result<i64, DbError> {
            self.check(self.broken_runs).map(|_| self.runs)
        }
        async fn last_weigh_in_date(&self) -> Result<Option<NaiveDate>, DbError> {
            self.check(false).map(|_| self.last_weigh_in)
        }
        async fn last_run_date(&self) -> Result<Option<NaiveDate>, DbError> {
            self.check(self.broken_runs).map(|_| self.last_run)
        }
        async fn recent_weigh_ins(&self, _limit: u32) -> Result<Vec<WeighIn>, DbError> {
            self.check(false).map(|_| Vec::new())
        }
        async fn recent_runs(&self, _limit: u32) -> Result<Vec<Run>, DbError> {
            self.check(self.broken_runs).map(|_| Vec::new())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn healthy_when_the_store_answers() {
        let service = StoreHealthService::new(Arc::new(StubStore::reachable()));
        assert!(service.is_healthy().await);
    }

    #[tokio::test]
    async fn unhealthy_is_a_value_not_an_error() {
        let service = StoreHealthService::new(Arc::new(StubStore::default()));
        assert!(!service.is_healthy().await);
    }

    #[tokio::test]
    async fn about_info_reports_store_contents() {
        let store = Arc::new(StubStore {
            weigh_ins: 5,
            runs: 10,
            last_weigh_in: Some(date(2025, 6, 5)),
            last_run: Some(date(2025, 6, 6)),
            ..StubStore::reachable()
        });
        let service = StoreHealthService::with_version(store.clone(), "9.9.9");

        let info = service.get_about_info().await;

        assert_eq!(
            info,
            AboutInfo {
                api_version: "9.9.9".to_string(),
                weigh_ins_count: 5,
                runs_count: 10,
                last_weigh_in_date: Some(date(2025, 6, 5)),
                last_run_date: Some(date(2025, 6, 6)),
            }
        );
        assert_eq!(store.calls.load(Ordering::SeqCst), 4, "one round trip per aggregate");
    }

    #[tokio::test]
    async fn failing_fields_degrade_independently() {
        let store = Arc::new(StubStore {
            broken_runs: true,
            weigh_ins: 3,
            runs: 7,
            last_weigh_in: Some(date(2025, 6, 1)),
            last_run: Some(date(2025, 6, 2)),
            ..StubStore::reachable()
        });
        let service = StoreHealthService::new(store);

        let info = service.get_about_info().await;

        assert_eq!(info.weigh_ins_count, 3);
        assert_eq!(info.last_weigh_in_date, Some(date(2025, 6, 1)));
        assert_eq!(info.runs_count, 0);
        assert_eq!(info.last_run_date, None);
    }

    #[tokio::test]
    async fn an_unreachable_store_yields_zero_values() {
        let service = StoreHealthService::new(Arc::new(StubStore::default()));

        let info = service.get_about_info().await;

        assert_eq!(info, AboutInfo::empty(API_VERSION));
    }
}
