//! Startup gate that blocks until the database accepts connections.
//!
//! The gate probes once, and on any failure logs, sleeps for
//! [`RETRY_INTERVAL`] and probes again. There is no retry limit and no
//! backoff: if the database never comes up the process is expected to be
//! killed by whatever supervises it.

use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::{info, warn};

pub const RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// A single connectivity check against the database.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn probe(&self) -> Result<(), DbErr>;
}

/// Source of delays for the gate, swapped out in tests.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Opens a fresh single-connection pool for every probe, pings it and closes it.
/// Connecting is part of the probe because a pool cannot be built while the
/// server is still refusing connections.
pub struct DatabaseUrlProbe {
    url: String,
}

impl DatabaseUrlProbe {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl ConnectivityProbe for DatabaseUrlProbe {
    async fn probe(&self) -> Result<(), DbErr> {
        let mut opt = ConnectOptions::new(self.url.clone());
        opt.max_connections(1)
            .connect_timeout(Duration::from_secs(3))
            .sqlx_logging(false);

        let db = Database::connect(opt).await?;
        let result = db.ping().await;
        if let Err(e) = db.close().await {
            warn!(error = %e, "Failed to close probe connection.");
        }
        result
    }
}

#[async_trait]
impl ConnectivityProbe for DatabaseConnection {
    async fn probe(&self) -> Result<(), DbErr> {
        self.ping().await
    }
}

/// Returns once `probe` succeeds. Failures are logged and never propagated.
pub async fn wait_for_database<P, S>(probe: &P, sleeper: &S)
where
    P: ConnectivityProbe + ?Sized,
    S: Sleeper + ?Sized,
{
    info!("Waiting for database...");
    let mut attempt: u64 = 0;
    loop {
        attempt += 1;
        match probe.probe().await {
            Ok(()) => break,
            Err(e) => {
                warn!(attempt, error = %e, "Database unavailable, waiting 1 second...");
                sleeper.sleep(RETRY_INTERVAL).await;
            }
        }
    }
    info!(attempts = attempt, "Database available");
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::RuntimeErr;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FlakyProbe {
        failures_left: AtomicUsize,
        calls: AtomicUsize,
    }

    impl FlakyProbe {
        fn failing(times: usize) -> Self {
            Self {
                failures_left: AtomicUsize::new(times),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ConnectivityProbe for FlakyProbe {
        async fn probe(&self) -> Result<(), DbErr> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let remaining = self.failures_left.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures_left.store(remaining - 1, Ordering::SeqCst);
                return Err(DbErr::Conn(RuntimeErr::Internal(
                    "connection refused".to_string(),
                )));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingSleeper {
        slept: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.slept.lock().unwrap().push(duration);
        }
    }

    /// Records sleeps until `cutoff`, then parks forever so an unbounded
    /// loop can be observed without real time passing.
    struct CutoffSleeper {
        calls: AtomicUsize,
        cutoff: usize,
    }

    #[async_trait]
    impl Sleeper for CutoffSleeper {
        async fn sleep(&self, _duration: Duration) {
            let calls = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if calls >= self.cutoff {
                std::future::pending::<()>().await;
            }
        }
    }

    #[tokio::test]
    async fn returns_immediately_when_database_is_up() {
        let probe = FlakyProbe::failing(0);
        let sleeper = RecordingSleeper::default();

        wait_for_database(&probe, &sleeper).await;

        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
        assert!(sleeper.slept.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn sleeps_one_second_per_failed_probe() {
        let probe = FlakyProbe::failing(2);
        let sleeper = RecordingSleeper::default();

        wait_for_database(&probe, &sleeper).await;

        assert_eq!(probe.calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            *sleeper.slept.lock().unwrap(),
            vec![Duration::from_secs(1), Duration::from_secs(1)]
        );
    }

    #[tokio::test]
    async fn never_returns_while_probe_keeps_failing() {
        let probe = FlakyProbe::failing(usize::MAX);
        let sleeper = CutoffSleeper {
            calls: AtomicUsize::new(0),
            cutoff: 5,
        };

        let outcome = tokio::time::timeout(
            Duration::from_millis(100),
            wait_for_database(&probe, &sleeper),
        )
        .await;

        assert!(outcome.is_err(), "gate returned while database was down");
        assert_eq!(sleeper.calls.load(Ordering::SeqCst), 5);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 5);
    }
}
