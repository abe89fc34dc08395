//! Trip - wires the driver, the arbiter and both producers together

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use eyre::{Context, Result};
use futures::future::OptionFuture;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::arbiter::{ArbiterResult, Strategy, create_arbiter};
use crate::cancel::CancellationToken;
use crate::config::Config;
use crate::driver::{Driver, DriverStats};
use crate::producer::{Passenger, ProducerStats, Road};
use crate::status::StatusSink;

/// Summary of a finished trip
#[derive(Debug, Clone, Serialize)]
pub struct TripReport {
    pub strategy: Strategy,
    pub road: ProducerStats,
    pub passenger: ProducerStats,
    pub driver: DriverStats,
}

impl fmt::Display for TripReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Trip report ({})", self.strategy)?;
        let rows = [
            ("road alerts submitted", self.road.submitted),
            ("passenger questions", self.passenger.submitted),
            ("passenger replies", self.passenger.replies),
            ("driver alerts handled", self.driver.alerts_handled),
            ("driver questions answered", self.driver.questions_answered),
            ("events discarded", self.driver.discarded),
        ];
        for (label, value) in rows {
            writeln!(f, "  {:<27}{}", format!("{}:", label), value)?;
        }
        Ok(())
    }
}

/// A drive with a road, a passenger and one driver whose attention they share
pub struct Trip {
    config: Config,
    sink: Arc<dyn StatusSink>,
}

impl Trip {
    pub fn new(config: Config, sink: Arc<dyn StatusSink>) -> Self {
        debug!(strategy = %config.strategy, seed = ?config.seed, "Trip::new: called");
        Self { config, sink }
    }

    /// Run until `cancel` fires
    ///
    /// The configuration is validated first; nothing is spawned if it is invalid.
    /// All tasks run concurrently. If any of them fails, the others are
    /// cancelled and the first failure is returned.
    pub async fn run(self, cancel: CancellationToken) -> Result<TripReport> {
        let Self { config, sink } = self;
        config.validate().context("Invalid trip configuration")?;
        let strategy = config.strategy;
        info!(%strategy, "Trip starting");

        let driver = Arc::new(Driver::new(config.driver, sink, config.seed));
        let (arbiter, mailbox) = create_arbiter(strategy, driver.clone());

        let driver_task = mailbox.map(|mailbox| supervise("driver", mailbox.run(cancel.clone()), &cancel));
        let road_task = supervise(
            "road",
            Road::new(arbiter.clone(), config.road, config.seed).drive(cancel.clone()),
            &cancel,
        );
        let passenger_task = supervise(
            "passenger",
            Passenger::new(arbiter, config.passenger, config.seed).be_bored(cancel.clone()),
            &cancel,
        );

        let (road, passenger, driver_loop) =
            tokio::join!(road_task, passenger_task, OptionFuture::from(driver_task));

        let road = road.context("Road task panicked")??;
        let passenger = passenger.context("Passenger task panicked")??;
        let driver_stats = match driver_loop {
            Some(result) => result.context("Driver task panicked")??,
            None => driver.stats(),
        };

        let report = TripReport {
            strategy,
            road,
            passenger,
            driver: driver_stats,
        };
        info!(?report, "Trip finished");
        Ok(report)
    }
}

/// Spawn a task that cancels the whole trip if it fails
fn supervise<T, F>(name: &'static str, fut: F, cancel: &CancellationToken) -> JoinHandle<ArbiterResult<T>>
where
    T: Send + 'static,
    F: Future<Output = ArbiterResult<T>> + Send + 'static,
{
    let cancel = cancel.clone();
    tokio::spawn(async move {
        let result = fut.await;
        if let Err(e) = &result {
            error!(task = name, error = %e, "Task failed, cancelling trip");
            cancel.cancel();
        }
        result
    })
}
