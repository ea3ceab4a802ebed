use std::time::Duration;

use log::{debug, error, info};
use tokio::task::JoinHandle;

use crate::error::{ErrorCode, PushError, Result};
use crate::pushrelay::config::BackendConfig;
use crate::pushrelay::sales::{random_sales_report, SalesRecord};
use crate::pushrelay::ui::UiHandle;

pub const SLOW_RESPONSE: &str = "I'm a response from a slow operation!";

/// Handle to work running on a blocking worker.
///
/// Dropping the handle detaches the worker; it still runs to completion.
pub struct Completion<T> {
    handle: JoinHandle<T>,
}

impl<T: Send + 'static> Completion<T> {
    fn spawn_blocking<F>(work: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        Self {
            handle: tokio::task::spawn_blocking(work),
        }
    }

    /// Waits for the worker. An interrupted worker is fatal and not retried.
    pub async fn wait(self) -> Result<T> {
        self.handle.await.map_err(|e| {
            error!("Background operation interrupted: {}", e);
            PushError::new(ErrorCode::OperationInterrupted, format!("Background operation interrupted: {}", e))
        })
    }

    /// Runs `f` on the session's executor once the worker finishes
    pub fn then_accept<S, F>(self, ui: &UiHandle<S>, f: F) -> JoinHandle<Result<()>>
    where
        S: Send + 'static,
        F: FnOnce(Result<T>, &mut S) + Send + 'static,
    {
        let ui = ui.clone();
        tokio::spawn(async move {
            let result = self.wait().await;
            ui.access(move |state| f(result, state))
        })
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Simulated slow backend
pub struct BackendService {
    config: BackendConfig,
}

impl BackendService {
    pub fn new(config: BackendConfig) -> Self {
        Self { config }
    }

    pub fn fetch_slowly(&self) -> Completion<String> {
        let delay = self.config.fetch_delay();
        info!("Starting slow fetch ({:?})", delay);
        Completion::spawn_blocking(move || {
            sleep_for(delay);
            SLOW_RESPONSE.to_string()
        })
    }

    pub fn generate_sales_report(&self) -> Completion<Vec<SalesRecord>> {
        let delay = self.config.report_delay();
        info!("Starting sales report generation ({:?})", delay);
        Completion::spawn_blocking(move || {
            sleep_for(delay);
            let report = random_sales_report(&mut rand::rng());
            debug!("Generated sales report for {} products", report.len());
            report
        })
    }
}

fn sleep_for(delay: Duration) {
    std::thread::sleep(delay);
}
