//! Concurrent fan-out: one task per source, each raced against its timeout.
//!
//! Every source runs in its own tokio task so that a panic or a stalled
//! connector cannot take the others down. The fan-out waits for every race
//! to settle before returning; there is no early exit on the first success
//! or the first failure.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::config::SourceConfig;
use crate::connector::SourceConnector;
use crate::error::SourceError;
use crate::types::{DiscoveryOptions, DiscoveryResponse};

/// A source selected for the current call.
#[derive(Clone)]
pub struct FanOutTarget {
    pub source_id: String,
    pub connector: Arc<dyn SourceConnector>,
    pub config: SourceConfig,
    /// Options with the per-source cap already applied.
    pub options: DiscoveryOptions,
}

/// How one source's race settled.
#[derive(Debug)]
pub struct SourceOutcome {
    pub source_id: String,
    pub config: SourceConfig,
    pub elapsed_ms: u64,
    pub result: Result<DiscoveryResponse, SourceError>,
}

/// Query every target concurrently and collect outcomes in target order.
pub async fn fan_out(query: &str, targets: Vec<FanOutTarget>) -> Vec<SourceOutcome> {
    let query: Arc<str> = Arc::from(query);
    let races = targets
        .into_iter()
        .map(|target| race_source(Arc::clone(&query), target));
    futures::future::join_all(races).await
}

/// Run one source call in its own task and race it against the timeout.
///
/// On timeout the call's cancellation token is cancelled and its result is
/// discarded. The task itself is detached rather than aborted, so a
/// connector that ignores the token runs to completion in the background.
async fn race_source(query: Arc<str>, target: FanOutTarget) -> SourceOutcome {
    let FanOutTarget {
        source_id,
        connector,
        config,
        options,
    } = target;
    let timeout = Duration::from_millis(config.timeout_ms);
    let cancel = CancellationToken::new();
    let started = Instant::now();

    let task_cancel = cancel.clone();
    let handle = tokio::spawn(async move { connector.discover(&query, &options, task_cancel).await });

    let result = match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(Ok(response))) => Ok(response),
        Ok(Ok(Err(err))) => Err(SourceError::Call {
            source_id: source_id.clone(),
            message: err.to_string(),
        }),
        Ok(Err(join_err)) => Err(SourceError::Call {
            source_id: source_id.clone(),
            message: format!("source task failed: {join_err}"),
        }),
        Err(_elapsed) => {
            cancel.cancel();
            Err(SourceError::Timeout {
                source_id: source_id.clone(),
                timeout_ms: config.timeout_ms,
            })
        }
    };

    SourceOutcome {
        source_id,
        config,
        elapsed_ms: elapsed_ms(started),
        result,
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
