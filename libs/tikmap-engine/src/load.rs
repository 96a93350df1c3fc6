use std::time::Duration;

use tokio_util::sync::CancellationToken;

use tikmap_api::error::ExecutorError;
use tikmap_api::executor::{CommandExecutor, EventSender, StreamEvent, event_channel};
use tikmap_api::mapping::Entity;
use tikmap_api::record::ResponseRecord;

use crate::error::LoadError;
use crate::materialize::materialize_all;

// All strategies here block the calling thread. From async code, run them
// inside `tokio::task::spawn_blocking`.

/// Run the command and materialize every row, in arrival order.
pub fn load_list<T: Entity>(executor: &dyn CommandExecutor) -> Result<Vec<T>, LoadError> {
    let command = executor.command();
    let records = executor
        .execute_list()
        .map_err(|e| LoadError::from(e).with_context(command))?;
    tracing::debug!(command = %command, rows = records.len(), "loaded rows");
    materialize_all(&records)
}

/// Run the command and require exactly one row.
pub fn load_single<T: Entity>(executor: &dyn CommandExecutor) -> Result<T, LoadError> {
    let mut list = load_list::<T>(executor)?;
    match list.len() {
        1 => Ok(list.remove(0)),
        actual => Err(LoadError::Cardinality {
            command: executor.command().to_string(),
            expected: "exactly one",
            actual,
        }),
    }
}

/// Run the command and require at most one row; no row yields `T::default()`.
pub fn load_single_or_default<T: Entity>(executor: &dyn CommandExecutor) -> Result<T, LoadError> {
    let mut list = load_list::<T>(executor)?;
    match list.len() {
        0 => Ok(T::default()),
        1 => Ok(list.remove(0)),
        actual => Err(LoadError::Cardinality {
            command: executor.command().to_string(),
            expected: "at most one",
            actual,
        }),
    }
}

/// Collect rows for about `duration`, then cancel and materialize what arrived.
///
/// A zero duration is rejected before the executor is touched.
pub fn load_with_duration<T: Entity>(
    executor: &dyn CommandExecutor,
    duration: Duration,
) -> Result<Vec<T>, LoadError> {
    if duration.is_zero() {
        return Err(LoadError::argument("duration must be positive").with_context(executor.command()));
    }
    let command = executor.command();
    let records = executor
        .execute_list_with_duration(duration)
        .map_err(|e| LoadError::from(e).with_context(command))?;
    tracing::debug!(
        command = %command,
        rows = records.len(),
        duration_ms = duration.as_millis() as u64,
        "loaded rows with duration"
    );
    materialize_all(&records)
}

/// Soft-deadline collector for executors built on an event stream.
///
/// `start` launches the stream. Rows are accumulated until the deadline,
/// `Done`, or the producer hanging up. At the deadline the token is
/// cancelled and rows already queued are kept. A trap fails the call.
///
/// Blocks the calling thread. Called from inside a tokio runtime it fails
/// without starting the stream.
pub fn collect_for<F>(duration: Duration, start: F) -> Result<Vec<ResponseRecord>, ExecutorError>
where
    F: FnOnce(EventSender, CancellationToken) -> Result<(), ExecutorError>,
{
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(ExecutorError::protocol(
            "collect_for must not run inside a tokio runtime, use spawn_blocking",
        ));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    let token = CancellationToken::new();
    let (tx, mut rx) = event_channel();
    start(tx, token.clone())?;

    runtime.block_on(async move {
        let mut rows = Vec::new();
        let deadline = tokio::time::sleep(duration);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                biased;
                _ = &mut deadline => {
                    token.cancel();
                    break;
                }
                event = rx.recv() => match event {
                    Some(StreamEvent::Row(record)) => rows.push(record),
                    Some(StreamEvent::Trap(trap)) => {
                        token.cancel();
                        return Err(ExecutorError::trap(&trap));
                    }
                    Some(StreamEvent::Done) | None => return Ok(rows),
                },
            }
        }

        while let Ok(event) = rx.try_recv() {
            match event {
                StreamEvent::Row(record) => rows.push(record),
                StreamEvent::Trap(_) | StreamEvent::Done => break,
            }
        }
        tracing::debug!(rows = rows.len(), "duration elapsed, command cancelled");
        Ok(rows)
    })
}
