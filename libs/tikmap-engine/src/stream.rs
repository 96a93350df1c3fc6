use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use tikmap_api::executor::{CommandExecutor, EventReceiver, StreamEvent, event_channel};
use tikmap_api::mapping::{Entity, EntityMetadata};

use crate::error::LoadError;
use crate::materialize::materialize_with;
use crate::metadata::metadata;

type ItemFn<T> = Box<dyn FnMut(T) + Send>;
type ErrorFn = Box<dyn FnMut(LoadError) + Send>;
type DoneFn = Box<dyn FnOnce() + Send>;

/// How a stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// `!done` received, `on_done` was called.
    Completed,
    /// Cancelled by the caller before `!done`.
    Cancelled,
    /// Executor failure, channel closed early, or a callback panicked.
    Faulted,
}

/// Builder for an asynchronous load of `T` entities.
///
/// ```ignore
/// let handle = AsyncLoad::<Interface>::new()
///     .executor(executor)
///     .on_item(|iface| println!("{}", iface.name))
///     .on_error(|e| eprintln!("{e}"))
///     .on_done(|| println!("done"))
///     .start()?;
/// handle.cancel_and_join().await;
/// ```
pub struct AsyncLoad<T> {
    executor: Option<Arc<dyn CommandExecutor>>,
    on_item: Option<ItemFn<T>>,
    on_error: Option<ErrorFn>,
    on_done: Option<DoneFn>,
    token: CancellationToken,
}

impl<T: Entity> Default for AsyncLoad<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> AsyncLoad<T> {
    pub fn new() -> Self {
        Self {
            executor: None,
            on_item: None,
            on_error: None,
            on_done: None,
            token: CancellationToken::new(),
        }
    }

    pub fn executor(mut self, executor: Arc<dyn CommandExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Called once per data row, with the row already materialized.
    pub fn on_item(mut self, f: impl FnMut(T) + Send + 'static) -> Self {
        self.on_item = Some(Box::new(f));
        self
    }

    /// Called once per trap row or per row that failed to materialize.
    ///
    /// Without it those errors are dropped.
    pub fn on_error(mut self, f: impl FnMut(LoadError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    /// Called once, after every other callback, when the command completes.
    pub fn on_done(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_done = Some(Box::new(f));
        self
    }

    /// Canceller for this load, usable before `start` (e.g. inside callbacks).
    pub fn canceller(&self) -> StreamCanceller {
        StreamCanceller {
            token: self.token.clone(),
        }
    }

    /// Build the dispatcher without an executor or a worker.
    ///
    /// Fails if `on_item` is missing.
    pub fn dispatcher(self, command: impl Into<String>) -> Result<Dispatcher<T>, LoadError> {
        let on_item = self
            .on_item
            .ok_or_else(|| LoadError::argument("on_item callback is required"))?;
        Ok(Dispatcher {
            command: command.into(),
            metadata: metadata::<T>(),
            on_item,
            on_error: self.on_error,
            on_done: self.on_done,
            token: self.token,
        })
    }

    /// Start the command and return immediately.
    ///
    /// Argument errors are returned here, before the executor is touched.
    /// Everything after that, including executor start failures, is
    /// reported through `on_error`.
    pub fn start(mut self) -> Result<StreamHandle, LoadError> {
        let executor = self
            .executor
            .take()
            .ok_or_else(|| LoadError::argument("executor is required"))?;
        if self.on_item.is_none() {
            return Err(LoadError::argument("on_item callback is required"));
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| LoadError::argument("async load must be started inside a tokio runtime"))?;

        let command = executor.command().to_string();
        let token = self.token.clone();
        let dispatcher = self.dispatcher(command.clone())?;

        let (tx, rx) = event_channel();
        let join = if token.is_cancelled() {
            tracing::debug!(command = %command, "cancelled before start");
            drop(tx);
            runtime.spawn(dispatcher.run(rx))
        } else {
            match executor.execute_async(tx, token.clone()) {
                Ok(()) => {
                    tracing::debug!(command = %command, "stream started");
                    runtime.spawn(dispatcher.run(rx))
                }
                Err(e) => runtime.spawn(dispatcher.fail(LoadError::from(e).with_context(&command))),
            }
        };

        Ok(StreamHandle {
            command,
            token,
            join,
        })
    }
}

/// Consumes stream events and invokes the matching callback, in order.
///
/// A single dispatcher serves one invocation, so callbacks never overlap.
/// No lock is held while a callback runs.
pub struct Dispatcher<T> {
    command: String,
    metadata: Arc<EntityMetadata<T>>,
    on_item: ItemFn<T>,
    on_error: Option<ErrorFn>,
    on_done: Option<DoneFn>,
    token: CancellationToken,
}

impl<T: Entity> Dispatcher<T> {
    /// Handle one event. Returns the outcome once the stream is over.
    pub fn dispatch(&mut self, event: StreamEvent) -> Option<StreamOutcome> {
        if self.token.is_cancelled() {
            return Some(StreamOutcome::Cancelled);
        }
        match event {
            StreamEvent::Row(record) => {
                match materialize_with(&self.metadata, &record) {
                    Ok(entity) => {
                        // Materialization may be slow; re-check before handing out.
                        if self.token.is_cancelled() {
                            return Some(StreamOutcome::Cancelled);
                        }
                        (self.on_item)(entity);
                    }
                    Err(e) => self.deliver_error(e),
                }
                None
            }
            StreamEvent::Trap(trap) => {
                self.deliver_error(LoadError::Trap(trap.into()));
                None
            }
            StreamEvent::Done => {
                if let Some(on_done) = self.on_done.take() {
                    on_done();
                }
                Some(StreamOutcome::Completed)
            }
        }
    }

    /// Drain `events` until done, cancelled, or the producer hangs up.
    ///
    /// If a callback panics the token is cancelled while unwinding, which
    /// tells the executor to stop producing.
    pub async fn run(mut self, mut events: EventReceiver) -> StreamOutcome {
        let guard = self.token.clone().drop_guard();

        let outcome = loop {
            let event = tokio::select! {
                biased;
                _ = self.token.cancelled() => break StreamOutcome::Cancelled,
                event = events.recv() => event,
            };
            match event {
                Some(event) => {
                    if let Some(outcome) = self.dispatch(event) {
                        break outcome;
                    }
                }
                None => {
                    if self.token.is_cancelled() {
                        break StreamOutcome::Cancelled;
                    }
                    let command = self.command.clone();
                    self.deliver_error(LoadError::Disconnected { command });
                    break StreamOutcome::Faulted;
                }
            }
        };

        match outcome {
            StreamOutcome::Completed => {
                let _ = guard.disarm();
            }
            // Cancel the remote side on every other exit.
            _ => drop(guard),
        }
        tracing::debug!(command = %self.command, outcome = ?outcome, "stream finished");
        outcome
    }

    /// Report a start failure on the worker and finish as faulted.
    pub async fn fail(mut self, error: LoadError) -> StreamOutcome {
        tracing::warn!(command = %self.command, error = %error, "stream failed to start");
        self.deliver_error(error);
        StreamOutcome::Faulted
    }

    fn deliver_error(&mut self, error: LoadError) {
        match self.on_error.as_mut() {
            Some(on_error) => on_error(error),
            None => {
                tracing::debug!(command = %self.command, error = %error, "no error callback, dropping");
            }
        }
    }
}

/// Cloneable cancellation handle for one stream.
#[derive(Debug, Clone)]
pub struct StreamCanceller {
    token: CancellationToken,
}

impl StreamCanceller {
    /// Signal cancellation and return immediately.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Handle to a running asynchronous load.
#[derive(Debug)]
pub struct StreamHandle {
    command: String,
    token: CancellationToken,
    join: JoinHandle<StreamOutcome>,
}

impl StreamHandle {
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn canceller(&self) -> StreamCanceller {
        StreamCanceller {
            token: self.token.clone(),
        }
    }

    /// Signal cancellation and return immediately. The worker stops soon after.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the worker to stop.
    pub async fn join(self) -> StreamOutcome {
        match self.join.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => {
                tracing::error!(command = %self.command, "stream callback panicked, stream aborted");
                StreamOutcome::Faulted
            }
            Err(_) => StreamOutcome::Cancelled,
        }
    }

    /// Signal cancellation and wait until the worker has stopped.
    ///
    /// No callback of this stream runs after this returns.
    pub async fn cancel_and_join(self) -> StreamOutcome {
        self.token.cancel();
        self.join().await
    }
}
