//! Shared fixtures: an in-process executor and a sample entity.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tikmap_api::executor::{CommandExecutor, EventSender, StreamEvent};
use tikmap_api::{Entity, ExecutorError, ResponseRecord, TrapRecord};
use tokio_util::sync::CancellationToken;

pub const INTERFACE_PRINT: &str = "/interface/print";

#[derive(Entity, Default, Debug, Clone, PartialEq)]
pub struct Interface {
    #[field(key = "name", mandatory)]
    pub name: String,

    #[field(key = "disabled", default = "false")]
    pub disabled: bool,
}

pub fn iface(name: &str, disabled: bool) -> Interface {
    Interface {
        name: name.to_string(),
        disabled,
    }
}

pub fn row(pairs: &[(&str, &str)]) -> StreamEvent {
    StreamEvent::Row(ResponseRecord::from_pairs(INTERFACE_PRINT, pairs.iter().copied()))
}

pub fn trap(message: &str) -> StreamEvent {
    StreamEvent::Trap(TrapRecord::new(INTERFACE_PRINT, message))
}

/// Replays a fixed list of events.
///
/// `execute_async` pushes every event synchronously, stopping early if the
/// token is already cancelled.
pub struct FakeExecutor {
    events: Vec<StreamEvent>,
    fail_start: bool,
    pub calls: AtomicUsize,
    pub last_duration: Mutex<Option<Duration>>,
}

impl FakeExecutor {
    pub fn new(events: Vec<StreamEvent>) -> Self {
        Self {
            events,
            fail_start: false,
            calls: AtomicUsize::new(0),
            last_duration: Mutex::new(None),
        }
    }

    pub fn rows(rows: Vec<StreamEvent>) -> Self {
        let mut events = rows;
        events.push(StreamEvent::Done);
        Self::new(events)
    }

    pub fn failing() -> Self {
        Self {
            fail_start: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn collect(&self) -> Result<Vec<ResponseRecord>, ExecutorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_start {
            return Err(ExecutorError::io("connection refused"));
        }
        let mut rows = Vec::new();
        for event in &self.events {
            match event {
                StreamEvent::Row(record) => rows.push(record.clone()),
                StreamEvent::Trap(trap) => return Err(ExecutorError::trap(trap)),
                StreamEvent::Done => break,
            }
        }
        Ok(rows)
    }
}

impl CommandExecutor for FakeExecutor {
    fn command(&self) -> &str {
        INTERFACE_PRINT
    }

    fn execute_list(&self) -> Result<Vec<ResponseRecord>, ExecutorError> {
        self.collect()
    }

    fn execute_list_with_duration(
        &self,
        duration: Duration,
    ) -> Result<Vec<ResponseRecord>, ExecutorError> {
        *self.last_duration.lock().unwrap() = Some(duration);
        self.collect()
    }

    fn execute_async(
        &self,
        events: EventSender,
        token: CancellationToken,
    ) -> Result<(), ExecutorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_start {
            return Err(ExecutorError::io("connection refused"));
        }
        for event in &self.events {
            if token.is_cancelled() {
                break;
            }
            let _ = events.send(event.clone());
        }
        Ok(())
    }
}

/// Keeps the sender so the test decides when (and whether) rows arrive.
#[derive(Default)]
pub struct PendingExecutor {
    sender: Mutex<Option<EventSender>>,
    pub calls: AtomicUsize,
}

impl PendingExecutor {
    pub fn push(&self, event: StreamEvent) -> bool {
        match self.sender.lock().unwrap().as_ref() {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    pub fn hang_up(&self) {
        self.sender.lock().unwrap().take();
    }
}

impl CommandExecutor for PendingExecutor {
    fn command(&self) -> &str {
        INTERFACE_PRINT
    }

    fn execute_list(&self) -> Result<Vec<ResponseRecord>, ExecutorError> {
        Err(ExecutorError::protocol("not supported"))
    }

    fn execute_list_with_duration(
        &self,
        _duration: Duration,
    ) -> Result<Vec<ResponseRecord>, ExecutorError> {
        Err(ExecutorError::protocol("not supported"))
    }

    fn execute_async(
        &self,
        events: EventSender,
        _token: CancellationToken,
    ) -> Result<(), ExecutorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.sender.lock().unwrap() = Some(events);
        Ok(())
    }
}

/// Produces a row every millisecond on its own thread until cancelled.
pub struct TickingExecutor;

impl CommandExecutor for TickingExecutor {
    fn command(&self) -> &str {
        INTERFACE_PRINT
    }

    fn execute_list(&self) -> Result<Vec<ResponseRecord>, ExecutorError> {
        Ok(Vec::new())
    }

    fn execute_list_with_duration(
        &self,
        duration: Duration,
    ) -> Result<Vec<ResponseRecord>, ExecutorError> {
        tikmap_engine::collect_for(duration, |tx, token| self.execute_async(tx, token))
    }

    fn execute_async(
        &self,
        events: EventSender,
        token: CancellationToken,
    ) -> Result<(), ExecutorError> {
        std::thread::spawn(move || {
            let mut n = 0u64;
            while !token.is_cancelled() {
                let name = format!("ether{n}");
                if events.send(row(&[("name", name.as_str())])).is_err() {
                    break;
                }
                n += 1;
                std::thread::sleep(Duration::from_millis(1));
            }
        });
        Ok(())
    }
}
