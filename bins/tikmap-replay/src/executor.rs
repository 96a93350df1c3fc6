use std::time::Duration;

use tokio_util::sync::CancellationToken;

use tikmap_api::error::ExecutorError;
use tikmap_api::executor::{CommandExecutor, EventSender, StreamEvent};
use tikmap_api::record::ResponseRecord;

use crate::config::ReplayConfig;

/// Plays recorded reply sentences as if a device sent them.
pub struct ReplayExecutor {
    command: String,
    interval: Duration,
    repeat: bool,
    events: Vec<StreamEvent>,
}

impl ReplayExecutor {
    pub fn from_config(config: &ReplayConfig) -> Self {
        Self {
            command: config.command.clone(),
            interval: Duration::from_millis(config.interval_ms),
            repeat: config.repeat,
            events: config.stream_events(),
        }
    }
}

impl CommandExecutor for ReplayExecutor {
    fn command(&self) -> &str {
        &self.command
    }

    fn execute_list(&self) -> Result<Vec<ResponseRecord>, ExecutorError> {
        if self.repeat {
            return Err(ExecutorError::protocol(
                "fixture repeats forever, use `watch` or `stream`",
            ));
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

    fn execute_list_with_duration(
        &self,
        duration: Duration,
    ) -> Result<Vec<ResponseRecord>, ExecutorError> {
        tikmap_engine::collect_for(duration, |events, token| self.execute_async(events, token))
    }

    fn execute_async(
        &self,
        events: EventSender,
        token: CancellationToken,
    ) -> Result<(), ExecutorError> {
        let command = self.command.clone();
        let interval = self.interval;
        let repeat = self.repeat;
        let sentences = self.events.clone();

        std::thread::Builder::new()
            .name(format!("replay {command}"))
            .spawn(move || {
                let mut sent = 0usize;
                'replay: loop {
                    for event in &sentences {
                        if !interval.is_zero() {
                            std::thread::sleep(interval);
                        }
                        if token.is_cancelled() {
                            tracing::debug!(command = %command, sent, "replay cancelled");
                            break 'replay;
                        }
                        if events.send(event.clone()).is_err() {
                            break 'replay;
                        }
                        sent += 1;
                    }
                    if !repeat {
                        let _ = events.send(StreamEvent::Done);
                        tracing::debug!(command = %command, sent, "replay finished");
                        break;
                    }
                }
            })?;
        Ok(())
    }
}
