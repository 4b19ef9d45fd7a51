//! Terminal event source — a background tokio task that merges crossterm
//! input with the app's two timers.
//!
//! The app is keyboard-driven, so only key presses and resizes survive the
//! translation; everything else crossterm reports is dropped here.

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Toast deadlines are only checked on this cadence, so dismissal can lag
/// by up to one tick.
const TICK_RATE: Duration = Duration::from_millis(250);

/// Frame cadence, ~30 FPS.
const RENDER_RATE: Duration = Duration::from_millis(33);

/// Events the app loop consumes.
#[derive(Debug)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// Terminal was resized to (cols, rows).
    Resize(u16, u16),
    /// Coarse timer — drives toast expiry.
    Tick,
    /// Time to draw a frame.
    Render,
}

/// Reads terminal events in a background task and sends them over a channel.
pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
}

impl EventReader {
    /// Spawn the background event reader.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            let mut input = EventStream::new();
            let mut tick_interval = tokio::time::interval(TICK_RATE);
            let mut render_interval = tokio::time::interval(RENDER_RATE);

            // Don't burst ticks if we fall behind
            tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            render_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                let event = tokio::select! {
                    _ = task_cancel.cancelled() => break,

                    _ = tick_interval.tick() => Event::Tick,

                    _ = render_interval.tick() => Event::Render,

                    Some(Ok(crossterm_event)) = input.next() => {
                        match crossterm_event {
                            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                                Event::Key(key)
                            }
                            CrosstermEvent::Resize(w, h) => Event::Resize(w, h),
                            // Key release/repeat, mouse, focus, paste: ignored
                            _ => continue,
                        }
                    }
                };

                // If the receiver is dropped, stop.
                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { rx, cancel }
    }

    /// Receive the next event. Returns `None` if the reader has stopped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Signal the background reader to stop.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reader_ticks_immediately_and_drains_after_stop() {
        let mut reader = EventReader::new();

        // Both intervals fire their first tick right away.
        let first = reader.next().await;
        assert!(matches!(first, Some(Event::Tick | Event::Render)));

        reader.stop();
        // After cancellation the channel closes once in-flight events drain.
        while reader.next().await.is_some() {}
    }
}
