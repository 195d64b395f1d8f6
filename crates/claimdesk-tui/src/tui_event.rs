use std::time::Duration;

use ratatui::crossterm::event::{self, Event};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Read terminal events on a blocking thread and forward them to the UI loop.
///
/// Stops when `cancel` fires or the receiver is dropped.
pub fn spawn_reader(cancel: CancellationToken) -> mpsc::UnboundedReceiver<Event> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::task::spawn_blocking(move || {
        while !cancel.is_cancelled() {
            match event::poll(POLL_INTERVAL) {
                Ok(true) => match event::read() {
                    Ok(evt) => {
                        if tx.send(evt).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to read terminal event");
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(error = %e, "terminal event poll failed");
                    break;
                }
            }
        }
    });
    rx
}

/// Discard anything typed before the UI took over (e.g. the Enter that
/// launched the command).
pub fn drain_pending() {
    while event::poll(POLL_INTERVAL).unwrap_or(false) {
        let _ = event::read();
    }
}
