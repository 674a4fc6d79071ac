//! Background terminal event reader.
//!
//! The dashboard is driven entirely from the keyboard: region keys, layer
//! cycling, marker toggles and the site table cursor. Mouse capture is left
//! off so the terminal keeps its own text selection, which is how coordinates
//! and image paths get copied out of the detail screen. Any mouse, focus or
//! paste events that still arrive are discarded here.
//!
//! Two clocks run beside the input stream:
//!
//! - [`Event::Tick`] at `ui.tick_rate_ms` (250 ms by default) only drives
//!   housekeeping such as toast expiry. Forecast results arrive on their own
//!   channel and never wait for a tick.
//! - [`Event::Render`] at `ui.render_rate_ms` (33 ms by default) is the only
//!   thing that triggers a redraw. Bursty key input therefore costs at most
//!   one frame per interval.

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub enum Event {
    /// Key press. Releases and repeats reported by enhanced keyboards are
    /// dropped so a held key does not toggle a layer twice.
    Key(KeyEvent),
    /// Terminal was resized to (cols, rows).
    Resize(u16, u16),
    Tick,
    Render,
}

/// Owns the reader task. The task ends when [`EventReader::stop`] is called,
/// when the reader is dropped, or when the receiving side goes away.
pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
}

impl EventReader {
    /// Spawn the reader on the current tokio runtime.
    ///
    /// Missed intervals are skipped rather than replayed: after a slow frame
    /// the loop sees one `Render`, not a backlog of them.
    pub fn new(tick_rate: Duration, render_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            let mut event_stream = EventStream::new();
            let mut tick_interval = tokio::time::interval(tick_rate);
            let mut render_interval = tokio::time::interval(render_rate);

            tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            render_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                let event = tokio::select! {
                    () = task_cancel.cancelled() => break,

                    _ = tick_interval.tick() => Event::Tick,

                    _ = render_interval.tick() => Event::Render,

                    Some(Ok(crossterm_event)) = event_stream.next() => {
                        match translate(crossterm_event) {
                            Some(event) => event,
                            None => continue,
                        }
                    }
                };

                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { rx, cancel }
    }

    /// Next event, or `None` once the reader task has exited.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Cancel the reader task. Idempotent; the app calls it on quit before
    /// restoring the terminal so no stray read races the cooked-mode shell.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Keep key presses and resizes; everything else is noise for this app.
fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers, MouseEvent, MouseEventKind};

    #[test]
    fn key_press_is_forwarded() {
        let key = KeyEvent::new(KeyCode::Char('m'), KeyModifiers::NONE);
        assert!(matches!(
            translate(CrosstermEvent::Key(key)),
            Some(Event::Key(k)) if k.code == KeyCode::Char('m')
        ));
    }

    #[test]
    fn key_release_and_repeat_are_dropped() {
        for kind in [KeyEventKind::Release, KeyEventKind::Repeat] {
            let key = KeyEvent::new_with_kind(KeyCode::Char('m'), KeyModifiers::NONE, kind);
            assert!(translate(CrosstermEvent::Key(key)).is_none());
        }
    }

    #[test]
    fn mouse_and_focus_are_dropped() {
        let mouse = MouseEvent {
            kind: MouseEventKind::Moved,
            column: 4,
            row: 2,
            modifiers: KeyModifiers::NONE,
        };
        assert!(translate(CrosstermEvent::Mouse(mouse)).is_none());
        assert!(translate(CrosstermEvent::FocusGained).is_none());
    }

    #[test]
    fn resize_is_forwarded() {
        assert!(matches!(
            translate(CrosstermEvent::Resize(120, 40)),
            Some(Event::Resize(120, 40))
        ));
    }
}
