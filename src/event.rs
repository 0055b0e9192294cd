use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent};
use tokio::sync::mpsc;

use crate::error::{AppError, Result};
use crate::handler;
use crate::viewport::Direction;

/// Browser events, in the order the user produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Move the selection one row.
    Reselect(Direction),
    /// Enter the highlighted directory or open the highlighted file.
    Select,
    /// Flip whether hidden entries are listed.
    ToggleHidden,
    /// Leave the browser.
    Quit,
    /// The terminal changed size.
    Resize,
    /// The terminal driver reported an error. Always fatal.
    DriverError(String),
}

/// Blocking source of raw terminal events.
pub trait EventSource: Send + 'static {
    /// Wait up to `timeout` for an event to become readable.
    fn poll(&mut self, timeout: Duration) -> io::Result<bool>;
    /// Read the next event. Only called after `poll` returned `true`.
    fn read(&mut self) -> io::Result<CrosstermEvent>;
}

/// The real terminal, via crossterm.
pub struct CrosstermSource;

impl EventSource for CrosstermSource {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        event::poll(timeout)
    }

    fn read(&mut self) -> io::Result<CrosstermEvent> {
        event::read()
    }
}

#[derive(Default)]
struct ProducerControl {
    paused: AtomicBool,
    /// Set by the producer once it has seen `paused` and stopped reading.
    idle: AtomicBool,
}

/// Producer thread that reads terminal events, translates them, and forwards
/// them to the single consumer over an unbounded channel.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    control: Arc<ProducerControl>,
    tick_rate: Duration,
}

impl EventHandler {
    /// Start reading from the terminal, polling every `tick_rate`.
    pub fn new(tick_rate: Duration) -> Self {
        Self::with_source(CrosstermSource, tick_rate)
    }

    pub fn with_source<S: EventSource>(source: S, tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let control = Arc::new(ProducerControl::default());
        let producer_control = control.clone();

        tokio::task::spawn_blocking(move || produce(source, tx, producer_control, tick_rate));

        Self {
            rx,
            control,
            tick_rate,
        }
    }

    /// Receive the next event (blocks until available).
    pub async fn next(&mut self) -> Result<Event> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| AppError::Terminal("Event channel closed".into()))
    }

    /// Stop reading terminal input, returning once the producer has stopped.
    ///
    /// Used while a child process owns the terminal so that its keystrokes
    /// aren't consumed here. Returns at once if the producer has exited.
    pub async fn pause(&self) {
        self.control.idle.store(false, Ordering::SeqCst);
        self.control.paused.store(true, Ordering::SeqCst);
        // The producer holds the only other reference while it runs.
        while !self.control.idle.load(Ordering::SeqCst)
            && Arc::strong_count(&self.control) > 1
        {
            tokio::time::sleep(self.tick_rate).await;
        }
    }

    pub fn resume(&self) {
        self.control.paused.store(false, Ordering::SeqCst);
    }
}

fn produce<S: EventSource>(
    mut source: S,
    tx: mpsc::UnboundedSender<Event>,
    control: Arc<ProducerControl>,
    tick_rate: Duration,
) {
    loop {
        if tx.is_closed() {
            break;
        }
        if control.paused.load(Ordering::SeqCst) {
            control.idle.store(true, Ordering::SeqCst);
            std::thread::sleep(tick_rate);
            continue;
        }
        match source.poll(tick_rate) {
            Ok(true) => match source.read() {
                Ok(raw) => {
                    if let Some(event) = handler::translate(raw) {
                        if tx.send(event).is_err() {
                            break;
                        }
                    }
                }
                Err(e) => {
                    let _ = tx.send(Event::DriverError(e.to_string()));
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                let _ = tx.send(Event::DriverError(e.to_string()));
                break;
            }
        }
    }
}
