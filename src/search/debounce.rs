use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::trace;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Turns a stream of raw input values into stabilized queries.
///
/// Each pushed value re-arms a single timer; the value is published only
/// when the timer runs out without another value arriving. A value equal to
/// the last published one is swallowed.
pub struct Debouncer {
    input: mpsc::UnboundedSender<String>,
    task: JoinHandle<()>,
}

impl Debouncer {
    pub fn spawn(delay: Duration, initial: String) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (output_tx, output_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(debounce_loop(delay, initial, input_rx, output_tx));

        (
            Self {
                input: input_tx,
                task,
            },
            output_rx,
        )
    }

    /// Returns false once the debouncer has shut down.
    pub fn push(&self, value: String) -> bool {
        self.input.send(value).is_ok()
    }

    pub fn abort(&self) {
        self.task.abort();
    }
}

async fn debounce_loop(
    delay: Duration,
    mut last_published: String,
    mut input: mpsc::UnboundedReceiver<String>,
    output: mpsc::UnboundedSender<String>,
) {
    let mut pending: Option<String> = None;
    let timer = tokio::time::sleep(delay);
    tokio::pin!(timer);

    loop {
        tokio::select! {
            value = input.recv() => match value {
                Some(value) => {
                    trace!("debounce: rearm for {:?}", value);
                    pending = Some(value);
                    timer.as_mut().reset(Instant::now() + delay);
                }
                None => break,
            },
            () = &mut timer, if pending.is_some() => {
                let Some(value) = pending.take() else { continue };
                if value == last_published {
                    continue;
                }
                last_published = value.clone();
                if output.send(value).is_err() {
                    break;
                }
            }
        }
    }
}
