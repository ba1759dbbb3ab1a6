//! Push-mode progress streaming.
//!
//! A subscriber gets one consistent [`JobStatus`] snapshot per second, read
//! from the job's watch channel. The terminal status is emitted and the
//! stream ends; if the job is evicted mid-stream (the watch sender drops)
//! the stream ends with no further events. The 1 Hz cadence is the external
//! contract — intermediate checkpoints between ticks are skipped, never
//! interleaved.

use std::time::Duration;

use futures::Stream;
use tokio::sync::watch;

use crate::types::JobStatus;

const CADENCE: Duration = Duration::from_secs(1);

struct StreamState {
    rx: Option<watch::Receiver<JobStatus>>,
    first: bool,
}

/// Turn a status subscription into the 1 Hz progress stream.
///
/// `None` (an unknown job) yields an immediately-empty stream.
pub(crate) fn status_stream(
    rx: Option<watch::Receiver<JobStatus>>,
) -> impl Stream<Item = JobStatus> + Send + 'static {
    futures::stream::unfold(
        StreamState { rx, first: true },
        |mut state| async move {
            let rx = state.rx.as_mut()?;
            if state.first {
                state.first = false;
            } else {
                tokio::time::sleep(CADENCE).await;
                // Sender dropped between ticks: the job was evicted.
                if rx.has_changed().is_err() {
                    return None;
                }
            }
            let status = rx.borrow().clone();
            let terminal = status.state.is_terminal();
            if terminal {
                state.rx = None;
            }
            Some((status, state))
        },
    )
}
