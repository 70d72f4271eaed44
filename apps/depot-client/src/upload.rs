//! Cancellable streaming upload with live progress.
//!
//! The file is sent as a multipart body built from a chunked stream. After
//! each chunk is handed to the transport the controller publishes
//! `100 * bytes_sent / total_bytes` (floored), so progress is monotonically
//! non-decreasing and reaches 100 only at full transmission. Cancellation
//! is cooperative: a shared flag is checked at every chunk boundary, and
//! once set the stream aborts the request before it can complete. On the
//! wire this is indistinguishable from a dropped connection, and the
//! already-sent prefix is not retracted.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::Stream;
use reqwest::multipart::{Form, Part};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::types::UploadResponse;

/// Terminal state of an upload attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Completed,
    /// The filename already exists on the server.
    Conflict,
    /// The user aborted the transfer before it completed.
    Cancelled,
    /// The server could not be reached or the connection was lost.
    ConnectionFailed,
    /// Any other non-success status.
    ServerError(u16),
}

/// Progress and completion notifications for one upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadEvent {
    /// Percent of the file handed to the transport, 0–100.
    Progress(u8),
    /// Exactly one terminal event per upload.
    Done(UploadOutcome),
}

/// Handle to an in-flight upload task.
pub struct UploadHandle {
    cancel: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl UploadHandle {
    /// Open the file and start streaming it in a background task. Events
    /// arrive on the returned channel: zero or more `Progress`, then one
    /// `Done`. Errors opening the file surface here, before anything is
    /// sent.
    pub async fn start(
        api: ApiClient,
        path: PathBuf,
        chunk_size: usize,
    ) -> io::Result<(Self, mpsc::UnboundedReceiver<UploadEvent>)> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no filename"))?;

        let file = File::open(&path).await?;
        let total = file.metadata().await?.len();

        let cancel = Arc::new(AtomicBool::new(false));
        let (events, receiver) = mpsc::unbounded_channel();

        let task = tokio::spawn(run_transfer(
            api,
            file,
            total,
            filename,
            chunk_size,
            cancel.clone(),
            events,
        ));

        Ok((Self { cancel, task }, receiver))
    }

    /// Request cooperative cancellation. No further bytes are sent after
    /// the next chunk boundary.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Wait for the transfer task to finish.
    pub async fn join(self) {
        let _ = self.task.await;
    }
}

async fn run_transfer(
    api: ApiClient,
    file: File,
    total: u64,
    filename: String,
    chunk_size: usize,
    cancel: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<UploadEvent>,
) {
    let stream = file_chunks(file, total, chunk_size, cancel.clone(), events.clone());
    let part = Part::stream_with_length(reqwest::Body::wrap_stream(stream), total)
        .file_name(filename.clone());
    let form = Form::new().part("file", part);

    let result = api.upload(form).await;
    if let Err(err) = &result {
        tracing::info!(filename = %filename, error = %err, "upload did not complete");
    }

    let cancelled = cancel.load(Ordering::SeqCst);
    let _ = events.send(UploadEvent::Done(outcome_for(&result, cancelled)));
}

/// Map the request result to a terminal outcome. A cancelled transfer
/// surfaces as a transport error; the cancellation flag disambiguates it
/// from a genuine connection failure. A server response that arrived
/// despite a late cancel request still wins.
fn outcome_for(result: &Result<UploadResponse, ClientError>, cancelled: bool) -> UploadOutcome {
    match result {
        Ok(_) => UploadOutcome::Completed,
        Err(ClientError::Status { status: 409, .. }) => UploadOutcome::Conflict,
        Err(ClientError::Status { status, .. }) => UploadOutcome::ServerError(*status),
        Err(_) if cancelled => UploadOutcome::Cancelled,
        Err(_) => UploadOutcome::ConnectionFailed,
    }
}

#[derive(Debug, Error)]
enum StreamAbort {
    #[error("upload cancelled")]
    Cancelled,
    #[error(transparent)]
    Io(#[from] io::Error),
}

struct ChunkState {
    file: File,
    total: u64,
    sent: u64,
    chunk_size: usize,
    cancel: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<UploadEvent>,
    done: bool,
}

/// Read the file in bounded chunks, publishing progress after each one and
/// checking the cancellation flag before each read.
fn file_chunks(
    file: File,
    total: u64,
    chunk_size: usize,
    cancel: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<UploadEvent>,
) -> impl Stream<Item = Result<Vec<u8>, StreamAbort>> + Send {
    let state = ChunkState {
        file,
        total,
        sent: 0,
        chunk_size,
        cancel,
        events,
        done: false,
    };

    futures::stream::unfold(state, |mut state| async move {
        if state.done {
            return None;
        }
        if state.cancel.load(Ordering::SeqCst) {
            state.done = true;
            return Some((Err(StreamAbort::Cancelled), state));
        }

        let mut buf = vec![0u8; state.chunk_size];
        match state.file.read(&mut buf).await {
            Ok(0) => None,
            Ok(n) => {
                buf.truncate(n);
                state.sent += n as u64;
                let percent = if state.total == 0 {
                    100
                } else {
                    (100 * state.sent / state.total) as u8
                };
                let _ = state.events.send(UploadEvent::Progress(percent));
                Some((Ok(buf), state))
            }
            Err(err) => {
                state.done = true;
                Some((Err(StreamAbort::Io(err)), state))
            }
        }
    })
}
