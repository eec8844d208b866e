//! Work that continues after the HTTP request has been acknowledged.
//!
//! Handlers submit a job together with the channel its reply belongs in. A single
//! worker runs every job on a `JoinSet`, posts the replies and logs whatever
//! fails, so no task outlives the worker unobserved.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{debug, error, warn};

use crate::chat::ChatPoster;
use crate::error::RescheduleError;
use crate::models::slack::Attachment;

/// Result of a follow-up job: a reply to post, or nothing to say.
pub type FollowUpResult = Result<Option<Attachment>, RescheduleError>;

struct FollowUp {
    channel: String,
    job: BoxFuture<'static, FollowUpResult>,
}

/// Cheap handle used by request handlers to queue follow-up work.
#[derive(Clone)]
pub struct FollowUpSender {
    tx: mpsc::UnboundedSender<FollowUp>,
}

impl std::fmt::Debug for FollowUpSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FollowUpSender")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl FollowUpSender {
    pub fn submit<F>(&self, channel: impl Into<String>, job: F)
    where
        F: Future<Output = FollowUpResult> + Send + 'static,
    {
        let follow_up = FollowUp {
            channel: channel.into(),
            job: job.boxed(),
        };
        if let Err(rejected) = self.tx.send(follow_up) {
            warn!(
                "Follow-up worker has stopped, dropping reply for channel {}",
                rejected.0.channel
            );
        }
    }
}

/// Starts the worker. It exits once every sender is dropped and all jobs finished.
pub fn spawn_follow_up_worker(chat: Arc<dyn ChatPoster>) -> (FollowUpSender, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let worker = tokio::spawn(run(rx, chat));
    (FollowUpSender { tx }, worker)
}

async fn run(mut rx: mpsc::UnboundedReceiver<FollowUp>, chat: Arc<dyn ChatPoster>) {
    let mut tasks = JoinSet::new();

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Some(follow_up) => {
                    tasks.spawn(deliver(Arc::clone(&chat), follow_up));
                }
                None => break,
            },
            Some(joined) = tasks.join_next(), if !tasks.is_empty() => log_outcome(joined),
        }
    }

    debug!("Draining {} in-flight follow-up(s)", tasks.len());
    while let Some(joined) = tasks.join_next().await {
        log_outcome(joined);
    }
}

async fn deliver(chat: Arc<dyn ChatPoster>, follow_up: FollowUp) -> Result<(), RescheduleError> {
    let FollowUp { channel, job } = follow_up;

    match job.await? {
        Some(attachment) => chat.post_attachment(&channel, &attachment).await?,
        None => debug!("Follow-up for channel {} finished without a reply", channel),
    }
    Ok(())
}

fn log_outcome(joined: Result<Result<(), RescheduleError>, JoinError>) {
    match joined {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            error!("Follow-up failed: {}", err);
            #[cfg(feature = "sentry-monitoring")]
            sentry::capture_error(&err);
        }
        Err(err) => {
            error!("Follow-up task did not complete: {}", err);
            #[cfg(feature = "sentry-monitoring")]
            sentry::capture_message(
                &format!("Follow-up task did not complete: {}", err),
                sentry::Level::Error,
            );
        }
    }
}
