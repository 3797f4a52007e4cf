//! Pull-driven workflow message feed
//!
//! A producer task owns the run. It waits for a demand signal, computes one
//! stage and sends the resulting message. Dropping the `WorkflowStream`
//! closes both channels, so the producer stops after the stage in flight
//! (if any) without starting another.

use crate::types::{MessageKind, WorkflowMessage};
use futures::Stream;
use tokio::sync::mpsc;
use tracing::{debug, info_span, Instrument};
use uuid::Uuid;

use super::core::{WorkflowOrchestrator, WorkflowRun};

/// Lazy, finite, non-restartable sequence of workflow messages
pub struct WorkflowStream {
    query: String,
    demand: mpsc::Sender<()>,
    messages: mpsc::Receiver<WorkflowMessage>,
}

impl WorkflowStream {
    pub(crate) fn spawn(orchestrator: WorkflowOrchestrator, query: String) -> Self {
        let (demand_tx, mut demand_rx) = mpsc::channel::<()>(1);
        let (message_tx, message_rx) = mpsc::channel::<WorkflowMessage>(1);

        let span = info_span!("workflow", run_id = %Uuid::new_v4(), mode = "stream");
        let mut run = WorkflowRun::new(query.clone(), orchestrator.config.max_iterations);

        tokio::spawn(
            async move {
                while demand_rx.recv().await.is_some() {
                    let message = match orchestrator.step(&mut run).await {
                        Ok(Some(message)) => message,
                        Ok(None) => break,
                        Err(e) => WorkflowMessage::error(e.to_string()),
                    };
                    let terminal = message.kind == MessageKind::Error;

                    if message_tx.send(message).await.is_err() {
                        debug!("Stream consumer disconnected");
                        break;
                    }
                    if terminal {
                        break;
                    }
                }
                debug!(phase = ?run.phase, "Workflow producer finished");
            }
            .instrument(span),
        );

        Self {
            query,
            demand: demand_tx,
            messages: message_rx,
        }
    }

    /// The query this stream answers
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Compute the next stage and return its message, or `None` when the
    /// run has finished.
    pub async fn next(&mut self) -> Option<WorkflowMessage> {
        if self.demand.send(()).await.is_err() {
            return None;
        }
        self.messages.recv().await
    }

    /// Adapt into a `futures::Stream`
    pub fn into_stream(self) -> impl Stream<Item = WorkflowMessage> + Send + 'static {
        futures::stream::unfold(self, |mut stream| async move {
            stream.next().await.map(|message| (message, stream))
        })
    }
}
