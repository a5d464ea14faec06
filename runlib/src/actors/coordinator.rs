mod actor;
mod messages;

use self::{
    actor::JobCoordinator,
    messages::CoordinatorMessage::{self, GetState, InFlight, Submit},
};
use crate::config::PipelineConfig;
use crate::error::{self, Error as JobError};
use crate::events::JobState;
use crate::pipeline::Pipeline;
use crate::result::JobResult;
use crate::types::JobId;
use tokio::sync::{mpsc, oneshot};

/// The outcome of a submitted job together with the id it ran under.
#[derive(Clone, Debug)]
pub struct Completed {
    pub job_id: JobId,
    pub result: JobResult,
}

/// A `JobCoordinator` which assigns job ids, runs each job's pipeline on its own task and tracks
/// the jobs still in flight.
///
/// This struct is actually an actor handle, the real work is done in the actor spawned by
/// `JobCoordinatorHandle::spawn`. The handle can be cloned freely across tasks without any
/// `Arc<Mutex>`, and because a single actor hands out every id, no two in-flight jobs ever share one.
#[derive(Clone)]
pub struct JobCoordinatorHandle {
    sender: mpsc::Sender<CoordinatorMessage>,
}

impl JobCoordinatorHandle {
    /// Spawn a new coordinator.
    ///
    /// Specify the capacity for the coordinator's message queue. This limits the build-up of inbound messages.
    pub fn spawn(config: PipelineConfig, message_capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(message_capacity);
        JobCoordinator::spawn(receiver, Pipeline::new(config));
        Self { sender }
    }

    /// Compile and run `source_code` against `input`, resolving once the job is done and cleaned up.
    pub async fn submit(&self, source_code: String, input: String) -> error::Result<Completed> {
        let (tx, rx) = oneshot::channel();
        self.send(Submit {
            source_code,
            input,
            response: tx,
        })
        .await?;
        rx.await.map_err(|_| JobError::CoordinatorExited)
    }

    /// State of a job that has not finished yet. Finished jobs are `NotFound`.
    pub async fn job_state(&self, job_id: JobId) -> error::Result<JobState> {
        let (tx, rx) = oneshot::channel();
        self.send(GetState {
            job_id,
            response: tx,
        })
        .await?;
        rx.await.map_err(|_| JobError::CoordinatorExited)?
    }

    pub async fn in_flight(&self) -> error::Result<Vec<(JobId, JobState)>> {
        let (tx, rx) = oneshot::channel();
        self.send(InFlight { response: tx }).await?;
        rx.await.map_err(|_| JobError::CoordinatorExited)
    }

    async fn send(&self, msg: CoordinatorMessage) -> error::Result<()> {
        self.sender
            .send(msg)
            .await
            .map_err(|_| JobError::CoordinatorExited)
    }
}
