use super::Completed;
use crate::error;
use crate::events::JobState;
use crate::types::JobId;
use tokio::sync::oneshot;

#[derive(Debug)]
pub enum CoordinatorMessage {
    Submit {
        source_code: String,
        input: String,
        response: oneshot::Sender<Completed>,
    },
    GetState {
        job_id: JobId,
        response: oneshot::Sender<error::Result<JobState>>,
    },
    InFlight {
        response: oneshot::Sender<Vec<(JobId, JobState)>>,
    },
}
