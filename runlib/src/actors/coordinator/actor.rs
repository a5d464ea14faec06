use super::messages::CoordinatorMessage;
use super::Completed;
use crate::error::{self, Error as JobError};
use crate::events::{JobState, StateChange};
use crate::pipeline::Pipeline;
use crate::types::{Job, JobId};
use log::debug;
use std::collections::HashMap;
use tokio::{
    select,
    sync::{mpsc, oneshot},
};
use uuid::Uuid;

pub struct JobCoordinator {
    inbox: mpsc::Receiver<CoordinatorMessage>,
    state_tx: mpsc::UnboundedSender<StateChange>,
    state_rx: mpsc::UnboundedReceiver<StateChange>,
    pipeline: Pipeline,
    jobs: HashMap<JobId, JobState>,
}

impl JobCoordinator {
    pub fn spawn(inbox: mpsc::Receiver<CoordinatorMessage>, pipeline: Pipeline) {
        let (state_tx, state_rx) = mpsc::unbounded_channel();
        let actor = Self {
            inbox,
            state_tx,
            state_rx,
            pipeline,
            jobs: HashMap::new(),
        };
        tokio::spawn(async move { actor.run().await });
    }

    async fn run(mut self) {
        use self::CoordinatorMessage::*;
        loop {
            select! {
                maybe_msg = self.inbox.recv() => {
                    match maybe_msg {
                        Some(Submit { source_code, input, response }) => {
                            self.submit(source_code, input, response);
                        }
                        Some(GetState { job_id, response }) => {
                            self.get_job_state(job_id, response);
                        }
                        Some(InFlight { response }) => {
                            let _ = response.send(self.in_flight());
                        }
                        // every handle dropped; running jobs finish on their own tasks
                        None => return,
                    }
                }
                Some(change) = self.state_rx.recv() => {
                    self.apply(change);
                }
            }
        }
    }

    /// A fresh v4 id that no in-flight job is using.
    fn next_job_id(&self) -> JobId {
        loop {
            let job_id = Uuid::new_v4();
            if !self.jobs.contains_key(&job_id) {
                return job_id;
            }
        }
    }

    fn submit(&mut self, source_code: String, input: String, response: oneshot::Sender<Completed>) {
        let job_id = self.next_job_id();
        // registered before the task starts so the id is reserved from this point on
        self.jobs.insert(job_id, JobState::Created);

        let pipeline = self.pipeline.clone();
        let observer = self.state_tx.clone();
        let job = Job::with_id(job_id, source_code, input);
        tokio::spawn(async move {
            let result = pipeline.run_observed(job, Some(observer)).await;
            let _ = response.send(Completed { job_id, result });
        });
    }

    fn get_job_state(&self, job_id: JobId, response: oneshot::Sender<error::Result<JobState>>) {
        let state = self.jobs.get(&job_id).copied().ok_or(JobError::NotFound);
        let _ = response.send(state);
    }

    fn in_flight(&self) -> Vec<(JobId, JobState)> {
        self.jobs.iter().map(|(id, state)| (*id, *state)).collect()
    }

    fn apply(&mut self, StateChange { job_id, state }: StateChange) {
        if state == JobState::Done {
            debug!("job {} retired", job_id);
            self.jobs.remove(&job_id);
        } else if let Some(current) = self.jobs.get_mut(&job_id) {
            *current = state;
        }
    }
}
