use crate::types::JobId;
use std::fmt;

/// Where a job is in the pipeline. Every job passes through `CleaningUp` before `Done`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobState {
    Created,
    Compiling,
    Executing,
    CleaningUp,
    Done,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Created => "created",
            JobState::Compiling => "compiling",
            JobState::Executing => "executing",
            JobState::CleaningUp => "cleaning up",
            JobState::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct StateChange {
    pub job_id: JobId,
    pub state: JobState,
}
