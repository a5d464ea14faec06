use crate::error::Failure;

/// The single value a finished job hands back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobResult {
    Success { output: String },
    Failure(Failure),
}

impl JobResult {
    pub fn is_success(&self) -> bool {
        matches!(self, JobResult::Success { .. })
    }
}

impl From<Result<String, Failure>> for JobResult {
    fn from(result: Result<String, Failure>) -> Self {
        match result {
            Ok(output) => JobResult::Success { output },
            Err(failure) => JobResult::Failure(failure),
        }
    }
}

impl From<JobResult> for Result<String, Failure> {
    fn from(result: JobResult) -> Self {
        match result {
            JobResult::Success { output } => Ok(output),
            JobResult::Failure(failure) => Err(failure),
        }
    }
}
