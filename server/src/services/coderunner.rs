mod validation;
use self::validation::{validate, Submission};

use log::{info, warn};
use protobuf::code_runner_server::CodeRunner;
use protobuf::{
    CompileRequest, CompileResponse, Job, JobState as WireJobState, ListJobsRequest,
    ListJobsResponse,
};
use runlib::types::Language;
use runlib::{Completed, Failure, JobCoordinator, JobState, PipelineConfig};
use tonic::metadata::MetadataValue;
use tonic::{Request, Response, Status};

pub const FAILURE_KIND_KEY: &str = "x-failure-kind";

// tonic wraps this in Arc anyway internally, so we don't need Arc
pub struct CodeRunnerService {
    coordinator: JobCoordinator,
    language: Language,
}

impl CodeRunnerService {
    pub fn new(config: PipelineConfig, channel_capacity: usize) -> Self {
        let language = config.toolchain.language;
        Self {
            coordinator: JobCoordinator::spawn(config, channel_capacity),
            language,
        }
    }
}

/// Pipeline failures surface as INTERNAL, the gRPC counterpart of a 500.
fn failure_status(failure: &Failure) -> Status {
    let mut status = Status::internal(failure.message.clone());
    status.metadata_mut().insert(
        FAILURE_KIND_KEY,
        MetadataValue::from_static(failure.kind.as_str()),
    );
    status
}

fn wire_state(state: JobState) -> WireJobState {
    match state {
        JobState::Created => WireJobState::Created,
        JobState::Compiling => WireJobState::Compiling,
        JobState::Executing => WireJobState::Executing,
        JobState::CleaningUp => WireJobState::CleaningUp,
        // retired jobs are never listed
        JobState::Done => WireJobState::Unspecified,
    }
}

#[tonic::async_trait]
impl CodeRunner for CodeRunnerService {
    async fn compile(
        &self,
        req: Request<CompileRequest>,
    ) -> Result<Response<CompileResponse>, Status> {
        let Submission { code, input } = validate(req.into_inner(), self.language)
            .map_err(|err| Status::invalid_argument(format!("Invalid request body: {}", err)))?;

        let Completed { job_id, result } = self
            .coordinator
            .submit(code, input)
            .await
            .map_err(|err| Status::unavailable(err.to_string()))?;

        let output = Result::<String, Failure>::from(result).map_err(|failure| {
            info!("job {} returned {}", job_id, failure.kind);
            failure_status(&failure)
        })?;
        Ok(Response::new(CompileResponse {
            job_id: job_id.to_string(),
            output,
        }))
    }

    async fn list_jobs(
        &self,
        _req: Request<ListJobsRequest>,
    ) -> Result<Response<ListJobsResponse>, Status> {
        let in_flight = self.coordinator.in_flight().await.map_err(|err| {
            warn!("list jobs: {}", err);
            Status::unavailable(err.to_string())
        })?;
        let jobs = in_flight
            .into_iter()
            .map(|(job_id, state)| Job {
                job_id: job_id.to_string(),
                state: wire_state(state) as i32,
            })
            .collect();
        Ok(Response::new(ListJobsResponse { jobs }))
    }
}
