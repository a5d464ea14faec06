use protobuf::{
    code_runner_client::CodeRunnerClient, CompileRequest, JobState, Language, ListJobsRequest,
};
use tonic::{transport::Channel, Status};

const FAILURE_KIND_KEY: &str = "x-failure-kind";

pub struct ClientCli {
    inner: CodeRunnerClient<Channel>,
}

impl ClientCli {
    pub async fn connect(server_addr: &str) -> Result<Self, tonic::transport::Error> {
        let inner = CodeRunnerClient::connect(server_addr.to_string()).await?;
        Ok(Self { inner })
    }

    /// Compile and run `code`, printing the program's output on success.
    pub async fn run(&mut self, code: String, input: String) -> Result<(), Status> {
        let request = tonic::Request::new(CompileRequest {
            code,
            language: Language::Cpp as i32,
            input,
        });
        let response = self.inner.compile(request).await?.into_inner();
        print!("{}", response.output);
        Ok(())
    }

    pub async fn list_jobs(&mut self) -> Result<(), Status> {
        let jobs = self
            .inner
            .list_jobs(tonic::Request::new(ListJobsRequest {}))
            .await?
            .into_inner()
            .jobs;
        if jobs.is_empty() {
            println!("No jobs in flight");
        }
        for job in jobs {
            let state = match JobState::from_i32(job.state) {
                Some(JobState::Created) => "created",
                Some(JobState::Compiling) => "compiling",
                Some(JobState::Executing) => "executing",
                Some(JobState::CleaningUp) => "cleaning up",
                Some(JobState::Unspecified) | None => "unknown",
            };
            println!("{}  {}", job.job_id, state);
        }
        Ok(())
    }
}

/// The failure kind the server attached to a failed compile, if any.
pub fn failure_kind(status: &Status) -> Option<&str> {
    status
        .metadata()
        .get(FAILURE_KIND_KEY)
        .and_then(|value| value.to_str().ok())
}
