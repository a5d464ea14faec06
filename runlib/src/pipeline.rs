use crate::artifacts::ArtifactStore;
use crate::config::PipelineConfig;
use crate::error::Failure;
use crate::events::{JobState, StateChange};
use crate::process::{self, Invocation, RunOptions};
use crate::result::JobResult;
use crate::types::Job;
use log::{debug, info};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::sync::mpsc;

/// Compiles and runs submissions. Calls for different jobs may overlap freely.
///
/// Every call walks `Created -> Compiling -> Executing -> CleaningUp -> Done`, stopping early at the
/// first failure but always passing through `CleaningUp`.
#[derive(Clone)]
pub struct Pipeline {
    config: Arc<PipelineConfig>,
    store: ArtifactStore,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let store = ArtifactStore::new(
            config.workspace_dir.clone(),
            config.toolchain.language.source_extension(),
        );
        Self {
            config: Arc::new(config),
            store,
        }
    }

    pub async fn run(&self, job: Job) -> JobResult {
        self.run_observed(job, None).await
    }

    /// Like `run`, but sends every state transition to `observer`.
    pub async fn run_observed(
        &self,
        job: Job,
        observer: Option<mpsc::UnboundedSender<StateChange>>,
    ) -> JobResult {
        let job_id = job.id;
        let report = |state: JobState| {
            debug!("job {}: {}", job_id, state);
            if let Some(observer) = &observer {
                let _ = observer.send(StateChange { job_id, state });
            }
        };

        report(JobState::Created);
        let result = self.compile_and_execute(&job, &report).await;

        report(JobState::CleaningUp);
        self.store.cleanup(job_id).await;
        report(JobState::Done);

        match &result {
            Ok(output) => info!("job {}: succeeded with {} bytes of output", job_id, output.len()),
            Err(failure) => info!("job {}: failed with {}", job_id, failure.kind),
        }
        result.into()
    }

    async fn compile_and_execute(
        &self,
        job: &Job,
        report: &impl Fn(JobState),
    ) -> Result<String, Failure> {
        let config = &self.config;
        let workspace = self
            .store
            .allocate(job.id, &job.source_code)
            .await
            .map_err(Failure::artifact)?;

        report(JobState::Compiling);
        let compile = Invocation::new(config.toolchain.compiler.clone()).args(
            config
                .toolchain
                .compile_args(&workspace.binary, &workspace.source),
        );
        let options = RunOptions::new(config.compile_timeout).policy(config.success_policy);
        process::run(&compile, options)
            .await
            .map_err(Failure::compile)?;

        report(JobState::Executing);
        let execute = Invocation::new(executable(&workspace.binary).into_os_string());
        let options = RunOptions::new(config.execute_timeout)
            .stdin(job.input.as_str())
            .output_cap(config.output_cap)
            .policy(config.success_policy);
        process::run(&execute, options)
            .await
            .map_err(Failure::execute)
    }
}

/// A bare relative name would be looked up on `PATH` instead of in the workspace.
fn executable(binary: &Path) -> PathBuf {
    if binary.is_relative() {
        Path::new(".").join(binary)
    } else {
        binary.to_path_buf()
    }
}
