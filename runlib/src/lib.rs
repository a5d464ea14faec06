mod actors;
pub mod artifacts;
pub mod config;
pub mod error;
pub mod events;
pub mod pipeline;
pub mod process;
pub mod result;
pub mod types;

// re-export the coordinator handle as if it is the coordinator itself.
pub use actors::coordinator::{Completed, JobCoordinatorHandle as JobCoordinator};
pub use config::PipelineConfig;
pub use error::{ErrorKind, Failure};
pub use events::JobState;
pub use pipeline::Pipeline;
pub use result::JobResult;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Toolchain;
    use crate::events::StateChange;
    use crate::types::{Job, Language};
    use std::path::Path;
    use std::time::{Duration, Instant};
    use tokio::sync::mpsc;

    /// Stands in for a C++ compiler: "compiles" a shell script by copying it to the output path,
    /// and rejects any source containing COMPILE_ERROR.
    const FAKE_CC: &str = r#"
if grep -q COMPILE_ERROR "$3"; then
    echo "$3:3:1: error: expected ';' before '}' token" >&2
    exit 1
fi
cp "$3" "$2" && chmod +x "$2"
"#;

    fn fake_toolchain() -> Toolchain {
        Toolchain::new(Language::Cpp, "sh")
            .flag("-c")
            .flag(FAKE_CC)
            .flag("fake-cc")
    }

    fn config(dir: &Path) -> PipelineConfig {
        PipelineConfig::default()
            .workspace_dir(dir)
            .toolchain(fake_toolchain())
            .compile_timeout(Duration::from_secs(5))
            .execute_timeout(Duration::from_secs(5))
    }

    fn leftovers(dir: &Path) -> usize {
        std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
    }

    fn failure(result: JobResult) -> Failure {
        match result {
            JobResult::Failure(failure) => failure,
            other => panic!("expected a failure, got {:?}", other),
        }
    }

    async fn states_of(pipeline: &Pipeline, job: Job) -> (JobResult, Vec<JobState>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<StateChange>();
        let result = pipeline.run_observed(job, Some(tx)).await;
        let mut states = vec![];
        while let Some(change) = rx.recv().await {
            states.push(change.state);
        }
        (result, states)
    }

    #[tokio::test]
    async fn echoes_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(config(dir.path()));
        let result = pipeline.run(Job::new("#!/bin/sh\nexec cat\n", "hello")).await;
        assert_eq!(
            result,
            JobResult::Success {
                output: "hello".into()
            }
        );
        assert_eq!(leftovers(dir.path()), 0);
    }

    #[tokio::test]
    async fn finishes_when_the_program_exits_despite_background_children() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(config(dir.path()));
        let started = Instant::now();
        let result = pipeline
            .run(Job::new("#!/bin/sh\nsleep 30 &\necho hi\n", ""))
            .await;
        assert_eq!(result, JobResult::Success { output: "hi\n".into() });
        assert!(started.elapsed() < Duration::from_secs(4));
        assert_eq!(leftovers(dir.path()), 0);
    }

    #[tokio::test]
    async fn compile_error_never_executes() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("ran");
        let source = format!(
            "#!/bin/sh\ntouch {}\n# COMPILE_ERROR\n",
            marker.display()
        );
        let workspace = dir.path().join("programs");
        let pipeline = Pipeline::new(config(&workspace));
        let (result, states) = states_of(&pipeline, Job::new(source, "")).await;

        let failure = failure(result);
        assert_eq!(failure.kind, ErrorKind::CompileError);
        assert!(failure.message.contains("error: expected ';'"));
        assert!(!marker.exists());
        assert_eq!(
            states,
            vec![
                JobState::Created,
                JobState::Compiling,
                JobState::CleaningUp,
                JobState::Done
            ]
        );
        assert_eq!(leftovers(&workspace), 0);
    }

    #[tokio::test]
    async fn stderr_is_a_runtime_error_and_stdout_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(config(dir.path()));
        let source = "#!/bin/sh\necho partial\necho boom >&2\nexit 0\n";
        let failure = failure(pipeline.run(Job::new(source, "")).await);
        assert_eq!(failure.kind, ErrorKind::RuntimeError);
        assert_eq!(failure.message, "boom\n");
        assert_eq!(leftovers(dir.path()), 0);
    }

    #[tokio::test]
    async fn infinite_loop_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path()).execute_timeout(Duration::from_secs(1));
        let pipeline = Pipeline::new(config);

        let started = Instant::now();
        let source = "#!/bin/sh\nwhile :; do :; done\n";
        let failure = failure(pipeline.run(Job::new(source, "")).await);
        let elapsed = started.elapsed();

        assert_eq!(failure.kind, ErrorKind::ExecutionTimeout);
        assert!(failure.message.contains("exceeded 1 seconds"));
        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed < Duration::from_secs(4));
        assert_eq!(leftovers(dir.path()), 0);
    }

    #[tokio::test]
    async fn output_flood_is_capped() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(config(dir.path()).output_cap(1024));
        let failure = failure(pipeline.run(Job::new("#!/bin/sh\nexec yes\n", "")).await);
        assert_eq!(failure.kind, ErrorKind::OutputLimitExceeded);
        assert_eq!(leftovers(dir.path()), 0);
    }

    #[tokio::test]
    async fn capped_output_fails_even_on_clean_exit() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(config(dir.path()).output_cap(1024));
        let source = "#!/bin/sh\nhead -c 5000 /dev/zero\nexit 0\n";
        let failure = failure(pipeline.run(Job::new(source, "")).await);
        assert_eq!(failure.kind, ErrorKind::OutputLimitExceeded);
    }

    #[tokio::test]
    async fn slow_compiler_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let toolchain = Toolchain::new(Language::Cpp, "sh")
            .flag("-c")
            .flag("exec sleep 5")
            .flag("slow-cc");
        let config = config(dir.path())
            .toolchain(toolchain)
            .compile_timeout(Duration::from_millis(300));
        let failure = failure(Pipeline::new(config).run(Job::new("", "")).await);
        assert_eq!(failure.kind, ErrorKind::CompileTimeout);
        assert_eq!(leftovers(dir.path()), 0);
    }

    #[tokio::test]
    async fn missing_compiler_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let toolchain = Toolchain::new(Language::Cpp, "/nonexistent/bin/c++");
        let config = config(dir.path()).toolchain(toolchain);
        let failure = failure(Pipeline::new(config).run(Job::new("", "")).await);
        assert_eq!(failure.kind, ErrorKind::SpawnError);
        assert_eq!(leftovers(dir.path()), 0);
    }

    #[tokio::test]
    async fn unwritable_workspace_fails_allocation() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let pipeline = Pipeline::new(config(file.path()));
        let (result, states) = states_of(&pipeline, Job::new("", "")).await;
        assert_eq!(failure(result).kind, ErrorKind::ArtifactCreationError);
        assert_eq!(
            states,
            vec![JobState::Created, JobState::CleaningUp, JobState::Done]
        );
    }

    #[tokio::test]
    async fn successful_job_walks_every_state() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(config(dir.path()));
        let (result, states) =
            states_of(&pipeline, Job::new("#!/bin/sh\nprintf ok\n", "")).await;
        assert!(result.is_success());
        assert_eq!(
            states,
            vec![
                JobState::Created,
                JobState::Compiling,
                JobState::Executing,
                JobState::CleaningUp,
                JobState::Done
            ]
        );
    }

    #[tokio::test]
    async fn coordinator_runs_jobs_concurrently() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = JobCoordinator::spawn(config(dir.path()), 16);

        let submissions = (0..8).map(|i| {
            let coordinator = coordinator.clone();
            tokio::spawn(async move {
                let completed = coordinator
                    .submit("#!/bin/sh\nexec cat\n".into(), format!("job {}", i))
                    .await
                    .expect("coordinator exited");
                (i, completed)
            })
        });
        let mut ids = std::collections::HashSet::new();
        for handle in submissions.collect::<Vec<_>>() {
            let (i, completed) = handle.await.unwrap();
            assert_eq!(
                completed.result,
                JobResult::Success {
                    output: format!("job {}", i)
                }
            );
            assert!(ids.insert(completed.job_id));
        }
        assert_eq!(leftovers(dir.path()), 0);

        // the coordinator retires jobs asynchronously
        let deadline = Instant::now() + Duration::from_secs(5);
        while !coordinator.in_flight().await.unwrap().is_empty() {
            assert!(Instant::now() < deadline, "jobs never retired");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn coordinator_tracks_running_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = JobCoordinator::spawn(config(dir.path()), 16);

        let submitter = coordinator.clone();
        let running = tokio::spawn(async move {
            submitter
                .submit("#!/bin/sh\nsleep 1\nprintf late\n".into(), String::new())
                .await
                .unwrap()
        });

        let deadline = Instant::now() + Duration::from_secs(5);
        let job_id = loop {
            let jobs = coordinator.in_flight().await.unwrap();
            if let Some((job_id, JobState::Executing)) = jobs.first().copied() {
                break job_id;
            }
            assert!(Instant::now() < deadline, "job never started executing");
            tokio::time::sleep(Duration::from_millis(10)).await;
        };
        assert_eq!(
            coordinator.job_state(job_id).await.unwrap(),
            JobState::Executing
        );

        let completed = running.await.unwrap();
        assert_eq!(completed.job_id, job_id);
        assert_eq!(
            completed.result,
            JobResult::Success {
                output: "late".into()
            }
        );

        let deadline = Instant::now() + Duration::from_secs(5);
        while coordinator.job_state(job_id).await.is_ok() {
            assert!(Instant::now() < deadline, "job never retired");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(matches!(
            coordinator.job_state(job_id).await,
            Err(error::Error::NotFound)
        ));
    }

    /// Exercises the real toolchain when one is installed.
    #[tokio::test]
    async fn compiles_cpp_with_gxx() {
        let has_gxx = std::process::Command::new("g++")
            .arg("--version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false);
        if !has_gxx {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::default()
            .workspace_dir(dir.path())
            .compile_timeout(Duration::from_secs(60));
        let pipeline = Pipeline::new(config);

        let echo = r#"
#include <iostream>
#include <string>
int main() {
    std::string line;
    while (std::getline(std::cin, line)) std::cout << line;
    return 0;
}
"#;
        let result = pipeline.run(Job::new(echo, "hello")).await;
        assert_eq!(
            result,
            JobResult::Success {
                output: "hello".into()
            }
        );

        let broken = "int main() { return 0 }";
        let failure = failure(pipeline.run(Job::new(broken, "")).await);
        assert_eq!(failure.kind, ErrorKind::CompileError);
        assert!(!failure.message.is_empty());
        assert_eq!(leftovers(dir.path()), 0);
    }
}
