use clap::{ArgEnum, Parser};
use runlib::config::{self, PipelineConfig, SuccessPolicy, Toolchain};
use runlib::types::Language;
use std::{net::SocketAddr, path::PathBuf, time::Duration};

/// Serve the CodeRunner gRPC API: compile submitted C++ and run it against the given input
#[derive(Debug, Parser)]
#[clap(author, version)]
pub struct ServerArgs {
    /// Address to listen on
    #[clap(long, env = "RUNNER_ADDR", default_value = "127.0.0.1:50051")]
    pub addr: SocketAddr,

    /// Directory holding the per-job source files and binaries
    #[clap(long, env = "RUNNER_WORKSPACE_DIR", default_value = "programs")]
    pub workspace_dir: PathBuf,

    /// Seconds a compilation may take before it is killed
    #[clap(long, env = "RUNNER_COMPILE_TIMEOUT_SECS", default_value_t = 10.0)]
    pub compile_timeout_secs: f64,

    /// Seconds a program may run before it is killed
    #[clap(long, env = "RUNNER_EXECUTE_TIMEOUT_SECS", default_value_t = 10.0)]
    pub execute_timeout_secs: f64,

    /// Bytes of stdout a program may write before it is killed
    #[clap(long, env = "RUNNER_OUTPUT_CAP", default_value_t = config::DEFAULT_OUTPUT_CAP)]
    pub output_cap: usize,

    /// Compiler executable, invoked as `<compiler> [flags] -o <binary> <source>`
    #[clap(long, env = "RUNNER_COMPILER", default_value = "g++")]
    pub compiler: String,

    /// Extra flag passed to the compiler, may be repeated
    #[clap(long = "compiler-flag", multiple_occurrences = true, allow_hyphen_values = true)]
    pub compiler_flags: Vec<String>,

    /// How a finished process is judged
    #[clap(long, arg_enum, default_value = "stderr-empty")]
    pub success_policy: Policy,

    /// Capacity of the job coordinator's message queue
    #[clap(long, default_value_t = 64)]
    pub channel_capacity: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ArgEnum)]
pub enum Policy {
    /// any output on stderr fails the step
    StderrEmpty,
    /// a non-zero exit status fails the step
    ExitStatus,
}

impl From<Policy> for SuccessPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::StderrEmpty => SuccessPolicy::StderrEmpty,
            Policy::ExitStatus => SuccessPolicy::ExitStatus,
        }
    }
}

impl ServerArgs {
    pub fn pipeline_config(&self) -> PipelineConfig {
        let toolchain = self
            .compiler_flags
            .iter()
            .fold(Toolchain::new(Language::Cpp, &self.compiler), |toolchain, flag| {
                toolchain.flag(flag)
            });
        PipelineConfig::default()
            .workspace_dir(&self.workspace_dir)
            .compile_timeout(Duration::from_secs_f64(self.compile_timeout_secs))
            .execute_timeout(Duration::from_secs_f64(self.execute_timeout_secs))
            .output_cap(self.output_cap)
            .toolchain(toolchain)
            .success_policy(self.success_policy.into())
    }
}
