use crate::types::Language;
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    time::Duration,
};

pub const DEFAULT_WORKSPACE_DIR: &str = "programs";
pub const DEFAULT_COMPILE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_EXECUTE_TIMEOUT: Duration = Duration::from_secs(10);
/// 64 MiB of stdout.
pub const DEFAULT_OUTPUT_CAP: usize = 64 * 1024 * 1024;
pub const DEFAULT_COMPILER: &str = "g++";

/// How a process that ran to completion is judged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuccessPolicy {
    /// Any byte on stderr is a failure, the exit status is ignored.
    StderrEmpty,
    /// A non-zero exit status or a signal is a failure, stderr is ignored.
    ExitStatus,
}

impl Default for SuccessPolicy {
    fn default() -> Self {
        SuccessPolicy::StderrEmpty
    }
}

/// The external compiler, invoked as `compiler [flags...] -o <binary> <source>`.
#[derive(Clone, Debug)]
pub struct Toolchain {
    pub language: Language,
    pub compiler: OsString,
    pub flags: Vec<OsString>,
}

impl Toolchain {
    pub fn new(language: Language, compiler: impl Into<OsString>) -> Self {
        Self {
            language,
            compiler: compiler.into(),
            flags: Vec::new(),
        }
    }

    pub fn flag(mut self, flag: impl Into<OsString>) -> Self {
        self.flags.push(flag.into());
        self
    }

    pub fn compile_args(&self, binary: &Path, source: &Path) -> Vec<OsString> {
        let mut args = self.flags.clone();
        args.push("-o".into());
        args.push(binary.into());
        args.push(source.into());
        args
    }
}

impl Default for Toolchain {
    fn default() -> Self {
        Self::new(Language::Cpp, DEFAULT_COMPILER)
    }
}

/// Limits and locations shared by every job of a pipeline.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub workspace_dir: PathBuf,
    pub compile_timeout: Duration,
    pub execute_timeout: Duration,
    pub output_cap: usize,
    pub toolchain: Toolchain,
    pub success_policy: SuccessPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workspace_dir: PathBuf::from(DEFAULT_WORKSPACE_DIR),
            compile_timeout: DEFAULT_COMPILE_TIMEOUT,
            execute_timeout: DEFAULT_EXECUTE_TIMEOUT,
            output_cap: DEFAULT_OUTPUT_CAP,
            toolchain: Toolchain::default(),
            success_policy: SuccessPolicy::default(),
        }
    }
}

impl PipelineConfig {
    pub fn workspace_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workspace_dir = dir.into();
        self
    }

    pub fn compile_timeout(mut self, timeout: Duration) -> Self {
        self.compile_timeout = timeout;
        self
    }

    pub fn execute_timeout(mut self, timeout: Duration) -> Self {
        self.execute_timeout = timeout;
        self
    }

    pub fn output_cap(mut self, bytes: usize) -> Self {
        self.output_cap = bytes;
        self
    }

    pub fn toolchain(mut self, toolchain: Toolchain) -> Self {
        self.toolchain = toolchain;
        self
    }

    pub fn success_policy(mut self, policy: SuccessPolicy) -> Self {
        self.success_policy = policy;
        self
    }
}
