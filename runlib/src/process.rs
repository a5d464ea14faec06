mod capture;

use crate::config::SuccessPolicy;
use crate::error::ProcessError;
use crate::types::OutputBlob;
use capture::Overflow;
use log::{debug, warn};
use nix::{
    errno::Errno,
    sys::signal::{killpg, Signal},
    unistd::Pid,
};
use std::{
    ffi::OsString,
    os::unix::process::ExitStatusExt,
    process::{ExitStatus, Stdio},
    time::Duration,
};
use tokio::{
    io::AsyncWriteExt,
    process::{Child, ChildStderr, ChildStdin, ChildStdout, Command},
    select, time,
};

/// A program and its arguments.
#[derive(Clone, Debug)]
pub struct Invocation {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// Bounds and input for a single run.
#[derive(Clone, Debug)]
pub struct RunOptions {
    pub stdin: Option<String>,
    pub deadline: Duration,
    pub output_cap: Option<usize>,
    pub policy: SuccessPolicy,
}

impl RunOptions {
    pub fn new(deadline: Duration) -> Self {
        Self {
            stdin: None,
            deadline,
            output_cap: None,
            policy: SuccessPolicy::default(),
        }
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn output_cap(mut self, bytes: usize) -> Self {
        self.output_cap = Some(bytes);
        self
    }

    pub fn policy(mut self, policy: SuccessPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Run `invocation` to completion and return its stdout.
///
/// The process races a timer of `options.deadline`. If the timer wins, or stdout grows past
/// `options.output_cap`, the process and everything it started are killed, and the process is
/// reaped before this returns. Whatever it printed is thrown away in that case.
pub async fn run(invocation: &Invocation, options: RunOptions) -> Result<String, ProcessError> {
    let mut child = Command::new(&invocation.program)
        .args(&invocation.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0)
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ProcessError::Spawn {
            program: invocation.program.to_string_lossy().into_owned(),
            source,
        })?;
    debug!("spawned {:?} (pid {:?})", invocation.program, child.id());
    // the child leads its own group, so the group id is its pid
    let group = child.id().map(|pid| Pid::from_raw(pid as i32));

    let stdin = child.stdin.take();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let RunOptions {
        stdin: input,
        deadline,
        output_cap,
        policy,
    } = options;

    let outcome = select! {
        finished = supervise(&mut child, group, stdin, input, stdout, stderr, output_cap) => Some(finished),
        _ = time::sleep(deadline) => None,
    };

    match outcome {
        Some(Ok((status, stdout, stderr))) => judge(policy, status, stdout, stderr),
        Some(Err(err)) => {
            kill(&mut child, group).await;
            Err(err)
        }
        None => {
            debug!("{:?} hit its {:?} deadline", invocation.program, deadline);
            kill(&mut child, group).await;
            Err(ProcessError::Timeout(deadline))
        }
    }
}

/// Feed stdin, drain both output pipes and reap the child, all concurrently.
///
/// Once the child exits, whatever it left behind in its process group is killed so that
/// nothing else holds the pipes open and draining ends with the child.
async fn supervise(
    child: &mut Child,
    group: Option<Pid>,
    stdin: Option<ChildStdin>,
    input: Option<String>,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
    output_cap: Option<usize>,
) -> Result<(ExitStatus, OutputBlob, OutputBlob), ProcessError> {
    let exited = async {
        let status = child.wait().await?;
        kill_group(group);
        Ok::<_, ProcessError>(status)
    };
    let (_, stdout, stderr, status) = tokio::try_join!(
        feed(stdin, input),
        capture::drain(stdout, output_cap, Overflow::Abort),
        capture::drain(stderr, output_cap, Overflow::Truncate),
        exited,
    )?;
    Ok((status, stdout, stderr))
}

/// Write the input, then close the pipe so a reading process sees end of file.
async fn feed(stdin: Option<ChildStdin>, input: Option<String>) -> Result<(), ProcessError> {
    if let (Some(mut stdin), Some(input)) = (stdin, input) {
        // a process is free to exit without reading its input
        if let Err(err) = stdin.write_all(input.as_bytes()).await {
            debug!("stdin not fully written: {}", err);
        }
    }
    Ok(())
}

/// Kill the whole process group, then reap the child unless it was already reaped.
async fn kill(child: &mut Child, group: Option<Pid>) {
    kill_group(group);
    if let Ok(Some(_)) = child.try_wait() {
        return;
    }
    if let Err(err) = child.kill().await {
        warn!("failed to kill pid {:?}: {}", child.id(), err);
    }
}

fn kill_group(group: Option<Pid>) {
    let group = match group {
        Some(group) => group,
        None => return,
    };
    match killpg(group, Signal::SIGKILL) {
        // an empty group is already gone
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(err) => warn!("failed to kill process group {}: {}", group, err),
    }
}

fn judge(
    policy: SuccessPolicy,
    status: ExitStatus,
    stdout: OutputBlob,
    stderr: OutputBlob,
) -> Result<String, ProcessError> {
    let stderr = String::from_utf8_lossy(&stderr).into_owned();
    let failed = match policy {
        SuccessPolicy::StderrEmpty => !stderr.is_empty(),
        SuccessPolicy::ExitStatus => !status.success(),
    };
    if !failed {
        return Ok(String::from_utf8_lossy(&stdout).into_owned());
    }
    if !stderr.is_empty() {
        return Err(ProcessError::Failed(stderr));
    }
    let reason = match (status.code(), status.signal()) {
        (Some(code), _) => format!("Process exited with code {}", code),
        (None, Some(signal)) => format!("Process was killed by signal {}", signal),
        (None, None) => "Process exited abnormally".to_string(),
    };
    Err(ProcessError::Failed(reason))
}
