use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Submit code to a CodeRunner server
#[derive(Debug, Parser)]
pub struct ArgParser {
    /// The address of the server
    #[clap(
        short = 's',
        long = "server",
        env = "RUNNER_SERVER",
        default_value = "http://127.0.0.1:50051"
    )]
    pub server: String,
    /// The sub-command to use
    #[clap(subcommand)]
    pub sub_command: SubCommand,
}

#[derive(Clone, Debug, PartialEq, Eq, Subcommand)]
pub enum SubCommand {
    /// compile a C++ source file and run it
    Run {
        /// path to the source file
        source: PathBuf,

        #[clap(long)]
        /// text to feed to the program's stdin
        input: Option<String>,

        #[clap(long, conflicts_with = "input")]
        /// file whose contents are fed to the program's stdin
        input_file: Option<PathBuf>,
    },
    /// list jobs that are still running on the server
    Jobs,
}
