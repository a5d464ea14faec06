mod arg_parser;
mod client_cli;

use arg_parser::{ArgParser, SubCommand};
use client_cli::{failure_kind, ClientCli};

use clap::Parser;
use std::{error, process};

#[tokio::main]
async fn main() -> Result<(), Box<dyn error::Error>> {
    let args = ArgParser::parse();
    let mut client = ClientCli::connect(&args.server).await?;

    let outcome = match args.sub_command {
        SubCommand::Run {
            source,
            input,
            input_file,
        } => {
            let code = tokio::fs::read_to_string(&source).await?;
            let input = match (input, input_file) {
                (Some(input), _) => input,
                (None, Some(path)) => tokio::fs::read_to_string(path).await?,
                (None, None) => String::new(),
            };
            client.run(code, input).await
        }
        SubCommand::Jobs => client.list_jobs().await,
    };

    if let Err(status) = outcome {
        match failure_kind(&status) {
            Some(kind) => eprintln!("{}: {}", kind, status.message()),
            None => eprintln!("{:?}: {}", status.code(), status.message()),
        }
        process::exit(1);
    }

    Ok(())
}
