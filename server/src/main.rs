mod config;
mod services;

use clap::Parser;
use config::ServerArgs;
use log::info;
use protobuf::code_runner_server::CodeRunnerServer;
use services::coderunner::CodeRunnerService;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = ServerArgs::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = args.pipeline_config();
    info!(
        "workspace {}, compile timeout {:?}, execute timeout {:?}, output cap {} bytes",
        config.workspace_dir.display(),
        config.compile_timeout,
        config.execute_timeout,
        config.output_cap
    );
    let service = CodeRunnerService::new(config, args.channel_capacity);

    let listener = TcpListener::bind(args.addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    serve(listener, service).await?;

    Ok(())
}

async fn serve(
    listener: TcpListener,
    service: CodeRunnerService,
) -> Result<(), tonic::transport::Error> {
    Server::builder()
        .add_service(CodeRunnerServer::new(service))
        .serve_with_incoming(TcpListenerStream::new(listener))
        .await
}
