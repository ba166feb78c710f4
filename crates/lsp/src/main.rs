use std::process::ExitCode;

use async_lsp::MainLoop;
use async_lsp::stdio::{PipeStdin, PipeStdout};
use tower::ServiceBuilder;
use tracing_subscriber::EnvFilter;

use lsp::server::Server;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let (stdin, stdout) = match (PipeStdin::lock_tokio(), PipeStdout::lock_tokio()) {
        (Ok(stdin), Ok(stdout)) => (stdin, stdout),
        (Err(err), _) | (_, Err(err)) => {
            tracing::error!("failed to lock stdio: {err}");
            return ExitCode::FAILURE;
        }
    };

    let (mainloop, _) = MainLoop::new_server(|client| {
        ServiceBuilder::new().service(Server::new_router(client))
    });

    if let Err(err) = mainloop.run_buffered(stdin, stdout).await {
        tracing::error!("server stopped: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
