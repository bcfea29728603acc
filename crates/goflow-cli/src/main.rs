use goflow_cli::{run_cli, CliError};
use tracing::error;

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        error!("{}", err);

        let exit_code = match err {
            CliError::Configuration(_) => 1,
            CliError::Server(_) => 2,
        };
        std::process::exit(exit_code);
    }
}
