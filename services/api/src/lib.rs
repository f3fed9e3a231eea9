mod cli;
mod infra;
mod routes;
mod server;

use flood_alerts::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
