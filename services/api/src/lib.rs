mod cli;
mod demo;
mod infra;
mod routes;
mod server;
mod synthetic;

use salmeen::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
