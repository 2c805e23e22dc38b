mod config;
mod main_lib;

use config::{Config, LogFormat};
use main_lib::{init_tracing, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(LogFormat::from_env());
    let config = Config::from_env()?;
    run(config).await
}
