use prevalence_core::Predictor;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::error::CliError;
use crate::server::{self, AppState};
use crate::telemetry;

pub fn run(
    host: Option<String>,
    port: Option<u16>,
    table_file: Option<PathBuf>,
    dataset: Option<String>,
) -> Result<(), CliError> {
    let mut config = AppConfig::load()?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(path) = table_file {
        config.data.table_path = Some(path);
    }
    if let Some(name) = dataset {
        config.data.dataset = name;
    }
    config.validate()?;

    telemetry::init(&config.server.log_level);

    // Loaded once; every request reads the same table
    let table = super::resolve_table(
        config.data.table_path.as_deref(),
        Some(config.data.dataset.as_str()),
    )?;
    tracing::info!(
        table = table.name(),
        version = table.version(),
        drugs = table.drugs().len(),
        questions = table.questions().len(),
        "rate table loaded"
    );

    let state = AppState::new(Predictor::from(table));
    let addr = config.server.socket_addr()?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server::serve(addr, state, config.server.request_timeout()))
}
