// src/main.rs
use bento_designer::api::{self, ApiState};
use bento_designer::catalog::{BUILTIN_COUNT, Catalog};
use bento_designer::config::{AppConfig, LogConfig};
use bento_designer::logging::init_logging;
use bento_designer::store::{BentoStorage, JsonFileStore, StoreBackend};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let dotenv_result = dotenvy::dotenv();

    // Logging first, so configuration fallbacks show up as warnings.
    init_logging(LogConfig::from_env().level());
    let app_config = AppConfig::from_env();

    if let Err(err) = dotenv_result {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            warn!("Could not load .env: {}", err);
        }
    }

    info!("Bento designer v{} starting", env!("CARGO_PKG_VERSION"));

    let catalog = Catalog::builtin();
    let report = catalog.validate(Some(BUILTIN_COUNT));
    if !report.is_valid {
        warn!(errors = ?report.errors, "built-in catalog failed its self-check");
    }

    let data_dir = app_config.storage.data_dir().to_path_buf();
    info!(data_dir = %data_dir.display(), "using JSON file store");
    let storage = BentoStorage::new(StoreBackend::File(JsonFileStore::new(data_dir)));

    let bento = match api::resolve_box(&storage, &app_config.bento).await {
        Ok(bento) => bento,
        Err(err) => {
            error!("Could not prepare the box: {err}");
            std::process::exit(1);
        }
    };

    let state = ApiState::new(storage, bento, catalog, app_config.suggestion.clone());
    if let Err(err) = api::start_api_server(app_config.api.clone(), state).await {
        error!("API server terminated with an error: {err}");
        std::process::exit(1);
    }
}
