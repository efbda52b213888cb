use super::DriverLocationService;
use crate::adapters::outbound::{InMemoryGeoIndex, PostgresGeoIndex};
use crate::common::{ApplicationError, ApplicationResult};
use crate::config::{Config, IndexBackend};
use crate::domains::driver_location::GeoIndex;
use std::sync::Arc;
use tracing::info;

/// Connects the index backend selected in `config`.
pub async fn build_index(config: &Config) -> ApplicationResult<Arc<dyn GeoIndex>> {
    match config.index.backend {
        IndexBackend::Memory => {
            info!("Using in-memory geo index");
            Ok(Arc::new(InMemoryGeoIndex::new()))
        }
        IndexBackend::Postgres => {
            info!(
                host = %config.postgres.host,
                port = config.postgres.port,
                database = %config.postgres.database,
                "Using PostgreSQL geo index"
            );
            let index = PostgresGeoIndex::new(config.postgres.clone())
                .await
                .map_err(ApplicationError::IndexSetup)?;
            Ok(Arc::new(index))
        }
    }
}

pub async fn build_service(config: &Config) -> ApplicationResult<DriverLocationService> {
    config.validate()?;
    let index = build_index(config).await?;
    Ok(DriverLocationService::new(index, config.location.clone())
        .with_call_timeout(config.index.call_timeout()))
}
