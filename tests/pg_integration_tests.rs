#[cfg(feature = "pg_integration")]
use deadpool_postgres::{Config as DeadPoolConfig, Runtime};
#[cfg(feature = "pg_integration")]
use driver_location::adapters::outbound::PostgresGeoIndex;
#[cfg(feature = "pg_integration")]
use driver_location::application::DriverLocationService;
#[cfg(feature = "pg_integration")]
use driver_location::config::LocationConfig;
#[cfg(feature = "pg_integration")]
use driver_location::domains::driver_location::{offset_north, GeoIndex};
#[cfg(feature = "pg_integration")]
use driver_location::DomainError;
#[cfg(feature = "pg_integration")]
use std::sync::Arc;
#[cfg(feature = "pg_integration")]
use tokio_postgres::NoTls;
#[cfg(all(feature = "pg_integration", feature = "use_testcontainers"))]
use testcontainers::runners::AsyncRunner;
#[cfg(all(feature = "pg_integration", feature = "use_testcontainers"))]
use testcontainers_modules::postgres::Postgres;

#[cfg(feature = "pg_integration")]
fn pool_for(port: u16) -> Result<deadpool_postgres::Pool, Box<dyn std::error::Error>> {
    let mut dp_cfg = DeadPoolConfig::new();
    dp_cfg.host = Some("127.0.0.1".to_string());
    dp_cfg.port = Some(port);
    dp_cfg.user = Some("postgres".to_string());
    dp_cfg.password = Some("postgres".to_string());
    dp_cfg.dbname = Some("postgres".to_string());
    Ok(dp_cfg.create_pool(Some(Runtime::Tokio1), NoTls)?)
}

/// Retries schema setup until Postgres accepts connections.
#[cfg(feature = "pg_integration")]
async fn connect(port: u16) -> Result<PostgresGeoIndex, Box<dyn std::error::Error>> {
    let mut last_error = String::new();
    for _ in 0..10 {
        match PostgresGeoIndex::from_pool(pool_for(port)?).await {
            Ok(index) => return Ok(index),
            Err(e) => {
                last_error = e;
                tokio::time::sleep(std::time::Duration::from_millis(500)).await;
            }
        }
    }
    Err(format!("Postgres did not become ready: {}", last_error).into())
}

#[cfg(feature = "pg_integration")]
async fn exercise(index: PostgresGeoIndex) -> Result<(), Box<dyn std::error::Error>> {
    let (lat, lon) = (52.5200, 13.4050);

    // Start from a clean table; earlier runs against an external database may leave rows.
    for id in ["pg-near", "pg-mid", "pg-far"] {
        index.remove(id).await?;
    }

    assert!(index.upsert("pg-near", offset_north(lat, 1.0), lon).await?);
    assert!(!index.upsert("pg-near", offset_north(lat, 1.5), lon).await?);
    assert!(index.upsert("pg-mid", offset_north(lat, 4.0), lon).await?);
    assert!(index.upsert("pg-far", offset_north(lat, 30.0), lon).await?);

    let hits = index.radius_query(lat, lon, 5.0, 10).await?;
    let ids: Vec<_> = hits.iter().map(|h| h.agent_id.as_str()).collect();
    assert_eq!(ids, vec!["pg-near", "pg-mid"]);
    assert!((hits[0].distance_km - 1.5).abs() < 1e-6);

    let service = DriverLocationService::new(Arc::new(index), LocationConfig::default());
    let found = service.find_nearby_drivers(lat, lon, None).await?;
    assert_eq!(found.len(), 2);
    assert_eq!(found[1].distance_km, 4.0);

    service.delete_driver_location("pg-near").await?;
    let err = service.get_driver_location("pg-near").await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));

    Ok(())
}

#[cfg(all(feature = "pg_integration", feature = "use_testcontainers"))]
#[tokio::test]
async fn test_postgres_geo_index_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
    let node = Postgres::default().start().await?;
    let port = node.get_host_port_ipv4(5432).await?;
    exercise(connect(port).await?).await
}

#[cfg(all(feature = "pg_integration", not(feature = "use_testcontainers")))]
#[tokio::test]
async fn test_postgres_geo_index_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
    // External Postgres on PG_TEST_PORT
    let port = std::env::var("PG_TEST_PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(5433u16);
    exercise(connect(port).await?).await
}
