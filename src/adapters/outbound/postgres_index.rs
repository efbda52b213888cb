use crate::common::{IndexError, IndexResult};
use crate::config::PostgresConfig;
use crate::domains::driver_location::{AgentPosition, GeoIndex, IndexHit, EARTH_RADIUS_KM};
use async_trait::async_trait;
use deadpool_postgres::{Config, Object, Pool, PoolConfig, Runtime};
use tokio_postgres::NoTls;
use tracing::info;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS driver_locations (
        driver_id VARCHAR(50) PRIMARY KEY,
        latitude DOUBLE PRECISION NOT NULL,
        longitude DOUBLE PRECISION NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );

    CREATE INDEX IF NOT EXISTS idx_driver_locations_lat_lon
    ON driver_locations(latitude, longitude);
"#;

// (xmax = 0) is only true for rows created by this statement, not for updated ones.
const UPSERT: &str = "INSERT INTO driver_locations (driver_id, latitude, longitude, updated_at)
     VALUES ($1, $2, $3, NOW())
     ON CONFLICT (driver_id) DO UPDATE SET
     latitude = EXCLUDED.latitude,
     longitude = EXCLUDED.longitude,
     updated_at = EXCLUDED.updated_at
     RETURNING (xmax = 0) AS inserted";

const RADIUS_QUERY: &str = "SELECT driver_id, latitude, longitude, distance_km FROM (
         SELECT driver_id, latitude, longitude,
             2 * $4::float8 * ASIN(LEAST(1.0::float8, SQRT(
                 POWER(SIN(RADIANS(latitude - $1::float8) / 2), 2)
                 + COS(RADIANS($1::float8)) * COS(RADIANS(latitude))
                 * POWER(SIN(RADIANS(longitude - $2::float8) / 2), 2)
             ))) AS distance_km
         FROM driver_locations
     ) AS candidates
     WHERE distance_km <= $3::float8
     ORDER BY distance_km ASC, driver_id ASC
     LIMIT $5::int8";

/// Geo index backed by a single Postgres table; distances are computed in SQL.
pub struct PostgresGeoIndex {
    pool: Pool,
}

impl PostgresGeoIndex {
    pub async fn new(config: PostgresConfig) -> Result<Self, String> {
        let mut pg_config = Config::new();
        pg_config.host = Some(config.host);
        pg_config.port = Some(config.port);
        pg_config.dbname = Some(config.database);
        pg_config.user = Some(config.username);
        pg_config.password = Some(config.password);
        pg_config.pool = Some(PoolConfig::new(config.max_connections as usize));

        let pool = pg_config
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| format!("Failed to create PostgreSQL pool: {}", e))?;

        Self::from_pool(pool).await
    }

    /// Wraps an existing pool and makes sure the schema exists.
    pub async fn from_pool(pool: Pool) -> Result<Self, String> {
        let index = Self { pool };
        index.initialize_schema().await?;
        Ok(index)
    }

    async fn initialize_schema(&self) -> Result<(), String> {
        let client = self
            .client()
            .await
            .map_err(|e| format!("Failed to get database connection: {}", e))?;

        client
            .batch_execute(SCHEMA)
            .await
            .map_err(|e| format!("Failed to initialize database schema: {}", e))?;

        info!("driver_locations schema ready");
        Ok(())
    }

    async fn client(&self) -> IndexResult<Object> {
        self.pool
            .get()
            .await
            .map_err(|e| IndexError::Unavailable(format!("Failed to get database connection: {}", e)))
    }
}

fn query_error(context: &str, err: tokio_postgres::Error) -> IndexError {
    IndexError::Unavailable(format!("{}: {}", context, err))
}

#[async_trait]
impl GeoIndex for PostgresGeoIndex {
    async fn upsert(&self, driver_id: &str, latitude: f64, longitude: f64) -> IndexResult<bool> {
        let client = self.client().await?;

        let stmt = client
            .prepare_cached(UPSERT)
            .await
            .map_err(|e| query_error("Failed to prepare statement", e))?;

        let row = client
            .query_one(&stmt, &[&driver_id, &latitude, &longitude])
            .await
            .map_err(|e| query_error("Failed to save driver location", e))?;

        Ok(row.get::<_, bool>(0))
    }

    async fn remove(&self, driver_id: &str) -> IndexResult<bool> {
        let client = self.client().await?;

        let removed = client
            .execute(
                "DELETE FROM driver_locations WHERE driver_id = $1",
                &[&driver_id],
            )
            .await
            .map_err(|e| query_error("Failed to delete driver location", e))?;

        Ok(removed > 0)
    }

    async fn position(&self, driver_id: &str) -> IndexResult<Option<AgentPosition>> {
        let client = self.client().await?;

        let row = client
            .query_opt(
                "SELECT latitude, longitude FROM driver_locations WHERE driver_id = $1",
                &[&driver_id],
            )
            .await
            .map_err(|e| query_error("Failed to load driver location", e))?;

        Ok(row.map(|row| AgentPosition {
            agent_id: driver_id.to_string(),
            latitude: row.get(0),
            longitude: row.get(1),
        }))
    }

    async fn radius_query(
        &self,
        center_lat: f64,
        center_lon: f64,
        radius_km: f64,
        limit: usize,
    ) -> IndexResult<Vec<IndexHit>> {
        let client = self.client().await?;

        let stmt = client
            .prepare_cached(RADIUS_QUERY)
            .await
            .map_err(|e| query_error("Failed to prepare statement", e))?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = client
            .query(
                &stmt,
                &[&center_lat, &center_lon, &radius_km, &EARTH_RADIUS_KM, &limit],
            )
            .await
            .map_err(|e| query_error("Failed to query nearby drivers", e))?;

        Ok(rows
            .iter()
            .map(|row| IndexHit {
                agent_id: row.get(0),
                latitude: row.get(1),
                longitude: row.get(2),
                distance_km: row.get(3),
            })
            .collect())
    }
}
