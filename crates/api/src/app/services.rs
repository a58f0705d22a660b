use std::sync::Arc;

use anyhow::Context;

use codecamp_infra::repository::schema::ensure_schema;
use codecamp_infra::seed::sample_data;
use codecamp_infra::{
    CampRepository, InMemoryCampRepository, PostgresCampRepository, RepositoryResult,
};

use crate::app::links::{LinkGenerator, RouteLinks};
use crate::config::{AppConfig, StoreConfig};

/// Collaborators handed to every handler.
#[derive(Clone)]
pub struct AppServices {
    pub repository: Arc<dyn CampRepository>,
    pub links: Arc<dyn LinkGenerator>,
}

impl AppServices {
    pub fn new(repository: Arc<dyn CampRepository>, links: Arc<dyn LinkGenerator>) -> Self {
        Self { repository, links }
    }

    /// In-memory store, optionally holding the sample camp.
    pub fn in_memory(seed: bool) -> RepositoryResult<Self> {
        let repository = if seed {
            InMemoryCampRepository::with_data(sample_data())?
        } else {
            InMemoryCampRepository::new()
        };
        Ok(Self::new(Arc::new(repository), Arc::new(RouteLinks::default())))
    }
}

/// Wire the configured store.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    match config.store()? {
        StoreConfig::InMemory => {
            tracing::info!(seed = config.seed_sample_data, "using in-memory store");
            AppServices::in_memory(config.seed_sample_data).context("failed to seed sample data")
        }
        StoreConfig::Postgres {
            database_url,
            max_connections,
        } => {
            let repository = PostgresCampRepository::connect(&database_url, max_connections)
                .await
                .context("failed to connect to postgres")?;
            ensure_schema(repository.pool())
                .await
                .context("failed to prepare schema")?;

            if config.seed_sample_data {
                let seeded = repository
                    .seed_if_empty(sample_data())
                    .await
                    .context("failed to seed sample data")?;
                tracing::info!(seeded, "sample data checked");
            }

            tracing::info!(max_connections, "using postgres store");
            Ok(AppServices::new(
                Arc::new(repository),
                Arc::new(RouteLinks::default()),
            ))
        }
    }
}
