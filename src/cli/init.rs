//! Init command handler.

use color_eyre::eyre::eyre;
use color_eyre::Result;

use crate::models::{Customer, Document};

use super::App;

impl App {
    /// Checks the store is reachable and creates the built-in collections.
    pub async fn run_init(&self) -> Result<()> {
        let ctx = self.context().await?;

        tracing::info!(
            "Pinging {} store for database '{}'",
            ctx.store().backend(),
            ctx.database()
        );
        ctx.ping()
            .await
            .map_err(|e| eyre!("Store is not reachable: {}", e))?;

        let collection = Customer::collection_name();
        tracing::info!("Ensuring collection '{}' exists...", collection);
        ctx.store()
            .ensure_collection(collection)
            .await
            .map_err(|e| eyre!("Failed to create collection '{}': {}", collection, e))?;

        let collections = ctx.store().list_collections().await?;
        tracing::info!("Ready: {} collection(s) present", collections.len());
        Ok(())
    }
}
