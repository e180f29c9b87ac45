//! Schema-less query commands working on raw documents.

use clap::Parser;
use color_eyre::Result;
use futures::TryStreamExt;
use serde_json::Value as JsonValue;

use crate::store::{parse_filter, Filter, FindOptions, SortOrder};

use super::App;

/// Print documents matching a filter, one JSON object per line.
#[derive(Parser)]
pub struct FindCommand {
    /// Collection name
    pub collection: String,

    /// Filter expression, e.g. `address.city = "Paris"`
    #[arg(short, long = "where")]
    pub filter: Option<String>,

    /// Field to sort by
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Documents to skip
    #[arg(long)]
    pub skip: Option<u64>,

    /// Maximum documents to print
    #[arg(short, long)]
    pub limit: Option<u64>,
}

impl FindCommand {
    fn options(&self) -> FindOptions {
        let mut options = FindOptions::new();
        if let Some(field) = &self.sort {
            let order = if self.desc {
                SortOrder::Descending
            } else {
                SortOrder::Ascending
            };
            options = options.sort_by(field, order);
        }
        options.skip = self.skip;
        options.limit = self.limit;
        options
    }
}

/// Parses an optional `--where` argument, absent meaning all documents.
pub(super) fn filter_arg(filter: Option<&str>) -> Result<Filter> {
    Ok(filter.map(parse_filter).transpose()?.unwrap_or_default())
}

impl App {
    pub async fn run_collections(&self) -> Result<()> {
        let ctx = self.context().await?;
        for name in ctx.store().list_collections().await? {
            println!("{}", name);
        }
        Ok(())
    }

    pub async fn run_count(&self, collection: &str, filter: Option<&str>) -> Result<()> {
        let filter = filter_arg(filter)?;
        let ctx = self.context().await?;
        let count = ctx.store().count(collection, &filter).await?;
        println!("{}", count);
        Ok(())
    }

    pub async fn run_find(&self, cmd: &FindCommand) -> Result<()> {
        let filter = filter_arg(cmd.filter.as_deref())?;
        let ctx = self.context().await?;

        let mut documents = ctx
            .store()
            .find(&cmd.collection, &filter, &cmd.options())
            .await?;
        let mut printed = 0usize;
        while let Some(document) = documents.try_next().await? {
            println!("{}", serde_json::to_string(&JsonValue::Object(document))?);
            printed += 1;
        }
        tracing::debug!(collection = %cmd.collection, printed, "find complete");
        Ok(())
    }
}
