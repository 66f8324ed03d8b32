//! field commands - Custom field definitions and values

use anyhow::{bail, Context as _, Result};
use serde_json::Value;

use super::{parse_value, print_json, run_async, Context};
use crate::cli::args::FieldAction;
use crate::client::SetValueOutcome;

/// Run a `field` subcommand.
pub fn field(ctx: &Context, action: FieldAction) -> Result<()> {
    match action {
        FieldAction::Define {
            name,
            data_type,
            collection,
            unique,
        } => define(ctx, &name, &data_type, collection, unique),
        FieldAction::Get { name } => get(ctx, &name),
        FieldAction::Values { name } => values(ctx, &name),
        FieldAction::Set { name, value, dedup } => set(ctx, &name, &value, dedup),
        FieldAction::Add {
            name,
            values,
            dedup,
        } => add(ctx, &name, &values, dedup),
        FieldAction::List => list(ctx),
    }
}

fn define(ctx: &Context, name: &str, data_type: &str, collection: bool, unique: bool) -> Result<()> {
    let mut client = ctx.client()?;

    run_async(async move {
        let definition = client
            .define_field(name, data_type, collection, unique)
            .await
            .with_context(|| format!("Failed to define field '{}'", name))?;
        print_json(&definition)
    })
}

fn get(ctx: &Context, name: &str) -> Result<()> {
    let mut client = ctx.client()?;

    run_async(async move {
        match client
            .get_definition(name)
            .await
            .with_context(|| format!("Failed to read field '{}'", name))?
        {
            Some(definition) => print_json(&definition),
            None => bail!("Field '{}' is not defined", name),
        }
    })
}

fn values(ctx: &Context, name: &str) -> Result<()> {
    let client = ctx.entity_client()?;

    run_async(async move {
        let values = client
            .get_values(name)
            .await
            .with_context(|| format!("Failed to read values of '{}'", name))?;
        print_json(&values)
    })
}

fn set(ctx: &Context, name: &str, value: &str, dedup: bool) -> Result<()> {
    let value = parse_value(value);
    let mut client = ctx.entity_client()?;

    run_async(async move {
        let outcome = client
            .set_value(name, value, dedup)
            .await
            .with_context(|| format!("Failed to set '{}'", name))?;

        if let SetValueOutcome::Collection(None) = outcome {
            bail!("Nothing was added to '{}'; see the log for details", name);
        }
        print_json(&outcome)
    })
}

fn add(ctx: &Context, name: &str, values: &[String], dedup: bool) -> Result<()> {
    let values = Value::Array(values.iter().map(|raw| parse_value(raw)).collect());
    let client = ctx.entity_client()?;

    run_async(async move {
        let Some(outcome) = client.add_collection_values(name, values, dedup).await else {
            bail!("Nothing was added to '{}'; see the log for details", name);
        };

        print_json(&outcome)?;
        if !outcome.is_complete() {
            bail!(
                "{} value(s) could not be added to '{}'",
                outcome.failed().count(),
                name
            );
        }
        Ok(())
    })
}

fn list(ctx: &Context) -> Result<()> {
    let client = ctx.entity_client()?;

    run_async(async move {
        let values = client
            .fetch_all()
            .await
            .context("Failed to read custom fields")?;
        print_json(&values)
    })
}
