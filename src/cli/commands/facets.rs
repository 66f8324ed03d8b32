//! facet commands - Read and write metadata facets

use anyhow::{bail, Context as _, Result};
use serde_json::{json, Map, Value};

use super::{parse_value, print_json, run_async, Context};
use crate::core::types::MetaType;

/// Print one facet; `null` when nothing is stored.
pub fn get(ctx: &Context, meta_type: &str) -> Result<()> {
    let meta_type = parse_meta_type(meta_type)?;
    let mut client = ctx.entity_client()?;

    run_async(async move {
        let value = client
            .get(meta_type)
            .await
            .with_context(|| format!("Failed to read {}", meta_type))?;
        print_json(&value.unwrap_or(Value::Null))
    })
}

/// Print every facet that could be read.
pub fn get_all(ctx: &Context) -> Result<()> {
    let mut client = ctx.entity_client()?;

    run_async(async move {
        let facets = client.get_all().await.context("Failed to read metadata")?;
        print_json(&facets)
    })
}

/// Store one facet value.
pub fn create(ctx: &Context, meta_type: &str, data: &str) -> Result<()> {
    let meta_type = parse_meta_type(meta_type)?;
    let data = parse_value(data);
    let mut client = ctx.entity_client()?;

    run_async(async move {
        let record = client
            .create(meta_type, data)
            .await
            .with_context(|| format!("Failed to create {}", meta_type))?;
        print_json(&record)
    })
}

/// Store several facets from a JSON object.
pub fn create_many(ctx: &Context, data: &str) -> Result<()> {
    let data: Map<String, Value> = match serde_json::from_str(data) {
        Ok(Value::Object(map)) => map,
        Ok(_) => bail!("create-many expects a JSON object of facet name to records"),
        Err(e) => bail!("Invalid JSON: {}", e),
    };
    let mut client = ctx.entity_client()?;

    run_async(async move {
        let created = client
            .create_from_array(&data)
            .await
            .context("Failed to create metadata")?;
        print_json(&created)
    })
}

/// Replace a facet record's value.
pub fn update(ctx: &Context, meta_type: &str, meta_id: &str, data: &str) -> Result<()> {
    let meta_type = parse_meta_type(meta_type)?;
    let data = parse_value(data);
    let mut client = ctx.entity_client()?;

    run_async(async move {
        let record = client
            .update(meta_type, meta_id, data)
            .await
            .with_context(|| format!("Failed to update {} record '{}'", meta_type, meta_id))?;
        print_json(&record)
    })
}

/// Delete a facet record.
pub fn delete(ctx: &Context, meta_type: &str, meta_id: &str) -> Result<()> {
    let meta_type = parse_meta_type(meta_type)?;
    let mut client = ctx.entity_client()?;

    run_async(async move {
        let deleted = client
            .delete(meta_type, meta_id)
            .await
            .with_context(|| format!("Failed to delete {} record '{}'", meta_type, meta_id))?;
        print_json(&json!({ "deleted": deleted }))
    })
}

/// Attach a learning goal.
pub fn add_goal(ctx: &Context, goal_id: &str) -> Result<()> {
    if goal_id.trim().is_empty() {
        bail!("Goal id must not be empty");
    }
    let mut client = ctx.entity_client()?;

    run_async(async move {
        let record = client
            .add_goal(goal_id)
            .await
            .context("Failed to add learning goal")?;
        print_json(&record)
    })
}

/// Print the entity's keywords.
pub fn keywords(ctx: &Context) -> Result<()> {
    let mut client = ctx.entity_client()?;

    run_async(async move {
        let keywords = client
            .get_keywords()
            .await
            .context("Failed to read keywords")?;
        print_json(&keywords)
    })
}

/// Search keywords by prefix. Needs no entity.
pub fn search_keywords(ctx: &Context, text: &str) -> Result<()> {
    let client = ctx.client()?;

    run_async(async move {
        let matches = client
            .search_for_keywords(text)
            .await
            .context("Failed to search keywords")?;
        print_json(&matches)
    })
}

/// Print the facet table.
pub fn meta_types() -> Result<()> {
    let table: Map<String, Value> = MetaType::ALL
        .iter()
        .map(|meta_type| {
            (
                meta_type.as_str().to_string(),
                Value::String(meta_type.property().to_string()),
            )
        })
        .collect();
    print_json(&table)
}

fn parse_meta_type(name: &str) -> Result<MetaType> {
    MetaType::parse(name).map_err(|e| anyhow::anyhow!("{}. Run 'mdsc meta-types' to list them.", e))
}
