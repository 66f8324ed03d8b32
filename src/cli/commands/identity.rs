//! identity commands - Entity identifier and learning object lookup

use anyhow::{bail, Context as _, Result};
use serde_json::json;

use super::{print_json, run_async, Context};

/// Print the entity's remote id, optionally registering the entity.
pub fn uuid(ctx: &Context, create: bool) -> Result<()> {
    let mut client = ctx.entity_client()?;

    run_async(async move {
        let id = if create {
            Some(
                client
                    .resolve(true)
                    .await
                    .context("Failed to register entity")?,
            )
        } else {
            client
                .resolve_existing()
                .await
                .context("Failed to look up entity")?
        };

        let Some(id) = id else {
            bail!(
                "Entity '{}' has no metadata identifier. Use --create to register it.",
                client.entity_guid()
            );
        };

        print_json(&json!({
            "entityGuid": client.entity_guid(),
            "id": id.as_str(),
        }))
    })
}

/// Print the entity's learning object.
pub fn learning_object(ctx: &Context, create: bool) -> Result<()> {
    let mut client = ctx.entity_client()?;

    run_async(async move {
        let object = client
            .get_or_create_learning_object(create)
            .await
            .context("Failed to fetch learning object")?;

        match object {
            Some(object) => print_json(&object),
            None => bail!(
                "No learning object for '{}'. Use --create to register it.",
                client.entity_guid()
            ),
        }
    })
}
