use anyhow::Result;
use stac::{Item, Link};

use crate::catalog_tree::CatalogTree;
use crate::config::BuildConfig;
use crate::error::RecordError;
use crate::legacy::{self, LegacyRecord};

/// Combine one legacy record with its normalized assets into a finished STAC
/// item and register the item on its owning catalog node.
///
/// The record's `datetime` property wins over `start` when both are present;
/// a record carrying neither is fatal.
pub fn assemble(
    record: LegacyRecord,
    source_prefix: &str,
    catalog_id: &str,
    tree: &mut CatalogTree,
    config: &BuildConfig,
) -> Result<Item> {
    let assets = legacy::normalize_assets(&record.assets, source_prefix)?;

    let datetime = record
        .properties
        .datetime
        .or(record.properties.start)
        .ok_or(RecordError::MissingDatetime)?;

    let mut item = Item::new(&record.id);
    item.bbox = serde_json::from_value(record.bbox)?;
    item.geometry = serde_json::from_value(record.geometry)?;
    item.properties.datetime = Some(datetime.parse()?);

    for (name, asset) in assets {
        item.assets.insert(name.to_string(), asset);
    }

    let item_href = format!("{}.json", item.id);
    item.links.push(Link::new(config.root_href(), "root"));
    item.links.push(Link::new("../catalog.json", "parent"));
    item.links.push(Link::new(
        format!("{}{}/{}", config.root_prefix(), catalog_id, item_href),
        "self",
    ));

    tree.add_item_link(catalog_id, &item_href, &item.id);

    Ok(item)
}
