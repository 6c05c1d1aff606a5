use chrono::NaiveDate;
use stac::{Catalog, Link};
use std::collections::BTreeMap;

use crate::error::RecordError;
use crate::source_key::RecordKey;

/// The catalog hierarchy being materialized during a run: the singleton root
/// plus one node per distinct year, year/month and year/month/day prefix.
///
/// Nodes are created lazily on first encounter and reused afterwards, so many
/// records sharing a prefix still yield exactly one node and one `child` link
/// from its parent.
pub struct CatalogTree {
    root: Catalog,
    root_href: String,
    nodes: BTreeMap<String, Catalog>,
}

impl CatalogTree {
    pub fn new(root: Catalog, root_href: String) -> Self {
        Self {
            root,
            root_href,
            nodes: BTreeMap::new(),
        }
    }

    /// Ensure the three ancestor nodes of a record key exist, creating and
    /// wiring any that are missing, and return the deepest node's id.
    pub fn ensure_lineage(self: &mut Self, record_key: &RecordKey) -> Result<String, RecordError> {
        let segments = [&record_key.year, &record_key.month, &record_key.day];

        let mut catalog_id = String::new();
        for (depth, segment) in segments.iter().enumerate() {
            let parent_id = catalog_id.clone();
            catalog_id = if depth == 0 {
                segment.to_string()
            } else {
                format!("{}/{}", catalog_id, segment)
            };

            if self.nodes.contains_key(&catalog_id) {
                continue;
            }

            let timestamp = descriptive_timestamp(&catalog_id, depth)?;
            let mut catalog =
                Catalog::new(catalog_id.clone(), format!("Imagery from {}", timestamp));
            catalog.links.push(Link::new(&self.root_href, "root"));
            catalog.links.push(Link::new(&self.root_href, "collection"));
            catalog.links.push(Link::new("../catalog.json", "parent"));

            let parent = if depth == 0 {
                &mut self.root
            } else {
                self.nodes
                    .get_mut(&parent_id)
                    .expect("Parent node was created at the previous depth")
            };
            parent
                .links
                .push(Link::new(format!("{}/catalog.json", segment), "child"));

            self.nodes.insert(catalog_id.clone(), catalog);
        }

        Ok(catalog_id)
    }

    /// Append an `item` link to the owning node. The link is the only way a
    /// catalog learns of its items.
    pub fn add_item_link(self: &mut Self, catalog_id: &str, href: &str, title: &str) {
        let catalog = self
            .nodes
            .get_mut(catalog_id)
            .expect("Items are only attached to nodes returned by ensure_lineage");

        let mut link = Link::new(href, "item");
        link.title = Some(title.to_string());
        catalog.links.push(link);
    }

    pub fn root(self: &Self) -> &Catalog {
        &self.root
    }

    pub fn nodes(self: &Self) -> impl Iterator<Item = (&String, &Catalog)> {
        self.nodes.iter()
    }

    #[cfg(test)]
    pub fn get(self: &Self, catalog_id: &str) -> Option<&Catalog> {
        self.nodes.get(catalog_id)
    }
}

/// Human-readable label for a prefix id: the year verbatim at depth 0, month
/// and year at depth 1, full date at depth 2. Segments that do not form a
/// real calendar date are fatal.
fn descriptive_timestamp(catalog_id: &str, depth: usize) -> Result<String, RecordError> {
    if depth == 0 {
        return Ok(catalog_id.to_string());
    }

    let malformed = || RecordError::MalformedKey(catalog_id.to_string());
    let mut segments = catalog_id.split('/');
    let mut next_number = || -> Result<u32, RecordError> {
        segments
            .next()
            .ok_or_else(malformed)?
            .parse()
            .map_err(|_| malformed())
    };

    let year = next_number()? as i32;
    let month = next_number()?;
    let day = if depth == 2 { next_number()? } else { 1 };

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(malformed)?;
    match depth {
        1 => Ok(date.format("%B %Y").to_string()),
        _ => Ok(date.format("%B %-d, %Y").to_string()),
    }
}
