use serde::Deserialize;
use serde_json::{json, Map, Value};
use stac::Asset;
use std::collections::HashMap;

use crate::error::RecordError;

/// One legacy scene record as stored in the source bucket. The `bbox` and
/// `geometry` payloads are carried through untouched.
#[derive(Deserialize, Debug)]
pub struct LegacyRecord {
    pub id: String,
    pub bbox: Value,
    pub geometry: Value,
    pub properties: LegacyProperties,
    pub assets: LegacyAssetSet,
}

#[derive(Deserialize, Debug)]
pub struct LegacyProperties {
    pub datetime: Option<String>,
    pub start: Option<String>,
}

/// The two historical shapes of the record's `assets` field: newer records
/// key their entries by human role names, older records carry a bare list
/// whose entries are distinguished only by href suffix.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum LegacyAssetSet {
    Mapped(HashMap<String, LegacyAssetEntry>),
    Listed(Vec<LegacyAssetEntry>),
}

/// A single legacy asset entry. The legacy `name` feeds some output titles
/// and is then dropped, as is `format`; any other field a mapping-shape
/// entry carries (checksums, sizes, ...) passes through to the output.
#[derive(Deserialize, Debug, Clone)]
pub struct LegacyAssetEntry {
    pub href: String,
    pub name: Option<String>,
    #[serde(flatten)]
    pub additional: Map<String, Value>,
}

/// Normalize either legacy shape into the canonical asset set: absolute
/// hrefs, fixed titles and media types, keyed by the canonical role names.
/// Output order follows the canonical table for mapped records and entry
/// order for listed ones.
pub fn normalize_assets(
    assets: &LegacyAssetSet,
    source_prefix: &str,
) -> Result<Vec<(&'static str, Asset)>, RecordError> {
    match assets {
        LegacyAssetSet::Mapped(roles) => normalize_mapped(roles, source_prefix),
        LegacyAssetSet::Listed(entries) => Ok(normalize_listed(entries, source_prefix)),
    }
}

fn canonical_asset(
    source_prefix: &str,
    relative_href: &str,
    title: Option<String>,
    media_type: &str,
) -> Asset {
    let mut asset = Asset::new(format!("{}/{}", source_prefix, relative_href));
    asset.title = title;
    asset.r#type = Some(media_type.to_string());
    asset
}

/// Like `canonical_asset`, but carrying over whatever extra fields the legacy
/// entry had. `format` is dropped, and the canonical `title`/`type` win over
/// legacy values of the same name.
fn mapped_asset(
    entry: &LegacyAssetEntry,
    source_prefix: &str,
    title: Option<String>,
    media_type: &str,
) -> Asset {
    let mut asset = canonical_asset(source_prefix, &entry.href, title, media_type);
    for (field, value) in &entry.additional {
        if field != "format" && field != "title" && field != "type" {
            asset.additional_fields.insert(field.clone(), value.clone());
        }
    }
    asset
}

/// Every role except `tiff world file` is mandatory in the mapping shape.
fn normalize_mapped(
    roles: &HashMap<String, LegacyAssetEntry>,
    source_prefix: &str,
) -> Result<Vec<(&'static str, Asset)>, RecordError> {
    let required = |role: &'static str| roles.get(role).ok_or(RecordError::MissingAsset(role));

    let mut normalized = vec![];

    let tiff = required("RGB Tif")?;
    let mut original_tiff = mapped_asset(
        tiff,
        source_prefix,
        Some("RGB GeoTIFF".to_string()),
        "image/vnd.stac.geotiff",
    );
    original_tiff
        .additional_fields
        .insert("eo:bands".to_string(), json!([0, 1, 2]));
    normalized.push(("original TIFF", original_tiff));

    if let Some(entry) = roles.get("tiff world file") {
        normalized.push((
            "original TIFF world file",
            mapped_asset(
                entry,
                source_prefix,
                Some("RGB GeoTIFF world file".to_string()),
                "text/plain",
            ),
        ));
    }

    let jpeg = required("RGB JPEG")?;
    normalized.push((
        "JPEG",
        mapped_asset(jpeg, source_prefix, jpeg.name.clone(), "image/jpeg"),
    ));

    let overviews = required("jpg overview")?;
    normalized.push((
        "JPEG overviews",
        mapped_asset(
            overviews,
            source_prefix,
            Some("JPEG overviews".to_string()),
            "image/tiff",
        ),
    ));

    let world_file = required("jpeg world file")?;
    normalized.push((
        "JPEG world file",
        mapped_asset(
            world_file,
            source_prefix,
            Some("JPEG world file".to_string()),
            "text/plain",
        ),
    ));

    let thumbnail = required("thumbnail")?;
    normalized.push((
        "thumbnail",
        mapped_asset(
            thumbnail,
            source_prefix,
            Some("Thumbnail".to_string()),
            "image/png",
        ),
    ));

    let visual = required("cog")?;
    normalized.push((
        "visual",
        mapped_asset(
            visual,
            source_prefix,
            visual.name.clone(),
            "image/vnd.stac.geotiff; cloud-optimized=true",
        ),
    ));

    Ok(normalized)
}

/// The list shape predates the role mapping; entries are classified by href
/// suffix, nothing is mandatory, and unrecognized entries are dropped.
fn normalize_listed(entries: &[LegacyAssetEntry], source_prefix: &str) -> Vec<(&'static str, Asset)> {
    let mut normalized = vec![];

    for entry in entries {
        let (key, title, media_type) = if entry.href.ends_with(".TFW") {
            (
                "original TIFF world file",
                "RGB GeoTIFF world file",
                "text/plain",
            )
        } else if entry.href.ends_with(".JPG") {
            ("JPEG", "RGB JPEG", "image/jpeg")
        } else if entry.href.ends_with(".png") {
            ("thumbnail", "Thumbnail", "image/png")
        } else if entry.href.ends_with(".JGW") {
            ("JPEG world file", "JPEG world file", "text/plain")
        } else if entry.href.ends_with(".JPG.ovr") {
            ("JPEG overviews", "JPEG overviews", "image/tiff")
        } else if entry.href.ends_with(".TIF") {
            (
                "visual",
                "3-Band RGB GeoTIFF",
                "image/vnd.stac.geotiff; cloud-optimized=true",
            )
        } else {
            continue;
        };

        normalized.push((
            key,
            canonical_asset(
                source_prefix,
                &entry.href,
                Some(title.to_string()),
                media_type,
            ),
        ));
    }

    normalized
}
