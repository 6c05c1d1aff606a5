use regex::Regex;

use crate::error::RecordError;

/// Sidecar documents that live alongside the scene records in the source
/// bucket and are never treated as records themselves.
const RESERVED_FILENAMES: [&str; 3] = ["catalog.json", "iserv.json", "product.json"];

/// One classified object key from the source listing.
#[derive(Debug, PartialEq)]
pub enum SourceKey {
    Skip,
    Record(RecordKey),
}

/// A key pointing at a legacy scene record, decomposed along the
/// `YYYY/MM/DD/<scene>.json` naming convention.
#[derive(Debug, PartialEq)]
pub struct RecordKey {
    pub key: String,
    pub year: String,
    pub month: String,
    pub day: String,
    /// Everything but the last segment; used to build absolute asset URLs.
    pub prefix: String,
}

impl SourceKey {
    /// Classify a listed key. Non-metadata keys and reserved sidecar files
    /// are `Skip`; metadata keys that do not follow the naming convention
    /// are fatal for the run.
    pub fn classify(key: &str) -> Result<SourceKey, RecordError> {
        if !key.ends_with(".json") {
            return Ok(SourceKey::Skip);
        }

        let filename = key.rsplit('/').next().unwrap_or(key);
        if RESERVED_FILENAMES.contains(&filename) {
            return Ok(SourceKey::Skip);
        }

        let re = Regex::new(r"^(?<year>[^/]+)/(?<month>[^/]+)/(?<day>[^/]+)/.+$")
            .expect("Regex pattern should always compile");

        let captures = re
            .captures(key)
            .ok_or(RecordError::MalformedKey(key.to_string()))?;

        let (prefix, _) = key
            .rsplit_once('/')
            .expect("A captured key contains at least three separators");

        Ok(SourceKey::Record(RecordKey {
            key: key.to_string(),
            year: captures["year"].to_string(),
            month: captures["month"].to_string(),
            day: captures["day"].to_string(),
            prefix: prefix.to_string(),
        }))
    }
}
