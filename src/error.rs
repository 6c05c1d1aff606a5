use thiserror::Error;

/// Per-record failures. None of these are recovered; the first one aborts the
/// whole run after the offending key and record are reported.
#[derive(Error, Debug, PartialEq)]
pub enum RecordError {
    #[error("'{0}' does not parse as a year/month/day scene prefix")]
    MalformedKey(String),
    #[error("record is missing required asset '{0}'")]
    MissingAsset(&'static str),
    #[error("record properties carry neither 'datetime' nor 'start'")]
    MissingDatetime,
}
