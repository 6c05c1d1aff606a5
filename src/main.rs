use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use iserv_stac::builder;
use iserv_stac::config::BuildConfig;
use iserv_stac::iserv;
use iserv_stac::provider::Provider;
use iserv_stac::s3::S3ObjOps;
use iserv_stac::source_key::SourceKey;

/// Rebuild the ISERV STAC catalog from the legacy scene-metadata bucket.
#[derive(Parser, Debug)]
struct Args {
    /// Build configuration toml; defaults to the built-in ISERV settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Named AWS profile to use instead of the default credential chain
    #[arg(long)]
    profile: Option<String>,

    /// Classify the source listing and print a summary without reading or
    /// writing any record
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => BuildConfig::read(path)?,
        None => BuildConfig::from_template(&iserv::build_config_toml()),
    };

    if args.dry_run {
        // The source bucket is public, so listing needs no credentials.
        let provider = match &args.profile {
            Some(profile_name) => Provider::from_profile(profile_name).await,
            None => Provider::as_anon().await,
        };
        let keys = provider.list_keys(&config.source_bucket).await?;
        let mut records = 0;
        let mut skipped = 0;
        let mut malformed = 0;
        for key in &keys {
            match SourceKey::classify(key) {
                Ok(SourceKey::Record(_)) => records += 1,
                Ok(SourceKey::Skip) => skipped += 1,
                Err(_) => malformed += 1,
            }
        }
        println!(
            "{} keys listed: {} records, {} skipped, {} malformed",
            keys.len(),
            records,
            skipped,
            malformed
        );
        return Ok(());
    }

    let provider = match &args.profile {
        Some(profile_name) => Provider::from_profile(profile_name).await,
        None => Provider::from_env().await,
    };

    let summary = builder::run(&provider, &config).await?;
    println!(
        "Wrote {} items and {} catalogs ({} keys skipped)",
        summary.items_written, summary.catalogs_written, summary.keys_skipped
    );

    Ok(())
}
