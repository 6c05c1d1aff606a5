use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use stac::Item;

use crate::catalog_tree::CatalogTree;
use crate::config::BuildConfig;
use crate::iserv;
use crate::item_builder;
use crate::legacy::LegacyRecord;
use crate::s3::S3ObjOps;
use crate::source_key::{RecordKey, SourceKey};

const CONTENT_TYPE: &str = "application/json";

#[derive(Debug, PartialEq)]
pub struct BuildSummary {
    pub items_written: usize,
    pub catalogs_written: usize,
    pub keys_skipped: usize,
}

/// One full rebuild: a single sequential pass over the source listing with
/// items written as they are assembled, then a write pass for the catalog
/// documents once every link list is complete. The first failing record
/// aborts the run after the offending key and its geometry-stripped record
/// are printed.
pub async fn run(store: &impl S3ObjOps, config: &BuildConfig) -> Result<BuildSummary> {
    let keys = store.list_keys(&config.source_bucket).await?;

    let mut tree = CatalogTree::new(iserv::root_catalog(config), config.root_href());
    let mut items_written = 0;
    let mut keys_skipped = 0;

    for key in keys {
        let record_key = match SourceKey::classify(&key)? {
            SourceKey::Skip => {
                keys_skipped += 1;
                continue;
            }
            SourceKey::Record(record_key) => record_key,
        };

        let catalog_id = tree.ensure_lineage(&record_key)?;

        // Any failure from here on is reported with the offending key; once
        // the record parses, its geometry-stripped copy is reported too.
        let raw = match read_record(store, &config.source_bucket, &record_key.key).await {
            Ok(raw) => raw,
            Err(error) => {
                println!("{}", record_key.key);
                return Err(error);
            }
        };

        if let Err(error) =
            build_and_write_item(store, config, &raw, &record_key, &catalog_id, &mut tree).await
        {
            report_bad_record(&record_key.key, raw);
            return Err(error);
        }
        items_written += 1;
    }

    let catalogs_written = write_catalogs(store, config, &tree).await?;

    Ok(BuildSummary {
        items_written,
        catalogs_written,
        keys_skipped,
    })
}

async fn read_record(store: &impl S3ObjOps, bucket: &str, key: &str) -> Result<Value> {
    let bytes = store.get_object(bucket, key).await?;
    let raw: Value = serde_json::from_slice(&bytes)?;
    Ok(raw)
}

async fn build_and_write_item(
    store: &impl S3ObjOps,
    config: &BuildConfig,
    raw: &Value,
    record_key: &RecordKey,
    catalog_id: &str,
    tree: &mut CatalogTree,
) -> Result<()> {
    let record: LegacyRecord = serde_json::from_value(raw.clone())?;
    let source_prefix = config.source_prefix(&record_key.prefix);
    let item: Item = item_builder::assemble(record, &source_prefix, catalog_id, tree, config)?;

    let output_key = format!("{}/{}/{}.json", config.stac_version, catalog_id, item.id);
    println!("{}", output_key);
    let body = serde_json::to_vec(&versioned(&item, &config.stac_version)?)?;
    store
        .put_object(&config.target_bucket, &output_key, body, CONTENT_TYPE)
        .await?;
    Ok(())
}

/// Serialize a document with the fixed version tag merged in, overriding
/// whatever tag the document model carries.
fn versioned<T: Serialize>(document: &T, version: &str) -> Result<Value> {
    let mut value = serde_json::to_value(document)?;
    if let Some(object) = value.as_object_mut() {
        object.insert(
            "stac_version".to_string(),
            Value::String(version.to_string()),
        );
    }
    Ok(value)
}

/// Catalog documents are written only after every item has been processed so
/// their `child`/`item` link lists are fully populated.
async fn write_catalogs(
    store: &impl S3ObjOps,
    config: &BuildConfig,
    tree: &CatalogTree,
) -> Result<usize> {
    let root_key = format!("{}/catalog.json", config.stac_version);
    println!("{}", root_key);
    let body = serde_json::to_vec(&versioned(tree.root(), &config.stac_version)?)?;
    store
        .put_object(&config.target_bucket, &root_key, body, CONTENT_TYPE)
        .await?;

    let mut catalogs_written = 1;
    for (catalog_id, catalog) in tree.nodes() {
        let key = format!("{}/{}/catalog.json", config.stac_version, catalog_id);
        println!("{}", key);
        let body = serde_json::to_vec(&versioned(catalog, &config.stac_version)?)?;
        store
            .put_object(&config.target_bucket, &key, body, CONTENT_TYPE)
            .await?;
        catalogs_written += 1;
    }

    Ok(catalogs_written)
}

fn report_bad_record(key: &str, mut raw: Value) {
    if let Some(object) = raw.as_object_mut() {
        // Geometries are large and rarely the problem.
        object.remove("geometry");
    }
    println!("{}", key);
    println!("{}", raw);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecordError;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// In-memory stand-in for the object store, recording write order.
    #[derive(Default)]
    struct MemoryStore {
        objects: Mutex<BTreeMap<String, Vec<u8>>>,
        writes: Mutex<Vec<String>>,
    }

    impl MemoryStore {
        fn seed(self: &Self, bucket: &str, key: &str, body: &Value) {
            self.seed_bytes(bucket, key, serde_json::to_vec(body).unwrap());
        }

        fn seed_bytes(self: &Self, bucket: &str, key: &str, body: Vec<u8>) {
            self.objects
                .lock()
                .unwrap()
                .insert(format!("{}/{}", bucket, key), body);
        }

        fn read(self: &Self, bucket: &str, key: &str) -> Option<Value> {
            let objects = self.objects.lock().unwrap();
            let bytes = objects.get(&format!("{}/{}", bucket, key))?;
            Some(serde_json::from_slice(bytes).unwrap())
        }
    }

    impl S3ObjOps for MemoryStore {
        async fn list_keys(self: &Self, bucket: &str) -> anyhow::Result<Vec<String>> {
            let prefix = format!("{}/", bucket);
            let objects = self.objects.lock().unwrap();
            Ok(objects
                .keys()
                .filter_map(|key| key.strip_prefix(&prefix))
                .map(|key| key.to_string())
                .collect())
        }

        async fn get_object(self: &Self, bucket: &str, key: &str) -> anyhow::Result<Vec<u8>> {
            let objects = self.objects.lock().unwrap();
            objects
                .get(&format!("{}/{}", bucket, key))
                .cloned()
                .ok_or(anyhow::anyhow!("No such key: {}", key))
        }

        async fn put_object(
            self: &Self,
            bucket: &str,
            key: &str,
            body: Vec<u8>,
            _content_type: &str,
        ) -> anyhow::Result<()> {
            self.writes.lock().unwrap().push(key.to_string());
            self.objects
                .lock()
                .unwrap()
                .insert(format!("{}/{}", bucket, key), body);
            Ok(())
        }
    }

    fn mapping_record(id: &str) -> Value {
        json!({
            "id": id,
            "bbox": [-80.0, 26.0, -79.0, 27.0],
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [-80.0, 26.0], [-79.0, 26.0], [-79.0, 27.0], [-80.0, 27.0], [-80.0, 26.0],
                ]],
            },
            "properties": {"datetime": "2013-03-27T14:18:28Z"},
            "assets": {
                "RGB Tif": {"href": format!("{}.TIF", id), "name": format!("{}.TIF", id)},
                "RGB JPEG": {"href": format!("{}.JPG", id), "name": format!("{}.JPG", id)},
                "jpg overview": {"href": format!("{}.JPG.ovr", id), "name": format!("{}.JPG.ovr", id)},
                "jpeg world file": {"href": format!("{}.JGW", id), "name": format!("{}.JGW", id)},
                "thumbnail": {"href": format!("{}.png", id), "name": format!("{}.png", id)},
                "cog": {"href": format!("{}_cog.TIF", id), "name": format!("{}_cog.TIF", id)},
            },
        })
    }

    fn list_record(id: &str) -> Value {
        json!({
            "id": id,
            "bbox": [10.0, 40.0, 11.0, 41.0],
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [10.0, 40.0], [11.0, 40.0], [11.0, 41.0], [10.0, 41.0], [10.0, 40.0],
                ]],
            },
            "properties": {"start": "2013-06-11T12:34:56Z"},
            "assets": [
                {"href": format!("{}.TFW", id)},
                {"href": format!("{}.JPG", id)},
                {"href": format!("{}.png", id)},
                {"href": format!("{}.JGW", id)},
                {"href": format!("{}.JPG.ovr", id)},
                {"href": format!("{}.TIF", id)},
            ],
        })
    }

    fn seeded_store(config: &BuildConfig) -> MemoryStore {
        let store = MemoryStore::default();
        let source = &config.source_bucket;
        store.seed(source, "catalog.json", &json!({"id": "legacy"}));
        store.seed(
            source,
            "2013/03/27/IP0130327141828.json",
            &mapping_record("IP0130327141828"),
        );
        store.seed(
            source,
            "2013/03/27/IP0130327150312.json",
            &mapping_record("IP0130327150312"),
        );
        store.seed(
            source,
            "2013/06/11/IP0130611123456.json",
            &list_record("IP0130611123456"),
        );
        store
    }

    fn config() -> BuildConfig {
        BuildConfig::from_template(&iserv::build_config_toml())
    }

    #[tokio::test]
    async fn test_full_rebuild() {
        let config = config();
        let store = seeded_store(&config);

        let summary = run(&store, &config).await.unwrap();
        assert_eq!(
            summary,
            BuildSummary {
                items_written: 3,
                catalogs_written: 6,
                keys_skipped: 1,
            }
        );

        let item = store
            .read(
                &config.target_bucket,
                "0.6.1/2013/03/27/IP0130327141828.json",
            )
            .unwrap();
        assert_eq!(item["type"], json!("Feature"));
        assert_eq!(item["stac_version"], json!("0.6.1"));
        assert_eq!(item["assets"].as_object().unwrap().len(), 6);
        assert_eq!(item["properties"]["datetime"], json!("2013-03-27T14:18:28Z"));

        // The list-shape record resolved its datetime from 'start' and still
        // produced the full canonical set.
        let item = store
            .read(
                &config.target_bucket,
                "0.6.1/2013/06/11/IP0130611123456.json",
            )
            .unwrap();
        assert_eq!(item["properties"]["datetime"], json!("2013-06-11T12:34:56Z"));
        assert_eq!(item["assets"].as_object().unwrap().len(), 6);
        assert_eq!(
            item["assets"]["visual"]["title"],
            json!("3-Band RGB GeoTIFF")
        );
    }

    #[tokio::test]
    async fn test_catalog_documents() {
        let config = config();
        let store = seeded_store(&config);
        run(&store, &config).await.unwrap();

        let root = store
            .read(&config.target_bucket, "0.6.1/catalog.json")
            .unwrap();
        assert_eq!(root["id"], json!("ISERV"));
        assert_eq!(root["stac_version"], json!("0.6.1"));
        let root_children: Vec<&Value> = root["links"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|link| link["rel"] == json!("child"))
            .collect();
        assert_eq!(root_children.len(), 1);
        assert_eq!(root_children[0]["href"], json!("2013/catalog.json"));

        let year = store
            .read(&config.target_bucket, "0.6.1/2013/catalog.json")
            .unwrap();
        let year_children: Vec<String> = year["links"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|link| link["rel"] == json!("child"))
            .map(|link| link["href"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(year_children, vec!["03/catalog.json", "06/catalog.json"]);

        // Two items on the shared day node, one child link from the month.
        let day = store
            .read(&config.target_bucket, "0.6.1/2013/03/27/catalog.json")
            .unwrap();
        assert_eq!(day["description"], json!("Imagery from March 27, 2013"));
        let item_links: Vec<&Value> = day["links"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|link| link["rel"] == json!("item"))
            .collect();
        assert_eq!(item_links.len(), 2);
        assert_eq!(item_links[0]["href"], json!("IP0130327141828.json"));
        assert_eq!(item_links[0]["title"], json!("IP0130327141828"));
    }

    #[tokio::test]
    async fn test_items_written_before_catalogs() {
        let config = config();
        let store = seeded_store(&config);
        run(&store, &config).await.unwrap();

        let writes = store.writes.lock().unwrap();
        let first_catalog = writes
            .iter()
            .position(|key| key.ends_with("catalog.json"))
            .unwrap();
        let last_item = writes
            .iter()
            .rposition(|key| !key.ends_with("catalog.json"))
            .unwrap();
        assert!(last_item < first_catalog);
    }

    #[tokio::test]
    async fn test_rebuild_is_deterministic() {
        let config = config();
        let first = seeded_store(&config);
        let second = seeded_store(&config);

        run(&first, &config).await.unwrap();
        run(&second, &config).await.unwrap();

        for key in [
            "0.6.1/catalog.json",
            "0.6.1/2013/catalog.json",
            "0.6.1/2013/03/catalog.json",
            "0.6.1/2013/03/27/catalog.json",
        ] {
            assert_eq!(
                first.read(&config.target_bucket, key),
                second.read(&config.target_bucket, key)
            );
        }
    }

    #[tokio::test]
    async fn test_bad_record_aborts_the_run() {
        let config = config();
        let store = seeded_store(&config);
        let mut record = mapping_record("IP0141127115649");
        record["properties"] = json!({});
        store.seed(&config.source_bucket, "2014/11/27/IP0141127115649.json", &record);

        let error = run(&store, &config).await.unwrap_err();
        assert_eq!(
            error.downcast_ref::<RecordError>(),
            Some(&RecordError::MissingDatetime)
        );

        // Fail-fast: no catalog document was written.
        assert!(store
            .read(&config.target_bucket, "0.6.1/catalog.json")
            .is_none());
    }

    #[tokio::test]
    async fn test_corrupt_record_aborts_the_run() {
        let config = config();
        let store = seeded_store(&config);
        store.seed_bytes(
            &config.source_bucket,
            "2014/11/27/IP0141127115649.json",
            b"not a json document".to_vec(),
        );

        let error = run(&store, &config).await.unwrap_err();
        assert!(error.downcast_ref::<serde_json::Error>().is_some());

        // Fail-fast: no catalog document was written.
        assert!(store
            .read(&config.target_bucket, "0.6.1/catalog.json")
            .is_none());
    }
}
