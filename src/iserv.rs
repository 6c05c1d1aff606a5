//! Constants describing the ISERV Level-0 collection: bucket layout, the
//! root catalog document, and the default build configuration.
use serde_json::json;
use stac::{Catalog, Link};
use toml;

use crate::config::BuildConfig;

pub const ROOT_ID: &str = "ISERV";

/// Descriptive text of the root catalog, published verbatim.
pub const ROOT_DESCRIPTION: &str = r#"
# ISS SERVIR Environmental Research and Visualization System (ISERV) Level-0 Product

## Introduction

These products were created at the ISERV Science Operation Center (SOC) at
the National Space Science and Technology Center.

ISERV is an automated system designed to acquire images of the Earth's
surface from the International Space Station (ISS). It is primarily a means
to gain experience and expertise in automated data acquisition from the ISS,
although it is expected to provide useful images for use in disaster
monitoring and assessment, and environmental decision making.

For more information about ISERV:
http://www.nasa.gov/mission_pages/servir/index.html

For more information about SERVIR:
http://servirglobal.net

## Format

ISERV data is provided in JPEG format for Level 0 products. Level 0 is
georeferenced using the following coordinate system:
`WGS_1984_Web_Mercator_Auxiliary_Sphere`

GeoTIFFs are provided by ISERV. Cloud-optimized GeoTIFFs are provided by
Radiant Earth Foundation

## Organization

ISERV is a true color image in JPEG format. Each band is delivered as a
grayscale, JPEG-compressed, 8-bit string of unsigned integers. Bands are not
calibrated. Accompanying each image is an XML auxiliary file, a JGW ("world")
file that provides image location and geometry information, and an OVR
overview file containing the reduced resolution image pyramid for ease of use
in image processing software.

### Data File Names

The file naming convention for ISERV L-0 data is as follows:

`IP0YYMMDDhhmmssLATLON.JPG` where:

* `IP` - ISERV Pathfinder
* `0` - Processing level
* `YY` - two-numeral year
* `MM` - two-numeral month
* `DD` - two-numeral day
* `hh` - two-numeral hour
* `mm` - two-numeral minute
* `ss` - two-numeral second
* `LAT` - four-numeral latitude in decimal degrees plus hemispherical indicator
  (`N` or `S`)
* `LON` - five-numeral longitude in decimal degrees plus hemispherical
  indicator (`E` or `W`)

Example: `IP01306111234561234N12345W.jpg`

`LON` is always 5 characters -- 3 left of decimal, 2 right of decimal, plus a
cardinal direction indicator

`123.45W` (or `-123.45`) becomes `12345W`

`23.45E` becomes `02345E`

`5.5E` becomes `00550E`

`LAT` is always 4 characters -- 2 left of decimal, 2 right of decimal, plus a
cardinal direction indicator

`34.56S` (or `-34.56`) becomes `3456S`

`4.56N` becomes `0456N`

`6.6S` becomes `0660S`

### READING DATA

Any image display software can open the JPEG image files.
No software is included on this product for viewing ISERV data.

## General Information and Documentation

### ISERV data access

USGS EarthExplorer at https://earthexplorer.usgs.gov

### Data restrictions

This is an experimental product derived from the ISERV Pathfinder system.
Data and metadata files may be freely distributed without restriction.

### Credits

ISERV, NASA

### Level 0 Data Processing Levels

Reconstructed, unprocessed ISERV instrument data at full resolution in JPEG
format, with all communications artifacts (e.g., synchronization frames,
communications headers, duplicate data) removed. Images are geolocated using
a custom-built, automated georeferencing process which provides an average
positional accuracy of approximately 2km.

## Disclaimer

Any use of trade, product, or firm names is for descriptive purposes only and
does not imply endorsement by the U.S. Government.
"#;

pub fn build_config_toml() -> toml::Table {
    toml::toml! {
        source_bucket = "radiant-nasa-iserv"

        target_bucket = "iserv-stac"

        // Version segment prefixed onto every output document path and merged
        // into each document as its stac_version tag.
        stac_version = "0.6.1"
    }
}

/// The singleton root catalog with the global collection metadata.
pub fn root_catalog(config: &BuildConfig) -> Catalog {
    let mut catalog = Catalog::new(ROOT_ID, ROOT_DESCRIPTION);
    catalog.title = Some(String::new());

    catalog
        .additional_fields
        .insert("version".to_string(), json!("1.0.0"));
    catalog
        .additional_fields
        .insert("license".to_string(), json!("PDDL-1.0"));
    catalog.additional_fields.insert(
        "keywords".to_string(),
        json!(["NASA", "ISERV", "ISS", "satellite"]),
    );
    catalog.additional_fields.insert(
        "extent".to_string(),
        json!({
            "spatial": [-180, -90, 180, 90],
            "temporal": ["2013-03-27T14:18:28Z", "2014-11-27T11:56:49Z"],
        }),
    );
    catalog.additional_fields.insert(
        "providers".to_string(),
        json!([
            {
                "name": "SERVIR",
                "url": "http://www.nasa.gov/mission_pages/servir/index.html",
                "roles": ["producer", "licensor"],
            },
            {
                "name": "Radiant Earth Foundation",
                "url": "https://www.radiant.earth/",
                "roles": ["processor", "host"],
            },
        ]),
    );
    catalog.additional_fields.insert(
        "properties".to_string(),
        json!({
            "eo:gsd": 5.6,
            "eo:platform": "ISS",
            "eo:instrument": "ISERV",
            "eo:bands": [
                {
                    "center_wavelength": 0.7,
                    "common_name": "red",
                },
                {
                    "center_wavelength": 0.55,
                    "common_name": "green",
                },
                {
                    "center_wavelength": 0.45,
                    "common_name": "blue",
                },
            ],
        }),
    );

    catalog.links.push(Link::new(config.root_href(), "root"));
    catalog.links.push(Link::new(config.root_href(), "self"));

    catalog
}
