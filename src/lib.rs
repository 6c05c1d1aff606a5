#![allow(async_fn_in_trait)]
pub mod builder;
pub mod catalog_tree;
pub mod config;
mod error;
pub mod iserv;
pub mod item_builder;
pub mod legacy;
pub mod provider;
pub mod s3;
pub mod source_key;

pub use error::RecordError;
