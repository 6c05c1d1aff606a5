use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use crate::s3;

pub struct Provider {
    client: Client,
}

impl Provider {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn from_env() -> Self {
        let client = s3::client_from_env().await;
        Self { client }
    }

    pub async fn from_profile(profile_name: &str) -> Self {
        let client = s3::client_from_profile(profile_name).await;
        Self { client }
    }

    /// Unsigned client; enough to read the public source bucket.
    pub async fn as_anon() -> Self {
        let client = s3::anon_client().await;
        Self { client }
    }
}

impl s3::S3ObjOps for Provider {
    async fn list_keys(self: &Self, bucket: &str) -> anyhow::Result<Vec<String>> {
        let mut keys: Vec<String> = vec![];

        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page?;
            for object in page.contents() {
                if let Some(key) = object.key() {
                    keys.push(key.to_string());
                }
            }
        }

        Ok(keys)
    }

    async fn get_object(self: &Self, bucket: &str, key: &str) -> anyhow::Result<Vec<u8>> {
        let object = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await?;

        let data = object.body.collect().await?.to_vec();
        Ok(data)
    }

    async fn put_object(
        self: &Self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> anyhow::Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await?;
        Ok(())
    }
}
