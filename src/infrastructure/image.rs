// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Locating the cloudsql-migrator image a job should run.

use crate::infrastructure::constants::{DEFAULT_IMAGE_REPOSITORY, DEFAULT_RELEASE_URL};
use crate::shared::error::{MigrateError, Result};
use serde::Deserialize;
use tracing::debug;

#[async_trait::async_trait]
pub trait ImageResolver: Send + Sync {
    async fn resolve(&self) -> Result<String>;
}

/// An image pinned through settings or flags.
pub struct FixedImage(pub String);

#[async_trait::async_trait]
impl ImageResolver for FixedImage {
    async fn resolve(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Looks up the latest published migrator release.
pub struct ReleaseImageResolver {
    http: reqwest::Client,
    release_url: String,
    repository: String,
}

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
}

impl ReleaseImageResolver {
    pub fn new(release_url: Option<String>, repository: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("nais-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            release_url: release_url.unwrap_or_else(|| DEFAULT_RELEASE_URL.to_string()),
            repository: repository.unwrap_or_else(|| DEFAULT_IMAGE_REPOSITORY.to_string()),
        })
    }
}

#[async_trait::async_trait]
impl ImageResolver for ReleaseImageResolver {
    async fn resolve(&self) -> Result<String> {
        debug!("Looking up latest migrator release at {}", self.release_url);
        let release: Release = self
            .http
            .get(&self.release_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        image_reference(&self.repository, &release.tag_name)
    }
}

fn image_reference(repository: &str, tag: &str) -> Result<String> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Err(MigrateError::config_error(
            "latest migrator release has an empty tag",
        ));
    }
    Ok(format!("{}:{}", repository, tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_payload() {
        let payload = r#"{"tag_name": "2024-06-11-abc1234", "name": "release", "draft": false}"#;
        let release: Release = serde_json::from_str(payload).unwrap();
        assert_eq!(
            image_reference(DEFAULT_IMAGE_REPOSITORY, &release.tag_name).unwrap(),
            "europe-north1-docker.pkg.dev/nais-io/nais/images/cloudsql-migrator:2024-06-11-abc1234"
        );
    }

    #[test]
    fn test_empty_tag_rejected() {
        assert!(image_reference("repo", "  ").is_err());
    }

    #[tokio::test]
    async fn test_fixed_image() {
        let resolver = FixedImage("migrator:1".to_string());
        assert_eq!(resolver.resolve().await.unwrap(), "migrator:1");
    }
}
