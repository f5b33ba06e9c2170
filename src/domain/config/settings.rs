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

use crate::domain::migration::WaitOptions;
use crate::infrastructure::constants::DEFAULT_POLL_INTERVAL_SECS;
use crate::infrastructure::image::{FixedImage, ImageResolver, ReleaseImageResolver};
use crate::shared::error::{MigrateError, Result};
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::Path;
use std::time::Duration;

/// Optional tool settings read from a TOML file.
///
/// ```toml
/// poll_interval_secs = 10
/// wait_timeout_secs = 3600
/// migrator_image = "europe-north1-docker.pkg.dev/nais-io/nais/images/cloudsql-migrator:v1.2.3"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub poll_interval_secs: u64,
    pub wait_timeout_secs: Option<u64>,
    /// Use this image instead of looking up the latest release.
    pub migrator_image: Option<String>,
    pub image_repository: Option<String>,
    pub release_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            wait_timeout_secs: None,
            migrator_image: None,
            image_repository: None,
            release_url: None,
        }
    }
}

impl Settings {
    pub fn from<T: AsRef<Path>>(path: T) -> Result<Self> {
        let path = path.as_ref();
        let content = read_to_string(path).map_err(|e| {
            MigrateError::config_error(format!(
                "Failed to read settings file {}: {}",
                path.display(),
                e
            ))
        })?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Defaults when no path is given. A path that was given must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            return Err(MigrateError::config_error(
                "poll_interval_secs must be greater than zero",
            ));
        }
        if self.wait_timeout_secs == Some(0) {
            return Err(MigrateError::config_error(
                "wait_timeout_secs must be greater than zero when set",
            ));
        }
        Ok(())
    }

    /// `timeout_override` comes from `--timeout` and wins over the file.
    pub fn wait_options(&self, timeout_override: Option<u64>) -> WaitOptions {
        WaitOptions {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            timeout: timeout_override
                .or(self.wait_timeout_secs)
                .map(Duration::from_secs),
        }
    }

    pub fn image_resolver(&self) -> Result<Box<dyn ImageResolver>> {
        if let Some(ref image) = self.migrator_image {
            return Ok(Box::new(FixedImage(image.clone())));
        }
        let resolver =
            ReleaseImageResolver::new(self.release_url.clone(), self.image_repository.clone())?;
        Ok(Box::new(resolver))
    }
}
