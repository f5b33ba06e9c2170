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

//! Derive instance settings from the live `Application` resource.

use crate::domain::migration::instance::InstanceConfig;
use crate::infrastructure::kubernetes::application::CloudSqlInstance;
use crate::infrastructure::kubernetes::client::MigrationKubeClient;
use crate::shared::error::{MigrateError, Result};
use tracing::{debug, warn};

impl InstanceConfig {
    /// Fill every unset field from the SQL instance declared by the
    /// application's `Application` resource. Fields already set are kept. Read
    /// only against the cluster.
    pub async fn resolve(&mut self, client: &dyn MigrationKubeClient, app_name: &str) -> Result<()> {
        let app = client.get_application(app_name).await?;
        let instances = app.sql_instances();

        let declared = match instances {
            [] => {
                return Err(MigrateError::NoSqlInstances {
                    app: app_name.to_string(),
                    namespace: client.namespace().to_string(),
                })
            }
            [only] => only,
            [first, ..] => {
                warn!(
                    "Application {} declares {} SQL instances, using the first one",
                    app_name,
                    instances.len()
                );
                first
            }
        };

        self.merge_declared(declared, app_name);
        debug!("Resolved instance for {}: {}", app_name, self);
        Ok(())
    }

    fn merge_declared(&mut self, declared: &CloudSqlInstance, app_name: &str) {
        if self.instance_name.is_none() {
            self.instance_name = Some(
                declared
                    .name
                    .clone()
                    .unwrap_or_else(|| app_name.to_string()),
            );
        }
        if self.tier.is_none() {
            self.tier = declared.tier.clone();
        }
        if self.disk_autoresize.is_none() {
            self.disk_autoresize = declared.disk_autoresize;
        }
        if self.disk_size.is_none() {
            self.disk_size = declared.disk_size;
        }
        if self.instance_type.is_none() {
            self.instance_type = declared.instance_type.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declared() -> CloudSqlInstance {
        CloudSqlInstance {
            name: Some("myinstance".to_string()),
            tier: Some("db-f1-micro".to_string()),
            disk_autoresize: Some(true),
            disk_size: Some(11),
            instance_type: Some("POSTGRES_15".to_string()),
        }
    }

    #[test]
    fn test_merge_fills_unset_fields() {
        let mut instance = InstanceConfig::default();
        instance.merge_declared(&declared(), "myapp");

        assert_eq!(instance.instance_name.as_deref(), Some("myinstance"));
        assert_eq!(instance.tier.as_deref(), Some("db-f1-micro"));
        assert_eq!(instance.disk_autoresize, Some(true));
        assert_eq!(instance.disk_size, Some(11));
        assert_eq!(instance.instance_type.as_deref(), Some("POSTGRES_15"));
    }

    #[test]
    fn test_merge_keeps_overrides_even_when_zero_like() {
        let mut instance = InstanceConfig {
            instance_name: Some(String::new()),
            tier: Some("db-custom-1-3840".to_string()),
            disk_autoresize: Some(false),
            disk_size: Some(0),
            instance_type: Some("POSTGRES_16".to_string()),
        };
        let before = instance.clone();
        instance.merge_declared(&declared(), "myapp");
        assert_eq!(instance, before);
    }

    #[test]
    fn test_merge_falls_back_to_app_name() {
        let mut instance = InstanceConfig::default();
        let declared = CloudSqlInstance {
            name: None,
            ..Default::default()
        };
        instance.merge_declared(&declared, "myapp");

        assert_eq!(instance.instance_name.as_deref(), Some("myapp"));
        assert_eq!(instance.disk_size, None);
        assert_eq!(instance.disk_autoresize, None);
        assert_eq!(instance.tier, None);
    }
}
