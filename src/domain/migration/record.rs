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

//! The migration record: a ConfigMap that is the only durable state of a
//! migration. Present means "in progress", absent means "nothing to resume".

use crate::domain::migration::config::Config;
use crate::domain::migration::instance::record_key;
use crate::infrastructure::constants::{
    KEY_APP_NAME, KEY_INSTANCE_NAME, LABEL_APP_NAME, LABEL_MANAGED_BY, LABEL_MANAGED_BY_VALUE,
    PREFIX_SOURCE, PREFIX_TARGET,
};
use crate::infrastructure::kubernetes::client::MigrationKubeClient;
use crate::infrastructure::kubernetes::resources::MigrationConfigMapBuilder;
use crate::shared::error::{MigrateError, Result};
use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::ConfigMap;
use tracing::{debug, info};

impl Config {
    /// Build the record for this migration. Nothing is sent to the cluster.
    pub fn create_config_map(&self) -> ConfigMap {
        MigrationConfigMapBuilder::new(self).build()
    }

    /// Load the record named by [`Config::migration_name`] and fill both
    /// instance configs from it. Values already set in memory win over the
    /// persisted ones.
    pub async fn populate_from_config_map(
        &mut self,
        client: &dyn MigrationKubeClient,
    ) -> Result<ConfigMap> {
        let name = self.migration_name();
        let config_map = match client.get_configmap(&name).await {
            Ok(cm) => cm,
            Err(e) if e.is_not_found() => {
                return Err(MigrateError::MigrationNotFound {
                    name,
                    namespace: client.namespace().to_string(),
                })
            }
            Err(e) => return Err(e),
        };

        self.source
            .populate_from_config_map(&config_map, PREFIX_SOURCE)?;
        self.target
            .populate_from_config_map(&config_map, PREFIX_TARGET)?;
        debug!("Loaded migration record {}", name);

        Ok(config_map)
    }
}

pub fn app_label_selector(app_name: &str) -> String {
    format!("{}={}", LABEL_APP_NAME, app_name)
}

pub fn managed_label_selector() -> String {
    format!("{}={}", LABEL_MANAGED_BY, LABEL_MANAGED_BY_VALUE)
}

/// Reject a second migration for an application that already has a record.
///
/// List-then-create is not atomic: two operators starting a migration for the
/// same application at the same moment can both pass this check.
pub async fn ensure_no_migration_for_app(
    client: &dyn MigrationKubeClient,
    app_name: &str,
) -> Result<()> {
    let existing = client
        .list_configmaps(&app_label_selector(app_name))
        .await?;

    if let Some(record) = existing.first() {
        return Err(MigrateError::MigrationInProgress {
            app: app_name.to_string(),
            name: record.metadata.name.clone().unwrap_or_default(),
        });
    }
    Ok(())
}

pub async fn delete_record(client: &dyn MigrationKubeClient, name: &str) -> Result<()> {
    client.delete_configmap(name).await?;
    info!("Deleted migration record {}", name);
    Ok(())
}

/// One in-flight migration as shown by `migrate list`.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationSummary {
    pub name: String,
    pub app_name: String,
    pub source_instance: Option<String>,
    pub target_instance: Option<String>,
    pub created: Option<DateTime<Utc>>,
}

impl MigrationSummary {
    pub fn from_config_map(config_map: &ConfigMap) -> Option<Self> {
        let name = config_map.metadata.name.clone()?;
        let data = config_map.data.as_ref();
        let field = |key: String| data.and_then(|d| d.get(&key)).cloned();

        let app_name = config_map
            .metadata
            .labels
            .as_ref()
            .and_then(|l| l.get(LABEL_APP_NAME))
            .cloned()
            .or_else(|| field(KEY_APP_NAME.to_string()))?;

        Some(Self {
            name,
            app_name,
            source_instance: field(record_key(PREFIX_SOURCE, KEY_INSTANCE_NAME)),
            target_instance: field(record_key(PREFIX_TARGET, KEY_INSTANCE_NAME)),
            created: config_map.metadata.creation_timestamp.as_ref().map(|t| t.0),
        })
    }
}

pub async fn list_migrations(client: &dyn MigrationKubeClient) -> Result<Vec<MigrationSummary>> {
    let records = client.list_configmaps(&managed_label_selector()).await?;
    let mut migrations: Vec<MigrationSummary> = records
        .iter()
        .filter_map(MigrationSummary::from_config_map)
        .collect();
    migrations.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(migrations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selectors() {
        assert_eq!(app_label_selector("myapp"), "migrator.nais.io/app-name=myapp");
        assert_eq!(managed_label_selector(), "app.kubernetes.io/managed-by=nais-cli");
    }

    #[test]
    fn test_summary_from_record() {
        let mut cfg = Config::new("myapp", "mynamespace", "target-instance");
        cfg.source.instance_name = Some("myinstance".to_string());
        let summary = MigrationSummary::from_config_map(&cfg.create_config_map()).unwrap();

        assert_eq!(summary.name, "migration-myapp-target-instance");
        assert_eq!(summary.app_name, "myapp");
        assert_eq!(summary.source_instance.as_deref(), Some("myinstance"));
        assert_eq!(summary.target_instance.as_deref(), Some("target-instance"));
        assert_eq!(summary.created, None);
    }
}
