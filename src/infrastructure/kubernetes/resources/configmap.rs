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

use crate::domain::migration::config::Config;
use crate::infrastructure::constants::{KEY_APP_NAME, KEY_NAMESPACE, PREFIX_SOURCE, PREFIX_TARGET};
use crate::infrastructure::kubernetes::resources::traits::LabeledResourceBuilder;
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

/// Builds the migration record: one ConfigMap holding both instance configs.
pub struct MigrationConfigMapBuilder<'a> {
    config: &'a Config,
}

impl<'a> MigrationConfigMapBuilder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn build(&self) -> ConfigMap {
        let metadata = ObjectMeta {
            name: Some(self.config.migration_name()),
            namespace: Some(self.config.namespace.clone()),
            labels: Some(self.get_labels()),
            ..Default::default()
        };

        ConfigMap {
            metadata,
            data: Some(self.build_data()),
            ..Default::default()
        }
    }

    /// Record contents, also used verbatim as the migrator job's environment.
    pub fn build_data(&self) -> BTreeMap<String, String> {
        let mut data = BTreeMap::new();
        data.insert(KEY_APP_NAME.to_string(), self.config.app_name.clone());
        data.insert(KEY_NAMESPACE.to_string(), self.config.namespace.clone());
        self.config.source.write_to_data(&mut data, PREFIX_SOURCE);
        self.config.target.write_to_data(&mut data, PREFIX_TARGET);
        data
    }
}

impl LabeledResourceBuilder for MigrationConfigMapBuilder<'_> {
    fn migration_config(&self) -> &Config {
        self.config
    }
}
