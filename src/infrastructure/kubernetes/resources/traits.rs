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
use crate::infrastructure::constants::{
    LABEL_APP_NAME, LABEL_COMPONENT, LABEL_COMPONENT_VALUE, LABEL_MANAGED_BY,
    LABEL_MANAGED_BY_VALUE, LABEL_MIGRATION_NAME, LABEL_TARGET_INSTANCE_NAME,
};
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use std::collections::BTreeMap;

pub trait LabeledResourceBuilder {
    fn migration_config(&self) -> &Config;

    fn get_labels(&self) -> BTreeMap<String, String> {
        base_labels(self.migration_config())
    }
}

/// Labels shared by every object belonging to one migration.
pub fn base_labels(cfg: &Config) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert(LABEL_MANAGED_BY.to_string(), LABEL_MANAGED_BY_VALUE.to_string());
    labels.insert(LABEL_COMPONENT.to_string(), LABEL_COMPONENT_VALUE.to_string());
    labels.insert(LABEL_APP_NAME.to_string(), cfg.app_name.clone());
    labels.insert(
        LABEL_TARGET_INSTANCE_NAME.to_string(),
        cfg.target.name().to_string(),
    );
    labels.insert(LABEL_MIGRATION_NAME.to_string(), cfg.migration_name());
    labels
}

/// The persisted migration record, as owner of everything created for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOwner {
    pub name: String,
    pub uid: String,
}

impl RecordOwner {
    pub fn from_config_map(config_map: &ConfigMap) -> Option<Self> {
        let name = config_map.metadata.name.clone()?;
        let uid = config_map.metadata.uid.clone()?;
        Some(Self { name, uid })
    }

    pub fn owner_references(owner: Option<&RecordOwner>) -> Option<Vec<OwnerReference>> {
        owner.map(|o| {
            vec![OwnerReference {
                api_version: "v1".to_string(),
                kind: "ConfigMap".to_string(),
                name: o.name.clone(),
                uid: o.uid.clone(),
                controller: Some(true),
                block_owner_deletion: Some(true),
            }]
        })
    }
}
