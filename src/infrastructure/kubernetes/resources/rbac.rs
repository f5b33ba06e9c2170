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
use crate::infrastructure::constants::{MIGRATOR_CLUSTER_ROLE, RBAC_API_GROUP};
use crate::infrastructure::kubernetes::resources::traits::{LabeledResourceBuilder, RecordOwner};
use k8s_openapi::api::core::v1::ServiceAccount;
use k8s_openapi::api::rbac::v1::{RoleBinding, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Identity the migrator job runs as, and the binding that grants it access.
pub struct MigratorAccessBuilder<'a> {
    config: &'a Config,
}

impl<'a> MigratorAccessBuilder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn service_account_name(&self) -> String {
        self.config.migration_name()
    }

    fn metadata(&self, owner: Option<&RecordOwner>) -> ObjectMeta {
        ObjectMeta {
            name: Some(self.config.migration_name()),
            namespace: Some(self.config.namespace.clone()),
            labels: Some(self.get_labels()),
            owner_references: RecordOwner::owner_references(owner),
            ..Default::default()
        }
    }

    pub fn build_service_account(&self, owner: Option<&RecordOwner>) -> ServiceAccount {
        ServiceAccount {
            metadata: self.metadata(owner),
            ..Default::default()
        }
    }

    pub fn build_role_binding(&self, owner: Option<&RecordOwner>) -> RoleBinding {
        RoleBinding {
            metadata: self.metadata(owner),
            role_ref: RoleRef {
                api_group: RBAC_API_GROUP.to_string(),
                kind: "ClusterRole".to_string(),
                name: MIGRATOR_CLUSTER_ROLE.to_string(),
            },
            subjects: Some(vec![Subject {
                kind: "ServiceAccount".to_string(),
                name: self.service_account_name(),
                namespace: Some(self.config.namespace.clone()),
                api_group: None,
            }]),
        }
    }
}

impl LabeledResourceBuilder for MigratorAccessBuilder<'_> {
    fn migration_config(&self) -> &Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_binding_targets_service_account() {
        let cfg = Config::new("myapp", "mynamespace", "target-instance");
        let owner = RecordOwner {
            name: cfg.migration_name(),
            uid: "uid-1".to_string(),
        };
        let rb = MigratorAccessBuilder::new(&cfg).build_role_binding(Some(&owner));

        assert_eq!(rb.role_ref.kind, "ClusterRole");
        assert_eq!(rb.role_ref.name, "cloudsql-migrator");
        let subjects = rb.subjects.unwrap();
        assert_eq!(subjects[0].name, "migration-myapp-target-instance");
        assert_eq!(subjects[0].namespace.as_deref(), Some("mynamespace"));

        let owners = rb.metadata.owner_references.unwrap();
        assert_eq!(owners[0].uid, "uid-1");
        assert_eq!(owners[0].kind, "ConfigMap");
    }

    #[test]
    fn test_service_account_without_owner() {
        let cfg = Config::new("myapp", "mynamespace", "target-instance");
        let sa = MigratorAccessBuilder::new(&cfg).build_service_account(None);
        assert!(sa.metadata.owner_references.is_none());
        assert_eq!(
            sa.metadata.name.as_deref(),
            Some("migration-myapp-target-instance")
        );
    }
}
