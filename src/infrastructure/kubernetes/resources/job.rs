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

use crate::domain::migration::command::Command;
use crate::domain::migration::config::Config;
use crate::infrastructure::constants::{
    CONTAINER_NAME_MIGRATOR, JOB_BACKOFF_LIMIT, LABEL_MIGRATION_STAGE, RESTART_POLICY_NEVER,
};
use crate::infrastructure::kubernetes::resources::configmap::MigrationConfigMapBuilder;
use crate::infrastructure::kubernetes::resources::rbac::MigratorAccessBuilder;
use crate::infrastructure::kubernetes::resources::traits::{
    base_labels, LabeledResourceBuilder, RecordOwner,
};
use k8s_openapi::api::batch::v1::{Job, JobSpec};
use k8s_openapi::api::core::v1::{Container, EnvVar, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

/// Builds the Job that runs one migration phase inside the migrator image.
pub struct MigrationJobBuilder<'a> {
    config: &'a Config,
    command: Command,
    image: String,
}

impl<'a> MigrationJobBuilder<'a> {
    pub fn new(config: &'a Config, command: Command, image: impl Into<String>) -> Self {
        Self {
            config,
            command,
            image: image.into(),
        }
    }

    pub fn build(&self) -> Job {
        self.build_with_owner(None)
    }

    pub fn build_with_owner(&self, owner: Option<&RecordOwner>) -> Job {
        let labels = self.get_labels();

        let metadata = ObjectMeta {
            name: Some(self.config.job_name(self.command)),
            namespace: Some(self.config.namespace.clone()),
            labels: Some(labels.clone()),
            owner_references: RecordOwner::owner_references(owner),
            ..Default::default()
        };

        let container = Container {
            name: CONTAINER_NAME_MIGRATOR.to_string(),
            image: Some(self.image.clone()),
            args: Some(vec![self.command.as_str().to_string()]),
            env: Some(self.build_env_vars()),
            ..Default::default()
        };

        let template = PodTemplateSpec {
            metadata: Some(ObjectMeta {
                labels: Some(labels),
                ..Default::default()
            }),
            spec: Some(PodSpec {
                containers: vec![container],
                restart_policy: Some(RESTART_POLICY_NEVER.to_string()),
                service_account_name: Some(
                    MigratorAccessBuilder::new(self.config).service_account_name(),
                ),
                ..Default::default()
            }),
        };

        Job {
            metadata,
            spec: Some(JobSpec {
                backoff_limit: Some(JOB_BACKOFF_LIMIT),
                template,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn build_env_vars(&self) -> Vec<EnvVar> {
        MigrationConfigMapBuilder::new(self.config)
            .build_data()
            .into_iter()
            .map(|(name, value)| EnvVar {
                name,
                value: Some(value),
                ..Default::default()
            })
            .collect()
    }
}

impl LabeledResourceBuilder for MigrationJobBuilder<'_> {
    fn migration_config(&self) -> &Config {
        self.config
    }

    fn get_labels(&self) -> BTreeMap<String, String> {
        let mut labels = base_labels(self.config);
        labels.insert(
            LABEL_MIGRATION_STAGE.to_string(),
            self.command.as_str().to_string(),
        );
        labels
    }
}
