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

use crate::infrastructure::kubernetes::application::Application;
use crate::shared::error::MigrateError;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, ServiceAccount};
use k8s_openapi::api::rbac::v1::RoleBinding;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use kube::api::{DeleteParams, ListParams, Patch, PatchParams, PostParams, PropagationPolicy};
use kube::{Api, Client};

/// Cluster operations the migration core depends on. Every call is scoped to
/// the namespace the client was created for.
#[async_trait::async_trait]
pub trait MigrationKubeClient: Send + Sync {
    fn namespace(&self) -> &str;

    async fn server_version(&self) -> Result<String, MigrateError>;

    async fn namespace_exists(&self) -> Result<bool, MigrateError>;

    async fn get_application(&self, name: &str) -> Result<Application, MigrateError>;

    async fn create_configmap(&self, configmap: &ConfigMap) -> Result<ConfigMap, MigrateError>;

    async fn get_configmap(&self, name: &str) -> Result<ConfigMap, MigrateError>;

    async fn list_configmaps(&self, label_selector: &str) -> Result<Vec<ConfigMap>, MigrateError>;

    async fn delete_configmap(&self, name: &str) -> Result<(), MigrateError>;

    async fn create_service_account(
        &self,
        service_account: &ServiceAccount,
    ) -> Result<(), MigrateError>;

    /// Replace the owner references of an existing service account.
    async fn adopt_service_account(
        &self,
        name: &str,
        owners: &[OwnerReference],
    ) -> Result<(), MigrateError>;

    async fn delete_service_account(&self, name: &str) -> Result<(), MigrateError>;

    async fn create_rolebinding(&self, rolebinding: &RoleBinding) -> Result<(), MigrateError>;

    async fn adopt_rolebinding(
        &self,
        name: &str,
        owners: &[OwnerReference],
    ) -> Result<(), MigrateError>;

    async fn delete_rolebinding(&self, name: &str) -> Result<(), MigrateError>;

    async fn create_job(&self, job: &Job) -> Result<Job, MigrateError>;

    async fn get_job(&self, name: &str) -> Result<Job, MigrateError>;

    async fn list_jobs(&self, label_selector: &str) -> Result<Vec<Job>, MigrateError>;

    async fn delete_job(&self, name: &str) -> Result<(), MigrateError>;
}

pub struct KubeMigrationClient {
    client: Client,
    namespace: String,
}

impl KubeMigrationClient {
    /// Uses the default kubeconfig resolution. Without an explicit namespace the
    /// namespace of the current context is used.
    pub async fn new(namespace: Option<String>) -> Result<Self, MigrateError> {
        let client = Client::try_default()
            .await
            .map_err(|e| MigrateError::kube("create Kubernetes client", e))?;
        let namespace = namespace.unwrap_or_else(|| client.default_namespace().to_string());

        Ok(Self { client, namespace })
    }

    pub async fn new_with_config(
        namespace: Option<String>,
        kubeconfig_path: Option<String>,
        context: Option<String>,
    ) -> Result<Self, MigrateError> {
        use kube::config::{KubeConfigOptions, Kubeconfig};

        if kubeconfig_path.is_none() && context.is_none() {
            return Self::new(namespace).await;
        }

        let kubeconfig = if let Some(path) = kubeconfig_path {
            Kubeconfig::read_from(&path).map_err(|e| {
                MigrateError::config_error(format!("Failed to load kubeconfig {}: {}", path, e))
            })?
        } else {
            Kubeconfig::read()
                .map_err(|e| MigrateError::config_error(format!("Failed to load kubeconfig: {}", e)))?
        };

        let config_options = KubeConfigOptions {
            context,
            cluster: None,
            user: None,
        };

        let config = kube::Config::from_custom_kubeconfig(kubeconfig, &config_options)
            .await
            .map_err(|e| {
                MigrateError::config_error(format!("Failed to create Kubernetes config: {}", e))
            })?;

        let client = Client::try_from(config)
            .map_err(|e| MigrateError::kube("create Kubernetes client", e))?;
        let namespace = namespace.unwrap_or_else(|| client.default_namespace().to_string());

        Ok(Self { client, namespace })
    }

    fn map_error(&self, err: kube::Error, resource_type: &str, name: &str, operation: &str) -> MigrateError {
        match err {
            kube::Error::Api(ae) if ae.code == 404 => {
                MigrateError::not_found(resource_type, name, &self.namespace)
            }
            kube::Error::Api(ae) if ae.code == 409 => {
                MigrateError::already_exists(resource_type, name, &self.namespace)
            }
            e => MigrateError::kube(format!("{} {} '{}'", operation, resource_type, name), e),
        }
    }
}

fn owner_patch(owners: &[OwnerReference]) -> serde_json::Value {
    serde_json::json!({
        "metadata": {
            "ownerReferences": owners
        }
    })
}

fn object_name(metadata: &ObjectMeta, resource_type: &str) -> Result<String, MigrateError> {
    metadata
        .name
        .clone()
        .ok_or_else(|| MigrateError::config_error(format!("{} name is required", resource_type)))
}

#[async_trait::async_trait]
impl MigrationKubeClient for KubeMigrationClient {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn server_version(&self) -> Result<String, MigrateError> {
        let info = self
            .client
            .apiserver_version()
            .await
            .map_err(|e| MigrateError::kube("query API server version", e))?;
        Ok(info.git_version)
    }

    async fn namespace_exists(&self) -> Result<bool, MigrateError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        match api.get(&self.namespace).await {
            Ok(_) => Ok(true),
            Err(kube::Error::Api(ae)) if ae.code == 404 => Ok(false),
            Err(e) => Err(MigrateError::kube(
                format!("get Namespace '{}'", self.namespace),
                e,
            )),
        }
    }

    async fn get_application(&self, name: &str) -> Result<Application, MigrateError> {
        let api: Api<Application> = Api::namespaced(self.client.clone(), &self.namespace);
        api.get(name)
            .await
            .map_err(|e| self.map_error(e, "Application", name, "get"))
    }

    async fn create_configmap(&self, configmap: &ConfigMap) -> Result<ConfigMap, MigrateError> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), &self.namespace);
        let name = object_name(&configmap.metadata, "ConfigMap")?;
        let pp = PostParams::default();

        api.create(&pp, configmap)
            .await
            .map_err(|e| self.map_error(e, "ConfigMap", &name, "create"))
    }

    async fn get_configmap(&self, name: &str) -> Result<ConfigMap, MigrateError> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), &self.namespace);
        api.get(name)
            .await
            .map_err(|e| self.map_error(e, "ConfigMap", name, "get"))
    }

    async fn list_configmaps(&self, label_selector: &str) -> Result<Vec<ConfigMap>, MigrateError> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), &self.namespace);
        let list_params = ListParams::default().labels(label_selector);

        api.list(&list_params)
            .await
            .map(|list| list.items)
            .map_err(|e| MigrateError::kube(format!("list ConfigMaps with {}", label_selector), e))
    }

    async fn delete_configmap(&self, name: &str) -> Result<(), MigrateError> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), &self.namespace);
        // Owned jobs and RBAC objects are garbage collected with the record.
        let dp = DeleteParams {
            propagation_policy: Some(PropagationPolicy::Background),
            ..Default::default()
        };

        api.delete(name, &dp)
            .await
            .map_err(|e| self.map_error(e, "ConfigMap", name, "delete"))?;
        Ok(())
    }

    async fn create_service_account(
        &self,
        service_account: &ServiceAccount,
    ) -> Result<(), MigrateError> {
        let api: Api<ServiceAccount> = Api::namespaced(self.client.clone(), &self.namespace);
        let name = object_name(&service_account.metadata, "ServiceAccount")?;
        let pp = PostParams::default();

        api.create(&pp, service_account)
            .await
            .map_err(|e| self.map_error(e, "ServiceAccount", &name, "create"))?;
        Ok(())
    }

    async fn adopt_service_account(
        &self,
        name: &str,
        owners: &[OwnerReference],
    ) -> Result<(), MigrateError> {
        let api: Api<ServiceAccount> = Api::namespaced(self.client.clone(), &self.namespace);
        let patch = owner_patch(owners);

        api.patch(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(|e| self.map_error(e, "ServiceAccount", name, "patch"))?;
        Ok(())
    }

    async fn delete_service_account(&self, name: &str) -> Result<(), MigrateError> {
        let api: Api<ServiceAccount> = Api::namespaced(self.client.clone(), &self.namespace);
        api.delete(name, &DeleteParams::default())
            .await
            .map_err(|e| self.map_error(e, "ServiceAccount", name, "delete"))?;
        Ok(())
    }

    async fn create_rolebinding(&self, rolebinding: &RoleBinding) -> Result<(), MigrateError> {
        let api: Api<RoleBinding> = Api::namespaced(self.client.clone(), &self.namespace);
        let name = object_name(&rolebinding.metadata, "RoleBinding")?;
        let pp = PostParams::default();

        api.create(&pp, rolebinding)
            .await
            .map_err(|e| self.map_error(e, "RoleBinding", &name, "create"))?;
        Ok(())
    }

    async fn adopt_rolebinding(
        &self,
        name: &str,
        owners: &[OwnerReference],
    ) -> Result<(), MigrateError> {
        let api: Api<RoleBinding> = Api::namespaced(self.client.clone(), &self.namespace);
        let patch = owner_patch(owners);

        api.patch(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(|e| self.map_error(e, "RoleBinding", name, "patch"))?;
        Ok(())
    }

    async fn delete_rolebinding(&self, name: &str) -> Result<(), MigrateError> {
        let api: Api<RoleBinding> = Api::namespaced(self.client.clone(), &self.namespace);
        api.delete(name, &DeleteParams::default())
            .await
            .map_err(|e| self.map_error(e, "RoleBinding", name, "delete"))?;
        Ok(())
    }

    async fn create_job(&self, job: &Job) -> Result<Job, MigrateError> {
        let api: Api<Job> = Api::namespaced(self.client.clone(), &self.namespace);
        let name = object_name(&job.metadata, "Job")?;
        let pp = PostParams::default();

        api.create(&pp, job)
            .await
            .map_err(|e| self.map_error(e, "Job", &name, "create"))
    }

    async fn get_job(&self, name: &str) -> Result<Job, MigrateError> {
        let api: Api<Job> = Api::namespaced(self.client.clone(), &self.namespace);
        api.get(name)
            .await
            .map_err(|e| self.map_error(e, "Job", name, "get"))
    }

    async fn list_jobs(&self, label_selector: &str) -> Result<Vec<Job>, MigrateError> {
        let api: Api<Job> = Api::namespaced(self.client.clone(), &self.namespace);
        let list_params = ListParams::default().labels(label_selector);

        api.list(&list_params)
            .await
            .map(|list| list.items)
            .map_err(|e| MigrateError::kube(format!("list Jobs with {}", label_selector), e))
    }

    async fn delete_job(&self, name: &str) -> Result<(), MigrateError> {
        let api: Api<Job> = Api::namespaced(self.client.clone(), &self.namespace);
        let dp = DeleteParams {
            propagation_policy: Some(PropagationPolicy::Background),
            ..Default::default()
        };

        api.delete(name, &dp)
            .await
            .map_err(|e| self.map_error(e, "Job", name, "delete"))?;
        Ok(())
    }
}
