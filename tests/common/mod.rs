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

//! In-memory cluster and scripted answers shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use k8s_openapi::api::batch::v1::{Job, JobCondition, JobStatus};
use k8s_openapi::api::core::v1::{ConfigMap, ServiceAccount};
use k8s_openapi::api::rbac::v1::RoleBinding;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use nais_cli::infrastructure::image::FixedImage;
use nais_cli::infrastructure::kubernetes::{Application, ApplicationSpec, CloudSqlInstance, GcpSpec};
use nais_cli::{
    Config, MigrateError, MigrationKubeClient, Migrator, MigratorOptions, Prompter, WaitOptions,
};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const NAMESPACE: &str = "mynamespace";
pub const IMAGE: &str = "cloudsql-migrator:test";

#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Complete,
    Fail(String),
    Pending,
}

#[derive(Default)]
struct State {
    applications: BTreeMap<String, Application>,
    configmaps: BTreeMap<String, ConfigMap>,
    service_accounts: BTreeMap<String, ServiceAccount>,
    rolebindings: BTreeMap<String, RoleBinding>,
    jobs: BTreeMap<String, Job>,
    created_jobs: Vec<String>,
    job_outcome: Option<JobOutcome>,
    fail_configmap_delete: bool,
    next_uid: u64,
}

/// A namespace held in memory. Jobs finish the moment they are created,
/// with the configured outcome.
pub struct FakeKubeClient {
    namespace: String,
    state: Mutex<State>,
}

impl FakeKubeClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            namespace: NAMESPACE.to_string(),
            state: Mutex::new(State::default()),
        })
    }

    pub fn with_application(&self, name: &str, instances: Vec<CloudSqlInstance>) {
        let spec = ApplicationSpec {
            image: Some(format!("ghcr.io/nais/{}:1", name)),
            gcp: Some(GcpSpec {
                sql_instances: instances,
            }),
        };
        let mut app = Application::new(name, spec);
        app.metadata.namespace = Some(self.namespace.clone());
        self.lock().applications.insert(name.to_string(), app);
    }

    pub fn set_job_outcome(&self, outcome: JobOutcome) {
        self.lock().job_outcome = Some(outcome);
    }

    pub fn fail_configmap_delete(&self) {
        self.lock().fail_configmap_delete = true;
    }

    /// Store a ConfigMap as if another run had created it.
    pub fn insert_configmap(&self, mut configmap: ConfigMap) {
        let mut state = self.lock();
        state.next_uid += 1;
        configmap.metadata.uid = Some(format!("uid-{}", state.next_uid));
        let name = configmap.metadata.name.clone().unwrap_or_default();
        state.configmaps.insert(name, configmap);
    }

    pub fn insert_job(&self, job: Job) {
        let name = job.metadata.name.clone().unwrap_or_default();
        self.lock().jobs.insert(name, job);
    }

    pub fn configmap(&self, name: &str) -> Option<ConfigMap> {
        self.lock().configmaps.get(name).cloned()
    }

    pub fn configmap_count(&self) -> usize {
        self.lock().configmaps.len()
    }

    pub fn job(&self, name: &str) -> Option<Job> {
        self.lock().jobs.get(name).cloned()
    }

    /// Names of every job created so far, in creation order.
    pub fn created_jobs(&self) -> Vec<String> {
        self.lock().created_jobs.clone()
    }

    /// Give an existing job a final status, as the cluster would once its pod
    /// exits.
    pub fn finish_job(&self, name: &str, outcome: JobOutcome) {
        if let Some(job) = self.lock().jobs.get_mut(name) {
            job.status = finished_status(&outcome);
        }
    }

    pub fn service_account(&self, name: &str) -> Option<ServiceAccount> {
        self.lock().service_accounts.get(name).cloned()
    }

    pub fn rolebinding(&self, name: &str) -> Option<RoleBinding> {
        self.lock().rolebindings.get(name).cloned()
    }

    pub fn has_service_account(&self, name: &str) -> bool {
        self.lock().service_accounts.contains_key(name)
    }

    pub fn has_rolebinding(&self, name: &str) -> bool {
        self.lock().rolebindings.contains_key(name)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn not_found(&self, resource_type: &str, name: &str) -> MigrateError {
        MigrateError::not_found(resource_type, name, &self.namespace)
    }

    fn already_exists(&self, resource_type: &str, name: &str) -> MigrateError {
        MigrateError::already_exists(resource_type, name, &self.namespace)
    }
}

fn matches_selector(metadata: &ObjectMeta, selector: &str) -> bool {
    let labels = metadata.labels.clone().unwrap_or_default();
    selector
        .split(',')
        .filter(|s| !s.is_empty())
        .all(|requirement| match requirement.split_once('=') {
            Some((key, value)) => labels.get(key).map(String::as_str) == Some(value),
            None => labels.contains_key(requirement),
        })
}

fn owned_by(metadata: &ObjectMeta, uid: &str) -> bool {
    metadata
        .owner_references
        .iter()
        .flatten()
        .any(|owner| owner.uid == uid)
}

fn finished_status(outcome: &JobOutcome) -> Option<JobStatus> {
    let condition = |type_: &str, message: Option<String>| JobCondition {
        type_: type_.to_string(),
        status: "True".to_string(),
        message,
        ..Default::default()
    };

    match outcome {
        JobOutcome::Pending => None,
        JobOutcome::Complete => Some(JobStatus {
            conditions: Some(vec![condition("Complete", None)]),
            succeeded: Some(1),
            ..Default::default()
        }),
        JobOutcome::Fail(message) => Some(JobStatus {
            conditions: Some(vec![condition("Failed", Some(message.clone()))]),
            failed: Some(1),
            ..Default::default()
        }),
    }
}

#[async_trait]
impl MigrationKubeClient for FakeKubeClient {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn server_version(&self) -> Result<String, MigrateError> {
        Ok("v1.30.2".to_string())
    }

    async fn namespace_exists(&self) -> Result<bool, MigrateError> {
        Ok(true)
    }

    async fn get_application(&self, name: &str) -> Result<Application, MigrateError> {
        self.lock()
            .applications
            .get(name)
            .cloned()
            .ok_or_else(|| self.not_found("Application", name))
    }

    async fn create_configmap(&self, configmap: &ConfigMap) -> Result<ConfigMap, MigrateError> {
        let name = configmap.metadata.name.clone().unwrap_or_default();
        let mut state = self.lock();
        if state.configmaps.contains_key(&name) {
            return Err(self.already_exists("ConfigMap", &name));
        }
        state.next_uid += 1;
        let mut created = configmap.clone();
        created.metadata.uid = Some(format!("uid-{}", state.next_uid));
        state.configmaps.insert(name, created.clone());
        Ok(created)
    }

    async fn get_configmap(&self, name: &str) -> Result<ConfigMap, MigrateError> {
        self.lock()
            .configmaps
            .get(name)
            .cloned()
            .ok_or_else(|| self.not_found("ConfigMap", name))
    }

    async fn list_configmaps(&self, label_selector: &str) -> Result<Vec<ConfigMap>, MigrateError> {
        Ok(self
            .lock()
            .configmaps
            .values()
            .filter(|cm| matches_selector(&cm.metadata, label_selector))
            .cloned()
            .collect())
    }

    async fn delete_configmap(&self, name: &str) -> Result<(), MigrateError> {
        let mut state = self.lock();
        if state.fail_configmap_delete {
            return Err(MigrateError::kube(
                format!("delete ConfigMap '{}'", name),
                kube::Error::Api(kube::error::ErrorResponse {
                    status: "Failure".to_string(),
                    message: "etcdserver: request timed out".to_string(),
                    reason: "InternalError".to_string(),
                    code: 500,
                }),
            ));
        }

        let removed = state
            .configmaps
            .remove(name)
            .ok_or_else(|| self.not_found("ConfigMap", name))?;

        // garbage collection of owned objects
        if let Some(uid) = removed.metadata.uid {
            state.service_accounts.retain(|_, sa| !owned_by(&sa.metadata, &uid));
            state.rolebindings.retain(|_, rb| !owned_by(&rb.metadata, &uid));
            state.jobs.retain(|_, job| !owned_by(&job.metadata, &uid));
        }
        Ok(())
    }

    async fn create_service_account(
        &self,
        service_account: &ServiceAccount,
    ) -> Result<(), MigrateError> {
        let name = service_account.metadata.name.clone().unwrap_or_default();
        let mut state = self.lock();
        if state.service_accounts.contains_key(&name) {
            return Err(self.already_exists("ServiceAccount", &name));
        }
        state.service_accounts.insert(name, service_account.clone());
        Ok(())
    }

    async fn adopt_service_account(
        &self,
        name: &str,
        owners: &[OwnerReference],
    ) -> Result<(), MigrateError> {
        let mut state = self.lock();
        let service_account = state
            .service_accounts
            .get_mut(name)
            .ok_or_else(|| self.not_found("ServiceAccount", name))?;
        service_account.metadata.owner_references = Some(owners.to_vec());
        Ok(())
    }

    async fn delete_service_account(&self, name: &str) -> Result<(), MigrateError> {
        self.lock()
            .service_accounts
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| self.not_found("ServiceAccount", name))
    }

    async fn create_rolebinding(&self, rolebinding: &RoleBinding) -> Result<(), MigrateError> {
        let name = rolebinding.metadata.name.clone().unwrap_or_default();
        let mut state = self.lock();
        if state.rolebindings.contains_key(&name) {
            return Err(self.already_exists("RoleBinding", &name));
        }
        state.rolebindings.insert(name, rolebinding.clone());
        Ok(())
    }

    async fn adopt_rolebinding(
        &self,
        name: &str,
        owners: &[OwnerReference],
    ) -> Result<(), MigrateError> {
        let mut state = self.lock();
        let rolebinding = state
            .rolebindings
            .get_mut(name)
            .ok_or_else(|| self.not_found("RoleBinding", name))?;
        rolebinding.metadata.owner_references = Some(owners.to_vec());
        Ok(())
    }

    async fn delete_rolebinding(&self, name: &str) -> Result<(), MigrateError> {
        self.lock()
            .rolebindings
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| self.not_found("RoleBinding", name))
    }

    async fn create_job(&self, job: &Job) -> Result<Job, MigrateError> {
        let name = job.metadata.name.clone().unwrap_or_default();
        let mut state = self.lock();
        if state.jobs.contains_key(&name) {
            return Err(self.already_exists("Job", &name));
        }
        let outcome = state.job_outcome.clone().unwrap_or(JobOutcome::Complete);
        let mut created = job.clone();
        created.status = finished_status(&outcome);
        state.jobs.insert(name.clone(), created.clone());
        state.created_jobs.push(name);
        Ok(created)
    }

    async fn get_job(&self, name: &str) -> Result<Job, MigrateError> {
        self.lock()
            .jobs
            .get(name)
            .cloned()
            .ok_or_else(|| self.not_found("Job", name))
    }

    async fn list_jobs(&self, label_selector: &str) -> Result<Vec<Job>, MigrateError> {
        Ok(self
            .lock()
            .jobs
            .values()
            .filter(|job| matches_selector(&job.metadata, label_selector))
            .cloned()
            .collect())
    }

    async fn delete_job(&self, name: &str) -> Result<(), MigrateError> {
        self.lock()
            .jobs
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| self.not_found("Job", name))
    }
}

#[derive(Default)]
struct Script {
    selections: VecDeque<usize>,
    inputs: VecDeque<String>,
    confirmations: VecDeque<bool>,
    asked: Vec<String>,
    offered: Vec<Vec<String>>,
}

/// Answers prompts from a fixed script. Running out of answers is an error,
/// so a test also fails when an unexpected question is asked.
#[derive(Clone, Default)]
pub struct ScriptedPrompter {
    script: Arc<Mutex<Script>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(self, index: usize) -> Self {
        self.script.lock().unwrap().selections.push_back(index);
        self
    }

    pub fn input(self, answer: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .inputs
            .push_back(answer.to_string());
        self
    }

    pub fn confirm(self, answer: bool) -> Self {
        self.script.lock().unwrap().confirmations.push_back(answer);
        self
    }

    /// Labels of every question asked, in order.
    pub fn asked(&self) -> Vec<String> {
        self.script.lock().unwrap().asked.clone()
    }

    /// Items offered by each selection, in order.
    pub fn offered(&self) -> Vec<Vec<String>> {
        self.script.lock().unwrap().offered.clone()
    }

    pub fn exhausted(&self) -> bool {
        let script = self.script.lock().unwrap();
        script.selections.is_empty() && script.inputs.is_empty() && script.confirmations.is_empty()
    }
}

fn unexpected(label: &str) -> MigrateError {
    MigrateError::config_error(format!("unexpected prompt: {}", label))
}

impl Prompter for ScriptedPrompter {
    fn select(&self, label: &str, items: &[String]) -> nais_cli::Result<usize> {
        let mut script = self.script.lock().unwrap();
        script.asked.push(label.to_string());
        script.offered.push(items.to_vec());
        script.selections.pop_front().ok_or_else(|| unexpected(label))
    }

    fn input(&self, label: &str) -> nais_cli::Result<String> {
        let mut script = self.script.lock().unwrap();
        script.asked.push(label.to_string());
        script.inputs.pop_front().ok_or_else(|| unexpected(label))
    }

    fn confirm(&self, label: &str) -> nais_cli::Result<bool> {
        let mut script = self.script.lock().unwrap();
        script.asked.push(label.to_string());
        script.confirmations.pop_front().ok_or_else(|| unexpected(label))
    }
}

pub fn sql_instance(name: &str) -> CloudSqlInstance {
    CloudSqlInstance {
        name: Some(name.to_string()),
        tier: Some("db-f1-micro".to_string()),
        disk_autoresize: Some(true),
        disk_size: Some(11),
        instance_type: Some("POSTGRES_15".to_string()),
    }
}

pub fn wait_options() -> WaitOptions {
    WaitOptions {
        poll_interval: Duration::from_millis(10),
        timeout: Some(Duration::from_secs(5)),
    }
}

pub fn options() -> MigratorOptions {
    MigratorOptions {
        dry_run: false,
        no_wait: false,
        wait: wait_options(),
    }
}

pub fn config(app: &str, target: &str) -> Config {
    Config::new(app, NAMESPACE, target)
}

pub fn migrator(
    client: &Arc<FakeKubeClient>,
    prompter: &ScriptedPrompter,
    cfg: Config,
    options: MigratorOptions,
) -> Migrator {
    Migrator::new(
        client.clone(),
        Box::new(prompter.clone()),
        Box::new(FixedImage(IMAGE.to_string())),
        cfg,
        options,
    )
}
