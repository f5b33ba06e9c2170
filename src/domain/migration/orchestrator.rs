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
    DEFAULT_POLL_INTERVAL_SECS, LABEL_MIGRATION_NAME, LABEL_MIGRATION_STAGE,
};
use crate::infrastructure::kubernetes::client::MigrationKubeClient;
use crate::infrastructure::kubernetes::resources::{
    MigrationJobBuilder, MigratorAccessBuilder, RecordOwner,
};
use crate::shared::error::{MigrateError, Result};
use k8s_openapi::api::batch::v1::Job;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// How long and how often to poll a submitted job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitOptions {
    pub poll_interval: Duration,
    /// No limit when unset. Ctrl-C always stops the wait.
    pub timeout: Option<Duration>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            timeout: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Running,
    Succeeded,
    Failed(String),
}

/// Read the outcome of a job from its status conditions.
pub fn job_state(job: &Job) -> JobState {
    let Some(status) = job.status.as_ref() else {
        return JobState::Running;
    };

    for condition in status.conditions.iter().flatten() {
        if condition.status != "True" {
            continue;
        }
        match condition.type_.as_str() {
            "Complete" => return JobState::Succeeded,
            "Failed" => {
                let message = condition
                    .message
                    .clone()
                    .or_else(|| condition.reason.clone())
                    .unwrap_or_else(|| "job failed".to_string());
                return JobState::Failed(message);
            }
            _ => {}
        }
    }

    if status.succeeded.unwrap_or(0) >= 1 {
        return JobState::Succeeded;
    }
    JobState::Running
}

/// Selector matching the jobs of one phase of a migration.
pub fn job_label_selector(cfg: &Config, command: Command) -> String {
    format!(
        "{}={},{}={}",
        LABEL_MIGRATION_NAME,
        cfg.migration_name(),
        LABEL_MIGRATION_STAGE,
        command
    )
}

/// Arguments for `kubectl logs` that follow the pods of one phase.
pub fn kubectl_label_selector(cfg: &Config, command: Command) -> String {
    format!("-l {}", job_label_selector(cfg, command))
}

/// What [`JobOrchestrator::submit`] found or did for a phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// A new job was created.
    Created(String),
    /// A job from an earlier run is still running and is followed instead.
    Running(String),
    /// The phase already succeeded in an earlier run.
    Completed(String),
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
pub async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Submits migrator jobs for one migration and follows them to completion.
pub struct JobOrchestrator<'a> {
    client: &'a dyn MigrationKubeClient,
    cfg: &'a Config,
}

impl<'a> JobOrchestrator<'a> {
    pub fn new(client: &'a dyn MigrationKubeClient, cfg: &'a Config) -> Self {
        Self { client, cfg }
    }

    /// Create the service account and its role binding. Existing ones are
    /// reused, and handed to `owner` when there is one.
    pub async fn ensure_access(&self, owner: Option<&RecordOwner>) -> Result<()> {
        let builder = MigratorAccessBuilder::new(self.cfg);
        let name = builder.service_account_name();
        let owners = RecordOwner::owner_references(owner);

        match self
            .client
            .create_service_account(&builder.build_service_account(owner))
            .await
        {
            Ok(()) => info!("Created service account {}", name),
            Err(MigrateError::AlreadyExists { .. }) => {
                debug!("Service account {} already exists", name);
                if let Some(owners) = &owners {
                    self.client.adopt_service_account(&name, owners).await?;
                }
            }
            Err(e) => return Err(e),
        }

        match self
            .client
            .create_rolebinding(&builder.build_role_binding(owner))
            .await
        {
            Ok(()) => info!("Created role binding {}", name),
            Err(MigrateError::AlreadyExists { .. }) => {
                debug!("Role binding {} already exists", name);
                if let Some(owners) = &owners {
                    self.client.adopt_rolebinding(&name, owners).await?;
                }
            }
            Err(e) => return Err(e),
        }

        Ok(())
    }

    /// Delete the service account and role binding. Only needed when no record
    /// owns them.
    pub async fn revoke_access(&self) -> Result<()> {
        let name = MigratorAccessBuilder::new(self.cfg).service_account_name();

        match self.client.delete_rolebinding(&name).await {
            Ok(()) => info!("Deleted role binding {}", name),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }
        match self.client.delete_service_account(&name).await {
            Ok(()) => info!("Deleted service account {}", name),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Make sure a job for `command` runs. A job left over from an earlier
    /// attempt is reused while running or succeeded, and replaced once failed.
    pub async fn submit(
        &self,
        command: Command,
        image: &str,
        owner: Option<&RecordOwner>,
    ) -> Result<Submission> {
        let name = self.cfg.job_name(command);

        match self.client.get_job(&name).await {
            Ok(existing) => match job_state(&existing) {
                JobState::Running => {
                    info!("Job {} is still running, following it", name);
                    return Ok(Submission::Running(name));
                }
                JobState::Succeeded => {
                    info!("Job {} already succeeded", name);
                    return Ok(Submission::Completed(name));
                }
                JobState::Failed(message) => {
                    info!("Replacing failed job {}: {}", name, message);
                    self.client.delete_job(&name).await?;
                }
            },
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let job = MigrationJobBuilder::new(self.cfg, command, image).build_with_owner(owner);
        self.client.create_job(&job).await?;
        info!("Submitted job {} running {}", name, image);

        Ok(Submission::Created(name))
    }

    /// Poll the jobs of `command` until one finished. Ctrl-C ends the wait with
    /// [`MigrateError::Cancelled`] and the timeout with [`MigrateError::Timeout`].
    pub async fn wait_for_job_completion(
        &self,
        command: Command,
        options: &WaitOptions,
    ) -> Result<()> {
        self.wait_for_job_completion_until(command, options, interrupted())
            .await
    }

    /// Like [`JobOrchestrator::wait_for_job_completion`], cancelled when
    /// `cancel` resolves instead of on Ctrl-C.
    pub async fn wait_for_job_completion_until<F>(
        &self,
        command: Command,
        options: &WaitOptions,
        cancel: F,
    ) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let poll = self.poll_until_finished(command, options.poll_interval);

        let bounded = async {
            match options.timeout {
                Some(limit) => match tokio::time::timeout(limit, poll).await {
                    Ok(result) => result,
                    Err(_) => Err(MigrateError::Timeout(format!(
                        "job '{}' did not finish within {:?}",
                        self.cfg.job_name(command),
                        limit
                    ))),
                },
                None => poll.await,
            }
        };

        tokio::select! {
            result = bounded => result,
            _ = cancel => Err(MigrateError::Cancelled),
        }
    }

    async fn poll_until_finished(&self, command: Command, interval: Duration) -> Result<()> {
        let selector = job_label_selector(self.cfg, command);

        loop {
            let jobs = self.client.list_jobs(&selector).await?;
            debug!("Polled {} job(s) for {}", jobs.len(), selector);

            for job in &jobs {
                let name = job.metadata.name.clone().unwrap_or_default();
                match job_state(job) {
                    JobState::Succeeded => {
                        info!("Job {} completed", name);
                        return Ok(());
                    }
                    JobState::Failed(message) => {
                        return Err(MigrateError::JobFailed { job: name, message })
                    }
                    JobState::Running => {}
                }
            }

            sleep(interval).await;
        }
    }
}
