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
use crate::domain::migration::orchestrator::{
    kubectl_label_selector, JobOrchestrator, Submission, WaitOptions,
};
use crate::domain::migration::prompt::Prompter;
use crate::domain::migration::record::{delete_record, ensure_no_migration_for_app};
use crate::domain::migration::summary::render_summary;
use crate::domain::migration::target::{check_version_order, configure_target};
use crate::infrastructure::image::ImageResolver;
use crate::infrastructure::kubernetes::client::MigrationKubeClient;
use crate::infrastructure::kubernetes::resources::{
    MigrationJobBuilder, MigratorAccessBuilder, RecordOwner,
};
use crate::shared::error::{MigrateError, Result};
use k8s_openapi::api::core::v1::ConfigMap;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct MigratorOptions {
    /// Print the objects a phase would create instead of creating them.
    pub dry_run: bool,
    /// Return once the job is submitted. Ignored by finalize, rollback and a
    /// cleanup without record.
    pub no_wait: bool,
    pub wait: WaitOptions,
}

/// Drives one migration through its phases. The migration record in the
/// cluster is the only state carried between invocations.
pub struct Migrator {
    client: Arc<dyn MigrationKubeClient>,
    prompter: Box<dyn Prompter>,
    images: Box<dyn ImageResolver>,
    cfg: Config,
    options: MigratorOptions,
}

impl Migrator {
    pub fn new(
        client: Arc<dyn MigrationKubeClient>,
        prompter: Box<dyn Prompter>,
        images: Box<dyn ImageResolver>,
        cfg: Config,
        options: MigratorOptions,
    ) -> Self {
        Self {
            client,
            prompter,
            images,
            cfg,
            options,
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Start a migration: resolve the source from the running application,
    /// complete the target, persist the record and run the setup job.
    pub async fn setup(&mut self) -> Result<()> {
        let client = self.client.clone();
        info!("Setting up migration for {}", self.cfg.app_name);

        self.cfg.target.validate_overrides()?;
        ensure_no_migration_for_app(client.as_ref(), &self.cfg.app_name).await?;

        let app_name = self.cfg.app_name.clone();
        self.cfg.source.resolve(client.as_ref(), &app_name).await?;
        if self.cfg.source.name() == self.cfg.target.name() {
            return Err(MigrateError::SameInstance(self.cfg.target.name().to_string()));
        }

        configure_target(&mut self.cfg, self.prompter.as_ref())?;
        check_version_order(&self.cfg)?;

        println!("{}", render_summary(&self.cfg));
        let image = self.images.resolve().await?;
        let record = self.cfg.create_config_map();

        if self.options.dry_run {
            return self.print_manifests(Command::Setup, &image, Some(&record));
        }

        let question = format!(
            "Create {} as a copy of {}? The application keeps running on the source until promote.",
            self.cfg.target.name(),
            self.cfg.source.name()
        );
        if !self.prompter.confirm(&question)? {
            println!("Setup aborted, nothing was changed");
            return Ok(());
        }

        let record = client.create_configmap(&record).await?;
        info!("Created migration record {}", self.cfg.migration_name());
        let owner = RecordOwner::from_config_map(&record);

        self.run_phase(Command::Setup, &image, owner.as_ref(), !self.options.no_wait)
            .await
    }

    /// Switch the application over to the target instance.
    pub async fn promote(&mut self) -> Result<()> {
        let record = self.load_record().await?;

        println!("{}", render_summary(&self.cfg));
        let image = self.images.resolve().await?;
        if self.options.dry_run {
            return self.print_manifests(Command::Promote, &image, None);
        }

        let question = format!(
            "Promote {} and point {} at it? The application will be unavailable during the switch.",
            self.cfg.target.name(),
            self.cfg.app_name
        );
        if !self.prompter.confirm(&question)? {
            println!("Promote aborted, nothing was changed");
            return Ok(());
        }

        let owner = RecordOwner::from_config_map(&record);
        self.run_phase(Command::Promote, &image, owner.as_ref(), !self.options.no_wait)
            .await
    }

    /// Delete the source instance and end the migration.
    pub async fn finalize(&mut self) -> Result<()> {
        let question = |cfg: &Config| {
            format!(
                "Finalize will permanently delete the source instance {}. This cannot be undone. Continue?",
                cfg.source.name()
            )
        };
        self.run_terminal_phase(Command::Finalize, question).await
    }

    /// Delete the target instance, keep the source and end the migration.
    pub async fn rollback(&mut self) -> Result<()> {
        let question = |cfg: &Config| {
            format!(
                "Rollback will delete the target instance {} and return {} to {}. Continue?",
                cfg.target.name(),
                cfg.app_name,
                cfg.source.name()
            )
        };
        self.run_terminal_phase(Command::Rollback, question).await
    }

    /// Remove what an earlier migration left behind. Works with or without a
    /// record and never changes it.
    pub async fn cleanup(&mut self) -> Result<()> {
        let owner = match self.load_record().await {
            Ok(record) => RecordOwner::from_config_map(&record),
            Err(MigrateError::MigrationNotFound { name, .. }) => {
                warn!("No migration record {}, cleaning up by name only", name);
                None
            }
            Err(e) => return Err(e),
        };

        let image = self.images.resolve().await?;
        if self.options.dry_run {
            return self.print_manifests(Command::Cleanup, &image, None);
        }

        match owner {
            Some(owner) => {
                self.run_phase(Command::Cleanup, &image, Some(&owner), !self.options.no_wait)
                    .await
            }
            None => self.run_unowned_cleanup(&image).await,
        }
    }

    /// Without a record nothing garbage collects the job and its access, so
    /// wait for the job and remove them here.
    async fn run_unowned_cleanup(&self, image: &str) -> Result<()> {
        if self.options.no_wait {
            warn!("Waiting for cleanup anyway, its service account is removed afterwards");
        }

        let result = self.run_phase(Command::Cleanup, image, None, true).await;
        if let Err(MigrateError::Cancelled | MigrateError::Timeout(_)) = &result {
            warn!("Cleanup job still running, run cleanup again to remove its service account");
            return result;
        }

        let orchestrator = JobOrchestrator::new(self.client.as_ref(), &self.cfg);
        let revoked = orchestrator.revoke_access().await;
        result?;
        revoked?;

        let job = self.cfg.job_name(Command::Cleanup);
        match self.client.delete_job(&job).await {
            Ok(()) => info!("Deleted job {}", job),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }
        Ok(())
    }

    async fn run_terminal_phase(
        &mut self,
        command: Command,
        question: impl Fn(&Config) -> String,
    ) -> Result<()> {
        let record = self.load_record().await?;

        println!("{}", render_summary(&self.cfg));
        let image = self.images.resolve().await?;
        if self.options.dry_run {
            return self.print_manifests(command, &image, None);
        }

        if !self.prompter.confirm(&question(&self.cfg))? {
            println!("{} aborted, nothing was changed", command);
            return Ok(());
        }

        let owner = RecordOwner::from_config_map(&record);
        self.run_phase(command, &image, owner.as_ref(), true).await?;

        let name = self.cfg.migration_name();
        delete_record(self.client.as_ref(), &name)
            .await
            .map_err(|e| MigrateError::RecordCleanup {
                phase: command.to_string(),
                name,
                source: Box::new(e),
            })?;
        println!("Migration of {} is complete", self.cfg.app_name);
        Ok(())
    }

    async fn load_record(&mut self) -> Result<ConfigMap> {
        let client = self.client.clone();
        self.cfg.populate_from_config_map(client.as_ref()).await
    }

    async fn run_phase(
        &self,
        command: Command,
        image: &str,
        owner: Option<&RecordOwner>,
        wait: bool,
    ) -> Result<()> {
        let orchestrator = JobOrchestrator::new(self.client.as_ref(), &self.cfg);
        orchestrator.ensure_access(owner).await?;
        match orchestrator.submit(command, image, owner).await? {
            Submission::Completed(job) => {
                println!("{} already completed in job {}", command, job);
                return Ok(());
            }
            Submission::Running(job) => println!("Resuming {} job {}", command, job),
            Submission::Created(job) => println!("Started {} job {}", command, job),
        }
        println!(
            "Follow its progress with: kubectl logs -n {} -f {}",
            self.cfg.namespace,
            kubectl_label_selector(&self.cfg, command)
        );

        if !wait {
            println!("Not waiting for the job to finish");
            return Ok(());
        }

        orchestrator
            .wait_for_job_completion(command, &self.options.wait)
            .await?;
        println!("{} finished successfully", command);
        Ok(())
    }

    fn print_manifests(
        &self,
        command: Command,
        image: &str,
        record: Option<&ConfigMap>,
    ) -> Result<()> {
        let access = MigratorAccessBuilder::new(&self.cfg);
        let mut documents = Vec::new();

        if let Some(record) = record {
            documents.push(serde_yaml::to_string(record)?);
        }
        documents.push(serde_yaml::to_string(&access.build_service_account(None))?);
        documents.push(serde_yaml::to_string(&access.build_role_binding(None))?);
        documents.push(serde_yaml::to_string(
            &MigrationJobBuilder::new(&self.cfg, command, image).build(),
        )?);

        println!("{}", documents.join("---\n"));
        Ok(())
    }
}
