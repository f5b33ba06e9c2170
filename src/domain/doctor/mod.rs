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

//! Environment checks run by `nais doctor`. Every check is independent and
//! runs on its own task; results are collected before anything is shown.

use crate::domain::migration::record::list_migrations;
use crate::infrastructure::image::ImageResolver;
use crate::infrastructure::kubernetes::client::MigrationKubeClient;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Failed,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CheckStatus::Ok => "ok",
            CheckStatus::Warning => "warning",
            CheckStatus::Failed => "failed",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
        }
    }
}

type Check = BoxFuture<'static, CheckResult>;

pub struct Doctor {
    client: Arc<dyn MigrationKubeClient>,
    images: Arc<dyn ImageResolver>,
    app: Option<String>,
}

impl Doctor {
    pub fn new(
        client: Arc<dyn MigrationKubeClient>,
        images: Arc<dyn ImageResolver>,
        app: Option<String>,
    ) -> Self {
        Self {
            client,
            images,
            app,
        }
    }

    /// Run all checks concurrently. Results keep the order the checks were
    /// declared in.
    pub async fn run(&self) -> Vec<CheckResult> {
        let checks = self.checks();
        let (tx, mut rx) = mpsc::channel(checks.len().max(1));

        for (index, check) in checks.into_iter().enumerate() {
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = check.await;
                debug!("Check {} finished: {}", result.name, result.status);
                let _ = tx.send((index, result)).await;
            });
        }
        drop(tx);

        let mut results = Vec::new();
        while let Some(result) = rx.recv().await {
            results.push(result);
        }
        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, result)| result).collect()
    }

    fn checks(&self) -> Vec<Check> {
        let mut checks = vec![
            check_api(self.client.clone()).boxed(),
            check_namespace(self.client.clone()).boxed(),
            check_image(self.images.clone()).boxed(),
            check_migrations(self.client.clone()).boxed(),
        ];
        if let Some(ref app) = self.app {
            checks.push(check_application(self.client.clone(), app.clone()).boxed());
        }
        checks
    }
}

pub fn has_failures(results: &[CheckResult]) -> bool {
    results.iter().any(|r| r.status == CheckStatus::Failed)
}

async fn check_api(client: Arc<dyn MigrationKubeClient>) -> CheckResult {
    match client.server_version().await {
        Ok(version) => CheckResult::new(
            "kubernetes-api",
            CheckStatus::Ok,
            format!("reachable, server {}", version),
        ),
        Err(e) => CheckResult::new("kubernetes-api", CheckStatus::Failed, e.to_string()),
    }
}

async fn check_namespace(client: Arc<dyn MigrationKubeClient>) -> CheckResult {
    let namespace = client.namespace().to_string();
    match client.namespace_exists().await {
        Ok(true) => CheckResult::new(
            "namespace",
            CheckStatus::Ok,
            format!("{} exists", namespace),
        ),
        Ok(false) => CheckResult::new(
            "namespace",
            CheckStatus::Failed,
            format!("{} does not exist", namespace),
        ),
        Err(e) => CheckResult::new("namespace", CheckStatus::Failed, e.to_string()),
    }
}

async fn check_image(images: Arc<dyn ImageResolver>) -> CheckResult {
    match images.resolve().await {
        Ok(image) => CheckResult::new("migrator-image", CheckStatus::Ok, image),
        Err(e) => CheckResult::new("migrator-image", CheckStatus::Failed, e.to_string()),
    }
}

async fn check_migrations(client: Arc<dyn MigrationKubeClient>) -> CheckResult {
    match list_migrations(client.as_ref()).await {
        Ok(migrations) if migrations.is_empty() => {
            CheckResult::new("migrations", CheckStatus::Ok, "no migrations in progress")
        }
        Ok(migrations) => {
            let names: Vec<&str> = migrations.iter().map(|m| m.name.as_str()).collect();
            CheckResult::new(
                "migrations",
                CheckStatus::Warning,
                format!("{} in progress: {}", migrations.len(), names.join(", ")),
            )
        }
        Err(e) => CheckResult::new("migrations", CheckStatus::Failed, e.to_string()),
    }
}

async fn check_application(client: Arc<dyn MigrationKubeClient>, app: String) -> CheckResult {
    match client.get_application(&app).await {
        Ok(application) => match application.sql_instances() {
            [] => CheckResult::new(
                "application",
                CheckStatus::Failed,
                format!("{} declares no sql instances", app),
            ),
            [instance] => CheckResult::new(
                "application",
                CheckStatus::Ok,
                format!(
                    "{} uses sql instance {}",
                    app,
                    instance.name.as_deref().unwrap_or(&app)
                ),
            ),
            instances => CheckResult::new(
                "application",
                CheckStatus::Warning,
                format!(
                    "{} declares {} sql instances, only {} would be migrated",
                    app,
                    instances.len(),
                    instances[0].name.as_deref().unwrap_or(&app)
                ),
            ),
        },
        Err(e) => CheckResult::new("application", CheckStatus::Failed, e.to_string()),
    }
}
