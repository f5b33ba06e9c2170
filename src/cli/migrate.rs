//! `nais postgres migrate` commands

use super::commands::GlobalArgs;
use super::display::TableRenderer;
use super::prompt::TerminalPrompter;
use crate::domain::config::Settings;
use crate::domain::migration::{list_migrations, Command, Config, Migrator, MigratorOptions};
use crate::infrastructure::kubernetes::{KubeMigrationClient, MigrationKubeClient};
use clap::Parser;
use std::sync::Arc;
use tracing::debug;

/// Application and target instance a migration is about.
#[derive(clap::Args, Debug, Clone)]
pub struct TargetArgs {
    /// Name of the application whose database is migrated
    pub app_name: String,

    /// Name of the new Cloud SQL instance
    pub target_instance_name: String,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Print the Kubernetes objects that would be created and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Return as soon as the job is started (setup, promote and cleanup only)
    #[arg(long)]
    pub no_wait: bool,

    /// Give up waiting for the job after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

#[derive(Parser, Debug, Clone)]
pub struct SetupCommand {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Tier of the target instance, e.g. db-custom-2-7680
    #[arg(long, env = "TARGET_INSTANCE_TIER")]
    pub tier: Option<String>,

    /// Let Cloud SQL grow the target disk automatically
    /// Without a value the flag means true
    #[arg(
        long,
        env = "TARGET_INSTANCE_DISK_AUTORESIZE",
        num_args = 0..=1,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    pub disk_autoresize: Option<bool>,

    /// Disk size of the target instance in GB
    #[arg(long, env = "TARGET_INSTANCE_DISK_SIZE", value_name = "GB")]
    pub disk_size: Option<i64>,

    /// Postgres version of the target instance, e.g. POSTGRES_16
    #[arg(long = "type", env = "TARGET_INSTANCE_TYPE", value_name = "TYPE")]
    pub instance_type: Option<String>,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Arguments of promote, finalize, rollback and cleanup.
#[derive(Parser, Debug, Clone)]
pub struct PhaseCommand {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {}

impl SetupCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let client = connect(global).await?;
        let mut cfg = Config::new(
            &self.target.app_name,
            client.namespace(),
            &self.target.target_instance_name,
        );
        cfg.target.tier = self.tier.clone();
        cfg.target.disk_autoresize = self.disk_autoresize;
        cfg.target.disk_size = self.disk_size;
        cfg.target.instance_type = self.instance_type.clone();

        let mut migrator = build_migrator(global, client, cfg, &self.run)?;
        migrator.setup().await?;
        Ok(())
    }
}

impl PhaseCommand {
    pub async fn execute(&self, global: &GlobalArgs, command: Command) -> anyhow::Result<()> {
        let client = connect(global).await?;
        let cfg = Config::new(
            &self.target.app_name,
            client.namespace(),
            &self.target.target_instance_name,
        );

        let mut migrator = build_migrator(global, client, cfg, &self.run)?;
        match command {
            Command::Promote => migrator.promote().await?,
            Command::Finalize => migrator.finalize().await?,
            Command::Rollback => migrator.rollback().await?,
            Command::Cleanup => migrator.cleanup().await?,
            Command::Setup => anyhow::bail!("setup takes its own arguments"),
        }
        Ok(())
    }
}

impl ListCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let client = connect(global).await?;
        let migrations = list_migrations(client.as_ref()).await?;

        let output = TableRenderer::new().render_migrations_list(
            client.namespace(),
            &migrations,
            chrono::Utc::now(),
        );
        println!("{}", output);
        Ok(())
    }
}

pub(crate) async fn connect(global: &GlobalArgs) -> anyhow::Result<Arc<dyn MigrationKubeClient>> {
    let client = KubeMigrationClient::new_with_config(
        global.namespace.clone(),
        global.kubeconfig.clone(),
        global.context.clone(),
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to connect to Kubernetes: {}", e))?;
    debug!("Using namespace {}", client.namespace());
    Ok(Arc::new(client))
}

fn build_migrator(
    global: &GlobalArgs,
    client: Arc<dyn MigrationKubeClient>,
    cfg: Config,
    run: &RunArgs,
) -> anyhow::Result<Migrator> {
    let settings = Settings::load(global.config_file.as_deref())?;
    let options = MigratorOptions {
        dry_run: run.dry_run,
        no_wait: run.no_wait,
        wait: settings.wait_options(run.timeout),
    };

    Ok(Migrator::new(
        client,
        Box::new(TerminalPrompter),
        settings.image_resolver()?,
        cfg,
        options,
    ))
}
