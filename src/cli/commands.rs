// CLI command definitions

use super::doctor::DoctorCommand;
use super::migrate::{ListCommand, PhaseCommand, SetupCommand};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "nais",
    version,
    about = "Command line tool for Nais workloads",
    long_about = "Operate Nais workloads from the terminal, including migrating a Cloud SQL Postgres instance to a new instance"
)]
pub struct CliArgs {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection and tool settings shared by every command.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Path to kubeconfig file
    /// If not specified, uses default kubeconfig resolution (KUBECONFIG env or ~/.kube/config)
    #[arg(long, global = true)]
    pub kubeconfig: Option<String>,

    /// Kubernetes context to use
    #[arg(long, global = true)]
    pub context: Option<String>,

    /// Namespace of the application; defaults to the namespace of the current context
    #[arg(long, short = 'n', global = true)]
    pub namespace: Option<String>,

    /// Settings file (TOML)
    #[arg(long, global = true, env = "NAIS_CLI_CONFIG", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Log debug output of this tool
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Work with the Postgres databases of an application
    Postgres(PostgresCommand),

    /// Check that the cluster and tooling are ready for a migration
    Doctor(DoctorCommand),
}

#[derive(Parser, Debug)]
pub struct PostgresCommand {
    #[command(subcommand)]
    pub command: PostgresCommands,
}

#[derive(clap::Subcommand, Debug)]
pub enum PostgresCommands {
    /// Migrate an application's Cloud SQL instance to a new instance
    Migrate(MigrateCommand),
}

#[derive(Parser, Debug)]
pub struct MigrateCommand {
    #[command(subcommand)]
    pub command: MigrateCommands,
}

#[derive(clap::Subcommand, Debug)]
pub enum MigrateCommands {
    /// Create the target instance and start replicating from the source
    Setup(SetupCommand),

    /// Switch the application over to the target instance
    Promote(PhaseCommand),

    /// Delete the source instance and end the migration
    Finalize(PhaseCommand),

    /// Abandon the target instance and return to the source
    Rollback(PhaseCommand),

    /// Remove leftovers of a migration
    Cleanup(PhaseCommand),

    /// List migrations in progress
    List(ListCommand),
}

impl PostgresCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        match &self.command {
            PostgresCommands::Migrate(cmd) => cmd.execute(global).await,
        }
    }
}

impl MigrateCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        use crate::domain::migration::Command;

        match &self.command {
            MigrateCommands::Setup(cmd) => cmd.execute(global).await,
            MigrateCommands::Promote(cmd) => cmd.execute(global, Command::Promote).await,
            MigrateCommands::Finalize(cmd) => cmd.execute(global, Command::Finalize).await,
            MigrateCommands::Rollback(cmd) => cmd.execute(global, Command::Rollback).await,
            MigrateCommands::Cleanup(cmd) => cmd.execute(global, Command::Cleanup).await,
            MigrateCommands::List(cmd) => cmd.execute(global).await,
        }
    }
}
