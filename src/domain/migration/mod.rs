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

pub mod command;
pub mod config;
pub mod instance;
pub mod migrator;
pub mod orchestrator;
pub mod prompt;
pub mod record;
pub mod resolver;
pub mod summary;
pub mod target;

pub use command::Command;
pub use config::{bounded_name, Config};
pub use instance::{InstanceConfig, PostgresVersion};
pub use migrator::{Migrator, MigratorOptions};
pub use orchestrator::{JobOrchestrator, JobState, Submission, WaitOptions};
pub use prompt::Prompter;
pub use record::{list_migrations, MigrationSummary};
pub use target::configure_target;
