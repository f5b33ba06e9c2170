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

use crate::shared::error::MigrateError;
use std::fmt;
use std::str::FromStr;

/// One phase of a migration, as understood by the migrator image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Setup,
    Promote,
    Finalize,
    Rollback,
    Cleanup,
}

impl Command {
    pub const ALL: [Command; 5] = [
        Command::Setup,
        Command::Promote,
        Command::Finalize,
        Command::Rollback,
        Command::Cleanup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Setup => "setup",
            Command::Promote => "promote",
            Command::Finalize => "finalize",
            Command::Rollback => "rollback",
            Command::Cleanup => "cleanup",
        }
    }

    /// Phases that end the migration and remove its record once the job succeeds.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Command::Finalize | Command::Rollback)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = MigrateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| MigrateError::config_error(format!("Invalid migration command: {}", s)))
    }
}
