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
use crate::domain::migration::instance::InstanceConfig;
use crate::infrastructure::constants::{MAX_NAME_LENGTH, MIGRATION_NAME_PREFIX, NAME_HASH_LENGTH};
use sha2::{Digest, Sha256};

/// Parameters of one migration: which application, and the instance settings
/// on both sides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub app_name: String,
    pub namespace: String,
    pub source: InstanceConfig,
    pub target: InstanceConfig,
}

impl Config {
    pub fn new(
        app_name: impl Into<String>,
        namespace: impl Into<String>,
        target_instance_name: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            namespace: namespace.into(),
            source: InstanceConfig::default(),
            target: InstanceConfig::named(target_instance_name),
        }
    }

    /// Name of the migration record and prefix of every job name. Stable across
    /// runs and tool versions since resuming a migration depends on it.
    pub fn migration_name(&self) -> String {
        bounded_name(&format!(
            "{}-{}-{}",
            MIGRATION_NAME_PREFIX,
            self.app_name,
            self.target.name()
        ))
    }

    pub fn job_name(&self, command: Command) -> String {
        bounded_name(&format!("{}-{}", self.migration_name(), command))
    }
}

/// Keep `name` within the Kubernetes name limit. Longer names are cut and get a
/// short digest of the full name appended, so distinct inputs stay distinct.
pub fn bounded_name(name: &str) -> String {
    if name.len() <= MAX_NAME_LENGTH {
        return name.to_string();
    }

    let digest = Sha256::digest(name.as_bytes());
    let suffix: String = digest
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<String>()
        .chars()
        .take(NAME_HASH_LENGTH)
        .collect();

    let keep = MAX_NAME_LENGTH - NAME_HASH_LENGTH - 1;
    let prefix: String = name.chars().take(keep).collect();
    format!("{}-{}", prefix.trim_end_matches('-'), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_migration_name() {
        let cfg = Config::new("myapp", "mynamespace", "target-instance");
        assert_eq!(cfg.migration_name(), "migration-myapp-target-instance");
    }

    #[test]
    fn test_long_migration_name_is_hashed() {
        let cfg = Config::new(
            "a-very-long-application-name-for-testing",
            "mynamespace",
            "a-target-instance-with-a-long-name",
        );
        let name = cfg.migration_name();
        assert_eq!(
            name,
            "migration-a-very-long-application-name-for-testing-a-t-52c850e6"
        );
        assert_eq!(name.len(), MAX_NAME_LENGTH);
        assert_eq!(name, cfg.clone().migration_name());
    }

    #[test]
    fn test_job_names() {
        let cfg = Config::new("myapp", "mynamespace", "target-instance");
        assert_eq!(
            cfg.job_name(Command::Finalize),
            "migration-myapp-target-instance-finalize"
        );

        let long = Config::new(
            "a-very-long-application-name-for-testing",
            "mynamespace",
            "a-target-instance-with-a-long-name",
        );
        assert_eq!(
            long.job_name(Command::Setup),
            "migration-a-very-long-application-name-for-testing-a-t-6cf09ce8"
        );
    }

    #[test]
    fn test_name_at_limit_is_untouched() {
        let name = format!("migration-{}-{}", "a".repeat(30), "b".repeat(22));
        assert_eq!(name.len(), MAX_NAME_LENGTH);
        assert_eq!(bounded_name(&name), name);
    }

    #[test]
    fn test_trailing_dash_trimmed_before_suffix() {
        let name = format!("migration-{}-target-instance", "x".repeat(43));
        assert_eq!(
            bounded_name(&name),
            "migration-xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx-9d66e9d8"
        );
    }

    #[test]
    fn test_bounded_names_never_exceed_limit() {
        for app_len in [1usize, 20, 40, 63] {
            for target_len in [1usize, 30, 63] {
                let cfg = Config::new("a".repeat(app_len), "ns", "t".repeat(target_len));
                assert!(cfg.migration_name().len() <= MAX_NAME_LENGTH);
            }
        }
    }
}
