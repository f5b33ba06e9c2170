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

use crate::infrastructure::constants::{
    KEY_INSTANCE_DISK_AUTORESIZE, KEY_INSTANCE_DISK_SIZE, KEY_INSTANCE_NAME, KEY_INSTANCE_TIER,
    KEY_INSTANCE_TYPE, MIN_DISK_SIZE_GB, TIER_PREFIX,
};
use crate::shared::error::{MigrateError, Result};
use k8s_openapi::api::core::v1::ConfigMap;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

/// Desired settings of one database instance. `None` means "not decided yet":
/// it is filled in by resolution, never confused with an explicit `false`,
/// `0` or empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceConfig {
    pub instance_name: Option<String>,
    pub tier: Option<String>,
    pub disk_autoresize: Option<bool>,
    pub disk_size: Option<i64>,
    pub instance_type: Option<String>,
}

impl InstanceConfig {
    pub fn named(instance_name: impl Into<String>) -> Self {
        Self {
            instance_name: Some(instance_name.into()),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        self.instance_name.as_deref().unwrap_or("")
    }

    /// Serialize every set field as `PREFIX_FIELD`. Unset fields are omitted.
    pub fn write_to_data(&self, data: &mut BTreeMap<String, String>, prefix: &str) {
        if let Some(ref name) = self.instance_name {
            data.insert(record_key(prefix, KEY_INSTANCE_NAME), name.clone());
        }
        if let Some(ref tier) = self.tier {
            data.insert(record_key(prefix, KEY_INSTANCE_TIER), tier.clone());
        }
        if let Some(autoresize) = self.disk_autoresize {
            data.insert(
                record_key(prefix, KEY_INSTANCE_DISK_AUTORESIZE),
                autoresize.to_string(),
            );
        }
        if let Some(size) = self.disk_size {
            data.insert(record_key(prefix, KEY_INSTANCE_DISK_SIZE), size.to_string());
        }
        if let Some(ref instance_type) = self.instance_type {
            data.insert(record_key(prefix, KEY_INSTANCE_TYPE), instance_type.clone());
        }
    }

    /// Fill unset fields from a migration record. Values already present win.
    ///
    /// Only this tool writes the record, so a value that does not parse means
    /// the record was tampered with or written by an incompatible version. That
    /// is reported as [`MigrateError::CorruptRecord`] instead of defaulting,
    /// since a guessed value would change the parameters of a live migration.
    pub fn populate_from_config_map(&mut self, config_map: &ConfigMap, prefix: &str) -> Result<()> {
        let empty = BTreeMap::new();
        let data = config_map.data.as_ref().unwrap_or(&empty);
        let get = |field: &str| {
            let key = record_key(prefix, field);
            data.get(&key).map(|value| (key, value.clone()))
        };

        if self.instance_name.is_none() {
            self.instance_name = get(KEY_INSTANCE_NAME).map(|(_, v)| v);
        }
        if self.tier.is_none() {
            self.tier = get(KEY_INSTANCE_TIER).map(|(_, v)| v);
        }
        if self.disk_autoresize.is_none() {
            if let Some((key, value)) = get(KEY_INSTANCE_DISK_AUTORESIZE) {
                let parsed = value
                    .parse::<bool>()
                    .map_err(|_| MigrateError::CorruptRecord { key, value })?;
                self.disk_autoresize = Some(parsed);
            }
        }
        if self.disk_size.is_none() {
            if let Some((key, value)) = get(KEY_INSTANCE_DISK_SIZE) {
                let parsed = value
                    .parse::<i64>()
                    .map_err(|_| MigrateError::CorruptRecord { key, value })?;
                self.disk_size = Some(parsed);
            }
        }
        if self.instance_type.is_none() {
            self.instance_type = get(KEY_INSTANCE_TYPE).map(|(_, v)| v);
        }

        Ok(())
    }

    /// Check the values a user supplied through flags or environment.
    pub fn validate_overrides(&self) -> Result<()> {
        if let Some(ref tier) = self.tier {
            validate_tier(tier)?;
        }
        if let Some(size) = self.disk_size {
            validate_disk_size(size)?;
        }
        if let Some(ref instance_type) = self.instance_type {
            PostgresVersion::parse(instance_type)?;
        }
        Ok(())
    }
}

impl fmt::Display for InstanceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "name={} tier={} disk_autoresize={} disk_size={} type={}",
            display_opt(&self.instance_name),
            display_opt(&self.tier),
            display_opt(&self.disk_autoresize),
            display_opt(&self.disk_size),
            display_opt(&self.instance_type),
        )
    }
}

pub fn display_opt<T: fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

pub fn record_key(prefix: &str, field: &str) -> String {
    format!("{}_{}", prefix, field)
}

pub fn validate_tier(tier: &str) -> Result<()> {
    if !tier.starts_with(TIER_PREFIX) || tier.len() == TIER_PREFIX.len() {
        return Err(MigrateError::validation(format!(
            "tier '{}' must start with '{}'",
            tier, TIER_PREFIX
        )));
    }
    Ok(())
}

pub fn validate_disk_size(size: i64) -> Result<()> {
    if size < MIN_DISK_SIZE_GB {
        return Err(MigrateError::validation(format!(
            "disk size must be at least {} GB, got {}",
            MIN_DISK_SIZE_GB, size
        )));
    }
    Ok(())
}

/// Major version carried by a Cloud SQL type tag such as `POSTGRES_15`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PostgresVersion(pub u32);

impl PostgresVersion {
    pub fn parse(instance_type: &str) -> Result<Self> {
        let re = Regex::new(r"^POSTGRES_(\d+)$")
            .map_err(|e| MigrateError::config_error(format!("invalid version pattern: {}", e)))?;

        re.captures(instance_type)
            .and_then(|caps| caps.get(1))
            .and_then(|major| major.as_str().parse::<u32>().ok())
            .map(PostgresVersion)
            .ok_or_else(|| {
                MigrateError::validation(format!(
                    "type '{}' is not a Postgres version, expected POSTGRES_<major>",
                    instance_type
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn config_map(data: &[(&str, &str)]) -> ConfigMap {
        ConfigMap {
            metadata: ObjectMeta::default(),
            data: Some(
                data.iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn test_write_skips_unset_fields() {
        let instance = InstanceConfig {
            instance_name: Some("target".to_string()),
            disk_autoresize: Some(false),
            ..Default::default()
        };
        let mut data = BTreeMap::new();
        instance.write_to_data(&mut data, "TARGET");

        assert_eq!(data.len(), 2);
        assert_eq!(data.get("TARGET_INSTANCE_NAME").map(String::as_str), Some("target"));
        assert_eq!(
            data.get("TARGET_INSTANCE_DISK_AUTORESIZE").map(String::as_str),
            Some("false")
        );
        assert!(!data.contains_key("TARGET_INSTANCE_DISK_SIZE"));
    }

    #[test]
    fn test_populate_keeps_existing_values() {
        let cm = config_map(&[
            ("TARGET_INSTANCE_NAME", "target"),
            ("TARGET_INSTANCE_TIER", "db-f1-micro"),
            ("TARGET_INSTANCE_DISK_SIZE", "20"),
        ]);
        let mut instance = InstanceConfig {
            tier: Some("db-custom-1-3840".to_string()),
            ..Default::default()
        };
        instance.populate_from_config_map(&cm, "TARGET").unwrap();

        assert_eq!(instance.instance_name.as_deref(), Some("target"));
        assert_eq!(instance.tier.as_deref(), Some("db-custom-1-3840"));
        assert_eq!(instance.disk_size, Some(20));
        assert_eq!(instance.disk_autoresize, None);
    }

    #[test]
    fn test_populate_rejects_corrupt_values() {
        let cm = config_map(&[("SOURCE_INSTANCE_DISK_AUTORESIZE", "maybe")]);
        let mut instance = InstanceConfig::default();
        let err = instance.populate_from_config_map(&cm, "SOURCE").unwrap_err();
        assert!(matches!(
            err,
            MigrateError::CorruptRecord { ref key, ref value }
                if key == "SOURCE_INSTANCE_DISK_AUTORESIZE" && value == "maybe"
        ));

        let cm = config_map(&[("SOURCE_INSTANCE_DISK_SIZE", "ten")]);
        let mut instance = InstanceConfig::default();
        assert!(instance.populate_from_config_map(&cm, "SOURCE").is_err());
    }

    #[test]
    fn test_validate_overrides() {
        let valid = InstanceConfig {
            tier: Some("db-custom-2-7680".to_string()),
            disk_size: Some(10),
            instance_type: Some("POSTGRES_16".to_string()),
            ..Default::default()
        };
        assert!(valid.validate_overrides().is_ok());

        let bad_tier = InstanceConfig {
            tier: Some("f1-micro".to_string()),
            ..Default::default()
        };
        assert!(bad_tier.validate_overrides().is_err());

        let small_disk = InstanceConfig {
            disk_size: Some(9),
            ..Default::default()
        };
        assert!(small_disk.validate_overrides().is_err());

        let bad_type = InstanceConfig {
            instance_type: Some("MYSQL_8_0".to_string()),
            ..Default::default()
        };
        assert!(bad_type.validate_overrides().is_err());
    }

    #[test]
    fn test_postgres_version_ordering() {
        let v15 = PostgresVersion::parse("POSTGRES_15").unwrap();
        let v9 = PostgresVersion::parse("POSTGRES_9").unwrap();
        assert!(v15 > v9);
        assert_eq!(v15, PostgresVersion(15));
    }
}
