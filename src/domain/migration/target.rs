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

//! Interactive completion of the target instance during setup.

use crate::domain::migration::config::Config;
use crate::domain::migration::instance::{display_opt, validate_disk_size, validate_tier, PostgresVersion};
use crate::domain::migration::prompt::{prompt_until_valid, Prompter};
use crate::infrastructure::constants::{SUGGESTED_DISK_SIZES, SUGGESTED_TIERS, SUGGESTED_TYPES};
use crate::shared::error::{MigrateError, Result};
use std::fmt::Display;
use tracing::{debug, warn};

/// What one entry of a target question resolves to.
#[derive(Debug, Clone, PartialEq)]
enum Answer<T> {
    SameAsSource,
    Value(T),
    Unset,
    Other,
}

/// One question about a target field.
struct Question<'a, T> {
    label: &'a str,
    source: &'a Option<T>,
    suggestions: Vec<(String, T)>,
    allow_unset: Option<&'a str>,
    custom: Option<fn(&str) -> Result<T>>,
}

impl<'a, T: Clone + Display> Question<'a, T> {
    fn ask(self, prompter: &dyn Prompter) -> Result<Option<T>> {
        let mut answers = vec![Answer::SameAsSource];
        let mut items = vec![format!("Same as source ({})", display_opt(self.source))];

        for (label, value) in &self.suggestions {
            answers.push(Answer::Value(value.clone()));
            items.push(label.clone());
        }
        if let Some(label) = self.allow_unset {
            answers.push(Answer::Unset);
            items.push(label.to_string());
        }
        if self.custom.is_some() {
            answers.push(Answer::Other);
            items.push("Other (enter a value)".to_string());
        }

        let index = prompter.select(self.label, &items)?;
        let answer = answers.get(index).cloned().ok_or_else(|| {
            MigrateError::validation(format!("selection {} is out of range", index))
        })?;

        match answer {
            Answer::SameAsSource => Ok(self.source.clone()),
            Answer::Value(value) => Ok(Some(value)),
            Answer::Unset => Ok(None),
            Answer::Other => match self.custom {
                Some(parse) => prompt_until_valid(prompter, self.label, parse).map(Some),
                None => Ok(None),
            },
        }
    }
}

/// Ask for every target field the user left unset.
///
/// Disk autoresize and disk size are decided together. With autoresize on,
/// an explicit size is optional and may stay unset. With autoresize off the
/// size matters and is asked for. When the user set autoresize explicitly but
/// gave no size, the size is left unset.
pub fn configure_target(cfg: &mut Config, prompter: &dyn Prompter) -> Result<()> {
    configure_tier(cfg, prompter)?;
    configure_disk(cfg, prompter)?;
    configure_type(cfg, prompter)?;
    debug!("Configured target instance: {}", cfg.target);
    Ok(())
}

fn configure_tier(cfg: &mut Config, prompter: &dyn Prompter) -> Result<()> {
    if cfg.target.tier.is_some() {
        return Ok(());
    }
    cfg.target.tier = Question {
        label: "Tier of the target instance",
        source: &cfg.source.tier,
        suggestions: SUGGESTED_TIERS
            .iter()
            .map(|t| (t.to_string(), t.to_string()))
            .collect(),
        allow_unset: None,
        custom: Some(parse_tier),
    }
    .ask(prompter)?;
    Ok(())
}

fn configure_disk(cfg: &mut Config, prompter: &dyn Prompter) -> Result<()> {
    let explicit_autoresize = cfg.target.disk_autoresize.is_some();

    if !explicit_autoresize {
        cfg.target.disk_autoresize = Question {
            label: "Automatic disk size increase for the target instance",
            source: &cfg.source.disk_autoresize,
            suggestions: vec![("Enabled".to_string(), true), ("Disabled".to_string(), false)],
            allow_unset: None,
            custom: None,
        }
        .ask(prompter)?;
    }

    if cfg.target.disk_size.is_some() || explicit_autoresize {
        return Ok(());
    }

    let autoresize = cfg.target.disk_autoresize.unwrap_or(false);
    cfg.target.disk_size = Question {
        label: "Disk size (GB) of the target instance",
        source: &cfg.source.disk_size,
        suggestions: SUGGESTED_DISK_SIZES
            .iter()
            .map(|size| (format!("{} GB", size), *size))
            .collect(),
        allow_unset: autoresize.then_some("Leave unset (grows automatically)"),
        custom: Some(parse_disk_size),
    }
    .ask(prompter)?;
    Ok(())
}

fn configure_type(cfg: &mut Config, prompter: &dyn Prompter) -> Result<()> {
    if cfg.target.instance_type.is_some() {
        return Ok(());
    }

    let minimum = cfg
        .source
        .instance_type
        .as_deref()
        .and_then(|t| PostgresVersion::parse(t).ok());
    let suggestions = SUGGESTED_TYPES
        .iter()
        .filter(|t| match (minimum, PostgresVersion::parse(t)) {
            (Some(min), Ok(version)) => version >= min,
            _ => true,
        })
        .map(|t| (t.to_string(), t.to_string()))
        .collect();

    cfg.target.instance_type = Question {
        label: "Postgres version of the target instance",
        source: &cfg.source.instance_type,
        suggestions,
        allow_unset: None,
        custom: Some(parse_type),
    }
    .ask(prompter)?;
    Ok(())
}

/// Refuse a target running an older major version than the source. A source
/// type that is not a version tag cannot be compared and is let through.
pub fn check_version_order(cfg: &Config) -> Result<()> {
    let (Some(source), Some(target)) = (
        cfg.source.instance_type.as_deref(),
        cfg.target.instance_type.as_deref(),
    ) else {
        return Ok(());
    };

    let Ok(source_version) = PostgresVersion::parse(source) else {
        warn!(
            "Source type {} is not a Postgres version, skipping the version order check",
            source
        );
        return Ok(());
    };
    if PostgresVersion::parse(target)? < source_version {
        return Err(MigrateError::validation(format!(
            "target type {} is older than source type {}, downgrades are not supported",
            target, source
        )));
    }
    Ok(())
}

fn parse_tier(answer: &str) -> Result<String> {
    validate_tier(answer)?;
    Ok(answer.to_string())
}

fn parse_disk_size(answer: &str) -> Result<i64> {
    let size = answer
        .parse::<i64>()
        .map_err(|_| MigrateError::validation(format!("'{}' is not a whole number of GB", answer)))?;
    validate_disk_size(size)?;
    Ok(size)
}

fn parse_type(answer: &str) -> Result<String> {
    PostgresVersion::parse(answer)?;
    Ok(answer.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_custom_answers() {
        assert_eq!(parse_tier("db-custom-8-30720").unwrap(), "db-custom-8-30720");
        assert!(parse_tier("custom-8").is_err());
        assert_eq!(parse_disk_size("42").unwrap(), 42);
        assert!(matches!(
            parse_disk_size("lots"),
            Err(MigrateError::Validation(_))
        ));
        assert!(parse_disk_size("5").is_err());
        assert!(parse_type("POSTGRES_17").is_ok());
    }

    #[test]
    fn test_version_order() {
        let mut cfg = Config::new("myapp", "mynamespace", "target-instance");
        cfg.source.instance_type = Some("POSTGRES_15".to_string());
        cfg.target.instance_type = Some("POSTGRES_16".to_string());
        assert!(check_version_order(&cfg).is_ok());

        cfg.target.instance_type = Some("POSTGRES_14".to_string());
        assert!(check_version_order(&cfg).is_err());

        cfg.source.instance_type = None;
        assert!(check_version_order(&cfg).is_ok());
    }

    #[test]
    fn test_unversioned_source_type_is_not_compared() {
        let mut cfg = Config::new("myapp", "mynamespace", "target-instance");
        cfg.source.instance_type = Some("POSTGRES_LATEST".to_string());
        cfg.target.instance_type = Some("POSTGRES_16".to_string());
        assert!(check_version_order(&cfg).is_ok());

        cfg.target.instance_type = Some("POSTGRES_LATEST".to_string());
        assert!(check_version_order(&cfg).is_ok());
    }
}
