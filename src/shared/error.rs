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

use thiserror::Error;
pub type Result<T> = std::result::Result<T, MigrateError>;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("no sql instances found for application '{app}' in namespace '{namespace}'")]
    NoSqlInstances { app: String, namespace: String },

    #[error("migration config already exists for this application: '{app}' has in-flight migration '{name}'")]
    MigrationInProgress { app: String, name: String },

    #[error("source and target instance cannot be the same: '{0}'")]
    SameInstance(String),

    #[error("no migration in progress: migration config '{name}' not found in namespace '{namespace}'")]
    MigrationNotFound { name: String, namespace: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Kubernetes API error while trying to {operation}: {source}")]
    Kube {
        operation: String,
        #[source]
        source: kube::Error,
    },

    #[error("Resource not found: {resource_type} '{name}' in namespace '{namespace}'")]
    NotFound {
        resource_type: String,
        name: String,
        namespace: String,
    },

    #[error("Resource already exists: {resource_type} '{name}' in namespace '{namespace}'")]
    AlreadyExists {
        resource_type: String,
        name: String,
        namespace: String,
    },

    #[error("job '{job}' failed: {message}")]
    JobFailed { job: String, message: String },

    #[error("migration record is corrupt: key '{key}' has unparsable value '{value}'")]
    CorruptRecord { key: String, value: String },

    #[error("{phase} succeeded, but migration config '{name}' could not be deleted; delete it manually: {source}")]
    RecordCleanup {
        phase: String,
        name: String,
        #[source]
        source: Box<MigrateError>,
    },

    #[error("cancelled by user")]
    Cancelled,

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl MigrateError {
    pub fn config_error(context: impl Into<String>) -> Self {
        Self::Config(context.into())
    }

    pub fn validation(context: impl Into<String>) -> Self {
        Self::Validation(context.into())
    }

    pub fn kube(operation: impl Into<String>, source: kube::Error) -> Self {
        Self::Kube {
            operation: operation.into(),
            source,
        }
    }

    pub fn not_found(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    pub fn already_exists(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self::AlreadyExists {
            resource_type: resource_type.into(),
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    /// Errors the operator has to act on before re-running the command.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::NoSqlInstances { .. }
                | Self::MigrationInProgress { .. }
                | Self::SameInstance(_)
                | Self::MigrationNotFound { .. }
                | Self::Validation(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_classification() {
        assert!(MigrateError::SameInstance("db".to_string()).is_precondition());
        assert!(MigrateError::NoSqlInstances {
            app: "myapp".to_string(),
            namespace: "ns".to_string(),
        }
        .is_precondition());
        assert!(!MigrateError::Cancelled.is_precondition());
        assert!(!MigrateError::not_found("ConfigMap", "x", "ns").is_precondition());
    }

    #[test]
    fn test_record_cleanup_keeps_cause() {
        let err = MigrateError::RecordCleanup {
            phase: "finalize".to_string(),
            name: "migration-a-b".to_string(),
            source: Box::new(MigrateError::Timeout("slow".to_string())),
        };
        let cause = std::error::Error::source(&err).map(|e| e.to_string());
        assert_eq!(cause.as_deref(), Some("Timeout error: slow"));
        assert!(err.to_string().contains("migration-a-b"));
    }
}
