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

//! Nais `Application` custom resource, reduced to the fields the migration reads.

use kube::CustomResource;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[kube(
    group = "nais.io",
    version = "v1alpha1",
    kind = "Application",
    namespaced,
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcp: Option<GcpSpec>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GcpSpec {
    #[serde(default)]
    pub sql_instances: Vec<CloudSqlInstance>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CloudSqlInstance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_autoresize: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_size: Option<i64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
}

impl Application {
    /// SQL instances declared under `spec.gcp.sqlInstances`
    pub fn sql_instances(&self) -> &[CloudSqlInstance] {
        self.spec
            .gcp
            .as_ref()
            .map(|gcp| gcp.sql_instances.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_application_manifest() {
        let yaml = r#"
apiVersion: nais.io/v1alpha1
kind: Application
metadata:
  name: myapp
  namespace: mynamespace
spec:
  image: ghcr.io/navikt/myapp:1
  replicas:
    min: 2
  gcp:
    sqlInstances:
      - name: myinstance
        tier: db-f1-micro
        diskSize: 11
        diskAutoresize: true
        type: POSTGRES_15
"#;
        let app: Application = serde_yaml::from_str(yaml).unwrap();
        let instances = app.sql_instances();
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].name.as_deref(), Some("myinstance"));
        assert_eq!(instances[0].disk_size, Some(11));
        assert_eq!(instances[0].disk_autoresize, Some(true));
        assert_eq!(instances[0].instance_type.as_deref(), Some("POSTGRES_15"));
    }

    #[test]
    fn test_application_without_gcp() {
        let app = Application::new("myapp", ApplicationSpec::default());
        assert!(app.sql_instances().is_empty());
    }
}
