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

/// Kubernetes object name limit (DNS label)
pub const MAX_NAME_LENGTH: usize = 63;

/// Hash suffix length used when shortening names
pub const NAME_HASH_LENGTH: usize = 8;

/// Migration record naming
pub const MIGRATION_NAME_PREFIX: &str = "migration";

/// Resource labels
pub const LABEL_MANAGED_BY: &str = "app.kubernetes.io/managed-by";
pub const LABEL_MANAGED_BY_VALUE: &str = "nais-cli";
pub const LABEL_COMPONENT: &str = "app.kubernetes.io/component";
pub const LABEL_COMPONENT_VALUE: &str = "cloudsql-migrator";
pub const LABEL_APP_NAME: &str = "migrator.nais.io/app-name";
pub const LABEL_TARGET_INSTANCE_NAME: &str = "migrator.nais.io/target-instance-name";
pub const LABEL_MIGRATION_NAME: &str = "migrator.nais.io/migration-name";
pub const LABEL_MIGRATION_STAGE: &str = "migrator.nais.io/migration-stage";

/// Migration record keys
pub const KEY_APP_NAME: &str = "APP_NAME";
pub const KEY_NAMESPACE: &str = "NAMESPACE";
pub const KEY_INSTANCE_NAME: &str = "INSTANCE_NAME";
pub const KEY_INSTANCE_TIER: &str = "INSTANCE_TIER";
pub const KEY_INSTANCE_DISK_AUTORESIZE: &str = "INSTANCE_DISK_AUTORESIZE";
pub const KEY_INSTANCE_DISK_SIZE: &str = "INSTANCE_DISK_SIZE";
pub const KEY_INSTANCE_TYPE: &str = "INSTANCE_TYPE";
pub const PREFIX_SOURCE: &str = "SOURCE";
pub const PREFIX_TARGET: &str = "TARGET";

/// Job settings
pub const CONTAINER_NAME_MIGRATOR: &str = "migrator";
pub const RESTART_POLICY_NEVER: &str = "Never";
pub const JOB_BACKOFF_LIMIT: i32 = 0;

/// RBAC
pub const MIGRATOR_CLUSTER_ROLE: &str = "cloudsql-migrator";
pub const RBAC_API_GROUP: &str = "rbac.authorization.k8s.io";

/// Migrator image
pub const DEFAULT_IMAGE_REPOSITORY: &str =
    "europe-north1-docker.pkg.dev/nais-io/nais/images/cloudsql-migrator";
pub const DEFAULT_RELEASE_URL: &str =
    "https://api.github.com/repos/nais/cloudsql-migrator/releases/latest";

/// Polling
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 20;

/// Instance constraints
pub const TIER_PREFIX: &str = "db-";
pub const MIN_DISK_SIZE_GB: i64 = 10;

/// Values offered when configuring the target instance
pub const SUGGESTED_TIERS: &[&str] = &[
    "db-f1-micro",
    "db-g1-small",
    "db-custom-1-3840",
    "db-custom-2-5120",
    "db-custom-2-7680",
    "db-custom-4-15360",
];
pub const SUGGESTED_DISK_SIZES: &[i64] = &[10, 20, 50, 100, 250];
pub const SUGGESTED_TYPES: &[&str] = &[
    "POSTGRES_12",
    "POSTGRES_13",
    "POSTGRES_14",
    "POSTGRES_15",
    "POSTGRES_16",
    "POSTGRES_17",
];
