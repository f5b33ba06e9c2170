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

use crate::domain::migration::config::Config;
use crate::domain::migration::instance::display_opt;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};

/// Side by side view of source and target, shown before a phase starts.
pub fn render_summary(cfg: &Config) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![Cell::new(""), Cell::new("SOURCE"), Cell::new("TARGET")]);

    let (source, target) = (&cfg.source, &cfg.target);
    let rows = [
        ("Instance", display_opt(&source.instance_name), display_opt(&target.instance_name)),
        ("Tier", display_opt(&source.tier), display_opt(&target.tier)),
        (
            "Disk autoresize",
            display_opt(&source.disk_autoresize),
            display_opt(&target.disk_autoresize),
        ),
        (
            "Disk size (GB)",
            display_opt(&source.disk_size),
            display_opt(&target.disk_size),
        ),
        (
            "Type",
            display_opt(&source.instance_type),
            display_opt(&target.instance_type),
        ),
    ];
    for (field, source_value, target_value) in rows {
        table.add_row(vec![
            Cell::new(field),
            Cell::new(source_value),
            Cell::new(target_value),
        ]);
    }

    format!(
        "Migration {} of application {} in namespace {}\n{}",
        cfg.migration_name(),
        cfg.app_name,
        cfg.namespace,
        table
    )
}
