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

use crate::shared::error::{MigrateError, Result};
use tracing::warn;

/// Interactive questions asked during a migration. Injected so the flows can
/// run against scripted answers in tests.
pub trait Prompter: Send + Sync {
    /// Pick one of `items`, returning its index.
    fn select(&self, label: &str, items: &[String]) -> Result<usize>;

    /// Free-form answer.
    fn input(&self, label: &str) -> Result<String>;

    fn confirm(&self, label: &str) -> Result<bool>;
}

/// Ask until `parse` accepts the answer. Validation failures re-ask, any
/// other error ends the prompt.
pub fn prompt_until_valid<T>(
    prompter: &dyn Prompter,
    label: &str,
    parse: impl Fn(&str) -> Result<T>,
) -> Result<T> {
    loop {
        let answer = prompter.input(label)?;
        match parse(answer.trim()) {
            Ok(value) => return Ok(value),
            Err(MigrateError::Validation(reason)) => {
                warn!("Rejected answer '{}': {}", answer.trim(), reason);
                println!("  {}", reason);
            }
            Err(e) => return Err(e),
        }
    }
}
