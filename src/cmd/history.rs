// Copyright 2025 The qcmkit Authors
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

use std::path::Path;

use crate::db::Database;
use crate::db::HistoryEntry;
use crate::error::Fallible;
use crate::export::format_score;

pub fn print_history(db_path: &Path, user: &str) -> Fallible<()> {
    let db = Database::open(db_path)?;
    let entries = db.history(user)?;
    if entries.is_empty() {
        println!("No results for {user}.");
        return Ok(());
    }
    println!("{}", format_history(&entries));
    Ok(())
}

fn format_history(entries: &[HistoryEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            let percent = if entry.total == 0 {
                0.0
            } else {
                entry.score / entry.total as f64 * 100.0
            };
            format!(
                "{}  {}  {} / {} ({percent:.1}%)",
                entry.taken_at.display_short(),
                entry.module_key,
                format_score(entry.score),
                entry.total
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use qcmkit_core::Timestamp;

    use super::*;

    #[test]
    fn test_format_history() -> Fallible<()> {
        let entries = vec![HistoryEntry {
            module_key: "nlp-4878ca0425c7".to_string(),
            score: 7.5,
            total: 10,
            taken_at: Timestamp::try_from("2024-05-01T09:30:00.000".to_string())?,
        }];
        assert_eq!(
            format_history(&entries),
            "2024-05-01 09:30  nlp-4878ca0425c7  7.5 / 10 (75.0%)"
        );
        Ok(())
    }

    #[test]
    fn test_print_history_of_new_database() -> Fallible<()> {
        let dir = tempfile::tempdir()?;
        print_history(&dir.path().join("qcmkit.db"), "nobody")
    }
}
