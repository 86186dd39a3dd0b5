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

use qcmkit_core::ModuleKey;
use qcmkit_core::Timestamp;
use qcmkit_core::UserResponse;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;

use crate::error::Fallible;

pub const DEFAULT_DATABASE: &str = "qcmkit.db";

const SCHEMA: &str = "
create table if not exists history (
    user_key text not null,
    module_key text not null,
    score real not null,
    total integer not null,
    taken_at text not null
);

create table if not exists progress (
    user_key text not null,
    module_key text not null,
    current_index integer not null,
    answers text not null,
    started_at text not null,
    shuffled integer not null,
    primary key (user_key, module_key)
);
";

/// A finished quiz.
#[derive(Debug, PartialEq)]
pub struct HistoryEntry {
    pub module_key: String,
    pub score: f64,
    pub total: usize,
    pub taken_at: Timestamp,
}

/// Where a user was in an unfinished quiz.
#[derive(Debug, PartialEq)]
pub struct ProgressSnapshot {
    pub current_index: usize,
    pub answers: UserResponse,
    pub started_at: Timestamp,
    /// Answers are keyed by position, so they only line up with the order
    /// they were given in.
    pub shuffled: bool,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Fallible<Self> {
        log::debug!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn in_memory() -> Fallible<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn record_score(
        &self,
        user: &str,
        module: &ModuleKey,
        score: f64,
        total: usize,
        taken_at: Timestamp,
    ) -> Fallible<()> {
        self.conn.execute(
            "insert into history (user_key, module_key, score, total, taken_at) values (?1, ?2, ?3, ?4, ?5)",
            params![user, module.to_string(), score, total as i64, taken_at.to_string()],
        )?;
        Ok(())
    }

    /// Past results for a user, oldest first.
    pub fn history(&self, user: &str) -> Fallible<Vec<HistoryEntry>> {
        let mut stmt = self.conn.prepare(
            "select module_key, score, total, taken_at from history where user_key = ?1 order by taken_at, rowid",
        )?;
        let rows = stmt.query_map(params![user], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;
        let mut entries = Vec::new();
        for row in rows {
            let (module_key, score, total, taken_at) = row?;
            entries.push(HistoryEntry {
                module_key,
                score,
                total: total as usize,
                taken_at: Timestamp::try_from(taken_at)?,
            });
        }
        Ok(entries)
    }

    pub fn save_progress(
        &self,
        user: &str,
        module: &ModuleKey,
        snapshot: &ProgressSnapshot,
    ) -> Fallible<()> {
        let answers = serde_json::to_string(&snapshot.answers)?;
        self.conn.execute(
            "insert into progress (user_key, module_key, current_index, answers, started_at, shuffled) values (?1, ?2, ?3, ?4, ?5, ?6)
             on conflict (user_key, module_key) do update set current_index = excluded.current_index, answers = excluded.answers, started_at = excluded.started_at, shuffled = excluded.shuffled",
            params![
                user,
                module.to_string(),
                snapshot.current_index as i64,
                answers,
                snapshot.started_at.to_string(),
                snapshot.shuffled
            ],
        )?;
        log::debug!(
            "Saved progress for {user} on {module}: question {}, {} answered",
            snapshot.current_index + 1,
            snapshot.answers.answered()
        );
        Ok(())
    }

    pub fn load_progress(&self, user: &str, module: &ModuleKey) -> Fallible<Option<ProgressSnapshot>> {
        let row = self
            .conn
            .query_row(
                "select current_index, answers, started_at, shuffled from progress where user_key = ?1 and module_key = ?2",
                params![user, module.to_string()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, bool>(3)?,
                    ))
                },
            )
            .optional()?;
        match row {
            Some((current_index, answers, started_at, shuffled)) => Ok(Some(ProgressSnapshot {
                current_index: current_index as usize,
                answers: serde_json::from_str(&answers)?,
                started_at: Timestamp::try_from(started_at)?,
                shuffled,
            })),
            None => Ok(None),
        }
    }

    pub fn clear_progress(&self, user: &str, module: &ModuleKey) -> Fallible<()> {
        self.conn.execute(
            "delete from progress where user_key = ?1 and module_key = ?2",
            params![user, module.to_string()],
        )?;
        Ok(())
    }
}
