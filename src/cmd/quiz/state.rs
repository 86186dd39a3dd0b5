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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use qcmkit_core::ModuleKey;
use qcmkit_core::Timestamp;
use tokio::sync::oneshot::Sender;

use crate::cmd::quiz::session::Phase;
use crate::cmd::quiz::session::QuizSession;
use crate::db::Database;
use crate::error::ErrorReport;
use crate::error::Fallible;

#[derive(Clone)]
pub struct ServerState {
    pub title: String,
    pub user: String,
    pub module_key: ModuleKey,
    pub mutable: Arc<Mutex<MutableState>>,
    pub shutdown_tx: Arc<Mutex<Option<Sender<()>>>>,
}

pub struct MutableState {
    pub session: QuizSession,
    pub db: Database,
}

impl ServerState {
    pub fn lock(&self) -> Fallible<MutexGuard<'_, MutableState>> {
        self.mutable
            .lock()
            .map_err(|_| ErrorReport::new("quiz session lock poisoned."))
    }
}

impl MutableState {
    /// Persist the outcome of an event. A session that just finished has
    /// its score recorded and its snapshot dropped; a running one is
    /// snapshotted.
    pub fn persist(&self, state: &ServerState, was_running: bool) -> Fallible<()> {
        match self.session.phase() {
            Phase::Finished(result) if was_running => {
                let taken_at = self.session.finished_at().unwrap_or_else(Timestamp::now);
                self.db.record_score(
                    &state.user,
                    &state.module_key,
                    result.total(),
                    result.question_count(),
                    taken_at,
                )?;
                self.db.clear_progress(&state.user, &state.module_key)?;
                log::info!(
                    "{} scored {} / {} on {}",
                    state.user,
                    result.total(),
                    result.question_count(),
                    state.module_key
                );
                Ok(())
            }
            _ => match self.session.snapshot() {
                Some(snapshot) => {
                    self.db
                        .save_progress(&state.user, &state.module_key, &snapshot)
                }
                None => Ok(()),
            },
        }
    }

    /// Submit the session if its time is up.
    pub fn expire(&mut self, state: &ServerState, now: Timestamp) -> Fallible<()> {
        if self.session.expire_if_due(now) {
            log::debug!("Time limit reached, submitting");
            self.persist(state, true)?;
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        matches!(self.session.phase(), Phase::InProgress)
    }
}
