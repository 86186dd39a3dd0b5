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

use qcmkit_core::AnswerKey;
use qcmkit_core::QuestionRecord;
use qcmkit_core::ScoreResult;
use qcmkit_core::Timestamp;
use qcmkit_core::UserResponse;
use qcmkit_core::rng::TinyRng;
use qcmkit_core::rng::shuffle;
use qcmkit_core::rng::shuffle_options;
use qcmkit_core::score_session;
use qcmkit_core::types::answer_key::alphabet;

use crate::db::ProgressSnapshot;

#[derive(Debug, PartialEq)]
pub enum Phase {
    NotStarted,
    InProgress,
    Finished(ScoreResult),
}

/// One user working through one question file.
///
/// All mutation goes through one method per event: [`start`], [`select`],
/// [`go_to`], [`submit`], [`reset`] and [`expire_if_due`].
///
/// [`start`]: QuizSession::start
/// [`select`]: QuizSession::select
/// [`go_to`]: QuizSession::go_to
/// [`submit`]: QuizSession::submit
/// [`reset`]: QuizSession::reset
/// [`expire_if_due`]: QuizSession::expire_if_due
pub struct QuizSession {
    /// Questions in file order.
    source: Vec<QuestionRecord>,
    /// Questions in the order they are asked.
    questions: Vec<QuestionRecord>,
    /// Whether new sessions are shuffled.
    shuffle: bool,
    /// Whether `questions` is shuffled. A resumed session keeps the order it
    /// was saved with.
    shuffled: bool,
    answers: UserResponse,
    current: usize,
    started_at: Option<Timestamp>,
    finished_at: Option<Timestamp>,
    time_limit_seconds: i64,
    phase: Phase,
}

impl QuizSession {
    pub fn new(questions: Vec<QuestionRecord>, time_limit_minutes: u32, shuffle: bool) -> Self {
        Self {
            questions: questions.clone(),
            source: questions,
            shuffle,
            shuffled: false,
            answers: UserResponse::new(),
            current: 0,
            started_at: None,
            finished_at: None,
            time_limit_seconds: i64::from(time_limit_minutes) * 60,
            phase: Phase::NotStarted,
        }
    }

    /// Continue from a saved snapshot. The question order is derived from
    /// the start time and the snapshot's shuffle setting, so a resumed
    /// session asks questions in the same order as before.
    pub fn resume(&mut self, snapshot: ProgressSnapshot) {
        if snapshot.shuffled != self.shuffle {
            log::info!("Resuming with the question order the quiz was started with");
        }
        self.arrange(snapshot.started_at, snapshot.shuffled);
        self.answers = snapshot.answers;
        self.current = snapshot.current_index.min(self.last_index());
        self.started_at = Some(snapshot.started_at);
        self.finished_at = None;
        self.phase = Phase::InProgress;
    }

    pub fn start(&mut self, now: Timestamp) {
        if self.phase == Phase::InProgress {
            return;
        }
        self.arrange(now, self.shuffle);
        self.answers = UserResponse::new();
        self.current = 0;
        self.started_at = Some(now);
        self.finished_at = None;
        self.phase = Phase::InProgress;
    }

    /// Record the user's choice for the current question. Letters without
    /// an option are dropped.
    pub fn select(&mut self, letters: AnswerKey) {
        if self.phase != Phase::InProgress {
            return;
        }
        let Some(question) = self.questions.get(self.current) else {
            return;
        };
        let alphabet = alphabet(question.options().len());
        let letters: AnswerKey = letters.iter().filter(|c| alphabet.contains(*c)).collect();
        self.answers.select(self.current, letters);
    }

    pub fn go_to(&mut self, index: usize) {
        if self.phase == Phase::InProgress {
            self.current = index.min(self.last_index());
        }
    }

    pub fn submit(&mut self, now: Timestamp) {
        if self.phase != Phase::InProgress {
            return;
        }
        let result = score_session(&self.questions, &self.answers);
        self.finished_at = Some(now);
        self.phase = Phase::Finished(result);
    }

    pub fn reset(&mut self) {
        self.questions = self.source.clone();
        self.shuffled = false;
        self.answers = UserResponse::new();
        self.current = 0;
        self.started_at = None;
        self.finished_at = None;
        self.phase = Phase::NotStarted;
    }

    /// Submit if the time limit has passed. Returns whether it did.
    pub fn expire_if_due(&mut self, now: Timestamp) -> bool {
        if self.phase == Phase::InProgress && self.remaining_seconds(now) <= 0 {
            self.submit(now);
            true
        } else {
            false
        }
    }

    pub fn remaining_seconds(&self, now: Timestamp) -> i64 {
        match self.started_at {
            Some(started_at) => {
                let elapsed = now.seconds_since(started_at);
                (self.time_limit_seconds - elapsed).clamp(0, self.time_limit_seconds)
            }
            None => self.time_limit_seconds,
        }
    }

    /// What to persist while the quiz is running.
    pub fn snapshot(&self) -> Option<ProgressSnapshot> {
        match (&self.phase, self.started_at) {
            (Phase::InProgress, Some(started_at)) => Some(ProgressSnapshot {
                current_index: self.current,
                answers: self.answers.clone(),
                started_at,
                shuffled: self.shuffled,
            }),
            _ => None,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&QuestionRecord> {
        self.questions.get(self.current)
    }

    pub fn answers(&self) -> &UserResponse {
        &self.answers
    }

    pub fn time_limit_seconds(&self) -> i64 {
        self.time_limit_seconds
    }

    pub fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<Timestamp> {
        self.finished_at
    }

    fn last_index(&self) -> usize {
        self.questions.len().saturating_sub(1)
    }

    fn arrange(&mut self, seed: Timestamp, shuffled: bool) {
        self.shuffled = shuffled;
        self.questions = if shuffled {
            let mut rng = TinyRng::from_seed(seed.millis() as u64);
            let questions = shuffle(self.source.clone(), &mut rng);
            questions
                .iter()
                .map(|q| shuffle_options(q, &mut rng))
                .collect()
        } else {
            self.source.clone()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::try_from(s.to_string()).unwrap()
    }

    fn questions() -> Vec<QuestionRecord> {
        let options: Vec<String> = ["a", "b", "c", "d"].map(String::from).to_vec();
        vec![
            QuestionRecord::new("one", options.clone(), AnswerKey::from("A"), "").unwrap(),
            QuestionRecord::new("two", options.clone(), AnswerKey::from("BD"), "").unwrap(),
            QuestionRecord::new("three", options, AnswerKey::from("C"), "").unwrap(),
        ]
    }

    const T0: &str = "2024-05-01T09:00:00.000";

    #[test]
    fn test_full_run() {
        let mut session = QuizSession::new(questions(), 20, false);
        assert_eq!(session.phase(), &Phase::NotStarted);
        session.select(AnswerKey::from("A"));
        assert_eq!(session.answers().answered(), 0);

        session.start(ts(T0));
        session.select(AnswerKey::from("A"));
        session.go_to(1);
        session.select(AnswerKey::from("B"));
        session.go_to(99);
        assert_eq!(session.current(), 2);
        session.submit(ts("2024-05-01T09:05:00.000"));

        match session.phase() {
            Phase::Finished(result) => {
                assert_eq!(result.scores(), &[1.0, 0.5, 0.0]);
            }
            other => panic!("unexpected phase {other:?}"),
        }
        assert!(session.snapshot().is_none());
    }

    #[test]
    fn test_select_drops_unknown_letters() {
        let mut session = QuizSession::new(questions(), 20, false);
        session.start(ts(T0));
        session.select(AnswerKey::from("AZ"));
        assert_eq!(session.answers().get(0), Some(&AnswerKey::from("A")));
    }

    #[test]
    fn test_timer() {
        let mut session = QuizSession::new(questions(), 1, false);
        assert_eq!(session.remaining_seconds(ts(T0)), 60);
        session.start(ts(T0));
        assert_eq!(session.remaining_seconds(ts("2024-05-01T09:00:45.000")), 15);
        assert!(!session.expire_if_due(ts("2024-05-01T09:00:59.000")));
        assert!(session.expire_if_due(ts("2024-05-01T09:01:00.000")));
        assert!(matches!(session.phase(), Phase::Finished(_)));
        assert!(!session.expire_if_due(ts("2024-05-01T09:02:00.000")));
    }

    #[test]
    fn test_snapshot_and_resume() {
        let mut session = QuizSession::new(questions(), 20, true);
        session.start(ts(T0));
        session.go_to(1);
        session.select(AnswerKey::from("BD"));
        let snapshot = session.snapshot().unwrap();
        assert_eq!(snapshot.current_index, 1);
        let asked: Vec<String> = session
            .questions()
            .iter()
            .map(|q| q.prompt().to_string())
            .collect();

        let mut resumed = QuizSession::new(questions(), 20, true);
        resumed.resume(snapshot);
        assert_eq!(resumed.phase(), &Phase::InProgress);
        assert_eq!(resumed.current(), 1);
        assert_eq!(resumed.questions(), session.questions());
        let resumed_asked: Vec<String> = resumed
            .questions()
            .iter()
            .map(|q| q.prompt().to_string())
            .collect();
        assert_eq!(resumed_asked, asked);
        assert_eq!(resumed.answers(), session.answers());
    }

    #[test]
    fn test_resume_keeps_saved_order_when_shuffle_setting_changes() {
        let mut session = QuizSession::new(questions(), 20, true);
        session.start(ts(T0));
        session.select(AnswerKey::from("A"));
        let snapshot = session.snapshot().unwrap();
        assert!(snapshot.shuffled);

        let mut resumed = QuizSession::new(questions(), 20, false);
        resumed.resume(snapshot);
        assert_eq!(resumed.questions(), session.questions());
        assert_eq!(resumed.snapshot().map(|s| s.shuffled), Some(true));

        // A fresh start uses the configured setting again.
        resumed.reset();
        resumed.start(ts(T0));
        assert_eq!(resumed.questions(), questions().as_slice());
        assert_eq!(resumed.snapshot().map(|s| s.shuffled), Some(false));

        let mut plain = QuizSession::new(questions(), 20, false);
        plain.start(ts(T0));
        let mut reshuffled = QuizSession::new(questions(), 20, true);
        reshuffled.resume(plain.snapshot().unwrap());
        assert_eq!(reshuffled.questions(), questions().as_slice());
    }

    #[test]
    fn test_reset() {
        let mut session = QuizSession::new(questions(), 20, true);
        session.start(ts(T0));
        session.select(AnswerKey::from("C"));
        session.reset();
        assert_eq!(session.phase(), &Phase::NotStarted);
        assert_eq!(session.answers().answered(), 0);
        assert_eq!(session.questions(), questions().as_slice());
    }

    #[test]
    fn test_start_twice_keeps_answers() {
        let mut session = QuizSession::new(questions(), 20, false);
        session.start(ts(T0));
        session.select(AnswerKey::from("A"));
        session.start(ts("2024-05-01T09:10:00.000"));
        assert_eq!(session.answers().answered(), 1);
        assert_eq!(session.started_at(), Some(ts(T0)));
    }
}
