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

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::types::answer_key::AnswerKey;
use crate::types::record::QuestionRecord;

/// Score one question.
///
/// Single-answer questions score 1 or 0. Multi-answer questions score
/// `(hits - misses) / |correct|`, floored at zero. A question with no
/// correct letters always scores 0.
pub fn score_partial(correct: &AnswerKey, selected: &AnswerKey) -> f64 {
    if correct.is_empty() {
        return 0.0;
    }
    if selected == correct {
        return 1.0;
    }
    if !correct.is_multi() {
        return 0.0;
    }
    let hits = selected.hits(correct) as f64;
    let misses = selected.misses(correct) as f64;
    ((hits - misses) / correct.len() as f64).max(0.0)
}

/// The letters a user picked, by question index.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserResponse {
    answers: BTreeMap<usize, AnswerKey>,
}

impl UserResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection for a question. An empty selection clears it.
    pub fn select(&mut self, question: usize, letters: AnswerKey) {
        if letters.is_empty() {
            self.answers.remove(&question);
        } else {
            self.answers.insert(question, letters);
        }
    }

    pub fn get(&self, question: usize) -> Option<&AnswerKey> {
        self.answers.get(&question)
    }

    /// Number of questions with a non-empty selection.
    pub fn answered(&self) -> usize {
        self.answers.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &AnswerKey)> {
        self.answers.iter().map(|(idx, key)| (*idx, key))
    }
}

/// Per-question scores for a finished quiz.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    scores: Vec<f64>,
}

impl ScoreResult {
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn score(&self, question: usize) -> f64 {
        self.scores.get(question).copied().unwrap_or(0.0)
    }

    /// The sum of all question scores.
    pub fn total(&self) -> f64 {
        self.scores.iter().sum()
    }

    pub fn question_count(&self) -> usize {
        self.scores.len()
    }

    pub fn percent(&self) -> f64 {
        if self.scores.is_empty() {
            0.0
        } else {
            self.total() / self.scores.len() as f64 * 100.0
        }
    }
}

/// Score every question. Unanswered questions count as an empty selection.
pub fn score_session(records: &[QuestionRecord], response: &UserResponse) -> ScoreResult {
    let empty = AnswerKey::new();
    let scores = records
        .iter()
        .enumerate()
        .map(|(idx, record)| score_partial(record.correct(), response.get(idx).unwrap_or(&empty)))
        .collect();
    ScoreResult { scores }
}
