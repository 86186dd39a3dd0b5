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

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::types::answer_key::AnswerKey;
use crate::types::answer_key::MAX_OPTIONS;
use crate::types::answer_key::letter;

/// A multiple-choice question.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    prompt: String,
    options: Vec<String>,
    correct: AnswerKey,
    explanation: String,
}

impl QuestionRecord {
    /// Construct a record, checking that every correct letter labels an
    /// option.
    pub fn new(
        prompt: impl Into<String>,
        options: Vec<String>,
        correct: AnswerKey,
        explanation: impl Into<String>,
    ) -> Fallible<Self> {
        if options.len() > MAX_OPTIONS {
            return Err(ErrorReport::new(format!(
                "a question can have at most {MAX_OPTIONS} options, found {}.",
                options.len()
            )));
        }
        if !correct.fits(options.len()) {
            return Err(ErrorReport::new(format!(
                "answer '{correct}' does not match the {} available options.",
                options.len()
            )));
        }
        Ok(Self::from_parts(
            prompt.into(),
            options,
            correct,
            explanation.into(),
        ))
    }

    /// The caller upholds the letter invariant.
    pub(crate) fn from_parts(
        prompt: String,
        options: Vec<String>,
        correct: AnswerKey,
        explanation: String,
    ) -> Self {
        Self {
            prompt,
            options,
            correct,
            explanation,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn correct(&self) -> &AnswerKey {
        &self.correct
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// Options paired with their letters.
    pub fn lettered_options(&self) -> impl Iterator<Item = (char, &str)> {
        self.options
            .iter()
            .enumerate()
            .filter_map(|(idx, opt)| letter(idx).map(|l| (l, opt.as_str())))
    }

    /// Whether more than one option is correct.
    pub fn is_multi(&self) -> bool {
        self.correct.is_multi()
    }

    /// Records without an answer are shown but never scored as correct.
    pub fn is_graded(&self) -> bool {
        !self.correct.is_empty()
    }
}

/// A front/back pair, used for flashcards and glossaries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlashcardRecord {
    pub front: String,
    pub back: String,
}
