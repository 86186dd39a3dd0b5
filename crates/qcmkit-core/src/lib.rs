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

//! qcmkit-core: answer inference and scoring for pipe-delimited quizzes.
//!
//! This library has no I/O of its own. It provides:
//! - Reading QCM and flashcard rows, including answer-column inference
//! - Partial-credit scoring of multi-answer questions
//! - Deterministic shuffling of questions and options
//! - Question-set statistics and HTML rendering of cells

pub mod error;
pub mod markdown;
pub mod parser;
pub mod rng;
pub mod scoring;
pub mod stats;
pub mod types;

pub use error::{ErrorReport, Fallible, fail};
pub use parser::{
    Parsed, RawRow, Strictness, ValidationError, ValidationErrorKind, parse_flashcards,
    parse_questions, parse_record, validate_record,
};
pub use scoring::{ScoreResult, UserResponse, score_partial, score_session};
pub use types::answer_key::AnswerKey;
pub use types::module_key::ModuleKey;
pub use types::record::{FlashcardRecord, QuestionRecord};
pub use types::timestamp::Timestamp;
