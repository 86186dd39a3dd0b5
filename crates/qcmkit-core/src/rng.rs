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

use std::collections::HashSet;

use crate::types::answer_key::AnswerKey;
use crate::types::answer_key::LETTERS;
use crate::types::record::QuestionRecord;

/// A minimal, zero-dependency, completely insecure PRNG to shuffle questions
/// and options.
pub struct TinyRng {
    state: u64,
}

const A: u64 = 6364136223846793005;
const C: u64 = 1442695040888963407;

impl TinyRng {
    /// Initialize the RNG from a seed.
    pub fn from_seed(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        let new = self.state.wrapping_mul(A).wrapping_add(C);
        self.state = new;
        (new >> 32) as u32
    }

    // Generate random number in range [0, max).
    pub fn generate(&mut self, max: u32) -> u32 {
        self.next_u32() % max
    }
}

/// Fisher-Yates shuffle.
pub fn shuffle<T>(v: Vec<T>, rng: &mut TinyRng) -> Vec<T> {
    let mut v = v;
    for i in (1..v.len()).rev() {
        let j = rng.generate(i as u32 + 1) as usize;
        v.swap(i, j);
    }
    v
}

/// Shuffle the options of a question and relabel its answer.
///
/// Correct options are tracked by text, so if two options share the same
/// text and one of them is correct, both are correct after shuffling.
pub fn shuffle_options(record: &QuestionRecord, rng: &mut TinyRng) -> QuestionRecord {
    let correct_texts: HashSet<&str> = record
        .lettered_options()
        .filter(|(letter, _)| record.correct().contains(*letter))
        .map(|(_, text)| text)
        .collect();
    let options: Vec<String> = shuffle(record.options().to_vec(), rng);
    let correct: AnswerKey = options
        .iter()
        .zip(LETTERS.chars())
        .filter(|(text, _)| correct_texts.contains(text.as_str()))
        .map(|(_, letter)| letter)
        .collect();
    QuestionRecord::from_parts(
        record.prompt().to_string(),
        options,
        correct,
        record.explanation().to_string(),
    )
}
