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

use serde::Serialize;

use crate::types::record::QuestionRecord;

/// Summary figures for a question set.
#[derive(Debug, PartialEq, Serialize)]
pub struct QuestionStats {
    pub total: usize,
    /// Questions with at most one correct letter. Ungraded questions land
    /// here.
    pub single: usize,
    pub multi: usize,
    /// Share of each letter among all correct letters, in percent, by
    /// letter.
    pub distribution: BTreeMap<char, f64>,
}

pub fn question_stats(records: &[QuestionRecord]) -> QuestionStats {
    let mut counts: BTreeMap<char, usize> = BTreeMap::new();
    let mut multi = 0;
    for record in records {
        if record.is_multi() {
            multi += 1;
        }
        for letter in record.correct().iter() {
            *counts.entry(letter).or_default() += 1;
        }
    }
    let letters: usize = counts.values().sum::<usize>().max(1);
    let distribution = counts
        .into_iter()
        .map(|(letter, n)| (letter, n as f64 / letters as f64 * 100.0))
        .collect();
    QuestionStats {
        total: records.len(),
        single: records.len() - multi,
        multi,
        distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;
    use crate::types::answer_key::AnswerKey;

    fn record(answer: &str) -> Fallible<QuestionRecord> {
        let options = ["a", "b", "c", "d"].map(String::from).to_vec();
        QuestionRecord::new("q", options, AnswerKey::from(answer), "")
    }

    #[test]
    fn test_stats() -> Fallible<()> {
        let records = vec![record("A")?, record("AC")?, record("B")?, record("")?];
        let stats = question_stats(&records);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.single, 3);
        assert_eq!(stats.multi, 1);
        assert_eq!(stats.distribution.get(&'A'), Some(&50.0));
        assert_eq!(stats.distribution.get(&'B'), Some(&25.0));
        assert_eq!(stats.distribution.get(&'C'), Some(&25.0));
        assert_eq!(stats.distribution.get(&'D'), None);
        Ok(())
    }

    #[test]
    fn test_empty() {
        let stats = question_stats(&[]);
        assert_eq!(stats.total, 0);
        assert!(stats.distribution.is_empty());
    }
}
