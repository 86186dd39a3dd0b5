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

use std::collections::BTreeSet;
use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

/// The letters used to label options, in order.
pub const LETTERS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// The maximum number of options a question can have.
pub const MAX_OPTIONS: usize = 26;

/// The letter labelling the option at `index`, if there is one.
pub fn letter(index: usize) -> Option<char> {
    LETTERS.chars().nth(index)
}

/// The position of `letter` in the alphabet.
pub fn letter_index(letter: char) -> Option<usize> {
    LETTERS.find(letter)
}

/// The first `n` letters of the alphabet.
pub fn alphabet(n: usize) -> &'static str {
    &LETTERS[..n.min(MAX_OPTIONS)]
}

/// A set of option letters, like the `AC` in an answer column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct AnswerKey(BTreeSet<char>);

impl AnswerKey {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Insert a letter. Anything outside `A..=Z` is ignored.
    pub fn insert(&mut self, letter: char) -> bool {
        if letter.is_ascii_uppercase() {
            self.0.insert(letter)
        } else {
            false
        }
    }

    pub fn contains(&self, letter: char) -> bool {
        self.0.contains(&letter)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether more than one letter is in the set.
    pub fn is_multi(&self) -> bool {
        self.0.len() > 1
    }

    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.0.iter().copied()
    }

    /// Number of letters present in both sets.
    pub fn hits(&self, other: &AnswerKey) -> usize {
        self.0.intersection(&other.0).count()
    }

    /// Number of letters in `self` that are missing from `other`.
    pub fn misses(&self, other: &AnswerKey) -> usize {
        self.0.difference(&other.0).count()
    }

    /// Whether every letter labels one of the first `option_count` options.
    pub fn fits(&self, option_count: usize) -> bool {
        let alphabet = alphabet(option_count);
        self.0.iter().all(|c| alphabet.contains(*c))
    }
}

impl FromIterator<char> for AnswerKey {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        let mut key = AnswerKey::new();
        for c in iter {
            key.insert(c.to_ascii_uppercase());
        }
        key
    }
}

impl From<&str> for AnswerKey {
    fn from(value: &str) -> Self {
        value.chars().collect()
    }
}

impl From<String> for AnswerKey {
    fn from(value: String) -> Self {
        AnswerKey::from(value.as_str())
    }
}

impl From<AnswerKey> for String {
    fn from(key: AnswerKey) -> String {
        key.to_string()
    }
}

impl Display for AnswerKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for c in &self.0 {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_sorted() {
        let key = AnswerKey::from("CA");
        assert_eq!(key.to_string(), "AC");
    }

    #[test]
    fn test_lowercase_and_noise() {
        let key = AnswerKey::from("a, c; 7");
        assert_eq!(key.to_string(), "AC");
    }

    #[test]
    fn test_hits_and_misses() {
        let correct = AnswerKey::from("AC");
        let selected = AnswerKey::from("ABC");
        assert_eq!(selected.hits(&correct), 2);
        assert_eq!(selected.misses(&correct), 1);
    }

    #[test]
    fn test_fits() {
        assert!(AnswerKey::from("AD").fits(4));
        assert!(!AnswerKey::from("AE").fits(4));
        assert!(AnswerKey::new().fits(0));
    }

    #[test]
    fn test_letters() {
        assert_eq!(letter(0), Some('A'));
        assert_eq!(letter(25), Some('Z'));
        assert_eq!(letter(26), None);
        assert_eq!(letter_index('C'), Some(2));
        assert_eq!(alphabet(3), "ABC");
        assert_eq!(alphabet(40), LETTERS);
    }

    #[test]
    fn test_serde_as_string() {
        let key = AnswerKey::from("BD");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"BD\"");
        let back: AnswerKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
