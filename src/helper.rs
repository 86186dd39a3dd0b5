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

use std::fs::write;
use std::path::PathBuf;

use tempfile::tempdir;

use crate::error::Fallible;

pub const SAMPLE_QUIZ: &str = "\
Question|A|B|C|D|Answer|Explanation
What is 2+2?|3|4|5|6|B|Basic arithmetic
Which are primes?|2|4|5|9|AC|
Capital of France?|Paris|Rome|Madrid|Berlin|A|
";

/// Write `SAMPLE_QUIZ` into a fresh directory that outlives the test.
/// Returns the path of the question file.
pub fn create_tmp_quiz() -> Fallible<PathBuf> {
    let dir = tempdir()?.keep();
    let path = dir.join("sample.csv");
    write(&path, SAMPLE_QUIZ)?;
    Ok(path)
}
