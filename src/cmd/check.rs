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

use qcmkit_core::Strictness;
use qcmkit_core::ValidationError;
use qcmkit_core::parse_questions;

use crate::error::Fallible;
use crate::error::fail;
use crate::source::Source;
use crate::source::find_sources;

/// Strictly validate a question file, or every question file under a
/// directory. Every problem is printed before failing.
pub fn check_path(path: &Path) -> Fallible<()> {
    let paths = find_sources(path)?;
    if paths.is_empty() {
        return fail(format!("no question files found in {}.", path.display()));
    }
    let mut total = 0;
    let mut failing_files = 0;
    for path in &paths {
        let problems: Vec<String> = match check_file(path) {
            Ok(errors) => errors.iter().map(ToString::to_string).collect(),
            Err(e) => vec![e.to_string()],
        };
        if !problems.is_empty() {
            failing_files += 1;
            total += problems.len();
            for problem in problems {
                eprintln!("{}: {problem}", path.display());
            }
        }
    }
    if total > 0 {
        return fail(format!(
            "found {total} problem(s) in {failing_files} of {} file(s).",
            paths.len()
        ));
    }
    println!("All good. Checked {} file(s).", paths.len());
    Ok(())
}

fn check_file(path: &Path) -> Fallible<Vec<ValidationError>> {
    let source = Source::load(path)?;
    let parsed = parse_questions(&source.text, Strictness::Strict)?;
    log::debug!(
        "{}: {} valid, {} invalid",
        path.display(),
        parsed.records.len(),
        parsed.errors.len()
    );
    Ok(parsed.errors)
}

#[cfg(test)]
mod tests {
    use std::fs::create_dir_all;
    use std::fs::write;

    use tempfile::tempdir;

    use super::*;
    use crate::helper::SAMPLE_QUIZ;
    use crate::helper::create_tmp_quiz;

    #[test]
    fn test_check_valid_file() -> Fallible<()> {
        let input = create_tmp_quiz()?;
        check_path(&input)
    }

    #[test]
    fn test_check_directory() -> Fallible<()> {
        let dir = tempdir()?;
        let nested = dir.path().join("chapter");
        create_dir_all(&nested)?;
        write(dir.path().join("one.csv"), SAMPLE_QUIZ)?;
        write(nested.join("two.txt"), SAMPLE_QUIZ)?;
        write(nested.join("notes.md"), "not a quiz")?;
        check_path(dir.path())?;

        write(
            nested.join("bad.csv"),
            "Question|A|B|C|D|Answer|Explanation\nToo short|A|B\nNo answer|a|b|c|d||\n",
        )?;
        let err = check_path(dir.path()).err().unwrap();
        assert_eq!(
            err.to_string(),
            "error: found 2 problem(s) in 1 of 3 file(s)."
        );
        Ok(())
    }

    #[test]
    fn test_unreadable_file_does_not_stop_the_check() -> Fallible<()> {
        let dir = tempdir()?;
        write(dir.path().join("a.csv"), b"\xff\xfeA|B")?;
        write(
            dir.path().join("b.csv"),
            "Question|A|B|C|D|Answer|Explanation\nToo short|A|B\n",
        )?;
        write(dir.path().join("c.csv"), SAMPLE_QUIZ)?;
        let err = check_path(dir.path()).err().unwrap();
        assert_eq!(
            err.to_string(),
            "error: found 2 problem(s) in 2 of 3 file(s)."
        );
        Ok(())
    }

    #[test]
    fn test_check_empty_directory() -> Fallible<()> {
        let dir = tempdir()?;
        assert!(check_path(dir.path()).is_err());
        Ok(())
    }
}
