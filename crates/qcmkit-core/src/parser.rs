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

//! Reading pipe-delimited question files.
//!
//! The answer column of a QCM row is found in two stages: a header cell
//! named `Réponse`/`Reponse`/`Answer`, and otherwise a right-to-left scan for
//! a cell that looks like a letter code. If neither finds anything the
//! second-to-last cell is used.

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Fallible;
use crate::types::answer_key::AnswerKey;
use crate::types::answer_key::MAX_OPTIONS;
use crate::types::answer_key::alphabet;
use crate::types::record::FlashcardRecord;
use crate::types::record::QuestionRecord;

pub const DELIMITER: char = '|';

/// Minimum number of cells in a QCM row.
pub const MIN_QCM_COLUMNS: usize = 7;

/// Minimum number of cells in a flashcard or glossary row.
pub const MIN_FLASHCARD_COLUMNS: usize = 2;

/// The rightmost cell considered when scanning for the answer column.
const SCAN_START: usize = 11;

/// The leftmost cell considered. Cell 0 is the prompt and at least one
/// option precedes the answer.
const SCAN_END: usize = 2;

const MAX_ANSWER_CODE_LEN: usize = 15;

const ANSWER_HEADERS: [&str; 3] = ["réponse", "reponse", "answer"];

/// Characters skipped while extracting answer letters.
const SEPARATORS: [char; 7] = [';', ',', ' ', ':', '.', '/', '?'];

static ANSWER_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]+(?:[;, ][A-Z]+)*$").unwrap());

/// One line of delimited input.
#[derive(Clone, Debug, PartialEq)]
pub struct RawRow {
    line: usize,
    cells: Vec<String>,
}

impl RawRow {
    pub fn new<S: Into<String>>(line: usize, cells: impl IntoIterator<Item = S>) -> Self {
        Self {
            line,
            cells: cells.into_iter().map(Into::into).collect(),
        }
    }

    /// The 1-based line number in the source text.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    pub line: usize,
    pub kind: ValidationErrorKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The row has fewer cells than the mode requires.
    InsufficientColumns { found: usize, required: usize },
    /// No answer letter could be extracted.
    MissingAnswer,
    /// The answer names a letter with no matching option.
    AnswerOptionMismatch { letter: char, option_count: usize },
}

impl ValidationError {
    fn new(line: usize, kind: ValidationErrorKind) -> Self {
        Self { line, kind }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: ", self.line)?;
        match &self.kind {
            ValidationErrorKind::InsufficientColumns { found, required } => {
                write!(f, "expected at least {required} columns, found {found}.")
            }
            ValidationErrorKind::MissingAnswer => write!(f, "missing answer."),
            ValidationErrorKind::AnswerOptionMismatch {
                letter,
                option_count,
            } => write!(
                f,
                "answer letter '{letter}' does not match any of the {option_count} options."
            ),
        }
    }
}

impl Error for ValidationError {}

/// How a batch treats rows whose answer is empty or malformed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strictness {
    /// Rows without a usable answer become ungraded records.
    Lenient,
    /// Rows without a usable answer are reported as errors.
    Strict,
}

/// The result of parsing a batch: the rows that made it, and what went wrong
/// with the others.
#[derive(Debug)]
pub struct Parsed<T> {
    pub records: Vec<T>,
    pub errors: Vec<ValidationError>,
}

/// Where the answer column of a row was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerColumn {
    /// Named by the header row.
    Header(usize),
    /// Found by scanning for a letter code.
    Inferred(usize),
    /// Nothing looked like a letter code: second-to-last cell.
    Fallback(usize),
}

impl AnswerColumn {
    pub fn index(self) -> usize {
        match self {
            AnswerColumn::Header(idx) => idx,
            AnswerColumn::Inferred(idx) => idx,
            AnswerColumn::Fallback(idx) => idx,
        }
    }
}

/// The letters pulled out of an answer cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Extraction {
    pub answer: AnswerKey,
    /// Set when the scan stopped on a lone letter outside the alphabet, as in
    /// the `E` of `AE` for a four-option question.
    pub stray_letter: Option<char>,
}

/// Split text into rows. Blank lines are dropped; the first row returned is
/// the header.
pub fn read_rows(text: &str) -> Fallible<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER as u8)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        rows.push(RawRow::new(line, record.iter()));
    }
    Ok(rows)
}

/// The index of the header cell naming the answer column, if any.
pub fn header_answer_column(header: &RawRow) -> Option<usize> {
    header
        .cells
        .iter()
        .position(|cell| ANSWER_HEADERS.contains(&cell.trim().to_lowercase().as_str()))
}

/// Decide which cell of `row` holds the answer letters.
pub fn answer_column(row: &RawRow, header_hint: Option<usize>) -> AnswerColumn {
    if let Some(idx) = header_hint {
        if idx >= 1 && idx < row.len() {
            return AnswerColumn::Header(idx);
        }
    }
    let start = row.len().saturating_sub(1).min(SCAN_START);
    for idx in (SCAN_END..=start).rev() {
        let option_count = option_cells(row, idx).len();
        if looks_like_answer_code(&row.cells[idx], option_count) {
            return AnswerColumn::Inferred(idx);
        }
    }
    AnswerColumn::Fallback(row.len().saturating_sub(2).max(1))
}

/// Whether a cell reads like a letter code for a question with
/// `option_count` options rather than like prose.
fn looks_like_answer_code(cell: &str, option_count: usize) -> bool {
    let code = cell.trim().to_uppercase();
    if code.is_empty() || code.chars().count() > MAX_ANSWER_CODE_LEN {
        return false;
    }
    if !ANSWER_CODE.is_match(&code) {
        return false;
    }
    let alphabet = alphabet(option_count);
    code.chars()
        .filter(|c| c.is_ascii_uppercase())
        .all(|c| alphabet.contains(c))
}

/// Non-empty, trimmed cells between the prompt and the answer column.
fn option_cells(row: &RawRow, answer_idx: usize) -> Vec<String> {
    let end = answer_idx.min(row.len());
    if end <= 1 {
        return Vec::new();
    }
    row.cells[1..end]
        .iter()
        .map(|cell| cell.trim())
        .filter(|cell| !cell.is_empty())
        .take(MAX_OPTIONS)
        .map(str::to_string)
        .collect()
}

/// Read answer letters left to right. Separators are skipped; the first
/// character that is neither a separator nor a letter of the alphabet ends
/// the scan, and anything after it is ignored.
pub fn extract_answer(raw: &str, option_count: usize) -> Extraction {
    let raw: Vec<char> = raw.trim().to_uppercase().chars().collect();
    let alphabet = alphabet(option_count);
    let mut answer = AnswerKey::new();
    for (pos, &c) in raw.iter().enumerate() {
        if alphabet.contains(c) {
            answer.insert(c);
        } else if SEPARATORS.contains(&c) {
            continue;
        } else {
            let lone_letter = c.is_ascii_uppercase()
                && raw
                    .get(pos + 1)
                    .is_none_or(|next| SEPARATORS.contains(next));
            return Extraction {
                answer,
                stray_letter: lone_letter.then_some(c),
            };
        }
    }
    Extraction {
        answer,
        stray_letter: None,
    }
}

/// Parse a QCM row. An empty answer gives an ungraded record.
pub fn parse_record(
    row: &RawRow,
    header_hint: Option<usize>,
) -> Result<QuestionRecord, ValidationError> {
    build_record(row, header_hint).map(|(record, _)| record)
}

/// Parse a QCM row, also rejecting rows whose answer is empty or names a
/// letter with no option.
pub fn validate_record(
    row: &RawRow,
    header_hint: Option<usize>,
) -> Result<QuestionRecord, ValidationError> {
    let (record, extraction) = build_record(row, header_hint)?;
    if let Some(letter) = extraction.stray_letter {
        return Err(ValidationError::new(
            row.line,
            ValidationErrorKind::AnswerOptionMismatch {
                letter,
                option_count: record.options().len(),
            },
        ));
    }
    if record.correct().is_empty() {
        return Err(ValidationError::new(
            row.line,
            ValidationErrorKind::MissingAnswer,
        ));
    }
    Ok(record)
}

fn build_record(
    row: &RawRow,
    header_hint: Option<usize>,
) -> Result<(QuestionRecord, Extraction), ValidationError> {
    if row.len() < MIN_QCM_COLUMNS {
        return Err(ValidationError::new(
            row.line,
            ValidationErrorKind::InsufficientColumns {
                found: row.len(),
                required: MIN_QCM_COLUMNS,
            },
        ));
    }
    let answer_idx = answer_column(row, header_hint).index();
    let options = option_cells(row, answer_idx);
    let extraction = extract_answer(&row.cells[answer_idx], options.len());
    let explanation = row.cells[answer_idx + 1..]
        .join(&DELIMITER.to_string())
        .trim()
        .to_string();
    let record = QuestionRecord::from_parts(
        row.cells[0].trim().to_string(),
        options,
        extraction.answer.clone(),
        explanation,
    );
    Ok((record, extraction))
}

/// Parse every data row of a QCM file. Malformed rows are collected as
/// errors and do not stop the batch.
pub fn parse_questions(text: &str, strictness: Strictness) -> Fallible<Parsed<QuestionRecord>> {
    let rows = read_rows(text)?;
    let mut rows = rows.into_iter();
    let header_hint = rows.next().as_ref().and_then(header_answer_column);
    let mut records = Vec::new();
    let mut errors = Vec::new();
    for row in rows {
        let result = match strictness {
            Strictness::Lenient => parse_record(&row, header_hint),
            Strictness::Strict => validate_record(&row, header_hint),
        };
        match result {
            Ok(record) => records.push(record),
            Err(e) => errors.push(e),
        }
    }
    Ok(Parsed { records, errors })
}

/// Parse a `Question|Answer` row. Cells past the second are part of the
/// answer.
pub fn parse_flashcard(row: &RawRow) -> Result<FlashcardRecord, ValidationError> {
    if row.len() < MIN_FLASHCARD_COLUMNS {
        return Err(ValidationError::new(
            row.line,
            ValidationErrorKind::InsufficientColumns {
                found: row.len(),
                required: MIN_FLASHCARD_COLUMNS,
            },
        ));
    }
    let front = row.cells[0].trim().to_string();
    let back = row.cells[1..]
        .join(&DELIMITER.to_string())
        .trim()
        .to_string();
    if front.is_empty() || back.is_empty() {
        return Err(ValidationError::new(
            row.line,
            ValidationErrorKind::MissingAnswer,
        ));
    }
    Ok(FlashcardRecord { front, back })
}

/// Parse every data row of a flashcard or glossary file.
pub fn parse_flashcards(text: &str) -> Fallible<Parsed<FlashcardRecord>> {
    let mut records = Vec::new();
    let mut errors = Vec::new();
    for row in read_rows(text)?.iter().skip(1) {
        match parse_flashcard(row) {
            Ok(record) => records.push(record),
            Err(e) => errors.push(e),
        }
    }
    Ok(Parsed { records, errors })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> RawRow {
        RawRow::new(2, cells.iter().copied())
    }

    #[test]
    fn test_infer_answer_column() {
        let r = row(&["Q", "Opt1", "Opt2", "Opt3", "AC", "Because X"]);
        assert_eq!(answer_column(&r, None), AnswerColumn::Inferred(4));
    }

    #[test]
    fn test_header_column_wins() {
        let r = row(&["Q", "A", "B", "C", "D", "B", "because"]);
        assert_eq!(answer_column(&r, Some(5)), AnswerColumn::Header(5));
    }

    #[test]
    fn test_header_column_out_of_bounds_is_ignored() {
        let r = row(&["Q", "un", "deux", "trois", "quatre", "B", "because"]);
        assert_eq!(answer_column(&r, Some(12)), AnswerColumn::Inferred(5));
        assert_eq!(answer_column(&r, Some(0)), AnswerColumn::Inferred(5));
    }

    #[test]
    fn test_fallback_column() {
        let r = row(&[
            "Q",
            "one",
            "two",
            "three",
            "four",
            "the second one",
            "explanation text",
        ]);
        let first = answer_column(&r, None);
        assert_eq!(first, AnswerColumn::Fallback(5));
        assert_eq!(answer_column(&r, None), first);
    }

    #[test]
    fn test_long_code_is_prose() {
        let r = row(&["Q", "1", "2", "3", "4", "B", "AAAA BBBB CCCC DDDD"]);
        assert_eq!(answer_column(&r, None), AnswerColumn::Inferred(5));
    }

    #[test]
    fn test_scan_starts_at_column_eleven() {
        let mut cells = vec!["Q"];
        cells.extend(["o1", "o2", "o3", "o4", "o5", "o6", "o7", "o8", "o9", "o10"]);
        cells.extend(["AC", "B", "x", "y"]);
        let r = row(&cells);
        assert_eq!(r.len(), 15);
        assert_eq!(answer_column(&r, None), AnswerColumn::Inferred(11));

        // A code past column 11 is never looked at.
        cells[11] = "prose here";
        let r = row(&cells);
        assert_eq!(answer_column(&r, None), AnswerColumn::Fallback(13));
    }

    #[test]
    fn test_answer_code_length_limit() {
        let fifteen = "A B C D E F G H";
        let sixteen = "AB C D E F G H I";
        assert_eq!(fifteen.len(), 15);
        assert_eq!(sixteen.len(), 16);
        assert!(looks_like_answer_code(fifteen, 26));
        assert!(!looks_like_answer_code(sixteen, 26));
        assert!(looks_like_answer_code(" A B C D E F G H ", 26));

        let options = ["one", "two", "three", "four", "five", "six", "seven", "eight", "nine"];
        let mut cells = vec!["Q"];
        cells.extend(options);
        cells.extend([fifteen, "why"]);
        assert_eq!(answer_column(&row(&cells), None), AnswerColumn::Inferred(10));
        cells[10] = sixteen;
        assert_eq!(answer_column(&row(&cells), None), AnswerColumn::Fallback(10));
    }

    #[test]
    fn test_header_answer_column() {
        let header = row(&["Question", "A", "B", "C", "D", "RÉPONSE", "Explication"]);
        assert_eq!(header_answer_column(&header), Some(5));
        let header = row(&["Question", "A", "B", " answer ", "Why"]);
        assert_eq!(header_answer_column(&header), Some(3));
        let header = row(&["Question", "A", "B", "Solution"]);
        assert_eq!(header_answer_column(&header), None);
    }

    #[test]
    fn test_extract_stops_at_first_foreign_character() {
        assert_eq!(extract_answer("A-C", 3).answer.to_string(), "A");
    }

    #[test]
    fn test_extract_with_trailing_commentary() {
        assert_eq!(extract_answer("AB;extra", 4).answer.to_string(), "AB");
        assert_eq!(extract_answer("AC (voir note)", 4).answer.to_string(), "AC");
    }

    #[test]
    fn test_extract_skips_separators() {
        let extraction = extract_answer(" a, c / d. ", 4);
        assert_eq!(extraction.answer.to_string(), "ACD");
        assert_eq!(extraction.stray_letter, None);
    }

    #[test]
    fn test_extract_stray_letter() {
        assert_eq!(extract_answer("AE", 4).stray_letter, Some('E'));
        assert_eq!(extract_answer("A;E", 4).stray_letter, Some('E'));
        assert_eq!(extract_answer("AB;extra", 4).stray_letter, None);
        assert_eq!(extract_answer("A-C", 3).stray_letter, None);
    }

    #[test]
    fn test_parse_record() -> Result<(), ValidationError> {
        let r = row(&["Q", "Opt1", "Opt2", "Opt3", "", "AC", "Because X"]);
        let record = parse_record(&r, None)?;
        assert_eq!(record.prompt(), "Q");
        assert_eq!(record.options(), &["Opt1", "Opt2", "Opt3"]);
        assert_eq!(record.correct().to_string(), "AC");
        assert_eq!(record.explanation(), "Because X");
        Ok(())
    }

    #[test]
    fn test_parse_record_idempotent() -> Result<(), ValidationError> {
        let r = row(&["Q", "a", "b", "c", "d", "b,d", "x", "y"]);
        assert_eq!(parse_record(&r, None)?, parse_record(&r, None)?);
        Ok(())
    }

    #[test]
    fn test_explanation_rejoins_cells() -> Result<(), ValidationError> {
        let r = row(&["Q", "a", "b", "c", "d", "B", "first | part", " second"]);
        let record = parse_record(&r, Some(5))?;
        assert_eq!(record.explanation(), "first | part| second");
        Ok(())
    }

    #[test]
    fn test_insufficient_columns() {
        let r = row(&["Q", "a", "b", "A"]);
        let err = parse_record(&r, None).unwrap_err();
        assert_eq!(
            err.kind,
            ValidationErrorKind::InsufficientColumns {
                found: 4,
                required: 7
            }
        );
        assert_eq!(err.to_string(), "line 2: expected at least 7 columns, found 4.");
    }

    #[test]
    fn test_lenient_empty_answer_is_ungraded() -> Result<(), ValidationError> {
        let r = row(&["Q", "a", "b", "c", "d", "", "nothing"]);
        let record = parse_record(&r, Some(5))?;
        assert!(!record.is_graded());
        Ok(())
    }

    #[test]
    fn test_strict_missing_answer() {
        let r = row(&["Q", "a", "b", "c", "d", "", "nothing"]);
        let err = validate_record(&r, Some(5)).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::MissingAnswer);
    }

    #[test]
    fn test_strict_mismatch() {
        let r = row(&["Q", "a", "b", "c", "d", "AE", "why"]);
        let err = validate_record(&r, Some(5)).unwrap_err();
        assert_eq!(
            err.kind,
            ValidationErrorKind::AnswerOptionMismatch {
                letter: 'E',
                option_count: 4
            }
        );
    }

    #[test]
    fn test_batch_accumulates_errors() -> Fallible<()> {
        let text = "Question|A|B|C|D|Réponse|Explication\n\
                    Q1|a|b|c|d|A|first\n\
                    too|short\n\
                    Q2|a|b|c|d|BC|second\n\
                    \n\
                    Q3|a|b|c|d||third\n";
        let lenient = parse_questions(text, Strictness::Lenient)?;
        assert_eq!(lenient.records.len(), 3);
        assert_eq!(lenient.errors.len(), 1);
        assert_eq!(lenient.errors[0].line, 3);

        let strict = parse_questions(text, Strictness::Strict)?;
        assert_eq!(strict.records.len(), 2);
        assert_eq!(strict.errors.len(), 2);
        assert_eq!(strict.errors[1].kind, ValidationErrorKind::MissingAnswer);
        Ok(())
    }

    #[test]
    fn test_six_option_rows() -> Fallible<()> {
        let text = "Question|A|B|C|D|E|F|Answer|Explanation\n\
                    Which?|1|2|3|4|5|6|A, F|edges\n";
        let parsed = parse_questions(text, Strictness::Strict)?;
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.records[0].options().len(), 6);
        assert_eq!(parsed.records[0].correct().to_string(), "AF");
        Ok(())
    }

    #[test]
    fn test_flashcards() -> Fallible<()> {
        let text = "Concept|Definition\nRust|A language\nLonely\n|empty front\n";
        let parsed = parse_flashcards(text)?;
        assert_eq!(
            parsed.records,
            vec![FlashcardRecord {
                front: "Rust".to_string(),
                back: "A language".to_string()
            }]
        );
        assert_eq!(parsed.errors.len(), 2);
        assert_eq!(parsed.errors[1].kind, ValidationErrorKind::MissingAnswer);
        Ok(())
    }
}
