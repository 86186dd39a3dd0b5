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

use maud::Markup;
use maud::html;
use percent_encoding::NON_ALPHANUMERIC;
use percent_encoding::utf8_percent_encode;
use qcmkit_core::FlashcardRecord;
use qcmkit_core::QuestionRecord;
use qcmkit_core::types::answer_key::alphabet;

use crate::export::cell;
use crate::export::document;

const EXAM_CSS: &str = include_str!("exam.css");

const QR_CODE_API: &str = "https://api.qrserver.com/v1/create-qr-code/?size=100x100&data=";

/// The answer sheet always has at least this many boxes per row.
const MIN_SHEET_LETTERS: usize = 4;

pub struct ExamOptions {
    pub title: String,
    /// Three-column print layout.
    pub columns: bool,
    /// Show a QR code linking to the correction.
    pub qr_code: bool,
}

/// The printable exam: questions, a sheet to tick answers on, and the
/// correction on its own page.
pub fn render_exam(records: &[QuestionRecord], options: &ExamOptions) -> String {
    let questions_class = if options.columns {
        "questions columns"
    } else {
        "questions"
    };
    let body = html! {
        @if options.qr_code {
            div.qr-code {
                img src=(qr_code_url(&options.title)) alt="QR code to the correction" width="80";
                br;
                "Scan for the correction"
            }
        }
        h1 { (options.title) }
        div class=(questions_class) {
            @for (idx, record) in records.iter().enumerate() {
                div.question-block {
                    div.question-text { (idx + 1) ". " (cell(record.prompt())) }
                    ul.options {
                        @for (letter, option) in record.lettered_options() {
                            li data-letter=(letter) { (cell(option)) }
                        }
                    }
                }
            }
        }
        (answer_sheet(records))
        div.correction id="correction" {
            h2 { "Correction" }
            table {
                thead {
                    tr {
                        th { "N°" }
                        th { "Answer" }
                        th { "Explanation" }
                    }
                }
                tbody {
                    @for (idx, record) in records.iter().enumerate() {
                        tr {
                            td { (idx + 1) }
                            td.answer {
                                @if record.is_graded() {
                                    (record.correct().to_string())
                                } @else {
                                    "—"
                                }
                            }
                            td { (cell(record.explanation())) }
                        }
                    }
                }
            }
        }
    };
    document(&options.title, EXAM_CSS, body).into_string()
}

fn answer_sheet(records: &[QuestionRecord]) -> Markup {
    let width = records
        .iter()
        .map(|r| r.options().len())
        .max()
        .unwrap_or(0)
        .max(MIN_SHEET_LETTERS);
    let letters = alphabet(width);
    html! {
        div.answer-sheet {
            h2 { "Answer sheet" }
            table {
                thead {
                    tr {
                        th { "N°" }
                        @for letter in letters.chars() {
                            th { (letter) }
                        }
                    }
                }
                tbody {
                    @for idx in 1..=records.len() {
                        tr {
                            td { (idx) }
                            @for _ in letters.chars() {
                                td.box {}
                            }
                        }
                    }
                }
            }
            p { "Tick the box of each answer you choose." }
        }
    }
}

fn qr_code_url(title: &str) -> String {
    let data = format!("Correction_{}", title.replace(' ', "_"));
    format!(
        "{QR_CODE_API}{}#correction",
        utf8_percent_encode(&data, NON_ALPHANUMERIC)
    )
}

/// A glossary table for flashcard files.
pub fn render_flashcards(records: &[FlashcardRecord], title: &str) -> String {
    let body = html! {
        h1 { (title) }
        table.glossary {
            thead {
                tr {
                    th { "Term" }
                    th { "Definition" }
                }
            }
            tbody {
                @for record in records {
                    tr {
                        td.front { (cell(&record.front)) }
                        td { (cell(&record.back)) }
                    }
                }
            }
        }
    };
    document(title, EXAM_CSS, body).into_string()
}
