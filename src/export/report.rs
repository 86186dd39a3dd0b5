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

use maud::html;
use qcmkit_core::AnswerKey;
use qcmkit_core::QuestionRecord;
use qcmkit_core::ScoreResult;
use qcmkit_core::UserResponse;

use crate::export::cell;
use crate::export::document;
use crate::export::format_score;

const REPORT_CSS: &str = include_str!("report.css");

/// The personalised result report for a finished quiz.
///
/// Each option is boxed: `[ X ]` for a correct option, `[ x ]` for a wrong
/// option the user picked, `[   ]` otherwise.
pub fn render_report(
    records: &[QuestionRecord],
    response: &UserResponse,
    result: &ScoreResult,
    title: &str,
) -> String {
    let empty = AnswerKey::new();
    let page_title = format!("Results: {title}");
    let body = html! {
        h1 { (page_title) }
        div.score-box {
            "Overall score: "
            strong { (format_score(result.total())) " / " (result.question_count()) }
            " (" (format!("{:.1}", result.percent())) "%)"
        }
        @for (idx, record) in records.iter().enumerate() {
            @let selected = response.get(idx).unwrap_or(&empty);
            @let score = result.score(idx);
            @let class = if score >= 1.0 { "result full" } else if score > 0.0 { "result partial" } else { "result" };
            div class=(class) {
                p.prompt {
                    "Q" (idx + 1) ". " (cell(record.prompt()))
                    " " (if score >= 1.0 { "✅" } else { "❌" })
                    @if record.is_multi() {
                        " (" (format_score(score)) ")"
                    }
                }
                ul {
                    @for (letter, option) in record.lettered_options() {
                        @if record.correct().contains(letter) {
                            li.correct { "[ X ] " (letter) ". " (cell(option)) }
                        } @else if selected.contains(letter) {
                            li.wrong { "[ x ] " (letter) ". " (cell(option)) }
                        } @else {
                            li { "[   ] " (letter) ". " (cell(option)) }
                        }
                    }
                }
                p.selection {
                    strong { "Your selection: " }
                    @if selected.is_empty() {
                        "NULL"
                    } @else {
                        (selected.to_string())
                    }
                }
                @if !record.explanation().is_empty() {
                    p.explanation { "💡 " em { (cell(record.explanation())) } }
                }
            }
        }
    };
    document(&page_title, REPORT_CSS, body).into_string()
}
