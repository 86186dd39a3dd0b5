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

mod exam;
mod report;

use maud::DOCTYPE;
use maud::Markup;
use maud::PreEscaped;
use maud::html;
use qcmkit_core::markdown::cell_to_html;

pub use exam::ExamOptions;
pub use exam::render_exam;
pub use exam::render_flashcards;
pub use report::render_report;

/// A standalone HTML document with its stylesheet inlined, so the file can
/// be opened or printed without a server.
fn document(title: &str, css: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body {
                (body)
            }
        }
    }
}

/// Cell text, literal apart from code spans.
pub fn cell(text: &str) -> Markup {
    PreEscaped(cell_to_html(text))
}

/// Scores are halves or quarters in practice; whole numbers drop the
/// decimals.
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.0}")
    } else {
        let s = format!("{score:.2}");
        s.trim_end_matches('0').to_string()
    }
}
