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

use axum::extract::State;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::http::header::CONTENT_DISPOSITION;
use axum::http::header::CONTENT_TYPE;
use axum::response::Html;
use maud::Markup;
use maud::html;
use qcmkit_core::AnswerKey;
use qcmkit_core::ScoreResult;
use qcmkit_core::Timestamp;

use crate::cmd::quiz::session::Phase;
use crate::cmd::quiz::session::QuizSession;
use crate::cmd::quiz::state::ServerState;
use crate::cmd::quiz::template::page_template;
use crate::error::Fallible;
use crate::export::cell;
use crate::export::format_score;
use crate::export::render_report;

pub async fn get_handler(State(state): State<ServerState>) -> (StatusCode, Html<String>) {
    match render_page(&state) {
        Ok(body) => (
            StatusCode::OK,
            Html(page_template(&state.title, body).into_string()),
        ),
        Err(e) => {
            log::error!("{e}");
            (StatusCode::INTERNAL_SERVER_ERROR, Html(e.to_string()))
        }
    }
}

fn render_page(state: &ServerState) -> Fallible<Markup> {
    let now = Timestamp::now();
    let mut m = state.lock()?;
    m.expire(state, now)?;
    let session = &m.session;
    let body = match session.phase() {
        Phase::NotStarted => render_start(state, session),
        Phase::InProgress => render_question(session, now),
        Phase::Finished(result) => render_results(session, result),
    };
    Ok(body)
}

fn render_start(state: &ServerState, session: &QuizSession) -> Markup {
    let minutes = session.time_limit_seconds() / 60;
    html! {
        div.root {
            div.start {
                h1 { (state.title) }
                p {
                    (session.questions().len()) " questions, "
                    (minutes) " minutes."
                }
                form action="/" method="post" {
                    input id="start" type="submit" name="action" value="Start" title="Start the quiz. The timer starts now.";
                }
            }
        }
    }
}

fn render_question(session: &QuizSession, now: Timestamp) -> Markup {
    let Some(question) = session.current_question() else {
        return html! { div.root { p { "No questions." } } };
    };
    let idx = session.current();
    let total = session.questions().len();
    let empty = AnswerKey::new();
    let selected = session.answers().get(idx).unwrap_or(&empty);
    let remaining = session.remaining_seconds(now);
    let limit = session.time_limit_seconds();
    // The timer turns red in the last tenth of the allotted time.
    let low = remaining * 10 <= limit;
    let percent = session.answers().answered() * 100 / total.max(1);
    let progress_style = format!("width: {percent}%;");
    let input_type = if question.is_multi() {
        "checkbox"
    } else {
        "radio"
    };
    html! {
        div.root {
            div.header {
                div.progress-bar {
                    div.progress-fill style=(progress_style) {}
                }
                div.timer.low[low] id="timer" data-remaining=(remaining) data-total=(limit) {
                    "⏳ " (format_clock(remaining))
                }
            }
            form.question action="/" method="post" {
                div.card {
                    div.card-header {
                        h1 { "Question " (idx + 1) " / " (total) }
                    }
                    div.prompt.rich-text { (cell(question.prompt())) }
                    @if question.is_multi() {
                        p.hint { "Several answers are possible." }
                    }
                    ul.choices {
                        @for (letter, option) in question.lettered_options() {
                            li {
                                label {
                                    input type=(input_type) name="choice" value=(letter) checked[selected.contains(letter)];
                                    " " (letter) ". " (cell(option))
                                }
                            }
                        }
                    }
                }
                div.controls {
                    input id="previous" type="submit" name="action" value="Previous" disabled[idx == 0] title="Previous question. Shortcut: left arrow.";
                    @if idx + 1 < total {
                        input id="next" type="submit" name="action" value="Next" title="Next question. Shortcut: right arrow.";
                    }
                    input id="submit" type="submit" name="action" value="Submit" title="Finish the quiz and see your score.";
                }
            }
        }
    }
}

fn render_results(session: &QuizSession, result: &ScoreResult) -> Markup {
    let empty = AnswerKey::new();
    let duration = match (session.started_at(), session.finished_at()) {
        (Some(start), Some(end)) => end.seconds_since(start),
        _ => 0,
    };
    html! {
        div.finished {
            h1 { "Quiz Completed \u{1F389}" }
            div.score-box {
                "Final score: "
                strong { (format_score(result.total())) " / " (result.question_count()) }
                " (" (format!("{:.1}", result.percent())) "%)"
            }
            div.stats {
                table {
                    tbody {
                        @if let Some(start) = session.started_at() {
                            tr {
                                td.key { "Started" }
                                td.val { (start.display_short()) }
                            }
                        }
                        tr {
                            td.key { "Duration" }
                            td.val { (format_clock(duration)) }
                        }
                    }
                }
            }
            h2 { "Correction" }
            @for (idx, question) in session.questions().iter().enumerate() {
                @let selected = session.answers().get(idx).unwrap_or(&empty);
                @let score = result.score(idx);
                @if score >= 1.0 {
                    div.verdict.full {
                        strong { "Q" (idx + 1) } ": correct. Your answer: " (selected.to_string())
                    }
                } @else {
                    div.verdict.wrong.partial[score > 0.0] {
                        strong { "Q" (idx + 1) } ": "
                        @if score > 0.0 { "partially correct (" (format_score(score)) "). " } @else { "incorrect. " }
                        "Your answer: " (answer_text(selected)) " | Correct: " (answer_text(question.correct()))
                        @if !question.explanation().is_empty() {
                            div.explanation { "💡 " (cell(question.explanation())) }
                        }
                    }
                }
            }
            div.actions {
                a.report href="/report" download="results.html" { "Download the full report" }
                form action="/" method="post" {
                    input id="reset" type="submit" name="action" value="Reset" title="Back to the start page.";
                }
                form action="/" method="post" {
                    input.shutdown-button id="shutdown" type="submit" name="action" value="Shutdown" title="Shut down the server";
                }
            }
        }
    }
}

fn answer_text(key: &AnswerKey) -> String {
    if key.is_empty() {
        "NULL".to_string()
    } else {
        key.to_string()
    }
}

/// `H:MM:SS`, like a stopwatch.
fn format_clock(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

pub async fn report_handler(
    State(state): State<ServerState>,
) -> (StatusCode, [(HeaderName, &'static str); 2], String) {
    let report = state.lock().map(|m| match m.session.phase() {
        Phase::Finished(result) => Some(render_report(
            m.session.questions(),
            m.session.answers(),
            result,
            &state.title,
        )),
        _ => None,
    });
    match report {
        Ok(Some(html)) => (
            StatusCode::OK,
            [
                (CONTENT_TYPE, "text/html; charset=utf-8"),
                (CONTENT_DISPOSITION, "attachment; filename=\"results.html\""),
            ],
            html,
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            [
                (CONTENT_TYPE, "text/plain"),
                (CONTENT_DISPOSITION, "inline"),
            ],
            "The quiz is not finished yet.".to_string(),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [
                (CONTENT_TYPE, "text/plain"),
                (CONTENT_DISPOSITION, "inline"),
            ],
            e.to_string(),
        ),
    }
}
