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

use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use maud::html;
use qcmkit_core::AnswerKey;
use qcmkit_core::Timestamp;

use crate::cmd::quiz::state::ServerState;
use crate::cmd::quiz::template::page_template;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;

#[derive(Debug, PartialEq)]
enum Action {
    Start,
    Previous,
    Next,
    Submit,
    Reset,
    Shutdown,
}

impl Action {
    fn carries_answer(&self) -> bool {
        matches!(
            self,
            Action::Previous | Action::Next | Action::Submit | Action::Shutdown
        )
    }
}

impl TryFrom<&str> for Action {
    type Error = ErrorReport;

    fn try_from(value: &str) -> Fallible<Self> {
        match value {
            "Start" => Ok(Self::Start),
            "Previous" => Ok(Self::Previous),
            "Next" => Ok(Self::Next),
            "Submit" => Ok(Self::Submit),
            "Reset" => Ok(Self::Reset),
            "Shutdown" => Ok(Self::Shutdown),
            _ => fail(format!("unknown action: {value}")),
        }
    }
}

/// The posted form: one `action` field and any number of `choice` fields.
struct FormData {
    action: Action,
    choices: AnswerKey,
}

impl FormData {
    fn from_fields(fields: Vec<(String, String)>) -> Fallible<Self> {
        let mut action = None;
        let mut choices = AnswerKey::new();
        for (name, value) in fields {
            match name.as_str() {
                "action" => action = Some(Action::try_from(value.as_str())?),
                "choice" => {
                    for c in value.chars() {
                        choices.insert(c.to_ascii_uppercase());
                    }
                }
                _ => {}
            }
        }
        match action {
            Some(action) => Ok(Self { action, choices }),
            None => fail("missing action."),
        }
    }
}

enum Outcome {
    Continue,
    ShuttingDown,
}

pub async fn post_handler(
    State(state): State<ServerState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    match action_handler(&state, fields) {
        Ok(Outcome::Continue) => Redirect::to("/").into_response(),
        Ok(Outcome::ShuttingDown) => Html(
            page_template(
                &state.title,
                html! {
                    div.finished {
                        p { "The server has shut down. You can close this tab." }
                    }
                },
            )
            .into_string(),
        )
        .into_response(),
        Err(e) => {
            log::error!("{e}");
            (StatusCode::INTERNAL_SERVER_ERROR, Html(e.to_string())).into_response()
        }
    }
}

fn action_handler(state: &ServerState, fields: Vec<(String, String)>) -> Fallible<Outcome> {
    let FormData { action, choices } = FormData::from_fields(fields)?;
    let now = Timestamp::now();
    let mut m = state.lock()?;
    // The form holds the answer to the current question. It counts even
    // when the time ran out while the request was in flight.
    if action.carries_answer() {
        m.session.select(choices);
    }
    m.expire(state, now)?;
    let was_running = m.is_running();
    match action {
        Action::Start => {
            m.session.start(now);
            log::debug!("Quiz started");
        }
        Action::Previous => {
            let index = m.session.current().saturating_sub(1);
            m.session.go_to(index);
        }
        Action::Next => {
            let index = m.session.current() + 1;
            m.session.go_to(index);
        }
        Action::Submit => {
            m.session.submit(now);
        }
        Action::Reset => {
            m.session.reset();
            m.db.clear_progress(&state.user, &state.module_key)?;
            return Ok(Outcome::Continue);
        }
        Action::Shutdown => {
            m.persist(state, was_running)?;
            let tx = state
                .shutdown_tx
                .lock()
                .map_err(|_| ErrorReport::new("shutdown lock poisoned."))?
                .take();
            if let Some(tx) = tx {
                let _ = tx.send(());
            }
            return Ok(Outcome::ShuttingDown);
        }
    }
    m.persist(state, was_running)?;
    Ok(Outcome::Continue)
}
