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

mod get;
mod post;
pub mod server;
mod session;
mod state;
mod template;

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::path::PathBuf;

    use portpicker::pick_unused_port;
    use reqwest::StatusCode;
    use tokio::spawn;

    use crate::cmd::quiz::server::QuizConfig;
    use crate::cmd::quiz::server::start_server;
    use crate::db::Database;
    use crate::error::Fallible;
    use crate::helper::create_tmp_quiz;
    use crate::utils::wait_for_server;

    const TEST_HOST: &str = "127.0.0.1";
    const TEST_USER: &str = "alice";

    fn config(input: PathBuf, port: u16) -> QuizConfig {
        let db_path = match input.parent() {
            Some(dir) => dir.join("qcmkit.db"),
            None => PathBuf::from("qcmkit.db"),
        };
        QuizConfig {
            input,
            title: "Sample".to_string(),
            user: TEST_USER.to_string(),
            time_limit_minutes: 20,
            host: TEST_HOST.to_string(),
            port,
            db_path,
            shuffle: false,
        }
    }

    async fn post(port: u16, form: &[(&str, &str)]) -> Fallible<String> {
        let response = reqwest::Client::new()
            .post(format!("http://{TEST_HOST}:{port}/"))
            .form(form)
            .send()
            .await?;
        assert!(response.status().is_success());
        Ok(response.text().await?)
    }

    fn db_path(input: &Path) -> PathBuf {
        input.parent().unwrap().join("qcmkit.db")
    }

    #[tokio::test]
    async fn test_start_server_on_non_existent_file() -> Fallible<()> {
        let port = pick_unused_port().unwrap();
        let result = start_server(config(PathBuf::from("./derpherp.csv"), port)).await;
        let err = result.err().unwrap();
        assert_eq!(err.to_string(), "error: ./derpherp.csv does not exist.");
        Ok(())
    }

    #[tokio::test]
    async fn test_start_server_with_no_questions() -> Fallible<()> {
        let port = pick_unused_port().unwrap();
        let input = create_tmp_quiz()?;
        std::fs::write(&input, "Question|A|B|C|D|Answer|Explanation\n")?;
        start_server(config(input, port)).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_e2e() -> Fallible<()> {
        let port = pick_unused_port().unwrap();
        let input = create_tmp_quiz()?;
        let db_path = db_path(&input);
        spawn(start_server(config(input, port)));
        wait_for_server(TEST_HOST, port).await?;

        // Static assets.
        let response = reqwest::get(format!("http://{TEST_HOST}:{port}/style.css")).await?;
        assert!(response.status().is_success());
        assert_eq!(response.headers().get("content-type").unwrap(), "text/css");
        let response = reqwest::get(format!("http://{TEST_HOST}:{port}/script.js")).await?;
        assert!(response.status().is_success());
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/javascript"
        );
        let response = reqwest::get(format!("http://{TEST_HOST}:{port}/herp-derp")).await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // No report before the quiz is over.
        let response = reqwest::get(format!("http://{TEST_HOST}:{port}/report")).await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // Start page.
        let response = reqwest::get(format!("http://{TEST_HOST}:{port}/")).await?;
        assert!(response.status().is_success());
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/html; charset=utf-8"
        );
        let html = response.text().await?;
        assert!(html.contains("3 questions, 20 minutes."));

        let html = post(port, &[("action", "Start")]).await?;
        assert!(html.contains("Question 1 / 3"));
        assert!(html.contains("What is 2+2?"));
        assert!(html.contains("type=\"radio\""));

        let html = post(port, &[("choice", "B"), ("action", "Next")]).await?;
        assert!(html.contains("Question 2 / 3"));
        assert!(html.contains("type=\"checkbox\""));

        // Going back shows the recorded answer.
        let html = post(port, &[("choice", "A"), ("action", "Previous")]).await?;
        assert!(html.contains("Question 1 / 3"));
        assert!(html.contains("value=\"B\" checked"));

        let html = post(port, &[("choice", "B"), ("action", "Next")]).await?;
        assert!(html.contains("Question 2 / 3"));
        assert!(html.contains("value=\"A\" checked"));

        let html = post(port, &[("choice", "A"), ("choice", "C"), ("action", "Next")]).await?;
        assert!(html.contains("Question 3 / 3"));

        let html = post(port, &[("choice", "B"), ("action", "Submit")]).await?;
        assert!(html.contains("Quiz Completed"));
        assert!(html.contains("<strong>2 / 3</strong>"));

        let response = reqwest::get(format!("http://{TEST_HOST}:{port}/report")).await?;
        assert!(response.status().is_success());
        assert_eq!(
            response.headers().get("content-disposition").unwrap(),
            "attachment; filename=\"results.html\""
        );
        let report = response.text().await?;
        assert!(report.contains("Capital of France?"));

        let history = Database::open(&db_path)?.history(TEST_USER)?;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].score, 2.0);
        assert_eq!(history[0].total, 3);
        assert!(history[0].module_key.starts_with("sample-"));

        // Reset goes back to the start page.
        let html = post(port, &[("action", "Reset")]).await?;
        assert!(html.contains("3 questions, 20 minutes."));

        Ok(())
    }

    #[tokio::test]
    async fn test_resume_after_shutdown() -> Fallible<()> {
        let input = create_tmp_quiz()?;

        let port = pick_unused_port().unwrap();
        let server = spawn(start_server(config(input.clone(), port)));
        wait_for_server(TEST_HOST, port).await?;
        post(port, &[("action", "Start")]).await?;
        post(port, &[("choice", "B"), ("action", "Next")]).await?;
        let html = post(port, &[("choice", "A"), ("action", "Shutdown")]).await?;
        assert!(html.contains("The server has shut down."));
        server.await.unwrap()?;

        let port = pick_unused_port().unwrap();
        spawn(start_server(config(input, port)));
        wait_for_server(TEST_HOST, port).await?;
        let html = reqwest::get(format!("http://{TEST_HOST}:{port}/"))
            .await?
            .text()
            .await?;
        assert!(html.contains("Question 2 / 3"));
        assert!(html.contains("value=\"A\" checked"));

        // The first answer survived as well.
        let html = post(port, &[("choice", "A"), ("action", "Previous")]).await?;
        assert!(html.contains("value=\"B\" checked"));
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_action() -> Fallible<()> {
        let port = pick_unused_port().unwrap();
        let input = create_tmp_quiz()?;
        spawn(start_server(config(input, port)));
        wait_for_server(TEST_HOST, port).await?;
        let response = reqwest::Client::new()
            .post(format!("http://{TEST_HOST}:{port}/"))
            .form(&[("action", "Reveal")])
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        Ok(())
    }
}
