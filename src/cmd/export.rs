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
use std::path::PathBuf;

use qcmkit_core::Strictness;
use qcmkit_core::parse_flashcards;
use qcmkit_core::parse_questions;

use crate::config::Settings;
use crate::error::Fallible;
use crate::error::fail;
use crate::export::ExamOptions;
use crate::export::render_exam;
use crate::export::render_flashcards;
use crate::source::Source;

pub struct ExportConfig {
    pub input: PathBuf,
    /// Defaults to the input path with an `.html` extension.
    pub output: Option<PathBuf>,
    pub title: Option<String>,
    pub single_column: bool,
    pub no_qr: bool,
    pub flashcards: bool,
    pub open: bool,
    pub config: Option<String>,
}

pub fn export_file(config: ExportConfig) -> Fallible<PathBuf> {
    let output = config
        .output
        .unwrap_or_else(|| config.input.with_extension("html"));
    if same_file(&output, &config.input) {
        return fail(format!(
            "refusing to overwrite the input file {}. Pass a different --output.",
            config.input.display()
        ));
    }
    let settings = Settings::load(config.config.as_deref(), &config.input)?;
    let source = Source::load(&config.input)?;
    let title = config.title.unwrap_or(settings.title);
    let (html, count) = if config.flashcards {
        let parsed = parse_flashcards(&source.text)?;
        warn_skipped(&source.path, &parsed.errors);
        (render_flashcards(&parsed.records, &title), parsed.records.len())
    } else {
        let parsed = parse_questions(&source.text, Strictness::Lenient)?;
        warn_skipped(&source.path, &parsed.errors);
        let options = ExamOptions {
            title,
            columns: settings.columns && !config.single_column,
            qr_code: settings.qr_code && !config.no_qr,
        };
        (render_exam(&parsed.records, &options), parsed.records.len())
    };
    log::debug!("Writing export to {}", output.display());
    std::fs::write(&output, html)?;
    println!("Exported {count} entries to {}.", output.display());
    if config.open {
        if let Err(e) = open::that(&output) {
            log::warn!("Failed to open {}: {e}", output.display());
        }
    }
    Ok(output)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn warn_skipped(path: &Path, errors: &[qcmkit_core::ValidationError]) {
    for error in errors {
        log::warn!("{}: skipped {error}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use std::fs::read_to_string;
    use std::fs::write;

    use super::*;
    use crate::helper::create_tmp_quiz;

    fn config(input: PathBuf) -> ExportConfig {
        ExportConfig {
            input,
            output: None,
            title: None,
            single_column: false,
            no_qr: false,
            flashcards: false,
            open: false,
            config: None,
        }
    }

    #[test]
    fn test_export_exam() -> Fallible<()> {
        let input = create_tmp_quiz()?;
        let output = export_file(ExportConfig {
            title: Some("Arithmetic".to_string()),
            ..config(input.clone())
        })?;
        assert_eq!(output, input.with_extension("html"));
        let html = read_to_string(&output)?;
        assert!(html.contains("<h1>Arithmetic</h1>"));
        assert!(html.contains("Capital of France?"));
        assert!(html.contains("questions columns"));
        assert!(html.contains("api.qrserver.com"));
        Ok(())
    }

    #[test]
    fn test_flags_override_config_file() -> Fallible<()> {
        let input = create_tmp_quiz()?;
        let dir = input.parent().unwrap();
        write(dir.join("qcmkit.toml"), "title = \"From file\"\nqr_code = true\n")?;
        let output = export_file(ExportConfig {
            single_column: true,
            no_qr: true,
            output: Some(dir.join("out.html")),
            ..config(input)
        })?;
        let html = read_to_string(output)?;
        assert!(html.contains("<h1>From file</h1>"));
        assert!(!html.contains("questions columns"));
        assert!(!html.contains("api.qrserver.com"));
        Ok(())
    }

    #[test]
    fn test_export_flashcards() -> Fallible<()> {
        let input = create_tmp_quiz()?;
        write(&input, "Term|Definition\nRust|A language\nCargo|Its build tool\n")?;
        let output = export_file(ExportConfig {
            flashcards: true,
            ..config(input)
        })?;
        let html = read_to_string(output)?;
        assert!(html.contains("Its build tool"));
        Ok(())
    }

    #[test]
    fn test_export_never_overwrites_input() -> Fallible<()> {
        let input = create_tmp_quiz()?;
        let html_input = input.with_extension("html");
        std::fs::copy(&input, &html_input)?;
        let err = export_file(config(html_input.clone())).err().unwrap();
        assert!(err.to_string().contains("refusing to overwrite"));
        assert_eq!(read_to_string(&html_input)?, read_to_string(&input)?);

        let dir = input.parent().unwrap();
        let roundabout = dir.join(".").join("sample.csv");
        let result = export_file(ExportConfig {
            output: Some(roundabout),
            ..config(input.clone())
        });
        assert!(result.is_err());
        assert!(read_to_string(&input)?.starts_with("Question|"));
        Ok(())
    }

    #[test]
    fn test_export_missing_file() {
        let result = export_file(config(PathBuf::from("./derpherp.csv")));
        assert!(result.is_err());
    }
}
