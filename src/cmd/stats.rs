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

use std::fmt::Display;
use std::fmt::Formatter;
use std::path::Path;

use clap::ValueEnum;
use qcmkit_core::Strictness;
use qcmkit_core::parse_questions;
use qcmkit_core::stats::QuestionStats;
use qcmkit_core::stats::question_stats;

use crate::error::Fallible;
use crate::source::Source;

#[derive(ValueEnum, Clone, Copy, PartialEq)]
pub enum StatsFormat {
    /// Human-readable summary.
    Text,
    /// JSON object.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

pub fn print_stats(input: &Path, format: StatsFormat) -> Fallible<()> {
    let source = Source::load(input)?;
    let parsed = parse_questions(&source.text, Strictness::Lenient)?;
    for error in &parsed.errors {
        log::warn!("{}: skipped {error}", source.path.display());
    }
    let stats = question_stats(&parsed.records);
    let output = match format {
        StatsFormat::Text => format_text(&stats),
        StatsFormat::Json => serde_json::to_string_pretty(&stats)?,
    };
    println!("{output}");
    Ok(())
}

fn format_text(stats: &QuestionStats) -> String {
    let mut lines = vec![
        format!("Questions:       {}", stats.total),
        format!("Single answer:   {}", stats.single),
        format!("Multiple answer: {}", stats.multi),
    ];
    if !stats.distribution.is_empty() {
        lines.push("Correct letters:".to_string());
        for (letter, percent) in &stats.distribution {
            lines.push(format!("  {letter}: {percent:.1}%"));
        }
    }
    lines.join("\n")
}
