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

use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use tokio::spawn;

use crate::cmd::check::check_path;
use crate::cmd::export::ExportConfig;
use crate::cmd::export::export_file;
use crate::cmd::history::print_history;
use crate::cmd::quiz::server::QuizConfig;
use crate::cmd::quiz::server::start_server;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;
use crate::config::DEFAULT_USER;
use crate::config::Settings;
use crate::db::DEFAULT_DATABASE;
use crate::error::Fallible;
use crate::utils::wait_for_server;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Export a question file as a printable HTML exam.
    Export {
        /// Path to the question file.
        input: PathBuf,
        /// Path to the output file. By default, the input path with an `.html` extension.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Title of the exam. Overrides the config file.
        #[arg(long)]
        title: Option<String>,
        /// Lay out questions in a single column instead of three.
        #[arg(long)]
        single_column: bool,
        /// Leave out the QR code linking to the correction.
        #[arg(long)]
        no_qr: bool,
        /// Treat the input as `Question|Answer` flashcards and export a glossary.
        #[arg(long)]
        flashcards: bool,
        /// Open the exported file once written.
        #[arg(long)]
        open: bool,
        /// Path to a config file. By default, `qcmkit.toml` next to the input is used if present.
        #[arg(long)]
        config: Option<String>,
    },
    /// Strictly validate a question file, or every question file in a directory.
    Check {
        /// Path to a question file or a directory.
        path: PathBuf,
    },
    /// Print statistics about a question file.
    Stats {
        /// Path to the question file.
        input: PathBuf,
        /// Which output format to use.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
    /// Take a timed quiz in the browser.
    Quiz {
        /// Path to the question file.
        input: PathBuf,
        /// Whose progress and results to use. Overrides the config file.
        #[arg(long)]
        user: Option<String>,
        /// Time limit in minutes. Overrides the config file. Default is 20.
        #[arg(long)]
        time_limit: Option<u32>,
        /// The host address to bind to. Default is 127.0.0.1.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// The port to use for the web server. Default is 8000.
        #[arg(long, default_value_t = 8000)]
        port: u16,
        /// Path to the results database.
        #[arg(long, default_value = DEFAULT_DATABASE)]
        db: PathBuf,
        /// Ask questions in file order, with options as written.
        #[arg(long)]
        no_shuffle: bool,
        /// Whether to open the browser automatically. Default is true.
        #[arg(long)]
        open_browser: Option<bool>,
        /// Path to a config file. By default, `qcmkit.toml` next to the input is used if present.
        #[arg(long)]
        config: Option<String>,
    },
    /// Print past quiz results.
    History {
        /// Whose results to print.
        #[arg(long, default_value = DEFAULT_USER)]
        user: String,
        /// Path to the results database.
        #[arg(long, default_value = DEFAULT_DATABASE)]
        db: PathBuf,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Export {
            input,
            output,
            title,
            single_column,
            no_qr,
            flashcards,
            open,
            config,
        } => {
            let config = ExportConfig {
                input,
                output,
                title,
                single_column,
                no_qr,
                flashcards,
                open,
                config,
            };
            export_file(config).map(|_| ())
        }
        Command::Check { path } => check_path(&path),
        Command::Stats { input, format } => print_stats(&input, format),
        Command::Quiz {
            input,
            user,
            time_limit,
            host,
            port,
            db,
            no_shuffle,
            open_browser,
            config,
        } => {
            let settings = Settings::load(config.as_deref(), &input)?;
            if open_browser.unwrap_or(true) {
                // Start a separate task to open the browser once the server is up.
                let browser_host = host.clone();
                spawn(async move {
                    match wait_for_server(&browser_host, port).await {
                        Ok(_) => {
                            let _ = open::that(format!("http://{browser_host}:{port}/"));
                        }
                        Err(e) => {
                            eprintln!("Failed to connect to server: {e}");
                            exit(-1)
                        }
                    }
                });
            }
            let config = QuizConfig {
                input,
                title: settings.title,
                user: user.unwrap_or(settings.user),
                time_limit_minutes: time_limit.unwrap_or(settings.time_limit_minutes),
                host,
                port,
                db_path: db,
                shuffle: !no_shuffle,
            };
            start_server(config).await
        }
        Command::History { user, db } => print_history(&db, &user),
    }
}
