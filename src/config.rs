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

use serde::Deserialize;

use crate::error::Fallible;
use crate::error::fail;

pub const CONFIG_FILE_NAME: &str = "qcmkit.toml";

pub const DEFAULT_TITLE: &str = "QCM";
pub const DEFAULT_TIME_LIMIT_MINUTES: u32 = 20;
pub const DEFAULT_USER: &str = "default";
pub const MAX_TIME_LIMIT_MINUTES: u32 = 120;

/// Contents of a `qcmkit.toml` file. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    title: Option<String>,
    columns: Option<bool>,
    qr_code: Option<bool>,
    time_limit_minutes: Option<u32>,
    user: Option<String>,
}

/// Settings after the config file and defaults are merged. Command-line
/// flags are applied on top by each command.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub title: String,
    /// Lay out printed questions in three columns.
    pub columns: bool,
    pub qr_code: bool,
    pub time_limit_minutes: u32,
    pub user: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            columns: true,
            qr_code: true,
            time_limit_minutes: DEFAULT_TIME_LIMIT_MINUTES,
            user: DEFAULT_USER.to_string(),
        }
    }
}

impl Settings {
    /// Load settings for an input file.
    ///
    /// An explicit config path must exist. Otherwise `qcmkit.toml` is looked
    /// up next to the input, and defaults are used if there is none.
    pub fn load(explicit: Option<&str>, input: &Path) -> Fallible<Self> {
        let path: Option<PathBuf> = match explicit {
            Some(path) => {
                let path = PathBuf::from(path);
                if !path.exists() {
                    return fail(format!("config file {} does not exist.", path.display()));
                }
                Some(path)
            }
            None => {
                let dir = if input.is_dir() {
                    Some(input)
                } else {
                    input.parent()
                };
                dir.map(|d| d.join(CONFIG_FILE_NAME))
                    .filter(|candidate| candidate.is_file())
            }
        };
        match path {
            Some(path) => {
                log::debug!("Reading configuration from {}", path.display());
                let text = std::fs::read_to_string(&path)?;
                Self::from_toml(&text)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml(text: &str) -> Fallible<Self> {
        let file: FileConfig = toml::from_str(text)?;
        let defaults = Settings::default();
        let settings = Settings {
            title: file.title.unwrap_or(defaults.title),
            columns: file.columns.unwrap_or(defaults.columns),
            qr_code: file.qr_code.unwrap_or(defaults.qr_code),
            time_limit_minutes: file
                .time_limit_minutes
                .unwrap_or(defaults.time_limit_minutes),
            user: file.user.unwrap_or(defaults.user),
        };
        validate_time_limit(settings.time_limit_minutes)?;
        Ok(settings)
    }
}

pub fn validate_time_limit(minutes: u32) -> Fallible<()> {
    if minutes == 0 || minutes > MAX_TIME_LIMIT_MINUTES {
        return fail(format!(
            "time limit must be between 1 and {MAX_TIME_LIMIT_MINUTES} minutes, got {minutes}."
        ));
    }
    Ok(())
}
