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

/// Number of hex digits of the content hash kept in a module key.
const DIGEST_LEN: usize = 12;

/// Identifies a question file for progress and history storage.
///
/// The key combines the file's name with a hash of its content, so a
/// snapshot taken on one version of a file never resumes on an edited one.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ModuleKey {
    name: String,
    digest: blake3::Hash,
}

impl ModuleKey {
    pub fn new(name: impl Into<String>, content: &[u8]) -> Self {
        Self {
            name: name.into(),
            digest: blake3::hash(content),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for ModuleKey {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let hex = self.digest.to_hex();
        write!(f, "{}-{}", self.name, &hex[..DIGEST_LEN])
    }
}

impl From<ModuleKey> for String {
    fn from(key: ModuleKey) -> String {
        key.to_string()
    }
}
