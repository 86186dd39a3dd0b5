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

use qcmkit_core::ModuleKey;
use walkdir::WalkDir;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;

const EXTENSIONS: [&str; 2] = ["csv", "txt"];

/// A question file read from disk.
pub struct Source {
    pub path: PathBuf,
    pub text: String,
    pub module_key: ModuleKey,
}

impl Source {
    pub fn load(path: &Path) -> Fallible<Self> {
        if !path.exists() {
            return fail(format!("{} does not exist.", path.display()));
        }
        if !path.is_file() {
            return fail(format!("{} is not a file.", path.display()));
        }
        let bytes = std::fs::read(path)?;
        let module_key = ModuleKey::new(stem(path), &bytes);
        let text = String::from_utf8(bytes)
            .map_err(|_| ErrorReport::new(format!("{} is not UTF-8.", path.display())))?;
        // Spreadsheet exports often start with a byte order mark.
        let text = text.trim_start_matches('\u{feff}').to_string();
        Ok(Self {
            path: path.to_path_buf(),
            text,
            module_key,
        })
    }

    pub fn name(&self) -> &str {
        self.module_key.name()
    }
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "questions".to_string())
}

/// The question files at `path`: the file itself, or every `.csv` and
/// `.txt` file below a directory, sorted by path.
pub fn find_sources(path: &Path) -> Fallible<Vec<PathBuf>> {
    if !path.exists() {
        return fail(format!("{} does not exist.", path.display()));
    }
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut paths = Vec::new();
    for entry in WalkDir::new(path) {
        let entry = entry?;
        let p = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = p
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false);
        if matches {
            paths.push(p.to_path_buf());
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use std::fs::create_dir_all;
    use std::fs::write;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nlp.csv");
        write(&path, "\u{feff}Question|A\nQ|a\n")?;
        let source = Source::load(&path)?;
        assert_eq!(source.name(), "nlp");
        assert!(source.text.starts_with("Question"));
        assert!(source.module_key.to_string().starts_with("nlp-"));
        Ok(())
    }

    #[test]
    fn test_load_missing() {
        assert!(Source::load(Path::new("./derpherp.csv")).is_err());
    }

    #[test]
    fn test_find_sources() -> Fallible<()> {
        let dir = tempdir()?;
        create_dir_all(dir.path().join("sub"))?;
        write(dir.path().join("b.csv"), "")?;
        write(dir.path().join("sub/a.TXT"), "")?;
        write(dir.path().join("notes.md"), "")?;
        let found = find_sources(dir.path())?;
        assert_eq!(
            found,
            vec![dir.path().join("b.csv"), dir.path().join("sub/a.TXT")]
        );
        Ok(())
    }
}
