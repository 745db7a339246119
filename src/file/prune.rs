// Copyright 2024 FastLabs Developers
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

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use jiff::civil::Date;

use crate::Error;
use crate::Trap;
use crate::file::naming::FileNaming;
use crate::file::naming::date_key;
use crate::file::naming::today_key;

/// Delete `path` if its size is at or below `min_size`. A missing file is not an error.
pub(crate) fn remove_if_small(path: &Path, min_size: u64) -> Result<bool, Error> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => {
            return Err(Error::new("failed to stat log file")
                .with_context("path", path.display())
                .with_source(err));
        }
    };

    if metadata.len() > min_size {
        return Ok(false);
    }

    fs::remove_file(path).map_err(|err| {
        Error::new("failed to remove small log file")
            .with_context("path", path.display())
            .with_source(err)
    })?;
    Ok(true)
}

/// Delete every file in `dir` named by `naming`, dated before `today` and not larger than
/// `min_size`. Returns the deleted paths; failures are reported to `trap`.
pub(crate) fn prune_old_empty(
    dir: &Path,
    naming: &FileNaming,
    min_size: u64,
    today: Date,
    trap: &dyn Trap,
) -> Vec<PathBuf> {
    let read_dir = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(err) => {
            let err = Error::new("failed to read log dir")
                .with_context("dir", dir.display())
                .with_source(err);
            trap.trap(&err);
            return vec![];
        }
    };

    let today = today_key(today);
    let mut removed = vec![];
    for entry in read_dir {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let err = Error::new("failed to read log dir entry")
                    .with_context("dir", dir.display())
                    .with_source(err);
                trap.trap(&err);
                continue;
            }
        };

        let path = entry.path();
        // symlinks are never followed nor removed
        let metadata = match fs::symlink_metadata(&path) {
            Ok(metadata) => metadata,
            Err(err) => {
                let err = Error::new("failed to stat log file")
                    .with_context("path", path.display())
                    .with_source(err);
                trap.trap(&err);
                continue;
            }
        };
        if !metadata.is_file() || metadata.len() > min_size {
            continue;
        }

        let filename = entry.file_name();
        let Some(date) = filename.to_str().and_then(|name| naming.embedded_date(name)) else {
            continue;
        };
        if date_key(date) >= today {
            continue;
        }

        match fs::remove_file(&path) {
            Ok(()) => removed.push(path),
            Err(err) => {
                let err = Error::new("failed to remove stale log file")
                    .with_context("path", path.display())
                    .with_source(err);
                trap.trap(&err);
            }
        }
    }

    removed
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use jiff::civil::date;
    use tempfile::TempDir;

    use super::*;

    #[derive(Debug, Default)]
    struct Collect(Mutex<Vec<String>>);

    impl Trap for Collect {
        fn trap(&self, err: &Error) {
            self.0.lock().unwrap().push(err.to_string());
        }
    }

    fn touch(dir: &Path, name: &str, size: usize) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, "x".repeat(size)).unwrap();
        path
    }

    #[test]
    fn test_prune_only_stale_empty_files() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let naming = FileNaming::new("sync-", "app").unwrap();
        let yesterday = touch(dir, "sync-app-2023-01-01.log", 0);
        let today = touch(dir, "sync-app-2023-01-02.log", 0);

        let trap = Collect::default();
        let removed = prune_old_empty(dir, &naming, 0, date(2023, 1, 2), &trap);

        assert_eq!(removed, vec![yesterday.clone()]);
        assert!(!yesterday.exists());
        assert!(today.exists());
        assert!(trap.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_prune_respects_threshold_and_naming() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let naming = FileNaming::new("sync-", "app").unwrap();
        let small = touch(dir, "sync-app-2022-12-30.log", 10);
        let large = touch(dir, "sync-app-2022-12-31.log", 11);
        let future = touch(dir, "sync-app-2023-02-01.log", 0);
        let foreign = touch(dir, "sync-other-2022-12-30.log", 0);
        let rolled = touch(dir, "sync-app-2022-12-30.log.1", 0);
        fs::create_dir(dir.join("sync-app-2022-12-29.log")).unwrap();

        let trap = Collect::default();
        let removed = prune_old_empty(dir, &naming, 10, date(2023, 1, 2), &trap);

        assert_eq!(removed, vec![small.clone()]);
        assert!(!small.exists());
        assert!(large.exists());
        assert!(future.exists());
        assert!(foreign.exists());
        assert!(rolled.exists());
        assert!(dir.join("sync-app-2022-12-29.log").is_dir());
    }

    #[test]
    fn test_prune_missing_dir_is_trapped() {
        let temp_dir = TempDir::new().unwrap();
        let naming = FileNaming::new("sync-", "app").unwrap();

        let trap = Collect::default();
        let removed = prune_old_empty(
            &temp_dir.path().join("missing"),
            &naming,
            0,
            date(2023, 1, 2),
            &trap,
        );

        assert!(removed.is_empty());
        let errors = trap.0.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("failed to read log dir"));
    }

    #[test]
    fn test_remove_if_small() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let empty = touch(dir, "a.log", 0);
        let full = touch(dir, "b.log", 5);

        assert!(remove_if_small(&empty, 0).unwrap());
        assert!(!empty.exists());
        assert!(!remove_if_small(&full, 4).unwrap());
        assert!(full.exists());
        assert!(remove_if_small(&full, 5).unwrap());
        assert!(!remove_if_small(&dir.join("missing.log"), 0).unwrap());
    }
}
