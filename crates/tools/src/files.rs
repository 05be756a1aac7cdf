//! File management: search, folders, deletion, archives, downloads cleanup.

use crate::record;
use crate::shell::run_checked;
use crate::traits::ActionHandler;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use veda_core::{ActionRequest, DispatchOutcome};
use veda_memory::SharedActivityLog;

const MAX_MATCHES: usize = 5;
const MAX_DEPTH: usize = 4;

fn walk_matches(root: &Path, needle: &str, depth: usize, hits: &mut Vec<PathBuf>) {
    if depth > MAX_DEPTH || hits.len() >= MAX_MATCHES {
        return;
    }
    let Ok(entries) = std::fs::read_dir(root) else {
        return;
    };
    for entry in entries.flatten() {
        if hits.len() >= MAX_MATCHES {
            return;
        }
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_lowercase();
        if name.starts_with('.') {
            continue;
        }
        if name.contains(needle) {
            hits.push(path.clone());
        }
        if path.is_dir() {
            walk_matches(&path, needle, depth + 1, hits);
        }
    }
}

pub struct FindFile {
    pub roots: Vec<PathBuf>,
    pub log: SharedActivityLog,
}

#[async_trait]
impl ActionHandler for FindFile {
    fn name(&self) -> &str {
        "find_file"
    }

    async fn run(&self, params: &serde_json::Value) -> DispatchOutcome {
        let name = ActionRequest::param_str(params, "name").to_lowercase();
        let outcome = if name.is_empty() {
            DispatchOutcome::fail("What file should I look for?")
        } else {
            let roots = self.roots.clone();
            let needle = name.clone();
            let hits = tokio::task::spawn_blocking(move || {
                let mut hits = Vec::new();
                for root in &roots {
                    walk_matches(root, &needle, 0, &mut hits);
                }
                hits
            })
            .await
            .unwrap_or_default();

            if hits.is_empty() {
                DispatchOutcome::fail(format!("I couldn't find anything matching '{name}'."))
            } else {
                let listing = hits
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                DispatchOutcome::ok(format!("Found {}: {listing}", hits.len()))
            }
        };
        record(&self.log, self.name(), params, &outcome);
        outcome
    }
}

pub struct CreateFolder {
    pub base: PathBuf,
    pub log: SharedActivityLog,
}

#[async_trait]
impl ActionHandler for CreateFolder {
    fn name(&self) -> &str {
        "create_folder"
    }

    async fn run(&self, params: &serde_json::Value) -> DispatchOutcome {
        let name = ActionRequest::param_str(params, "name");
        let outcome = if name.is_empty() {
            DispatchOutcome::fail("What should the folder be called?")
        } else {
            let target = self.base.join(name);
            match tokio::fs::create_dir_all(&target).await {
                Ok(()) => DispatchOutcome::ok(format!("Created folder {}.", target.display())),
                Err(e) => DispatchOutcome::fail(format!("I couldn't create the folder: {e}")),
            }
        };
        record(&self.log, self.name(), params, &outcome);
        outcome
    }
}

pub struct DeleteFile {
    pub log: SharedActivityLog,
}

#[async_trait]
impl ActionHandler for DeleteFile {
    fn name(&self) -> &str {
        "delete_file"
    }

    async fn run(&self, params: &serde_json::Value) -> DispatchOutcome {
        let path = ActionRequest::param_str(params, "path");
        let outcome = if path.is_empty() {
            DispatchOutcome::fail("Which file should I delete?")
        } else {
            match tokio::fs::remove_file(path).await {
                Ok(()) => DispatchOutcome::ok(format!("Deleted {path}.")),
                Err(e) => DispatchOutcome::fail(format!("I couldn't delete {path}: {e}")),
            }
        };
        record(&self.log, self.name(), params, &outcome);
        outcome
    }
}

pub struct CompressFolder {
    pub log: SharedActivityLog,
}

#[async_trait]
impl ActionHandler for CompressFolder {
    fn name(&self) -> &str {
        "compress_folder"
    }

    async fn run(&self, params: &serde_json::Value) -> DispatchOutcome {
        let folder = ActionRequest::param_str(params, "folder");
        let outcome = if folder.is_empty() {
            DispatchOutcome::fail("Which folder should I compress?")
        } else {
            let source = Path::new(folder);
            let parent = source.parent().unwrap_or(Path::new("."));
            let base = source
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| folder.to_string());
            let archive = format!("{folder}.tar.gz");
            match run_checked(
                "tar",
                &["-czf", &archive, "-C", &parent.to_string_lossy(), &base],
            )
            .await
            {
                Ok(()) => DispatchOutcome::ok(format!("Compressed {folder} into {archive}.")),
                Err(e) => DispatchOutcome::fail(format!("Compression failed: {e}")),
            }
        };
        record(&self.log, self.name(), params, &outcome);
        outcome
    }
}

/// Extension (with dot, lowercase) to target subfolder name.
pub fn organize_target(rules: &HashMap<String, String>, file_name: &str) -> Option<String> {
    let ext = Path::new(file_name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))?;
    rules.get(&ext).cloned()
}

pub struct OrganizeDownloads {
    pub downloads: PathBuf,
    pub rules: HashMap<String, String>,
    pub log: SharedActivityLog,
}

#[async_trait]
impl ActionHandler for OrganizeDownloads {
    fn name(&self) -> &str {
        "organize_downloads"
    }

    async fn run(&self, params: &serde_json::Value) -> DispatchOutcome {
        let downloads = self.downloads.clone();
        let rules = self.rules.clone();
        let moved = tokio::task::spawn_blocking(move || {
            let mut moved = 0usize;
            let Ok(entries) = std::fs::read_dir(&downloads) else {
                return moved;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().to_string();
                if let Some(subfolder) = organize_target(&rules, &name) {
                    let target_dir = downloads.join(subfolder);
                    if std::fs::create_dir_all(&target_dir).is_ok()
                        && std::fs::rename(&path, target_dir.join(&name)).is_ok()
                    {
                        moved += 1;
                    }
                }
            }
            moved
        })
        .await
        .unwrap_or(0);

        let outcome = if moved == 0 {
            DispatchOutcome::ok("Downloads are already tidy.")
        } else {
            DispatchOutcome::ok(format!("Organized {moved} files in Downloads."))
        };
        record(&self.log, self.name(), params, &outcome);
        outcome
    }
}

pub struct CleanJunk {
    pub roots: Vec<PathBuf>,
    pub junk_extensions: HashSet<String>,
    pub log: SharedActivityLog,
}

#[async_trait]
impl ActionHandler for CleanJunk {
    fn name(&self) -> &str {
        "clean_junk"
    }

    async fn run(&self, params: &serde_json::Value) -> DispatchOutcome {
        let roots = self.roots.clone();
        let junk = self.junk_extensions.clone();
        let removed = tokio::task::spawn_blocking(move || {
            let mut removed = 0usize;
            for root in &roots {
                let Ok(entries) = std::fs::read_dir(root) else {
                    continue;
                };
                for entry in entries.flatten() {
                    let path = entry.path();
                    if !path.is_file() {
                        continue;
                    }
                    let is_junk = path
                        .extension()
                        .map(|e| junk.contains(&format!(".{}", e.to_string_lossy().to_lowercase())))
                        .unwrap_or(false);
                    if is_junk && std::fs::remove_file(&path).is_ok() {
                        removed += 1;
                    }
                }
            }
            removed
        })
        .await
        .unwrap_or(0);

        let outcome = DispatchOutcome::ok(format!("Removed {removed} junk files."));
        record(&self.log, self.name(), params, &outcome);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use veda_memory::ActivityLog;

    fn test_log(dir: &Path) -> SharedActivityLog {
        SharedActivityLog::new(ActivityLog::open(dir.join("log.json")).unwrap())
    }

    fn rules() -> HashMap<String, String> {
        HashMap::from([
            (".pdf".to_string(), "PDFs".to_string()),
            (".png".to_string(), "Images".to_string()),
        ])
    }

    #[test]
    fn test_organize_target_mapping() {
        let rules = rules();
        assert_eq!(organize_target(&rules, "paper.PDF").as_deref(), Some("PDFs"));
        assert_eq!(organize_target(&rules, "shot.png").as_deref(), Some("Images"));
        assert_eq!(organize_target(&rules, "notes.txt"), None);
        assert_eq!(organize_target(&rules, "no_extension"), None);
    }

    #[tokio::test]
    async fn test_organize_downloads_moves_files() {
        let dir = tempfile::tempdir().unwrap();
        let downloads = dir.path().join("Downloads");
        std::fs::create_dir_all(&downloads).unwrap();
        std::fs::write(downloads.join("a.pdf"), b"x").unwrap();
        std::fs::write(downloads.join("b.txt"), b"x").unwrap();

        let handler = OrganizeDownloads {
            downloads: downloads.clone(),
            rules: rules(),
            log: test_log(dir.path()),
        };
        let outcome = handler.run(&json!({})).await;

        assert!(outcome.success);
        assert!(downloads.join("PDFs").join("a.pdf").exists());
        assert!(downloads.join("b.txt").exists());
    }

    #[tokio::test]
    async fn test_find_file_reports_matches() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("report-final.txt"), b"x").unwrap();

        let handler = FindFile {
            roots: vec![dir.path().to_path_buf()],
            log: test_log(dir.path()),
        };

        let outcome = handler.run(&json!({"name": "report"})).await;
        assert!(outcome.success);
        assert!(outcome.message.contains("report-final.txt"));

        let outcome = handler.run(&json!({"name": "nonexistent"})).await;
        assert!(!outcome.success);
    }

    #[tokio::test]
    async fn test_clean_junk_respects_extension_set() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("core.tmp"), b"x").unwrap();
        std::fs::write(dir.path().join("keep.rs"), b"x").unwrap();

        let handler = CleanJunk {
            roots: vec![dir.path().to_path_buf()],
            junk_extensions: HashSet::from([".tmp".to_string()]),
            log: test_log(dir.path()),
        };
        let outcome = handler.run(&json!({})).await;

        assert!(outcome.success);
        assert!(!dir.path().join("core.tmp").exists());
        assert!(dir.path().join("keep.rs").exists());
    }
}
