//! Intent resolution: free-form utterances mapped onto a fixed catalogue of
//! shell operations.
//!
//! Matching is structural, not statistical — an ordered set of regex
//! templates with first-match-wins semantics, backed by a small keyword
//! heuristic for utterances no template covers.

pub mod catalogue;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalogue::{CatalogueEntry, build_catalogue, listing_args, listing_command, time_command};

// ── Platform ─────────────────────────────────────────────────────────────────

/// OS family the catalogue is resolved against.  Injected at construction
/// so tests can exercise either family on any host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Posix,
    Windows,
}

impl Platform {
    pub fn detect() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }
}

// ── Template keys ────────────────────────────────────────────────────────────

/// Identifies the template (or heuristic) an operation was synthesized from.
/// The `Heuristic*` variants are sentinels: they never appear in the
/// catalogue and mark second-tier keyword resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKey {
    CreateFolder,
    ListFiles,
    ChangeDirectory,
    CopyFile,
    MoveFile,
    CurrentDirectory,
    DiskUsage,
    SystemInfo,
    HeuristicListFiles,
    HeuristicTime,
}

impl TemplateKey {
    pub fn is_heuristic(self) -> bool {
        matches!(self, Self::HeuristicListFiles | Self::HeuristicTime)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateFolder => "create_folder",
            Self::ListFiles => "list_files",
            Self::ChangeDirectory => "change_directory",
            Self::CopyFile => "copy_file",
            Self::MoveFile => "move_file",
            Self::CurrentDirectory => "current_directory",
            Self::DiskUsage => "disk_usage",
            Self::SystemInfo => "system_info",
            Self::HeuristicListFiles => "heuristic_list_files",
            Self::HeuristicTime => "heuristic_time",
        }
    }
}

// ── Synthesized operation ────────────────────────────────────────────────────

/// A concrete, not-yet-validated command candidate.  Owned by the pipeline
/// call that produced it and discarded when the request completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    /// Base command as catalogued; may contain embedded flags (`df -h`).
    pub command: String,
    pub args: Vec<String>,
    pub description: String,
    pub key: TemplateKey,
    /// The utterance this operation was synthesized from.
    pub original_text: String,
}

impl Operation {
    /// Leading token of the base command, the key the safety policy and the
    /// feedback classifier compare against.
    pub fn base_token(&self) -> &str {
        self.command.split_whitespace().next().unwrap_or("")
    }

    /// The literal command line the engine will hand to the interpreter.
    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.args.join(" "))
        }
    }
}

// ── Matcher ──────────────────────────────────────────────────────────────────

/// Keyword sets for the heuristic tier.
const FILE_KEYWORDS: &[&str] = &["檔案", "文件", "file"];
const SHOW_KEYWORDS: &[&str] = &["顯示", "看", "列出", "show", "list"];
const TIME_KEYWORDS: &[&str] = &["時間", "現在", "time", "now"];

pub struct IntentMatcher {
    entries: Vec<CatalogueEntry>,
    platform: Platform,
    heuristic_enabled: bool,
}

impl IntentMatcher {
    /// Two-phase build: OS-agnostic template definitions are resolved
    /// against `platform` exactly once, here.
    pub fn new(platform: Platform) -> Self {
        let entries = build_catalogue(platform);
        debug!(count = entries.len(), ?platform, "intent catalogue built");
        Self {
            entries,
            platform,
            heuristic_enabled: true,
        }
    }

    /// Disable the keyword fallback tier; unmatched utterances then always
    /// resolve to `None`.
    pub fn with_heuristic(mut self, enabled: bool) -> Self {
        self.heuristic_enabled = enabled;
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Resolve an utterance to an operation, or `None` when neither the
    /// catalogue nor the heuristic tier understands it.  Pure apart from
    /// tracing.
    pub fn resolve(&self, text: &str) -> Option<Operation> {
        let normalized = text.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }

        for entry in &self.entries {
            for pattern in &entry.patterns {
                if let Some(caps) = pattern.captures(&normalized) {
                    let op = Operation {
                        command: entry.command.clone(),
                        args: entry.binder.bind(&caps),
                        description: entry.description.to_string(),
                        key: entry.key,
                        original_text: text.to_string(),
                    };
                    debug!(key = op.key.as_str(), command = %op.command_line(), "template matched");
                    return Some(op);
                }
            }
        }

        if self.heuristic_enabled {
            if let Some(op) = self.heuristic_resolve(&normalized, text) {
                return Some(op);
            }
        }

        warn!(utterance = %text, "no template or heuristic matched");
        None
    }

    /// Second-tier keyword matcher, consulted only when no template won.
    fn heuristic_resolve(&self, normalized: &str, original: &str) -> Option<Operation> {
        let contains_any = |set: &[&str]| set.iter().any(|kw| normalized.contains(kw));

        if contains_any(FILE_KEYWORDS) && contains_any(SHOW_KEYWORDS) {
            debug!("heuristic: file listing");
            return Some(Operation {
                command: listing_command(self.platform).to_string(),
                args: listing_args(self.platform),
                description: "list files (heuristic)".to_string(),
                key: TemplateKey::HeuristicListFiles,
                original_text: original.to_string(),
            });
        }

        if contains_any(TIME_KEYWORDS) {
            debug!("heuristic: time query");
            return Some(Operation {
                command: time_command(self.platform).to_string(),
                args: vec![],
                description: "show the current time (heuristic)".to_string(),
                key: TemplateKey::HeuristicTime,
                original_text: original.to_string(),
            });
        }

        None
    }

    /// Catalogue keys with their descriptions, for `help`-style listings.
    pub fn supported_templates(&self) -> Vec<(TemplateKey, &'static str)> {
        self.entries.iter().map(|e| (e.key, e.description)).collect()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn posix() -> IntentMatcher {
        IntentMatcher::new(Platform::Posix)
    }

    fn windows() -> IntentMatcher {
        IntentMatcher::new(Platform::Windows)
    }

    // ── Normalization ──────────────────────────────────────────────────────

    #[test]
    fn empty_and_whitespace_resolve_to_none() {
        let m = posix();
        assert!(m.resolve("").is_none());
        assert!(m.resolve("   \t ").is_none());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let m = posix();
        let op = m.resolve("LIST ALL FILES").unwrap();
        assert_eq!(op.key, TemplateKey::ListFiles);
    }

    // ── Catalogue templates, one sample per pattern ────────────────────────

    #[test]
    fn create_folder_patterns() {
        let m = posix();
        for text in [
            "建立一個叫做 test 的資料夾",
            "創建一個叫做 docs 的目錄",
            "新增一個叫做 backup 的資料夾",
            "make a folder called notes",
            "create a directory named projects",
        ] {
            let op = m.resolve(text).unwrap();
            assert_eq!(op.key, TemplateKey::CreateFolder, "input: {text}");
            assert_eq!(op.command, "mkdir");
            assert_eq!(op.args.len(), 1, "input: {text}");
        }
    }

    #[test]
    fn create_folder_binds_clean_capture() {
        let m = posix();
        let op = m.resolve("建立一個叫做 test 的資料夾").unwrap();
        assert_eq!(op.args, vec!["test"]);
        let op = m.resolve("make a folder called notes").unwrap();
        assert_eq!(op.args, vec!["notes"]);
    }

    #[test]
    fn create_folder_empty_capture_falls_back_to_default() {
        let m = posix();
        let op = m.resolve("建立叫做的資料夾").unwrap();
        assert_eq!(op.key, TemplateKey::CreateFolder);
        assert_eq!(op.args, vec!["new-folder"]);
    }

    #[test]
    fn list_files_patterns() {
        let m = posix();
        for text in [
            "顯示所有檔案",
            "列出目錄內容",
            "看看裡面有什麼",
            "list the files",
            "show the contents",
        ] {
            let op = m.resolve(text).unwrap();
            assert_eq!(op.key, TemplateKey::ListFiles, "input: {text}");
            assert_eq!(op.command, "ls");
            assert_eq!(op.args, vec!["-la"]);
        }
    }

    #[test]
    fn change_directory_patterns() {
        let m = posix();
        for (text, target) in [
            ("進入 projects 的資料夾", "projects"),
            ("切換到下載目錄", "下載"),
            ("跳到 workspace", "workspace"),
            ("go to src", "src"),
            ("change to build", "build"),
        ] {
            let op = m.resolve(text).unwrap();
            assert_eq!(op.key, TemplateKey::ChangeDirectory, "input: {text}");
            assert_eq!(op.command, "cd");
            assert_eq!(op.args, vec![target], "input: {text}");
        }
    }

    #[test]
    fn copy_and_move_bind_source_then_destination() {
        let m = posix();
        for (text, key, command) in [
            ("複製 a.txt 到 backup", TemplateKey::CopyFile, "cp"),
            ("拷貝 a.txt 到 backup", TemplateKey::CopyFile, "cp"),
            ("copy a.txt to backup", TemplateKey::CopyFile, "cp"),
            ("移動 a.txt 到 backup", TemplateKey::MoveFile, "mv"),
            ("搬移 a.txt 到 backup", TemplateKey::MoveFile, "mv"),
            ("move a.txt to backup", TemplateKey::MoveFile, "mv"),
        ] {
            let op = m.resolve(text).unwrap();
            assert_eq!(op.key, key, "input: {text}");
            assert_eq!(op.command, command, "input: {text}");
            assert_eq!(op.args, vec!["a.txt", "backup"], "input: {text}");
        }
    }

    #[test]
    fn source_dest_with_missing_capture_binds_no_args() {
        let m = posix();
        // Empty source before 到 — degraded operation, never a one-arg copy.
        let op = m.resolve("複製到 backup").unwrap();
        assert_eq!(op.key, TemplateKey::CopyFile);
        assert!(op.args.is_empty());
    }

    #[test]
    fn current_directory_patterns() {
        let m = posix();
        for text in [
            "顯示目前的位置",
            "我現在在哪裡",
            "當前的目錄是什麼",
            "顯示目前目錄",
            "what is the current directory",
            "where am i",
        ] {
            let op = m.resolve(text).unwrap();
            assert_eq!(op.key, TemplateKey::CurrentDirectory, "input: {text}");
            assert_eq!(op.command, "pwd");
            assert!(op.args.is_empty(), "input: {text}");
        }
    }

    #[test]
    fn disk_usage_patterns() {
        let m = posix();
        for text in [
            "磁碟使用情況",
            "硬碟還剩多少空間",
            "剩餘的容量還有多少",
            "check disk usage",
            "how much free space is left",
        ] {
            let op = m.resolve(text).unwrap();
            assert_eq!(op.key, TemplateKey::DiskUsage, "input: {text}");
            assert_eq!(op.command, "df -h");
            assert!(op.args.is_empty(), "input: {text}");
        }
    }

    #[test]
    fn system_info_patterns() {
        let m = posix();
        for text in [
            "顯示系統資訊",
            "電腦的資訊",
            "系統狀態如何",
            "show system info",
            "show computer info",
        ] {
            let op = m.resolve(text).unwrap();
            assert_eq!(op.key, TemplateKey::SystemInfo, "input: {text}");
            assert_eq!(op.command, "uname -a");
            assert!(op.args.is_empty(), "input: {text}");
        }
    }

    // ── Order dependence ───────────────────────────────────────────────────

    #[test]
    fn first_matching_entry_wins() {
        let m = posix();
        // Matches both create_folder and list_files ("顯示.*檔案");
        // catalogue order puts create_folder first, so it must win.
        let op = m.resolve("建立一個叫做 顯示我的檔案 的資料夾").unwrap();
        assert_eq!(op.key, TemplateKey::CreateFolder);
    }

    // ── Platform resolution ────────────────────────────────────────────────

    #[test]
    fn windows_catalogue_resolves_windows_commands() {
        let m = windows();
        let op = m.resolve("list the files").unwrap();
        assert_eq!(op.command, "dir");
        assert!(op.args.is_empty());

        let op = m.resolve("顯示目前目錄").unwrap();
        assert_eq!(op.command, "cd");

        let op = m.resolve("copy a.txt to b.txt").unwrap();
        assert_eq!(op.command, "copy");
    }

    // ── Heuristic tier ─────────────────────────────────────────────────────

    #[test]
    fn heuristic_listing_carries_sentinel_key() {
        let m = posix();
        // No template matches, but "file" + "show" keywords are present.
        let op = m.resolve("幫我看一下檔案吧").unwrap();
        assert_eq!(op.key, TemplateKey::HeuristicListFiles);
        assert!(op.key.is_heuristic());
        assert_eq!(op.command, "ls");
    }

    #[test]
    fn heuristic_time_query() {
        let m = posix();
        let op = m.resolve("現在幾點了").unwrap();
        assert_eq!(op.key, TemplateKey::HeuristicTime);
        assert_eq!(op.command, "date");

        let op = windows().resolve("現在幾點了").unwrap();
        assert_eq!(op.command, "echo %date% %time%");
    }

    #[test]
    fn heuristic_can_be_disabled() {
        let m = posix().with_heuristic(false);
        assert!(m.resolve("幫我看一下檔案吧").is_none());
    }

    #[test]
    fn raw_command_text_resolves_to_none() {
        let m = posix();
        assert!(m.resolve("del *.*").is_none());
        assert!(m.resolve("rm -rf /").is_none());
    }

    // ── Purity ─────────────────────────────────────────────────────────────

    #[test]
    fn resolve_is_deterministic() {
        let m = posix();
        let a = m.resolve("建立一個叫做 test 的資料夾").unwrap();
        let b = m.resolve("建立一個叫做 test 的資料夾").unwrap();
        assert_eq!(a.key, b.key);
        assert_eq!(a.command, b.command);
        assert_eq!(a.args, b.args);
    }

    #[test]
    fn operation_helpers() {
        let op = Operation {
            command: "df -h".to_string(),
            args: vec![],
            description: String::new(),
            key: TemplateKey::DiskUsage,
            original_text: String::new(),
        };
        assert_eq!(op.base_token(), "df");
        assert_eq!(op.command_line(), "df -h");

        let op = Operation {
            command: "cp".to_string(),
            args: vec!["a".to_string(), "b".to_string()],
            description: String::new(),
            key: TemplateKey::CopyFile,
            original_text: String::new(),
        };
        assert_eq!(op.command_line(), "cp a b");
    }

    #[test]
    fn supported_templates_lists_catalogue_keys_in_order() {
        let keys: Vec<TemplateKey> = posix()
            .supported_templates()
            .iter()
            .map(|(k, _)| *k)
            .collect();
        assert_eq!(keys[0], TemplateKey::CreateFolder);
        assert_eq!(keys.len(), 8);
        assert!(keys.iter().all(|k| !k.is_heuristic()));
    }
}
