//! Static template catalogue: structural patterns mapped to base commands.
//!
//! Entry order and pattern order are load-bearing — `IntentMatcher::resolve`
//! stops at the first pattern of the first entry that matches.

use regex::Regex;

use crate::{Platform, TemplateKey};

/// Per-template capture binding, kept as data on the entry rather than as
/// conditional branches in the matcher.  Each template decides how its
/// regex captures become argument strings.
#[derive(Debug, Clone)]
pub enum ArgBinder {
    /// Literal argument list, no captures consumed.
    Fixed(Vec<String>),
    /// Single capture feeds the sole argument slot.  An empty capture is
    /// replaced by `fallback` when one is declared, otherwise the argument
    /// is omitted entirely.
    Target { fallback: Option<&'static str> },
    /// Captures 1 and 2 feed source and destination in order.  If either
    /// is missing or empty the binder emits no arguments at all — a
    /// degraded operation, never a partial two-argument one.
    SourceDest,
}

impl ArgBinder {
    pub fn bind(&self, caps: &regex::Captures<'_>) -> Vec<String> {
        match self {
            ArgBinder::Fixed(args) => args.clone(),
            ArgBinder::Target { fallback } => {
                let target = caps
                    .get(1)
                    .map(|m| m.as_str().trim())
                    .unwrap_or("");
                if !target.is_empty() {
                    vec![target.to_string()]
                } else if let Some(default) = fallback {
                    vec![default.to_string()]
                } else {
                    vec![]
                }
            }
            ArgBinder::SourceDest => {
                let source = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
                let dest = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
                if source.is_empty() || dest.is_empty() {
                    vec![]
                } else {
                    vec![source.to_string(), dest.to_string()]
                }
            }
        }
    }
}

/// One catalogued template: an ordered pattern set, the OS-resolved base
/// command, and the binder that turns captures into arguments.
pub struct CatalogueEntry {
    pub key: TemplateKey,
    pub patterns: Vec<Regex>,
    pub command: String,
    pub description: &'static str,
    pub binder: ArgBinder,
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(&format!("(?i){p}"))
                .unwrap_or_else(|err| panic!("invalid catalogue pattern {p:?}: {err}"))
        })
        .collect()
}

/// Build the catalogue for one platform.  Command strings are resolved
/// here, once, from the injected `Platform` — matching itself never
/// consults the OS.
pub fn build_catalogue(platform: Platform) -> Vec<CatalogueEntry> {
    let windows = platform == Platform::Windows;

    vec![
        CatalogueEntry {
            key: TemplateKey::CreateFolder,
            patterns: compile(&[
                r"建立.*?叫做?\s*(.*?)\s*的?資料夾",
                r"創建.*?叫做?\s*(.*?)\s*的?目錄",
                r"新增.*?叫做?\s*(.*?)\s*的?資料夾",
                r"make.*folder.*?([^\s]+)\s*$",
                r"create.*directory.*?([^\s]+)\s*$",
            ]),
            command: "mkdir".to_string(),
            description: "create a folder",
            binder: ArgBinder::Target {
                fallback: Some("new-folder"),
            },
        },
        CatalogueEntry {
            key: TemplateKey::ListFiles,
            patterns: compile(&[
                r"顯示.*檔案",
                r"列出.*內容",
                r"看看.*有什麼",
                r"list.*files?",
                r"show.*contents?",
            ]),
            command: listing_command(platform).to_string(),
            description: "list files",
            binder: ArgBinder::Fixed(listing_args(platform)),
        },
        CatalogueEntry {
            key: TemplateKey::ChangeDirectory,
            patterns: compile(&[
                r"進入\s*([^\s]+?)\s*的?資料夾",
                r"切換\s*到?\s*([^\s]+?)\s*的?目錄",
                r"跳到\s*([^\s]+)",
                r"go.*?\bto\s+.*?([^\s]+)\s*$",
                r"change.*?\bto\s+.*?([^\s]+)\s*$",
            ]),
            command: "cd".to_string(),
            description: "change directory",
            binder: ArgBinder::Target { fallback: None },
        },
        CatalogueEntry {
            key: TemplateKey::CopyFile,
            patterns: compile(&[
                r"複製\s*(.*?)\s*到\s*([^\s]+)",
                r"拷貝\s*(.*?)\s*到\s*([^\s]+)",
                r"copy\s+.*?([^\s]+)\s+to\s+([^\s]+)\s*$",
            ]),
            command: if windows { "copy" } else { "cp" }.to_string(),
            description: "copy a file",
            binder: ArgBinder::SourceDest,
        },
        CatalogueEntry {
            key: TemplateKey::MoveFile,
            patterns: compile(&[
                r"移動\s*(.*?)\s*到\s*([^\s]+)",
                r"搬移\s*(.*?)\s*到\s*([^\s]+)",
                r"move\s+.*?([^\s]+)\s+to\s+([^\s]+)\s*$",
            ]),
            command: if windows { "move" } else { "mv" }.to_string(),
            description: "move a file",
            binder: ArgBinder::SourceDest,
        },
        CatalogueEntry {
            key: TemplateKey::CurrentDirectory,
            patterns: compile(&[
                r"目前.*位置",
                r"現在.*哪裡",
                r"當前.*目錄",
                r"顯示.*目前.*目錄",
                r"current.*directory",
                r"where.*am.*i",
            ]),
            command: if windows { "cd" } else { "pwd" }.to_string(),
            description: "show the current directory",
            binder: ArgBinder::Fixed(vec![]),
        },
        CatalogueEntry {
            key: TemplateKey::DiskUsage,
            patterns: compile(&[
                r"磁碟.*使用",
                r"硬碟.*空間",
                r"剩餘.*容量",
                r"disk.*usage",
                r"free.*space",
            ]),
            command: if windows { "dir /-c" } else { "df -h" }.to_string(),
            description: "show disk usage",
            binder: ArgBinder::Fixed(vec![]),
        },
        CatalogueEntry {
            key: TemplateKey::SystemInfo,
            patterns: compile(&[
                r"系統.*資訊",
                r"電腦.*資訊",
                r"系統.*狀態",
                r"system.*info",
                r"computer.*info",
            ]),
            command: if windows { "systeminfo" } else { "uname -a" }.to_string(),
            description: "show system information",
            binder: ArgBinder::Fixed(vec![]),
        },
    ]
}

/// OS-appropriate listing command, shared with the heuristic tier.
pub(crate) fn listing_command(platform: Platform) -> &'static str {
    match platform {
        Platform::Windows => "dir",
        Platform::Posix => "ls",
    }
}

pub(crate) fn listing_args(platform: Platform) -> Vec<String> {
    match platform {
        Platform::Windows => vec![],
        Platform::Posix => vec!["-la".to_string()],
    }
}

/// OS-appropriate time query, used only by the heuristic tier.
pub(crate) fn time_command(platform: Platform) -> &'static str {
    match platform {
        Platform::Windows => "echo %date% %time%",
        Platform::Posix => "date",
    }
}
