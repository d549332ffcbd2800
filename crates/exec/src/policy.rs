//! Two-layer safety policy: a deny-list of destructive commands, an
//! allow-list of benign ones, and a dangerous-substring scan over every
//! argument.  Deny always wins; absence from the allow-list is itself a
//! denial.

use std::collections::HashSet;

use tracing::warn;

use voxsh_intent::Operation;

/// Commands that are never executed, whatever produced them.
const DENY_LIST: &[&str] = &[
    "rm", "del", "format", "fdisk", "mkfs", "dd", "shutdown", "reboot", "halt",
    "poweroff", "init", "kill", "killall", "pkill", "sudo", "su", "chmod",
    "chown", "passwd", "useradd", "userdel", "usermod",
];

/// Read-only / benign commands the engine is willing to run.
const ALLOW_LIST: &[&str] = &[
    "ls", "dir", "pwd", "cd", "mkdir", "echo", "cat", "type", "find", "grep",
    "ps", "top", "df", "du", "free", "whoami", "date", "time", "history",
    "which", "where", "systeminfo", "uname", "copy", "cp", "move", "mv",
    "tree", "cls", "clear",
];

/// Substrings that make an argument dangerous regardless of the command.
/// The engine hands the assembled line to a shell interpreter, so path
/// traversal and metacharacters must be caught here, before assembly.
const DANGEROUS_PATTERNS: &[&str] = &[
    "..", "~", "/", "\\", "|", "&", ";", ">", "<", "*", "?",
    "system32", "etc", "root", "admin",
];

/// Why an operation was refused.  Logged for audit; the user-facing
/// message stays generic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenialReason {
    DenyListed { command: String },
    NotAllowListed { command: String },
    DangerousArgument { arg: String, pattern: &'static str },
    /// The assembled command line re-tokenizes to a different token count
    /// than the template expects, i.e. an argument would be split by the
    /// interpreter.
    TokenSplit { command_line: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Denied(DenialReason),
}

pub struct SafetyPolicy {
    deny: HashSet<&'static str>,
    allow: HashSet<&'static str>,
}

impl Default for SafetyPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl SafetyPolicy {
    pub fn new() -> Self {
        Self {
            deny: DENY_LIST.iter().copied().collect(),
            allow: ALLOW_LIST.iter().copied().collect(),
        }
    }

    /// Classify an operation.  Pure: never mutates the operation, same
    /// input always yields the same verdict.
    pub fn evaluate(&self, op: &Operation) -> Verdict {
        // Leading token only — `df -h` is classified as `df`.
        let key = op.base_token().to_lowercase();

        if self.deny.contains(key.as_str()) {
            warn!(command = %key, "blocked: deny-listed command");
            return Verdict::Denied(DenialReason::DenyListed { command: key });
        }

        if !self.allow.contains(key.as_str()) {
            warn!(command = %key, "blocked: command not in allow-list");
            return Verdict::Denied(DenialReason::NotAllowListed { command: key });
        }

        for arg in &op.args {
            let lowered = arg.to_lowercase();
            for pattern in DANGEROUS_PATTERNS {
                if lowered.contains(pattern) {
                    warn!(arg = %arg, pattern, "blocked: dangerous argument");
                    return Verdict::Denied(DenialReason::DangerousArgument {
                        arg: arg.clone(),
                        pattern,
                    });
                }
            }
        }

        // The engine hands a single interpreter string to the shell, so an
        // argument carrying whitespace would be re-split into extra tokens.
        // Require the assembled line to tokenize back to the count the
        // template produced.  This scan is allow-by-exclusion and remains an
        // open security question; see DESIGN.md.
        let expected = op.command.split_whitespace().count() + op.args.len();
        let assembled = op.command_line();
        if assembled.split_whitespace().count() != expected {
            warn!(command_line = %assembled, "blocked: argument re-splits under the interpreter");
            return Verdict::Denied(DenialReason::TokenSplit {
                command_line: assembled,
            });
        }

        Verdict::Allowed
    }

    pub fn is_safe(&self, op: &Operation) -> bool {
        matches!(self.evaluate(op), Verdict::Allowed)
    }
}
