//! Text collection from shell history, shell init files, git logs, and
//! plain files.
//!
//! Every source is optional: anything unreadable is reported through the
//! [`WarningSink`] and skipped. The caller decides whether the final buffer
//! is usable; an empty buffer is the program's one fatal input condition.

use crate::detect;
use crate::warnings::WarningSink;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;
use tracing::{debug, info};

/// Zsh extended-history prefix: ": 1700000000:0;git status"
static ZSH_META: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^:\s*\d+:\d+;").unwrap());

/// Which sources to read, straight from the CLI flags.
#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    pub files: Vec<PathBuf>,
    pub history: bool,
    pub init_files: bool,
    pub git_log: Option<PathBuf>,
}

impl SourceOptions {
    /// True if the user selected at least one source explicitly.
    #[must_use]
    pub fn any_selected(&self) -> bool {
        self.history || self.init_files || self.git_log.is_some() || !self.files.is_empty()
    }
}

/// Gather all requested sources into a single text buffer.
///
/// With no source selected, shell history is read by default.
#[must_use]
pub fn collect(opts: &SourceOptions, sink: &mut WarningSink) -> String {
    collect_with_home(opts, dirs::home_dir().as_deref(), sink)
}

pub(crate) fn collect_with_home(
    opts: &SourceOptions,
    home: Option<&Path>,
    sink: &mut WarningSink,
) -> String {
    let mut buffer = String::new();
    let history = opts.history || !opts.any_selected();

    for path in &opts.files {
        match std::fs::read_to_string(path) {
            Ok(text) => append(&mut buffer, &text),
            Err(e) => {
                sink.warn_once(
                    "file-unreadable",
                    &format!("skipping unreadable file {}: {e}", path.display()),
                );
            }
        }
    }

    if history {
        match home {
            Some(home) => append_history(home, &mut buffer, sink),
            None => {
                sink.warn_once("home-missing", "no home directory, skipping shell history");
            }
        }
    }

    if opts.init_files {
        match home {
            Some(home) => append_init_files(home, &mut buffer, sink),
            None => {
                sink.warn_once("home-missing", "no home directory, skipping init files");
            }
        }
    }

    if let Some(repo) = &opts.git_log {
        append_git_log(repo, &mut buffer, sink);
    }

    info!("collected {} bytes of source text", buffer.len());
    buffer
}

fn append(buffer: &mut String, text: &str) {
    if !text.is_empty() {
        buffer.push_str(text);
        if !text.ends_with('\n') {
            buffer.push('\n');
        }
    }
}

fn append_history(home: &Path, buffer: &mut String, sink: &mut WarningSink) {
    let candidates = [
        (home.join(".bash_history"), HistoryFormat::Plain),
        (home.join(".zsh_history"), HistoryFormat::Zsh),
        (home.join(".histfile"), HistoryFormat::Zsh),
        (
            home.join(".local/share/fish/fish_history"),
            HistoryFormat::Fish,
        ),
    ];

    let mut found = false;
    for (path, format) in candidates {
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(raw) => {
                debug!("reading history file {}", path.display());
                append(buffer, &parse_history(&raw, format));
                found = true;
            }
            Err(e) => {
                sink.warn_once(
                    "history-unreadable",
                    &format!("skipping history file {}: {e}", path.display()),
                );
            }
        }
    }

    if !found {
        sink.warn_once("history-missing", "no readable shell history file found");
    }
}

#[derive(Debug, Clone, Copy)]
enum HistoryFormat {
    Plain,
    Zsh,
    Fish,
}

fn parse_history(raw: &str, format: HistoryFormat) -> String {
    match format {
        HistoryFormat::Plain => raw.to_string(),
        HistoryFormat::Zsh => raw
            .lines()
            .map(|line| ZSH_META.replace(line, "").into_owned())
            .collect::<Vec<_>>()
            .join("\n"),
        HistoryFormat::Fish => raw
            .lines()
            .filter_map(|line| line.strip_prefix("- cmd: "))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn append_init_files(home: &Path, buffer: &mut String, sink: &mut WarningSink) {
    let candidates = [
        ".bashrc",
        ".bash_profile",
        ".bash_aliases",
        ".zshrc",
        ".zprofile",
        ".profile",
    ];

    let mut found = false;
    for name in candidates {
        let path = home.join(name);
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                debug!("reading init file {}", path.display());
                append(buffer, &text);
                found = true;
            }
            Err(e) => {
                sink.warn_once(
                    "init-unreadable",
                    &format!("skipping init file {}: {e}", path.display()),
                );
            }
        }
    }

    if !found {
        sink.warn_once("init-missing", "no readable shell init file found");
    }
}

fn append_git_log(repo: &Path, buffer: &mut String, sink: &mut WarningSink) {
    let Some(git) = detect::git() else {
        sink.warn_once("git-missing", "git not found on PATH, skipping git log");
        return;
    };

    let output = Command::new(git)
        .arg("-C")
        .arg(repo)
        .args(["log", "--pretty=format:%s"])
        .output();

    match output {
        Ok(out) if out.status.success() => {
            append(buffer, &String::from_utf8_lossy(&out.stdout));
        }
        Ok(out) => {
            sink.warn_once(
                "git-log-failed",
                &format!(
                    "git log failed in {}: {}",
                    repo.display(),
                    String::from_utf8_lossy(&out.stderr).trim()
                ),
            );
        }
        Err(e) => {
            sink.warn_once("git-log-failed", &format!("failed to run git: {e}"));
        }
    }
}
