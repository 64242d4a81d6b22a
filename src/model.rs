use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Prefix used when reading from stdin and no prefix was given.
pub const DEFAULT_OUT_PREFIX: &str = "split";

/// Extensions stripped from the input file name when deriving a prefix.
const STRIPPED_EXTENSIONS: [&str; 2] = [".log", ".txt"];

/// Where the combined log stream comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    File(PathBuf),
    Stdin,
}

impl InputSource {
    /// Short name used in user-facing messages.
    pub fn display_name(&self) -> String {
        match self {
            InputSource::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            InputSource::Stdin => "stdin".to_string(),
        }
    }

    /// Output prefix derived from the input: the file name without a trailing
    /// `.log`/`.txt` (case-insensitive), or `split` for stdin.
    pub fn derived_prefix(&self) -> String {
        match self {
            InputSource::File(_) => strip_log_extension(&self.display_name()).to_string(),
            InputSource::Stdin => DEFAULT_OUT_PREFIX.to_string(),
        }
    }
}

fn strip_log_extension(base: &str) -> &str {
    for ext in STRIPPED_EXTENSIONS {
        if base.len() >= ext.len() {
            let split = base.len() - ext.len();
            if base.is_char_boundary(split) && base[split..].eq_ignore_ascii_case(ext) {
                return &base[..split];
            }
        }
    }
    base
}

/// Fully resolved settings for one split.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    pub input: InputSource,
    pub out_prefix: String,
}

impl SplitConfig {
    pub fn run_path(&self, run: &RunId) -> PathBuf {
        PathBuf::from(format!("{}.run_{}.log", self.out_prefix, run))
    }

    pub fn unknown_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.run_unknown.log", self.out_prefix))
    }

    /// Scratch file backing the common buffer.
    pub fn common_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.common.tmp", self.out_prefix))
    }
}

/// Digits captured from a `<name>.<digits>.config` token. Kept verbatim, so
/// `01` and `1` are different runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    pub fn new(digits: impl Into<String>) -> Self {
        Self(digits.into())
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-run file written by a split.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run: RunId,
    pub path: PathBuf,
    /// Lines in the file, including the replayed global prefix.
    pub lines: u64,
}

/// Outcome of a completed split, printed with `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct SplitSummary {
    pub input: String,
    pub out_prefix: String,
    pub lines_read: u64,
    pub global_lines: u64,
    pub tagged_lines: u64,
    /// Run files in discovery order.
    pub runs: Vec<RunReport>,
    /// Set only when no run token was seen at all.
    pub fallback: Option<PathBuf>,
    pub finished_utc: String,
}

impl SplitSummary {
    pub fn fallback_path(&self) -> Option<&Path> {
        self.fallback.as_deref()
    }
}
