//! Run token detection.
//!
//! A run token looks like `ptp4l.3.config` or `phc2sys.12.config`: an
//! identifier made of `[A-Za-z0-9_-]`, a dot, a run number, and `.config`,
//! bounded by ASCII word boundaries.

use crate::model::RunId;
use regex::bytes::Regex;

const RUN_TOKEN_PATTERN: &str = r"(?-u)\b[A-Za-z0-9_-]+\.(\d+)\.config\b";

pub struct TokenScanner {
    re: Regex,
}

impl TokenScanner {
    pub fn new() -> Self {
        // Constant pattern.
        let re = Regex::new(RUN_TOKEN_PATTERN).expect("run token pattern is valid");
        Self { re }
    }

    /// Distinct run ids on `line`, in order of first occurrence.
    pub fn scan(&self, line: &[u8]) -> Vec<RunId> {
        let mut runs: Vec<RunId> = Vec::new();
        for caps in self.re.captures_iter(line) {
            let Some(digits) = caps.get(1) else {
                continue;
            };
            // Captured bytes are ASCII digits.
            let run = RunId::new(String::from_utf8_lossy(digits.as_bytes()));
            if !runs.contains(&run) {
                runs.push(run);
            }
        }
        runs
    }
}

impl Default for TokenScanner {
    fn default() -> Self {
        Self::new()
    }
}
