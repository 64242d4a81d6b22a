//! Single-pass classifying splitter.
//!
//! Each input line is either tagged (it carries one or more run tokens) or
//! global. Tagged lines go to their runs' sinks only. Global lines go to the
//! common buffer and to every sink opened so far. A sink opened later starts
//! with a replay of the common buffer, so every run file sees all global
//! lines. Tagged lines never enter the common buffer: a run discovered after
//! a line tagged for another run does not receive that line.

use crate::error::{Result, SplitError};
use crate::model::{InputSource, RunId, SplitConfig, SplitSummary};
use crate::scanner::TokenScanner;
use crate::sink::{CommonBuffer, RunSink};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};

pub struct Splitter {
    cfg: SplitConfig,
    scanner: TokenScanner,
    common: CommonBuffer,
    // Discovery order.
    sinks: Vec<RunSink>,
    index: HashMap<RunId, usize>,
    lines_read: u64,
    global_lines: u64,
    tagged_lines: u64,
}

impl Splitter {
    /// Create the scratch file backing the common buffer.
    pub fn new(cfg: SplitConfig) -> Result<Self> {
        let common = CommonBuffer::create(cfg.common_path())?;
        Ok(Self {
            cfg,
            scanner: TokenScanner::new(),
            common,
            sinks: Vec::new(),
            index: HashMap::new(),
            lines_read: 0,
            global_lines: 0,
            tagged_lines: 0,
        })
    }

    /// Look up the sink for `run`, opening it and replaying the common buffer
    /// into it on first use.
    pub fn ensure_sink(&mut self, run: &RunId) -> Result<&mut RunSink> {
        let idx = match self.index.get(run) {
            Some(&idx) => idx,
            None => {
                let path = self.cfg.run_path(run);
                let sink = RunSink::open(run.clone(), path, &mut self.common)?;
                self.sinks.push(sink);
                let idx = self.sinks.len() - 1;
                self.index.insert(run.clone(), idx);
                idx
            }
        };
        Ok(&mut self.sinks[idx])
    }

    /// Route one line. A missing trailing newline is added on output.
    pub fn process_line(&mut self, line: &[u8]) -> Result<()> {
        self.lines_read += 1;
        let runs = self.scanner.scan(line);
        if runs.is_empty() {
            self.global_lines += 1;
            self.common.append(line)?;
            for sink in &mut self.sinks {
                sink.write_line(line)?;
            }
            return Ok(());
        }

        self.tagged_lines += 1;
        for run in &runs {
            self.ensure_sink(run)?.write_line(line)?;
        }
        Ok(())
    }

    /// Consume `reader` to the end, one line at a time.
    pub fn split_stream<R: BufRead>(&mut self, mut reader: R) -> Result<()> {
        let mut line = Vec::with_capacity(256);
        loop {
            line.clear();
            let n = reader
                .read_until(b'\n', &mut line)
                .map_err(SplitError::InputRead)?;
            if n == 0 {
                return Ok(());
            }
            self.process_line(&line)?;
        }
    }

    /// Close every output. Without any run the common buffer becomes
    /// `P.run_unknown.log`; otherwise it is discarded.
    pub fn finish(self) -> Result<SplitSummary> {
        let Self {
            cfg,
            common,
            sinks,
            lines_read,
            global_lines,
            tagged_lines,
            ..
        } = self;

        let mut runs = Vec::with_capacity(sinks.len());
        let mut fallback = None;
        if sinks.is_empty() {
            let unknown = cfg.unknown_path();
            common.promote(&unknown)?;
            fallback = Some(unknown);
        } else {
            for sink in sinks {
                runs.push(sink.finish()?);
            }
            common.discard()?;
        }

        tracing::info!(
            lines = lines_read,
            global = global_lines,
            tagged = tagged_lines,
            runs = runs.len(),
            "split complete"
        );

        Ok(SplitSummary {
            input: cfg.input.display_name(),
            out_prefix: cfg.out_prefix,
            lines_read,
            global_lines,
            tagged_lines,
            runs,
            fallback,
            finished_utc: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_else(|_| "now".into()),
        })
    }
}

/// Open the configured input for buffered reading.
pub fn open_input(input: &InputSource) -> Result<Box<dyn BufRead>> {
    match input {
        InputSource::File(path) => {
            let file = File::open(path).map_err(|source| SplitError::InputOpen {
                path: path.clone(),
                source,
            })?;
            Ok(Box::new(BufReader::new(file)))
        }
        InputSource::Stdin => Ok(Box::new(io::stdin().lock())),
    }
}

/// Split the configured input into per-run files.
pub fn split(cfg: SplitConfig) -> Result<SplitSummary> {
    let reader = open_input(&cfg.input)?;
    let mut splitter = Splitter::new(cfg)?;
    splitter.split_stream(reader)?;
    splitter.finish()
}
