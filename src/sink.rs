//! Output files owned by the splitter.
//!
//! [`RunSink`] is one `P.run_<id>.log` file. [`CommonBuffer`] is the
//! `P.common.tmp` scratch file holding every global line seen so far; it is
//! replayed into each new run sink and removed when dropped unless it was
//! promoted to the fallback output.

use crate::error::{Result, SplitError};
use crate::model::{RunId, RunReport};
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Write `line` and its terminator if the caller stripped it.
fn write_terminated<W: Write>(w: &mut W, line: &[u8]) -> io::Result<()> {
    w.write_all(line)?;
    if line.last() != Some(&b'\n') {
        w.write_all(b"\n")?;
    }
    Ok(())
}

pub struct RunSink {
    run: RunId,
    path: PathBuf,
    writer: BufWriter<File>,
    lines: u64,
}

impl RunSink {
    /// Create (or truncate) the run file and replay the common buffer into it.
    pub fn open(run: RunId, path: PathBuf, common: &mut CommonBuffer) -> Result<Self> {
        let file = File::create(&path).map_err(|source| SplitError::OutputCreate {
            path: path.clone(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        let seeded = common.copy_into(&mut writer, &path)?;
        let sink = Self {
            run,
            path,
            writer,
            lines: common.lines(),
        };
        tracing::debug!(
            run = %sink.run,
            path = %sink.path.display(),
            seeded_bytes = seeded,
            seeded_lines = sink.lines(),
            "opened run file"
        );
        Ok(sink)
    }

    pub fn lines(&self) -> u64 {
        self.lines
    }

    pub fn write_line(&mut self, line: &[u8]) -> Result<()> {
        write_terminated(&mut self.writer, line).map_err(|source| SplitError::OutputWrite {
            path: self.path.clone(),
            source,
        })?;
        self.lines += 1;
        Ok(())
    }

    /// Flush and close the file.
    pub fn finish(self) -> Result<RunReport> {
        let Self {
            run,
            path,
            writer,
            lines,
        } = self;
        let file = writer
            .into_inner()
            .map_err(|e| SplitError::OutputFinalize {
                path: path.clone(),
                source: e.into_error(),
            })?;
        drop(file);
        Ok(RunReport { run, path, lines })
    }
}

pub struct CommonBuffer {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    lines: u64,
}

impl CommonBuffer {
    pub fn create(path: PathBuf) -> Result<Self> {
        let file = File::create(&path).map_err(|source| SplitError::OutputCreate {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
            lines: 0,
        })
    }

    pub fn lines(&self) -> u64 {
        self.lines
    }

    pub fn append(&mut self, line: &[u8]) -> Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(SplitError::OutputWrite {
                path: self.path.clone(),
                source: io::Error::other("common buffer already closed"),
            });
        };
        write_terminated(writer, line).map_err(|source| SplitError::OutputWrite {
            path: self.path.clone(),
            source,
        })?;
        self.lines += 1;
        Ok(())
    }

    /// Flush pending lines and copy the whole scratch file into `dest`, the
    /// writer for `dest_path`.
    pub fn copy_into<W: Write>(&mut self, dest: &mut W, dest_path: &Path) -> Result<u64> {
        let scratch_err = |source: io::Error| SplitError::OutputWrite {
            path: self.path.clone(),
            source,
        };
        if let Some(writer) = self.writer.as_mut() {
            writer.flush().map_err(scratch_err)?;
        }
        let mut src = File::open(&self.path).map_err(scratch_err)?;
        let mut buf = [0u8; 8 * 1024];
        let mut copied = 0u64;
        loop {
            let n = match src.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(scratch_err(e)),
            };
            dest.write_all(&buf[..n])
                .map_err(|source| SplitError::OutputWrite {
                    path: dest_path.to_path_buf(),
                    source,
                })?;
            copied += n as u64;
        }
        Ok(copied)
    }

    /// Flush and close the scratch file, then remove it.
    pub fn discard(mut self) -> Result<()> {
        self.close()?;
        tracing::debug!(path = %self.path.display(), "discarding common buffer");
        Ok(())
    }

    /// Turn the scratch file into `dest`. Tries a rename first and falls back
    /// to copy-then-delete when the rename is refused.
    pub fn promote(mut self, dest: &Path) -> Result<()> {
        self.close()?;
        match fs::rename(&self.path, dest) {
            Ok(()) => {
                tracing::debug!(from = %self.path.display(), to = %dest.display(), "renamed common buffer");
                return Ok(());
            }
            Err(e) => {
                tracing::debug!(error = %e, "rename failed, copying common buffer instead");
            }
        }
        let promotion = |source: io::Error| SplitError::FallbackPromotion {
            path: dest.to_path_buf(),
            source,
        };
        let mut src = File::open(&self.path).map_err(promotion)?;
        let mut dst = File::create(dest).map_err(promotion)?;
        io::copy(&mut src, &mut dst).map_err(promotion)?;
        dst.flush().map_err(promotion)?;
        // Scratch file is removed on drop.
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            let file = writer
                .into_inner()
                .map_err(|e| SplitError::OutputFinalize {
                    path: self.path.clone(),
                    source: e.into_error(),
                })?;
            drop(file);
        }
        Ok(())
    }
}

impl Drop for CommonBuffer {
    fn drop(&mut self) {
        self.writer.take();
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to remove common buffer");
            }
        }
    }
}
