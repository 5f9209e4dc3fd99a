//! Folded-stack capture files.
//!
//! One line per distinct stack, root frame first, leaf frame last:
//!
//! ```text
//! main;update;draw 12
//! ```
//!
//! This is the input format of flamegraph renderers.

use crate::sampler::key::SampleKey;
use crate::symbols::{placeholder, SymbolResolver};
use crate::utils::config::CAPTURE_FILE_FORMAT;
use crate::utils::error::OutputError;
use chrono::NaiveDateTime;
use log::{debug, info};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Separator between frames on a folded line
pub const FRAME_SEPARATOR: char = ';';

/// File name of the capture written at `now`, to the second.
///
/// Two windows closing within the same second share a name; the later one
/// overwrites the earlier.
pub fn capture_file_name(now: &NaiveDateTime) -> String {
    now.format(CAPTURE_FILE_FORMAT).to_string()
}

/// Writes drained capture windows into a directory
#[derive(Clone)]
pub struct Exporter {
    dir: PathBuf,
    resolver: Arc<dyn SymbolResolver>,
}

impl Exporter {
    pub fn new(dir: impl Into<PathBuf>, resolver: Arc<dyn SymbolResolver>) -> Self {
        Self {
            dir: dir.into(),
            resolver,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `entries` to `<dir>/<timestamp>.txt`, truncating any existing
    /// file of that name.
    ///
    /// # Errors
    /// * `OutputError::InvalidPath` - the directory path is empty or a file
    /// * `OutputError::OpenFailed` - the directory or file could not be created
    /// * `OutputError::WriteFailed` - I/O error while writing lines
    pub fn export(
        &self,
        now: &NaiveDateTime,
        entries: &[(SampleKey, u32)],
    ) -> Result<PathBuf, OutputError> {
        validate_dir(&self.dir)?;

        if !self.dir.exists() {
            debug!("Creating trace directory: {}", self.dir.display());
            std::fs::create_dir_all(&self.dir).map_err(|source| OutputError::OpenFailed {
                path: self.dir.clone(),
                source,
            })?;
        }

        let path = self.dir.join(capture_file_name(now));
        let file = File::create(&path).map_err(|source| OutputError::OpenFailed {
            path: path.clone(),
            source,
        })?;

        let mut writer = BufWriter::new(file);
        write_folded(&mut writer, entries, self.resolver.as_ref())?;
        writer.flush()?;

        info!("Wrote {} stacks to {}", entries.len(), path.display());
        Ok(path)
    }
}

fn validate_dir(dir: &Path) -> Result<(), OutputError> {
    if dir.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if dir.exists() && !dir.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is not a directory: {}",
            dir.display()
        )));
    }

    Ok(())
}

/// Write one folded line per entry, in the order given
pub fn write_folded<W: Write>(
    writer: &mut W,
    entries: &[(SampleKey, u32)],
    resolver: &dyn SymbolResolver,
) -> io::Result<()> {
    for (key, count) in entries {
        if key.is_empty() || *count == 0 {
            continue;
        }
        writeln!(writer, "{} {}", folded_frames(key, resolver), count)?;
    }
    Ok(())
}

/// Render entries to a string, same layout as the capture file
pub fn render_folded(entries: &[(SampleKey, u32)], resolver: &dyn SymbolResolver) -> String {
    let mut out = Vec::new();
    // writing into a Vec cannot fail
    let _ = write_folded(&mut out, entries, resolver);
    String::from_utf8_lossy(&out).into_owned()
}

/// Frames of `key` joined root first (the reverse of capture order)
fn folded_frames(key: &SampleKey, resolver: &dyn SymbolResolver) -> String {
    let mut line = String::new();
    for (i, &address) in key.frames().iter().rev().enumerate() {
        if i > 0 {
            line.push(FRAME_SEPARATOR);
        }
        let name = sanitize_frame(&resolver.resolve(address));
        if name.is_empty() {
            line.push_str(&placeholder(address));
        } else {
            line.push_str(&name);
        }
    }
    line
}

/// Keep a symbol name from breaking the line syntax
fn sanitize_frame(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            FRAME_SEPARATOR | '\n' | '\r' => '_',
            other => other,
        })
        .collect()
}

/// One parsed line of a folded-stack file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldedStack {
    /// Frame names, root first
    pub frames: Vec<String>,

    /// Number of samples
    pub count: u64,
}

impl FoldedStack {
    pub fn new(frames: Vec<String>, count: u64) -> Self {
        Self { frames, count }
    }

    /// Deepest (leaf) frame
    pub fn leaf(&self) -> Option<&str> {
        self.frames.last().map(String::as_str)
    }

    pub fn to_line(&self) -> String {
        format!("{} {}", self.frames.join(";"), self.count)
    }
}

/// Parse folded-stack text, rejecting malformed lines.
///
/// Blank lines are ignored.
pub fn parse_folded(text: &str) -> Result<Vec<FoldedStack>, OutputError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| parse_line(index + 1, line))
        .collect()
}

fn parse_line(line_number: usize, line: &str) -> Result<FoldedStack, OutputError> {
    let malformed = |reason: &str| OutputError::Malformed {
        line: line_number,
        reason: reason.to_string(),
    };

    let (stack, count) = line
        .rsplit_once(' ')
        .ok_or_else(|| malformed("missing sample count"))?;

    let count: u64 = count
        .parse()
        .map_err(|_| malformed("sample count is not a decimal integer"))?;
    if count == 0 {
        return Err(malformed("sample count must be positive"));
    }

    let frames: Vec<String> = stack.split(FRAME_SEPARATOR).map(str::to_string).collect();
    if frames.iter().any(String::is_empty) {
        return Err(malformed("empty frame name"));
    }

    Ok(FoldedStack::new(frames, count))
}

/// Read and parse a capture file
pub fn read_folded(input_path: impl AsRef<Path>) -> Result<Vec<FoldedStack>, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading folded stacks from: {}", input_path.display());

    let text = std::fs::read_to_string(input_path)?;
    parse_folded(&text)
}
