use std::{
    fs::File,
    io::{self, BufReader, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use formscope_tracking::{Frame, MatchMetadata, flip_second_half};
use tracing::{info, warn};

use crate::command::MatchInputArg;

/// Destination of a JSON report: stdout, or a file created on open.
#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<&Path>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = match output_path {
            Some(path) => Output::create(path)?,
            None => Output::Stdout {
                writer: io::stdout().lock(),
            },
        };
        output.write_json(value)?;
        if let Output::File { path, .. } = &output {
            info!("report written to {}", path.display());
        }
        Ok(())
    }

    fn create(path: &Path) -> anyhow::Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path: path.to_owned(),
        })
    }

    fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_owned(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(self)
            .and_then(|()| self.flush())
            .with_context(|| format!("Failed to finish writing {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {file_kind} file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {file_kind} JSON file: {}", path.display()))
}

/// Reads a JSON Lines file, one value per non-blank line.
pub fn read_jsonl_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<Vec<T>>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {file_kind} file: {}", path.display()))?;
    parse_jsonl(BufReader::new(file))
        .with_context(|| format!("Failed to read {file_kind} file: {}", path.display()))
}

fn parse_jsonl<T, R>(reader: R) -> anyhow::Result<Vec<T>>
where
    T: serde::de::DeserializeOwned,
    R: io::BufRead,
{
    let mut values = vec![];
    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line.with_context(|| format!("I/O error at line {line_no}"))?;
        if line.trim().is_empty() {
            continue;
        }
        let value = serde_json::from_str(&line)
            .with_context(|| format!("Invalid JSON at line {line_no}"))?;
        values.push(value);
    }
    Ok(values)
}

#[derive(Debug)]
pub struct MatchData {
    pub metadata: MatchMetadata,
    pub frames: Vec<Frame>,
}

/// Loads a match and, unless disabled, mirrors the second half so that each
/// team attacks in the same direction in both halves.
pub fn load_match(input: &MatchInputArg) -> anyhow::Result<MatchData> {
    let metadata: MatchMetadata = read_json_file("metadata", &input.metadata)?;
    anyhow::ensure!(
        metadata.fps.is_finite() && metadata.fps > 0.0,
        "Invalid frame rate {} in {}",
        metadata.fps,
        input.metadata.display()
    );

    info!("loading tracking data from {}", input.tracking.display());
    let mut frames: Vec<Frame> = read_jsonl_file("tracking", &input.tracking)?;
    info!(frames = frames.len(), fps = metadata.fps, "tracking data loaded");

    if !input.no_flip {
        match flip_second_half(&mut frames) {
            Some(index) => info!(from_frame = index, "mirrored second-half coordinates"),
            None => warn!("no second-half frames to mirror"),
        }
    }

    Ok(MatchData { metadata, frames })
}
