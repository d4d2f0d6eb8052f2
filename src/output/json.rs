use crate::chunker::Chunk;
use crate::CrawlerError;
use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Builds `{prefix}_{YYYY-MM-DD_HH-MM-SS}.json`
pub fn result_file_name(prefix: &str, timestamp: DateTime<Local>) -> String {
    format!("{}_{}.json", prefix, timestamp.format("%Y-%m-%d_%H-%M-%S"))
}

/// Writes the run's chunks, in position order, as a JSON array
///
/// Each element carries `url`, `title` (omitted when the page had none),
/// `content` and `position`. The directory is created if missing.
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written file
/// * `Err(CrawlerError::Persist)` - The file could not be created or written
pub fn write_results(
    directory: &Path,
    prefix: &str,
    chunks: &[Chunk],
) -> Result<PathBuf, CrawlerError> {
    let path = directory.join(result_file_name(prefix, Local::now()));
    let persist_err = |source| CrawlerError::Persist {
        path: path.display().to_string(),
        source,
    };

    fs::create_dir_all(directory).map_err(persist_err)?;

    let file = File::create(&path).map_err(persist_err)?;
    write_json(BufWriter::new(file), chunks).map_err(persist_err)?;

    tracing::info!(path = %path.display(), chunks = chunks.len(), "Results written");
    Ok(path)
}

/// Serializing plain chunks cannot fail, so every error here is an I/O error
fn write_json<W: Write>(mut writer: W, chunks: &[Chunk]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, chunks)?;
    writer.flush()
}
