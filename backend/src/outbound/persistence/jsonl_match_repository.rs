//! JSON-lines implementation of the `MatchRepository` port.
//!
//! A row is only complete once its terminating newline is on disk. Readers
//! skip an unterminated final line, and the next append truncates it when it
//! does not decode, so a write torn by a crash never blocks a later start.

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::{Dir, File, OpenOptions};
use tracing::{debug, warn};

use super::WideRow;
use super::jsonl_match_feed::JsonlMatchFeed;
use crate::domain::MatchRecordWide;
use crate::domain::ports::{MatchRepository, MatchRepositoryError};

/// Position just past the last complete row consumed from the store file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(super) struct StoreCursor {
    pub(super) offset: u64,
    pub(super) line: usize,
}

/// Complete rows read past a cursor.
#[derive(Debug)]
pub(super) struct StoreRead {
    pub(super) records: Vec<MatchRecordWide>,
    pub(super) cursor: StoreCursor,
    /// Bytes after the last newline, if any.
    pub(super) tail: String,
}

pub(super) struct StoreFile {
    dir: Dir,
    file_name: PathBuf,
    pub(super) path: PathBuf,
    write_lock: Mutex<()>,
}

/// Append-only JSON-lines file of wide match rows.
///
/// File I/O runs on the blocking pool.
#[derive(Clone)]
pub struct JsonlMatchRepository {
    file: Arc<StoreFile>,
}

impl JsonlMatchRepository {
    /// Open (creating parent directories as needed) the store at `path`.
    /// The file itself is created on first append.
    ///
    /// # Errors
    /// Returns an I/O error when `path` has no file name or the parent
    /// directory cannot be created or opened.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let file_name = path.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("match store path '{}' must name a file", path.display()),
            )
        })?;
        Dir::create_ambient_dir_all(parent, ambient_authority())?;
        let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
        Ok(Self {
            file: Arc::new(StoreFile {
                dir,
                file_name: PathBuf::from(file_name),
                path: path.to_path_buf(),
                write_lock: Mutex::new(()),
            }),
        })
    }

    /// Path the repository reads and appends to.
    pub fn path(&self) -> &Path {
        &self.file.path
    }

    /// Follow this file from its first row.
    ///
    /// Each [`MatchFeed::next_batch`](crate::domain::ports::MatchFeed::next_batch)
    /// call returns the complete rows appended since the previous one.
    pub fn feed(&self) -> JsonlMatchFeed {
        JsonlMatchFeed::new(Arc::clone(&self.file))
    }
}

fn io_error(path: &Path, err: &io::Error) -> MatchRepositoryError {
    MatchRepositoryError::io(format!("{}: {err}", path.display()))
}

fn decode_line(number: usize, line: &str) -> Result<MatchRecordWide, MatchRepositoryError> {
    let row: WideRow = serde_json::from_str(line)
        .map_err(|err| MatchRepositoryError::decode(number, err.to_string()))?;
    MatchRecordWide::try_from(row).map_err(|err| MatchRepositoryError::decode(number, err.to_string()))
}

fn last_newline(bytes: &[u8]) -> Option<usize> {
    bytes.iter().rposition(|byte| *byte == b'\n')
}

impl StoreFile {
    fn open_read(&self) -> Result<Option<File>, MatchRepositoryError> {
        match self.dir.open(&self.file_name) {
            Ok(file) => Ok(Some(file)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(&self.path, &err)),
        }
    }

    /// Decode the complete rows after `cursor`. The unterminated tail is
    /// returned as text and not consumed.
    pub(super) fn read_from(&self, cursor: StoreCursor) -> Result<StoreRead, MatchRepositoryError> {
        let Some(mut file) = self.open_read()? else {
            return Ok(StoreRead {
                records: Vec::new(),
                cursor,
                tail: String::new(),
            });
        };
        let mut bytes = Vec::new();
        file.seek(SeekFrom::Start(cursor.offset))
            .and_then(|_| file.read_to_end(&mut bytes))
            .map_err(|err| io_error(&self.path, &err))?;

        let complete_len = last_newline(&bytes).map_or(0, |index| index + 1);
        let (complete, tail) = bytes.split_at(complete_len);
        let complete = std::str::from_utf8(complete)
            .map_err(|err| MatchRepositoryError::decode(cursor.line + 1, err.to_string()))?;

        let mut records = Vec::new();
        let mut line = cursor.line;
        for text in complete.lines() {
            line += 1;
            if !text.trim().is_empty() {
                records.push(decode_line(line, text)?);
            }
        }
        Ok(StoreRead {
            records,
            cursor: StoreCursor {
                offset: cursor.offset + complete_len as u64,
                line,
            },
            tail: String::from_utf8_lossy(tail).into_owned(),
        })
    }

    fn read_all(&self) -> Result<Vec<MatchRecordWide>, MatchRepositoryError> {
        let StoreRead {
            mut records,
            cursor,
            tail,
        } = self.read_from(StoreCursor::default())?;
        if tail.trim().is_empty() {
            return Ok(records);
        }
        match decode_line(cursor.line + 1, &tail) {
            Ok(record) => records.push(record),
            Err(err) => warn!(
                path = %self.path.display(),
                error = %err,
                "unterminated final row ignored"
            ),
        }
        Ok(records)
    }

    /// Terminate a decodable unterminated last row, or cut off a torn one,
    /// so the next write starts on a fresh line.
    fn repair_tail(&self, file: &mut File) -> io::Result<()> {
        let len = file.metadata()?.len();
        if len == 0 {
            return Ok(());
        }
        let mut last = [0_u8; 1];
        file.seek(SeekFrom::Start(len - 1))?;
        file.read_exact(&mut last)?;
        if last[0] == b'\n' {
            return Ok(());
        }

        let mut bytes = Vec::new();
        file.seek(SeekFrom::Start(0))?;
        file.read_to_end(&mut bytes)?;
        let complete_len = last_newline(&bytes).map_or(0, |index| index + 1);
        let tail = String::from_utf8_lossy(bytes.get(complete_len..).unwrap_or_default());
        if decode_line(0, &tail).is_ok() {
            file.write_all(b"\n")
        } else {
            warn!(
                path = %self.path.display(),
                bytes = tail.len(),
                "truncating torn final row"
            );
            file.set_len(complete_len as u64)
        }
    }

    fn append_lines(&self, buffer: &str) -> Result<(), MatchRepositoryError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut options = OpenOptions::new();
        options.create(true).read(true).append(true);
        let mut file = self
            .dir
            .open_with(&self.file_name, &options)
            .map_err(|err| io_error(&self.path, &err))?;
        self.repair_tail(&mut file)
            .and_then(|()| file.write_all(buffer.as_bytes()))
            .and_then(|()| file.flush())
            .and_then(|()| file.sync_data())
            .map_err(|err| io_error(&self.path, &err))
    }
}

pub(super) async fn run_blocking<T, F>(
    file: &Arc<StoreFile>,
    task: F,
) -> Result<T, MatchRepositoryError>
where
    T: Send + 'static,
    F: FnOnce(&StoreFile) -> Result<T, MatchRepositoryError> + Send + 'static,
{
    let file = Arc::clone(file);
    tokio::task::spawn_blocking(move || task(&file))
        .await
        .map_err(|err| MatchRepositoryError::io(format!("storage task failed: {err}")))?
}

#[async_trait]
impl MatchRepository for JsonlMatchRepository {
    async fn load_all(&self) -> Result<Vec<MatchRecordWide>, MatchRepositoryError> {
        let records = run_blocking(&self.file, StoreFile::read_all).await?;
        debug!(path = %self.file.path.display(), rows = records.len(), "match store loaded");
        Ok(records)
    }

    async fn append(&self, records: &[MatchRecordWide]) -> Result<(), MatchRepositoryError> {
        if records.is_empty() {
            return Ok(());
        }
        let mut buffer = String::new();
        for record in records {
            let line = serde_json::to_string(&WideRow::from(record))
                .map_err(|err| MatchRepositoryError::io(format!("encode row: {err}")))?;
            buffer.push_str(&line);
            buffer.push('\n');
        }
        run_blocking(&self.file, move |file| file.append_lines(&buffer)).await?;
        debug!(path = %self.file.path.display(), rows = records.len(), "match rows appended");
        Ok(())
    }
}
