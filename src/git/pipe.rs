//! git::pipe
//!
//! The object store pipe: one long-lived `git cat-file --batch` child that
//! answers object requests over stdin/stdout.
//!
//! # Protocol
//!
//! Requests are single lines, either `{revision}:{path}` or `{content-id}`.
//! Each response starts with a header line:
//!
//! - `{id} {kind} {length}` followed by exactly `length` bytes of content
//!   and one trailing newline byte, or
//! - `{request} missing` when the object does not exist.
//!
//! The protocol carries no request identifiers, so exactly one request may be
//! in flight. A [`CatFile`] therefore requires `&mut self` for every fetch.
//!
//! # Failure
//!
//! If the child exits (or closes stdout) while a response is awaited, the
//! pipe reports [`PipeError::GitDied`] and is poisoned: the byte stream is in
//! an unknown state, so every later fetch fails with `GitDied` as well and
//! the owner must build a new pipe.
//!
//! # Limits
//!
//! Request lines are sent unescaped. Paths containing a line break cannot be
//! expressed in the batch protocol and are refused with
//! [`PipeError::UnsupportedRequest`] before anything is written.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Stdio};

use thiserror::Error;
use tracing::{debug, warn};

use super::repo::{GitCommand, Repo};
use crate::core::types::{ContentId, ObjectKind, Revision, TypeError};

/// Errors from the object store pipe.
#[derive(Debug, Error)]
pub enum PipeError {
    /// The store has no object for the request.
    #[error("object not found: {}", describe(.revision.as_ref(), .path))]
    MissingObject {
        /// Revision of a path request (`None` for a request by id)
        revision: Option<Revision>,
        /// Path of a path request, or the id of a request by id
        path: String,
    },

    /// The git child terminated while a response was awaited.
    #[error("git cat-file died while reading '{request}'")]
    GitDied {
        /// The request line that was in flight
        request: String,
    },

    /// The request cannot be written as a single batch line.
    #[error("cannot request '{}': line breaks are not supported", .request.escape_debug())]
    UnsupportedRequest { request: String },

    /// The git child could not be started.
    #[error("failed to start '{command}': {source}")]
    Spawn {
        command: String,
        source: io::Error,
    },

    /// The store returned a different kind of object than required.
    #[error("expected {expected} for '{request}', found {actual}")]
    UnexpectedKind {
        request: String,
        expected: ObjectKind,
        actual: ObjectKind,
    },

    /// The response did not follow the batch protocol.
    #[error("malformed cat-file response to '{request}': {message}")]
    Protocol { request: String, message: String },

    /// I/O failure talking to the child.
    #[error("cat-file pipe error: {0}")]
    Io(#[from] io::Error),
}

fn describe(revision: Option<&Revision>, path: &str) -> String {
    match revision {
        Some(rev) => format!("{}:{}", rev, path),
        None => path.to_string(),
    }
}

/// A single request to the object store.
#[derive(Debug, Clone, Copy)]
pub enum ObjectRequest<'a> {
    /// The object at `path` in the tree of `revision` (`""` is the root tree).
    Path {
        revision: &'a Revision,
        path: &'a str,
    },
    /// The object with the given id.
    Id(&'a ContentId),
    /// The commit a revision expression points at.
    Commit(&'a Revision),
}

impl ObjectRequest<'_> {
    /// The request line, without the terminating newline.
    pub fn line(&self) -> String {
        match self {
            ObjectRequest::Path { revision, path } => format!("{}:{}", revision, path),
            ObjectRequest::Id(id) => id.to_string(),
            ObjectRequest::Commit(revision) => format!("{}^{{commit}}", revision),
        }
    }

    /// Check that the request fits on one line.
    ///
    /// # Errors
    ///
    /// Returns `PipeError::UnsupportedRequest` if the line holds `\n` or `\r`.
    pub fn checked_line(&self) -> Result<String, PipeError> {
        let line = self.line();
        if line.contains(['\n', '\r']) {
            return Err(PipeError::UnsupportedRequest { request: line });
        }
        Ok(line)
    }

    /// The error reported when the store has no object for this request.
    pub(crate) fn missing(&self) -> PipeError {
        match self {
            ObjectRequest::Path { revision, path } => PipeError::MissingObject {
                revision: Some((*revision).clone()),
                path: path.to_string(),
            },
            ObjectRequest::Id(id) => PipeError::MissingObject {
                revision: None,
                path: id.to_string(),
            },
            ObjectRequest::Commit(revision) => PipeError::MissingObject {
                revision: Some((*revision).clone()),
                path: String::new(),
            },
        }
    }
}

/// An object returned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    pub id: ContentId,
    pub kind: ObjectKind,
    pub bytes: Vec<u8>,
}

impl ObjectRecord {
    /// Require the record to be of `expected` kind.
    ///
    /// # Errors
    ///
    /// Returns `PipeError::UnexpectedKind` otherwise.
    pub fn expect_kind(
        self,
        expected: ObjectKind,
        request: &ObjectRequest<'_>,
    ) -> Result<Self, PipeError> {
        if self.kind == expected {
            Ok(self)
        } else {
            Err(PipeError::UnexpectedKind {
                request: request.line(),
                expected,
                actual: self.kind,
            })
        }
    }
}

/// Source of git objects.
///
/// Implemented by [`CatFile`] for real repositories; tests substitute an
/// in-memory store.
pub trait ObjectStore {
    /// Fetch one object.
    ///
    /// # Errors
    ///
    /// - [`PipeError::MissingObject`] if the store has no such object
    /// - [`PipeError::GitDied`] if the backing process is gone
    fn fetch(&mut self, request: ObjectRequest<'_>) -> Result<ObjectRecord, PipeError>;
}

impl<S: ObjectStore + ?Sized> ObjectStore for &mut S {
    fn fetch(&mut self, request: ObjectRequest<'_>) -> Result<ObjectRecord, PipeError> {
        (**self).fetch(request)
    }
}

impl<S: ObjectStore + ?Sized> ObjectStore for Box<S> {
    fn fetch(&mut self, request: ObjectRequest<'_>) -> Result<ObjectRecord, PipeError> {
        (**self).fetch(request)
    }
}

/// Write one request line.
pub fn write_request<W: Write>(writer: &mut W, request: &ObjectRequest<'_>) -> io::Result<()> {
    let mut line = request.line();
    line.push('\n');
    writer.write_all(line.as_bytes())?;
    writer.flush()
}

/// Read one framed response for `request`.
///
/// End of stream anywhere inside the response is reported as `GitDied`.
///
/// # Errors
///
/// - [`PipeError::MissingObject`] for a `missing` header
/// - [`PipeError::GitDied`] if the stream ends early
/// - [`PipeError::Protocol`] if the framing is violated
pub fn read_response<R: BufRead>(
    reader: &mut R,
    request: &ObjectRequest<'_>,
) -> Result<ObjectRecord, PipeError> {
    let died = || PipeError::GitDied {
        request: request.line(),
    };
    let protocol = |message: String| PipeError::Protocol {
        request: request.line(),
        message,
    };

    let mut header = Vec::new();
    if reader.read_until(b'\n', &mut header)? == 0 || header.last() != Some(&b'\n') {
        return Err(died());
    }
    header.pop();
    let header = String::from_utf8(header)
        .map_err(|_| protocol("header is not valid UTF-8".to_string()))?;

    // The missing form echoes the request, which may itself contain spaces.
    if header.ends_with(" missing") {
        return Err(request.missing());
    }

    let mut fields = header.rsplitn(3, ' ');
    let (length, kind, id) = match (fields.next(), fields.next(), fields.next()) {
        (Some(length), Some(kind), Some(id)) => (length, kind, id),
        _ => return Err(protocol(format!("unexpected header '{}'", header))),
    };
    let length: usize = length
        .parse()
        .map_err(|_| protocol(format!("bad object length in '{}'", header)))?;
    let kind: ObjectKind = kind
        .parse()
        .map_err(|e: TypeError| protocol(e.to_string()))?;
    let id = ContentId::new(id).map_err(|e| protocol(e.to_string()))?;

    let mut bytes = vec![0u8; length];
    read_exact_or_died(reader, &mut bytes, &died)?;

    let mut newline = [0u8; 1];
    read_exact_or_died(reader, &mut newline, &died)?;
    if newline[0] != b'\n' {
        return Err(protocol("missing newline after object content".to_string()));
    }

    Ok(ObjectRecord { id, kind, bytes })
}

fn read_exact_or_died<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    died: impl Fn() -> PipeError,
) -> Result<(), PipeError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => died(),
        _ => PipeError::Io(e),
    })
}

/// A running `cat-file --batch` child.
#[derive(Debug)]
struct Process {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
}

/// The object store backed by `git cat-file --batch`.
///
/// The child is started lazily on the first fetch and reused afterwards.
/// Dropping the `CatFile` closes the child's stdin and waits for it to exit.
#[derive(Debug)]
pub struct CatFile {
    git: GitCommand,
    process: Option<Process>,
    poisoned: bool,
}

impl CatFile {
    /// Create a pipe that will run `cat-file` through `git`.
    pub fn new(git: GitCommand) -> Self {
        Self {
            git,
            process: None,
            poisoned: false,
        }
    }

    /// Create a pipe for `repo` using the given git executable.
    pub fn for_repo(binary: impl Into<PathBuf>, repo: Repo) -> Self {
        Self::new(GitCommand::new(binary, repo))
    }

    /// Check whether the child has been started.
    pub fn is_running(&self) -> bool {
        self.process.is_some()
    }

    /// Check whether the pipe has failed and must be discarded.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    fn process(&mut self) -> Result<&mut Process, PipeError> {
        let process = match self.process.take() {
            Some(process) => process,
            None => self.spawn()?,
        };
        Ok(self.process.insert(process))
    }

    fn spawn(&self) -> Result<Process, PipeError> {
        let args = ["cat-file", "--batch"];
        debug!(command = %self.git.display(&args), "starting object store pipe");
        let spawn_error = |source: io::Error| PipeError::Spawn {
            command: self.git.display(&args),
            source,
        };
        let mut child = self
            .git
            .command(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(spawn_error)?;
        match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => Ok(Process {
                child,
                stdin: Some(stdin),
                stdout: BufReader::new(stdout),
            }),
            _ => Err(spawn_error(io::Error::new(
                io::ErrorKind::Other,
                "stdio not captured",
            ))),
        }
    }

    fn exchange(&mut self, request: &ObjectRequest<'_>) -> Result<ObjectRecord, PipeError> {
        let process = self.process()?;
        let stdin = process.stdin.as_mut().ok_or_else(|| PipeError::GitDied {
            request: request.line(),
        })?;
        write_request(stdin, request).map_err(|e| match e.kind() {
            io::ErrorKind::BrokenPipe => PipeError::GitDied {
                request: request.line(),
            },
            _ => PipeError::Io(e),
        })?;
        let result = read_response(&mut process.stdout, request);
        if let Err(PipeError::GitDied { .. }) = &result {
            if let Ok(Some(status)) = process.child.try_wait() {
                warn!(%status, request = %request.line(), "git cat-file exited");
            }
        }
        result
    }
}

impl ObjectStore for CatFile {
    fn fetch(&mut self, request: ObjectRequest<'_>) -> Result<ObjectRecord, PipeError> {
        if self.poisoned {
            return Err(PipeError::GitDied {
                request: request.line(),
            });
        }
        let line = request.checked_line()?;
        debug!(request = %line, "cat-file request");
        match self.exchange(&request) {
            Err(e @ (PipeError::GitDied { .. } | PipeError::Protocol { .. } | PipeError::Io(_))) => {
                self.poisoned = true;
                Err(e)
            }
            other => other,
        }
    }
}

impl Drop for CatFile {
    fn drop(&mut self) {
        if let Some(mut process) = self.process.take() {
            // Closing stdin is cat-file's signal to exit.
            drop(process.stdin.take());
            if self.poisoned {
                let _ = process.child.kill();
            }
            match process.child.wait() {
                Ok(status) => debug!(%status, "object store pipe closed"),
                Err(e) => warn!(error = %e, "failed to reap git cat-file"),
            }
        }
    }
}
