//! External hash utility invocation
//!
//! [`DirectHasher`] runs `b3sum <path>`. [`PipedHasher`] runs `cat <path> | b3sum`,
//! which is friendlier to slow spinning media than b3sum's own multi-threaded,
//! memory-mapped reads. Both children of the pipeline are always reaped.

use crate::config::HashingConfig;
use crate::error::HashError;
use crate::hash::{parse_hasher_output, Digest, Hasher};
use std::io::Read;
use std::path::Path;
use std::process::{Child, ChildStderr, Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use tracing::trace;

/// Flags passed to b3sum when reading from slow media.
const SLOW_MEDIA_FLAGS: [&str; 2] = ["--no-mmap", "--num-threads=1"];

/// Runs the hash program with the file path as its last argument.
#[derive(Debug, Clone)]
pub struct DirectHasher {
    program: String,
    args: Vec<String>,
    slow_media: bool,
}

impl DirectHasher {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            slow_media: false,
        }
    }

    pub fn from_config(config: &HashingConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            slow_media: config.slow_media,
        }
    }

    /// Arguments placed before the slow-media flags and the file path.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_slow_media(mut self, slow_media: bool) -> Self {
        self.slow_media = slow_media;
        self
    }
}

impl Hasher for DirectHasher {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn compute(&self, path: &Path) -> Result<Digest, HashError> {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if self.slow_media {
            command.args(SLOW_MEDIA_FLAGS);
        }
        command.arg(path).stdin(Stdio::null());
        trace!(program = %self.program, path = %path.display(), "Running hash program");

        let output = command.output().map_err(|source| HashError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        check_status(&self.program, path, &output)?;

        parse_hasher_output(path, &output.stdout)
    }
}

/// Streams the file through a reader process into the hash program's stdin.
#[derive(Debug, Clone)]
pub struct PipedHasher {
    reader: String,
    program: String,
    args: Vec<String>,
}

impl PipedHasher {
    pub fn new(reader: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            reader: reader.into(),
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn from_config(config: &HashingConfig) -> Self {
        Self {
            reader: config.reader.clone(),
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }
}

impl Hasher for PipedHasher {
    fn name(&self) -> &'static str {
        "piped"
    }

    fn compute(&self, path: &Path) -> Result<Digest, HashError> {
        trace!(
            reader = %self.reader,
            program = %self.program,
            path = %path.display(),
            "Running hash pipeline"
        );

        let mut reader = Command::new(&self.reader)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| HashError::Spawn {
                program: self.reader.clone(),
                source,
            })?;

        // Drained while the hash program runs so a chatty reader cannot block on a full pipe.
        let reader_stderr = reader.stderr.take().map(drain);

        let Some(reader_stdout) = reader.stdout.take() else {
            reap(&mut reader);
            return Err(HashError::Spawn {
                program: self.reader.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "reader stdout was not captured",
                ),
            });
        };

        let hashed = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::from(reader_stdout))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .and_then(Child::wait_with_output);

        let hash_output = match hashed {
            Ok(output) => output,
            Err(source) => {
                reap(&mut reader);
                return Err(HashError::Spawn {
                    program: self.program.clone(),
                    source,
                });
            }
        };

        let status = reader.wait().map_err(|source| HashError::Spawn {
            program: self.reader.clone(),
            source,
        })?;
        let reader_output = Output {
            status,
            stdout: Vec::new(),
            stderr: reader_stderr
                .and_then(|handle| handle.join().ok())
                .unwrap_or_default(),
        };

        check_status(&self.program, path, &hash_output)?;
        check_status(&self.reader, path, &reader_output)?;

        parse_hasher_output(path, &hash_output.stdout)
    }
}

fn check_status(program: &str, path: &Path, output: &Output) -> Result<(), HashError> {
    if output.status.success() {
        return Ok(());
    }
    Err(HashError::ExitStatus {
        program: program.to_string(),
        path: path.to_path_buf(),
        status: output.status,
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

/// Read a child's stream to the end on its own thread.
fn drain(mut stream: ChildStderr) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = stream.read_to_end(&mut buf);
        buf
    })
}

/// Kill and wait so an abandoned child never lingers as a zombie.
fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
