//! Output filtering
//!
//! Backend CLIs occasionally print their own noise on the streams of the
//! remote command (kubectl's exit-code trailer being the main offender).
//! Filtering is an injectable predicate so each backend supplies its own
//! patterns without the runner knowing about any of them. The runner hands
//! the filter each chunk of output as it arrives; backend trailers are
//! written in one piece, so matching on the chunk start is sufficient.

/// Source of an output chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSource {
    /// Standard output
    Stdout,
    /// Standard error
    Stderr,
}

/// Filter for subprocess output
pub trait LogFilter: Send + Sync {
    /// Filter a chunk of output (usually one line), returning None to
    /// suppress it.
    ///
    /// The returned &str can be the same as the input (pass-through)
    /// or a substring of it (partial filtering).
    fn filter<'a>(&self, chunk: &'a str, source: LogSource) -> Option<&'a str>;
}

/// A no-op filter that passes everything through
pub struct NoOpFilter;

impl LogFilter for NoOpFilter {
    fn filter<'a>(&self, chunk: &'a str, _source: LogSource) -> Option<&'a str> {
        Some(chunk)
    }
}

/// Suppresses the exit-code trailer kubectl appends to exec sessions
pub struct KubectlNoiseFilter;

impl LogFilter for KubectlNoiseFilter {
    fn filter<'a>(&self, chunk: &'a str, _source: LogSource) -> Option<&'a str> {
        if chunk.starts_with("command terminated with exit code") {
            None
        } else {
            Some(chunk)
        }
    }
}
