//! Stream plumbing: capture, tee, and end-of-stream rules.
//!
//! Child output is pumped chunk by chunk into an ordered buffer and, when
//! configured, mirrored into a [`Sink`]. The tee is subordinate to
//! collection: a failing sink is detached and the channel keeps draining.
//! End-of-stream is propagated only to sinks that are not the host's own
//! stdio; closing the real stdout or stderr would cut off output for the
//! rest of the program.

use crate::config::Encoding;
use std::borrow::Cow;
use std::fmt;
use std::io;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Read size for one pipe chunk.
pub(crate) const CHUNK_SIZE: usize = 8192;

/// Captured output of one channel, shaped by the requested [`Encoding`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Captured {
    Text(String),
    Raw(Vec<u8>),
}

impl Captured {
    pub(crate) fn from_bytes(bytes: Vec<u8>, encoding: Encoding) -> Self {
        match encoding {
            Encoding::Text => Captured::Text(String::from_utf8_lossy(&bytes).into_owned()),
            Encoding::Raw => Captured::Raw(bytes),
        }
    }

    pub(crate) fn empty(encoding: Encoding) -> Self {
        Self::from_bytes(Vec::new(), encoding)
    }

    /// Captured bytes regardless of encoding.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Captured::Text(text) => text.as_bytes(),
            Captured::Raw(bytes) => bytes,
        }
    }

    /// Text view of the capture; lossy for raw bytes.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Captured::Text(text) => Cow::Borrowed(text),
            Captured::Raw(bytes) => String::from_utf8_lossy(bytes),
        }
    }

    /// True when nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

/// Destination for mirrored output chunks.
pub enum Sink {
    /// The host process's own stdout. Stays open after the run.
    HostStdout(tokio::io::Stdout),
    /// The host process's own stderr. Stays open after the run.
    HostStderr(tokio::io::Stderr),
    /// Arbitrary writer, shut down once the child side ends.
    Writer(Box<dyn AsyncWrite + Send + Unpin>),
}

impl Sink {
    /// Tee into the host's stdout.
    pub fn stdout() -> Self {
        Sink::HostStdout(tokio::io::stdout())
    }

    /// Tee into the host's stderr.
    pub fn stderr() -> Self {
        Sink::HostStderr(tokio::io::stderr())
    }

    /// Tee into an arbitrary async writer.
    pub fn writer<W>(writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Sink::Writer(Box::new(writer))
    }

    /// True when the sink is one of the host's own stdio handles.
    pub fn is_live(&self) -> bool {
        matches!(self, Sink::HostStdout(_) | Sink::HostStderr(_))
    }

    async fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        match self {
            Sink::HostStdout(out) => {
                out.write_all(chunk).await?;
                out.flush().await
            }
            Sink::HostStderr(err) => {
                err.write_all(chunk).await?;
                err.flush().await
            }
            Sink::Writer(writer) => writer.write_all(chunk).await,
        }
    }

    /// End-of-stream: closes a [`Sink::Writer`], leaves live streams open.
    async fn finish(&mut self) -> io::Result<()> {
        match self {
            Sink::Writer(writer) => writer.shutdown().await,
            Sink::HostStdout(_) | Sink::HostStderr(_) => Ok(()),
        }
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sink::HostStdout(_) => "Sink::HostStdout",
            Sink::HostStderr(_) => "Sink::HostStderr",
            Sink::Writer(_) => "Sink::Writer(..)",
        })
    }
}

/// Output handling for one child channel.
#[derive(Debug, Default)]
pub enum Tee {
    /// Capture only.
    #[default]
    None,
    /// Hand the real host stream to the child; nothing is captured and the
    /// outcome reports that channel as empty.
    Inherit,
    /// Capture and mirror every chunk into the sink.
    Sink(Sink),
}

impl Tee {
    /// Child-side stdio setup for this channel.
    pub(crate) fn stdio(&self) -> Stdio {
        match self {
            Tee::Inherit => Stdio::inherit(),
            Tee::None | Tee::Sink(_) => Stdio::piped(),
        }
    }

    pub(crate) fn into_sink(self) -> Option<Sink> {
        match self {
            Tee::Sink(sink) => Some(sink),
            Tee::None | Tee::Inherit => None,
        }
    }
}

impl From<Sink> for Tee {
    fn from(sink: Sink) -> Self {
        Tee::Sink(sink)
    }
}

/// Input for the child's stdin.
#[derive(Default)]
pub enum Feed {
    /// Child stdin is closed immediately; the child sees end-of-input.
    #[default]
    None,
    /// Hand the host's own stdin to the child.
    Inherit,
    /// Copy the reader into the child's stdin, then close it.
    Reader(Box<dyn AsyncRead + Send + Unpin>),
}

impl Feed {
    /// Feed from an arbitrary async reader.
    pub fn reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Feed::Reader(Box::new(reader))
    }

    /// Child-side stdio setup for stdin.
    pub(crate) fn stdio(&self) -> Stdio {
        match self {
            Feed::None => Stdio::null(),
            Feed::Inherit => Stdio::inherit(),
            Feed::Reader(_) => Stdio::piped(),
        }
    }

    pub(crate) fn into_reader(self) -> Option<Box<dyn AsyncRead + Send + Unpin>> {
        match self {
            Feed::Reader(reader) => Some(reader),
            Feed::None | Feed::Inherit => None,
        }
    }
}

impl fmt::Debug for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Feed::None => "Feed::None",
            Feed::Inherit => "Feed::Inherit",
            Feed::Reader(_) => "Feed::Reader(..)",
        })
    }
}

/// One drained channel: the collected bytes plus the first failure seen
/// on either side of the tee.
#[derive(Debug, Default)]
pub(crate) struct Pumped {
    pub(crate) bytes: Vec<u8>,
    /// Child-pipe read failure; collection stopped where it happened.
    pub(crate) read_error: Option<io::Error>,
    /// Sink write failure; mirroring stopped, collection continued.
    pub(crate) sink_error: Option<io::Error>,
}

/// Drain `reader` to end-of-stream, accumulating chunks in arrival order
/// and mirroring each one into `sink`. The tee is subordinate to
/// collection: a failing sink is detached and reading continues, while a
/// read failure ends the channel with whatever was collected so far. The
/// end signal reaches the sink only when it is not a live stream.
pub(crate) async fn pump<R>(mut reader: R, mut sink: Option<Sink>) -> Pumped
where
    R: AsyncRead + Unpin,
{
    let mut chunk = [0u8; CHUNK_SIZE];
    let mut out = Pumped::default();
    loop {
        let n = match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(error) => {
                out.read_error = Some(error);
                return out;
            }
        };
        out.bytes.extend_from_slice(&chunk[..n]);
        // a failed sink is not put back; the channel keeps draining
        if let Some(mut active) = sink.take() {
            match active.write_chunk(&chunk[..n]).await {
                Ok(()) => sink = Some(active),
                Err(error) => out.sink_error = Some(error),
            }
        }
    }
    if let Some(mut active) = sink {
        if let Err(error) = active.finish().await {
            out.sink_error = Some(error);
        }
    }
    out
}

/// Write one fully-captured buffer into a sink, then signal end-of-stream
/// per the same live/non-live rule as [`pump`].
pub(crate) async fn replay(mut sink: Sink, bytes: &[u8]) -> io::Result<()> {
    sink.write_chunk(bytes).await?;
    sink.finish().await
}

/// Copy `reader` into the child's stdin, then close it so the child
/// observes end-of-input. Resolves once the source has drained.
pub(crate) async fn feed_stdin<W>(
    stdin: Option<W>,
    reader: Option<Box<dyn AsyncRead + Send + Unpin>>,
) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let (Some(mut stdin), Some(mut reader)) = (stdin, reader) else {
        return Ok(());
    };
    tokio::io::copy(&mut reader, &mut stdin).await?;
    stdin.shutdown().await
}
