//! Pull-based SABR stream parser
//!
//! [`SabrStreamParser`] drives the pipeline: UMP decoder, classifier,
//! processor. Each [`parse`](SabrStreamParser::parse) call pulls parts until
//! one of them produces a [`SabrPart`], the byte source runs out, or a fatal
//! error occurs.
//!
//! Unknown parts are skipped and reported to the installed
//! [`DiagnosticsSink`]. Live segment mismatches inside the correction window
//! adjust the session state and the loop carries on; every other mismatch
//! aborts the parser.
//!
//! ```rust
//! use sabr_stream::{ParserConfig, SabrStreamParser, SessionState};
//!
//! let bytes: Vec<u8> = Vec::new();
//! let mut parser =
//!     SabrStreamParser::from_bytes(bytes, ParserConfig::new(SessionState::live(10_000, 500)))?;
//!
//! while let Some(part) = parser.parse()? {
//!     println!("{:?}", part.kind());
//! }
//! assert_eq!(parser.resync_stats().total(), 0);
//! # Ok::<(), sabr_stream::StreamError>(())
//! ```

use bytes::Bytes;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;
use tracing::{debug, trace};

use crate::config::ParserConfig;
use crate::diagnostics::{DiagnosticsSink, TracingDiagnostics};
use crate::error::SegmentMismatch;
use crate::processor::{PartOutcome, SabrProcessor, apply_resync};
use crate::types::{ResyncStats, SabrPart, SessionState};
use crate::ump::{Classified, Part, UmpDecoder};
use crate::{Result, StreamError};


/// Lifecycle of a parser instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserStatus {
    /// More results may follow.
    Running,
    /// The byte source is exhausted.
    Done,
    /// A fatal error was returned; the instance must be discarded.
    Aborted,
}

/// Decodes SABR results from one UMP byte stream for one session.
pub struct SabrStreamParser<R, D = TracingDiagnostics> {
    decoder: UmpDecoder<R>,
    processor: SabrProcessor,
    diagnostics: D,
    status: ParserStatus,
}

impl<R: Read> SabrStreamParser<R> {
    /// Build a parser over `reader`; `config` is validated first.
    pub fn new(reader: R, config: ParserConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            decoder: UmpDecoder::with_max_part_size(reader, config.max_part_size),
            processor: SabrProcessor::new(config.initial_state),
            diagnostics: TracingDiagnostics,
            status: ParserStatus::Running,
        })
    }
}

impl SabrStreamParser<Cursor<Bytes>> {
    /// Parse an in-memory response body.
    pub fn from_bytes(bytes: impl Into<Bytes>, config: ParserConfig) -> Result<Self> {
        Self::new(Cursor::new(bytes.into()), config)
    }
}

impl SabrStreamParser<BufReader<File>> {
    /// Parse a response body saved to disk.
    pub fn open<P: AsRef<Path>>(path: P, config: ParserConfig) -> Result<Self> {
        let path = path.as_ref();
        config.validate()?;
        let file = File::open(path).map_err(|e| StreamError::file_error(path.to_path_buf(), e))?;
        debug!("Opened SABR stream file {}", path.display());
        Self::new(BufReader::new(file), config)
    }
}

impl<R: Read, D: DiagnosticsSink> SabrStreamParser<R, D> {
    /// Replace the diagnostics sink.
    pub fn with_diagnostics<S: DiagnosticsSink>(self, diagnostics: S) -> SabrStreamParser<R, S> {
        SabrStreamParser {
            decoder: self.decoder,
            processor: self.processor,
            diagnostics,
            status: self.status,
        }
    }

    /// Pull the next result.
    ///
    /// Returns `Ok(None)` once the byte source is exhausted. Any error aborts
    /// the parser; later calls return [`StreamError::Aborted`].
    pub fn parse(&mut self) -> Result<Option<SabrPart>> {
        match self.status {
            ParserStatus::Running => {}
            ParserStatus::Done => return Ok(None),
            ParserStatus::Aborted => return Err(StreamError::Aborted),
        }

        match self.parse_next() {
            Ok(Some(part)) => Ok(Some(part)),
            Ok(None) => {
                debug!(
                    "SABR stream finished after {} parts ({} bytes)",
                    self.decoder.parts_decoded(),
                    self.decoder.bytes_consumed()
                );
                self.status = ParserStatus::Done;
                Ok(None)
            }
            Err(e) => {
                debug!("SABR parser aborted: {}", e);
                self.status = ParserStatus::Aborted;
                Err(e)
            }
        }
    }

    fn parse_next(&mut self) -> Result<Option<SabrPart>> {
        while let Some(part) = self.next_known_part()? {
            match self.processor.process(&part)? {
                PartOutcome::Emit(result) => {
                    trace!("Emitting {} result", result.kind());
                    return Ok(Some(result));
                }
                PartOutcome::Consumed => {}
                PartOutcome::Mismatch(mismatch) => self.resync(mismatch)?,
            }
        }
        Ok(None)
    }

    /// Next part with a known identifier; unknown ones are reported and skipped.
    fn next_known_part(&mut self) -> Result<Option<Part>> {
        while let Some(part) = self.decoder.decode()? {
            match part.classify() {
                Classified::Known(part) => return Ok(Some(part)),
                Classified::Unknown(part) => {
                    self.diagnostics.unknown_part(part.part_id, part.payload.len())
                }
            }
        }
        Ok(None)
    }

    fn resync(&mut self, mismatch: SegmentMismatch) -> Result<()> {
        let correction = apply_resync(self.processor.state_mut(), mismatch)?;
        self.diagnostics.resync_applied(&correction);
        Ok(())
    }

    pub fn session_state(&self) -> &SessionState {
        self.processor.state()
    }

    pub fn resync_stats(&self) -> ResyncStats {
        self.processor.state().resync_stats()
    }

    pub fn status(&self) -> ParserStatus {
        self.status
    }

    pub fn processor(&self) -> &SabrProcessor {
        &self.processor
    }

    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    /// Give the byte source back to its owner.
    pub fn into_inner(self) -> R {
        self.decoder.into_inner()
    }
}

impl<R: Read, D: DiagnosticsSink> Iterator for SabrStreamParser<R, D> {
    type Item = Result<SabrPart>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.status {
            ParserStatus::Aborted => None,
            _ => self.parse().transpose(),
        }
    }
}

impl<R, D> std::fmt::Debug for SabrStreamParser<R, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SabrStreamParser")
            .field("status", &self.status)
            .field("state", self.processor.state())
            .finish_non_exhaustive()
    }
}
