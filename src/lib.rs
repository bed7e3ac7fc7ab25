//! Pull-based decoder for SABR parts carried in UMP envelopes.
//!
//! sabr-stream turns a SABR response body into a sequence of typed results,
//! one per call, while keeping the live playback position in sync with the
//! segments the server actually delivers.
//!
//! # Features
//!
//! - **UMP Decoding**: Forward-only framing over any [`std::io::Read`] source
//! - **Typed Results**: One [`SabrPart`] variant per recognized part kind
//! - **Live Resync**: Bounded player-time correction for near-edge segment drift
//! - **Diagnostics**: Unknown parts and applied corrections reported to a pluggable sink
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sabr_stream::{ParserConfig, SabrPart, SabrStreamParser, SessionState};
//!
//! fn main() -> sabr_stream::Result<()> {
//!     let config = ParserConfig::new(SessionState::live(10_000, 500));
//!     let mut parser = SabrStreamParser::open("response.ump", config)?;
//!
//!     while let Some(part) = parser.parse()? {
//!         match part {
//!             SabrPart::MediaHeader(header) => {
//!                 println!("segment {:?} for {}", header.sequence_number, header.format)
//!             }
//!             SabrPart::Media(chunk) => println!("{} bytes", chunk.data.len()),
//!             SabrPart::Redirect(redirect) => println!("redirect to {}", redirect.url),
//!             other => println!("{:?}", other.kind()),
//!         }
//!     }
//!
//!     println!("player time now {} ms", parser.session_state().player_time_ms);
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod config;
pub mod diagnostics;
mod error;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Decoding pipeline
pub mod parser;
pub mod processor;
pub mod proto;
pub mod ump;

// Core exports
pub use config::ParserConfig;
pub use diagnostics::{DiagnosticsSink, RecordingDiagnostics, TracingDiagnostics};
pub use error::*;
pub use types::*;

// Main API exports
pub use parser::{ParserStatus, SabrStreamParser};
pub use processor::{PartOutcome, SabrProcessor};
pub use ump::{UmpDecoder, UmpPart};
