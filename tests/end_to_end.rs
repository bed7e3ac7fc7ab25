//! End-to-end tests against the public API only
//!
//! Streams are framed with `UmpPart::encode` and payloads encoded with prost,
//! the same way a server response would arrive.

use anyhow::{Result, bail, ensure};
use bytes::{Bytes, BytesMut};
use prost::Message;
use sabr_stream::proto;
use sabr_stream::ump::encode_varint;
use sabr_stream::{
    FormatKey, ParserConfig, ParserStatus, PartKind, ProtectionStatus, RecordingDiagnostics,
    SabrPart, SabrStreamParser, SessionState, StreamError, UmpPart,
};

fn frame(parts: &[UmpPart]) -> Bytes {
    let mut buf = BytesMut::new();
    for part in parts {
        part.encode(&mut buf);
    }
    buf.freeze()
}

fn message(kind: PartKind, msg: &impl Message) -> UmpPart {
    UmpPart::new(kind.id(), msg.encode_to_vec())
}

fn media(kind: PartKind, header_id: u32, data: &[u8]) -> UmpPart {
    let mut payload = BytesMut::new();
    encode_varint(header_id, &mut payload);
    payload.extend_from_slice(data);
    UmpPart::new(kind.id(), payload.freeze())
}

fn header(header_id: u32, sequence_number: i64) -> proto::MediaHeader {
    proto::MediaHeader {
        header_id: Some(header_id),
        video_id: Some("jfKfPfyJRdk".into()),
        format_id: Some(proto::FormatId {
            itag: Some(299),
            last_modified: Some(1_747_754_870_573_293),
            xtags: None,
        }),
        sequence_number: Some(sequence_number),
        duration_ms: Some(5_000),
        ..Default::default()
    }
}

#[test]
fn live_response_with_drift_and_extensions() -> Result<()> {
    let format = FormatKey::new(299, 1_747_754_870_573_293);
    let bytes = frame(&[
        message(
            PartKind::StreamProtectionStatus,
            &proto::StreamProtectionStatus { status: Some(1), max_retries: None },
        ),
        message(
            PartKind::FormatInitializationMetadata,
            &proto::FormatInitializationMetadata {
                video_id: Some("jfKfPfyJRdk".into()),
                format_id: header(0, 0).format_id,
                mime_type: Some("video/mp4; codecs=\"avc1.64002a\"".into()),
                ..Default::default()
            },
        ),
        // Not interpreted by this crate.
        UmpPart::new(66, vec![0x01, 0x02]),
        message(PartKind::MediaHeader, &header(7, 4_001)),
        media(PartKind::Media, 7, b"moof"),
        media(PartKind::MediaEnd, 7, b""),
        // One behind: absorbed by moving the player time forward.
        message(PartKind::MediaHeader, &header(8, 4_001)),
        media(PartKind::Media, 8, b"stale"),
        media(PartKind::MediaEnd, 8, b""),
        message(PartKind::MediaHeader, &header(9, 4_002)),
        UmpPart::new(67, Vec::new()),
        message(
            PartKind::NextRequestPolicy,
            &proto::NextRequestPolicy { backoff_time_ms: Some(1_000), ..Default::default() },
        ),
    ]);

    let config = ParserConfig::new(SessionState::live(20_000_000, 250));
    let mut parser = SabrStreamParser::from_bytes(bytes, config)?
        .with_diagnostics(RecordingDiagnostics::default());

    let mut results = Vec::new();
    while let Some(part) = parser.parse()? {
        results.push(part);
    }

    let kinds: Vec<PartKind> = results.iter().map(SabrPart::kind).collect();
    ensure!(
        kinds
            == vec![
                PartKind::StreamProtectionStatus,
                PartKind::FormatInitializationMetadata,
                PartKind::MediaHeader,
                PartKind::Media,
                PartKind::MediaEnd,
                PartKind::MediaHeader,
                PartKind::NextRequestPolicy,
            ],
        "unexpected results {:?}",
        kinds
    );

    match &results[0] {
        SabrPart::StreamProtectionStatus(s) => ensure!(s.status == ProtectionStatus::Ok),
        other => bail!("unexpected {:?}", other),
    }
    match &results[5] {
        SabrPart::MediaHeader(h) => {
            ensure!(h.header_id == 9 && h.sequence_number == Some(4_002));
            ensure!(h.format == format);
        }
        other => bail!("unexpected {:?}", other),
    }

    ensure!(parser.status() == ParserStatus::Done);
    ensure!(parser.session_state().player_time_ms == 20_000_250);
    ensure!(parser.resync_stats().forward == 1);
    ensure!(parser.diagnostics().skipped.len() == 2);
    ensure!(parser.diagnostics().corrections.len() == 1);

    let tracked = parser.processor().format(&format).expect("format registered");
    ensure!(tracked.last_sequence_number == Some(4_002));
    ensure!(tracked.mime_type.as_deref() == Some("video/mp4; codecs=\"avc1.64002a\""));
    Ok(())
}

#[test]
fn on_demand_desync_is_reported_to_the_caller() -> Result<()> {
    let bytes = frame(&[
        message(PartKind::MediaHeader, &header(1, 10)),
        message(PartKind::MediaHeader, &header(2, 9)),
    ]);
    let mut parser = SabrStreamParser::from_bytes(bytes, ParserConfig::default())?;

    ensure!(matches!(parser.parse()?, Some(SabrPart::MediaHeader(_))));
    match parser.parse() {
        Err(StreamError::SegmentMismatch(mismatch)) => {
            ensure!(mismatch.expected == 11 && mismatch.received == 9);
            ensure!(mismatch.format.as_deref() == Some("299;1747754870573293;"));
        }
        other => bail!("expected mismatch, got {:?}", other),
    }
    ensure!(parser.status() == ParserStatus::Aborted);
    Ok(())
}

#[test]
fn config_file_drives_parser() -> Result<()> {
    let path = std::env::temp_dir().join(format!("sabr-stream-config-{}.yaml", std::process::id()));
    std::fs::write(
        &path,
        "initial_state:\n  player_time_ms: 300\n  is_live: true\n  live_segment_target_duration_tolerance_ms: 500\n",
    )?;
    let config = ParserConfig::from_yaml_file(&path);
    std::fs::remove_file(&path)?;
    let config = config?;

    let bytes = frame(&[
        message(PartKind::MediaHeader, &header(1, 50)),
        message(PartKind::MediaHeader, &header(2, 53)),
    ]);
    let mut parser = SabrStreamParser::from_bytes(bytes, config)?;
    while parser.parse()?.is_some() {}

    ensure!(parser.session_state().player_time_ms == 0);
    ensure!(parser.resync_stats().backtrack == 1);
    Ok(())
}
