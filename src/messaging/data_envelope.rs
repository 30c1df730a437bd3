// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! The round data envelope (spec.md §6): inside `SM::Data`, a round's
//! per-peer message payload is a concatenation of `(u32 length, u32
//! channel_tag, length bytes of payload)` records. `channel_tag == 0` is
//! tunneled cleartext, `channel_tag == 1` is the entry-tunnel IP channel.
//! Unrecognized tags are preserved (skipped over, not dropped) for
//! forward compatibility.

use crate::error::{Error, Result};

/// Well-known channel tags; anything else round-trips as
/// [`Channel::Other`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    /// Tunneled cleartext application data.
    Cleartext,
    /// The entry-tunnel IP channel (spec.md §6).
    EntryTunnel,
    /// An unrecognized tag, preserved verbatim for forward compatibility.
    Other(u32),
}

impl Channel {
    fn tag(self) -> u32 {
        match self {
            Channel::Cleartext => 0,
            Channel::EntryTunnel => 1,
            Channel::Other(tag) => tag,
        }
    }

    fn from_tag(tag: u32) -> Self {
        match tag {
            0 => Channel::Cleartext,
            1 => Channel::EntryTunnel,
            other => Channel::Other(other),
        }
    }
}

/// One decoded record of the envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub channel: Channel,
    pub payload: Vec<u8>,
}

/// Appends one `(length, channel_tag, payload)` record to `out`.
pub fn encode_record(out: &mut Vec<u8>, channel: Channel, payload: &[u8]) {
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(&channel.tag().to_be_bytes());
    out.extend_from_slice(payload);
}

/// Encodes a full envelope from a sequence of (channel, payload) records.
pub fn encode(records: &[(Channel, &[u8])]) -> Vec<u8> {
    let mut out = Vec::new();
    for (channel, payload) in records {
        encode_record(&mut out, *channel, payload);
    }
    out
}

/// Decodes a full envelope, in order. Rejects a buffer that ends in the
/// middle of a header or a payload shorter than its declared length.
pub fn decode(bytes: &[u8]) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    let mut cursor = 0usize;
    while cursor < bytes.len() {
        let header = bytes.get(cursor..cursor + 8).ok_or_else(|| {
            Error::Serialisation("truncated data envelope header".to_string())
        })?;
        let length = u32::from_be_bytes(header[0..4].try_into().unwrap()) as usize;
        let tag = u32::from_be_bytes(header[4..8].try_into().unwrap());
        cursor += 8;
        let payload = bytes.get(cursor..cursor + length).ok_or_else(|| {
            Error::Serialisation("truncated data envelope payload".to_string())
        })?;
        records.push(Record {
            channel: Channel::from_tag(tag),
            payload: payload.to_vec(),
        });
        cursor += length;
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_single_cleartext_record() {
        let bytes = encode(&[(Channel::Cleartext, b"hello")]);
        let records = decode(&bytes).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].channel, Channel::Cleartext);
        assert_eq!(records[0].payload, b"hello");
    }

    #[test]
    fn round_trips_multiple_mixed_channels() {
        let bytes = encode(&[
            (Channel::Cleartext, b"a"),
            (Channel::EntryTunnel, b"bb"),
        ]);
        let records = decode(&bytes).unwrap();
        assert_eq!(records[0].channel, Channel::Cleartext);
        assert_eq!(records[1].channel, Channel::EntryTunnel);
        assert_eq!(records[1].payload, b"bb");
    }

    #[test]
    fn unknown_tags_survive_a_decode_encode_round_trip() {
        let bytes = encode(&[(Channel::Other(42), b"future")]);
        let records = decode(&bytes).unwrap();
        assert_eq!(records[0].channel, Channel::Other(42));
    }

    #[test]
    fn truncated_header_is_rejected() {
        assert!(decode(&[0, 0, 0, 1]).is_err());
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let mut bytes = encode(&[(Channel::Cleartext, b"hello")]);
        bytes.truncate(bytes.len() - 1);
        assert!(decode(&bytes).is_err());
    }
}
