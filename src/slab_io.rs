// Copyright 2026-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Reading and writing symbol slabs.
//!
//! Two interchangeable encodings of the same payload:
//!
//! - a human-readable JSON text format (the schema mirrors the symbol record
//!   field for field: `ID` as a hex string, `Name`, `Scope`, `SymInfo`,
//!   optional locations, `References`, `Origin`, `Flags`, strings, and
//!   `IncludeHeaders`), and
//! - a binary container recognized by its 4-byte magic prefix, framing the
//!   same JSON payload with a version byte, an explicit payload length and a
//!   CRC32 footer.
//!
//! [`read_slab`] sniffs the magic and picks the decoder. Every validation
//! failure surfaces as a [`SlabError`] with a diagnostic - a malformed input
//! never produces a partial slab, and a caller that feeds the result into an
//! engine rebuild keeps its previously published build on error.
//!
//! # Container layout
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ magic: [u8; 4] = "SDEX"                      │
//! │ version: u8 = 1                              │
//! │ payload_len: u32 LE                          │
//! ├──────────────────────────────────────────────┤
//! │ payload: [u8; payload_len]  (JSON text)      │
//! ├──────────────────────────────────────────────┤
//! │ crc32: u32 LE  (over payload)                │
//! └──────────────────────────────────────────────┘
//! ```

use crate::types::{Ref, Symbol, SymbolId, SymbolSlab};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};
use std::path::Path;

/// Magic bytes identifying the binary container.
pub const MAGIC: [u8; 4] = *b"SDEX";

/// Current container version.
pub const VERSION: u8 = 1;

const HEADER_LEN: usize = 4 + 1 + 4;
const FOOTER_LEN: usize = 4;

/// Why a slab could not be read.
#[derive(Debug)]
pub enum SlabError {
    Io(io::Error),
    /// Container shorter than its framing claims.
    Truncated {
        needed: usize,
        have: usize,
    },
    UnsupportedVersion {
        found: u8,
    },
    ChecksumMismatch {
        expected: u32,
        found: u32,
    },
    Parse(serde_json::Error),
}

impl fmt::Display for SlabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlabError::Io(err) => write!(f, "i/o error reading slab: {err}"),
            SlabError::Truncated { needed, have } => {
                write!(f, "slab container truncated: need {needed} bytes, have {have}")
            }
            SlabError::UnsupportedVersion { found } => {
                write!(f, "slab container version {found} not supported (expect {VERSION})")
            }
            SlabError::ChecksumMismatch { expected, found } => write!(
                f,
                "slab payload checksum mismatch: expected {expected:#010x}, found {found:#010x}"
            ),
            SlabError::Parse(err) => write!(f, "malformed slab payload: {err}"),
        }
    }
}

impl std::error::Error for SlabError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SlabError::Io(err) => Some(err),
            SlabError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for SlabError {
    fn from(err: io::Error) -> Self {
        SlabError::Io(err)
    }
}

impl From<serde_json::Error> for SlabError {
    fn from(err: serde_json::Error) -> Self {
        SlabError::Parse(err)
    }
}

/// Occurrences of one symbol, as the text format groups them.
#[derive(Debug, Serialize, Deserialize)]
struct RefsEntry {
    #[serde(rename = "ID")]
    id: SymbolId,
    #[serde(rename = "References", default)]
    references: Vec<Ref>,
}

/// The serialized shape of a slab.
#[derive(Debug, Serialize, Deserialize)]
struct SlabFile {
    #[serde(rename = "Symbols", default)]
    symbols: Vec<Symbol>,
    #[serde(rename = "Refs", default)]
    refs: Vec<RefsEntry>,
}

impl SlabFile {
    fn into_slab(self) -> SymbolSlab {
        let mut builder = SymbolSlab::builder();
        for sym in self.symbols {
            builder.insert(sym);
        }
        for entry in self.refs {
            for reference in entry.references {
                builder.insert_ref(entry.id, reference);
            }
        }
        builder.build()
    }

    fn from_slab(slab: &SymbolSlab) -> SlabFile {
        let mut refs: Vec<RefsEntry> = slab
            .all_refs()
            .map(|(id, references)| RefsEntry {
                id,
                references: references.to_vec(),
            })
            .collect();
        // The ref table iterates in hash order; sort so output is stable.
        refs.sort_by_key(|entry| entry.id);
        SlabFile {
            symbols: slab.symbols().to_vec(),
            refs,
        }
    }
}

/// Decode a slab from either encoding, sniffing the magic prefix.
pub fn read_slab(bytes: &[u8]) -> Result<SymbolSlab, SlabError> {
    let payload = if bytes.starts_with(&MAGIC) {
        decode_container(bytes)?
    } else {
        bytes
    };
    let file: SlabFile = serde_json::from_slice(payload)?;
    Ok(file.into_slab())
}

/// Read and decode a slab file.
pub fn read_slab_file(path: &Path) -> Result<SymbolSlab, SlabError> {
    let bytes = std::fs::read(path)?;
    read_slab(&bytes)
}

/// Validate container framing and return the payload slice.
fn decode_container(bytes: &[u8]) -> Result<&[u8], SlabError> {
    if bytes.len() < HEADER_LEN + FOOTER_LEN {
        return Err(SlabError::Truncated {
            needed: HEADER_LEN + FOOTER_LEN,
            have: bytes.len(),
        });
    }
    let version = bytes[4];
    if version != VERSION {
        return Err(SlabError::UnsupportedVersion { found: version });
    }
    let payload_len = u32::from_le_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]) as usize;
    let total = HEADER_LEN + payload_len + FOOTER_LEN;
    if bytes.len() < total {
        return Err(SlabError::Truncated {
            needed: total,
            have: bytes.len(),
        });
    }
    let payload = &bytes[HEADER_LEN..HEADER_LEN + payload_len];
    let footer = &bytes[HEADER_LEN + payload_len..total];
    let expected = u32::from_le_bytes([footer[0], footer[1], footer[2], footer[3]]);
    let found = crc32fast::hash(payload);
    if expected != found {
        return Err(SlabError::ChecksumMismatch { expected, found });
    }
    Ok(payload)
}

/// Write a slab as pretty-printed JSON text.
pub fn write_slab_json<W: Write>(writer: &mut W, slab: &SymbolSlab) -> Result<(), SlabError> {
    let file = SlabFile::from_slab(slab);
    serde_json::to_writer_pretty(&mut *writer, &file)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Write a slab as a binary container.
pub fn write_slab_binary<W: Write>(writer: &mut W, slab: &SymbolSlab) -> Result<(), SlabError> {
    let file = SlabFile::from_slab(slab);
    let payload = serde_json::to_vec(&file)?;
    writer.write_all(&MAGIC)?;
    writer.write_all(&[VERSION])?;
    writer.write_all(&(payload.len() as u32).to_le_bytes())?;
    writer.write_all(&payload)?;
    writer.write_all(&crc32fast::hash(&payload).to_le_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::make_symbol;
    use crate::types::{Position, RefKind, SymbolLocation};

    fn sample_slab() -> SymbolSlab {
        let a = make_symbol("alpha", "ns::", 12);
        let b = make_symbol("beta", "", 3);
        let id = a.id;
        let mut builder = SymbolSlab::builder();
        builder.insert(a);
        builder.insert(b);
        builder.insert_ref(
            id,
            Ref {
                location: SymbolLocation {
                    file_uri: "file:///src/a.cc".into(),
                    start: Position { line: 4, column: 2 },
                    end: Position { line: 4, column: 7 },
                },
                kind: RefKind::DEFINITION,
            },
        );
        builder.build()
    }

    #[test]
    fn test_json_round_trip() {
        let slab = sample_slab();
        let mut buffer = Vec::new();
        write_slab_json(&mut buffer, &slab).unwrap();

        let decoded = read_slab(&buffer).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded.symbols(), slab.symbols());
        let id = slab.symbols()[0].id;
        assert_eq!(decoded.refs_for(id), slab.refs_for(id));
    }

    #[test]
    fn test_binary_round_trip() {
        let slab = sample_slab();
        let mut buffer = Vec::new();
        write_slab_binary(&mut buffer, &slab).unwrap();
        assert!(buffer.starts_with(&MAGIC));

        let decoded = read_slab(&buffer).unwrap();
        assert_eq!(decoded.symbols(), slab.symbols());
    }

    #[test]
    fn test_corrupted_payload_is_rejected() {
        let mut buffer = Vec::new();
        write_slab_binary(&mut buffer, &sample_slab()).unwrap();
        // Flip one payload byte; the checksum must catch it.
        let mid = HEADER_LEN + 10;
        buffer[mid] ^= 0xff;
        match read_slab(&buffer) {
            Err(SlabError::ChecksumMismatch { .. }) => {}
            other => panic!("expected checksum mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_truncated_container_is_rejected() {
        let mut buffer = Vec::new();
        write_slab_binary(&mut buffer, &sample_slab()).unwrap();
        buffer.truncate(buffer.len() - 6);
        assert!(matches!(
            read_slab(&buffer),
            Err(SlabError::Truncated { .. })
        ));
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let mut buffer = Vec::new();
        write_slab_binary(&mut buffer, &sample_slab()).unwrap();
        buffer[4] = 99;
        assert!(matches!(
            read_slab(&buffer),
            Err(SlabError::UnsupportedVersion { found: 99 })
        ));
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let err = read_slab(b"{ \"Symbols\": [ { \"ID\": \"short\" } ] }").unwrap_err();
        assert!(matches!(err, SlabError::Parse(_)));
        let err = read_slab(b"not json at all").unwrap_err();
        assert!(matches!(err, SlabError::Parse(_)));
    }

    #[test]
    fn test_text_format_uses_the_documented_field_names() {
        let mut buffer = Vec::new();
        write_slab_json(&mut buffer, &sample_slab()).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        for field in [
            "\"Symbols\"",
            "\"ID\"",
            "\"Name\"",
            "\"Scope\"",
            "\"SymInfo\"",
            "\"Kind\"",
            "\"Lang\"",
            "\"References\"",
            "\"Refs\"",
        ] {
            assert!(text.contains(field), "missing {field} in:\n{text}");
        }
    }

    #[test]
    fn test_duplicate_ids_collapse_to_the_last_record() {
        let sym = make_symbol("dup", "", 1);
        let mut newer = sym.clone();
        newer.references = 99;
        let file = SlabFile {
            symbols: vec![sym, newer],
            refs: vec![],
        };
        let payload = serde_json::to_vec(&file).unwrap();
        let slab = read_slab(&payload).unwrap();
        assert_eq!(slab.len(), 1);
        assert_eq!(slab.symbols()[0].references, 99);
    }

    // Guard that errors stay Send + Sync for callers that ship them across
    // threads.
    #[test]
    fn test_slab_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SlabError>();
    }
}
