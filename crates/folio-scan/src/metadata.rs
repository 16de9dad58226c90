//! Per-file metadata extraction: classification, streaming hash, enrichment.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::SystemTime;

use blake3::Hasher;

use folio_core::{
    ContentHash, Enrichment, FileCategory, FileRecord, IssueKind, Language, Profile, ScanIssue,
};

use crate::language::sniff_language;
use crate::prior::PriorIndex;

/// Chunk size for streaming reads. Bounds memory regardless of file size.
const CHUNK_SIZE: usize = 64 * 1024;

/// Bytes kept from the start of a file for content sniffing.
const SNIFF_HEAD: usize = 512;

/// Outcome of extracting one file.
#[derive(Debug)]
pub struct Extraction {
    /// The produced record. Always present, even for excluded or errored
    /// files.
    pub record: FileRecord,
    /// Non-fatal issue to accumulate, if any.
    pub issue: Option<ScanIssue>,
    /// True when content fields were reused from a prior scan.
    pub reused: bool,
}

/// Extract a `FileRecord` for one file.
///
/// Applies, in order: the extension filter, the size ceiling, prior-scan
/// reuse, then a single streaming read that hashes and enriches. Read
/// failures produce a metadata-only record flagged `errored` plus an issue;
/// enrichment failures degrade single fields and never fail the record.
pub fn extract_record(
    abs: &Path,
    rel: &Path,
    size: u64,
    modified: SystemTime,
    created: Option<SystemTime>,
    profile: &Profile,
    prior: Option<&PriorIndex>,
) -> Extraction {
    let ext = extension_of(rel);
    let category = FileCategory::from_extension(&ext);
    let mut record = FileRecord::new(rel, category, size, modified, created);

    if !profile.allows_extension(&ext) {
        record.excluded = true;
        return Extraction {
            record,
            issue: None,
            reused: false,
        };
    }

    if size > profile.max_file_size {
        record.excluded = true;
        return Extraction {
            record,
            issue: Some(ScanIssue::oversized(rel, size, profile.max_file_size)),
            reused: false,
        };
    }

    // Unchanged (size, mtime) reuses the prior hash without re-reading.
    if let Some(entry) = prior.and_then(|p| p.lookup(rel, size, modified)) {
        record.hash = Some(entry.hash);
        record.language = entry.language;
        record.enrichment = entry.enrichment;
        return Extraction {
            record,
            issue: None,
            reused: true,
        };
    }

    let count_words = matches!(category, FileCategory::Document | FileCategory::Code);
    match stream_file(abs, count_words) {
        Ok(stream) => {
            record.hash = Some(stream.hash);
            if count_words {
                record.enrichment.word_count = Some(stream.words);
            }
            record.language = Language::from_extension(&ext)
                .or_else(|| sniff_language(&stream.head));
            if category == FileCategory::Image {
                // Header-only read; a parse failure leaves the field unknown.
                record.enrichment.dimensions = image::image_dimensions(abs).ok();
            }
            if matches!(category, FileCategory::Audio | FileCategory::Video) {
                record.enrichment.duration_secs = probe_duration(&stream.head);
            }
            Extraction {
                record,
                issue: None,
                reused: false,
            }
        }
        Err(err) => {
            record.errored = true;
            Extraction {
                issue: Some(ScanIssue::read_error(rel, &err)),
                record,
                reused: false,
            }
        }
    }
}

/// Lowercased extension of a path, empty when absent.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

struct StreamStats {
    hash: ContentHash,
    words: u64,
    head: Vec<u8>,
}

/// Single bounded-memory pass: BLAKE3 hash, optional word count, and a
/// sniffing head.
fn stream_file(path: &Path, count_words: bool) -> std::io::Result<StreamStats> {
    let mut file = File::open(path)?;
    let mut hasher = Hasher::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut head = Vec::with_capacity(SNIFF_HEAD);
    let mut words: u64 = 0;
    let mut in_word = false;

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        let chunk = &buffer[..bytes_read];
        hasher.update(chunk);

        if head.len() < SNIFF_HEAD {
            let take = (SNIFF_HEAD - head.len()).min(chunk.len());
            head.extend_from_slice(&chunk[..take]);
        }

        if count_words {
            for &byte in chunk {
                if byte.is_ascii_whitespace() {
                    in_word = false;
                } else if !in_word {
                    in_word = true;
                    words += 1;
                }
            }
        }
    }

    Ok(StreamStats {
        hash: ContentHash::new(*hasher.finalize().as_bytes()),
        words,
        head,
    })
}

/// Playback duration from container headers, for what fits in the sniffing
/// head. Unrecognized or truncated headers degrade to `None`.
fn probe_duration(head: &[u8]) -> Option<f64> {
    probe_wav(head).or_else(|| probe_mp4(head))
}

/// RIFF/WAVE: duration is data chunk size over the fmt chunk's byte rate.
fn probe_wav(head: &[u8]) -> Option<f64> {
    if head.len() < 12 || &head[0..4] != b"RIFF" || &head[8..12] != b"WAVE" {
        return None;
    }
    let mut byte_rate: Option<u32> = None;
    let mut data_size: Option<u32> = None;
    let mut offset = 12;
    while offset + 8 <= head.len() {
        let id = &head[offset..offset + 4];
        let size = u32::from_le_bytes(head[offset + 4..offset + 8].try_into().ok()?);
        if id == b"fmt " && offset + 20 <= head.len() {
            byte_rate = Some(u32::from_le_bytes(
                head[offset + 16..offset + 20].try_into().ok()?,
            ));
        } else if id == b"data" {
            data_size = Some(size);
        }
        // Chunks are word-aligned.
        offset += 8 + size as usize + (size as usize & 1);
    }
    let rate = byte_rate?;
    if rate == 0 {
        return None;
    }
    Some(data_size? as f64 / rate as f64)
}

/// ISO BMFF (mp4/m4a/mov): movie header duration over its timescale. Files
/// with the moov box at the end fall outside the head and stay unknown.
fn probe_mp4(head: &[u8]) -> Option<f64> {
    if head.len() < 12 || &head[4..8] != b"ftyp" {
        return None;
    }
    let pos = head.windows(4).position(|w| w == b"mvhd")?;
    let body = &head[pos + 4..];
    let version = *body.first()?;
    let (timescale, duration) = if version == 0 {
        if body.len() < 20 {
            return None;
        }
        (
            u32::from_be_bytes(body[12..16].try_into().ok()?),
            u32::from_be_bytes(body[16..20].try_into().ok()?) as u64,
        )
    } else {
        if body.len() < 32 {
            return None;
        }
        (
            u32::from_be_bytes(body[20..24].try_into().ok()?),
            u64::from_be_bytes(body[24..32].try_into().ok()?),
        )
    };
    if timescale == 0 {
        return None;
    }
    Some(duration as f64 / timescale as f64)
}
