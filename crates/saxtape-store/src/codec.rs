//! Binary externalization of a [`Tape`].
//!
//! The blob is a fixed field order: a 4-byte magic, a version word, the
//! tape's options, flags, columns, and marks, then a CRC32 trailer over
//! everything before it. Each column is written as its exact length followed
//! by its contents, and rebuilt at exactly that length on read. The format
//! is internal and versioned only by this module; nothing outside this
//! repository is expected to parse it.

use std::sync::Arc;

use tracing::debug;

use crate::column::Column;
use crate::config::TapeOptions;
use crate::error::{TapeError, TapeResult};
use crate::mark::{next_stamp, Cursors, Mark};
use crate::tape::Tape;

const MAGIC: &[u8; 4] = b"SXTP";
const VERSION: u32 = 1;

pub(crate) fn encode(tape: &Tape) -> Vec<u8> {
    let mut out = Vec::with_capacity(tape.approximate_size() as usize + 64);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&VERSION.to_be_bytes());

    write_u64(&mut out, tape.options.initial_events as u64);
    out.push(tape.options.record_location as u8);
    out.push(tape.has_location as u8);
    write_opt_str(&mut out, tape.public_id.as_deref());
    write_u64(&mut out, tape.attribute_total);

    write_u64(&mut out, tape.events.len() as u64);
    out.extend_from_slice(tape.events.as_slice());

    write_u64(&mut out, tape.text.len() as u64);
    out.extend_from_slice(tape.text.as_slice());

    write_i32_column(&mut out, &tape.scalars);
    write_i32_column(&mut out, &tape.lines);

    write_u64(&mut out, tape.system_ids.len() as u64);
    for entry in tape.system_ids.iter() {
        write_opt_str(&mut out, entry.as_deref());
    }

    write_i32_column(&mut out, &tape.attribute_counts);

    write_u64(&mut out, tape.strings.len() as u64);
    for string in tape.strings.iter() {
        write_str(&mut out, string);
    }

    write_u64(&mut out, tape.marks.len() as u64);
    for mark in &tape.marks {
        write_opt_str(&mut out, mark.id());
        for cursor in cursor_fields(mark.cursors) {
            write_u64(&mut out, cursor as u64);
        }
    }

    let checksum = crc32fast::hash(&out);
    out.extend_from_slice(&checksum.to_be_bytes());
    debug!(bytes = out.len(), events = tape.len(), "tape encoded");
    out
}

pub(crate) fn decode(data: &[u8]) -> TapeResult<Tape> {
    // Magic, version, at least one u64 field, and the CRC trailer.
    if data.len() < 16 {
        return Err(TapeError::Corrupt {
            offset: data.len(),
            reason: "blob too short for a tape header".into(),
        });
    }
    if &data[0..4] != MAGIC {
        return Err(TapeError::InvalidMagic {
            expected: String::from_utf8_lossy(MAGIC).into_owned(),
            actual: String::from_utf8_lossy(&data[0..4]).into_owned(),
        });
    }
    let version = u32::from_be_bytes(data[4..8].try_into().unwrap());
    if version != VERSION {
        return Err(TapeError::UnsupportedVersion(version));
    }

    let body_end = data.len() - 4;
    let stored = u32::from_be_bytes(data[body_end..].try_into().unwrap());
    let computed = crc32fast::hash(&data[..body_end]);
    if stored != computed {
        return Err(TapeError::ChecksumMismatch { stored, computed });
    }

    let mut reader = Reader {
        data: &data[..body_end],
        pos: 8,
    };

    let initial_events = reader.read_u64()? as usize;
    let record_location = reader.read_bool()?;
    let has_location = reader.read_bool()?;
    let public_id = reader.read_opt_string()?;
    let attribute_total = reader.read_u64()?;

    let events = Column::from_vec(reader.read_bytes_column()?);
    let text = Column::from_vec(reader.read_bytes_column()?);
    let scalars = Column::from_vec(reader.read_i32_column()?);
    let lines = Column::from_vec(reader.read_i32_column()?);

    let system_id_count = reader.read_u64()? as usize;
    let mut system_ids: Vec<Option<Arc<str>>> = Vec::with_capacity(system_id_count);
    for _ in 0..system_id_count {
        let entry: Option<Arc<str>> = match reader.read_opt_string()? {
            Some(value) => {
                // Re-share adjacent equal entries, as recording did.
                match system_ids.last() {
                    Some(Some(previous)) if **previous == value => Some(previous.clone()),
                    _ => Some(Arc::from(value.as_str())),
                }
            }
            None => None,
        };
        system_ids.push(entry);
    }

    let attribute_counts = Column::from_vec(reader.read_i32_column()?);

    let string_count = reader.read_u64()? as usize;
    let mut strings = Vec::with_capacity(string_count);
    for _ in 0..string_count {
        strings.push(reader.read_string()?);
    }

    // Marks carry the new tape's stamp: they stay usable on the decoded
    // copy but never travel back to the instance that was encoded.
    let stamp = next_stamp();
    let mark_count = reader.read_u64()? as usize;
    let mut marks = Vec::with_capacity(mark_count);
    for _ in 0..mark_count {
        let id = reader.read_opt_string()?;
        let mut fields = [0usize; 7];
        for field in &mut fields {
            *field = reader.read_u64()? as usize;
        }
        marks.push(Mark::new(id, stamp, cursors_from_fields(fields)));
    }

    if reader.pos != reader.data.len() {
        return Err(TapeError::Corrupt {
            offset: reader.pos,
            reason: format!("{} trailing bytes after tape body", reader.data.len() - reader.pos),
        });
    }

    debug!(events = events.len(), marks = marks.len(), "tape decoded");
    Ok(Tape {
        options: TapeOptions {
            initial_events,
            record_location,
        },
        stamp,
        events,
        text,
        scalars,
        lines,
        system_ids: Column::from_vec(system_ids),
        attribute_counts,
        strings: Column::from_vec(strings),
        attribute_total,
        has_location,
        public_id,
        marks,
        pending: None,
    })
}

fn cursor_fields(cursors: Cursors) -> [usize; 7] {
    [
        cursors.event,
        cursors.text,
        cursors.scalar,
        cursors.line,
        cursors.system_id,
        cursors.attribute_count,
        cursors.string,
    ]
}

fn cursors_from_fields(fields: [usize; 7]) -> Cursors {
    Cursors {
        event: fields[0],
        text: fields[1],
        scalar: fields[2],
        line: fields[3],
        system_id: fields[4],
        attribute_count: fields[5],
        string: fields[6],
    }
}

fn write_u64(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn write_str(out: &mut Vec<u8>, value: &str) {
    write_u64(out, value.len() as u64);
    out.extend_from_slice(value.as_bytes());
}

fn write_opt_str(out: &mut Vec<u8>, value: Option<&str>) {
    match value {
        Some(value) => {
            out.push(1);
            write_str(out, value);
        }
        None => out.push(0),
    }
}

fn write_i32_column(out: &mut Vec<u8>, column: &Column<i32>) {
    write_u64(out, column.len() as u64);
    for value in column.iter() {
        out.extend_from_slice(&value.to_be_bytes());
    }
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, count: usize) -> TapeResult<&'a [u8]> {
        let end = self.pos.checked_add(count).ok_or(TapeError::Corrupt {
            offset: self.pos,
            reason: "field length overflow".into(),
        })?;
        let bytes = self.data.get(self.pos..end).ok_or(TapeError::Corrupt {
            offset: self.pos,
            reason: "unexpected end of tape blob".into(),
        })?;
        self.pos = end;
        Ok(bytes)
    }

    fn read_u64(&mut self) -> TapeResult<u64> {
        Ok(u64::from_be_bytes(self.take(8)?.try_into().unwrap()))
    }

    fn read_bool(&mut self) -> TapeResult<bool> {
        let offset = self.pos;
        match self.take(1)?[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(TapeError::Corrupt {
                offset,
                reason: format!("invalid flag byte {other:#04x}"),
            }),
        }
    }

    fn read_string(&mut self) -> TapeResult<String> {
        let length = self.read_u64()? as usize;
        let offset = self.pos;
        let bytes = self.take(length)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| TapeError::Corrupt {
            offset,
            reason: "string is not valid UTF-8".into(),
        })
    }

    fn read_opt_string(&mut self) -> TapeResult<Option<String>> {
        if self.read_bool()? {
            Ok(Some(self.read_string()?))
        } else {
            Ok(None)
        }
    }

    fn read_bytes_column(&mut self) -> TapeResult<Vec<u8>> {
        let length = self.read_u64()? as usize;
        Ok(self.take(length)?.to_vec())
    }

    fn read_i32_column(&mut self) -> TapeResult<Vec<i32>> {
        let count = self.read_u64()? as usize;
        let bytes = self.take(count.checked_mul(4).ok_or(TapeError::Corrupt {
            offset: self.pos,
            reason: "column length overflow".into(),
        })?)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|chunk| i32::from_be_bytes(chunk.try_into().unwrap()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saxtape_types::{Attribute, Attributes, Name, SourceLocation, XmlReceiver};

    fn sample_tape() -> Tape {
        let mut tape = Tape::new();
        tape.document_locator(Some("PUBLIC")).unwrap();
        tape.location(&SourceLocation::new(1, 1, Some(Arc::from("doc.xml"))))
            .unwrap();
        tape.start_document().unwrap();
        let mut attrs = Attributes::new();
        attrs.push(Attribute::cdata("", "id", "id", "r1"));
        tape.start_element(Name::local("root"), &attrs).unwrap();
        tape.mark(Some("inside"));
        tape.characters("hello").unwrap();
        tape.end_element(Name::local("root")).unwrap();
        tape.end_document().unwrap();
        tape
    }

    #[test]
    fn roundtrip_preserves_every_column() {
        let tape = sample_tape();
        let decoded = decode(&encode(&tape)).unwrap();

        assert_eq!(decoded.events.as_slice(), tape.events.as_slice());
        assert_eq!(decoded.text.as_slice(), tape.text.as_slice());
        assert_eq!(decoded.scalars.as_slice(), tape.scalars.as_slice());
        assert_eq!(decoded.lines.as_slice(), tape.lines.as_slice());
        assert_eq!(decoded.strings.as_slice(), tape.strings.as_slice());
        assert_eq!(
            decoded.attribute_counts.as_slice(),
            tape.attribute_counts.as_slice()
        );
        assert_eq!(decoded.attribute_total, tape.attribute_total);
        assert_eq!(decoded.has_location, tape.has_location);
        assert_eq!(decoded.public_id, tape.public_id);
        assert_eq!(decoded.options, tape.options);
    }

    #[test]
    fn decoded_columns_carry_no_slack() {
        let decoded = decode(&encode(&sample_tape())).unwrap();
        assert_eq!(decoded.events.capacity(), decoded.events.len());
        assert_eq!(decoded.text.capacity(), decoded.text.len());
        assert_eq!(decoded.strings.capacity(), decoded.strings.len());
    }

    #[test]
    fn marks_survive_with_a_fresh_stamp() {
        let tape = sample_tape();
        let decoded = decode(&encode(&tape)).unwrap();

        assert_eq!(decoded.marks.len(), 1);
        let mark = &decoded.marks[0];
        assert_eq!(mark.id(), Some("inside"));
        assert_eq!(mark.event_index(), tape.marks[0].event_index());
        assert_ne!(mark.stamp, tape.stamp);
        assert_eq!(mark.stamp, decoded.stamp);
    }

    #[test]
    fn adjacent_equal_system_ids_are_reshared_on_decode() {
        let mut tape = Tape::new();
        tape.document_locator(None).unwrap();
        tape.location(&SourceLocation::new(1, 1, Some(Arc::from("a.xml"))))
            .unwrap();
        tape.start_document().unwrap();
        tape.location(&SourceLocation::new(2, 1, Some(Arc::from("a.xml"))))
            .unwrap();
        tape.characters("x").unwrap();

        let decoded = decode(&encode(&tape)).unwrap();
        let first = decoded.system_ids.get(0).unwrap().as_ref().unwrap();
        let second = decoded.system_ids.get(1).unwrap().as_ref().unwrap();
        assert!(Arc::ptr_eq(first, second));
    }

    #[test]
    fn rejects_bad_magic() {
        let mut data = encode(&sample_tape());
        data[0..4].copy_from_slice(b"NOPE");
        let err = decode(&data).unwrap_err();
        assert!(matches!(err, TapeError::InvalidMagic { .. }));
    }

    #[test]
    fn rejects_unknown_version() {
        let mut data = encode(&sample_tape());
        data[4..8].copy_from_slice(&99u32.to_be_bytes());
        let err = decode(&data).unwrap_err();
        assert!(matches!(err, TapeError::UnsupportedVersion(99)));
    }

    #[test]
    fn rejects_flipped_body_byte() {
        let mut data = encode(&sample_tape());
        let middle = data.len() / 2;
        data[middle] ^= 0xFF;
        let err = decode(&data).unwrap_err();
        assert!(matches!(err, TapeError::ChecksumMismatch { .. }));
    }

    #[test]
    fn rejects_truncation() {
        let data = encode(&sample_tape());
        let err = decode(&data[..data.len() / 2]).unwrap_err();
        // Truncation lands on the checksum first: the trailer no longer
        // matches the shortened body.
        assert!(matches!(
            err,
            TapeError::ChecksumMismatch { .. } | TapeError::Corrupt { .. }
        ));
    }

    #[test]
    fn rejects_a_blob_shorter_than_the_header() {
        let err = decode(b"SXTP").unwrap_err();
        assert!(matches!(err, TapeError::Corrupt { .. }));
    }
}
