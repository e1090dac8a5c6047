//! Recursive `Structure` encode/decode helpers built on top of the primitive types in
//! [`crate::ttlv`].
//!
//! A `Structure`'s length is only known after its children have been written, so encoding writes
//! a placeholder length, recurses into the children, then patches the real length back in.
//! Decoding a `Structure` is the mirror image: read the length up front, slice exactly that many
//! bytes off of the cursor, and decode the children from that bounded sub-slice so that trailing
//! garbage or missing terminators can never make a child read past the end of its parent.
use std::io::{Cursor, Write};

use crate::ttlv::{Error, Result, SerializableTtlvType, TtlvLength, TtlvTag, TtlvType};

/// The decode-side cursor type used throughout the message model. A plain, boundary-checked
/// slice cursor: every `Structure` hands its children a sub-cursor scoped exactly to that
/// structure's declared length, so "ran past the end of this structure" and "ran past the end of
/// the whole message" are both just `UnexpectedEof` from [`std::io::Read::read_exact`].
pub type Decoder<'a> = Cursor<&'a [u8]>;

/// Number of bytes remaining in this cursor before it is exhausted.
pub fn remaining(cursor: &Decoder<'_>) -> usize {
    cursor.get_ref().len() - cursor.position() as usize
}

/// Reads the tag and type of the next item without consuming them. Returns `None` if the cursor
/// is exhausted (the normal way a caller discovers the end of a `Structure`'s children, since
/// `Structure` bodies carry no terminator).
pub fn peek_tag_type(cursor: &mut Decoder<'_>) -> Result<Option<(TtlvTag, TtlvType)>> {
    if remaining(cursor) == 0 {
        return Ok(None);
    }
    let saved = cursor.position();
    let tag = TtlvTag::read(cursor)?;
    let ty = TtlvType::read(cursor)?;
    cursor.set_position(saved);
    Ok(Some((tag, ty)))
}

/// Reads tag + type, requiring an exact match, then returns a sub-cursor scoped to the
/// `Structure`'s declared value length. The parent cursor's position is advanced past the whole
/// structure (header + value) so callers don't need to track lengths themselves.
pub fn read_structure<'a>(cursor: &mut Decoder<'a>, expected_tag: TtlvTag) -> Result<Decoder<'a>> {
    let tag = TtlvTag::read(cursor)?;
    if tag != expected_tag {
        return Err(Error::UnexpectedTtlvTag {
            expected: expected_tag,
            actual: tag,
        });
    }
    let ty = TtlvType::read(cursor)?;
    if ty != TtlvType::Structure {
        return Err(Error::UnexpectedTtlvType {
            expected: TtlvType::Structure,
            actual: ty,
        });
    }
    let len = *TtlvLength::read(cursor)? as usize;
    let start = cursor.position() as usize;
    let all = *cursor.get_ref();
    if start + len > all.len() {
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
    }
    let child = Cursor::new(&all[start..start + len]);
    cursor.set_position((start + len) as u64);
    Ok(child)
}

/// Reads a primitive value, requiring the tag to match `expected_tag` exactly.
pub fn read_value<V: SerializableTtlvType>(cursor: &mut Decoder<'_>, expected_tag: TtlvTag) -> Result<V> {
    let tag = TtlvTag::read(cursor)?;
    if tag != expected_tag {
        return Err(Error::UnexpectedTtlvTag {
            expected: expected_tag,
            actual: tag,
        });
    }
    let ty = TtlvType::read(cursor)?;
    if ty != V::TTLV_TYPE {
        return Err(Error::UnexpectedTtlvType {
            expected: V::TTLV_TYPE,
            actual: ty,
        });
    }
    V::read(cursor)
}

/// Like [`read_value`] but returns `Ok(None)` instead of a tag-mismatch error when the next item
/// in the structure doesn't carry `expected_tag` (or the structure has no more children) — the
/// standard way optional fields such as `MaximumResponseSize` or `KeyCompressionType` are read.
pub fn read_optional_value<V: SerializableTtlvType>(
    cursor: &mut Decoder<'_>,
    expected_tag: TtlvTag,
) -> Result<Option<V>> {
    match peek_tag_type(cursor)? {
        Some((tag, _)) if tag == expected_tag => Ok(Some(read_value(cursor, expected_tag)?)),
        _ => Ok(None),
    }
}

/// Like [`read_structure`] but returns `Ok(None)` when the next item isn't `expected_tag`.
pub fn read_optional_structure<'a>(
    cursor: &mut Decoder<'a>,
    expected_tag: TtlvTag,
) -> Result<Option<Decoder<'a>>> {
    match peek_tag_type(cursor)? {
        Some((tag, _)) if tag == expected_tag => Ok(Some(read_structure(cursor, expected_tag)?)),
        _ => Ok(None),
    }
}

/// Skips over one complete item (header + value + padding), whatever its type. Used to tolerate
/// vendor-specific or newer-spec fields this core doesn't model, rather than treating every
/// unrecognized tag as a hard decode error.
pub fn skip_value(cursor: &mut Decoder<'_>) -> Result<()> {
    use std::io::Read;

    let _tag = TtlvTag::read(cursor)?;
    let ty = TtlvType::read(cursor)?;
    let len = *TtlvLength::read(cursor)?;
    match ty {
        TtlvType::Structure => {
            let mut buf = vec![0u8; len as usize];
            cursor.read_exact(&mut buf)?;
        }
        _ => {
            let padded = len + <crate::ttlv::TtlvTextString as SerializableTtlvType>::calc_pad_bytes(len);
            let mut buf = vec![0u8; padded as usize];
            cursor.read_exact(&mut buf)?;
        }
    }
    Ok(())
}

/// Writes tag + type + a placeholder length, runs `body` to write the children, then patches the
/// length with the number of bytes `body` actually wrote.
pub fn write_structure<W, F>(dst: &mut W, tag: TtlvTag, body: F) -> Result<()>
where
    W: Write + PatchableLength,
    F: FnOnce(&mut W) -> Result<()>,
{
    tag.write(dst)?;
    TtlvType::Structure.write(dst)?;
    let length_offset = dst.position();
    dst.write_all(&[0u8; 4])?;
    let value_start = dst.position();
    body(dst)?;
    let value_len = (dst.position() - value_start) as u32;
    dst.patch_length(length_offset, value_len);
    Ok(())
}

/// Writes a primitive value preceded by its tag.
pub fn write_value<W: Write, V: SerializableTtlvType>(dst: &mut W, tag: TtlvTag, value: &V) -> Result<()> {
    tag.write(dst)?;
    value.write(dst)
}

/// An encode destination that can report how many bytes have been written so far and patch a
/// previously-written length field in place. Implemented by [`crate::ttlv::buffer::EncodeBuffer`].
pub trait PatchableLength {
    fn position(&self) -> usize;
    fn patch_length(&mut self, offset: usize, value: u32);
}

impl PatchableLength for crate::ttlv::buffer::EncodeBuffer {
    fn position(&self) -> usize {
        crate::ttlv::buffer::EncodeBuffer::position(self)
    }

    fn patch_length(&mut self, offset: usize, value: u32) {
        crate::ttlv::buffer::EncodeBuffer::patch_length(self, offset, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags;
    use crate::ttlv::buffer::EncodeBuffer;
    use crate::ttlv::TtlvInteger;

    #[test]
    fn structure_round_trips_with_children() {
        let mut buf = EncodeBuffer::with_capacity(1024);
        write_structure(&mut buf, tags::BATCH_COUNT, |buf| {
            write_value(buf, tags::CRYPTOGRAPHIC_LENGTH, &TtlvInteger(256))
        })
        .unwrap();

        let bytes = buf.into_vec();
        let mut cursor = Decoder::new(&bytes);
        let mut body = read_structure(&mut cursor, tags::BATCH_COUNT).unwrap();
        let len: TtlvInteger = read_value(&mut body, tags::CRYPTOGRAPHIC_LENGTH).unwrap();
        assert_eq!(*len, 256);
        assert_eq!(remaining(&body), 0);
        assert_eq!(remaining(&cursor), 0);
    }

    #[test]
    fn optional_value_absent_returns_none() {
        let mut buf = EncodeBuffer::with_capacity(1024);
        write_value(&mut buf, tags::CRYPTOGRAPHIC_LENGTH, &TtlvInteger(256)).unwrap();
        let bytes = buf.into_vec();
        let mut cursor = Decoder::new(&bytes);
        let missing: Option<TtlvInteger> =
            read_optional_value(&mut cursor, tags::OBJECT_GROUP_MEMBER).unwrap();
        assert!(missing.is_none());
        let present: Option<TtlvInteger> =
            read_optional_value(&mut cursor, tags::CRYPTOGRAPHIC_LENGTH).unwrap();
        assert_eq!(*present.unwrap(), 256);
    }
}
