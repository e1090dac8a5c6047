//! Low-level (de)serialization of the eight TTLV primitive item types used by the KMIP wire
//! format: `Integer`, `LongInteger`, `BigInteger`, `Enumeration`, `Boolean`, `TextString`,
//! `ByteString`, `DateTime` and `Structure`. `Interval` is represented as [`TtlvInterval`], an
//! alias of [`TtlvEnumeration`] since both are four-byte big-endian values padded to eight bytes.
//!
//! Every item on the wire is `tag(3) + type(1) + length(4) + value + padding`, with `value`
//! padded with zero bytes to the next multiple of eight. This module knows how to read and write
//! that shape for each primitive; [`crate::codec`] builds the recursive `Structure` handling and
//! [`crate::model`] is the typed tree built on top of both.
use std::{
    convert::TryFrom,
    fmt::{Debug, Display},
    io::{Read, Write},
    ops::Deref,
    str::FromStr,
};

pub mod buffer;

// --- Error ------------------------------------------------------------------------------------

/// Errors raised while reading or writing a single TTLV primitive.
///
/// These are the lowest-level failures in the codec; [`crate::error::ErrorKind`] wraps each of
/// these into one of the error taxonomy variants described in the crate root documentation.
#[derive(Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    IoError(std::io::Error),
    InvalidTtlvTag(String),
    UnexpectedTtlvTag { expected: TtlvTag, actual: TtlvTag },
    UnexpectedTtlvType { expected: TtlvType, actual: TtlvType },
    UnsupportedTtlvType(u8),
    InvalidTtlvType(u8),
    InvalidTtlvValueLength {
        expected: u32,
        actual: u32,
        r#type: TtlvType,
    },
    InvalidTtlvValue(TtlvType),
    BufferFull,
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::WriteZero {
            Error::BufferFull
        } else {
            Error::IoError(e)
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

// --- TtlvTag ------------------------------------------------------------------------------------

/// A type for (de)serializing a TTLV Tag.
///
/// According to the KMIP specification section 9.1.1.1 Item Tag:
/// > _An Item Tag is a three-byte binary unsigned integer, transmitted big endian, which contains
/// > a number that designates the specific Protocol Field or Object that the TTLV object
/// > represents._
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TtlvTag(u32);

impl TtlvTag {
    pub const fn new(v: u32) -> Self {
        TtlvTag(v)
    }

    pub fn read<T: Read>(src: &mut T) -> Result<Self> {
        let mut raw_item_tag = [0u8; 3];
        src.read_exact(&mut raw_item_tag)?;
        Ok(TtlvTag::from(raw_item_tag))
    }

    pub fn write<T: Write>(&self, dst: &mut T) -> Result<()> {
        dst.write_all(&<[u8; 3]>::from(self))?;
        Ok(())
    }
}

impl Debug for TtlvTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("0x{:06X}", &self.0))
    }
}

impl Deref for TtlvTag {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromStr for TtlvTag {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let v = u32::from_str_radix(s.trim_start_matches("0x"), 16)
            .map_err(|_| Error::InvalidTtlvTag(s.to_string()))?;
        Ok(TtlvTag(v))
    }
}

impl std::fmt::Display for TtlvTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:06X}", self.0)
    }
}

impl From<TtlvTag> for [u8; 3] {
    fn from(tag: TtlvTag) -> Self {
        <[u8; 3]>::from(&tag)
    }
}

impl From<&TtlvTag> for [u8; 3] {
    fn from(tag: &TtlvTag) -> Self {
        let b: [u8; 4] = tag.0.to_be_bytes();
        [b[1], b[2], b[3]]
    }
}

impl From<[u8; 3]> for TtlvTag {
    fn from(b: [u8; 3]) -> Self {
        TtlvTag(u32::from_be_bytes([0x00u8, b[0], b[1], b[2]]))
    }
}

impl From<&[u8; 3]> for TtlvTag {
    fn from(b: &[u8; 3]) -> Self {
        TtlvTag(u32::from_be_bytes([0x00u8, b[0], b[1], b[2]]))
    }
}

// --- TtlvType ------------------------------------------------------------------------------------

/// A type for (de)serializing a TTLV Type.
///
/// According to the KMIP specification section 9.1.1.2 Item Type:
/// > _An Item Type is a byte containing a coded value that indicates the data type of the data
/// > object._
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TtlvType {
    Structure = 0x01,
    Integer = 0x02,
    LongInteger = 0x03,
    BigInteger = 0x04,
    Enumeration = 0x05,
    Boolean = 0x06,
    TextString = 0x07,
    ByteString = 0x08,
    DateTime = 0x09,
    Interval = 0x0A,
}

impl TtlvType {
    pub fn read<T: Read>(src: &mut T) -> Result<Self> {
        let mut raw_item_type = [0u8; 1];
        src.read_exact(&mut raw_item_type)?;
        TtlvType::try_from(raw_item_type[0])
    }

    pub fn write<T: Write>(&self, dst: &mut T) -> Result<()> {
        dst.write_all(&[*self as u8])?;
        Ok(())
    }
}

impl std::fmt::Display for TtlvType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TtlvType::Structure => f.write_str("Structure (0x01)"),
            TtlvType::Integer => f.write_str("Integer (0x02)"),
            TtlvType::LongInteger => f.write_str("LongInteger (0x03)"),
            TtlvType::BigInteger => f.write_str("BigInteger (0x04)"),
            TtlvType::Enumeration => f.write_str("Enumeration (0x05)"),
            TtlvType::Boolean => f.write_str("Boolean (0x06)"),
            TtlvType::TextString => f.write_str("TextString (0x07)"),
            TtlvType::ByteString => f.write_str("ByteString (0x08)"),
            TtlvType::DateTime => f.write_str("DateTime (0x09)"),
            TtlvType::Interval => f.write_str("Interval (0x0A)"),
        }
    }
}

impl TryFrom<u8> for TtlvType {
    type Error = Error;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0x01 => Ok(TtlvType::Structure),
            0x02 => Ok(TtlvType::Integer),
            0x03 => Ok(TtlvType::LongInteger),
            0x04 => Ok(TtlvType::BigInteger),
            0x05 => Ok(TtlvType::Enumeration),
            0x06 => Ok(TtlvType::Boolean),
            0x07 => Ok(TtlvType::TextString),
            0x08 => Ok(TtlvType::ByteString),
            0x09 => Ok(TtlvType::DateTime),
            0x0A => Ok(TtlvType::Interval),
            _ => Err(Error::InvalidTtlvType(value)),
        }
    }
}

impl From<TtlvType> for [u8; 1] {
    fn from(item_type: TtlvType) -> Self {
        [item_type as u8]
    }
}

// --- TtlvLength ----------------------------------------------------------------------------------

/// A type for (de)serializing a TTLV Length.
///
/// According to the KMIP specification section 9.1.1.3 Item Length:
/// > _An Item Length is a 32-bit binary integer, transmitted big-endian, containing the number of
/// > bytes in the Item Value._
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TtlvLength(u32);

impl TtlvLength {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn read<T: Read>(src: &mut T) -> Result<Self> {
        let mut value_length = [0u8; 4];
        src.read_exact(&mut value_length)?;
        Ok(Self(u32::from_be_bytes(value_length)))
    }

    pub fn write<T: Write>(&self, dst: &mut T) -> Result<()> {
        dst.write_all(&self.0.to_be_bytes())?;
        Ok(())
    }
}

impl Debug for TtlvLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("0x{:0X}", &self.0))
    }
}

impl Deref for TtlvLength {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// --- SerializableTtlvType --------------------------------------------------------------------

/// A type that knows how to (de)serialize itself from/to TTLV byte format.
///
/// Provides default implementations of the padding rules shared by every primitive type:
///
///   Data Type    | Length
///   -------------|----------------------
///   Structure    | Varies, multiple of 8
///   Integer      | 4
///   Long Integer | 8
///   Big Integer  | Varies, multiple of 8
///   Enumeration  | 4
///   Boolean      | 8
///   Text String  | Varies
///   Byte String  | Varies
///   Date-Time    | 8
///   Interval     | 4
///
/// If the Item Type is Structure, the Item Length is the total length of the sub-items,
/// including their padding. Integer, Enumeration and Interval values are padded with four bytes
/// following the Item Value; Text Strings and Byte Strings are padded with the minimal number of
/// bytes to reach a multiple of eight.
pub trait SerializableTtlvType: Sized + Deref {
    const TTLV_TYPE: TtlvType;

    fn ttlv_type(&self) -> TtlvType {
        Self::TTLV_TYPE
    }

    fn calc_pad_bytes(value_len: u32) -> u32 {
        let remainder = value_len % 8;
        if remainder == 0 {
            0
        } else {
            8 - remainder
        }
    }

    fn read_pad_bytes<T: Read>(src: &mut T, value_len: u32) -> Result<()> {
        let num_pad_bytes = Self::calc_pad_bytes(value_len) as usize;
        if num_pad_bytes > 0 {
            let mut dst = [0u8; 8];
            src.read_exact(&mut dst[..num_pad_bytes])?;
        }
        Ok(())
    }

    fn write_pad_bytes<T: Write>(dst: &mut T, value_len: u32) -> Result<()> {
        let num_pad_bytes = Self::calc_pad_bytes(value_len) as usize;
        if num_pad_bytes > 0 {
            const PADDING_BYTES: [u8; 8] = [0; 8];
            dst.write_all(&PADDING_BYTES[..num_pad_bytes])?;
        }
        Ok(())
    }

    /// Reads the L_ength, V_alue and padding. The caller has already consumed the T_ype.
    fn read<T: Read>(src: &mut T) -> Result<Self> {
        let mut value_len = [0u8; 4];
        src.read_exact(&mut value_len)?;
        let value_len = u32::from_be_bytes(value_len);
        let v = Self::read_value(src, value_len)?;
        Self::read_pad_bytes(src, value_len)?;
        Ok(v)
    }

    /// Writes the T_ype, L_ength, V_alue and padding. The caller writes the preceding Tag.
    fn write<T: Write>(&self, dst: &mut T) -> Result<()> {
        dst.write_all(&[Self::TTLV_TYPE as u8])?;
        let value_len = self.write_length_and_value(dst)?;
        Self::write_pad_bytes(dst, value_len)
    }

    fn read_value<T: Read>(src: &mut T, value_len: u32) -> Result<Self>;

    fn write_length_and_value<T: Write>(&self, dst: &mut T) -> Result<u32>;
}

macro_rules! define_fixed_value_length_serializable_ttlv_type {
    ($(#[$meta:meta])* $NEW_TYPE_NAME:ident, $TTLV_ITEM_TYPE:expr, $RUST_TYPE:ty, $TTLV_VALUE_LEN:literal) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        $(#[$meta])*
        pub struct $NEW_TYPE_NAME(pub $RUST_TYPE);
        impl $NEW_TYPE_NAME {
            const TTLV_FIXED_VALUE_LENGTH: u32 = $TTLV_VALUE_LEN;
        }
        impl Deref for $NEW_TYPE_NAME {
            type Target = $RUST_TYPE;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }
        impl SerializableTtlvType for $NEW_TYPE_NAME {
            const TTLV_TYPE: TtlvType = $TTLV_ITEM_TYPE;

            fn read_value<T: Read>(src: &mut T, value_len: u32) -> Result<Self> {
                if value_len != Self::TTLV_FIXED_VALUE_LENGTH {
                    Err(Error::InvalidTtlvValueLength {
                        expected: Self::TTLV_FIXED_VALUE_LENGTH,
                        actual: value_len,
                        r#type: Self::TTLV_TYPE,
                    })
                } else {
                    let mut dst = [0u8; Self::TTLV_FIXED_VALUE_LENGTH as usize];
                    src.read_exact(&mut dst)?;
                    let v: $RUST_TYPE = <$RUST_TYPE>::from_be_bytes(dst);
                    Ok($NEW_TYPE_NAME(v))
                }
            }

            fn write_length_and_value<T: Write>(&self, dst: &mut T) -> Result<u32> {
                dst.write_all(&Self::TTLV_FIXED_VALUE_LENGTH.to_be_bytes())?;
                dst.write_all(&self.0.to_be_bytes())?;
                Ok(Self::TTLV_FIXED_VALUE_LENGTH)
            }
        }
    };
}

// --- TtlvInteger -----------------------------------------------------------------------------

define_fixed_value_length_serializable_ttlv_type!(
    /// A type for (de)serializing a TTLV Integer: a signed 32-bit big-endian value padded to 8 bytes.
    TtlvInteger,
    TtlvType::Integer,
    i32,
    4
);

// --- TtlvLongInteger --------------------------------------------------------------------------

define_fixed_value_length_serializable_ttlv_type!(
    /// A type for (de)serializing a TTLV Long Integer: a signed 64-bit big-endian value, unpadded.
    TtlvLongInteger,
    TtlvType::LongInteger,
    i64,
    8
);

// --- TtlvBigInteger ---------------------------------------------------------------------------

/// A type for (de)serializing a TTLV Big Integer.
///
/// Big Integers are a sequence of two's complement bytes, sign-extended to a multiple of eight
/// bytes. No operation in this core emits or requires one; it is kept so that unrecognized
/// fields of this type can still be decoded and skipped rather than failing the whole message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TtlvBigInteger(pub Vec<u8>);
impl Deref for TtlvBigInteger {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl SerializableTtlvType for TtlvBigInteger {
    const TTLV_TYPE: TtlvType = TtlvType::BigInteger;

    fn read_value<T: Read>(src: &mut T, value_len: u32) -> Result<Self> {
        let mut dst = vec![0; value_len as usize];
        src.read_exact(&mut dst)?;
        Ok(TtlvBigInteger(dst))
    }

    fn write_length_and_value<T: Write>(&self, dst: &mut T) -> Result<u32> {
        let v = self.0.as_slice();
        let v_len = v.len() as u32;
        let num_pad_bytes = Self::calc_pad_bytes(v_len);
        let v_len = v_len + num_pad_bytes;
        dst.write_all(&v_len.to_be_bytes())?;
        let pad_byte = if !v.is_empty() && v[0] & 0b1000_0000 == 0b1000_0000 {
            0b1111_1111
        } else {
            0b0000_0000
        };
        for _ in 1..=num_pad_bytes {
            dst.write_all(&[pad_byte])?;
        }
        dst.write_all(v)?;
        Ok(v_len)
    }
}

// --- TtlvEnumeration --------------------------------------------------------------------------

define_fixed_value_length_serializable_ttlv_type!(
    /// A type for (de)serializing a TTLV Enumeration: an unsigned 32-bit big-endian value padded to 8 bytes.
    TtlvEnumeration,
    TtlvType::Enumeration,
    u32,
    4
);

// --- TtlvBoolean ------------------------------------------------------------------------------

/// A type for (de)serializing a TTLV Boolean.
///
/// Booleans are encoded as an eight-byte big-endian value of 0 (false) or 1 (true). This can't
/// use the fixed-value-length macro because it has extra value validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TtlvBoolean(pub bool);
impl TtlvBoolean {
    const TTLV_FIXED_VALUE_LENGTH: u32 = 8;
}
impl Deref for TtlvBoolean {
    type Target = bool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl SerializableTtlvType for TtlvBoolean {
    const TTLV_TYPE: TtlvType = TtlvType::Boolean;

    fn read_value<T: Read>(src: &mut T, value_len: u32) -> Result<Self> {
        if value_len != Self::TTLV_FIXED_VALUE_LENGTH {
            Err(Error::InvalidTtlvValueLength {
                expected: Self::TTLV_FIXED_VALUE_LENGTH,
                actual: value_len,
                r#type: Self::TTLV_TYPE,
            })
        } else {
            let mut dst = [0u8; Self::TTLV_FIXED_VALUE_LENGTH as usize];
            src.read_exact(&mut dst)?;
            match u64::from_be_bytes(dst) {
                0 => Ok(TtlvBoolean(false)),
                1 => Ok(TtlvBoolean(true)),
                _ => Err(Error::InvalidTtlvValue(Self::TTLV_TYPE)),
            }
        }
    }

    fn write_length_and_value<T: Write>(&self, dst: &mut T) -> Result<u32> {
        let v = match self.0 {
            true => 1u64,
            false => 0u64,
        };
        dst.write_all(&Self::TTLV_FIXED_VALUE_LENGTH.to_be_bytes())?;
        dst.write_all(&v.to_be_bytes())?;
        Ok(Self::TTLV_FIXED_VALUE_LENGTH)
    }
}

// --- TtlvTextString ---------------------------------------------------------------------------

/// A type for (de)serializing a TTLV Text String: UTF-8 bytes, not NUL-terminated, padded to 8 bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TtlvTextString(pub String);
impl Deref for TtlvTextString {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl SerializableTtlvType for TtlvTextString {
    const TTLV_TYPE: TtlvType = TtlvType::TextString;

    fn read_value<T: Read>(src: &mut T, value_len: u32) -> Result<Self> {
        let mut dst = vec![0; value_len as usize];
        src.read_exact(&mut dst)?;
        let new_str =
            String::from_utf8(dst).map_err(|_| Error::InvalidTtlvValue(Self::TTLV_TYPE))?;
        Ok(TtlvTextString(new_str))
    }

    fn write_length_and_value<T: Write>(&self, dst: &mut T) -> Result<u32> {
        let v = self.0.as_bytes();
        let v_len = v.len() as u32;
        dst.write_all(&v_len.to_be_bytes())?;
        dst.write_all(v)?;
        Ok(v_len)
    }
}

// --- TtlvByteString ---------------------------------------------------------------------------

/// A type for (de)serializing a TTLV Byte String: raw bytes, interpreted in sequence order, padded to 8 bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TtlvByteString(pub Vec<u8>);
impl Deref for TtlvByteString {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl SerializableTtlvType for TtlvByteString {
    const TTLV_TYPE: TtlvType = TtlvType::ByteString;

    fn read_value<T: Read>(src: &mut T, value_len: u32) -> Result<Self> {
        let mut dst = vec![0; value_len as usize];
        src.read_exact(&mut dst)?;
        Ok(TtlvByteString(dst))
    }

    fn write_length_and_value<T: Write>(&self, dst: &mut T) -> Result<u32> {
        let v = self.0.as_slice();
        let v_len = v.len() as u32;
        dst.write_all(&v_len.to_be_bytes())?;
        dst.write_all(v)?;
        Ok(v_len)
    }
}

// --- TtlvDateTime -----------------------------------------------------------------------------

define_fixed_value_length_serializable_ttlv_type!(
    /// A type for (de)serializing a TTLV Date-Time: POSIX seconds since the epoch, signed 64-bit big-endian, unpadded.
    TtlvDateTime,
    TtlvType::DateTime,
    i64,
    8
);

// --- TtlvInterval -----------------------------------------------------------------------------

/// A type for (de)serializing a TTLV Interval: an unsigned 32-bit big-endian seconds count padded to 8 bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TtlvIntervalValue(pub u32);
impl TtlvIntervalValue {
    const TTLV_FIXED_VALUE_LENGTH: u32 = 4;
}
impl Deref for TtlvIntervalValue {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl SerializableTtlvType for TtlvIntervalValue {
    const TTLV_TYPE: TtlvType = TtlvType::Interval;

    fn read_value<T: Read>(src: &mut T, value_len: u32) -> Result<Self> {
        if value_len != Self::TTLV_FIXED_VALUE_LENGTH {
            Err(Error::InvalidTtlvValueLength {
                expected: Self::TTLV_FIXED_VALUE_LENGTH,
                actual: value_len,
                r#type: Self::TTLV_TYPE,
            })
        } else {
            let mut dst = [0u8; 4];
            src.read_exact(&mut dst)?;
            Ok(TtlvIntervalValue(u32::from_be_bytes(dst)))
        }
    }

    fn write_length_and_value<T: Write>(&self, dst: &mut T) -> Result<u32> {
        dst.write_all(&Self::TTLV_FIXED_VALUE_LENGTH.to_be_bytes())?;
        dst.write_all(&self.0.to_be_bytes())?;
        Ok(Self::TTLV_FIXED_VALUE_LENGTH)
    }
}

/// Alias kept for symmetry with the KMIP spec's primitive type table: an Interval is encoded
/// exactly like an Enumeration (4-byte value padded to 8) but is semantically a duration in
/// seconds rather than a named constant.
pub type TtlvInterval = TtlvIntervalValue;
