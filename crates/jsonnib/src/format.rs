//! Wire format shared by the encoder and the decoder.
//!
//! Every structural token and every scalar type tag is a 4-bit code, and two
//! codes share one byte, high nibble first. The meaning of a code depends on
//! the context the decoder is in: [`ValueCode`] applies wherever a value may
//! start, [`KeyCode`] wherever an object key (or the end of the object) is
//! expected. Codes may be followed by an operand nibble and then by raw
//! payload bytes. Payload bytes are placed after the byte holding the code,
//! so a byte whose low nibble is still unused can be completed by the *next*
//! code after the payload.
//!
//! Code `0` is a no-op in both tables; the encoder pads a half-written byte
//! with it.

/// The no-op code, valid in every code position.
pub(crate) const NOP: u8 = 0;

/// Operand of [`ValueCode::Extension`] / [`KeyCode::Extension`] that marks the
/// end of the stream.
pub(crate) const EOF_OPERAND: u8 = 0xf;

/// Values up to this bound are stored in the operand of
/// [`ValueCode::SmallInt`].
pub(crate) const SMALL_INT_MAX: u64 = 0xf;

/// Keys up to this many bytes fit in a single [`KeyCode::ShortKey`] code.
pub(crate) const SHORT_KEY_MAX: usize = 10;

/// Codes that can appear where a value is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueCode {
    Nop,
    Null,
    False,
    True,
    StartObject,
    StartArray,
    EndArray,
    /// Operand holds the value itself.
    SmallInt,
    /// Operand holds the byte width minus one of an unsigned LE integer.
    Unsigned,
    /// Operand holds the byte width minus one of a two's complement LE integer.
    Signed,
    Float32,
    Float64,
    /// Decimal text that no binary representation reproduces exactly.
    NumberText,
    /// A string fragment with more fragments to follow.
    StringPart,
    /// The last fragment of a string.
    StringLast,
    Extension,
}

impl ValueCode {
    pub(crate) fn from_nibble(nibble: u8) -> Self {
        match nibble & 0xf {
            0 => Self::Nop,
            1 => Self::Null,
            2 => Self::False,
            3 => Self::True,
            4 => Self::StartObject,
            5 => Self::StartArray,
            6 => Self::EndArray,
            7 => Self::SmallInt,
            8 => Self::Unsigned,
            9 => Self::Signed,
            10 => Self::Float32,
            11 => Self::Float64,
            12 => Self::NumberText,
            13 => Self::StringPart,
            14 => Self::StringLast,
            _ => Self::Extension,
        }
    }

    pub(crate) fn nibble(self) -> u8 {
        match self {
            Self::Nop => NOP,
            Self::Null => 1,
            Self::False => 2,
            Self::True => 3,
            Self::StartObject => 4,
            Self::StartArray => 5,
            Self::EndArray => 6,
            Self::SmallInt => 7,
            Self::Unsigned => 8,
            Self::Signed => 9,
            Self::Float32 => 10,
            Self::Float64 => 11,
            Self::NumberText => 12,
            Self::StringPart => 13,
            Self::StringLast => 14,
            Self::Extension => 15,
        }
    }
}

/// Codes that can appear where an object key is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyCode {
    Nop,
    EndObject,
    /// A key fragment with more fragments to follow.
    KeyPart,
    /// The last fragment of a key.
    KeyLast,
    /// The last fragment of a key, with its byte length folded into the code.
    ShortKey(u8),
    Extension,
}

impl KeyCode {
    const SHORT_KEY_BASE: u8 = 4;

    pub(crate) fn from_nibble(nibble: u8) -> Self {
        match nibble & 0xf {
            0 => Self::Nop,
            1 => Self::EndObject,
            2 => Self::KeyPart,
            3 => Self::KeyLast,
            15 => Self::Extension,
            n => Self::ShortKey(n - Self::SHORT_KEY_BASE),
        }
    }

    pub(crate) fn nibble(self) -> u8 {
        match self {
            Self::Nop => NOP,
            Self::EndObject => 1,
            Self::KeyPart => 2,
            Self::KeyLast => 3,
            Self::ShortKey(len) => {
                debug_assert!(usize::from(len) <= SHORT_KEY_MAX);
                Self::SHORT_KEY_BASE + len
            }
            Self::Extension => 15,
        }
    }
}

/// The operand nibble that describes a payload length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Length {
    /// The length itself, `0..=9`.
    Inline(u8),
    /// The width in bytes, `1..=6`, of a little-endian length field.
    Field(u8),
}

impl Length {
    const INLINE_MAX: u8 = 9;

    pub(crate) fn for_len(len: usize) -> Self {
        match u8::try_from(len) {
            Ok(n) if n <= Self::INLINE_MAX => Self::Inline(n),
            _ => Self::Field(unsigned_width(len as u64)),
        }
    }

    pub(crate) fn from_nibble(nibble: u8) -> Self {
        let nibble = nibble & 0xf;
        if nibble <= Self::INLINE_MAX {
            Self::Inline(nibble)
        } else {
            Self::Field(nibble - Self::INLINE_MAX)
        }
    }

    pub(crate) fn nibble(self) -> u8 {
        match self {
            Self::Inline(n) => n,
            Self::Field(width) => {
                debug_assert!((1..=6).contains(&width), "length field too wide");
                Self::INLINE_MAX + width
            }
        }
    }
}

/// Smallest number of bytes that hold `n` as an unsigned integer (at least 1).
pub(crate) fn unsigned_width(n: u64) -> u8 {
    let significant = 64 - n.leading_zeros();
    // at most 8, so the cast is lossless
    #[allow(clippy::cast_possible_truncation)]
    let width = significant.div_ceil(8).max(1) as u8;
    width
}

/// Smallest number of bytes that hold `n` in two's complement (at least 1).
pub(crate) fn signed_width(n: i64) -> u8 {
    // One sign bit on top of the magnitude bits.
    let significant = 65 - if n < 0 { n.leading_ones() } else { n.leading_zeros() };
    #[allow(clippy::cast_possible_truncation)]
    let width = significant.div_ceil(8).clamp(1, 8) as u8;
    width
}

/// Reads a little-endian unsigned integer of `bytes.len()` (at most 8) bytes.
pub(crate) fn read_unsigned(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf[..bytes.len()].copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

/// Reads a little-endian two's complement integer of `bytes.len()` (1 to 8)
/// bytes.
pub(crate) fn read_signed(bytes: &[u8]) -> i64 {
    #[allow(clippy::cast_possible_truncation)]
    let shift = 64 - 8 * bytes.len() as u32;
    #[allow(clippy::cast_possible_wrap)]
    let raw = (read_unsigned(bytes) << shift) as i64;
    raw >> shift
}

/// Splits bytes into 4-bit codes, high nibble first, carrying the low nibble
/// of a byte over to the next read.
///
/// The carry is an explicit flag so that a decoder suspended between the two
/// halves of a byte resumes at the second one.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct NibbleReader {
    carry: Option<u8>,
}

impl NibbleReader {
    /// Returns the next code, consuming a byte of `input` at `*pos` only when
    /// no nibble is carried. Returns `None` when a byte is needed but none is
    /// available.
    pub(crate) fn next(&mut self, input: &[u8], pos: &mut usize) -> Option<u8> {
        if let Some(nibble) = self.carry.take() {
            return Some(nibble);
        }
        let byte = *input.get(*pos)?;
        *pos += 1;
        self.carry = Some(byte & 0xf);
        Some(byte >> 4)
    }

    /// Whether the low half of the last byte read is still pending.
    #[cfg(test)]
    pub(crate) fn has_carry(self) -> bool {
        self.carry.is_some()
    }
}
