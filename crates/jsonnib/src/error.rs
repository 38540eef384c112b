use bstr::BString;
use thiserror::Error;

/// A decoding failure, positioned at the absolute stream offset of the first
/// byte the decoder could not consume.
///
/// Once a decoder has returned an error it is poisoned and yields no further
/// events.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at byte {offset}")]
pub struct DecodeError {
    /// What went wrong.
    pub kind: FormatError,
    /// Offset into the whole byte stream, counting every byte fed so far.
    pub offset: u64,
}

/// The kinds of malformed input the decoder reports.
///
/// The truncation kinds are only ever raised for the final fragment: a
/// non-final fragment that ends mid-construct is buffered instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The input ended in the middle of an opcode or its operand.
    #[error("cannot read a code: input ended mid-opcode")]
    TruncatedCode,
    /// The input ended before a string's declared length was available.
    #[error("cannot read a string: input ended before its declared length")]
    TruncatedString,
    /// The input ended before a number's payload was available.
    #[error("cannot read a number: input ended before its payload")]
    TruncatedNumber,
    /// A streamed string or key was followed by anything but its next
    /// fragment.
    #[error("string interrupted before its last fragment")]
    InterruptedString,
    /// The end-of-stream sentinel arrived while containers were still open.
    #[error("premature EOF: {depth} container(s) still open")]
    PrematureEof {
        /// Number of open containers.
        depth: usize,
    },
    /// An opcode and operand combination that the format does not assign.
    #[error("reserved code {code:#x} with operand {operand:#x}")]
    ReservedCode {
        /// The opcode nibble.
        code: u8,
        /// The operand nibble that followed it.
        operand: u8,
    },
    /// A container end that does not match the innermost open container.
    #[error("unbalanced container end")]
    UnbalancedEnd,
    /// A string, key or number payload that is not valid UTF-8.
    #[error("invalid UTF-8 payload: \"{bytes}\"")]
    InvalidUtf8 {
        /// The offending payload.
        bytes: BString,
    },
}
