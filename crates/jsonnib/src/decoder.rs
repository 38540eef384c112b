//! The streaming decoder.
//!
//! The `Decoder` accepts byte fragments of any size through
//! [`Decoder::feed`] and decodes them lazily: each call to `next()` runs the
//! state machine until at least one [`Event`] is available or the buffered
//! input runs out. A fragment boundary may fall anywhere, even between the
//! two nibbles of one byte; the decoder keeps every bit of progress in
//! explicit fields (`expect`, the nesting stack, the carried nibble and the
//! pending bytes), so it resumes exactly where it stopped.
//!
//! Running out of input is never an error until [`Decoder::finish`] marks the
//! last fragment; only then do incomplete constructs become
//! [`FormatError`]s.
//!
//! # Examples
//!
//! ```rust
//! use jsonnib::{Decoder, DecoderOptions, Event};
//!
//! // `[1]` followed by the end-of-stream sentinel, split mid-byte.
//! let mut decoder = Decoder::new(DecoderOptions {
//!     stream_values: Some(false),
//!     ..Default::default()
//! });
//! decoder.feed(&[0x57]);
//! assert_eq!(decoder.next(), Some(Ok(Event::StartArray)));
//! assert_eq!(decoder.next(), None); // the operand of `1` is still missing
//!
//! decoder.feed(&[0x16, 0xff]);
//! let rest: Vec<_> = decoder.finish().collect::<Result<_, _>>().unwrap();
//! assert_eq!(rest, vec![Event::NumberValue("1".into()), Event::EndArray]);
//! ```
use alloc::{
    collections::VecDeque,
    string::{String, ToString},
    vec::Vec,
};
use core::ops::Range;

use bstr::{BString, ByteSlice};

use crate::{
    error::{DecodeError, FormatError},
    event::{Event, Scalar},
    format::{EOF_OPERAND, KeyCode, Length, NibbleReader, ValueCode, read_signed, read_unsigned},
    number::{render_f32, render_f64},
    options::{DecoderOptions, Delivery},
};

/// What the state machine needs next.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// A code from the value table.
    Value,
    /// A code from the key table.
    Key,
    /// The operand nibble of a code.
    Operand(Operand),
    /// A fixed-width little-endian field.
    Field { field: Field, width: u8 },
    /// `len` bytes of UTF-8 payload.
    Body { scalar: Scalar, len: usize, last: bool },
    /// The end-of-stream sentinel has been read; everything else is ignored.
    Done,
}

#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
    SmallInt,
    Integer { signed: bool },
    Length { scalar: Scalar, last: bool },
    Extension,
}

#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Unsigned,
    Signed,
    Float32,
    Float64,
    Length { scalar: Scalar, last: bool },
}

/// Outcome of one state machine step.
enum Step {
    Continue,
    /// Out of input; resume after the next `feed`.
    Suspend,
}

/// The streaming decoder.
///
/// `Decoder` is fed byte fragments and implements `Iterator` to yield the
/// decoded [`Event`]s. With the `serde` feature the whole decoder, including
/// unconsumed input, can be serialized between fragments and restored later.
///
/// # Examples
///
/// ```rust
/// use jsonnib::{Decoder, DecoderOptions, Event, FormatError};
///
/// // `{` followed by the end-of-stream sentinel.
/// let mut decoder = Decoder::new(DecoderOptions::default());
/// decoder.feed(&[0x4f, 0xf0]);
/// let results: Vec<_> = decoder.finish().collect();
/// assert_eq!(results[0], Ok(Event::StartObject));
/// assert_eq!(
///     results[1].as_ref().unwrap_err().kind,
///     FormatError::PrematureEof { depth: 1 }
/// );
/// ```
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone)]
pub struct Decoder {
    /// Input not yet consumed starts at `pos`.
    pending: Vec<u8>,
    pos: usize,
    /// Bytes already dropped from the front of `pending`.
    consumed: u64,
    end_of_input: bool,

    expect: Expect,
    /// One entry per open container, `true` for objects.
    stack: Vec<bool>,
    nibbles: NibbleReader,

    /// Fragments of the current scalar, kept for packed delivery.
    accumulator: String,
    /// No fragment of the current scalar has been delivered yet.
    first_chunk: bool,

    delivery: Delivery,
    events: VecDeque<Event>,
    failed: bool,

    /// Panic on format errors instead of returning them
    #[cfg(any(test, feature = "fuzzing"))]
    panic_on_error: bool,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(DecoderOptions::default())
    }
}

impl Iterator for Decoder {
    type Item = Result<Event, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event()
    }
}

/// A `Decoder` that has been closed to further input.
///
/// Returned by [`Decoder::finish`], it drains the events still held in the
/// buffered input. An incomplete construct at the end is reported as an
/// error instead of waiting for more input.
#[derive(Debug)]
pub struct ClosedDecoder {
    decoder: Decoder,
}

impl Iterator for ClosedDecoder {
    type Item = Result<Event, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.decoder.next_event()
    }
}

impl Decoder {
    #[must_use]
    /// Creates a new `Decoder` with the given options.
    pub fn new(options: DecoderOptions) -> Self {
        Self {
            pending: Vec::new(),
            pos: 0,
            consumed: 0,
            end_of_input: false,
            expect: Expect::Value,
            stack: Vec::new(),
            nibbles: NibbleReader::default(),
            accumulator: String::new(),
            first_chunk: true,
            delivery: options.delivery(),
            events: VecDeque::new(),
            failed: false,
            #[cfg(any(test, feature = "fuzzing"))]
            panic_on_error: options.panic_on_error,
        }
    }

    /// Appends a fragment of the byte stream.
    ///
    /// Bytes that arrive after the end-of-stream sentinel are discarded.
    pub fn feed(&mut self, bytes: &[u8]) {
        if self.expect == Expect::Done || self.failed {
            return;
        }
        if self.pos > 0 {
            self.pending.drain(..self.pos);
            self.consumed += self.pos as u64;
            self.pos = 0;
        }
        self.pending.extend_from_slice(bytes);
    }

    #[must_use]
    /// Marks the end of input and returns a closed decoder that yields the
    /// remaining events.
    pub fn finish(mut self) -> ClosedDecoder {
        self.end_of_input = true;
        ClosedDecoder { decoder: self }
    }

    /// The effective delivery configuration.
    #[must_use]
    pub fn delivery(&self) -> &Delivery {
        &self.delivery
    }

    /// Number of containers opened and not yet closed.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Whether the end-of-stream sentinel has been decoded.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.expect == Expect::Done
    }

    /// Drive the decoder until it either
    ///   * has an event queued,
    ///   * runs out of buffered input, or
    ///   * hits a format error, after which it yields nothing more.
    fn next_event(&mut self) -> Option<Result<Event, DecodeError>> {
        loop {
            if let Some(event) = self.events.pop_front() {
                return Some(Ok(event));
            }
            if self.failed {
                return None;
            }
            match self.step() {
                Ok(Step::Continue) => {}
                Ok(Step::Suspend) => return None,
                Err(kind) => {
                    let err = DecodeError {
                        kind,
                        offset: self.consumed + self.pos as u64,
                    };
                    #[cfg(any(test, feature = "fuzzing"))]
                    assert!(!self.panic_on_error, "Format error: {err}");
                    self.failed = true;
                    self.events.clear();
                    return Some(Err(err));
                }
            }
        }
    }

    fn step(&mut self) -> Result<Step, FormatError> {
        match self.expect {
            Expect::Done => {
                self.pos = self.pending.len();
                Ok(Step::Suspend)
            }
            Expect::Body { scalar, len, last } => {
                let Some(range) = self.available(len) else {
                    return self.starve(truncated(scalar));
                };
                let fragment = utf8(&self.pending[range.clone()])?;
                self.pos = range.end;
                self.deliver(scalar, fragment, last);
                Ok(Step::Continue)
            }
            Expect::Value => match self.next_code() {
                Some(code) => self.value(ValueCode::from_nibble(code)),
                // Between top-level values the stream may end without error.
                None if self.stack.is_empty() && self.first_chunk => Ok(Step::Suspend),
                None if !self.first_chunk => self.starve(FormatError::TruncatedString),
                None => self.starve(FormatError::TruncatedCode),
            },
            Expect::Key => match self.next_code() {
                Some(code) => self.key(KeyCode::from_nibble(code)),
                None if !self.first_chunk => self.starve(FormatError::TruncatedString),
                None => self.starve(FormatError::TruncatedCode),
            },
            Expect::Operand(operand) => match self.next_code() {
                Some(nibble) => self.operand(operand, nibble),
                None => self.starve(FormatError::TruncatedCode),
            },
            Expect::Field { field, width } => {
                let Some(range) = self.available(usize::from(width)) else {
                    return self.starve(match field {
                        Field::Length { scalar, .. } => truncated(scalar),
                        _ => FormatError::TruncatedNumber,
                    });
                };
                let mut raw = [0u8; 8];
                let raw = &mut raw[..range.len()];
                raw.copy_from_slice(&self.pending[range.clone()]);
                self.pos = range.end;
                self.field(field, raw)
            }
        }
    }

    fn value(&mut self, code: ValueCode) -> Result<Step, FormatError> {
        if !self.first_chunk
            && !matches!(code, ValueCode::Nop | ValueCode::StringPart | ValueCode::StringLast)
        {
            return Err(FormatError::InterruptedString);
        }
        match code {
            ValueCode::Nop => return Ok(Step::Continue),
            ValueCode::Null => self.events.push_back(Event::NullValue),
            ValueCode::False => self.events.push_back(Event::FalseValue),
            ValueCode::True => self.events.push_back(Event::TrueValue),
            ValueCode::StartObject => {
                self.events.push_back(Event::StartObject);
                self.stack.push(true);
                self.expect = Expect::Key;
                return Ok(Step::Continue);
            }
            ValueCode::StartArray => {
                self.events.push_back(Event::StartArray);
                self.stack.push(false);
            }
            ValueCode::EndArray => {
                if self.stack.pop() != Some(false) {
                    return Err(FormatError::UnbalancedEnd);
                }
                self.events.push_back(Event::EndArray);
            }
            ValueCode::SmallInt => return Ok(self.expect_next(Expect::Operand(Operand::SmallInt))),
            ValueCode::Unsigned => {
                return Ok(self.expect_next(Expect::Operand(Operand::Integer { signed: false })));
            }
            ValueCode::Signed => {
                return Ok(self.expect_next(Expect::Operand(Operand::Integer { signed: true })));
            }
            ValueCode::Float32 => {
                return Ok(self.expect_next(Expect::Field {
                    field: Field::Float32,
                    width: 4,
                }));
            }
            ValueCode::Float64 => {
                return Ok(self.expect_next(Expect::Field {
                    field: Field::Float64,
                    width: 8,
                }));
            }
            ValueCode::NumberText => return Ok(self.expect_length(Scalar::Number, true)),
            ValueCode::StringPart => return Ok(self.expect_length(Scalar::String, false)),
            ValueCode::StringLast => return Ok(self.expect_length(Scalar::String, true)),
            ValueCode::Extension => return Ok(self.expect_next(Expect::Operand(Operand::Extension))),
        }
        self.settle();
        Ok(Step::Continue)
    }

    fn key(&mut self, code: KeyCode) -> Result<Step, FormatError> {
        if !self.first_chunk
            && !matches!(
                code,
                KeyCode::Nop | KeyCode::KeyPart | KeyCode::KeyLast | KeyCode::ShortKey(_)
            )
        {
            return Err(FormatError::InterruptedString);
        }
        match code {
            KeyCode::Nop => {}
            KeyCode::EndObject => {
                if self.stack.pop() != Some(true) {
                    return Err(FormatError::UnbalancedEnd);
                }
                self.events.push_back(Event::EndObject);
                self.settle();
            }
            KeyCode::KeyPart => return Ok(self.expect_length(Scalar::Key, false)),
            KeyCode::KeyLast => return Ok(self.expect_length(Scalar::Key, true)),
            KeyCode::ShortKey(len) => self.begin_text(Scalar::Key, usize::from(len), true),
            KeyCode::Extension => return Ok(self.expect_next(Expect::Operand(Operand::Extension))),
        }
        Ok(Step::Continue)
    }

    fn operand(&mut self, operand: Operand, nibble: u8) -> Result<Step, FormatError> {
        match operand {
            Operand::SmallInt => self.deliver(Scalar::Number, nibble.to_string(), true),
            Operand::Integer { signed } => {
                if nibble > 7 {
                    let code = if signed {
                        ValueCode::Signed
                    } else {
                        ValueCode::Unsigned
                    };
                    return Err(FormatError::ReservedCode {
                        code: code.nibble(),
                        operand: nibble,
                    });
                }
                self.expect = Expect::Field {
                    field: if signed { Field::Signed } else { Field::Unsigned },
                    width: nibble + 1,
                };
            }
            Operand::Length { scalar, last } => match Length::from_nibble(nibble) {
                Length::Inline(len) => self.begin_text(scalar, usize::from(len), last),
                Length::Field(width) => {
                    self.expect = Expect::Field {
                        field: Field::Length { scalar, last },
                        width,
                    };
                }
            },
            Operand::Extension => {
                if nibble != EOF_OPERAND {
                    return Err(FormatError::ReservedCode {
                        code: ValueCode::Extension.nibble(),
                        operand: nibble,
                    });
                }
                if !self.stack.is_empty() {
                    return Err(FormatError::PrematureEof {
                        depth: self.stack.len(),
                    });
                }
                self.expect = Expect::Done;
            }
        }
        Ok(Step::Continue)
    }

    fn field(&mut self, field: Field, raw: &[u8]) -> Result<Step, FormatError> {
        match field {
            Field::Unsigned => {
                self.deliver(Scalar::Number, read_unsigned(raw).to_string(), true);
            }
            Field::Signed => self.deliver(Scalar::Number, read_signed(raw).to_string(), true),
            Field::Float32 => {
                let mut bytes = [0u8; 4];
                bytes.copy_from_slice(raw);
                self.deliver(Scalar::Number, render_f32(f32::from_le_bytes(bytes)), true);
            }
            Field::Float64 => {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(raw);
                self.deliver(Scalar::Number, render_f64(f64::from_le_bytes(bytes)), true);
            }
            Field::Length { scalar, last } => {
                // A length that cannot even be addressed can never be satisfied.
                let len = usize::try_from(read_unsigned(raw)).map_err(|_| truncated(scalar))?;
                self.begin_text(scalar, len, last);
            }
        }
        Ok(Step::Continue)
    }

    fn expect_next(&mut self, expect: Expect) -> Step {
        self.expect = expect;
        Step::Continue
    }

    fn expect_length(&mut self, scalar: Scalar, last: bool) -> Step {
        self.expect_next(Expect::Operand(Operand::Length { scalar, last }))
    }

    /// Starts a payload of `len` bytes; empty payloads skip the body phase.
    fn begin_text(&mut self, scalar: Scalar, len: usize, last: bool) {
        if len == 0 {
            self.deliver(scalar, String::new(), last);
        } else {
            self.expect = Expect::Body { scalar, len, last };
        }
    }

    /// Emits the events for one fragment of a scalar and moves on.
    fn deliver(&mut self, scalar: Scalar, fragment: String, last: bool) {
        let mode = self.delivery.of(scalar);

        if self.first_chunk {
            if mode.streamed {
                self.events.push_back(scalar.start());
            }
            self.first_chunk = false;
        }
        if mode.packed {
            self.accumulator.push_str(&fragment);
        }
        if mode.streamed && !fragment.is_empty() {
            self.events.push_back(scalar.chunk(fragment));
        }

        if !last {
            self.expect = if scalar == Scalar::Key {
                Expect::Key
            } else {
                Expect::Value
            };
            return;
        }

        if mode.streamed {
            self.events.push_back(scalar.end());
        }
        if mode.packed {
            let value = core::mem::take(&mut self.accumulator);
            self.events.push_back(scalar.value(value));
        }
        self.first_chunk = true;
        if scalar == Scalar::Key {
            self.expect = Expect::Value;
        } else {
            self.settle();
        }
    }

    /// Picks the code table for whatever follows a completed value.
    fn settle(&mut self) {
        self.expect = if self.stack.last() == Some(&true) {
            Expect::Key
        } else {
            Expect::Value
        };
    }

    fn next_code(&mut self) -> Option<u8> {
        self.nibbles.next(&self.pending, &mut self.pos)
    }

    fn available(&self, len: usize) -> Option<Range<usize>> {
        let end = self.pos.checked_add(len)?;
        (end <= self.pending.len()).then_some(self.pos..end)
    }

    fn starve(&self, kind: FormatError) -> Result<Step, FormatError> {
        if self.end_of_input {
            Err(kind)
        } else {
            Ok(Step::Suspend)
        }
    }
}

fn truncated(scalar: Scalar) -> FormatError {
    match scalar {
        Scalar::Number => FormatError::TruncatedNumber,
        Scalar::Key | Scalar::String => FormatError::TruncatedString,
    }
}

fn utf8(bytes: &[u8]) -> Result<String, FormatError> {
    bytes
        .to_str()
        .map(ToString::to_string)
        .map_err(|_| FormatError::InvalidUtf8 {
            bytes: BString::from(bytes),
        })
}
