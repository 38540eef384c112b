//! The streaming encoder.
//!
//! The `Encoder` consumes one [`Event`] at a time and appends its binary
//! encoding to a fixed-capacity buffer. Whenever the buffer fills up, the
//! completed bytes become a *segment* that the caller drains through the
//! `Iterator` implementation. [`Encoder::finish`] writes the end-of-stream
//! sentinel and releases the final partial segment.
//!
//! The encoder trusts its event source: it never fails, and events that do
//! not fit the expected order produce unspecified (but self-delimiting)
//! output.
//!
//! # Examples
//!
//! ```rust
//! use jsonnib::{Decoder, DecoderOptions, Encoder, EncoderOptions, Event};
//!
//! let mut encoder = Encoder::new(EncoderOptions {
//!     use_values: Some(true),
//!     ..Default::default()
//! });
//! encoder.push(&Event::StartArray);
//! encoder.push(&Event::NumberValue("42".into()));
//! encoder.push(&Event::EndArray);
//! let bytes: Vec<u8> = encoder.finish().flatten().collect();
//!
//! let mut decoder = Decoder::new(DecoderOptions {
//!     stream_values: Some(false),
//!     ..Default::default()
//! });
//! decoder.feed(&bytes);
//! let events: Vec<_> = decoder.finish().collect::<Result<_, _>>().unwrap();
//! assert_eq!(
//!     events,
//!     vec![
//!         Event::StartArray,
//!         Event::NumberValue("42".into()),
//!         Event::EndArray,
//!     ]
//! );
//! ```
use alloc::{string::String, vec::Vec};

use crate::{
    buffer::OutputBuffer,
    event::Event,
    format::{EOF_OPERAND, KeyCode, Length, SHORT_KEY_MAX, ValueCode, signed_width, unsigned_width},
    number::NumberRepr,
    options::{EncoderConfig, EncoderOptions},
};

/// Encodes a stream of events into the binary format.
#[derive(Debug)]
pub struct Encoder {
    config: EncoderConfig,
    buffer: OutputBuffer,
    /// One entry per open container, `true` for objects.
    stack: Vec<bool>,
    /// Decimal text of the streamed number being assembled.
    number: String,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(EncoderOptions::default())
    }
}

/// Yields the segments that have been flushed so far.
impl Iterator for Encoder {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buffer.pop_segment()
    }
}

/// An `Encoder` that has been closed to further events.
///
/// Returned by [`Encoder::finish`], it yields every segment that has not been
/// drained yet, including the one carrying the end-of-stream sentinel.
#[derive(Debug)]
pub struct ClosedEncoder {
    encoder: Encoder,
}

impl Iterator for ClosedEncoder {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        self.encoder.next()
    }
}

impl Encoder {
    #[must_use]
    /// Creates a new `Encoder` with the given options.
    pub fn new(options: EncoderOptions) -> Self {
        let config = options.config();
        Self {
            config,
            buffer: OutputBuffer::new(config.buffer_size),
            stack: Vec::new(),
            number: String::new(),
        }
    }

    /// The effective configuration.
    #[must_use]
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Number of containers opened and not yet closed.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Encodes one event.
    ///
    /// Completed segments become available through the `Iterator`
    /// implementation as the internal buffer fills up.
    pub fn push(&mut self, event: &Event) {
        let config = self.config;
        match event {
            Event::StartObject => {
                self.value_code(ValueCode::StartObject);
                self.stack.push(true);
            }
            Event::EndObject => {
                self.key_code(KeyCode::EndObject);
                self.stack.pop();
            }
            Event::StartArray => {
                self.value_code(ValueCode::StartArray);
                self.stack.push(false);
            }
            Event::EndArray => {
                self.value_code(ValueCode::EndArray);
                self.stack.pop();
            }
            Event::NullValue => self.value_code(ValueCode::Null),
            Event::TrueValue => self.value_code(ValueCode::True),
            Event::FalseValue => self.value_code(ValueCode::False),

            Event::KeyValue(key) if config.use_key_values => self.key_fragment(key, true),
            Event::KeyChunk(chunk) if !config.use_key_values => self.key_fragment(chunk, false),
            Event::EndKey if !config.use_key_values => self.key_fragment("", true),

            Event::StringValue(s) if config.use_string_values => self.string_fragment(s, true),
            Event::StringChunk(chunk) if !config.use_string_values => {
                self.string_fragment(chunk, false);
            }
            Event::EndString if !config.use_string_values => self.string_fragment("", true),

            Event::NumberValue(n) if config.use_number_values => self.number_value(n),
            Event::StartNumber if !config.use_number_values => self.number.clear(),
            Event::NumberChunk(chunk) if !config.use_number_values => self.number.push_str(chunk),
            Event::EndNumber if !config.use_number_values => {
                let text = core::mem::take(&mut self.number);
                self.number_value(&text);
            }

            // Starts carry nothing on the wire; the form not selected by the
            // configuration is discarded.
            Event::StartKey
            | Event::KeyChunk(_)
            | Event::EndKey
            | Event::KeyValue(_)
            | Event::StartString
            | Event::StringChunk(_)
            | Event::EndString
            | Event::StringValue(_)
            | Event::StartNumber
            | Event::NumberChunk(_)
            | Event::EndNumber
            | Event::NumberValue(_) => {}
        }
    }

    /// Encodes every event of `events`.
    pub fn extend<'a, I>(&mut self, events: I)
    where
        I: IntoIterator<Item = &'a Event>,
    {
        for event in events {
            self.push(event);
        }
    }

    #[must_use]
    /// Writes the end-of-stream sentinel, flushes the buffer, and returns an
    /// iterator over the remaining segments.
    pub fn finish(mut self) -> ClosedEncoder {
        // An unclosed object leaves the decoder in key context.
        if self.stack.last() == Some(&true) {
            self.key_code(KeyCode::Extension);
        } else {
            self.value_code(ValueCode::Extension);
        }
        self.buffer.code(EOF_OPERAND);
        self.buffer.finish();
        ClosedEncoder { encoder: self }
    }

    fn value_code(&mut self, code: ValueCode) {
        self.buffer.code(code.nibble());
    }

    fn key_code(&mut self, code: KeyCode) {
        self.buffer.code(code.nibble());
    }

    fn length(&mut self, len: usize) {
        let length = Length::for_len(len);
        self.buffer.code(length.nibble());
        if let Length::Field(width) = length {
            let bytes = (len as u64).to_le_bytes();
            self.buffer.write(&bytes[..usize::from(width)]);
        }
    }

    fn key_fragment(&mut self, fragment: &str, last: bool) {
        let len = fragment.len();
        if last && len <= SHORT_KEY_MAX {
            #[allow(clippy::cast_possible_truncation)]
            self.key_code(KeyCode::ShortKey(len as u8));
        } else {
            self.key_code(if last { KeyCode::KeyLast } else { KeyCode::KeyPart });
            self.length(len);
        }
        self.buffer.write(fragment.as_bytes());
    }

    fn string_fragment(&mut self, fragment: &str, last: bool) {
        self.value_code(if last {
            ValueCode::StringLast
        } else {
            ValueCode::StringPart
        });
        self.length(fragment.len());
        self.buffer.write(fragment.as_bytes());
    }

    fn number_value(&mut self, text: &str) {
        match NumberRepr::classify(text) {
            NumberRepr::Small(n) => {
                self.value_code(ValueCode::SmallInt);
                self.buffer.code(n);
            }
            NumberRepr::Unsigned(n) => {
                let width = unsigned_width(n);
                self.value_code(ValueCode::Unsigned);
                self.buffer.code(width - 1);
                self.buffer.write(&n.to_le_bytes()[..usize::from(width)]);
            }
            NumberRepr::Signed(n) => {
                let width = signed_width(n);
                self.value_code(ValueCode::Signed);
                self.buffer.code(width - 1);
                self.buffer.write(&n.to_le_bytes()[..usize::from(width)]);
            }
            NumberRepr::Float32(f) => {
                self.value_code(ValueCode::Float32);
                self.buffer.write(&f.to_le_bytes());
            }
            NumberRepr::Float64(f) => {
                self.value_code(ValueCode::Float64);
                self.buffer.write(&f.to_le_bytes());
            }
            NumberRepr::Text(text) => {
                self.value_code(ValueCode::NumberText);
                self.length(text.len());
                self.buffer.write(text.as_bytes());
            }
        }
    }
}
