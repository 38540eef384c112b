//! A streaming binary codec for JSON event streams.
//!
//! JSON documents are represented as a flat stream of SAX-like [`Event`]s:
//! container starts and ends, literals, and keys, strings and numbers
//! delivered either *packed* (one `*Value` event) or *streamed*
//! (`Start*` / `*Chunk` / `End*`). The [`Encoder`] turns such a stream into a
//! compact byte format built from 4-bit codes, and the [`Decoder`] turns the
//! bytes back into events.
//!
//! Both halves are incremental. The encoder emits fixed-capacity segments as
//! its buffer fills, and the decoder accepts fragments split at any byte
//! boundary and resumes exactly where the previous fragment stopped.
//!
//! # Examples
//!
//! ```rust
//! use jsonnib::{DecoderOptions, EncoderOptions, Event, decode, encode};
//!
//! let events = [
//!     Event::StartObject,
//!     Event::KeyValue("pi".into()),
//!     Event::NumberValue("3.14".into()),
//!     Event::EndObject,
//! ];
//! let bytes = encode(
//!     &events,
//!     EncoderOptions {
//!         use_values: Some(true),
//!         ..Default::default()
//!     },
//! );
//! let decoded = decode(
//!     &bytes,
//!     DecoderOptions {
//!         stream_values: Some(false),
//!         ..Default::default()
//!     },
//! )
//! .unwrap();
//! assert_eq!(decoded, events);
//! ```
#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod buffer;
mod decoder;
mod encoder;
mod error;
mod event;
mod format;
mod number;
mod options;

#[cfg(test)]
mod tests;

use alloc::vec::Vec;

pub use decoder::{ClosedDecoder, Decoder};
pub use encoder::{ClosedEncoder, Encoder};
pub use error::{DecodeError, FormatError};
pub use event::{Event, EventKind};
pub use options::{
    DEFAULT_BUFFER_SIZE, DecoderOptions, Delivery, EncoderConfig, EncoderOptions,
    MIN_BUFFER_SIZE, ScalarDelivery,
};

/// Encodes a complete event stream into a single byte vector, end-of-stream
/// sentinel included.
pub fn encode<'a, I>(events: I, options: EncoderOptions) -> Vec<u8>
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut encoder = Encoder::new(options);
    encoder.extend(events);
    encoder.finish().flatten().collect()
}

/// Decodes a complete byte stream.
///
/// # Errors
///
/// Returns the first [`DecodeError`] encountered; events decoded before it
/// are discarded.
pub fn decode(bytes: &[u8], options: DecoderOptions) -> Result<Vec<Event>, DecodeError> {
    let mut decoder = Decoder::new(options);
    decoder.feed(bytes);
    decoder.finish().collect()
}
