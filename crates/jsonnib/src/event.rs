//! Events consumed by the encoder and produced by the decoder.
//!
//! An `Event` is one step of a SAX-style walk over a JSON value tree. Scalars
//! (keys, strings and numbers) can be delivered *packed*, as a single
//! `*Value` event once the scalar is complete, or *streamed*, as a
//! `Start*` / `*Chunk` / `End*` sequence. Numbers are always carried as
//! decimal text so that integers beyond 64 bits and arbitrary-precision
//! decimals survive unchanged.
//!
//! # Examples
//!
//! ```
//! use jsonnib::{Event, EventKind};
//!
//! let event = Event::NumberValue("12.5".into());
//! assert_eq!(event.kind(), EventKind::NumberValue);
//! assert_eq!(event.text(), Some("12.5"));
//! assert_eq!(EventKind::NumberValue.to_string(), "numberValue");
//! ```
use alloc::string::String;
use core::fmt;

/// A single parse event.
///
/// Structural events carry no payload; scalar events carry a UTF-8 fragment
/// (`*Chunk`) or a complete value (`*Value`).
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[cfg_attr(
    any(test, feature = "serde"),
    serde(tag = "kind", content = "value", rename_all = "camelCase")
)]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Event {
    /// Opens an object.
    StartObject,
    /// Closes the innermost object.
    EndObject,
    /// Opens an array.
    StartArray,
    /// Closes the innermost array.
    EndArray,
    /// A `null` literal.
    NullValue,
    /// A `true` literal.
    TrueValue,
    /// A `false` literal.
    FalseValue,
    /// Starts a streamed object key.
    StartKey,
    /// A fragment of a streamed object key.
    KeyChunk(String),
    /// Ends a streamed object key.
    EndKey,
    /// A complete object key.
    KeyValue(String),
    /// Starts a streamed string.
    StartString,
    /// A fragment of a streamed string.
    StringChunk(String),
    /// Ends a streamed string.
    EndString,
    /// A complete string.
    StringValue(String),
    /// Starts a streamed number.
    StartNumber,
    /// A fragment of a streamed number's decimal text.
    NumberChunk(String),
    /// Ends a streamed number.
    EndNumber,
    /// A complete number as decimal text.
    NumberValue(String),
}

/// The payload-free discriminant of an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum EventKind {
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    NullValue,
    TrueValue,
    FalseValue,
    StartKey,
    KeyChunk,
    EndKey,
    KeyValue,
    StartString,
    StringChunk,
    EndString,
    StringValue,
    StartNumber,
    NumberChunk,
    EndNumber,
    NumberValue,
}

impl EventKind {
    /// The camelCase name used for this kind in serialized event streams.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::StartObject => "startObject",
            Self::EndObject => "endObject",
            Self::StartArray => "startArray",
            Self::EndArray => "endArray",
            Self::NullValue => "nullValue",
            Self::TrueValue => "trueValue",
            Self::FalseValue => "falseValue",
            Self::StartKey => "startKey",
            Self::KeyChunk => "keyChunk",
            Self::EndKey => "endKey",
            Self::KeyValue => "keyValue",
            Self::StartString => "startString",
            Self::StringChunk => "stringChunk",
            Self::EndString => "endString",
            Self::StringValue => "stringValue",
            Self::StartNumber => "startNumber",
            Self::NumberChunk => "numberChunk",
            Self::EndNumber => "endNumber",
            Self::NumberValue => "numberValue",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Event {
    /// Returns the kind of this event.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::StartObject => EventKind::StartObject,
            Self::EndObject => EventKind::EndObject,
            Self::StartArray => EventKind::StartArray,
            Self::EndArray => EventKind::EndArray,
            Self::NullValue => EventKind::NullValue,
            Self::TrueValue => EventKind::TrueValue,
            Self::FalseValue => EventKind::FalseValue,
            Self::StartKey => EventKind::StartKey,
            Self::KeyChunk(_) => EventKind::KeyChunk,
            Self::EndKey => EventKind::EndKey,
            Self::KeyValue(_) => EventKind::KeyValue,
            Self::StartString => EventKind::StartString,
            Self::StringChunk(_) => EventKind::StringChunk,
            Self::EndString => EventKind::EndString,
            Self::StringValue(_) => EventKind::StringValue,
            Self::StartNumber => EventKind::StartNumber,
            Self::NumberChunk(_) => EventKind::NumberChunk,
            Self::EndNumber => EventKind::EndNumber,
            Self::NumberValue(_) => EventKind::NumberValue,
        }
    }

    /// Returns the text payload of a scalar chunk or value event.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::KeyChunk(s)
            | Self::KeyValue(s)
            | Self::StringChunk(s)
            | Self::StringValue(s)
            | Self::NumberChunk(s)
            | Self::NumberValue(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.text() {
            Some(text) => write!(f, "{} {text:?}", self.kind()),
            None => fmt::Display::fmt(&self.kind(), f),
        }
    }
}

/// The three scalar kinds that support packed and streamed delivery.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scalar {
    Key,
    String,
    Number,
}

impl Scalar {
    pub(crate) fn start(self) -> Event {
        match self {
            Self::Key => Event::StartKey,
            Self::String => Event::StartString,
            Self::Number => Event::StartNumber,
        }
    }

    pub(crate) fn chunk(self, fragment: String) -> Event {
        match self {
            Self::Key => Event::KeyChunk(fragment),
            Self::String => Event::StringChunk(fragment),
            Self::Number => Event::NumberChunk(fragment),
        }
    }

    pub(crate) fn end(self) -> Event {
        match self {
            Self::Key => Event::EndKey,
            Self::String => Event::EndString,
            Self::Number => Event::EndNumber,
        }
    }

    pub(crate) fn value(self, value: String) -> Event {
        match self {
            Self::Key => Event::KeyValue(value),
            Self::String => Event::StringValue(value),
            Self::Number => Event::NumberValue(value),
        }
    }
}
