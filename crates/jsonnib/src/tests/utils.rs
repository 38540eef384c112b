use alloc::{
    string::{String, ToString},
    vec,
    vec::Vec,
};

use crate::{
    Decoder, DecoderOptions, Delivery, Encoder, EncoderOptions, Event, ScalarDelivery,
    event::Scalar,
};

/// A JSON document as the event stream sees it: numbers stay decimal text and
/// objects keep their key order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value {
    Null,
    Bool(bool),
    Number(String),
    String(String),
    Array(Vec<Value>),
    Object(Vec<(String, Value)>),
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.to_string()),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

/// Chunk sizes, in characters, used when streaming each scalar kind. `None`
/// sends the whole text as one chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Chunking {
    pub keys: Option<usize>,
    pub strings: Option<usize>,
    pub numbers: Option<usize>,
}

/// Delivers every scalar both packed and streamed, like an upstream parser
/// that reports everything it knows.
pub(crate) const FULL: Delivery = Delivery {
    keys: ScalarDelivery {
        packed: true,
        streamed: true,
    },
    strings: ScalarDelivery {
        packed: true,
        streamed: true,
    },
    numbers: ScalarDelivery {
        packed: true,
        streamed: true,
    },
};

/// Splits `text` into chunks of `size` characters; empty text has no chunks.
pub(crate) fn chunks(text: &str, size: Option<usize>) -> Vec<String> {
    if text.is_empty() {
        return vec![];
    }
    let Some(size) = size else {
        return vec![text.to_string()];
    };
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

fn scalar_events(
    out: &mut Vec<Event>,
    scalar: Scalar,
    text: &str,
    mode: ScalarDelivery,
    size: Option<usize>,
) {
    if mode.streamed {
        out.push(scalar.start());
        out.extend(chunks(text, size).into_iter().map(|c| scalar.chunk(c)));
        out.push(scalar.end());
    }
    if mode.packed {
        out.push(scalar.value(text.to_string()));
    }
}

/// Appends the events that describe `value`.
pub(crate) fn write_events(
    out: &mut Vec<Event>,
    value: &Value,
    delivery: &Delivery,
    chunking: Chunking,
) {
    match value {
        Value::Null => out.push(Event::NullValue),
        Value::Bool(true) => out.push(Event::TrueValue),
        Value::Bool(false) => out.push(Event::FalseValue),
        Value::Number(n) => {
            scalar_events(out, Scalar::Number, n, delivery.numbers, chunking.numbers);
        }
        Value::String(s) => {
            scalar_events(out, Scalar::String, s, delivery.strings, chunking.strings);
        }
        Value::Array(items) => {
            out.push(Event::StartArray);
            for item in items {
                write_events(out, item, delivery, chunking);
            }
            out.push(Event::EndArray);
        }
        Value::Object(members) => {
            out.push(Event::StartObject);
            for (key, item) in members {
                scalar_events(out, Scalar::Key, key, delivery.keys, chunking.keys);
                write_events(out, item, delivery, chunking);
            }
            out.push(Event::EndObject);
        }
    }
}

/// The events describing a sequence of top-level values.
pub(crate) fn events_of(values: &[Value], delivery: &Delivery, chunking: Chunking) -> Vec<Event> {
    let mut out = Vec::new();
    for value in values {
        write_events(&mut out, value, delivery, chunking);
    }
    out
}

/// The chunking the decoder reproduces after the encoder consumed events
/// chunked as `upstream`: packed forms and numbers arrive whole.
pub(crate) fn chunking_after(options: EncoderOptions, upstream: Chunking) -> Chunking {
    let config = options.config();
    Chunking {
        keys: if config.use_key_values {
            None
        } else {
            upstream.keys
        },
        strings: if config.use_string_values {
            None
        } else {
            upstream.strings
        },
        numbers: None,
    }
}

pub(crate) fn encode_events(events: &[Event], options: EncoderOptions) -> Vec<u8> {
    let mut encoder = Encoder::new(options);
    encoder.extend(events);
    encoder.finish().flatten().collect()
}

/// Decodes `bytes` fed in fragments whose sizes are derived from `splits`;
/// leftover bytes go in a final fragment. Panics on any decode error.
pub(crate) fn decode_split(bytes: &[u8], splits: &[usize], options: DecoderOptions) -> Vec<Event> {
    let mut decoder = Decoder::new(DecoderOptions {
        panic_on_error: true,
        ..options
    });
    let mut events = Vec::new();
    let mut rest = bytes;
    for &split in splits {
        if rest.is_empty() {
            break;
        }
        let (head, tail) = rest.split_at(split % (rest.len() + 1));
        decoder.feed(head);
        events.extend(decoder.by_ref().map(Result::unwrap));
        rest = tail;
    }
    decoder.feed(rest);
    events.extend(decoder.finish().map(Result::unwrap));
    events
}

/// Encodes `values` streamed in chunks of `upstream`, decodes the bytes, and
/// returns what the decoder produced alongside what it should have produced.
pub(crate) fn roundtrip(
    values: &[Value],
    encoder: EncoderOptions,
    decoder: DecoderOptions,
    upstream: Chunking,
    splits: &[usize],
) -> (Vec<Event>, Vec<Event>) {
    let source = events_of(values, &FULL, upstream);
    let bytes = encode_events(&source, encoder);
    let actual = decode_split(&bytes, splits, decoder);
    let expected = events_of(values, &decoder.delivery(), chunking_after(encoder, upstream));
    (actual, expected)
}

#[test]
fn chunks_respect_char_boundaries() {
    assert_eq!(chunks("", Some(2)), Vec::<String>::new());
    assert_eq!(chunks("abc", None), vec!["abc"]);
    assert_eq!(chunks("aé😀b", Some(2)), vec!["aé", "😀b"]);
    assert_eq!(chunks("abc", Some(0)), vec!["a", "b", "c"]);
}

#[test]
fn events_follow_delivery() {
    let value = Value::from(serde_json::json!({"k": "vv"}));
    let packed = Delivery {
        keys: ScalarDelivery {
            packed: true,
            streamed: false,
        },
        ..FULL
    };
    let events = events_of(&[value], &packed, Chunking {
        strings: Some(1),
        ..Default::default()
    });
    assert_eq!(
        events,
        vec![
            Event::StartObject,
            Event::KeyValue("k".into()),
            Event::StartString,
            Event::StringChunk("v".into()),
            Event::StringChunk("v".into()),
            Event::EndString,
            Event::StringValue("vv".into()),
            Event::EndObject,
        ]
    );
}
