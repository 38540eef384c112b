#![allow(missing_docs)]
#![allow(dead_code)]

use jsonnib::Event;

pub const ORIGINAL: &str = r#"
{
    "moderation": {
        "decision": "allow",
        "reason": null
    },
    "request": {
        "filename": "example.rs",
        "language": "rust",
        "options": {
            "opt_level": 2,
            "features": [
                "serde",
                "tokio"
            ]
        }
    },
    "snippets": [
        "fn main() {}",
        "println!(\"hi\")"
    ],
    "metrics": {
        "latency_ms": 12.5,
        "retries": -3,
        "bytes": 1099511627776,
        "ratio": 0.3333333333333333,
        "exact": 1.10
    },
    "matrix": [
        [
            "a"
        ],
        []
    ],
    "greeting": "héllo wörld, ünïcödé 😀",
    "flags": [true, false, null]
}"#;

/// Converts a JSON document into the events an upstream parser reports for
/// it: every key, string and number both streamed in `chunk`-character pieces
/// and packed.
pub fn upstream_events(value: &serde_json::Value, chunk: usize) -> Vec<Event> {
    let mut out = Vec::new();
    push_events(&mut out, value, chunk);
    out
}

/// The events a decoder with default options reports for `value` when the
/// scalars arrived in a single piece.
pub fn decoded_events(value: &serde_json::Value) -> Vec<Event> {
    upstream_events(value, usize::MAX)
}

fn chunks(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|c| c.iter().collect()).collect()
}

fn push_events(out: &mut Vec<Event>, value: &serde_json::Value, chunk: usize) {
    use serde_json::Value;

    match value {
        Value::Null => out.push(Event::NullValue),
        Value::Bool(true) => out.push(Event::TrueValue),
        Value::Bool(false) => out.push(Event::FalseValue),
        Value::Number(n) => {
            let text = n.to_string();
            out.push(Event::StartNumber);
            out.extend(chunks(&text, chunk).into_iter().map(Event::NumberChunk));
            out.push(Event::EndNumber);
            out.push(Event::NumberValue(text));
        }
        Value::String(s) => {
            out.push(Event::StartString);
            out.extend(chunks(s, chunk).into_iter().map(Event::StringChunk));
            out.push(Event::EndString);
            out.push(Event::StringValue(s.clone()));
        }
        Value::Array(items) => {
            out.push(Event::StartArray);
            for item in items {
                push_events(out, item, chunk);
            }
            out.push(Event::EndArray);
        }
        Value::Object(members) => {
            out.push(Event::StartObject);
            for (key, item) in members {
                out.push(Event::StartKey);
                out.extend(chunks(key, chunk).into_iter().map(Event::KeyChunk));
                out.push(Event::EndKey);
                out.push(Event::KeyValue(key.clone()));
                push_events(out, item, chunk);
            }
            out.push(Event::EndObject);
        }
    }
}

/// Rebuilds JSON documents from packed events.
pub fn assemble(events: &[Event]) -> Vec<serde_json::Value> {
    use serde_json::{Map, Value};

    enum Frame {
        Array(Vec<Value>),
        Object(Map<String, Value>, Option<String>),
    }

    let mut roots = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    for event in events {
        let value = match event {
            Event::StartArray => {
                stack.push(Frame::Array(Vec::new()));
                continue;
            }
            Event::StartObject => {
                stack.push(Frame::Object(Map::new(), None));
                continue;
            }
            Event::KeyValue(key) => {
                if let Some(Frame::Object(_, pending)) = stack.last_mut() {
                    *pending = Some(key.clone());
                }
                continue;
            }
            Event::EndArray | Event::EndObject => match stack.pop() {
                Some(Frame::Array(items)) => Value::Array(items),
                Some(Frame::Object(map, _)) => Value::Object(map),
                None => panic!("unbalanced {event}"),
            },
            Event::NullValue => Value::Null,
            Event::TrueValue => Value::Bool(true),
            Event::FalseValue => Value::Bool(false),
            Event::StringValue(s) => Value::String(s.clone()),
            Event::NumberValue(n) => serde_json::from_str(n).unwrap(),
            _ => continue,
        };
        match stack.last_mut() {
            Some(Frame::Array(items)) => items.push(value),
            Some(Frame::Object(map, pending)) => {
                map.insert(pending.take().unwrap(), value);
            }
            None => roots.push(value),
        }
    }
    roots
}
