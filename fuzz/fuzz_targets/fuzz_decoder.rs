#![no_main]
use arbitrary::{Arbitrary, Unstructured};
use jsonnib::{Decoder, DecoderOptions, EncoderOptions, Event, encode};
use libfuzzer_sys::fuzz_target;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value};

const HEADER: usize = 5; // 1 flag + 4-byte seed

#[derive(Debug)]
struct ArbitraryValue(Value);

impl<'a> Arbitrary<'a> for ArbitraryValue {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let node_type = u.choose_index(21)?;
        let value = match node_type {
            0 => Value::Null,
            1 => Value::Bool(u.arbitrary()?),
            2 => {
                let n: f64 = u.arbitrary()?;
                Value::Number(
                    serde_json::Number::from_f64(n).ok_or(arbitrary::Error::IncorrectFormat)?,
                )
            }
            3 => Value::Number(u.arbitrary::<i64>()?.into()),
            4..=10 => Value::String(u.arbitrary()?),
            11..=15 => {
                let elems: Vec<ArbitraryValue> = u.arbitrary()?;
                Value::Array(elems.into_iter().map(|v| v.0).collect())
            }
            16..=20 => {
                let m: Vec<(String, ArbitraryValue)> = u.arbitrary()?;
                Value::Object(Map::from_iter(m.into_iter().map(|(k, v)| (k, v.0))))
            }
            _ => Err(arbitrary::Error::IncorrectFormat)?,
        };
        Ok(ArbitraryValue(value))
    }
}

/// Packed events for `value`, the form a packed-only decoder reproduces.
fn packed_events(out: &mut Vec<Event>, value: &Value) {
    match value {
        Value::Null => out.push(Event::NullValue),
        Value::Bool(true) => out.push(Event::TrueValue),
        Value::Bool(false) => out.push(Event::FalseValue),
        Value::Number(n) => out.push(Event::NumberValue(n.to_string())),
        Value::String(s) => out.push(Event::StringValue(s.clone())),
        Value::Array(items) => {
            out.push(Event::StartArray);
            for item in items {
                packed_events(out, item);
            }
            out.push(Event::EndArray);
        }
        Value::Object(members) => {
            out.push(Event::StartObject);
            for (key, item) in members {
                out.push(Event::KeyValue(key.clone()));
                packed_events(out, item);
            }
            out.push(Event::EndObject);
        }
    }
}

/// Feed `bytes` in fragments whose sizes derive from `split_seed`.
fn decode_split(
    bytes: &[u8],
    split_seed: u32,
    options: DecoderOptions,
) -> Vec<Result<Event, jsonnib::DecodeError>> {
    let mut rng = SmallRng::seed_from_u64(u64::from(split_seed));
    let mut decoder = Decoder::new(options);
    let mut results = Vec::new();
    let mut rest = bytes;
    while !rest.is_empty() {
        let size = rng.random_range(0..=rest.len());
        let (head, tail) = rest.split_at(size);
        decoder.feed(head);
        results.extend(decoder.by_ref());
        rest = tail;
    }
    results.extend(decoder.finish());
    results
}

fn decoder(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }

    let flags = data[0];
    let split_seed = u32::from_le_bytes(data[1..HEADER].try_into().unwrap());
    let data = &data[HEADER..];

    if flags & 1 != 0 {
        // Arbitrary bytes: decoding must fail cleanly, never panic.
        let results = decode_split(data, split_seed, DecoderOptions {
            pack_values: Some(flags & 2 != 0),
            stream_values: Some(flags & 4 != 0),
            ..Default::default()
        });
        let errors = results.iter().filter(|r| r.is_err()).count();
        assert!(errors <= 1);
        return;
    }

    // Structured input: encode a random document and decode it back.
    let Ok(ArbitraryValue(value)) = ArbitraryValue::arbitrary(&mut Unstructured::new(data)) else {
        return;
    };
    let mut expected = Vec::new();
    packed_events(&mut expected, &value);

    let bytes = encode(&expected, EncoderOptions {
        use_values: Some(true),
        buffer_size: Some(usize::from(flags >> 1) * 64),
        ..Default::default()
    });
    let actual: Vec<Event> = decode_split(&bytes, split_seed, DecoderOptions {
        stream_values: Some(false),
        panic_on_error: true,
        ..Default::default()
    })
    .into_iter()
    .map(Result::unwrap)
    .collect();
    assert_eq!(actual, expected);
}

fuzz_target!(|data: &[u8]| decoder(data));
