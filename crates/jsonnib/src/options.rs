use crate::event::Scalar;

/// Configuration options for the [`Decoder`](crate::Decoder).
///
/// Each scalar kind (keys, strings, numbers) can be delivered *packed*, as a
/// single `*Value` event, and/or *streamed*, as `Start*` / `*Chunk` / `End*`
/// events. Every flag is optional: an unset flag falls back to the matching
/// aggregate (`pack_values` / `stream_values`), and then to `true`.
///
/// Streaming is forced on for any scalar kind whose packing is disabled, so a
/// value can never be silently dropped.
///
/// # Examples
///
/// ```rust
/// use jsonnib::{DecoderOptions, ScalarDelivery};
///
/// let options = DecoderOptions {
///     pack_values: Some(false),
///     stream_values: Some(false),
///     pack_numbers: Some(true),
///     ..Default::default()
/// };
/// let delivery = options.delivery();
/// // Streaming was forced back on for keys and strings.
/// assert_eq!(delivery.keys, ScalarDelivery { packed: false, streamed: true });
/// assert_eq!(delivery.numbers, ScalarDelivery { packed: true, streamed: false });
/// ```
///
/// # Default
///
/// All flags default to `None`, which delivers every scalar both packed and
/// streamed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Sets `pack_keys`, `pack_strings` and `pack_numbers` at once.
    pub pack_values: Option<bool>,
    /// Whether to emit `KeyValue` events.
    pub pack_keys: Option<bool>,
    /// Whether to emit `StringValue` events.
    pub pack_strings: Option<bool>,
    /// Whether to emit `NumberValue` events.
    pub pack_numbers: Option<bool>,

    /// Sets `stream_keys`, `stream_strings` and `stream_numbers` at once.
    pub stream_values: Option<bool>,
    /// Whether to emit `StartKey` / `KeyChunk` / `EndKey` events.
    pub stream_keys: Option<bool>,
    /// Whether to emit `StartString` / `StringChunk` / `EndString` events.
    pub stream_strings: Option<bool>,
    /// Whether to emit `StartNumber` / `NumberChunk` / `EndNumber` events.
    pub stream_numbers: Option<bool>,

    #[cfg(any(test, feature = "fuzzing"))]
    /// Panic on format errors instead of returning them.
    ///
    /// Enabled only in test builds to produce backtraces on decode failures.
    pub panic_on_error: bool,
}

/// How one scalar kind is delivered by the decoder.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarDelivery {
    /// Emit a single `*Value` event once the scalar is complete.
    pub packed: bool,
    /// Emit `Start*` / `*Chunk` / `End*` events as fragments arrive.
    pub streamed: bool,
}

impl ScalarDelivery {
    fn resolve(packed: bool, streamed: bool) -> Self {
        Self {
            packed,
            streamed: streamed || !packed,
        }
    }
}

/// The normalized, immutable delivery configuration of a decoder.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    /// Delivery of object keys.
    pub keys: ScalarDelivery,
    /// Delivery of string values.
    pub strings: ScalarDelivery,
    /// Delivery of number values.
    pub numbers: ScalarDelivery,
}

impl Delivery {
    pub(crate) fn of(&self, scalar: Scalar) -> ScalarDelivery {
        match scalar {
            Scalar::Key => self.keys,
            Scalar::String => self.strings,
            Scalar::Number => self.numbers,
        }
    }
}

impl Default for Delivery {
    fn default() -> Self {
        DecoderOptions::default().delivery()
    }
}

impl DecoderOptions {
    /// Resolves the optional flags into the effective delivery modes.
    #[must_use]
    pub fn delivery(&self) -> Delivery {
        let pack = |specific: Option<bool>| specific.or(self.pack_values).unwrap_or(true);
        let stream = |specific: Option<bool>| specific.or(self.stream_values).unwrap_or(true);

        Delivery {
            keys: ScalarDelivery::resolve(pack(self.pack_keys), stream(self.stream_keys)),
            strings: ScalarDelivery::resolve(pack(self.pack_strings), stream(self.stream_strings)),
            numbers: ScalarDelivery::resolve(pack(self.pack_numbers), stream(self.stream_numbers)),
        }
    }
}

/// Smallest accepted encoder buffer size.
pub const MIN_BUFFER_SIZE: usize = 1024;

/// Encoder buffer size used when none is given.
pub const DEFAULT_BUFFER_SIZE: usize = 0x10000;

/// Configuration options for the [`Encoder`](crate::Encoder).
///
/// The `use_*` flags select which form of each scalar the encoder consumes.
/// When set, the encoder encodes the packed `*Value` event and discards the
/// streamed `Start*` / `*Chunk` / `End*` events for that kind; when unset, it
/// encodes the streamed events and ignores the packed one.
///
/// # Examples
///
/// ```rust
/// use jsonnib::EncoderOptions;
///
/// let config = EncoderOptions {
///     use_values: Some(true),
///     use_number_values: Some(false),
///     buffer_size: Some(16),
///     ..Default::default()
/// }
/// .config();
/// assert!(config.use_key_values);
/// assert!(!config.use_number_values);
/// assert_eq!(config.buffer_size, 1024);
/// ```
///
/// # Default
///
/// All `use_*` flags default to `false` and the buffer holds 64 KiB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncoderOptions {
    /// Sets `use_key_values`, `use_string_values` and `use_number_values` at
    /// once.
    pub use_values: Option<bool>,
    /// Encode `KeyValue` events instead of streamed keys.
    pub use_key_values: Option<bool>,
    /// Encode `StringValue` events instead of streamed strings.
    pub use_string_values: Option<bool>,
    /// Encode `NumberValue` events instead of streamed numbers.
    pub use_number_values: Option<bool>,
    /// Size of the output buffer; values below 1024 are raised to 1024.
    pub buffer_size: Option<usize>,
}

/// The normalized, immutable configuration of an encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct EncoderConfig {
    /// Consume `KeyValue` events.
    pub use_key_values: bool,
    /// Consume `StringValue` events.
    pub use_string_values: bool,
    /// Consume `NumberValue` events.
    pub use_number_values: bool,
    /// Capacity of the output buffer in bytes.
    pub buffer_size: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        EncoderOptions::default().config()
    }
}

impl EncoderOptions {
    /// Resolves the optional flags into the effective configuration.
    #[must_use]
    pub fn config(&self) -> EncoderConfig {
        let used = |specific: Option<bool>| specific.or(self.use_values).unwrap_or(false);

        EncoderConfig {
            use_key_values: used(self.use_key_values),
            use_string_values: used(self.use_string_values),
            use_number_values: used(self.use_number_values),
            buffer_size: self
                .buffer_size
                .unwrap_or(DEFAULT_BUFFER_SIZE)
                .max(MIN_BUFFER_SIZE),
        }
    }
}
