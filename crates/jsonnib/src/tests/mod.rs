pub(crate) mod utils;

mod property_roundtrip;
