//! Response decoder module
//!
//! Turns a decoded JSON response body into the list of records found at a
//! stream's records path.

mod decoders;

pub use decoders::JsonDecoder;
