//! Decoding half of the conversion pattern.
//!
//! A conversion from `T` to `D` needs two impls: the marker
//! [`DecodableFrom<T>`] on the destination and [`Decoder<T, D>`] on the
//! source. The marker keeps unrelated pairs from type-checking, so
//! `bytes.decode()` only compiles where a layer actually exists.
//!
//! ```no_run
//! use kagi::decoder::{DecodableFrom, Decoder};
//!
//! struct Payload(String);
//! struct Blob(Vec<u8>);
//!
//! impl DecodableFrom<Payload> for Blob {}
//!
//! impl Decoder<Payload, Blob> for Payload {
//!     type Error = std::convert::Infallible;
//!
//!     fn decode(&self) -> Result<Blob, Self::Error> {
//!         Ok(Blob(self.0.as_bytes().to_vec()))
//!     }
//! }
//! ```

/// Converts `self` (of type `T`) into `D`.
///
/// Implemented on the source type. When a source decodes into several
/// destinations the caller picks one with a type annotation or with the
/// fully qualified form `Decoder::<T, D>::decode(&value)`.
pub trait Decoder<T, D: DecodableFrom<T>> {
    type Error;

    fn decode(&self) -> Result<D, Self::Error>;
}

/// Marker for "`Self` can be decoded from `T`".
pub trait DecodableFrom<T> {}
