//! Encoding half of the conversion pattern.
//!
//! Mirrors [`crate::decoder`]: [`EncodableTo<T>`] marks the destination and
//! [`Encoder<T, E>`] is implemented on the value being encoded.

/// Converts `self` (of type `T`) into `E`.
pub trait Encoder<T, E: EncodableTo<T>> {
    type Error;

    fn encode(&self) -> Result<E, Self::Error>;
}

/// Marker for "`Self` can be produced by encoding a `T`".
pub trait EncodableTo<T> {}
