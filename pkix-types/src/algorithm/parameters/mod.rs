//! Typed views of AlgorithmIdentifier parameters.
//!
//! - [RFC 3279](https://datatracker.ietf.org/doc/html/rfc3279): DSA
//! - [RFC 5480](https://datatracker.ietf.org/doc/html/rfc5480): named curves

use kagi_asn1::Element;

use crate::error::Result;

pub mod dsa;
pub mod ec;

pub use dsa::DsaParameters;
pub use ec::NamedCurve;

pub trait AlgorithmParameter: Sized {
    fn parse(raw: &RawAlgorithmParameter) -> Result<Self>;
}

/// Parameters kept as the undecoded element until a caller asks for a
/// specific [`AlgorithmParameter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAlgorithmParameter {
    element: Element,
}

impl RawAlgorithmParameter {
    pub fn new(element: Element) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }
}
