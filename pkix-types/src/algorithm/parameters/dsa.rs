//! DSA domain parameters, [RFC 3279 Section 2.3.2](https://datatracker.ietf.org/doc/html/rfc3279#section-2.3.2)
//!
//! ```asn1
//! Dss-Parms ::= SEQUENCE {
//!     p   INTEGER,
//!     q   INTEGER,
//!     g   INTEGER
//! }
//! ```

use kagi_asn1::{Element, Integer};

use super::{AlgorithmParameter, RawAlgorithmParameter};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DsaParameters {
    /// Prime modulus
    pub p: Integer,
    /// Prime divisor of p-1
    pub q: Integer,
    /// Generator
    pub g: Integer,
}

impl AlgorithmParameter for DsaParameters {
    fn parse(raw: &RawAlgorithmParameter) -> Result<Self> {
        let Element::Sequence(elements) = raw.element() else {
            return Err(Error::ExpectedSequence("Dss-Parms"));
        };
        let [Element::Integer(p), Element::Integer(q), Element::Integer(g)] = elements.as_slice()
        else {
            return Err(Error::InvalidElementCount {
                context: "Dss-Parms",
                expected: "3 INTEGER",
                actual: elements.len(),
            });
        };
        if !(p.is_positive() && q.is_positive() && g.is_positive()) {
            return Err(Error::TypeMismatch {
                context: "Dss-Parms",
                expected: "positive p, q and g",
            });
        }
        Ok(DsaParameters {
            p: p.clone(),
            q: q.clone(),
            g: g.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn int(n: u64) -> Element {
        Element::Integer(Integer::from(n))
    }

    #[test]
    fn test_parse() {
        let raw = RawAlgorithmParameter::new(Element::Sequence(vec![int(23), int(11), int(4)]));
        let params = DsaParameters::parse(&raw).unwrap();
        assert_eq!(params.q, Integer::from(11u64));
    }

    #[rstest]
    #[case::two_integers(Element::Sequence(vec![int(23), int(11)]))]
    #[case::not_integer(Element::Sequence(vec![int(23), Element::Null, int(4)]))]
    #[case::zero_generator(Element::Sequence(vec![int(23), int(11), int(0)]))]
    #[case::curve_oid(Element::Null)]
    fn test_parse_invalid(#[case] element: Element) {
        assert!(DsaParameters::parse(&RawAlgorithmParameter::new(element)).is_err());
    }
}
