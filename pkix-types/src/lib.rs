//! PKIX types shared by certificates and key containers.
//!
//! - [`AlgorithmIdentifier`] with typed [`AlgorithmParameter`]s (named EC
//!   curves, DSA domain parameters)
//! - [`Name`] and its RFC 2253 string form
//! - [`SubjectPublicKeyInfo`]

#![forbid(unsafe_code)]

use kagi::decoder::Decoder;
use kagi_asn1::{ASN1Object, Element};
use kagi_der::Der;

pub mod algorithm;
pub mod error;
pub mod name;
mod oid_name;
pub mod subject_public_key_info;

pub use algorithm::AlgorithmIdentifier;
pub use algorithm::AlgorithmParameters;
pub use algorithm::parameters::{
    AlgorithmParameter, DsaParameters, NamedCurve, RawAlgorithmParameter,
};
pub use error::{Error, Result};
pub use name::{AttributeTypeAndValue, Name, RelativeDistinguishedName};
pub use oid_name::OidName;
pub use subject_public_key_info::SubjectPublicKeyInfo;

/// Parses DER bytes and returns their single top-level element.
pub fn decode_der_to_element(bytes: &[u8]) -> Result<Element> {
    let der: Der = bytes.decode()?;
    let object: ASN1Object = der.decode()?;
    match object.elements() {
        [element] => Ok(element.clone()),
        [] => Err(Error::EmptyInput),
        elements => Err(Error::InvalidElementCount {
            context: "DER input",
            expected: "1",
            actual: elements.len(),
        }),
    }
}
