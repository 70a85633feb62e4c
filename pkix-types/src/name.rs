//! Distinguished names, [RFC 5280 Section 4.1.2.4](https://datatracker.ietf.org/doc/html/rfc5280#section-4.1.2.4)
//!
//! ```asn1
//! Name ::= CHOICE { rdnSequence  RDNSequence }
//!
//! RDNSequence ::= SEQUENCE OF RelativeDistinguishedName
//!
//! RelativeDistinguishedName ::= SET SIZE (1..MAX) OF AttributeTypeAndValue
//!
//! AttributeTypeAndValue ::= SEQUENCE {
//!     type     AttributeType,
//!     value    AttributeValue
//! }
//! ```
//!
//! [`Name::to_rfc2253`] renders the string form used as trust-store alias.
//! It follows the JDK's `X500Principal.RFC2253` output rather than the
//! loosest reading of RFC 2253, so aliases match those of Java key stores
//! built from the same certificates.

use std::fmt;

use kagi::decoder::{DecodableFrom, Decoder};
use kagi_asn1::{Element, ObjectIdentifier};

use crate::error::{Error, Result};

/// Characters escaped with a backslash wherever they appear.
const SPECIALS: &[char] = &[',', '=', '+', '<', '>', '#', ';', '"', '\\'];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Name {
    rdn_sequence: Vec<RelativeDistinguishedName>,
}

impl Name {
    pub fn new(rdn_sequence: Vec<RelativeDistinguishedName>) -> Self {
        Self { rdn_sequence }
    }

    /// RDNs in encoded order, most significant first.
    pub fn rdn_sequence(&self) -> &[RelativeDistinguishedName] {
        &self.rdn_sequence
    }

    pub fn is_empty(&self) -> bool {
        self.rdn_sequence.is_empty()
    }

    /// First value of the given attribute type, if it is a string.
    pub fn attribute(&self, oid: &str) -> Option<&str> {
        self.rdn_sequence
            .iter()
            .flat_map(|rdn| rdn.attributes())
            .find(|attr| attr.attribute_type == oid)
            .and_then(|attr| attr.value.as_str())
    }

    pub fn common_name(&self) -> Option<&str> {
        self.attribute(AttributeTypeAndValue::OID_COMMON_NAME)
    }

    /// RFC 2253 string: RDNs in reverse of their encoded order, separated by
    /// `,` with no spaces.
    pub fn to_rfc2253(&self) -> String {
        self.rdn_sequence
            .iter()
            .rev()
            .map(RelativeDistinguishedName::to_rfc2253)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_rfc2253())
    }
}

impl DecodableFrom<Element> for Name {}

impl Decoder<Element, Name> for Element {
    type Error = Error;

    fn decode(&self) -> Result<Name> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence("Name"));
        };
        let rdn_sequence = elements
            .iter()
            .map(|element| element.decode())
            .collect::<Result<Vec<RelativeDistinguishedName>>>()?;
        Ok(Name { rdn_sequence })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeDistinguishedName {
    attributes: Vec<AttributeTypeAndValue>,
}

impl RelativeDistinguishedName {
    pub fn new(attributes: Vec<AttributeTypeAndValue>) -> Self {
        Self { attributes }
    }

    pub fn attributes(&self) -> &[AttributeTypeAndValue] {
        &self.attributes
    }

    /// Values joined with `+`, in encoded order.
    pub fn to_rfc2253(&self) -> String {
        self.attributes
            .iter()
            .map(AttributeTypeAndValue::to_rfc2253)
            .collect::<Vec<_>>()
            .join("+")
    }
}

impl DecodableFrom<Element> for RelativeDistinguishedName {}

impl Decoder<Element, RelativeDistinguishedName> for Element {
    type Error = Error;

    fn decode(&self) -> Result<RelativeDistinguishedName> {
        let Element::Set(elements) = self else {
            return Err(Error::ExpectedSet("RelativeDistinguishedName"));
        };
        if elements.is_empty() {
            return Err(Error::InvalidElementCount {
                context: "RelativeDistinguishedName",
                expected: "at least 1",
                actual: 0,
            });
        }
        let attributes = elements
            .iter()
            .map(|element| element.decode())
            .collect::<Result<Vec<AttributeTypeAndValue>>>()?;
        Ok(RelativeDistinguishedName { attributes })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeTypeAndValue {
    pub attribute_type: ObjectIdentifier,
    value: Element,
    value_der: Vec<u8>,
}

impl AttributeTypeAndValue {
    pub const OID_COMMON_NAME: &'static str = "2.5.4.3";
    pub const OID_COUNTRY_NAME: &'static str = "2.5.4.6";
    pub const OID_LOCALITY_NAME: &'static str = "2.5.4.7";
    pub const OID_STATE_OR_PROVINCE_NAME: &'static str = "2.5.4.8";
    pub const OID_STREET_ADDRESS: &'static str = "2.5.4.9";
    pub const OID_ORGANIZATION_NAME: &'static str = "2.5.4.10";
    pub const OID_ORGANIZATIONAL_UNIT_NAME: &'static str = "2.5.4.11";
    pub const OID_DOMAIN_COMPONENT: &'static str = "0.9.2342.19200300.100.1.25";
    pub const OID_USER_ID: &'static str = "0.9.2342.19200300.100.1.1";

    pub fn new(attribute_type: ObjectIdentifier, value: Element) -> Result<Self> {
        let value_der = value.to_der()?;
        Ok(Self {
            attribute_type,
            value,
            value_der,
        })
    }

    pub fn value(&self) -> &Element {
        &self.value
    }

    /// RFC 2253 keyword for the attribute type, when it has one.
    pub fn keyword(&self) -> Option<&'static str> {
        let keyword = match self.attribute_type.to_string().as_str() {
            Self::OID_COMMON_NAME => "CN",
            Self::OID_COUNTRY_NAME => "C",
            Self::OID_LOCALITY_NAME => "L",
            Self::OID_STATE_OR_PROVINCE_NAME => "ST",
            Self::OID_STREET_ADDRESS => "STREET",
            Self::OID_ORGANIZATION_NAME => "O",
            Self::OID_ORGANIZATIONAL_UNIT_NAME => "OU",
            Self::OID_DOMAIN_COMPONENT => "DC",
            Self::OID_USER_ID => "UID",
            _ => return None,
        };
        Some(keyword)
    }

    /// `type=value`, with keyword types and string values escaped, and
    /// everything else as `dotted.oid=#hex` of the value's DER.
    pub fn to_rfc2253(&self) -> String {
        match (self.keyword(), rfc2253_text(&self.value)) {
            (Some(keyword), Some(text)) => format!("{}={}", keyword, escape(text)),
            _ => {
                let hex = self
                    .value_der
                    .iter()
                    .map(|b| format!("{:02x}", b))
                    .collect::<String>();
                format!("{}=#{}", self.attribute_type, hex)
            }
        }
    }
}

impl DecodableFrom<Element> for AttributeTypeAndValue {}

impl Decoder<Element, AttributeTypeAndValue> for Element {
    type Error = Error;

    fn decode(&self) -> Result<AttributeTypeAndValue> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence("AttributeTypeAndValue"));
        };
        match elements.as_slice() {
            [Element::ObjectIdentifier(oid), value] => {
                AttributeTypeAndValue::new(oid.clone(), value.clone())
            }
            [_, _] => Err(Error::TypeMismatch {
                context: "AttributeTypeAndValue",
                expected: "OBJECT IDENTIFIER for type",
            }),
            _ => Err(Error::InvalidElementCount {
                context: "AttributeTypeAndValue",
                expected: "2",
                actual: elements.len(),
            }),
        }
    }
}

/// String types rendered as text. UniversalString is not among them and
/// falls back to hex.
fn rfc2253_text(value: &Element) -> Option<&str> {
    match value {
        Element::UTF8String(s)
        | Element::PrintableString(s)
        | Element::T61String(s)
        | Element::IA5String(s)
        | Element::BMPString(s) => Some(s),
        _ => None,
    }
}

fn escape(value: &str) -> String {
    let chars = value.chars().collect::<Vec<_>>();
    let edge = |c: &&char| matches!(**c, ' ' | '\r');
    let leading = chars.iter().take_while(edge).count();
    let trailing = if leading == chars.len() {
        0
    } else {
        chars.iter().rev().take_while(edge).count()
    };

    let mut out = String::with_capacity(value.len() + 4);
    for (i, c) in chars.iter().enumerate() {
        if i < leading || i >= chars.len() - trailing {
            out.push('\\');
            out.push(*c);
        } else if SPECIALS.contains(c) {
            out.push('\\');
            out.push(*c);
        } else if *c == '\0' {
            out.push_str("\\00");
        } else {
            out.push(*c);
        }
    }
    out
}
