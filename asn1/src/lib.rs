//! ASN.1 values decoded from DER.
//!
//! [`Element`] is the typed view the structure decoders (`kagi-pkix-types`,
//! `kagi-pkcs`, `kagi-x509`) match on. Only the universal types that appear
//! in certificates and key containers are modelled; anything else is kept as
//! [`Element::Unimplemented`] so that unknown extensions do not abort a
//! decode.

#![forbid(unsafe_code)]

use std::{fmt::Display, str::FromStr};

use chrono::NaiveDateTime;
use error::{Error, Result};
use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};
use kagi_der::{Der, PrimitiveTag, TAG_CONSTRUCTED, Tag, Tlv};
use num_bigint::{BigInt, Sign};
use num_traits::{Signed, ToPrimitive};

pub mod error;
mod string;
mod time;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ASN1Object {
    elements: Vec<Element>,
}

impl ASN1Object {
    pub fn new(elements: Vec<Element>) -> Self {
        ASN1Object { elements }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// The first top-level element, which is the whole structure for every
    /// DER blob this workspace reads.
    pub fn first(&self) -> Option<&Element> {
        self.elements.first()
    }
}

impl DecodableFrom<Der> for ASN1Object {}

impl Decoder<Der, ASN1Object> for Der {
    type Error = Error;

    fn decode(&self) -> Result<ASN1Object> {
        let elements = self
            .elements()
            .iter()
            .map(Element::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(ASN1Object { elements })
    }
}

impl EncodableTo<ASN1Object> for Der {}

impl Encoder<ASN1Object, Der> for ASN1Object {
    type Error = Error;

    fn encode(&self) -> Result<Der> {
        let tlvs = self
            .elements
            .iter()
            .map(Tlv::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Der::new(tlvs))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Boolean(bool),
    Integer(Integer),
    BitString(BitString),
    OctetString(OctetString),
    Null,
    ObjectIdentifier(ObjectIdentifier),
    UTF8String(String),
    Sequence(Vec<Element>),
    Set(Vec<Element>),
    PrintableString(String),
    T61String(String),
    IA5String(String),
    UTCTime(NaiveDateTime),
    GeneralizedTime(NaiveDateTime),
    UniversalString(String),
    BMPString(String),
    /// A context-specific tag.
    ///
    /// Constructed tags hold their single child, or a `Sequence` of the
    /// children when there are zero or several (IMPLICIT SET OF and
    /// friends). Primitive tags are IMPLICIT, so their content octets are
    /// kept as an `OctetString` for the schema-aware decoder to interpret.
    ContextSpecific {
        slot: u8,
        constructed: bool,
        element: Box<Element>,
    },
    Unimplemented(Tlv),
}

impl Element {
    /// Returns the text of any of the character string types.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Element::UTF8String(s)
            | Element::PrintableString(s)
            | Element::T61String(s)
            | Element::IA5String(s)
            | Element::UniversalString(s)
            | Element::BMPString(s) => Some(s),
            _ => None,
        }
    }

    /// Serializes this element back to DER.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        let tlv: Tlv = self.encode()?;
        Ok(tlv.to_bytes())
    }
}

fn data_of(tlv: &Tlv) -> Result<&[u8]> {
    tlv.data().ok_or_else(|| {
        Error::InvalidElement(format!("{:?} must be primitive", tlv.tag()))
    })
}

fn children(tlv: &Tlv) -> Result<Vec<Element>> {
    tlv.tlvs()
        .ok_or_else(|| Error::InvalidElement(format!("{:?} must be constructed", tlv.tag())))?
        .iter()
        .map(Element::try_from)
        .collect()
}

impl TryFrom<&Tlv> for Element {
    type Error = Error;

    fn try_from(tlv: &Tlv) -> Result<Self> {
        match tlv.tag() {
            Tag::Primitive(primitive_tag, raw) => {
                let constructed = raw & TAG_CONSTRUCTED == TAG_CONSTRUCTED;
                match primitive_tag {
                    PrimitiveTag::Sequence => Ok(Element::Sequence(children(tlv)?)),
                    PrimitiveTag::Set => Ok(Element::Set(children(tlv)?)),
                    _ if constructed => Ok(Element::Unimplemented(tlv.clone())),
                    PrimitiveTag::Boolean => match data_of(tlv)? {
                        [0x00] => Ok(Element::Boolean(false)),
                        [0xff] => Ok(Element::Boolean(true)),
                        _ => Err(Error::InvalidBoolean),
                    },
                    PrimitiveTag::Integer => {
                        let data = data_of(tlv)?;
                        if data.is_empty() {
                            return Err(Error::InvalidInteger("no content octets".to_string()));
                        }
                        Ok(Element::Integer(Integer::from(data)))
                    }
                    PrimitiveTag::BitString => {
                        Ok(Element::BitString(BitString::try_from(data_of(tlv)?)?))
                    }
                    PrimitiveTag::OctetString => {
                        Ok(Element::OctetString(OctetString::from(data_of(tlv)?)))
                    }
                    PrimitiveTag::Null => {
                        if data_of(tlv)?.is_empty() {
                            Ok(Element::Null)
                        } else {
                            Err(Error::InvalidElement("NULL with content".to_string()))
                        }
                    }
                    PrimitiveTag::ObjectIdentifier => Ok(Element::ObjectIdentifier(
                        ObjectIdentifier::try_from(data_of(tlv)?)?,
                    )),
                    PrimitiveTag::UTF8String => {
                        Ok(Element::UTF8String(string::decode_utf8(data_of(tlv)?)?))
                    }
                    PrimitiveTag::PrintableString => Ok(Element::PrintableString(
                        string::decode_ascii("PrintableString", data_of(tlv)?)?,
                    )),
                    PrimitiveTag::IA5String => Ok(Element::IA5String(string::decode_ascii(
                        "IA5String",
                        data_of(tlv)?,
                    )?)),
                    PrimitiveTag::T61String => {
                        Ok(Element::T61String(string::decode_latin1(data_of(tlv)?)))
                    }
                    PrimitiveTag::BMPString => {
                        Ok(Element::BMPString(string::decode_bmp(data_of(tlv)?)?))
                    }
                    PrimitiveTag::UniversalString => Ok(Element::UniversalString(
                        string::decode_universal(data_of(tlv)?)?,
                    )),
                    PrimitiveTag::UTCTime => {
                        Ok(Element::UTCTime(time::parse_utc_time(data_of(tlv)?)?))
                    }
                    PrimitiveTag::GeneralizedTime => Ok(Element::GeneralizedTime(
                        time::parse_generalized_time(data_of(tlv)?)?,
                    )),
                    PrimitiveTag::Unimplemented(_) => Ok(Element::Unimplemented(tlv.clone())),
                }
            }
            Tag::ContextSpecific { slot, constructed } => {
                let element = if *constructed {
                    let mut elements = children(tlv)?;
                    if elements.len() == 1 {
                        elements.remove(0)
                    } else {
                        Element::Sequence(elements)
                    }
                } else {
                    Element::OctetString(OctetString::from(data_of(tlv)?))
                };
                Ok(Element::ContextSpecific {
                    slot: *slot,
                    constructed: *constructed,
                    element: Box::new(element),
                })
            }
        }
    }
}

fn universal(tag: PrimitiveTag) -> Tag {
    Tag::Primitive(tag, u8::from(&tag))
}

impl TryFrom<&Element> for Tlv {
    type Error = Error;

    fn try_from(element: &Element) -> Result<Self> {
        let tlv = match element {
            Element::Boolean(b) => Tlv::new_primitive(
                universal(PrimitiveTag::Boolean),
                vec![if *b { 0xff } else { 0x00 }],
            ),
            Element::Integer(i) => Tlv::new_primitive(
                universal(PrimitiveTag::Integer),
                i.as_bigint().to_signed_bytes_be(),
            ),
            Element::BitString(bs) => {
                let mut data = Vec::with_capacity(bs.as_bytes().len() + 1);
                data.push(bs.unused_bits());
                data.extend_from_slice(bs.as_bytes());
                Tlv::new_primitive(universal(PrimitiveTag::BitString), data)
            }
            Element::OctetString(os) => {
                Tlv::new_primitive(universal(PrimitiveTag::OctetString), os.as_bytes().to_vec())
            }
            Element::Null => Tlv::new_primitive(universal(PrimitiveTag::Null), Vec::new()),
            Element::ObjectIdentifier(oid) => {
                Tlv::new_primitive(universal(PrimitiveTag::ObjectIdentifier), oid.to_der_content()?)
            }
            Element::UTF8String(s) => {
                Tlv::new_primitive(universal(PrimitiveTag::UTF8String), s.as_bytes().to_vec())
            }
            Element::PrintableString(s) => Tlv::new_primitive(
                universal(PrimitiveTag::PrintableString),
                s.as_bytes().to_vec(),
            ),
            Element::IA5String(s) => {
                Tlv::new_primitive(universal(PrimitiveTag::IA5String), s.as_bytes().to_vec())
            }
            Element::T61String(s) => Tlv::new_primitive(
                universal(PrimitiveTag::T61String),
                string::encode_latin1(s)?,
            ),
            Element::BMPString(s) => {
                Tlv::new_primitive(universal(PrimitiveTag::BMPString), string::encode_bmp(s))
            }
            Element::UniversalString(s) => Tlv::new_primitive(
                universal(PrimitiveTag::UniversalString),
                string::encode_universal(s),
            ),
            Element::UTCTime(dt) => Tlv::new_primitive(
                universal(PrimitiveTag::UTCTime),
                dt.format("%y%m%d%H%M%SZ").to_string().into_bytes(),
            ),
            Element::GeneralizedTime(dt) => Tlv::new_primitive(
                universal(PrimitiveTag::GeneralizedTime),
                dt.format("%Y%m%d%H%M%SZ").to_string().into_bytes(),
            ),
            Element::Sequence(elements) => Tlv::new_constructed(
                universal(PrimitiveTag::Sequence),
                elements.iter().map(Tlv::try_from).collect::<Result<_>>()?,
            ),
            Element::Set(elements) => Tlv::new_constructed(
                universal(PrimitiveTag::Set),
                elements.iter().map(Tlv::try_from).collect::<Result<_>>()?,
            ),
            Element::ContextSpecific {
                slot,
                constructed,
                element,
            } => {
                let tag = Tag::ContextSpecific {
                    slot: *slot,
                    constructed: *constructed,
                };
                match (constructed, element.as_ref()) {
                    (false, Element::OctetString(os)) => {
                        Tlv::new_primitive(tag, os.as_bytes().to_vec())
                    }
                    (false, _) => {
                        return Err(Error::InvalidContextSpecific {
                            slot: *slot,
                            msg: "implicit tag must wrap raw content".to_string(),
                        });
                    }
                    (true, inner) => Tlv::new_constructed(tag, vec![Tlv::try_from(inner)?]),
                }
            }
            Element::Unimplemented(tlv) => tlv.clone(),
        };
        Ok(tlv)
    }
}

impl EncodableTo<Element> for Tlv {}

impl Encoder<Element, Tlv> for Element {
    type Error = Error;

    fn encode(&self) -> Result<Tlv> {
        Tlv::try_from(self)
    }
}

/// ASN.1 INTEGER of arbitrary size.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Integer {
    inner: BigInt,
}

impl Integer {
    pub fn as_bigint(&self) -> &BigInt {
        &self.inner
    }

    pub fn to_u32(&self) -> Option<u32> {
        self.inner.to_u32()
    }

    pub fn to_u64(&self) -> Option<u64> {
        self.inner.to_u64()
    }

    pub fn to_i64(&self) -> Option<i64> {
        self.inner.to_i64()
    }

    pub fn is_positive(&self) -> bool {
        self.inner.is_positive()
    }

    /// Number of significant bits of the magnitude.
    pub fn bits(&self) -> u64 {
        self.inner.bits()
    }

    /// Big-endian magnitude without the DER sign octet.
    pub fn to_unsigned_bytes(&self) -> Vec<u8> {
        self.inner.to_bytes_be().1
    }
}

impl From<&[u8]> for Integer {
    fn from(value: &[u8]) -> Self {
        Integer {
            inner: BigInt::from_signed_bytes_be(value),
        }
    }
}

impl From<u64> for Integer {
    fn from(value: u64) -> Self {
        Integer {
            inner: BigInt::from(value),
        }
    }
}

impl From<BigInt> for Integer {
    fn from(inner: BigInt) -> Self {
        Integer { inner }
    }
}

impl TryFrom<&Integer> for i64 {
    type Error = Error;

    fn try_from(value: &Integer) -> Result<Self> {
        value
            .inner
            .to_i64()
            .ok_or_else(|| Error::InvalidInteger("value out of range for i64".to_string()))
    }
}

impl Display for Integer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl std::fmt::LowerHex for Integer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (sign, bytes) = self.inner.to_bytes_be();
        if sign == Sign::Minus {
            write!(f, "-")?;
        }
        let hex = bytes
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(":");
        write!(f, "{}", hex)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectIdentifier {
    inner: Vec<u64>,
}

impl ObjectIdentifier {
    pub fn arcs(&self) -> &[u64] {
        &self.inner
    }

    fn to_der_content(&self) -> Result<Vec<u8>> {
        let (first, second) = match self.inner.as_slice() {
            [first, second, ..] if *first <= 2 && (*first == 2 || *second < 40) => {
                (*first, *second)
            }
            _ => return Err(Error::InvalidObjectIdentifier(self.to_string())),
        };
        let mut out = Vec::new();
        push_base128(first * 40 + second, &mut out);
        for arc in &self.inner[2..] {
            push_base128(*arc, &mut out);
        }
        Ok(out)
    }
}

fn push_base128(mut value: u64, out: &mut Vec<u8>) {
    let mut encoded = vec![(value & 0x7f) as u8];
    value >>= 7;
    while value > 0 {
        encoded.push((value & 0x7f) as u8 | 0x80);
        value >>= 7;
    }
    out.extend(encoded.iter().rev());
}

impl TryFrom<&[u8]> for ObjectIdentifier {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self> {
        if value.is_empty() {
            return Err(Error::InvalidObjectIdentifier("no content octets".to_string()));
        }
        if value.last().is_some_and(|b| b & 0x80 == 0x80) {
            return Err(Error::InvalidObjectIdentifier(
                "truncated subidentifier".to_string(),
            ));
        }
        let mut subidentifiers = Vec::new();
        let mut current = 0u64;
        for b in value {
            if current > (u64::MAX >> 7) {
                return Err(Error::InvalidObjectIdentifier(
                    "subidentifier overflows u64".to_string(),
                ));
            }
            current = (current << 7) | (*b & 0x7f) as u64;
            if b & 0x80 == 0 {
                subidentifiers.push(current);
                current = 0;
            }
        }
        // the first subidentifier packs the first two arcs
        let first = subidentifiers[0];
        let mut inner = match first {
            0..40 => vec![0, first],
            40..80 => vec![1, first - 40],
            _ => vec![2, first - 80],
        };
        inner.extend_from_slice(&subidentifiers[1..]);
        Ok(ObjectIdentifier { inner })
    }
}

impl Display for ObjectIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dotted = self
            .inner
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{}", dotted)
    }
}

impl FromStr for ObjectIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let inner = s
            .split('.')
            .map(|arc| {
                arc.parse::<u64>()
                    .map_err(|e| Error::InvalidObjectIdentifier(format!("{}: {}", s, e)))
            })
            .collect::<Result<Vec<u64>>>()?;
        if inner.len() < 2 {
            return Err(Error::InvalidObjectIdentifier(format!(
                "{}: needs at least two arcs",
                s
            )));
        }
        Ok(ObjectIdentifier { inner })
    }
}

impl PartialEq<&str> for ObjectIdentifier {
    fn eq(&self, other: &&str) -> bool {
        let mut arcs = other.split('.');
        self.inner
            .iter()
            .all(|n| arcs.next().and_then(|a| a.parse::<u64>().ok()) == Some(*n))
            && arcs.next().is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitString {
    unused: u8,
    data: Vec<u8>,
}

impl BitString {
    pub fn new(unused: u8, data: Vec<u8>) -> Self {
        BitString { unused, data }
    }

    pub fn unused_bits(&self) -> u8 {
        self.unused
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn bit_len(&self) -> usize {
        self.data.len() * 8 - self.unused as usize
    }
}

impl TryFrom<&[u8]> for BitString {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self> {
        let (unused, data) = value
            .split_first()
            .ok_or_else(|| Error::InvalidBitString("missing unused-bits octet".to_string()))?;
        if *unused > 7 || (data.is_empty() && *unused != 0) {
            return Err(Error::InvalidBitString(format!(
                "{} unused bits over {} octets",
                unused,
                data.len()
            )));
        }
        Ok(BitString {
            unused: *unused,
            data: data.to_vec(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OctetString {
    inner: Vec<u8>,
}

impl OctetString {
    pub fn as_bytes(&self) -> &[u8] {
        &self.inner
    }
}

impl From<Vec<u8>> for OctetString {
    fn from(inner: Vec<u8>) -> Self {
        OctetString { inner }
    }
}

impl From<&[u8]> for OctetString {
    fn from(value: &[u8]) -> Self {
        OctetString {
            inner: value.to_vec(),
        }
    }
}
