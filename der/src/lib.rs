//! DER (X.690 Distinguished Encoding Rules) tag-length-value layer.
//!
//! Everything above this crate works on [`Tlv`] trees. Universal SEQUENCE
//! and SET, and every constructed context-specific tag, are parsed into
//! nested TLVs; all other tags keep their content octets as raw data.

#![forbid(unsafe_code)]

use error::Error;
use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};
use nom::error::ErrorKind;
use nom::{IResult, Parser};

pub mod error;

pub const TAG_CONSTRUCTED: u8 = 0x20;
pub const TAG_CONTEXT_SPECIFIC: u8 = 0x80;
const TAG_CLASS_MASK: u8 = 0xc0;
const TAG_NUMBER_MASK: u8 = 0x1f;

// Nesting deeper than this is rejected instead of recursing further.
const MAX_DEPTH: usize = 32;

/// A sequence of top-level TLVs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Der {
    elements: Vec<Tlv>,
}

impl Der {
    pub fn new(elements: Vec<Tlv>) -> Self {
        Der { elements }
    }

    pub fn elements(&self) -> &[Tlv] {
        &self.elements
    }

    fn parse(mut input: &[u8]) -> Result<Self, Error> {
        let mut elements = Vec::new();
        while !input.is_empty() {
            let (rest, tlv) = Tlv::parse(input, 0)?;
            input = rest;
            elements.push(tlv);
        }
        Ok(Der { elements })
    }
}

impl DecodableFrom<Vec<u8>> for Der {}

impl Decoder<Vec<u8>, Der> for Vec<u8> {
    type Error = Error;

    fn decode(&self) -> Result<Der, Self::Error> {
        Der::parse(self)
    }
}

impl<'a> DecodableFrom<&'a [u8]> for Der {}

impl<'a> Decoder<&'a [u8], Der> for &'a [u8] {
    type Error = Error;

    fn decode(&self) -> Result<Der, Self::Error> {
        Der::parse(self)
    }
}

impl EncodableTo<Der> for Vec<u8> {}

impl Encoder<Der, Vec<u8>> for Der {
    type Error = Error;

    fn encode(&self) -> Result<Vec<u8>, Self::Error> {
        let mut out = Vec::new();
        for tlv in &self.elements {
            tlv.write_to(&mut out);
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PrimitiveTag {
    Boolean,
    Integer,
    BitString,
    OctetString,
    Null,
    ObjectIdentifier,
    UTF8String,
    Sequence,
    Set,
    PrintableString,
    T61String,
    IA5String,
    UTCTime,
    GeneralizedTime,
    UniversalString,
    BMPString,
    Unimplemented(u8),
}

impl From<u8> for PrimitiveTag {
    fn from(value: u8) -> Self {
        if value & TAG_CLASS_MASK != 0 {
            return PrimitiveTag::Unimplemented(value);
        }
        match value & TAG_NUMBER_MASK {
            0x01 => PrimitiveTag::Boolean,
            0x02 => PrimitiveTag::Integer,
            0x03 => PrimitiveTag::BitString,
            0x04 => PrimitiveTag::OctetString,
            0x05 => PrimitiveTag::Null,
            0x06 => PrimitiveTag::ObjectIdentifier,
            0x0c => PrimitiveTag::UTF8String,
            0x10 => PrimitiveTag::Sequence,
            0x11 => PrimitiveTag::Set,
            0x13 => PrimitiveTag::PrintableString,
            0x14 => PrimitiveTag::T61String,
            0x16 => PrimitiveTag::IA5String,
            0x17 => PrimitiveTag::UTCTime,
            0x18 => PrimitiveTag::GeneralizedTime,
            0x1c => PrimitiveTag::UniversalString,
            0x1e => PrimitiveTag::BMPString,
            _ => PrimitiveTag::Unimplemented(value),
        }
    }
}

impl From<&PrimitiveTag> for u8 {
    fn from(tag: &PrimitiveTag) -> Self {
        match tag {
            PrimitiveTag::Boolean => 0x01,
            PrimitiveTag::Integer => 0x02,
            PrimitiveTag::BitString => 0x03,
            PrimitiveTag::OctetString => 0x04,
            PrimitiveTag::Null => 0x05,
            PrimitiveTag::ObjectIdentifier => 0x06,
            PrimitiveTag::UTF8String => 0x0c,
            PrimitiveTag::Sequence => 0x10 | TAG_CONSTRUCTED,
            PrimitiveTag::Set => 0x11 | TAG_CONSTRUCTED,
            PrimitiveTag::PrintableString => 0x13,
            PrimitiveTag::T61String => 0x14,
            PrimitiveTag::IA5String => 0x16,
            PrimitiveTag::UTCTime => 0x17,
            PrimitiveTag::GeneralizedTime => 0x18,
            PrimitiveTag::UniversalString => 0x1c,
            PrimitiveTag::BMPString => 0x1e,
            PrimitiveTag::Unimplemented(raw) => *raw,
        }
    }
}

/// Identifier octet, split into what the upper layers dispatch on.
///
/// Universal, application and private class tags are `Primitive` (the raw
/// identifier byte is kept next to the decoded tag); context-specific tags
/// carry their slot number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Primitive(PrimitiveTag, u8),
    ContextSpecific { slot: u8, constructed: bool },
}

impl Tag {
    pub fn is_constructed(&self) -> bool {
        match self {
            Tag::Primitive(_, raw) => raw & TAG_CONSTRUCTED == TAG_CONSTRUCTED,
            Tag::ContextSpecific { constructed, .. } => *constructed,
        }
    }
}

impl From<u8> for Tag {
    fn from(value: u8) -> Self {
        if value & TAG_CLASS_MASK == TAG_CONTEXT_SPECIFIC {
            Tag::ContextSpecific {
                slot: value & TAG_NUMBER_MASK,
                constructed: value & TAG_CONSTRUCTED == TAG_CONSTRUCTED,
            }
        } else {
            Tag::Primitive(PrimitiveTag::from(value), value)
        }
    }
}

impl From<&Tag> for u8 {
    fn from(tag: &Tag) -> Self {
        match tag {
            Tag::Primitive(_, raw) => *raw,
            Tag::ContextSpecific { slot, constructed } => {
                let mut value = TAG_CONTEXT_SPECIFIC | (slot & TAG_NUMBER_MASK);
                if *constructed {
                    value |= TAG_CONSTRUCTED;
                }
                value
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Tlv(Vec<Tlv>),
    Data(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    tag: Tag,
    length: usize,
    value: Value,
}

impl Tlv {
    pub fn new_primitive(tag: Tag, data: Vec<u8>) -> Self {
        Tlv {
            tag,
            length: data.len(),
            value: Value::Data(data),
        }
    }

    pub fn new_constructed(tag: Tag, tlvs: Vec<Tlv>) -> Self {
        let length = tlvs.iter().map(Tlv::encoded_len).sum();
        Tlv {
            tag,
            length,
            value: Value::Tlv(tlvs),
        }
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Length of the content octets.
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn data(&self) -> Option<&[u8]> {
        match &self.value {
            Value::Data(data) => Some(data),
            Value::Tlv(_) => None,
        }
    }

    pub fn tlvs(&self) -> Option<&[Tlv]> {
        match &self.value {
            Value::Tlv(tlvs) => Some(tlvs),
            Value::Data(_) => None,
        }
    }

    /// Number of bytes this TLV occupies once serialized.
    pub fn encoded_len(&self) -> usize {
        1 + length_octets(self.length) + self.length
    }

    /// Serializes this TLV, including its identifier and length octets.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.push(u8::from(&self.tag));
        write_length(self.length, out);
        match &self.value {
            Value::Data(data) => out.extend_from_slice(data),
            Value::Tlv(tlvs) => tlvs.iter().for_each(|tlv| tlv.write_to(out)),
        }
    }

    fn parse(input: &[u8], depth: usize) -> IResult<&[u8], Tlv> {
        if depth > MAX_DEPTH {
            return Err(nom::Err::Failure(nom::error::Error::new(
                input,
                ErrorKind::TooLarge,
            )));
        }
        let (input, tag) = parse_tag(input)?;
        let (input, length) = parse_length(input)?;
        let (input, mut data) = take_bytes(input, length)?;

        if nests(&tag) {
            let mut tlvs = Vec::new();
            while !data.is_empty() {
                let (rest, tlv) = Self::parse(data, depth + 1)?;
                data = rest;
                tlvs.push(tlv);
            }
            return Ok((
                input,
                Tlv {
                    tag,
                    length,
                    value: Value::Tlv(tlvs),
                },
            ));
        }

        Ok((
            input,
            Tlv {
                tag,
                length,
                value: Value::Data(data.to_vec()),
            },
        ))
    }
}

// Constructed universal strings are BER only, so just SEQUENCE, SET and
// constructed context-specific tags are descended into.
fn nests(tag: &Tag) -> bool {
    match tag {
        Tag::Primitive(PrimitiveTag::Sequence | PrimitiveTag::Set, raw) => {
            raw & TAG_CONSTRUCTED == TAG_CONSTRUCTED
        }
        Tag::ContextSpecific { constructed, .. } => *constructed,
        Tag::Primitive(_, _) => false,
    }
}

fn parse_u8(input: &[u8]) -> IResult<&[u8], u8> {
    nom::number::complete::be_u8(input)
}

fn take_bytes(input: &[u8], count: usize) -> IResult<&[u8], &[u8]> {
    nom::bytes::complete::take(count).parse(input)
}

fn parse_tag(input: &[u8]) -> IResult<&[u8], Tag> {
    let (rest, n) = parse_u8(input)?;
    if n & TAG_NUMBER_MASK == TAG_NUMBER_MASK {
        // high-tag-number form never appears in the structures handled here
        return Err(nom::Err::Error(nom::error::Error::new(input, ErrorKind::Tag)));
    }
    Ok((rest, Tag::from(n)))
}

fn parse_length(input: &[u8]) -> IResult<&[u8], usize> {
    let (rest, n) = parse_u8(input)?;
    if n & 0x80 == 0 {
        return Ok((rest, n as usize));
    }
    // long form: the low 7 bits count the length octets that follow
    let count = (n & 0x7f) as usize;
    if count == 0 {
        // indefinite length is BER only
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::LengthValue,
        )));
    }
    if count > std::mem::size_of::<usize>() {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::TooLarge,
        )));
    }
    let (rest, bytes) = take_bytes(rest, count)?;
    let length = bytes.iter().fold(0usize, |acc, b| (acc << 8) | *b as usize);
    Ok((rest, length))
}

fn length_octets(length: usize) -> usize {
    if length < 0x80 {
        1
    } else {
        1 + (usize::BITS - length.leading_zeros()).div_ceil(8) as usize
    }
}

fn write_length(length: usize, out: &mut Vec<u8>) {
    if length < 0x80 {
        out.push(length as u8);
        return;
    }
    let bytes = length.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    out.push(0x80 | (bytes.len() - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::integer(0x02, Tag::Primitive(PrimitiveTag::Integer, 0x02))]
    #[case::sequence(0x30, Tag::Primitive(PrimitiveTag::Sequence, 0x30))]
    #[case::set(0x31, Tag::Primitive(PrimitiveTag::Set, 0x31))]
    #[case::bmp_string(0x1e, Tag::Primitive(PrimitiveTag::BMPString, 0x1e))]
    #[case::explicit_slot0(0xa0, Tag::ContextSpecific { slot: 0, constructed: true })]
    #[case::implicit_slot1(0x81, Tag::ContextSpecific { slot: 1, constructed: false })]
    #[case::application(0x41, Tag::Primitive(PrimitiveTag::Unimplemented(0x41), 0x41))]
    fn test_parse_tag(#[case] input: u8, #[case] expected: Tag) {
        let (_, actual) = parse_tag(&[input]).unwrap();
        assert_eq!(expected, actual);
        assert_eq!(input, u8::from(&actual));
    }

    #[test]
    fn test_parse_tag_rejects_high_tag_number_form() {
        assert!(parse_tag(&[0x1f, 0x81, 0x00]).is_err());
    }

    #[rstest]
    #[case::short(vec![0x02], 0x02)]
    #[case::short_max(vec![0x7f], 0x7f)]
    #[case::long_one_octet(vec![0x81, 0x80], 0x80)]
    #[case::long_two_octets(vec![0x82, 0x02, 0x10], 256 * 0x02 + 0x10)]
    #[case::long_three_octets(vec![0x83, 0x01, 0x00, 0x00], 256 * 256)]
    fn test_parse_length(#[case] input: Vec<u8>, #[case] expected: usize) {
        let (_, actual) = parse_length(&input).unwrap();
        assert_eq!(expected, actual);

        let mut encoded = Vec::new();
        write_length(expected, &mut encoded);
        assert_eq!(input, encoded);
    }

    #[test]
    fn test_parse_length_rejects_indefinite_form() {
        assert!(parse_length(&[0x80]).is_err());
    }

    #[test]
    fn test_decode_nested_sequence() {
        let input = vec![
            0x30, 0x0b, 0x02, 0x01, 0x07, 0x30, 0x06, 0x05, 0x00, 0x04, 0x02, 0xca, 0xfe,
        ];
        let der: Der = input.decode().unwrap();

        assert_eq!(der.elements().len(), 1);
        let outer = &der.elements()[0];
        let children = outer.tlvs().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].data(), Some(&[0x07][..]));
        let inner = children[1].tlvs().unwrap();
        assert_eq!(
            inner[0].tag(),
            &Tag::Primitive(PrimitiveTag::Null, 0x05)
        );
        assert_eq!(inner[1].data(), Some(&[0xca, 0xfe][..]));

        let encoded: Vec<u8> = der.encode().unwrap();
        assert_eq!(input, encoded);
    }

    #[test]
    fn test_decode_context_specific_constructed() {
        let input: &[u8] = &[0xa0, 0x03, 0x02, 0x01, 0x02];
        let der: Der = input.decode().unwrap();
        let tlv = &der.elements()[0];

        assert_eq!(
            tlv.tag(),
            &Tag::ContextSpecific {
                slot: 0,
                constructed: true
            }
        );
        assert_eq!(tlv.tlvs().unwrap()[0].data(), Some(&[0x02][..]));
    }

    #[rstest]
    #[case::truncated_content(vec![0x04, 0x05, 0x01, 0x02])]
    #[case::truncated_nested(vec![0x30, 0x03, 0x02, 0x05, 0x01])]
    #[case::missing_length(vec![0x30])]
    fn test_decode_malformed(#[case] input: Vec<u8>) {
        let result: Result<Der, Error> = input.decode();
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_rejects_excessive_nesting() {
        let mut input = vec![0x05, 0x00];
        for _ in 0..(MAX_DEPTH + 2) {
            let mut wrapped = vec![0x30, input.len() as u8];
            wrapped.extend_from_slice(&input);
            input = wrapped;
        }
        let result: Result<Der, Error> = input.decode();
        assert_eq!(result, Err(Error::Parser(ErrorKind::TooLarge)));
    }

    #[test]
    fn test_long_form_round_trip() {
        let content = vec![0xab; 300];
        let tlv = Tlv::new_primitive(Tag::from(0x04), content.clone());
        let bytes = tlv.to_bytes();

        assert_eq!(&bytes[..4], &[0x04, 0x82, 0x01, 0x2c]);
        assert_eq!(tlv.encoded_len(), bytes.len());
        let der: Der = bytes.decode().unwrap();
        assert_eq!(der.elements()[0].data(), Some(content.as_slice()));
    }
}
