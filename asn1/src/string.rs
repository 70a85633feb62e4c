//! Content octets of the character string types.

use crate::error::{Error, Result};

pub(crate) fn decode_utf8(data: &[u8]) -> Result<String> {
    String::from_utf8(data.to_vec()).map_err(|e| Error::InvalidString {
        kind: "UTF8String",
        msg: e.to_string(),
    })
}

pub(crate) fn decode_ascii(kind: &'static str, data: &[u8]) -> Result<String> {
    if !data.is_ascii() {
        return Err(Error::InvalidString {
            kind,
            msg: "non-ASCII content".to_string(),
        });
    }
    Ok(data.iter().map(|b| *b as char).collect())
}

// TeletexString content is taken as ISO 8859-1.
pub(crate) fn decode_latin1(data: &[u8]) -> String {
    data.iter().map(|b| *b as char).collect()
}

pub(crate) fn encode_latin1(s: &str) -> Result<Vec<u8>> {
    s.chars()
        .map(|c| {
            u8::try_from(u32::from(c)).map_err(|_| Error::InvalidString {
                kind: "T61String",
                msg: format!("{:?} is outside ISO 8859-1", c),
            })
        })
        .collect()
}

pub(crate) fn decode_bmp(data: &[u8]) -> Result<String> {
    if data.len() % 2 != 0 {
        return Err(Error::InvalidString {
            kind: "BMPString",
            msg: "odd number of octets".to_string(),
        });
    }
    let units = data
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect::<Vec<_>>();
    String::from_utf16(&units).map_err(|e| Error::InvalidString {
        kind: "BMPString",
        msg: e.to_string(),
    })
}

pub(crate) fn encode_bmp(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(u16::to_be_bytes).collect()
}

pub(crate) fn decode_universal(data: &[u8]) -> Result<String> {
    if data.len() % 4 != 0 {
        return Err(Error::InvalidString {
            kind: "UniversalString",
            msg: "length is not a multiple of four".to_string(),
        });
    }
    data.chunks_exact(4)
        .map(|quad| {
            let code = u32::from_be_bytes([quad[0], quad[1], quad[2], quad[3]]);
            char::from_u32(code).ok_or_else(|| Error::InvalidString {
                kind: "UniversalString",
                msg: format!("invalid code point {:#x}", code),
            })
        })
        .collect()
}

pub(crate) fn encode_universal(s: &str) -> Vec<u8> {
    s.chars().flat_map(|c| u32::from(c).to_be_bytes()).collect()
}
