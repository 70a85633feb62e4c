//! UTCTime and GeneralizedTime content octets (RFC 5280 section 4.1.2.5).

use chrono::NaiveDateTime;

use crate::error::{Error, Result};

fn as_text(data: &[u8]) -> Result<&str> {
    let text = std::str::from_utf8(data).map_err(|e| Error::InvalidTime(e.to_string()))?;
    text.strip_suffix('Z')
        .ok_or_else(|| Error::InvalidTime(format!("{} is not in UTC", text)))
}

pub(crate) fn parse_utc_time(data: &[u8]) -> Result<NaiveDateTime> {
    let body = as_text(data)?;
    let year: u32 = body
        .get(..2)
        .and_then(|yy| yy.parse().ok())
        .ok_or_else(|| Error::InvalidTime(format!("bad UTCTime {}", body)))?;
    // YY >= 50 is 19YY, otherwise 20YY
    let century = if year >= 50 { "19" } else { "20" };
    NaiveDateTime::parse_from_str(&format!("{}{}", century, body), "%Y%m%d%H%M%S")
        .map_err(|e| Error::InvalidTime(format!("{}: {}", body, e)))
}

pub(crate) fn parse_generalized_time(data: &[u8]) -> Result<NaiveDateTime> {
    let body = as_text(data)?;
    let format = if body.contains('.') {
        "%Y%m%d%H%M%S%.f"
    } else {
        "%Y%m%d%H%M%S"
    };
    NaiveDateTime::parse_from_str(body, format)
        .map_err(|e| Error::InvalidTime(format!("{}: {}", body, e)))
}
