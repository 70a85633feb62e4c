//! # kagi
//!
//! Conversion traits shared by every layer of the kagi credential loader.
//!
//! PEM text is turned into usable key material one step at a time:
//!
//! ```text
//! PEM text → PemBlock → Vec<u8> → Der → ASN1Object → Certificate / PrivateKeyInfo
//! ```
//!
//! Each arrow is a [`decoder::Decoder`] implementation living in the crate
//! that owns the destination type. The reverse direction, used when a value
//! has to be serialized again (for example an attribute value rendered as
//! `#hex` in an RFC 2253 name), goes through [`encoder::Encoder`].
//!
//! ```ignore
//! use kagi::decoder::Decoder;
//! use kagi_asn1::ASN1Object;
//! use kagi_der::Der;
//!
//! let der: Der = vec![0x30, 0x00].decode()?;
//! let object: ASN1Object = der.decode()?;
//! ```

#![forbid(unsafe_code)]

pub mod decoder;
pub mod encoder;
