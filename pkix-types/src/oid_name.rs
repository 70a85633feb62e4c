/// Conventional short name of a well-known OID, e.g. `secp256r1` for
/// `1.2.840.10045.3.1.7`.
pub trait OidName {
    fn oid_name(&self) -> Option<&'static str>;
}
