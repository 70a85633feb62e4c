use std::fs;
use std::path::{Path, PathBuf};

use kagi_credstore::{
    ErrorKind, KEY_ALIAS, KeyFamily, Password, StoreConfig, build_key_store_from_pem, build_trust_store,
    load_key_store, load_private_key, load_private_key_file, load_public_key, load_public_key_file,
    load_trust_store, read_certificate_chain, read_certificate_chain_file,
};
use rstest::rstest;
use tempfile::TempDir;

const CA_SUBJECT: &str = "CN=Kagi Test Root CA,O=Kagi Test,C=JP";
const LEAF_SUBJECT: &str = "CN=localhost,OU=Platform,O=Example\\, Inc.,ST=Tokyo,C=JP";
const EC_SUBJECT: &str =
    "1.2.840.113549.1.9.1=#160f6f7073406578616d706c652e6f7267,CN=node-1+UID=kagi,DC=example,DC=org";

fn testdata(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../testdata").join(name)
}

fn fixture(name: &str) -> String {
    fs::read_to_string(testdata(name)).unwrap()
}

fn changeit() -> Password {
    Password::from("changeit")
}

#[rstest]
#[case::none(&[], vec![])]
#[case::one(&["ca.pem"], vec![CA_SUBJECT])]
#[case::two(&["leaf.pem", "ca.pem"], vec![LEAF_SUBJECT, CA_SUBJECT])]
#[case::three(&["ec_cert.pem", "leaf.pem", "ca.pem"], vec![EC_SUBJECT, LEAF_SUBJECT, CA_SUBJECT])]
#[case::repeated(&["ca.pem", "ca.pem"], vec![CA_SUBJECT, CA_SUBJECT])]
fn test_chain_keeps_count_and_order(#[case] files: &[&str], #[case] subjects: Vec<&str>) {
    let text = files
        .iter()
        .map(|name| format!("comment before {name}\n{}", fixture(name)))
        .collect::<String>();

    let chain = read_certificate_chain(&text).unwrap();

    let found = chain.iter().map(|c| c.subject_rfc2253()).collect::<Vec<_>>();
    assert_eq!(subjects, found);
}

#[test]
fn test_two_unrelated_certificates_both_trusted() {
    let text = [fixture("ec_cert.pem"), fixture("ca.pem")].concat();

    let store = build_trust_store(&read_certificate_chain(&text).unwrap());

    assert_eq!(2, store.len());
    let aliases = store.aliases().collect::<Vec<_>>();
    assert!(aliases.contains(&EC_SUBJECT));
    assert!(aliases.contains(&CA_SUBJECT));
}

#[test]
fn test_empty_chain_trust_store_vs_key_store() {
    let dir = TempDir::new().unwrap();
    let empty = dir.path().join("empty.pem");
    fs::write(&empty, "no certificates in here\n").unwrap();

    let trust = load_trust_store(&empty).unwrap();
    assert!(trust.is_empty());

    let error = load_key_store(&empty, testdata("rsa_key.pem"), None).unwrap_err();
    assert_eq!(ErrorKind::Certificate, error.kind());
    assert_eq!(
        format!("Certificate file does not contain any certificates: {}", empty.display()),
        error.to_string()
    );
}

#[rstest]
#[case::no_password(None)]
#[case::empty_password(Some(Password::from("")))]
#[case::password(Some(Password::from("changeit")))]
fn test_missing_private_key_is_parse_error(#[case] password: Option<Password>) {
    let text = [fixture("chain.pem"), fixture("rsa_pub.pem")].concat();

    let error = load_private_key(&text, password.as_ref()).unwrap_err();

    assert_eq!(ErrorKind::Parse, error.kind());
    assert_eq!("did not find a private key", error.to_string());
}

#[rstest]
#[case::rsa("rsa_key.pem", None, KeyFamily::Rsa, 2048)]
#[case::ec("ec_key.pem", None, KeyFamily::Ec, 256)]
#[case::dsa("dsa_key.pem", None, KeyFamily::Dsa, 2048)]
#[case::rsa_aes256_sha256("rsa_key_encrypted.pem", Some(changeit()), KeyFamily::Rsa, 2048)]
#[case::ec_3des_sha1("ec_key_encrypted.pem", Some(changeit()), KeyFamily::Ec, 256)]
#[case::ec_aes128_sha512("ec_key_encrypted_aes128.pem", Some(changeit()), KeyFamily::Ec, 256)]
#[case::empty_password_is_no_password("ec_key.pem", Some(Password::from("")), KeyFamily::Ec, 256)]
fn test_private_key_family(
    #[case] file: &str,
    #[case] password: Option<Password>,
    #[case] family: KeyFamily,
    #[case] key_size: u32,
) {
    let key = load_private_key_file(testdata(file), password.as_ref()).unwrap();

    assert_eq!(family, key.family());
    assert_eq!(key_size, key.key_size());
}

#[rstest]
#[case::rsa_aes256("rsa_key_encrypted.pem")]
#[case::ec_3des("ec_key_encrypted.pem")]
#[case::ec_aes128("ec_key_encrypted_aes128.pem")]
fn test_wrong_password_is_crypto_error(#[case] file: &str) {
    let password = Password::from("not the password");

    let error = load_private_key_file(testdata(file), Some(&password)).unwrap_err();

    assert_eq!(ErrorKind::Crypto, error.kind());
}

#[test]
fn test_password_on_plain_key_is_crypto_error() {
    let error = load_private_key(&fixture("rsa_key.pem"), Some(&changeit())).unwrap_err();
    assert_eq!(ErrorKind::Crypto, error.kind());
}

#[test]
fn test_pkcs1_key_lists_every_attempt() {
    let error = load_private_key(&fixture("rsa_key_pkcs1.pem"), None).unwrap_err();

    assert_eq!(ErrorKind::Crypto, error.kind());
    assert_eq!("no algorithm matched key material", error.to_string());
    let kagi_credstore::Error::Crypto(inner) = &error else {
        panic!("expected a crypto error, got {error:?}");
    };
    let families = inner.attempts().iter().map(|a| a.family).collect::<Vec<_>>();
    assert_eq!(vec![KeyFamily::Rsa, KeyFamily::Ec, KeyFamily::Dsa], families);
}

#[rstest]
#[case::rsa("rsa_key.pem", "rsa_pub.pem")]
#[case::ec("ec_key.pem", "ec_pub.pem")]
#[case::dsa("dsa_key.pem", "dsa_pub.pem")]
fn test_public_key_matches_private_key(#[case] private: &str, #[case] public: &str) {
    let private_key = load_private_key_file(testdata(private), None).unwrap();
    let public_key = load_public_key_file(testdata(public)).unwrap();

    assert_eq!(private_key.family(), public_key.family());
    assert_eq!(private_key.key_size(), public_key.key_size());
    assert_eq!(private_key.curve(), public_key.curve());
}

#[test]
fn test_missing_public_key_is_parse_error() {
    let error = load_public_key(&fixture("ca.pem")).unwrap_err();
    assert_eq!(ErrorKind::Parse, error.kind());
    assert_eq!("did not find a public key", error.to_string());
}

#[rstest]
#[case::certificate("ca.pem")]
#[case::private_key("rsa_key.pem")]
#[case::public_key("rsa_pub.pem")]
fn test_malformed_base64_is_decode_error(#[case] file: &str) {
    let text = fixture(file).replacen("MII", "M!I", 1);

    let error = match file {
        "ca.pem" => read_certificate_chain(&text).map(|_| ()),
        "rsa_key.pem" => load_private_key(&text, None).map(|_| ()),
        _ => load_public_key(&text).map(|_| ()),
    }
    .unwrap_err();

    assert_eq!(ErrorKind::Decode, error.kind());
}

#[test]
fn test_garbage_certificate_is_certificate_error() {
    let text = "-----BEGIN CERTIFICATE-----\naGVsbG8gd29ybGQ=\n-----END CERTIFICATE-----\n";
    let error = read_certificate_chain(text).unwrap_err();
    assert_eq!(ErrorKind::Certificate, error.kind());
}

#[test]
fn test_key_store_single_certificate_rsa() {
    let store = build_key_store_from_pem(&fixture("leaf.pem"), &fixture("rsa_key.pem"), None).unwrap();

    assert_eq!(vec![KEY_ALIAS], store.aliases().collect::<Vec<_>>());
    let entry = store.key_entry(KEY_ALIAS).unwrap();
    assert_eq!(1, entry.chain().len());
    assert_eq!(KeyFamily::Rsa, entry.private_key().family());
}

#[test]
fn test_load_key_store_from_files() {
    let password = changeit();
    let store = load_key_store(testdata("chain.pem"), testdata("rsa_key_encrypted.pem"), Some(&password)).unwrap();

    let entry = store.key_entry(KEY_ALIAS).unwrap();
    assert_eq!(2, entry.chain().len());
    assert_eq!(Some(LEAF_SUBJECT.to_string()), entry.chain().end_entity().map(|c| c.subject_rfc2253()));
    assert_eq!(Some(&password), entry.password());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.pem");

    assert_eq!(ErrorKind::Io, read_certificate_chain_file(&missing).unwrap_err().kind());
    assert_eq!(ErrorKind::Io, load_public_key_file(&missing).unwrap_err().kind());
    let error = load_key_store(testdata("chain.pem"), &missing, None).unwrap_err();
    assert_eq!(ErrorKind::Io, error.kind());
    assert!(error.to_string().contains("missing.pem"));
}

#[test]
fn test_non_ascii_bytes_do_not_break_loading() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bundle.pem");
    let mut bytes = "# Zertifikat für Prüfung\n".as_bytes().to_vec();
    bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
    bytes.extend_from_slice(fixture("ca.pem").as_bytes());
    fs::write(&path, bytes).unwrap();

    let chain = read_certificate_chain_file(&path).unwrap();
    assert_eq!(1, chain.len());
}

#[test]
fn test_store_config_from_file() {
    let dir = TempDir::new().unwrap();
    for name in ["chain.pem", "ec_key_encrypted.pem", "ca.pem"] {
        fs::copy(testdata(name), dir.path().join(name)).unwrap();
    }
    let config_path = dir.path().join("kagi.toml");
    fs::write(
        &config_path,
        r#"
trust_store = "ca.pem"
certificate_chain = "chain.pem"
private_key = "ec_key_encrypted.pem"
private_key_password = "changeit"
"#,
    )
    .unwrap();

    let config = StoreConfig::from_file(&config_path).unwrap();

    let trust = config.load_trust_store().unwrap();
    assert_eq!(vec![CA_SUBJECT], trust.aliases().collect::<Vec<_>>());
    let keys = config.load_key_store().unwrap();
    let entry = keys.key_entry(KEY_ALIAS).unwrap();
    assert_eq!(KeyFamily::Ec, entry.private_key().family());
    assert_eq!(2, entry.chain().len());
}

#[test]
fn test_store_config_unreadable() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("kagi.toml");
    fs::write(&config_path, "private_key = [").unwrap();

    let error = StoreConfig::from_file(&config_path).unwrap_err();
    assert_eq!(ErrorKind::Config, error.kind());
    assert!(error.to_string().contains("kagi.toml"));
    assert_eq!(ErrorKind::Io, StoreConfig::from_file(dir.path().join("absent.toml")).unwrap_err().kind());
}
