use std::io::{self, Read};

use kagi_credstore::{Password, decode_ascii};

use crate::error::{Error, Result};

/// Reads PEM text from stdin. Bytes outside US-ASCII become U+FFFD, the
/// same as for files.
pub(crate) fn read_stdin() -> Result<String> {
    let mut buffer = Vec::new();
    io::stdin().read_to_end(&mut buffer)?;
    Ok(decode_ascii(&buffer))
}

/// Password from `--password` or from the variable named by
/// `--password-env`.
pub(crate) fn password(literal: Option<&str>, env: Option<&str>) -> Result<Option<Password>> {
    match (literal, env) {
        (Some(literal), _) => Ok(Some(Password::from(literal))),
        (None, Some(name)) => std::env::var(name)
            .map(|value| Some(Password::from(value)))
            .map_err(|e| Error::InvalidInput(format!("{name}: {e}"))),
        (None, None) => Ok(None),
    }
}
