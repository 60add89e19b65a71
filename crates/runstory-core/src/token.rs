//! Public share tokens.
//!
//! A token is 8 bytes from the operating system's CSPRNG rendered as 16
//! lowercase hex characters. No uniqueness check happens here; writers treat
//! a collision as a rare, retryable event (see
//! [`WriteOutcome::TokenCollision`](crate::store::WriteOutcome)).

use std::{fmt, str::FromStr};

use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Number of random bytes behind a token.
pub const TOKEN_BYTES: usize = 8;

/// Length of the rendered token in characters.
pub const TOKEN_LEN: usize = TOKEN_BYTES * 2;

/// The public, shareable identifier of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Token(String);

impl Token {
  /// Draw a fresh token from [`OsRng`].
  ///
  /// Panics if the OS random source is unavailable; that is a broken host,
  /// not a condition worth retrying.
  pub fn generate() -> Self {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    Self(hex::encode(bytes))
  }

  /// Validate an externally supplied token. Upper-case hex is accepted and
  /// normalised.
  pub fn parse(s: &str) -> Result<Self> {
    if s.len() == TOKEN_LEN && s.bytes().all(|b| b.is_ascii_hexdigit()) {
      Ok(Self(s.to_ascii_lowercase()))
    } else {
      Err(Error::MalformedToken(s.to_owned()))
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Token {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl FromStr for Token {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl TryFrom<String> for Token {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { Self::parse(&s) }
}

impl From<Token> for String {
  fn from(t: Token) -> Self { t.0 }
}
