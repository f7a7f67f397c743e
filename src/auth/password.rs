use base64::{engine::general_purpose::STANDARD, Engine as _};
use md5::{Digest, Md5};
use sha1::Sha1;
use subtle::ConstantTimeEq;

// ============================================================================
// htpasswd Password Formats
// ============================================================================
//
// Formats written by Apache's `htpasswd`:
// - `$2y$` / `$2a$` / `$2b$`  bcrypt (`htpasswd -B`)
// - `$apr1$salt$hash`          Apache MD5 (`htpasswd -m`, the default)
// - `{SHA}base64`              unsalted SHA-1 (`htpasswd -s`)
// - anything else              plaintext (`htpasswd -p`)
//
// glibc crypt formats are not verifiable here and are rejected at load.
//
// ============================================================================

const APR1_MAGIC: &str = "$apr1$";
const SHA1_PREFIX: &str = "{SHA}";
const BCRYPT_PREFIXES: &[&str] = &["$2y$", "$2a$", "$2b$"];
const UNSUPPORTED_PREFIXES: &[&str] = &["$1$", "$5$", "$6$"];

const APR1_ROUNDS: usize = 1000;
const ITOA64: &[u8] = b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredPassword {
    Bcrypt(String),
    Apr1 { salt: String, hash: String },
    Sha1(String),
    Plain(String),
}

impl StoredPassword {
    /// Classify the password column of an htpasswd line. `None` for formats
    /// that cannot be verified.
    pub fn parse(field: &str) -> Option<Self> {
        if BCRYPT_PREFIXES.iter().any(|prefix| field.starts_with(prefix)) {
            return Some(Self::Bcrypt(field.to_string()));
        }

        if let Some(rest) = field.strip_prefix(APR1_MAGIC) {
            let (salt, hash) = rest.split_once('$')?;
            if salt.is_empty() || salt.len() > 8 || hash.is_empty() {
                return None;
            }
            return Some(Self::Apr1 {
                salt: salt.to_string(),
                hash: hash.to_string(),
            });
        }

        if let Some(digest) = field.strip_prefix(SHA1_PREFIX) {
            return Some(Self::Sha1(digest.to_string()));
        }

        if UNSUPPORTED_PREFIXES.iter().any(|prefix| field.starts_with(prefix)) {
            return None;
        }

        Some(Self::Plain(field.to_string()))
    }

    pub fn verify(&self, password: &str) -> bool {
        match self {
            Self::Bcrypt(hash) => bcrypt::verify(password, hash).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Malformed bcrypt credential entry");
                false
            }),
            Self::Apr1 { salt, hash } => constant_time_eq(&apr1_digest(password, salt), hash),
            Self::Sha1(digest) => {
                let computed = STANDARD.encode(Sha1::digest(password.as_bytes()));
                constant_time_eq(&computed, digest)
            }
            Self::Plain(expected) => constant_time_eq(password, expected),
        }
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Apache's MD5-crypt variant; returns the encoded hash without magic or salt.
fn apr1_digest(password: &str, salt: &str) -> String {
    let password = password.as_bytes();
    let salt = salt.as_bytes();

    let mut alternate = Md5::new();
    alternate.update(password);
    alternate.update(salt);
    alternate.update(password);
    let alternate = alternate.finalize();

    let mut ctx = Md5::new();
    ctx.update(password);
    ctx.update(APR1_MAGIC.as_bytes());
    ctx.update(salt);

    let mut remaining = password.len();
    while remaining > 0 {
        let take = remaining.min(16);
        ctx.update(&alternate[..take]);
        remaining -= take;
    }

    let mut bits = password.len();
    while bits != 0 {
        if bits & 1 != 0 {
            ctx.update([0u8]);
        } else {
            ctx.update(&password[..1]);
        }
        bits >>= 1;
    }

    let mut digest = ctx.finalize();

    for round in 0..APR1_ROUNDS {
        let mut ctx = Md5::new();
        if round & 1 != 0 {
            ctx.update(password);
        } else {
            ctx.update(digest);
        }
        if round % 3 != 0 {
            ctx.update(salt);
        }
        if round % 7 != 0 {
            ctx.update(password);
        }
        if round & 1 != 0 {
            ctx.update(digest);
        } else {
            ctx.update(password);
        }
        digest = ctx.finalize();
    }

    let mut encoded = String::with_capacity(22);
    for (a, b, c) in [(0, 6, 12), (1, 7, 13), (2, 8, 14), (3, 9, 15), (4, 10, 5)] {
        let value = (u32::from(digest[a]) << 16) | (u32::from(digest[b]) << 8) | u32::from(digest[c]);
        push_base64(&mut encoded, value, 4);
    }
    push_base64(&mut encoded, u32::from(digest[11]), 2);

    encoded
}

fn push_base64(out: &mut String, mut value: u32, count: usize) {
    for _ in 0..count {
        out.push(char::from(ITOA64[(value & 0x3f) as usize]));
        value >>= 6;
    }
}
