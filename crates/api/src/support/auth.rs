#![forbid(unsafe_code)]

use crate::server::{ApiResponse, api_error, forbidden, internal_error};
use om_core::roles::UserRole;
use om_storage::{SqliteStore, UserRow};
use rand::Rng as _;
use sha2::{Digest, Sha256};

pub(crate) const SESSION_TTL_MS: i64 = 24 * 60 * 60 * 1000;

const HASH_ROUNDS: usize = 10_000;

/// Stored shape is `{salt_hex}${digest_hex}` where the digest is an
/// iterated SHA-256 over `salt_hex || password`.
pub(crate) fn hash_password(password: &str) -> String {
    let mut rng = rand::rng();
    let mut salt = [0u8; 16];
    for byte in salt.iter_mut() {
        *byte = rng.random::<u8>();
    }
    let salt_hex = hex_string(&salt);
    let digest = digest_hex(&salt_hex, password);
    format!("{salt_hex}${digest}")
}

pub(crate) fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, digest)) = stored.split_once('$') else {
        return false;
    };
    digest_hex(salt_hex, password) == digest
}

fn digest_hex(salt_hex: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt_hex.as_bytes());
    hasher.update(password.as_bytes());
    let mut digest = hasher.finalize();
    for _ in 1..HASH_ROUNDS {
        let mut hasher = Sha256::new();
        hasher.update(digest);
        digest = hasher.finalize();
    }
    hex_string(&digest)
}

fn hex_string(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Opaque 32-byte bearer token, hex encoded.
pub(crate) fn new_session_token() -> String {
    let mut rng = rand::rng();
    let mut bytes = [0u8; 32];
    for byte in bytes.iter_mut() {
        *byte = rng.random::<u8>();
    }
    hex_string(&bytes)
}

/// 8-character starter password handed out when a director creates a
/// consultant account. Ambiguous glyphs (0/O, 1/l/I) are left out.
pub(crate) fn temp_password() -> String {
    const CHARSET: &[u8] = b"abcdefghjkmnpqrstuvwxyzABCDEFGHJKMNPQRSTUVWXYZ23456789";
    let mut rng = rand::rng();
    (0..8)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

pub(crate) fn authenticate(
    store: &mut SqliteStore,
    bearer: Option<&str>,
) -> Result<UserRow, ApiResponse> {
    let token = bearer.map(str::trim).filter(|token| !token.is_empty());
    let Some(token) = token else {
        return Err(unauthenticated());
    };
    let user = store.session_user(token).map_err(internal_error)?;
    let Some(user) = user else {
        return Err(unauthenticated());
    };
    if !user.is_active {
        return Err(forbidden("Compte désactivé"));
    }
    Ok(user)
}

pub(crate) fn unauthenticated() -> ApiResponse {
    api_error(
        "401 Unauthorized",
        "UNAUTHENTICATED",
        "Authentification requise",
        Some("Connectez-vous via POST /api/auth/login."),
    )
}

pub(crate) fn is_director(user: &UserRow) -> bool {
    UserRole::parse(&user.role) == Some(UserRole::Directeur)
}

pub(crate) fn require_director(user: &UserRow) -> Result<(), ApiResponse> {
    if is_director(user) {
        Ok(())
    } else {
        Err(forbidden("Permissions insuffisantes"))
    }
}

pub(crate) fn require_role(user: &UserRow, required: UserRole) -> Result<(), ApiResponse> {
    let role = UserRole::parse(&user.role).unwrap_or(UserRole::Client);
    if role.at_least(required) {
        Ok(())
    } else {
        Err(forbidden("Permissions insuffisantes"))
    }
}
