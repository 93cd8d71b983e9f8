// Password hashing with scrypt (N=16384, r=16, p=1, dkLen=64) and a
// random 16-byte salt. Output format: "hex(salt):hex(key)".

use rand::RngCore;
use scrypt::{scrypt, Params};
use subtle::ConstantTimeEq;

use gatehouse_core::error::GatehouseError;

/// Hash a password, returning `salt:key` with both parts hex-encoded.
pub fn hash_password(password: &str) -> Result<String, GatehouseError> {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt_hex = hex::encode(salt_bytes);

    let key = derive_key(password, &salt_hex)?;
    Ok(format!("{}:{}", salt_hex, hex::encode(key)))
}

/// Verify a password against a hash produced by [`hash_password`].
pub fn verify_password(hash: &str, password: &str) -> Result<bool, GatehouseError> {
    let (salt, key_hex) = hash
        .split_once(':')
        .ok_or_else(|| GatehouseError::Crypto("invalid password hash format".into()))?;

    let expected_key = hex::decode(key_hex)
        .map_err(|e| GatehouseError::Crypto(format!("invalid hex in password hash: {e}")))?;

    let derived_key = derive_key(password, salt)?;
    Ok(constant_time_equal(&derived_key, &expected_key))
}

/// Burn a hash derivation without using the result. Called on the
/// unknown-user login path so response timing matches the known-user
/// path.
pub fn burn_hash(password: &str) {
    let _ = hash_password(password);
}

/// Derive a 64-byte key with scrypt. N=16384 so log2(N)=14.
fn derive_key(password: &str, salt: &str) -> Result<Vec<u8>, GatehouseError> {
    let params = Params::new(14, 16, 1, 64)
        .map_err(|e| GatehouseError::Crypto(format!("invalid scrypt params: {e}")))?;

    let mut output = vec![0u8; 64];
    scrypt(password.as_bytes(), salt.as_bytes(), &params, &mut output)
        .map_err(|e| GatehouseError::Crypto(format!("scrypt failed: {e}")))?;

    Ok(output)
}

/// Compare two byte slices in constant time.
pub fn constant_time_equal(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
