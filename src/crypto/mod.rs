//! Media link signing.
//!
//! A direct media link is authorized by an MD5 digest over a fixed key,
//! the file path on the storage host and the per-request salt returned by
//! the download-info handler.

use md5::{Digest, Md5};
use tracing::debug;

/// Key prepended to every signed path.
const SIGN_KEY: &str = "XGRlBW9FXlekgbPrRHuSiA";

/// Compute MD5 hash of a string and return as hex string.
pub fn md5_hex(data: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(data.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}

/// Signature of a storage path: `hex(md5(KEY + path + salt))`.
///
/// `path` must already have its leading `/` removed.
pub fn sign_path(path: &str, salt: &str) -> String {
    let signature = md5_hex(&format!("{}{}{}", SIGN_KEY, path, salt));
    debug!("Signed path '{}': {}", path, signature);
    signature
}
