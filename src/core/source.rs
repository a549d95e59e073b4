//! Credential source adapter backed by the macOS Keychain.
//!
//! Lookups go through the Security framework's generic password API. Some
//! keychain items hold a JSON document rather than a bare string; a dotted
//! `json_path` selects the leaf value to use.

use zeroize::Zeroizing;

use crate::config::KeychainRef;
use crate::error::Result;

/// Outcome of a lookup that reached the store.
///
/// `Absent` means the store answered and holds no matching entry. A store
/// that could not be consulted at all surfaces as `Error::StoreUnavailable`
/// instead.
#[derive(Debug)]
pub enum Resolution {
    Found(Zeroizing<String>),
    Absent,
}

/// Capability interface over the local credential store.
///
/// No caching happens here; the executor memoizes per run.
pub trait CredentialSource {
    fn resolve(&self, keychain: &KeychainRef) -> Result<Resolution>;
}

/// The system keychain.
pub struct Keychain;

impl Keychain {
    pub fn new() -> Self {
        Self
    }

    #[cfg_attr(not(target_os = "macos"), allow(dead_code))]
    fn account(keychain: &KeychainRef) -> String {
        keychain
            .account
            .clone()
            .unwrap_or_else(whoami::username)
    }
}

impl Default for Keychain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "macos")]
impl CredentialSource for Keychain {
    fn resolve(&self, keychain: &KeychainRef) -> Result<Resolution> {
        use security_framework::passwords::get_generic_password;
        use tracing::{debug, warn};

        use crate::error::Error;

        // errSecItemNotFound / errSecUserCanceled
        const ERR_SEC_ITEM_NOT_FOUND: i32 = -25300;
        const ERR_SEC_USER_CANCELED: i32 = -128;

        let account = Self::account(keychain);
        debug!(service = %keychain.service, account = %account, "looking up keychain entry");

        match get_generic_password(&keychain.service, &account) {
            Ok(bytes) => {
                let raw = Zeroizing::new(String::from_utf8(bytes).map_err(|_| {
                    Error::StoreUnavailable("keychain entry is not valid UTF-8".to_string())
                })?);
                match &keychain.json_path {
                    Some(path) => Ok(extract_json_path(&raw, path)),
                    None => {
                        let trimmed = raw.trim();
                        if trimmed.is_empty() {
                            Ok(Resolution::Absent)
                        } else {
                            Ok(Resolution::Found(Zeroizing::new(trimmed.to_string())))
                        }
                    }
                }
            }
            Err(e) if e.code() == ERR_SEC_ITEM_NOT_FOUND => {
                debug!(service = %keychain.service, "no matching keychain entry");
                Ok(Resolution::Absent)
            }
            Err(e) if e.code() == ERR_SEC_USER_CANCELED => {
                warn!(service = %keychain.service, "keychain access denied by user");
                Err(Error::StoreUnavailable("access denied".to_string()))
            }
            Err(e) => {
                warn!(service = %keychain.service, error_code = e.code(), "keychain error");
                Err(Error::StoreUnavailable(e.to_string()))
            }
        }
    }
}

#[cfg(not(target_os = "macos"))]
impl CredentialSource for Keychain {
    fn resolve(&self, _keychain: &KeychainRef) -> Result<Resolution> {
        Err(crate::error::Error::StoreUnavailable(
            "the system keychain is only available on macOS".to_string(),
        ))
    }
}

/// Select a leaf value from a JSON-structured keychain item.
///
/// An item that is not valid JSON, or a path that does not lead to a
/// non-empty leaf, counts as absent; the entry exists but does not hold
/// the requested value.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn extract_json_path(raw: &str, path: &str) -> Resolution {
    let root: serde_json::Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(_) => {
            tracing::debug!("keychain entry is not valid JSON");
            return Resolution::Absent;
        }
    };

    let mut value = &root;
    for key in path.split('.') {
        match value.get(key) {
            Some(next) => value = next,
            None => return Resolution::Absent,
        }
    }

    let leaf = match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => return Resolution::Absent,
        other => other.to_string(),
    };
    if leaf.is_empty() {
        Resolution::Absent
    } else {
        Resolution::Found(Zeroizing::new(leaf))
    }
}
