//! Secure credential storage using macOS Keychain
//!
//! The Otter account password is kept out of the preferences file. On
//! macOS it lives in the Keychain; elsewhere it is read from the
//! `OTTER_PASSWORD` environment variable (or a `.env` file).

use crate::error::KeychainError;
use std::fmt;
use zeroize::Zeroize;

#[cfg(target_os = "macos")]
use security_framework::passwords::*;

#[cfg(target_os = "macos")]
const SERVICE_NAME: &str = "com.otter-import.cli";

const EMAIL_ENV: &str = "OTTER_EMAIL";
const PASSWORD_ENV: &str = "OTTER_PASSWORD";

/// Otter account credentials, sent with every API request.
#[derive(Clone)]
pub(crate) struct Credentials {
    pub(crate) email: String,
    pub(crate) password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Drop for Credentials {
    fn drop(&mut self) {
        // Clear password from memory
        self.password.zeroize();
    }
}

/// Store the Otter password for `email` in the keychain.
#[cfg(target_os = "macos")]
pub(crate) fn store_password(email: &str, password: &str) -> Result<(), KeychainError> {
    // Delete existing item if present
    let _ = delete_generic_password(SERVICE_NAME, email);

    set_generic_password(SERVICE_NAME, email, password.as_bytes())
        .map_err(|e| KeychainError::Store(e.to_string()))
}

/// Retrieve the Otter password for `email` from the keychain.
#[cfg(target_os = "macos")]
pub(crate) fn get_password(email: &str) -> Result<String, KeychainError> {
    let password = get_generic_password(SERVICE_NAME, email)
        .map_err(|e| KeychainError::Retrieve(e.to_string()))?;

    String::from_utf8(password.to_vec()).map_err(|e| KeychainError::InvalidData(e.to_string()))
}

/// Delete the Otter password for `email` from the keychain.
#[cfg(target_os = "macos")]
pub(crate) fn delete_password(email: &str) -> Result<(), KeychainError> {
    delete_generic_password(SERVICE_NAME, email).map_err(|e| KeychainError::Delete(e.to_string()))
}

#[cfg(not(target_os = "macos"))]
pub(crate) fn store_password(_email: &str, _password: &str) -> Result<(), KeychainError> {
    Err(KeychainError::NotImplemented)
}

#[cfg(not(target_os = "macos"))]
pub(crate) fn get_password(_email: &str) -> Result<String, KeychainError> {
    Err(KeychainError::NotImplemented)
}

#[cfg(not(target_os = "macos"))]
pub(crate) fn delete_password(_email: &str) -> Result<(), KeychainError> {
    Err(KeychainError::NotImplemented)
}

/// Resolve credentials from the stored email, the keychain and the
/// environment, in that order of preference.
pub(crate) fn load_credentials(stored_email: Option<&str>) -> Result<Credentials, KeychainError> {
    let env_email = std::env::var(EMAIL_ENV).ok();
    let email = stored_email
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .or(env_email)
        .ok_or_else(|| {
            KeychainError::InvalidData(format!(
                "no Otter email configured; run `otter-import login` or set {}",
                EMAIL_ENV
            ))
        })?;

    let password = match get_password(&email) {
        Ok(password) => password,
        Err(keychain_err) => std::env::var(PASSWORD_ENV).map_err(|_| {
            KeychainError::Retrieve(format!(
                "{} (and {} is not set)",
                keychain_err, PASSWORD_ENV
            ))
        })?,
    };

    Ok(Credentials { email, password })
}
