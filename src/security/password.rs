use anyhow::Result;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use std::env;
use zeroize::{Zeroize, Zeroizing};

/// Environment variable consulted before prompting for the operation passcode.
pub const PASSCODE_ENV: &str = "DELTADEFI_OPERATION_PASSCODE";

/// PBKDF2-HMAC-SHA256 round count shared with the blob producer.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// AES-256 key length in bytes.
pub const DERIVED_KEY_LEN: usize = 32;

/// Operation passcode handling and the key-derivation contract.
pub struct SecurePassword;

impl SecurePassword {
    /// Get the passcode from the environment or prompt the user
    ///
    /// Priority:
    /// 1. Environment variable: DELTADEFI_OPERATION_PASSCODE
    /// 2. Interactive prompt (secure input)
    pub fn get_passcode() -> Result<SecretString> {
        Self::get_passcode_with_prompt("Operation passcode: ")
    }

    /// Same as [`SecurePassword::get_passcode`] with a custom prompt.
    pub fn get_passcode_with_prompt(prompt: &str) -> Result<SecretString> {
        if let Ok(passcode) = env::var(PASSCODE_ENV) {
            let mut passcode_mut = passcode;
            let secret = SecretString::new(passcode_mut.clone());
            passcode_mut.zeroize();
            return Ok(secret);
        }

        Self::prompt_passcode(prompt)
    }

    /// Prompt on the terminal, never reading the environment.
    pub fn prompt_passcode(prompt: &str) -> Result<SecretString> {
        let pass = rpassword::prompt_password(prompt)?;
        Ok(SecretString::new(pass))
    }

    /// Derive the AES-256 key for an operation key blob.
    ///
    /// The hash, round count and output length are fixed: a blob produced
    /// with different parameters decrypts to an authentication failure, not
    /// to a distinct error.
    pub fn derive_key_from_passcode(
        passcode: &SecretString,
        salt: &[u8],
    ) -> Zeroizing<[u8; DERIVED_KEY_LEN]> {
        let mut key = Zeroizing::new([0u8; DERIVED_KEY_LEN]);
        pbkdf2::pbkdf2_hmac::<Sha256>(
            passcode.expose_secret().as_bytes(),
            salt,
            PBKDF2_ITERATIONS,
            &mut key[..],
        );
        key
    }

    /// Validate passcode strength (basic checks)
    pub fn validate_passcode_strength(passcode: &SecretString) -> Result<()> {
        let pass = passcode.expose_secret();

        if pass.chars().count() < 8 {
            return Err(anyhow::anyhow!(
                "Passcode must be at least 8 characters long"
            ));
        }

        if pass.chars().all(|c| c.is_alphabetic()) {
            return Err(anyhow::anyhow!(
                "Passcode should contain numbers or special characters"
            ));
        }

        Ok(())
    }

    /// Create a new passcode with confirmation
    pub fn create_new_passcode() -> Result<SecretString> {
        loop {
            let pass1 = Self::prompt_passcode("Enter new operation passcode: ")?;

            if let Err(e) = Self::validate_passcode_strength(&pass1) {
                eprintln!("Passcode validation failed: {}", e);
                continue;
            }

            let pass2 = Self::prompt_passcode("Confirm operation passcode: ")?;

            if pass1.expose_secret() == pass2.expose_secret() {
                return Ok(pass1);
            } else {
                eprintln!("Passcodes do not match. Please try again.");
            }
        }
    }
}
