use anyhow::{Result, anyhow};
use keyring::{Entry, Error as KeyringError};

const SERVICE: &str = "rs_mail_assistant";
const API_KEY_USER: &str = "llm_api_key";

/// Save the summarization API key into the OS keyring
pub fn save_api_key(api_key: &str) -> Result<()> {
    let entry = Entry::new(SERVICE, API_KEY_USER)?;
    entry
        .set_password(api_key)
        .map_err(|e| anyhow!(e.to_string()))?;
    Ok(())
}

/// Load the stored API key, if any
pub fn load_api_key() -> Result<Option<String>> {
    let entry = Entry::new(SERVICE, API_KEY_USER)?;
    match entry.get_password() {
        Ok(v) => Ok(Some(v)),
        Err(KeyringError::NoEntry) => Ok(None),
        Err(e) => Err(anyhow!(e.to_string())),
    }
}

/// Remove the stored API key. Missing entries are not an error.
pub fn forget_api_key() -> Result<bool> {
    let entry = Entry::new(SERVICE, API_KEY_USER)?;
    match entry.delete_credential() {
        Ok(()) => Ok(true),
        Err(KeyringError::NoEntry) => Ok(false),
        Err(e) => Err(anyhow!(e.to_string())),
    }
}
