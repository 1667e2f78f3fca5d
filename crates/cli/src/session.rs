use std::{fs, io::ErrorKind, path::Path};

use trip_store::Session;

use crate::error::Result;

/// Reads the stored session. A missing file means signed out.
pub fn load(path: &str) -> Result<Option<Session>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    Ok(Some(serde_json::from_str(&content)?))
}

/// Writes the session, or removes the file when signed out.
pub fn store(path: &str, session: Option<&Session>) -> Result<()> {
    let Some(session) = session else {
        return match fs::remove_file(path) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        };
    };

    if let Some(parent) = Path::new(path).parent() {
        fs::create_dir_all(parent)?;
    }
    let payload = serde_json::to_string_pretty(session)?;
    fs::write(path, payload)?;
    Ok(())
}
