use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Read a typed JSON document from stdin if data is being piped.
/// Returns None if stdin is a TTY (interactive) or empty.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value: T = serde_json::from_str(trimmed)?;
    Ok(Some(value))
}

/// Read from `--input <file>` if given, otherwise from piped stdin.
pub fn read_file_or_stdin<T: DeserializeOwned>(
    path: Option<&str>,
    what: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return super::file::read_json(path);
    }
    match read_stdin()? {
        Some(value) => Ok(value),
        None => Err(format!("--input <file.json> or stdin required for {what}").into()),
    }
}
