pub mod file;

use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Resolve a calculator input: `--input` file first, then piped stdin, then flags.
pub fn resolve<T: DeserializeOwned>(
    path: Option<&str>,
    from_flags: impl FnOnce() -> Result<T, Box<dyn std::error::Error>>,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return file::read_json(path);
    }
    if !atty::is(atty::Stream::Stdin) {
        let mut piped = String::new();
        io::stdin().read_to_string(&mut piped)?;
        if let Some(input) = parse_piped(&piped)? {
            return Ok(input);
        }
    }
    from_flags()
}

/// Blank input means nothing was piped and flags should be used instead.
fn parse_piped<T: DeserializeOwned>(text: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|e| format!("Failed to parse JSON from stdin: {}", e).into())
}
