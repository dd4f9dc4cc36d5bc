//! Terminal styling helpers

use std::fmt::Display;

use owo_colors::OwoColorize;

pub fn success(text: impl Display) -> String {
    text.green().to_string()
}

pub fn error(text: impl Display) -> String {
    text.red().to_string()
}

pub fn info(text: impl Display) -> String {
    text.blue().to_string()
}

pub fn warning(text: impl Display) -> String {
    text.yellow().to_string()
}

pub fn dim(text: impl Display) -> String {
    text.dimmed().to_string()
}

/// Show just enough of a secret to tell keys apart
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        return "****".into();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("sk-proj-abcdefghijkl"), "sk-p...ijkl");
        assert_eq!(mask_secret("short"), "****");
    }
}
