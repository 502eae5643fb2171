//! Parsing of algorithm and scheme names such as `EMSA3(SHA-256)` or `McEliece,n,t`.

use crate::error::{CryptoError, Result};

/// Split `input` on `delim`, keeping empty tokens.
pub fn split_on(input: &str, delim: char) -> Vec<&str> {
    input.split(delim).collect()
}

/// Parse a decimal `u32` parameter.
pub fn to_u32bit(input: &str) -> Result<u32> {
    input
        .trim()
        .parse::<u32>()
        .map_err(|_| CryptoError::InvalidArgument(format!("Invalid decimal string '{}'", input)))
}

/// A parsed `Name(arg1,arg2,...)` descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeName {
    pub name: String,
    pub args: Vec<String>,
}

impl SchemeName {
    /// Parse `Name` or `Name(arg,...)`. Arguments may themselves be nested
    /// descriptors; they are returned verbatim.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let Some(open) = text.find('(') else {
            if text.contains(')') || text.contains(',') {
                return Err(malformed(text));
            }
            return Ok(Self {
                name: text.to_string(),
                args: Vec::new(),
            });
        };

        if !text.ends_with(')') || open == 0 {
            return Err(malformed(text));
        }

        let name = &text[..open];
        let inner = &text[open + 1..text.len() - 1];

        let mut args = Vec::new();
        let mut depth = 0usize;
        let mut start = 0usize;
        for (i, c) in inner.char_indices() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth = depth.checked_sub(1).ok_or_else(|| malformed(text))?;
                }
                ',' if depth == 0 => {
                    args.push(inner[start..i].trim().to_string());
                    start = i + 1;
                }
                _ => {}
            }
        }
        if depth != 0 {
            return Err(malformed(text));
        }
        args.push(inner[start..].trim().to_string());

        if args.iter().any(|a| a.is_empty()) {
            return Err(malformed(text));
        }

        Ok(Self {
            name: name.to_string(),
            args,
        })
    }
}

fn malformed(text: &str) -> CryptoError {
    CryptoError::InvalidArgument(format!("Malformed algorithm name '{}'", text))
}
