//! Interactive fallback for secrets the keychain cannot provide.
//!
//! Kept out of the resolution path proper so the executor stays
//! deterministic under test; the executor invokes a fallback only after
//! the credential source reports absent or unavailable.

use std::io::{self, BufRead, IsTerminal};

use zeroize::Zeroizing;

use crate::error::Result;

/// Strategy for obtaining a value the credential source does not have.
pub trait ValueFallback {
    /// Ask the operator for `secret`'s value. `None` means declined or
    /// empty; the secret stays unavailable for the rest of the run.
    fn obtain(&self, secret: &str) -> Result<Option<Zeroizing<String>>>;
}

/// Prompt with hidden input on a TTY; read one line from stdin otherwise.
pub struct TerminalPrompt;

impl ValueFallback for TerminalPrompt {
    fn obtain(&self, secret: &str) -> Result<Option<Zeroizing<String>>> {
        let value = if io::stdin().is_terminal() {
            Zeroizing::new(
                dialoguer::Password::new()
                    .with_prompt(format!("Enter value for {}", secret))
                    .allow_empty_password(true)
                    .interact()?,
            )
        } else {
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            let trimmed = line.trim_end_matches(&['\r', '\n'][..]).to_string();
            Zeroizing::new(trimmed)
        };

        if value.is_empty() {
            Ok(None)
        } else {
            Ok(Some(value))
        }
    }
}

/// Fallback that never supplies a value.
pub struct NoFallback;

impl ValueFallback for NoFallback {
    fn obtain(&self, _secret: &str) -> Result<Option<Zeroizing<String>>> {
        Ok(None)
    }
}
