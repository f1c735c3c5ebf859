use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use console::Term;
use log::{debug, warn};

/// A GitLab personal access token.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(****)")
    }
}

/// Source of API credentials.
///
/// The resolution pipeline asks for a token before its first request and,
/// when none is stored, asks the provider to obtain one interactively.
pub trait TokenProvider {
    fn token(&self) -> Option<Token>;

    fn prompt_for_token(&self) -> Option<Token>;
}

/// Token provider backed by the command line, with a terminal prompt as fallback.
///
/// A prompted token is kept for the rest of the process only. Once the user
/// declines to give one, later prompts are skipped.
pub struct TerminalTokenProvider {
    token: Mutex<Option<Token>>,
    interactive: bool,
    declined: AtomicBool,
}

impl TerminalTokenProvider {
    pub fn new(token: Option<Token>, interactive: bool) -> Self {
        Self {
            token: Mutex::new(token),
            interactive,
            declined: AtomicBool::new(false),
        }
    }

    fn store(&self, token: Token) {
        let mut slot = self
            .token
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *slot = Some(token);
    }
}

impl TokenProvider for TerminalTokenProvider {
    fn token(&self) -> Option<Token> {
        self.token
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn prompt_for_token(&self) -> Option<Token> {
        if !self.interactive {
            debug!("Not prompting for a token: terminal is not interactive");
            return None;
        }
        if self.declined.load(Ordering::Relaxed) {
            return None;
        }

        let term = Term::stderr();
        let _ = term.write_line(
            "Please enter a GitLab API token.\n\
             Visit https://gitlab.com/-/user_settings/personal_access_tokens to create one if needed.",
        );

        match term.read_secure_line() {
            Ok(line) if !line.trim().is_empty() => {
                let token = Token::from(line.trim());
                self.store(token.clone());
                Some(token)
            }
            Ok(_) => {
                self.declined.store(true, Ordering::Relaxed);
                None
            }
            Err(e) => {
                warn!("Failed to read token from terminal: {e}");
                self.declined.store(true, Ordering::Relaxed);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_debug_is_redacted() {
        let token = Token::from("glpat-secret");
        assert_eq!(format!("{token:?}"), "Token(****)");
        assert_eq!(token.as_str(), "glpat-secret");
    }

    #[test]
    fn test_terminal_provider_returns_configured_token() {
        let provider = TerminalTokenProvider::new(Some(Token::from("abc")), false);
        assert_eq!(provider.token(), Some(Token::from("abc")));
    }

    #[test]
    fn test_non_interactive_provider_never_prompts() {
        let provider = TerminalTokenProvider::new(None, false);
        assert!(provider.token().is_none());
        assert!(provider.prompt_for_token().is_none());
    }
}
