// Separator and parenthesis configuration for composite weight text.

use crate::WeightError;

/// Environment variable holding the element separator (one character).
pub const SEPARATOR_ENV: &str = "WFST_WEIGHT_SEPARATOR";

/// Environment variable holding the parenthesis pair (empty or two characters).
pub const PARENTHESES_ENV: &str = "WFST_WEIGHT_PARENTHESES";

/// Characters used when printing and parsing composite weights.
///
/// Text written with one configuration must be read back with the same one.
/// Parentheses are required whenever composite weights nest, otherwise
/// separators from different nesting levels cannot be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompositeConfig {
    /// Separator between elements.
    pub separator: char,
    /// Open/close parenthesis pair, if parenthesization is enabled.
    pub parentheses: Option<(char, char)>,
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            separator: ',',
            parentheses: None,
        }
    }
}

impl CompositeConfig {
    /// Configuration with the given separator and no parentheses.
    pub fn new(separator: char) -> Self {
        Self {
            separator,
            parentheses: None,
        }
    }

    /// Enable parenthesization with the given pair.
    pub fn with_parentheses(mut self, open: char, close: char) -> Self {
        self.parentheses = Some((open, close));
        self
    }

    /// Build from the string form used by flags and environment variables.
    ///
    /// `separator` must be exactly one character. `parentheses` is either
    /// empty (no parenthesization) or exactly two characters.
    pub fn from_flags(separator: &str, parentheses: &str) -> Result<Self, WeightError> {
        let mut sep_chars = separator.chars();
        let sep = match (sep_chars.next(), sep_chars.next()) {
            (Some(c), None) => c,
            _ => return Err(WeightError::InvalidSeparator(separator.to_string())),
        };

        let parens: Vec<char> = parentheses.chars().collect();
        let config = match parens.as_slice() {
            [] => Self::new(sep),
            [open, close] => Self::new(sep).with_parentheses(*open, *close),
            _ => return Err(WeightError::InvalidParentheses(parentheses.to_string())),
        };
        config.validate()?;
        Ok(config)
    }

    /// Build from `WFST_WEIGHT_SEPARATOR` / `WFST_WEIGHT_PARENTHESES`.
    ///
    /// Unset variables fall back to the defaults (`,` and no parentheses).
    pub fn from_env() -> Result<Self, WeightError> {
        let separator = std::env::var(SEPARATOR_ENV).unwrap_or_else(|_| ",".to_string());
        let parentheses = std::env::var(PARENTHESES_ENV).unwrap_or_default();
        Self::from_flags(&separator, &parentheses)
    }

    /// Check that the configured characters can be told apart while parsing.
    pub fn validate(&self) -> Result<(), WeightError> {
        if self.separator.is_whitespace() {
            return Err(WeightError::ConflictingConfig(
                "separator must not be whitespace".to_string(),
            ));
        }
        if let Some((open, close)) = self.parentheses {
            if open.is_whitespace() || close.is_whitespace() {
                return Err(WeightError::ConflictingConfig(
                    "parentheses must not be whitespace".to_string(),
                ));
            }
            if open == close {
                return Err(WeightError::ConflictingConfig(format!(
                    "open and close parenthesis are both {open:?}"
                )));
            }
            if self.separator == open || self.separator == close {
                return Err(WeightError::ConflictingConfig(format!(
                    "separator {:?} is also a parenthesis",
                    self.separator
                )));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn has_parentheses(&self) -> bool {
        self.parentheses.is_some()
    }

    #[inline]
    pub fn open_paren(&self) -> Option<char> {
        self.parentheses.map(|(open, _)| open)
    }

    #[inline]
    pub fn close_paren(&self) -> Option<char> {
        self.parentheses.map(|(_, close)| close)
    }
}
