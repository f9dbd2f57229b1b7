use std::{fmt, str::FromStr};

use crate::ConfigError;

/// One word of a [`CommandTemplate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// Copied into every invocation verbatim.
    Literal(String),
    /// `$N` with `N >= 1`: replaced by field `N` of the current record.
    Placeholder(usize),
}

impl Token {
    /// Classifies a single template word.
    ///
    /// Only `$` followed by digits without a leading zero is a placeholder (`$1`, `$12`).
    /// Anything else, including `$0`, `$01`, `$x` or an index that does not fit `usize`, is a literal.
    pub fn parse(word: &str) -> Self {
        match placeholder_index(word) {
            Some(index) => Token::Placeholder(index),
            None => Token::Literal(word.to_string()),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Literal(s) => f.write_str(s),
            Token::Placeholder(i) => write!(f, "${i}"),
        }
    }
}

fn placeholder_index(word: &str) -> Option<usize> {
    let digits = word.strip_prefix('$')?;
    let mut chars = digits.chars();
    if !matches!(chars.next(), Some('1'..='9')) {
        return None;
    }
    if !chars.all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Whitespace-separated command template, e.g. `cp $1 $2`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandTemplate {
    tokens: Vec<Token>,
}

impl CommandTemplate {
    pub fn parse(template: &str) -> Result<Self, ConfigError> {
        let tokens: Vec<Token> = template.split_whitespace().map(Token::parse).collect();
        if tokens.is_empty() {
            return Err(ConfigError::EmptyTemplate);
        }
        Ok(Self { tokens })
    }

    #[inline]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

impl FromStr for CommandTemplate {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, token) in self.tokens.iter().enumerate() {
            if n > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}
