use std::fmt;

/// Concrete argument vector produced by expanding a template against one record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Invocation {
    argv: Vec<String>,
}

impl Invocation {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    #[inline]
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// First word, or `None` when every template token was dropped.
    #[inline]
    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    #[inline]
    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or(&[])
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.argv.is_empty()
    }

    /// Words joined by single spaces. Used as the shell command line and in diagnostics.
    pub fn words(&self) -> String {
        self.argv.join(" ")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.words())
    }
}

impl From<Vec<String>> for Invocation {
    fn from(argv: Vec<String>) -> Self {
        Self::new(argv)
    }
}
