/// Fields of one input line, split on runs of whitespace.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputRecord {
    fields: Vec<String>,
}

impl InputRecord {
    pub fn from_line(line: &str) -> Self {
        Self {
            fields: line.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// Field `n` counted from zero.
    #[inline]
    pub fn field(&self, n: usize) -> Option<&str> {
        self.fields.get(n).map(String::as_str)
    }

    #[inline]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Vec<String>> for InputRecord {
    fn from(fields: Vec<String>) -> Self {
        Self { fields }
    }
}

impl<'a> FromIterator<&'a str> for InputRecord {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(str::to_string).collect(),
        }
    }
}
