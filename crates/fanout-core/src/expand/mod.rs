//! Template expansion.
//!
//! `$N` takes field `N` of the record. A placeholder whose field is missing or empty is
//! dropped from the argument vector entirely; it never becomes an empty argument.

use fanout_model::{CommandTemplate, InputRecord, Invocation, Token};

pub fn expand(template: &CommandTemplate, record: &InputRecord) -> Invocation {
    let argv = template
        .tokens()
        .iter()
        .filter_map(|token| match token {
            Token::Literal(word) => Some(word.clone()),
            Token::Placeholder(index) => index
                .checked_sub(1)
                .and_then(|n| record.field(n))
                .filter(|field| !field.is_empty())
                .map(str::to_string),
        })
        .collect();
    Invocation::new(argv)
}
