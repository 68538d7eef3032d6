//! Classified keys.
//!
//! A [`Key`] is built from a caller pattern by running the validator chain on
//! the raw text and then the converter chain. A key whose last character is the
//! selector marker is a *selector* and stands for its literal prefix together
//! with everything stored beneath it; any other key is *raw* and names one entry.

pub mod pipeline;

use std::fmt;

use crate::error::{Error, Result};
pub use pipeline::{Converter, ConverterPipeline, Validator, ValidatorPipeline};

/// Default selector marker.
pub const SELECTOR: char = '*';

/// An immutable, validated and converted pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    text: String,
    selector: Option<char>,
}

impl Key {
    /// Validate `pattern`, then convert it, then classify the result.
    ///
    /// Validation failures abort before conversion runs. The converted key
    /// must be non-empty and may carry `selector` only as its last character.
    pub fn new(
        pattern: &str,
        selector: char,
        validator: &dyn Validator,
        converter: &dyn Converter,
    ) -> Result<Self> {
        validator
            .validate(pattern)
            .map_err(|source| Error::Validation {
                pattern: pattern.to_owned(),
                source,
            })?;

        let text = converter.convert(pattern);
        let Some(last) = text.chars().last() else {
            return Err(Error::EmptyKey {
                pattern: pattern.to_owned(),
            });
        };

        let body = &text[..text.len() - last.len_utf8()];
        if body.contains(selector) {
            return Err(Error::MisplacedSelector { key: text });
        }

        let selector = (last == selector).then_some(selector);
        Ok(Self { text, selector })
    }

    /// Length in characters, selector included.
    pub fn size(&self) -> usize {
        self.text.chars().count()
    }

    /// True if the key ends with the selector marker.
    pub fn is_selector(&self) -> bool {
        self.selector.is_some()
    }

    /// True if the key names a single entry.
    pub fn is_raw(&self) -> bool {
        !self.is_selector()
    }

    /// The full converted text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The part of the key that is walked: everything but a trailing selector.
    pub fn literal(&self) -> &str {
        match self.selector {
            Some(marker) => &self.text[..self.text.len() - marker.len_utf8()],
            None => &self.text,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
