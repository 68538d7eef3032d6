//! # delta-trie
//!
//! An in-memory store from slash-delimited string keys to integer counters,
//! backed by a character trie.
//!
//! A pattern ending in the selector marker (`*` by default) stands for its
//! literal prefix and every key stored beneath it. Selectors can be read in
//! aggregate and incremented lazily: an increment on `home/*` is recorded once
//! on the `home/` node and applies to every key under it, present or future,
//! without rewriting any of them.
//!
//! ## Example
//!
//! ```rust
//! use delta_trie::{ConverterPipeline, Repository};
//!
//! let repo = Repository::new()
//!     .with_converter(ConverterPipeline::new().with_hook(|p: &str| p.to_lowercase()));
//!
//! repo.insert("home/", 1).unwrap();
//! repo.insert("home/bin/", 1).unwrap();
//! repo.insert("home/bin/tar", 1).unwrap();
//!
//! repo.inc("HOME/bin/*").unwrap();
//!
//! assert_eq!(repo.get_value("home/bin/tar").unwrap(), 1);
//! assert_eq!(repo.get_value("home/bin/*").unwrap(), 4);
//! assert_eq!(repo.get_value("*").unwrap(), 5);
//! assert_eq!(repo.size(), 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod debug;
pub mod error;
pub mod key;
pub mod node;
pub mod repository;

pub use error::{Error, HookError, Result};
pub use key::{Converter, ConverterPipeline, Key, Validator, ValidatorPipeline, SELECTOR};
pub use repository::{Config, Repository};

#[cfg(test)]
mod proptests;
