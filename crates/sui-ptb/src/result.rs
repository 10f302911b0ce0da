//! Handles to command outputs.
//!
//! A Move call can return several values. [`TransactionResult`] wraps the
//! command's `Result(index)` argument and hands out `NestedResult(index, i)`
//! arguments for the individual values, caching each one so repeated access
//! to the same sub-index yields the same argument.
//!
//! `Result(i)` means "the command's sole output" and `NestedResult(i, 0)`
//! means "the first of several outputs". They are never interchangeable.
//!
//! ## Example
//!
//! ```
//! use sui_ptb::{Argument, TransactionResult};
//!
//! let mut pool = TransactionResult::new(4);
//! let base = pool.nested(0);
//! let quote = pool.nested(1);
//! assert_eq!(base, Argument::NestedResult(4, 0));
//! assert_eq!(quote, Argument::NestedResult(4, 1));
//! assert_eq!(pool.argument(), Argument::Result(4));
//! ```

use smallvec::SmallVec;

use crate::argument::Argument;

/// Most Move functions return at most a handful of values.
const INLINE_NESTED: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionResult {
    index: u16,
    nested: SmallVec<[(u16, Argument); INLINE_NESTED]>,
}

impl TransactionResult {
    pub fn new(index: u16) -> Self {
        Self {
            index,
            nested: SmallVec::new(),
        }
    }

    /// Command index this handle refers to.
    pub fn index(&self) -> u16 {
        self.index
    }

    /// `Result(index)`: the command's sole output.
    pub fn argument(&self) -> Argument {
        Argument::Result(self.index)
    }

    /// `NestedResult(index, sub_index)`, created on first access and cached.
    pub fn nested(&mut self, sub_index: u16) -> Argument {
        *self.nested_ref(sub_index)
    }

    /// Cached slot for `sub_index`, inserting it if this is the first access.
    pub fn nested_ref(&mut self, sub_index: u16) -> &Argument {
        let pos = match self.nested.iter().position(|(sub, _)| *sub == sub_index) {
            Some(pos) => pos,
            None => {
                self.nested
                    .push((sub_index, Argument::NestedResult(self.index, sub_index)));
                self.nested.len() - 1
            }
        };
        &self.nested[pos].1
    }

    /// The first `count` nested arguments, e.g. both coins out of a two-way split.
    pub fn nested_range(&mut self, count: u16) -> Vec<Argument> {
        (0..count).map(|sub| self.nested(sub)).collect()
    }

    /// Number of distinct sub-indices handed out so far.
    pub fn cached_len(&self) -> usize {
        self.nested.len()
    }
}

impl From<&TransactionResult> for Argument {
    fn from(result: &TransactionResult) -> Self {
        result.argument()
    }
}

impl From<TransactionResult> for Argument {
    fn from(result: TransactionResult) -> Self {
        result.argument()
    }
}
