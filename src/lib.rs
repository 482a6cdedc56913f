//! The `algebra` module is the kernel of the crate: union, intersection,
//! difference, symmetric difference, and subset/superset tests over ordered
//! sets. Around it:
//!
//! * `config` loads `.properties` files,
//! * `json` is a small policy-driven facade over `serde_json`, and
//! * `args`, `io` and `operations` make up the `setwise` command, which treats
//!   each of two files as a set of lines.
//!
//! Current Limitations:
//! * A "line" is zero or more non-newline bytes followed by a newline, after
//!   UTF-16 input (marked by a Byte Order Mark) has been translated to UTF-8.
//! * Output lines are sorted by their bytes, not by any locale's collation.

#![cfg_attr(debug_assertions, allow(dead_code, unused_imports))]
#![deny(unused_must_use)]
#![deny(clippy::all)]
#![allow(clippy::needless_return)]
#![deny(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![deny(missing_docs)]

pub mod algebra;
pub mod args;
pub mod config;
pub mod io;
pub mod json;
pub mod operations;

pub use algebra::{
    difference, intersection, is_subset, is_superset, sym_difference, union, Outcome, Set,
    SetError, SetOp, Side,
};
pub use config::{ConfigError, Properties};
pub use json::{FieldNaming, JsonError, JsonFacade};
