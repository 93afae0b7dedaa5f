//! Symbolic CTL model checking over a hash-consed BDD engine.
//!
//! Given a finite Kripke structure ([`TransitionSystem`]) and a CTL formula,
//! [`ModelChecker::satisfies`] decides whether every initial state satisfies
//! the formula, by compiling the formula to a fixed-point computation over
//! [`BddManager`]-owned BDDs.

pub mod bdd;
pub mod ctl;
mod error;
mod eval;
pub mod ts;

pub use bdd::{Bdd, BddManager};
pub use ctl::Ast;
pub use error::{Error, Result};
pub use eval::{Formula, ModelChecker};
pub use ts::TransitionSystem;
