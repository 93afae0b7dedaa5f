//! The symbolic CTL evaluator: a pure fold over the AST producing a BDD over
//! current-state variables, and the final `Init ⇒ result` satisfaction check.

use crate::bdd::Bdd;
use crate::ctl::{self, Ast};
use crate::error::Result;
use crate::ts::TransitionSystem;

/// Either an unparsed formula string or an already-parsed [`Ast`]. Accepted
/// by [`ModelChecker::satisfies`] via `Into<Formula>`.
pub enum Formula {
    Text(String),
    Parsed(Ast),
}

impl From<&str> for Formula {
    fn from(s: &str) -> Self {
        Formula::Text(s.to_string())
    }
}

impl From<String> for Formula {
    fn from(s: String) -> Self {
        Formula::Text(s)
    }
}

impl From<Ast> for Formula {
    fn from(ast: Ast) -> Self {
        Formula::Parsed(ast)
    }
}

/// Evaluates CTL formulas over one [`TransitionSystem`].
pub struct ModelChecker<'a> {
    ts: &'a TransitionSystem,
}

impl<'a> ModelChecker<'a> {
    pub fn new(ts: &'a TransitionSystem) -> ModelChecker<'a> {
        ModelChecker { ts }
    }

    /// Returns `true` iff every initial state satisfies `formula`.
    pub fn satisfies(&self, formula: impl Into<Formula>) -> Result<bool> {
        let ast = match formula.into() {
            Formula::Text(text) => ctl::parse(&text)?,
            Formula::Parsed(ast) => ast,
        };
        let result = self.eval(&ast)?;
        let bdd = self.ts.bdd();
        let mut init_states = bdd.mk_false();
        for &s in self.ts.init() {
            init_states = bdd.or(init_states, self.ts.state_bdd(s));
        }
        let not_result = bdd.not(result);
        let violation = bdd.and(init_states, not_result);
        Ok(bdd.is_false(violation))
    }

    /// Evaluates `φ` into `⟦φ⟧`, the BDD of states satisfying it.
    pub fn eval(&self, ast: &Ast) -> Result<Bdd> {
        let bdd = self.ts.bdd();
        Ok(match ast {
            Ast::Atom(name) => self.ts.ap_bdd(name),
            Ast::Not(phi) => bdd.not(self.eval(phi)?),
            Ast::And(phi, psi) => {
                let l = self.eval(phi)?;
                let r = self.eval(psi)?;
                bdd.and(l, r)
            }
            Ast::Or(phi, psi) => {
                let l = self.eval(phi)?;
                let r = self.eval(psi)?;
                bdd.or(l, r)
            }
            Ast::Ex(phi) => {
                let inner = self.eval(phi)?;
                self.ts.pre(inner)
            }
            Ast::Ax(phi) => {
                let not_phi = bdd.not(self.eval(phi)?);
                bdd.not(self.ts.pre(not_phi))
            }
            Ast::Ef(phi) => {
                let base = self.eval(phi)?;
                self.least_fix(|y| bdd.or(base, self.ts.pre(y)))
            }
            Ast::Af(phi) => {
                let base = self.eval(phi)?;
                self.least_fix(|y| bdd.or(base, bdd.not(self.ts.pre(bdd.not(y)))))
            }
            Ast::Eg(phi) => {
                let base = self.eval(phi)?;
                self.greatest_fix(|y| bdd.and(base, self.ts.pre(y)))
            }
            Ast::Ag(phi) => {
                let base = self.eval(phi)?;
                self.greatest_fix(|y| bdd.and(base, bdd.not(self.ts.pre(bdd.not(y)))))
            }
            Ast::Eu(phi, psi) => {
                let phi_bdd = self.eval(phi)?;
                let psi_bdd = self.eval(psi)?;
                self.least_fix(|y| bdd.or(psi_bdd, bdd.and(phi_bdd, self.ts.pre(y))))
            }
            Ast::Au(phi, psi) => {
                let phi_bdd = self.eval(phi)?;
                let psi_bdd = self.eval(psi)?;
                self.least_fix(|y| bdd.or(psi_bdd, bdd.and(phi_bdd, bdd.not(self.ts.pre(bdd.not(y))))))
            }
        })
    }

    /// `μY. F(Y)`, starting from `false`, iterating until two successive
    /// iterates are the same canonical `Bdd` (index equality, given the
    /// engine's hash-consing, so this is semantic equality too).
    fn least_fix(&self, f: impl Fn(Bdd) -> Bdd) -> Bdd {
        let bdd = self.ts.bdd();
        let mut y = bdd.mk_false();
        let mut iterations = 0u32;
        loop {
            let next = f(y);
            iterations += 1;
            if next == y {
                log::trace!("least fixed point reached after {iterations} iterations");
                return y;
            }
            y = next;
        }
    }

    /// `νY. F(Y)`, starting from `true`.
    fn greatest_fix(&self, f: impl Fn(Bdd) -> Bdd) -> Bdd {
        let bdd = self.ts.bdd();
        let mut y = bdd.mk_true();
        let mut iterations = 0u32;
        loop {
            let next = f(y);
            iterations += 1;
            if next == y {
                log::trace!("greatest fixed point reached after {iterations} iterations");
                return y;
            }
            y = next;
        }
    }
}
