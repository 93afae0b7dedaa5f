//! Explicit-state CTL evaluator used only as a cross-validation oracle for
//! the symbolic evaluator. It walks the same fixed-point definitions over
//! plain state sets instead of BDDs, so it can check the symbolic engine's
//! results independently. Not part of the library's public surface: it is a
//! test oracle only, so it lives under `tests/` instead of `src/`.

use std::collections::HashSet;
use symctl::Ast;

pub struct ExplicitTransitionSystem {
    pub num_states: usize,
    pub post: Vec<HashSet<usize>>,
    pub labeling: Vec<HashSet<String>>,
    pub init: HashSet<usize>,
}

impl ExplicitTransitionSystem {
    pub fn new(
        num_states: usize,
        transitions: &[(usize, usize)],
        labeling: &[(usize, &[&str])],
        init: HashSet<usize>,
    ) -> ExplicitTransitionSystem {
        let mut post = vec![HashSet::new(); num_states];
        for &(u, v) in transitions {
            post[u].insert(v);
        }
        let mut labels = vec![HashSet::new(); num_states];
        for &(state, props) in labeling {
            labels[state] = props.iter().map(|s| s.to_string()).collect();
        }
        ExplicitTransitionSystem { num_states, post, labeling: labels, init }
    }
}

pub struct ExplicitModelChecker<'a> {
    ts: &'a ExplicitTransitionSystem,
}

impl<'a> ExplicitModelChecker<'a> {
    pub fn new(ts: &'a ExplicitTransitionSystem) -> ExplicitModelChecker<'a> {
        ExplicitModelChecker { ts }
    }

    fn pre(&self, x: &HashSet<usize>) -> HashSet<usize> {
        (0..self.ts.num_states).filter(|s| self.ts.post[*s].iter().any(|t| x.contains(t))).collect()
    }

    fn all(&self) -> HashSet<usize> {
        (0..self.ts.num_states).collect()
    }

    fn complement(&self, x: &HashSet<usize>) -> HashSet<usize> {
        self.all().difference(x).copied().collect()
    }

    fn least_fix(&self, f: impl Fn(&HashSet<usize>) -> HashSet<usize>) -> HashSet<usize> {
        let mut y: HashSet<usize> = HashSet::new();
        loop {
            let next = f(&y);
            if next == y {
                return y;
            }
            y = next;
        }
    }

    fn greatest_fix(&self, f: impl Fn(&HashSet<usize>) -> HashSet<usize>) -> HashSet<usize> {
        let mut y = self.all();
        loop {
            let next = f(&y);
            if next == y {
                return y;
            }
            y = next;
        }
    }

    pub fn eval(&self, ast: &Ast) -> HashSet<usize> {
        match ast {
            Ast::Atom(name) => {
                (0..self.ts.num_states).filter(|&s| self.ts.labeling[s].contains(name)).collect()
            }
            Ast::Not(phi) => self.complement(&self.eval(phi)),
            Ast::And(phi, psi) => self.eval(phi).intersection(&self.eval(psi)).copied().collect(),
            Ast::Or(phi, psi) => self.eval(phi).union(&self.eval(psi)).copied().collect(),
            Ast::Ex(phi) => self.pre(&self.eval(phi)),
            Ast::Ax(phi) => {
                let not_phi = self.complement(&self.eval(phi));
                self.complement(&self.pre(&not_phi))
            }
            Ast::Ef(phi) => {
                let base = self.eval(phi);
                self.least_fix(|y| base.union(&self.pre(y)).copied().collect())
            }
            Ast::Af(phi) => {
                let base = self.eval(phi);
                self.least_fix(|y| {
                    let not_pre_not_y = self.complement(&self.pre(&self.complement(y)));
                    base.union(&not_pre_not_y).copied().collect()
                })
            }
            Ast::Eg(phi) => {
                let base = self.eval(phi);
                self.greatest_fix(|y| base.intersection(&self.pre(y)).copied().collect())
            }
            Ast::Ag(phi) => {
                let base = self.eval(phi);
                self.greatest_fix(|y| {
                    let not_pre_not_y = self.complement(&self.pre(&self.complement(y)));
                    base.intersection(&not_pre_not_y).copied().collect()
                })
            }
            Ast::Eu(phi, psi) => {
                let phi_set = self.eval(phi);
                let psi_set = self.eval(psi);
                self.least_fix(|y| {
                    let step = phi_set.intersection(&self.pre(y)).copied().collect::<HashSet<_>>();
                    psi_set.union(&step).copied().collect()
                })
            }
            Ast::Au(phi, psi) => {
                let phi_set = self.eval(phi);
                let psi_set = self.eval(psi);
                self.least_fix(|y| {
                    let not_pre_not_y = self.complement(&self.pre(&self.complement(y)));
                    let step = phi_set.intersection(&not_pre_not_y).copied().collect::<HashSet<_>>();
                    psi_set.union(&step).copied().collect()
                })
            }
        }
    }

    pub fn satisfies(&self, ast: &Ast) -> bool {
        let result = self.eval(ast);
        self.ts.init.is_subset(&result)
    }
}
