//! A reduced ordered binary decision diagram (ROBDD) engine.
//!
//! Every `BddManager` keeps a single arena shared by all formulas it ever
//! produces, rather than giving each formula its own private node vector.
//! Node creation always goes through [`BddManager::mk_node`], which consults
//! a persistent unique table, so a [`Bdd`] handle is just an arena index and
//! two handles are equal iff the functions they denote are equal: index
//! equality is semantic equality for the lifetime of the manager.

mod dot_printer;

use crate::error::{Error, Result};
use fxhash::FxHashMap;
use std::cell::RefCell;

/// Handle to a canonical BDD node inside one [`BddManager`]. Cheap to copy;
/// only ever comparable to other handles produced by the *same* manager
/// (comparing handles across two different engines is undefined, per the
/// spec this crate implements).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bdd(u32);

const FALSE_IDX: u32 = 0;
const TRUE_IDX: u32 = 1;

impl Bdd {
    pub const FALSE: Bdd = Bdd(FALSE_IDX);
    pub const TRUE: Bdd = Bdd(TRUE_IDX);

    fn idx(self) -> u32 {
        self.0
    }

    pub(crate) fn raw_index(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Node {
    var: u32,
    low: u32,
    high: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Op {
    And,
    Or,
    Xor,
}

struct Inner {
    nodes: Vec<Node>,
    unique: FxHashMap<Node, u32>,
    apply_memo: FxHashMap<(Op, u32, u32), u32>,
    restrict_memo: FxHashMap<(u32, u32, bool), u32>,
    subst_memo: FxHashMap<(u32, u64), u32>,
}

/// Owns every node ever produced for one fixed, declared variable set.
///
/// A `BddManager` is the hash-consing "unique table" plus the "computed
/// table" memo of the BDD literature, combined into a single arena so that
/// node identity and operation memoization share one persistent store for
/// the whole lifetime of the transition system built on top of it.
pub struct BddManager {
    num_vars: u32,
    var_names: Vec<String>,
    var_index: FxHashMap<String, u32>,
    inner: RefCell<Inner>,
}

impl BddManager {
    /// Declares the variable order. Variable `i` in `names` becomes the
    /// `i`-th variable in the order (root-most first).
    pub fn declare(names: Vec<String>) -> BddManager {
        let num_vars = names.len() as u32;
        let mut var_index = FxHashMap::default();
        for (i, name) in names.iter().enumerate() {
            var_index.insert(name.clone(), i as u32);
        }
        log::debug!("declared BDD manager with {} variables", num_vars);
        BddManager {
            num_vars,
            var_names: names,
            var_index,
            inner: RefCell::new(Inner {
                nodes: vec![
                    Node { var: num_vars, low: FALSE_IDX, high: FALSE_IDX },
                    Node { var: num_vars, low: TRUE_IDX, high: TRUE_IDX },
                ],
                unique: FxHashMap::default(),
                apply_memo: FxHashMap::default(),
                restrict_memo: FxHashMap::default(),
                subst_memo: FxHashMap::default(),
            }),
        }
    }

    pub fn num_vars(&self) -> u32 {
        self.num_vars
    }

    pub fn var_name(&self, var: u32) -> &str {
        &self.var_names[var as usize]
    }

    pub fn mk_true(&self) -> Bdd {
        Bdd::TRUE
    }

    pub fn mk_false(&self) -> Bdd {
        Bdd::FALSE
    }

    /// Returns the BDD `x` for the variable of the given name.
    pub fn var(&self, name: &str) -> Result<Bdd> {
        let index = *self
            .var_index
            .get(name)
            .ok_or_else(|| Error::UnknownVariable(name.to_string()))?;
        Ok(self.mk_node(index, Bdd::FALSE, Bdd::TRUE))
    }

    fn var_of(&self, node: u32) -> u32 {
        if node < 2 {
            self.num_vars
        } else {
            self.inner.borrow().nodes[node as usize].var
        }
    }

    fn low_of(&self, node: u32) -> u32 {
        self.inner.borrow().nodes[node as usize].low
    }

    fn high_of(&self, node: u32) -> u32 {
        self.inner.borrow().nodes[node as usize].high
    }

    /// Constructs (or reuses, via the unique table) the node `(var, low,
    /// high)`, applying the reduction rule `low == high => low`.
    fn mk_node(&self, var: u32, low: Bdd, high: Bdd) -> Bdd {
        if low == high {
            return low;
        }
        debug_assert!(
            var < self.var_of(low.idx()) && var < self.var_of(high.idx()),
            "BDD ordering violated: var {} must precede children's variables",
            var
        );
        let key = Node { var, low: low.idx(), high: high.idx() };
        let mut inner = self.inner.borrow_mut();
        if let Some(&idx) = inner.unique.get(&key) {
            return Bdd(idx);
        }
        let idx = inner.nodes.len() as u32;
        inner.nodes.push(key);
        inner.unique.insert(key, idx);
        Bdd(idx)
    }

    fn is_terminal(node: u32) -> bool {
        node < 2
    }

    fn terminal_value(op: Op, l: u32, r: u32) -> Option<bool> {
        let lv = l == TRUE_IDX;
        let rv = r == TRUE_IDX;
        // Short-circuit absorbing elements even when only one side is terminal,
        // and resolve fully once both sides are terminal.
        match op {
            Op::And => {
                if l == FALSE_IDX || r == FALSE_IDX {
                    Some(false)
                } else if Self::is_terminal(l) && Self::is_terminal(r) {
                    Some(lv && rv)
                } else {
                    None
                }
            }
            Op::Or => {
                if l == TRUE_IDX || r == TRUE_IDX {
                    Some(true)
                } else if Self::is_terminal(l) && Self::is_terminal(r) {
                    Some(lv || rv)
                } else {
                    None
                }
            }
            Op::Xor => {
                if Self::is_terminal(l) && Self::is_terminal(r) {
                    Some(lv != rv)
                } else {
                    None
                }
            }
        }
    }

    /// Shannon-expansion apply with a persistent computed table, using an
    /// explicit stack to avoid recursion depth issues, with every node
    /// created through the manager's single global `mk_node`.
    fn apply(&self, op: Op, left: Bdd, right: Bdd) -> Bdd {
        let (left, right) = (left.idx(), right.idx());
        if let Some(v) = Self::terminal_value(op, left, right) {
            return if v { Bdd::TRUE } else { Bdd::FALSE };
        }
        if let Some(&cached) = self.inner.borrow().apply_memo.get(&(op, left, right)) {
            return Bdd(cached);
        }

        let mut stack: Vec<(u32, u32)> = vec![(left, right)];
        while let Some(&(l, r)) = stack.last() {
            if self.inner.borrow().apply_memo.contains_key(&(op, l, r)) {
                stack.pop();
                continue;
            }
            if let Some(v) = Self::terminal_value(op, l, r) {
                let idx = if v { TRUE_IDX } else { FALSE_IDX };
                self.inner.borrow_mut().apply_memo.insert((op, l, r), idx);
                stack.pop();
                continue;
            }
            let (vl, vr) = (self.var_of(l), self.var_of(r));
            let decision_var = vl.min(vr);
            let (ll, lh) = if vl == decision_var { (self.low_of(l), self.high_of(l)) } else { (l, l) };
            let (rl, rh) = if vr == decision_var { (self.low_of(r), self.high_of(r)) } else { (r, r) };

            let lo = self.resolved(op, ll, rl);
            let hi = self.resolved(op, lh, rh);
            match (lo, hi) {
                (Some(lo), Some(hi)) => {
                    let node = self.mk_node(decision_var, Bdd(lo), Bdd(hi));
                    self.inner.borrow_mut().apply_memo.insert((op, l, r), node.idx());
                    stack.pop();
                }
                (None, Some(_)) => stack.push((ll, rl)),
                (Some(_), None) => stack.push((lh, rh)),
                (None, None) => {
                    stack.push((ll, rl));
                    stack.push((lh, rh));
                }
            }
        }

        let idx = *self.inner.borrow().apply_memo.get(&(op, left, right)).expect("apply DFS did not resolve root");
        Bdd(idx)
    }

    fn resolved(&self, op: Op, l: u32, r: u32) -> Option<u32> {
        if let Some(v) = Self::terminal_value(op, l, r) {
            return Some(if v { TRUE_IDX } else { FALSE_IDX });
        }
        self.inner.borrow().apply_memo.get(&(op, l, r)).copied()
    }

    pub fn and(&self, f: Bdd, g: Bdd) -> Bdd {
        self.apply(Op::And, f, g)
    }

    pub fn or(&self, f: Bdd, g: Bdd) -> Bdd {
        self.apply(Op::Or, f, g)
    }

    pub fn xor(&self, f: Bdd, g: Bdd) -> Bdd {
        self.apply(Op::Xor, f, g)
    }

    pub fn not(&self, f: Bdd) -> Bdd {
        self.apply(Op::Xor, f, Bdd::TRUE)
    }

    pub fn implies(&self, f: Bdd, g: Bdd) -> Bdd {
        let not_f = self.not(f);
        self.or(not_f, g)
    }

    /// `restrict(f, var, value)`: the cofactor of `f` with `var` fixed to
    /// `value`.
    fn restrict(&self, f: Bdd, var: u32, value: bool) -> Bdd {
        let node = f.idx();
        if Self::is_terminal(node) {
            return f;
        }
        if let Some(&cached) = self.inner.borrow().restrict_memo.get(&(node, var, value)) {
            return Bdd(cached);
        }
        let fvar = self.var_of(node);
        let result = if fvar > var {
            // `var` does not occur on any path through this node.
            f
        } else if fvar == var {
            if value { Bdd(self.high_of(node)) } else { Bdd(self.low_of(node)) }
        } else {
            let lo = self.restrict(Bdd(self.low_of(node)), var, value);
            let hi = self.restrict(Bdd(self.high_of(node)), var, value);
            self.mk_node(fvar, lo, hi)
        };
        self.inner.borrow_mut().restrict_memo.insert((node, var, value), result.idx());
        result
    }

    /// Existential quantification `∃ vars. f`, eliminating one variable at a
    /// time in ascending variable order, as spec'd: `or(restrict(f,v,0),
    /// restrict(f,v,1))` per quantified variable.
    pub fn exists(&self, vars: &[u32], f: Bdd) -> Bdd {
        let mut sorted: Vec<u32> = vars.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        let mut result = f;
        for v in sorted {
            log::trace!("exists: eliminating variable {}", v);
            let r0 = self.restrict(result, v, false);
            let r1 = self.restrict(result, v, true);
            result = self.or(r0, r1);
        }
        result
    }

    /// Simultaneous variable-to-variable substitution `f[subst]`.
    ///
    /// Precondition (not checked outside debug builds): `subst` must be
    /// order-monotonic, i.e. if `a < b` in the declared variable order then
    /// `subst.get(a).unwrap_or(a) < subst.get(b).unwrap_or(b)` too. Every
    /// substitution the encoder builds (priming/unpriming) satisfies this by
    /// construction; violating it is an engine bug, not a user error.
    pub fn substitute(&self, subst: &FxHashMap<u32, u32>, f: Bdd) -> Bdd {
        let subst_id = Self::subst_fingerprint(subst);
        self.substitute_rec(subst, subst_id, f)
    }

    fn subst_fingerprint(subst: &FxHashMap<u32, u32>) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut pairs: Vec<(u32, u32)> = subst.iter().map(|(&k, &v)| (k, v)).collect();
        pairs.sort_unstable();
        let mut hasher = fxhash::FxHasher::default();
        pairs.hash(&mut hasher);
        hasher.finish()
    }

    fn substitute_rec(&self, subst: &FxHashMap<u32, u32>, subst_id: u64, f: Bdd) -> Bdd {
        let node = f.idx();
        if Self::is_terminal(node) {
            return f;
        }
        if let Some(&cached) = self.inner.borrow().subst_memo.get(&(node, subst_id)) {
            return Bdd(cached);
        }
        let fvar = self.var_of(node);
        let new_var = *subst.get(&fvar).unwrap_or(&fvar);
        let lo = self.substitute_rec(subst, subst_id, Bdd(self.low_of(node)));
        let hi = self.substitute_rec(subst, subst_id, Bdd(self.high_of(node)));
        let result = self.mk_node(new_var, lo, hi);
        self.inner.borrow_mut().subst_memo.insert((node, subst_id), result.idx());
        result
    }

    pub fn is_false(&self, f: Bdd) -> bool {
        f == Bdd::FALSE
    }

    pub fn is_true(&self, f: Bdd) -> bool {
        f == Bdd::TRUE
    }

    /// Renders the subgraph reachable from `root` as a `.dot` string, using
    /// declared variable names. Diagnostic only.
    pub fn as_dot_string(&self, root: Bdd, zero_pruned: bool) -> String {
        let mut buffer: Vec<u8> = Vec::new();
        dot_printer::print_bdd_as_dot(&mut buffer, self, root, zero_pruned)
            .expect("writing to an in-memory buffer cannot fail");
        String::from_utf8(buffer).expect("dot printer only emits ASCII/UTF-8")
    }

    pub(crate) fn node_var(&self, node: Bdd) -> u32 {
        self.var_of(node.idx())
    }
    pub(crate) fn node_low(&self, node: Bdd) -> Bdd {
        Bdd(self.low_of(node.idx()))
    }
    pub(crate) fn node_high(&self, node: Bdd) -> Bdd {
        Bdd(self.high_of(node.idx()))
    }
}
