use std::fmt;
use super::{Lit, Var};
use crate::sat::cdcl::clause_db::ClauseRef;


#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum LBool {
    Undef,
    True,
    False,
}

impl Default for LBool {
    fn default() -> Self {
        LBool::Undef
    }
}


#[derive(Default)]
struct VarLine {
    value: LBool, // value of the positive literal
    level: usize,
    reason: Option<ClauseRef>,
}


// Chronological record of assignments. `lim[l]` is the trail length at the
// moment the decision opening level `l + 1` was pushed; `qhead` points at
// the next trail entry the propagator has not consumed yet.
pub struct Assignment {
    lines: Vec<VarLine>,
    trail: Vec<Lit>,
    lim: Vec<usize>,
    qhead: usize,
}

impl Assignment {
    pub fn new() -> Assignment {
        Assignment {
            lines: Vec::new(),
            trail: Vec::new(),
            lim: Vec::new(),
            qhead: 0,
        }
    }

    pub fn grow_to(&mut self, vars: usize) {
        while self.lines.len() < vars {
            self.lines.push(VarLine::default());
        }
    }

    #[inline]
    pub fn number_of_vars(&self) -> usize {
        self.lines.len()
    }

    #[inline]
    pub fn number_of_assigns(&self) -> usize {
        self.trail.len()
    }

    #[inline]
    pub fn decision_level(&self) -> usize {
        self.lim.len()
    }

    #[inline]
    pub fn new_decision_level(&mut self) {
        self.lim.push(self.trail.len());
    }


    // Callers must have established decision or unit-propagation validity;
    // no consistency check happens here.
    #[inline]
    pub fn assign_lit(&mut self, lit: Lit, reason: Option<ClauseRef>) {
        let level = self.lim.len();
        let line = &mut self.lines[lit.var().index()];
        line.value = if lit.sign() { LBool::False } else { LBool::True };
        line.level = level;
        line.reason = reason;
        self.trail.push(lit);
    }

    #[inline]
    pub fn of_lit(&self, lit: Lit) -> LBool {
        match (self.lines[lit.var().index()].value, lit.sign()) {
            (LBool::Undef, _) => LBool::Undef,
            (v, false) => v,
            (LBool::True, true) => LBool::False,
            (LBool::False, true) => LBool::True,
        }
    }

    #[inline]
    pub fn is_true(&self, lit: Lit) -> bool {
        self.of_lit(lit) == LBool::True
    }

    #[inline]
    pub fn is_false(&self, lit: Lit) -> bool {
        self.of_lit(lit) == LBool::False
    }

    #[inline]
    pub fn is_undef(&self, v: Var) -> bool {
        self.lines[v.index()].value == LBool::Undef
    }

    #[inline]
    pub fn value_of(&self, v: Var) -> LBool {
        self.lines[v.index()].value
    }

    #[inline]
    pub fn level_of(&self, v: Var) -> usize {
        self.lines[v.index()].level
    }

    #[inline]
    pub fn reason_of(&self, v: Var) -> Option<ClauseRef> {
        self.lines[v.index()].reason
    }


    #[inline]
    pub fn dequeue(&mut self) -> Option<Lit> {
        if self.qhead < self.trail.len() {
            let p = self.trail[self.qhead];
            self.qhead += 1;
            Some(p)
        } else {
            None
        }
    }

    #[inline]
    pub fn assign_at(&self, index: usize) -> Lit {
        self.trail[index]
    }


    // Undo every assignment above the boundary of `target_level`, calling
    // `f` for each retracted literal (most recent first). Phase saving and
    // heap reinsertion live in the callback.
    pub fn rewind_to_level<F: FnMut(Lit)>(&mut self, target_level: usize, mut f: F) {
        if self.lim.len() <= target_level {
            return;
        }

        let bound = self.lim[target_level];
        for i in (bound..self.trail.len()).rev() {
            let lit = self.trail[i];
            f(lit);

            let line = &mut self.lines[lit.var().index()];
            line.value = LBool::Undef;
            line.level = 0;
            line.reason = None;
        }

        self.qhead = bound;
        self.trail.truncate(bound);
        self.lim.truncate(target_level);
    }
}

impl fmt::Debug for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for level in 0..=self.lim.len() {
            let l = if level > 0 { self.lim[level - 1] } else { 0 };
            let r = if level < self.lim.len() {
                self.lim[level]
            } else {
                self.trail.len()
            };

            if r > l {
                write!(f, "[{}:", level)?;
                for lit in self.trail[l..r].iter() {
                    write!(f, " {:?}", lit)?;
                }
                write!(f, " ]")?;
            }
        }

        Ok(())
    }
}
