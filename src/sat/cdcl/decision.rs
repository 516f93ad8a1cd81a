use crate::sat::formula::{Lit, Var, VarHeap};
use crate::sat::formula::assignment::{Assignment, LBool};


pub struct DecisionSettings {
    pub var_decay: f64, // activity increment grows by 1/var_decay per conflict
}

impl Default for DecisionSettings {
    fn default() -> Self {
        DecisionSettings { var_decay: 0.8 }
    }
}


// VSIDS with phase saving. Activities only ever grow; relative order is
// preserved through the periodic 1e-100 rescale.
pub struct DecisionHeuristic {
    settings: DecisionSettings,
    var_inc: f64,
    activity: Vec<f64>,
    saved: Vec<i8>,      // last polarity on retraction: +1 / -1, 0 = none
    local_best: Vec<i8>, // assignment snapshot at the longest trail seen
    queue: VarHeap,
}

impl DecisionHeuristic {
    pub fn new(settings: DecisionSettings) -> DecisionHeuristic {
        DecisionHeuristic {
            settings,
            var_inc: 1.0,
            activity: Vec::new(),
            saved: Vec::new(),
            local_best: Vec::new(),
            queue: VarHeap::new(),
        }
    }

    pub fn grow_to(&mut self, vars: usize) {
        while self.activity.len() < vars {
            let v = Var::from_index(self.activity.len());
            self.activity.push(0.0);
            self.saved.push(0);
            self.local_best.push(0);
            let act = &self.activity;
            self.queue.insert(v, |a, b| act[a.index()] > act[b.index()]);
        }
    }

    pub fn bump_activity(&mut self, v: Var, coeff: f64) {
        self.activity[v.index()] += self.var_inc * coeff;
        if self.activity[v.index()] > 1e100 {
            for act in self.activity.iter_mut() {
                *act *= 1e-100;
            }
            self.var_inc *= 1e-100;
        }

        if self.queue.contains(&v) {
            let act = &self.activity;
            self.queue.update(&v, |a, b| act[a.index()] > act[b.index()]);
        }
    }

    pub fn decay_activity(&mut self) {
        self.var_inc *= 1.0 / self.settings.var_decay;
    }

    // Called for every literal undone by backtracking.
    pub fn cancel(&mut self, lit: Lit) {
        let v = lit.var();
        self.saved[v.index()] = if lit.sign() { -1 } else { 1 };
        if !self.queue.contains(&v) {
            let act = &self.activity;
            self.queue.insert(v, |a, b| act[a.index()] > act[b.index()]);
        }
    }

    // Pops until an unassigned variable surfaces; None means every variable
    // is assigned and the formula is satisfied.
    pub fn pick_branch_lit(&mut self, assigns: &Assignment) -> Option<Lit> {
        loop {
            let v = {
                let act = &self.activity;
                self.queue.pop(|a, b| act[a.index()] > act[b.index()])?
            };
            if assigns.is_undef(v) {
                return Some(v.lit(self.saved[v.index()] < 0));
            }
        }
    }

    pub fn record_local_best(&mut self, assigns: &Assignment) {
        for i in 0..self.local_best.len() {
            self.local_best[i] = match assigns.value_of(Var::from_index(i)) {
                LBool::True => 1,
                LBool::False => -1,
                LBool::Undef => 0,
            };
        }
    }

    #[cfg(test)]
    pub fn local_best_phase(&self, v: Var) -> i8 {
        self.local_best[v.index()]
    }

    // Overwrite saved phases from the local-best snapshot; every other call
    // installs the inverted pattern.
    pub fn rephase_from_local_best(&mut self, invert: bool) {
        for i in 0..self.saved.len() {
            self.saved[i] = if invert {
                -self.local_best[i]
            } else {
                self.local_best[i]
            };
        }
    }
}
