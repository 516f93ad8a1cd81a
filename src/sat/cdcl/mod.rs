use crate::sat::{self, Solver, Stats, TotalResult};
use crate::sat::formula::{Lit, Var, VarMap};
use crate::sat::formula::assignment::{Assignment, LBool};
use self::clause_db::{ClauseDB, ClauseDBSettings, ClauseRef};
use self::conflict::{AnalyzeContext, Conflict};
use self::decision::{DecisionHeuristic, DecisionSettings};
use self::random::Random;
use self::watches::Watches;

pub mod clause_db;
pub mod conflict;
pub mod decision;
pub mod random;
mod watches;


// Restarts fire when the recent LBD average drifts above the long-run
// average: the search has wandered into a region producing poor clauses.
#[derive(Clone, Copy, Debug)]
pub struct RestartStrategy {
    pub trigger_ratio: f64,
}

impl Default for RestartStrategy {
    fn default() -> Self {
        RestartStrategy { trigger_ratio: 0.8 }
    }
}


// Rephasing overwrites saved phases from the local-best snapshot. The
// inversion schedule is a strict alternation: odd calls install the
// inverted pattern, even calls the plain one.
#[derive(Clone, Copy, Debug)]
pub struct RephaseStrategy {
    pub initial_limit: u64, // conflicts before the first rephase
}

impl Default for RephaseStrategy {
    fn default() -> Self {
        RephaseStrategy {
            initial_limit: 100_000,
        }
    }
}


#[derive(Clone, Copy, Debug)]
pub struct ReduceStrategy {
    pub initial_limit: u64, // conflicts before the first reduction
    pub limit_inc: u64,     // limit growth per reduction
}

impl Default for ReduceStrategy {
    fn default() -> Self {
        ReduceStrategy {
            initial_limit: 8192,
            limit_inc: 512,
        }
    }
}


pub struct CoreSettings {
    pub heur: DecisionSettings,
    pub db: ClauseDBSettings,
    pub restart: RestartStrategy,
    pub rephase: RephaseStrategy,
    pub reduce: ReduceStrategy,
    pub random_seed: f64,
    pub conflict_budget: Option<u64>,
}

impl Default for CoreSettings {
    fn default() -> Self {
        CoreSettings {
            heur: DecisionSettings::default(),
            db: ClauseDBSettings::default(),
            restart: RestartStrategy::default(),
            rephase: RephaseStrategy::default(),
            reduce: ReduceStrategy::default(),
            random_seed: 91648253.0,
            conflict_budget: None,
        }
    }
}


const LBD_WINDOW: usize = 50;

// Fixed-capacity circular window of recent LBDs plus an all-time sum; the
// ratio of the two drives the restart policy.
struct LbdQueue {
    queue: [u32; LBD_WINDOW],
    size: usize,
    pos: usize,
    fast_sum: u64,
    slow_sum: u64,
}

impl LbdQueue {
    fn new() -> LbdQueue {
        LbdQueue {
            queue: [0; LBD_WINDOW],
            size: 0,
            pos: 0,
            fast_sum: 0,
            slow_sum: 0,
        }
    }

    fn push(&mut self, lbd: u32) {
        if self.size < LBD_WINDOW {
            self.size += 1;
        } else {
            self.fast_sum -= self.queue[self.pos] as u64;
        }
        self.fast_sum += lbd as u64;
        self.queue[self.pos] = lbd;
        self.pos = (self.pos + 1) % LBD_WINDOW;
        self.slow_sum += lbd.min(LBD_WINDOW as u32) as u64;
    }

    fn should_restart(&self, trigger_ratio: f64, conflicts: u64) -> bool {
        self.size == LBD_WINDOW
            && trigger_ratio * (self.fast_sum as f64) / (self.size as f64)
                > (self.slow_sum as f64) / (conflicts as f64)
    }

    // A restart discards the recent window but keeps the all-time sum.
    fn reset_fast(&mut self) {
        self.size = 0;
        self.pos = 0;
        self.fast_sum = 0;
    }
}


enum SearchStep {
    Continue,
    Sat,
    Unsat,
    Interrupted,
}


pub struct CoreSolver {
    settings: CoreSettings,
    db: ClauseDB,
    assigns: Assignment,
    watches: Watches,
    heur: DecisionHeuristic,
    analyze: AnalyzeContext,
    rand: Random,
    lbd: LbdQueue,
    stats: Stats,
    rephase_limit: u64,
    rephase_inc: u64,
    reduce_counter: u64,
    reduce_limit: u64,
    best_trail: usize,
    ok: bool, // cleared once the input is known contradictory
}

impl CoreSolver {
    pub fn new(settings: CoreSettings) -> CoreSolver {
        let db = ClauseDB::new(ClauseDBSettings {
            reduce_lbd_cutoff: settings.db.reduce_lbd_cutoff,
        });
        let heur = DecisionHeuristic::new(DecisionSettings {
            var_decay: settings.heur.var_decay,
        });
        let seed = settings.random_seed;
        let rephase_limit = settings.rephase.initial_limit;
        let reduce_limit = settings.reduce.initial_limit;
        CoreSolver {
            settings,
            db,
            assigns: Assignment::new(),
            watches: Watches::new(),
            heur,
            analyze: AnalyzeContext::new(),
            rand: Random::new(seed),
            lbd: LbdQueue::new(),
            stats: Stats::default(),
            rephase_limit,
            rephase_inc: rephase_limit,
            reduce_counter: 0,
            reduce_limit,
            best_trail: 0,
            ok: true,
        }
    }

    fn grow_to(&mut self, vars: usize) {
        let old = self.assigns.number_of_vars();
        self.assigns.grow_to(vars);
        self.heur.grow_to(vars);
        self.analyze.grow_to(vars);
        for i in old..vars {
            self.watches.init_var(Var::from_index(i));
        }
    }

    fn ensure_var(&mut self, v: Var) {
        if v.index() >= self.assigns.number_of_vars() {
            self.grow_to(v.index() + 1);
        }
    }

    fn attach_clause(&mut self, lits: Vec<Lit>, lbd: Option<u32>) -> ClauseRef {
        let (c0, c1) = (lits[0], lits[1]);
        let cr = match lbd {
            None => self.db.add(lits),
            Some(lbd) => self.db.learn(lits, lbd),
        };
        self.watches.watch_clause(c0, c1, cr);
        cr
    }

    fn backtrack(&mut self, target_level: usize) {
        let heur = &mut self.heur;
        self.assigns.rewind_to_level(target_level, |lit| heur.cancel(lit));
    }

    // One conflict: learn, backtrack, assert. Returns false on a ground
    // conflict (UNSAT).
    fn handle_conflict(&mut self, confl: ClauseRef) -> bool {
        self.stats.conflicts += 1;
        self.reduce_counter += 1;

        match self.analyze.analyze(&self.db, &mut self.heur, &self.assigns, confl) {
            Conflict::Ground => return false,

            Conflict::Unit(lit, lbd) => {
                self.lbd.push(lbd);
                self.backtrack(0);
                self.assigns.assign_lit(lit, None);
            }

            Conflict::Learned(level, lbd, lits) => {
                self.lbd.push(lbd);
                self.backtrack(level);
                let asserting = lits[0];
                let cr = self.attach_clause(lits.into_vec(), Some(lbd));
                self.assigns.assign_lit(asserting, Some(cr));
                self.stats.learnts += 1;
            }
        }

        self.heur.decay_activity();

        // Snapshot the surviving assignment for rephasing whenever the
        // trail reaches a new high-water mark.
        if self.assigns.number_of_assigns() > self.best_trail {
            self.best_trail = self.assigns.number_of_assigns();
            self.heur.record_local_best(&self.assigns);
        }

        true
    }

    fn restart(&mut self) {
        trace!("restart #{} after {} conflicts", self.stats.restarts + 1, self.stats.conflicts);
        self.stats.restarts += 1;
        self.lbd.reset_fast();
        self.backtrack(0);
    }

    fn rephase(&mut self) {
        let invert = self.stats.rephases % 2 == 1;
        trace!("rephase #{} (inverted: {})", self.stats.rephases + 1, invert);
        self.heur.rephase_from_local_best(invert);
        self.backtrack(0);
        self.stats.rephases += 1;
        self.rephase_inc *= 2;
        self.rephase_limit = self.stats.conflicts + self.rephase_inc;
    }

    // Clause GC. Runs at level 0 only: relocation invalidates in-flight
    // clause references, so no propagation may be pending.
    fn reduce(&mut self) {
        self.backtrack(0);
        self.reduce_counter = 0;
        self.reduce_limit += self.settings.reduce.limit_inc;

        let before = self.db.number_of_learnts();
        let remap = self.db.reduce(&mut self.rand);
        self.watches.apply_remap(&remap);

        self.stats.reduces += 1;
        trace!(
            "reduce #{}: {} of {} learnt clauses dropped",
            self.stats.reduces,
            before - self.db.number_of_learnts(),
            before
        );
    }

    fn decide(&mut self) -> bool {
        match self.heur.pick_branch_lit(&self.assigns) {
            None => false,
            Some(lit) => {
                self.stats.decisions += 1;
                self.assigns.new_decision_level();
                self.assigns.assign_lit(lit, None);
                true
            }
        }
    }

    fn search_step(&mut self) -> SearchStep {
        if let Some(budget) = self.settings.conflict_budget {
            if self.stats.conflicts >= budget {
                self.backtrack(0);
                return SearchStep::Interrupted;
            }
        }

        if let Some(confl) = self.watches.propagate(&mut self.db, &mut self.assigns) {
            if !self.handle_conflict(confl) {
                return SearchStep::Unsat;
            }
        } else if self.reduce_counter >= self.reduce_limit {
            self.reduce();
        } else if self.lbd.should_restart(self.settings.restart.trigger_ratio, self.stats.conflicts) {
            self.restart();
        } else if self.stats.conflicts >= self.rephase_limit {
            self.rephase();
        } else if !self.decide() {
            return SearchStep::Sat;
        }

        SearchStep::Continue
    }

    fn extract_model(&self) -> VarMap<bool> {
        let mut model = VarMap::new();
        for i in 0..self.assigns.number_of_vars() {
            let v = Var::from_index(i);
            match self.assigns.value_of(v) {
                LBool::True => {
                    model.insert(&v, true);
                }
                // an unconstrained variable defaults to false in the model
                _ => {
                    model.insert(&v, false);
                }
            }
        }
        model
    }
}

impl Solver for CoreSolver {
    fn n_vars(&self) -> usize {
        self.assigns.number_of_vars()
    }

    fn n_clauses(&self) -> usize {
        self.db.number_of_origins()
    }

    fn reserve(&mut self, vars: usize, _clauses_hint: usize) {
        self.grow_to(vars);
    }

    fn add_clause(&mut self, lits: &[Lit]) -> bool {
        if !self.ok {
            return false;
        }
        for lit in lits.iter() {
            self.ensure_var(lit.var());
        }

        match lits.len() {
            0 => {
                self.ok = false;
                false
            }

            // Unit facts bypass the database: level-0 assignment, no reason.
            1 => match self.assigns.of_lit(lits[0]) {
                LBool::False => {
                    self.ok = false;
                    false
                }
                LBool::True => true,
                LBool::Undef => {
                    self.assigns.assign_lit(lits[0], None);
                    true
                }
            },

            _ => {
                self.attach_clause(lits.to_vec(), None);
                true
            }
        }
    }

    // One propagation pass over the unit facts gathered during input.
    fn finalize(&mut self) -> bool {
        if !self.ok {
            return false;
        }
        self.db.seal_input();
        if self.watches.propagate(&mut self.db, &mut self.assigns).is_some() {
            self.ok = false;
        }
        self.ok
    }

    fn solve(&mut self) -> TotalResult {
        if !self.ok {
            return TotalResult::UnSAT;
        }

        info!("============================[ Search Statistics ]==============================");
        info!("|  Variables: {:9}   Clauses: {:9}                                |", self.n_vars(), self.n_clauses());

        loop {
            match self.search_step() {
                SearchStep::Continue => {}
                SearchStep::Sat => return TotalResult::SAT(self.extract_model()),
                SearchStep::Unsat => {
                    self.ok = false;
                    return TotalResult::UnSAT;
                }
                SearchStep::Interrupted => return TotalResult::Interrupted,
            }
        }
    }

    fn stats(&self) -> sat::Stats {
        Stats {
            propagations: self.watches.propagations,
            ..self.stats
        }
    }
}
