use self::formula::{Lit, VarMap};

pub mod cdcl;
pub mod dimacs;
pub mod formula;


pub enum TotalResult {
    UnSAT,
    SAT(VarMap<bool>),
    Interrupted,
}


#[derive(Clone, Copy, Default, Debug)]
pub struct Stats {
    pub decisions: u64,
    pub conflicts: u64,
    pub propagations: u64,
    pub restarts: u64,
    pub rephases: u64,
    pub reduces: u64,
    pub learnts: u64,
}


// Contract between the search core and its parsing/CLI collaborators.
pub trait Solver {
    fn n_vars(&self) -> usize;
    fn n_clauses(&self) -> usize;

    // Reserves per-variable structures up front; variables past the hint
    // are still grown on demand.
    fn reserve(&mut self, vars: usize, clauses_hint: usize);

    // Returns false when the clause makes the formula trivially
    // unsatisfiable (empty clause, or a unit contradicting an earlier one).
    fn add_clause(&mut self, lits: &[Lit]) -> bool;

    // Propagates the unit facts gathered during input; false means UNSAT
    // without ever entering the search loop.
    fn finalize(&mut self) -> bool;

    fn solve(&mut self) -> TotalResult;

    fn stats(&self) -> Stats;
}
