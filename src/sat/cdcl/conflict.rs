use crate::sat::formula::Lit;
use crate::sat::formula::assignment::Assignment;
use super::clause_db::{ClauseDB, ClauseRef};
use super::decision::DecisionHeuristic;


pub enum Conflict {
    // Conflict at level 0: the formula is unsatisfiable.
    Ground,
    Unit(Lit, u32),
    Learned(usize, u32, Box<[Lit]>),
}


// First-UIP learning. The mark buffer doubles as the scratch space for the
// LBD count (indexed by decision level there); the stamp is bumped between
// the two uses so stale marks never leak from one phase into the other.
pub struct AnalyzeContext {
    stamp: u64,
    mark: Vec<u64>,
    touched: Vec<Lit>,
}

impl AnalyzeContext {
    pub fn new() -> AnalyzeContext {
        AnalyzeContext {
            stamp: 0,
            mark: Vec::new(),
            touched: Vec::new(),
        }
    }

    pub fn grow_to(&mut self, vars: usize) {
        // levels range up to the variable count, hence the extra slot
        while self.mark.len() < vars + 1 {
            self.mark.push(0);
        }
    }

    // Description:
    //   Walk the implication graph backward from the conflicting clause,
    //   resolving on the most recently assigned marked literal until a
    //   single literal of the conflict level remains -- the first UIP. Its
    //   negation becomes slot 0 of the learnt clause.
    //
    //   Post-conditions:
    //     * on Learned, slot 1 holds the highest-level literal of the rest,
    //       and the returned level is that literal's level.
    pub fn analyze(
        &mut self,
        db: &ClauseDB,
        heur: &mut DecisionHeuristic,
        assigns: &Assignment,
        confl0: ClauseRef,
    ) -> Conflict {
        let conflict_level = assigns.level_of(db.view(confl0).lits()[0].var());
        if conflict_level == 0 {
            return Conflict::Ground;
        }

        self.stamp += 1;
        self.touched.clear();

        let mut rest: Vec<Lit> = Vec::new();
        let mut pending = 0; // marked literals of the conflict level not yet resolved
        let mut confl = confl0;
        let mut index = assigns.number_of_assigns();
        let mut first_clause = true;

        let uip = loop {
            let c = db.view(confl);
            // Slot 0 of a reason clause is the literal just resolved away.
            let start = if first_clause { 0 } else { 1 };
            first_clause = false;

            for &q in &c.lits()[start..] {
                let v = q.var();
                if self.mark[v.index()] != self.stamp && assigns.level_of(v) > 0 {
                    heur.bump_activity(v, 0.5);
                    self.touched.push(q);
                    self.mark[v.index()] = self.stamp;
                    if assigns.level_of(v) >= conflict_level {
                        pending += 1;
                    } else {
                        rest.push(q);
                    }
                }
            }

            // Most recently assigned marked literal of the conflict level.
            let resolve_lit = loop {
                index -= 1;
                let l = assigns.assign_at(index);
                if self.mark[l.var().index()] != self.stamp {
                    continue;
                }
                if assigns.level_of(l.var()) >= conflict_level {
                    break l;
                }
            };

            self.mark[resolve_lit.var().index()] = 0;
            pending -= 1;
            if pending == 0 {
                break resolve_lit;
            }

            confl = assigns.reason_of(resolve_lit.var()).unwrap();
        };

        let mut learnt = Vec::with_capacity(rest.len() + 1);
        learnt.push(!uip);
        learnt.extend(rest);

        // LBD: distinct nonzero decision levels among the learnt literals.
        self.stamp += 1;
        let mut lbd = 0;
        for lit in learnt.iter() {
            let l = assigns.level_of(lit.var());
            if l > 0 && self.mark[l] != self.stamp {
                self.mark[l] = self.stamp;
                lbd += 1;
            }
        }

        let result = if learnt.len() == 1 {
            Conflict::Unit(learnt[0], lbd)
        } else {
            // Slot 1 must hold the next-highest-level literal for future
            // watching; its level is the backtrack level.
            let mut max_i = 1;
            for i in 2..learnt.len() {
                if assigns.level_of(learnt[i].var()) > assigns.level_of(learnt[max_i].var()) {
                    max_i = i;
                }
            }
            learnt.swap(1, max_i);
            let bt_level = assigns.level_of(learnt[1].var());
            Conflict::Learned(bt_level, lbd, learnt.into_boxed_slice())
        };

        // Locality bonus for variables close to the learnt clause.
        let bt_level = match &result {
            Conflict::Unit(..) => 0,
            Conflict::Learned(level, ..) => *level,
            Conflict::Ground => unreachable!(),
        };
        for lit in self.touched.iter() {
            if assigns.level_of(lit.var()) + 1 >= bt_level {
                heur.bump_activity(lit.var(), 1.0);
            }
        }

        result
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::cdcl::clause_db::ClauseDBSettings;
    use crate::sat::cdcl::decision::{DecisionHeuristic, DecisionSettings};
    use crate::sat::cdcl::watches::Watches;
    use crate::sat::formula::{Lit, Var};

    fn lit(id: i32) -> Lit {
        Var::from_index((id.abs() - 1) as usize).lit(id < 0)
    }

    fn add(db: &mut ClauseDB, watches: &mut Watches, ids: &[i32]) -> ClauseRef {
        let lits: Vec<Lit> = ids.iter().map(|&id| lit(id)).collect();
        let (c0, c1) = (lits[0], lits[1]);
        let cr = db.add(lits);
        watches.watch_clause(c0, c1, cr);
        cr
    }

    #[test]
    fn ground_conflict_signals_unsat() {
        let mut db = ClauseDB::new(ClauseDBSettings::default());
        let mut assigns = Assignment::new();
        let mut heur = DecisionHeuristic::new(DecisionSettings::default());
        let mut analyze = AnalyzeContext::new();
        assigns.grow_to(2);
        heur.grow_to(2);
        analyze.grow_to(2);

        let cr = db.add(vec![lit(1), lit(2)]);
        assigns.assign_lit(lit(-1), None);
        assigns.assign_lit(lit(-2), None);

        match analyze.analyze(&db, &mut heur, &assigns, cr) {
            Conflict::Ground => {}
            _ => panic!("expected ground conflict"),
        }
    }

    #[test]
    fn learns_asserting_clause_from_single_decision() {
        // x1 decided; {-1, 2} implies 2; {-1, -2} conflicts. The UIP is x1
        // and the learnt clause must be the unit {-1}.
        let mut db = ClauseDB::new(ClauseDBSettings::default());
        let mut assigns = Assignment::new();
        let mut heur = DecisionHeuristic::new(DecisionSettings::default());
        let mut analyze = AnalyzeContext::new();
        let mut watches = Watches::new();
        assigns.grow_to(2);
        heur.grow_to(2);
        analyze.grow_to(2);
        for i in 0..2 {
            watches.init_var(Var::from_index(i));
        }

        add(&mut db, &mut watches, &[-1, 2]);
        add(&mut db, &mut watches, &[-1, -2]);
        db.seal_input();

        assigns.new_decision_level();
        assigns.assign_lit(lit(1), None);
        let confl = watches
            .propagate(&mut db, &mut assigns)
            .expect("conflict expected");

        match analyze.analyze(&db, &mut heur, &assigns, confl) {
            Conflict::Unit(l, lbd) => {
                assert_eq!(l, lit(-1));
                assert_eq!(lbd, 1);
            }
            _ => panic!("expected unit learnt clause"),
        }
    }
}
