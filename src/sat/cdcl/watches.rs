use std::mem;
use crate::sat::formula::{Lit, LitVec, Var};
use crate::sat::formula::assignment::Assignment;
use super::clause_db::{ClauseDB, ClauseRef};


#[derive(Clone, Copy, Debug)]
struct Watcher {
    cref: ClauseRef,
    blocker: Lit,
}


// For every literal `p`, `watches[p]` lists the clauses that watch `!p`,
// i.e. the clauses that may turn unit or conflicting when `p` is assigned
// true. The blocker caches some other literal of the clause so a satisfied
// clause can be skipped without touching its body.
pub struct Watches {
    watches: LitVec<Vec<Watcher>>,
    pub propagations: u64,
}

impl Watches {
    pub fn new() -> Self {
        Watches {
            watches: LitVec::new(),
            propagations: 0,
        }
    }

    pub fn init_var(&mut self, v: Var) {
        self.watches.init(v.neg_lit());
    }

    pub fn watch_clause(&mut self, c0: Lit, c1: Lit, cr: ClauseRef) {
        self.watches[!c0].push(Watcher {
            cref: cr,
            blocker: c1,
        });
        self.watches[!c1].push(Watcher {
            cref: cr,
            blocker: c0,
        });
    }

    // Description:
    //   Propagates all enqueued facts. If a conflict arises, the conflicting
    //   clause is returned and the queue cursor stays where it was;
    //   backtracking resets it.
    //
    //   Post-conditions:
    //     * every processed watch list is compacted in place.
    pub fn propagate(
        &mut self,
        db: &mut ClauseDB,
        assigns: &mut Assignment,
    ) -> Option<ClauseRef> {
        while let Some(p) = assigns.dequeue() {
            self.propagations += 1;
            let false_lit = !p;

            // The list is rebuilt with a two-pointer filter; taking it out
            // lets new watches be pushed onto other lists meanwhile (the
            // replacement watch is never false, so never `!p`'s own list).
            let mut ws = mem::replace(&mut self.watches[p], Vec::new());
            let mut i = 0;
            let mut j = 0;
            let mut confl = None;

            while i < ws.len() {
                let pw = ws[i];
                i += 1;

                // Clause already satisfied through the cached blocker.
                if assigns.is_true(pw.blocker) {
                    ws[j] = pw;
                    j += 1;
                    continue;
                }

                // Make sure the false literal sits in slot 1.
                let c = db.edit(pw.cref);
                if c.lits()[0] == false_lit {
                    c.lits_mut().swap(0, 1);
                }

                let first = c.lits()[0];
                let w = Watcher {
                    cref: pw.cref,
                    blocker: first,
                };
                if assigns.is_true(first) {
                    ws[j] = w;
                    j += 1;
                    continue;
                }

                // Look for a new literal to watch.
                let mut k = 2;
                while k < c.len() && assigns.is_false(c.lits()[k]) {
                    k += 1;
                }
                if k < c.len() {
                    let lits = c.lits_mut();
                    lits[1] = lits[k];
                    lits[k] = false_lit;
                    let moved = !lits[1];
                    self.watches[moved].push(w);
                } else {
                    // Did not find a watch -- clause is unit under assignment.
                    ws[j] = w;
                    j += 1;

                    if assigns.is_false(first) {
                        // Conflict; keep the untouched tail verbatim.
                        while i < ws.len() {
                            ws[j] = ws[i];
                            j += 1;
                            i += 1;
                        }
                        confl = Some(pw.cref);
                    } else {
                        assigns.assign_lit(first, Some(pw.cref));
                    }
                }
            }

            ws.truncate(j);
            self.watches[p] = ws;

            if confl.is_some() {
                return confl;
            }
        }

        None
    }

    // Rewrite every watch list after a clause-database reduction. Entries
    // pointing at deleted clauses are dropped, the rest follow the remap.
    pub fn apply_remap(&mut self, remap: &[Option<ClauseRef>]) {
        for line in self.watches.iter_mut() {
            let mut j = 0;
            for i in 0..line.len() {
                if let Some(cr) = remap[line[i].cref.0] {
                    line[j] = Watcher {
                        cref: cr,
                        blocker: line[i].blocker,
                    };
                    j += 1;
                }
            }
            line.truncate(j);
        }
    }

    #[cfg(test)]
    pub fn watched_crefs(&self, p: Lit) -> Vec<usize> {
        self.watches[p].iter().map(|w| w.cref.0).collect()
    }
}
