use crate::sat::formula::Lit;
use super::random::Random;


#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug)]
pub struct ClauseRef(pub(crate) usize);


pub struct Clause {
    pub lbd: u32, // meaningful for learnt clauses only
    lits: Vec<Lit>,
}

impl Clause {
    #[inline]
    pub fn len(&self) -> usize {
        self.lits.len()
    }

    #[inline]
    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    #[inline]
    pub fn lits_mut(&mut self) -> &mut [Lit] {
        &mut self.lits
    }
}


pub struct ClauseDBSettings {
    pub reduce_lbd_cutoff: u32, // learnt clauses at or above this LBD may be dropped
}

impl Default for ClauseDBSettings {
    fn default() -> ClauseDBSettings {
        ClauseDBSettings {
            reduce_lbd_cutoff: 5,
        }
    }
}


// Arena of clauses addressed by stable integer ids. Ids survive everything
// except `reduce`, which compacts the learnt segment and publishes the
// relocation through the returned remap table.
pub struct ClauseDB {
    pub settings: ClauseDBSettings,
    clauses: Vec<Clause>,
    origin: usize, // clauses below this index were part of the input
}

impl ClauseDB {
    pub fn new(settings: ClauseDBSettings) -> ClauseDB {
        ClauseDB {
            settings,
            clauses: Vec::new(),
            origin: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    #[inline]
    pub fn number_of_learnts(&self) -> usize {
        self.clauses.len() - self.origin
    }

    #[inline]
    pub fn number_of_origins(&self) -> usize {
        self.origin
    }

    #[inline]
    pub fn view(&self, cr: ClauseRef) -> &Clause {
        &self.clauses[cr.0]
    }

    #[inline]
    pub fn edit(&mut self, cr: ClauseRef) -> &mut Clause {
        &mut self.clauses[cr.0]
    }

    // Callers guarantee `lits.len() >= 2`; unit facts bypass the database
    // and go straight onto the trail.
    pub fn add(&mut self, lits: Vec<Lit>) -> ClauseRef {
        debug_assert!(lits.len() >= 2);
        self.clauses.push(Clause { lbd: 0, lits });
        ClauseRef(self.clauses.len() - 1)
    }

    pub fn learn(&mut self, lits: Vec<Lit>, lbd: u32) -> ClauseRef {
        debug_assert!(lits.len() >= 2);
        self.clauses.push(Clause { lbd, lits });
        ClauseRef(self.clauses.len() - 1)
    }

    // Freezes the original segment; everything added afterwards counts as
    // learnt and becomes fair game for `reduce`.
    pub fn seal_input(&mut self) {
        self.origin = self.clauses.len();
    }

    // Garbage-collect the learnt segment: drop roughly half of the clauses
    // with a poor LBD, compact the survivors to the front and return the
    // remap table (identity for originals, None for deleted ids). Must only
    // run at level 0 with no pending propagation, since relocation
    // invalidates every outstanding clause reference.
    pub fn reduce(&mut self, rand: &mut Random) -> Vec<Option<ClauseRef>> {
        let old_size = self.clauses.len();
        let mut remap: Vec<Option<ClauseRef>> = Vec::with_capacity(old_size);
        for i in 0..self.origin {
            remap.push(Some(ClauseRef(i)));
        }

        let mut new_size = self.origin;
        for i in self.origin..old_size {
            if self.clauses[i].lbd >= self.settings.reduce_lbd_cutoff && rand.chance(0.5) {
                remap.push(None);
            } else {
                if new_size != i {
                    self.clauses.swap(new_size, i);
                }
                remap.push(Some(ClauseRef(new_size)));
                new_size += 1;
            }
        }
        self.clauses.truncate(new_size);

        remap
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::formula::Var;

    fn clause(ids: &[i32]) -> Vec<Lit> {
        ids.iter()
            .map(|&id| Var::from_index((id.abs() - 1) as usize).lit(id < 0))
            .collect()
    }

    #[test]
    fn reduce_keeps_originals_and_remaps_learnts() {
        let mut db = ClauseDB::new(ClauseDBSettings::default());
        let mut rand = Random::new(91648253.0);

        let o0 = db.add(clause(&[1, 2]));
        let o1 = db.add(clause(&[-1, 3]));
        db.seal_input();

        for i in 0..40 {
            let lbd = if i % 2 == 0 { 2 } else { 8 };
            db.learn(clause(&[1, 2, 3]), lbd);
        }

        let before_learnts = db.number_of_learnts();
        let remap = db.reduce(&mut rand);

        assert_eq!(remap.len(), 2 + before_learnts);
        assert_eq!(remap[o0.0], Some(o0));
        assert_eq!(remap[o1.0], Some(o1));
        assert_eq!(db.number_of_origins(), 2);
        assert!(db.number_of_learnts() < before_learnts);

        // good clauses (LBD < cutoff) all survive, and every surviving id
        // resolves to a live clause
        for (old, new) in remap.iter().enumerate() {
            match new {
                Some(cr) => {
                    assert!(cr.0 < db.len());
                    if old >= 2 && old % 2 == 0 {
                        assert_eq!(db.view(*cr).lbd, 2);
                    }
                }
                None => assert!(old >= 2, "original clause deleted"),
            }
        }

        // survivors are compacted: ids are dense from the front
        let mut seen: Vec<usize> = remap.iter().filter_map(|r| r.map(|cr| cr.0)).collect();
        seen.sort();
        assert_eq!(seen, (0..db.len()).collect::<Vec<_>>());
    }

    #[test]
    fn repeated_reduce_reexamines_survivors() {
        // Surviving poor clauses get a fresh coin flip on every pass, so
        // back-to-back reductions keep shrinking the learnt segment; every
        // remap stays live throughout.
        let mut db = ClauseDB::new(ClauseDBSettings::default());
        let mut rand = Random::new(91648253.0);

        db.add(clause(&[1, 2]));
        db.add(clause(&[-1, 3]));
        db.seal_input();
        for _ in 0..40 {
            db.learn(clause(&[1, 2, 3]), 8);
        }

        let mut rounds = 0;
        while db.number_of_learnts() > 0 {
            rounds += 1;
            assert!(rounds <= 1000, "reduction stalled");

            let old_len = db.len();
            let remap = db.reduce(&mut rand);
            assert_eq!(remap.len(), old_len);
            assert_eq!(db.number_of_origins(), 2);
            for (old, new) in remap.iter().enumerate() {
                match new {
                    Some(cr) => assert!(cr.0 < db.len()),
                    None => assert!(old >= 2, "original clause deleted"),
                }
            }
        }
        assert!(rounds > 1);
    }
}
