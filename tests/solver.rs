extern crate cdcl_rust;
extern crate tempfile;

use std::io::Write;
use cdcl_rust::sat::{dimacs, Solver, TotalResult};
use cdcl_rust::sat::cdcl::{CoreSettings, CoreSolver};


fn solve_text(text: &str, settings: CoreSettings) -> (TotalResult, CoreSolver) {
    let mut solver = CoreSolver::new(settings);
    dimacs::parse_file(write_cnf(text).path(), &mut solver, true).expect("parse error");
    let result = if solver.finalize() {
        solver.solve()
    } else {
        TotalResult::UnSAT
    };
    (result, solver)
}

fn write_cnf(text: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("IO Error");
    file.write_all(text.as_bytes()).expect("IO Error");
    file
}

fn assert_sat_with_valid_model(text: &str, settings: CoreSettings) {
    match solve_text(text, settings) {
        (TotalResult::SAT(model), _) => {
            assert!(
                dimacs::validate_model(&mut text.as_bytes(), &model).unwrap(),
                "model does not satisfy the formula"
            );
        }
        _ => panic!("expected SAT"),
    }
}

fn assert_unsat(text: &str, settings: CoreSettings) {
    match solve_text(text, settings) {
        (TotalResult::UnSAT, _) => {}
        _ => panic!("expected UNSAT"),
    }
}


// Every assignment of two variables is excluded.
#[test]
fn two_variable_contradiction() {
    assert_unsat(
        "p cnf 2 4\n1 2 0\n-1 2 0\n1 -2 0\n-1 -2 0\n",
        CoreSettings::default(),
    );
}

#[test]
fn single_binary_clause() {
    assert_sat_with_valid_model("p cnf 2 1\n1 2 0\n", CoreSettings::default());
}

// Contradicting unit clauses must be caught by input propagation, before
// the search loop ever runs.
#[test]
fn contradicting_units() {
    let (result, solver) = solve_text("p cnf 1 2\n1 0\n-1 0\n", CoreSettings::default());
    match result {
        TotalResult::UnSAT => {}
        _ => panic!("expected UNSAT"),
    }
    assert_eq!(solver.stats().decisions, 0);
    assert_eq!(solver.stats().conflicts, 0);
}

// All eight sign combinations over three variables; the solver must derive
// a level-0 conflict after finitely many learnt clauses.
#[test]
fn three_variable_sign_cube() {
    let mut text = String::from("p cnf 3 8\n");
    for a in &["1", "-1"] {
        for b in &["2", "-2"] {
            for c in &["3", "-3"] {
                text.push_str(&format!("{} {} {} 0\n", a, b, c));
            }
        }
    }
    assert_unsat(&text, CoreSettings::default());
}

fn pigeonhole(pigeons: usize, holes: usize) -> String {
    // variable (p, h) <-> pigeon p sits in hole h
    let var = |p: usize, h: usize| p * holes + h + 1;
    let mut clauses = Vec::new();
    for p in 0..pigeons {
        let c: Vec<String> = (0..holes).map(|h| var(p, h).to_string()).collect();
        clauses.push(format!("{} 0", c.join(" ")));
    }
    for h in 0..holes {
        for p1 in 0..pigeons {
            for p2 in p1 + 1..pigeons {
                clauses.push(format!("-{} -{} 0", var(p1, h), var(p2, h)));
            }
        }
    }
    format!("p cnf {} {}\n{}\n", pigeons * holes, clauses.len(), clauses.join("\n"))
}

#[test]
fn pigeonhole_is_unsat() {
    assert_unsat(&pigeonhole(4, 3), CoreSettings::default());
}

#[test]
fn pigeonhole_fits_when_holes_suffice() {
    assert_sat_with_valid_model(&pigeonhole(4, 4), CoreSettings::default());
}

// Tiny policy limits force reductions, restarts and rephases to fire many
// times; results must not change and no watch may point at a dead clause.
#[test]
fn aggressive_policies_do_not_change_results() {
    let mut settings = CoreSettings::default();
    settings.reduce.initial_limit = 1;
    settings.reduce.limit_inc = 1;
    settings.rephase.initial_limit = 2;
    settings.db.reduce_lbd_cutoff = 1;
    assert_unsat(&pigeonhole(5, 4), settings);

    let mut settings = CoreSettings::default();
    settings.reduce.initial_limit = 1;
    settings.reduce.limit_inc = 1;
    settings.rephase.initial_limit = 2;
    settings.db.reduce_lbd_cutoff = 1;
    assert_sat_with_valid_model(&pigeonhole(5, 5), settings);
}

// An implication chain collapses through unit propagation alone.
#[test]
fn implication_chain() {
    let mut text = String::from("p cnf 20 20\n1 0\n");
    for i in 1..20 {
        text.push_str(&format!("-{} {} 0\n", i, i + 1));
    }
    let (result, solver) = solve_text(&text, CoreSettings::default());
    match result {
        TotalResult::SAT(model) => {
            for i in 0..20 {
                assert_eq!(model[&dimacs::lit_by_id(i + 1).var()], true);
            }
        }
        _ => panic!("expected SAT"),
    }
    assert_eq!(solver.stats().conflicts, 0);
}

#[test]
fn reproducible_for_fixed_seed() {
    let run = |seed: f64| {
        let mut settings = CoreSettings::default();
        settings.random_seed = seed;
        settings.reduce.initial_limit = 1;
        settings.db.reduce_lbd_cutoff = 1;
        let (_, solver) = solve_text(&pigeonhole(5, 4), settings);
        let stats = solver.stats();
        (stats.conflicts, stats.decisions, stats.propagations, stats.reduces)
    };

    assert_eq!(run(42.0), run(42.0));
}
