extern crate flate2;
#[macro_use]
extern crate log;
extern crate time;
extern crate vec_map;

use std::{fs, io, path};
use std::io::Write;
use crate::sat::{cdcl, dimacs, Solver, TotalResult};

pub mod sat;


pub struct MainOptions {
    pub strict: bool,
    pub in_path: path::PathBuf,
    pub out_path: Option<path::PathBuf>,
}


// Parses, solves and reports; returns the SAT-competition exit code
// (10 = SAT, 20 = UNSAT, 0 = undecided).
pub fn solve(options: MainOptions, settings: cdcl::CoreSettings) -> io::Result<i32> {
    let mut solver = cdcl::CoreSolver::new(settings);

    let initial_time = time::precise_time_s();

    info!("============================[ Problem Statistics ]=============================");
    dimacs::parse_file(&options.in_path, &mut solver, options.strict)?;
    info!("|  Number of variables:  {:12}                                         |", solver.n_vars());

    let parsed_time = time::precise_time_s();
    info!("|  Parse time:           {:12.2} s                                       |", parsed_time - initial_time);

    let result = if solver.finalize() {
        info!("|  Number of clauses:    {:12}                                         |", solver.n_clauses());
        solver.solve()
    } else {
        info!("Solved by unit propagation");
        TotalResult::UnSAT
    };

    {
        let stats = solver.stats();
        let solved_time = time::precise_time_s();
        info!("===============================================================================");
        info!("restarts     : {:12}", stats.restarts);
        info!("conflicts    : {:12}   ({:.0} /sec)", stats.conflicts, stats.conflicts as f64 / (solved_time - initial_time));
        info!("decisions    : {:12}", stats.decisions);
        info!("propagations : {:12}", stats.propagations);
        info!("learnts      : {:12}   ({} reduces, {} rephases)", stats.learnts, stats.reduces, stats.rephases);
        info!("solve time   : {:12.2} s", solved_time - parsed_time);
    }

    report(&result, &options)
}


fn report(result: &TotalResult, options: &MainOptions) -> io::Result<i32> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let code = match result {
        TotalResult::SAT(ref model) => {
            writeln!(out, "s SATISFIABLE")?;
            dimacs::write_model(&mut out, model)?;
            10
        }
        TotalResult::UnSAT => {
            writeln!(out, "s UNSATISFIABLE")?;
            20
        }
        TotalResult::Interrupted => {
            writeln!(out, "s INDETERMINATE")?;
            0
        }
    };

    if let Some(ref path) = options.out_path {
        let mut file = fs::File::create(path)?;
        match result {
            TotalResult::SAT(ref model) => {
                writeln!(file, "SAT")?;
                dimacs::write_model(&mut file, model)?;
            }
            TotalResult::UnSAT => {
                writeln!(file, "UNSAT")?;
            }
            TotalResult::Interrupted => {
                writeln!(file, "INDET")?;
            }
        }
    }

    Ok(code)
}
