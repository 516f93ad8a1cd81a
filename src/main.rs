#[macro_use]
extern crate clap;
extern crate cdcl_rust;
extern crate env_logger;
extern crate log;

use std::io::Write;
use std::{path, process};
use cdcl_rust::sat::cdcl;


fn main() {
    let matches = clap::App::new("cdcl-rust")
        .version(&crate_version!()[..])
        .about("CDCL SAT solver with LBD-driven restarts and clause reduction")
        .arg(clap::Arg::with_name("verb").long("verb").takes_value(true).possible_values(&["0", "1", "2"]).help("Verbosity level (0=silent, 1=some, 2=more)"))
        .arg(clap::Arg::with_name("strict").long("strict").help("Validate DIMACS header during parsing"))
        .arg(clap::Arg::with_name("input").required(true).help("Input file in DIMACS CNF format (possibly gzipped)"))
        .arg(clap::Arg::with_name("output").required(false).help("Result output file"))
        .arg(clap::Arg::with_name("var-decay").long("var-decay").takes_value(true).help("The variable activity decay factor"))
        .arg(clap::Arg::with_name("rnd-seed").long("rnd-seed").takes_value(true).help("Seed of the random generator used by clause reduction"))
        .arg(clap::Arg::with_name("restart-ratio").long("restart-ratio").takes_value(true).help("Restart when ratio * recent LBD average exceeds the all-time average"))
        .arg(clap::Arg::with_name("reduce-first").long("reduce-first").takes_value(true).help("The base clause-reduction interval in conflicts"))
        .arg(clap::Arg::with_name("reduce-inc").long("reduce-inc").takes_value(true).help("Reduction interval increase per reduction"))
        .arg(clap::Arg::with_name("rephase-first").long("rephase-first").takes_value(true).help("The base rephasing interval in conflicts"))
        .arg(clap::Arg::with_name("lbd-cutoff").long("lbd-cutoff").takes_value(true).help("Learnt clauses at or above this LBD may be dropped by reduction"))
        .arg(clap::Arg::with_name("max-conflicts").long("max-conflicts").takes_value(true).help("Give up after this many conflicts (exit code 0)"))
        .get_matches();

    {
        let mut builder = env_logger::Builder::new();
        builder.format(|buf, record| writeln!(buf, "{}", record.args()));
        builder.filter(
            None,
            matches
                .value_of("verb")
                .map(|v| match v {
                    "1" => log::LevelFilter::Info,
                    "2" => log::LevelFilter::Trace,
                    _ => log::LevelFilter::Off,
                })
                .unwrap_or(log::LevelFilter::Info),
        );
        builder.init();
    }

    let options = cdcl_rust::MainOptions {
        strict: matches.is_present("strict"),
        in_path: path::PathBuf::from(matches.value_of("input").unwrap()),
        out_path: matches.value_of("output").map(path::PathBuf::from),
    };

    let settings = {
        let mut s = cdcl::CoreSettings::default();

        for &x in matches
            .value_of("var-decay")
            .and_then(|s| s.parse().ok())
            .iter()
        {
            if 0.0 < x && x < 1.0 {
                s.heur.var_decay = x;
            }
        }

        for &x in matches
            .value_of("rnd-seed")
            .and_then(|s| s.parse().ok())
            .iter()
        {
            if 0.0 < x {
                s.random_seed = x;
            }
        }

        for &x in matches
            .value_of("restart-ratio")
            .and_then(|s| s.parse().ok())
            .iter()
        {
            if 0.0 < x && x <= 1.0 {
                s.restart.trigger_ratio = x;
            }
        }

        for &x in matches
            .value_of("reduce-first")
            .and_then(|s| s.parse().ok())
            .iter()
        {
            if 0 < x {
                s.reduce.initial_limit = x;
            }
        }

        for &x in matches
            .value_of("reduce-inc")
            .and_then(|s| s.parse().ok())
            .iter()
        {
            if 0 < x {
                s.reduce.limit_inc = x;
            }
        }

        for &x in matches
            .value_of("rephase-first")
            .and_then(|s| s.parse().ok())
            .iter()
        {
            if 0 < x {
                s.rephase.initial_limit = x;
            }
        }

        for &x in matches
            .value_of("lbd-cutoff")
            .and_then(|s| s.parse().ok())
            .iter()
        {
            if 1 < x {
                s.db.reduce_lbd_cutoff = x;
            }
        }

        s.conflict_budget = matches.value_of("max-conflicts").and_then(|s| s.parse().ok());

        s
    };

    let code = cdcl_rust::solve(options, settings).expect("IO Error");
    process::exit(code);
}
