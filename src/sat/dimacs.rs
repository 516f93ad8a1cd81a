use std::{fs, io, path, str};
use flate2::read::GzDecoder;
use crate::sat::Solver;
use crate::sat::formula::{Lit, Var, VarMap};


// DIMACS variable ids are 1-based; internal indices start at 0.
pub fn lit_by_id(lit_id: i32) -> Lit {
    Var::from_index((lit_id.abs() - 1) as usize).lit(lit_id < 0)
}

pub fn id_by_var(var: Var) -> i32 {
    (var.index() + 1) as i32
}


pub fn parse_file<P: AsRef<path::Path>, S: Solver>(
    path: P,
    solver: &mut S,
    validate: bool,
) -> io::Result<()> {
    let path = path.as_ref();
    let mut file = io::BufReader::new(fs::File::open(path)?);
    if path.extension().map_or(false, |ext| ext == "gz") {
        let mut gz = GzDecoder::new(file);
        parse(&mut gz, solver, validate)
    } else {
        parse(&mut file, solver, validate)
    }
}

pub fn parse<R: io::Read, S: Solver>(
    stream: &mut R,
    solver: &mut S,
    validate: bool,
) -> io::Result<()> {
    DimacsParser::parse(stream, validate, |header, cl| {
        if let Some((vars, clauses)) = header {
            solver.reserve(vars, clauses);
        }
        if let Some(cl) = cl {
            let lits: Vec<Lit> = cl.iter().map(|&id| lit_by_id(id)).collect();
            solver.add_clause(&lits);
        }
    })
}


pub fn write_model<W: io::Write>(stream: &mut W, model: &VarMap<bool>) -> io::Result<()> {
    write!(stream, "v")?;
    for (var, &val) in model.iter() {
        let id = id_by_var(var);
        write!(stream, " {}", if val { id } else { -id })?;
    }
    writeln!(stream, " 0")?;
    Ok(())
}


pub fn validate_model<R: io::Read>(stream: &mut R, model: &VarMap<bool>) -> io::Result<bool> {
    let mut ok = true;
    DimacsParser::parse(stream, false, |_, cl| {
        if let Some(cl) = cl {
            let satisfied = cl.iter().any(|&id| {
                model
                    .get(&lit_by_id(id).var())
                    .map_or(false, |&val| val == (id > 0))
            });
            if !satisfied {
                ok = false;
            }
        }
    })?;
    Ok(ok)
}


struct DimacsParser<'p> {
    reader: str::Chars<'p>,
    cur: Option<char>,
    max_var: usize,
    clauses: usize,
}

impl<'p> DimacsParser<'p> {
    // The callback sees the header once (clause slot None) and afterwards
    // each clause as raw DIMACS literals.
    pub fn parse<R, F>(reader: &mut R, validate: bool, mut event: F) -> io::Result<()>
    where
        R: io::Read,
        F: FnMut(Option<(usize, usize)>, Option<Vec<i32>>),
    {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;

        let mut p = DimacsParser {
            reader: buf.chars(),
            cur: None,
            max_var: 0,
            clauses: 0,
        };
        p.next();
        p.parse_me(validate, &mut event)
    }

    fn parse_me<F>(&mut self, validate: bool, event: &mut F) -> io::Result<()>
    where
        F: FnMut(Option<(usize, usize)>, Option<Vec<i32>>),
    {
        let mut header: Option<(usize, usize)> = None;
        loop {
            self.skip_whitespace();
            match self.current() {
                None => break,

                Some('c') => self.skip_line(),

                Some('p') if header.is_none() => {
                    self.consume("p cnf")?;
                    let vars = self.next_uint()?;
                    let clauses = self.next_uint()?;
                    header = Some((vars, clauses));
                    event(header, None);
                }

                _ if header.is_some() => {
                    let c = self.parse_clause()?;
                    event(None, Some(c));
                }

                _ => {
                    return Err(parse_error("clause before 'p cnf' header"));
                }
            }
        }

        if validate {
            if let Some((vars, clauses)) = header {
                if clauses != self.clauses {
                    return Err(parse_error(&format!(
                        "header mismatch: {} clauses declared, {} found",
                        clauses, self.clauses
                    )));
                }
                if vars < self.max_var {
                    return Err(parse_error(&format!(
                        "header mismatch: {} vars declared, {} discovered",
                        vars, self.max_var
                    )));
                }
            }
        }
        Ok(())
    }

    fn parse_clause(&mut self) -> io::Result<Vec<i32>> {
        let mut lits = Vec::new();
        loop {
            let lit = self.next_int()?;
            if lit == 0 {
                self.clauses += 1;
                return Ok(lits);
            }
            self.max_var = self.max_var.max(lit.abs() as usize);
            lits.push(lit);
        }
    }


    #[inline]
    fn next(&mut self) {
        self.cur = self.reader.next();
    }

    #[inline]
    fn current(&self) -> Option<char> {
        self.cur
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.cur {
            if !c.is_whitespace() {
                break;
            }
            self.next();
        }
    }

    fn skip_line(&mut self) {
        loop {
            match self.cur {
                None => break,
                Some('\n') => {
                    self.next();
                    break;
                }
                _ => self.next(),
            }
        }
    }

    fn consume(&mut self, target: &str) -> io::Result<()> {
        for tc in target.chars() {
            match self.cur {
                Some(c) if c == tc => self.next(),
                _ => {
                    return Err(parse_error(&format!("expected '{}'", target)));
                }
            }
        }
        Ok(())
    }

    fn read_int_body(&mut self) -> io::Result<usize> {
        let mut len: usize = 0;
        let mut value = 0;
        loop {
            match self.cur.and_then(|c| c.to_digit(10)) {
                Some(d) => {
                    value = value * 10 + (d as usize);
                    len += 1;
                    self.next();
                }

                _ if len > 0 => return Ok(value),

                _ => return Err(parse_error("int expected")),
            }
        }
    }

    fn next_int(&mut self) -> io::Result<i32> {
        self.skip_whitespace();
        let sign = match self.cur {
            Some('-') => {
                self.next();
                -1
            }
            Some('+') => {
                self.next();
                1
            }
            _ => 1,
        };

        let val = self.read_int_body()?;
        Ok(sign * (val as i32))
    }

    fn next_uint(&mut self) -> io::Result<usize> {
        self.skip_whitespace();
        if let Some('+') = self.cur {
            self.next();
        }
        self.read_int_body()
    }
}

fn parse_error(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("PARSE ERROR! {}", message))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::TotalResult;
    use crate::sat::cdcl::{CoreSettings, CoreSolver};

    #[test]
    fn parses_comments_header_and_clauses() {
        let text = "c sample\np cnf 3 2\n1 -2 0\nc mid comment\n2 3 0\n";
        let mut solver = CoreSolver::new(CoreSettings::default());
        parse(&mut text.as_bytes(), &mut solver, true).unwrap();

        assert_eq!(solver.n_vars(), 3);
        assert!(solver.finalize());
        assert_eq!(solver.n_clauses(), 2);
    }

    #[test]
    fn strict_mode_rejects_header_mismatch() {
        let text = "p cnf 2 5\n1 2 0\n";
        let mut solver = CoreSolver::new(CoreSettings::default());
        assert!(parse(&mut text.as_bytes(), &mut solver, true).is_err());
    }

    #[test]
    fn model_satisfies_parsed_formula() {
        let text = "p cnf 3 3\n1 2 0\n-1 3 0\n-2 -3 0\n";
        let mut solver = CoreSolver::new(CoreSettings::default());
        parse(&mut text.as_bytes(), &mut solver, false).unwrap();
        assert!(solver.finalize());

        match solver.solve() {
            TotalResult::SAT(model) => {
                assert!(validate_model(&mut text.as_bytes(), &model).unwrap());
            }
            _ => panic!("expected SAT"),
        }
    }
}
