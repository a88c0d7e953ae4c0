use solver::{Iterate, MatN, Residual};
use std::io::{self, Write};

/// How numbers are printed. Passed to every writer instead of relying on any
/// process-wide locale; decimal point is always `.`.
#[derive(Copy, Clone, Debug)]
pub struct NumberFormat {
    /// At most this many digits after the point; trailing zeros are dropped.
    pub max_decimals: usize,
    /// Column width for matrix entries.
    pub width: usize,
    /// Digits after the point in scientific notation.
    pub sci_decimals: usize,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            max_decimals: 5,
            width: 10,
            sci_decimals: 6,
        }
    }
}

impl NumberFormat {
    pub fn fixed(&self, v: f64) -> String {
        let s = format!("{:.*}", self.max_decimals, v);
        let s = if s.contains('.') {
            s.trim_end_matches('0').trim_end_matches('.')
        } else {
            &s
        };
        if s == "-0" {
            "0".to_string()
        } else {
            s.to_string()
        }
    }

    /// Mantissa plus a signed three-digit exponent, `1.825600E-004`.
    pub fn scientific(&self, v: f64) -> String {
        let s = format!("{:.*E}", self.sci_decimals, v);
        match s.split_once('E') {
            Some((mantissa, exponent)) => match exponent.parse::<i32>() {
                Ok(e) => format!("{}E{}{:03}", mantissa, if e < 0 { '-' } else { '+' }, e.abs()),
                Err(_) => s,
            },
            None => s,
        }
    }
}

pub fn write_matrix<W: Write>(out: &mut W, title: &str, m: &MatN, format: &NumberFormat) -> io::Result<()> {
    writeln!(out, "{}:", title)?;
    for row in m.rows() {
        for &v in row.iter() {
            write!(out, "{:>width$} ", format.fixed(v), width = format.width)?;
        }
        writeln!(out)?;
    }
    writeln!(out)
}

pub fn write_vector<W: Write>(out: &mut W, title: &str, v: &[f64], format: &NumberFormat) -> io::Result<()> {
    writeln!(out, "{}:", title)?;
    for &x in v {
        writeln!(out, "{}", format.fixed(x))?;
    }
    writeln!(out)
}

pub fn write_iterate<W: Write>(out: &mut W, iterate: &Iterate<'_>, format: &NumberFormat) -> io::Result<()> {
    writeln!(out, "Iteration {}:", iterate.iteration)?;
    write_vector(
        out,
        &format!("Approximation of vector X after iteration {}", iterate.iteration),
        iterate.x,
        format,
    )
}

pub fn write_residuals<W: Write>(out: &mut W, r: &Residual, format: &NumberFormat) -> io::Result<()> {
    writeln!(out, "Residual Vector:")?;
    for (i, &v) in r.iter().enumerate() {
        writeln!(out, "r{} = {}", i + 1, format.scientific(v))?;
    }
    writeln!(out, "Sum of squared residuals = {}", format.scientific(r.sum_of_squares()))
}
