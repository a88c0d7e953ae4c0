mod report;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, ValueEnum};
use report::{write_iterate, write_matrix, write_residuals, write_vector, NumberFormat};
use solver::{
    system::{demo_system, load_system, random_system, save_system},
    IterativeSolver, LinearSystem, SolverConfig, StoppingRule,
};
use std::io::{self, BufRead, Write};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "simple-iteration", about = "Solve A x = b by simple (Jacobi) iteration")]
struct Cli {
    /// JSON file holding the system, `{"a": [[..], ..], "b": [..]}`
    #[arg(long, conflicts_with = "random")]
    system: Option<String>,

    /// Solve a random diagonally dominant system of this size
    #[arg(long)]
    random: Option<usize>,

    /// Seed for `--random`
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Write the system being solved to this JSON file
    #[arg(long)]
    save: Option<String>,

    /// Accuracy eps; prompted for on stdin when omitted
    #[arg(long)]
    eps: Option<f64>,

    /// JSON solver configuration, `{"max_iterations": .., "stopping_rule": ..}`
    #[arg(long)]
    config: Option<String>,

    /// Stopping rule, overrides the configuration file
    #[arg(long, value_enum)]
    rule: Option<Rule>,

    /// Iteration bound, overrides the configuration file
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Only print the solution and residuals
    #[arg(long)]
    quiet: bool,

    /// Maximum decimal places when printing
    #[arg(long, default_value_t = 5)]
    decimals: usize,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Rule {
    Literal,
    Corrected,
}

impl From<Rule> for StoppingRule {
    fn from(rule: Rule) -> Self {
        match rule {
            Rule::Literal => StoppingRule::Literal,
            Rule::Corrected => StoppingRule::Corrected,
        }
    }
}

impl Cli {
    fn system(&self) -> Result<LinearSystem> {
        let system = match (&self.system, self.random) {
            (Some(path), _) => load_system(path).map_err(|e| anyhow!("failed to load system from {}: {}", path, e))?,
            (None, Some(n)) => random_system(n, self.seed).context("cannot generate a random system")?,
            (None, None) => demo_system(),
        };
        if let Some(path) = &self.save {
            save_system(path, &system).map_err(|e| anyhow!("failed to save system to {}: {}", path, e))?;
        }
        Ok(system)
    }

    fn solver_config(&self) -> Result<SolverConfig> {
        let mut config = match &self.config {
            Some(path) => SolverConfig::load(path).map_err(|e| anyhow!("failed to load config from {}: {}", path, e))?,
            None => SolverConfig::default(),
        };
        if let Some(rule) = self.rule {
            config.stopping_rule = rule.into();
        }
        if let Some(max_iterations) = self.max_iterations {
            config.max_iterations = max_iterations;
        }
        Ok(config)
    }
}

/// Prompts until a line parses as a finite, non-negative number.
fn read_tolerance<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<f64> {
    write!(out, "Enter accuracy 'eps': ")?;
    out.flush()?;
    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            bail!("no accuracy given before end of input");
        }
        match line.trim().parse::<f64>() {
            Ok(eps) if eps.is_finite() && eps >= 0.0 => return Ok(eps),
            _ => {
                write!(out, "Invalid input. Please enter a numerical value for accuracy ε: ")?;
                out.flush()?;
            }
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let format = NumberFormat {
        max_decimals: cli.decimals,
        ..NumberFormat::default()
    };
    let system = cli.system()?;
    let config = cli.solver_config()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    write_matrix(&mut out, "Matrix", system.a(), &format)?;
    write_vector(&mut out, "Vector b", system.b(), &format)?;

    let tolerance = match cli.eps {
        Some(eps) => eps,
        None => read_tolerance(&mut io::stdin().lock(), &mut out)?,
    };

    let decomposition = system.decompose().context("cannot build the iteration matrix")?;
    if !cli.quiet {
        write_matrix(&mut out, "Alpha Matrix", &decomposition.alpha, &format)?;
        write_vector(&mut out, "Beta Vector", &decomposition.beta, &format)?;
    }

    let mut write_error = None;
    let solution = IterativeSolver::new(config).solve_with(&decomposition, tolerance, |iterate| {
        if cli.quiet || write_error.is_some() {
            return;
        }
        if let Err(e) = write_iterate(&mut out, iterate, &format) {
            write_error = Some(e);
        }
    });
    if let Some(e) = write_error {
        return Err(e.into());
    }
    let solution = solution.context("simple iteration failed")?;
    info!(iterations = solution.iterations, delta = solution.delta, "solved");

    write_vector(&mut out, "Solution", &solution.x, &format)?;
    let residual = system.residuals(&solution.x)?;
    write_residuals(&mut out, &residual, &format)?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    run(&cli)
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::CommandFactory;
    use std::io::Cursor;

    #[test]
    fn test_cli() {
        Cli::command().debug_assert();
        let cli = Cli::try_parse_from(["simple-iteration", "--eps", "1e-4", "--rule", "literal", "--max-iterations", "7"])
            .unwrap();
        assert_eq!(cli.eps, Some(1e-4));
        let config = cli.solver_config().unwrap();
        assert_eq!(config.stopping_rule, StoppingRule::Literal);
        assert_eq!(config.max_iterations, 7);
        assert!(Cli::try_parse_from(["simple-iteration", "--system", "a.json", "--random", "3"]).is_err());
    }

    #[test]
    fn test_read_tolerance_reprompts() {
        let mut input = Cursor::new("abc\n0,001\n-1\nNaN\n 0.0001 \n");
        let mut out = Vec::new();
        assert_eq!(read_tolerance(&mut input, &mut out).unwrap(), 0.0001);
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("Enter accuracy 'eps': "));
        assert_eq!(out.matches("Invalid input.").count(), 4);
    }

    #[test]
    fn test_read_tolerance_end_of_input() {
        let mut input = Cursor::new("oops\n");
        assert!(read_tolerance(&mut input, &mut Vec::new()).is_err());
    }

    #[test]
    fn test_default_system_is_demo() {
        let cli = Cli::try_parse_from(["simple-iteration"]).unwrap();
        assert_eq!(cli.system().unwrap(), demo_system());
        let cli = Cli::try_parse_from(["simple-iteration", "--random", "3", "--seed", "9"]).unwrap();
        assert_eq!(cli.system().unwrap(), random_system(3, 9).unwrap());
        let cli = Cli::try_parse_from(["simple-iteration", "--random", "0"]).unwrap();
        assert!(cli.system().is_err());
    }
}
