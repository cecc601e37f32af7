use super::CliError;
use super::helpers::*;
use anyhow::Context;
use serde::Serialize;
use std::path::PathBuf;
use su2_core::numerics::format_numeric_for_policy;
use su2_core::survey::run_stability_survey;
use su2_core::symbols::{
    check_reflection_symmetry, evaluate_symbol, RacahSummation, DEFAULT_SYMMETRY_TOLERANCE,
};

#[derive(clap::Args)]
pub(super) struct StabilityArgs {
    /// Survey case file (default: built-in cases)
    #[arg(long)]
    cases: Option<PathBuf>,

    /// Stability policy file (default: built-in policy)
    #[arg(long)]
    policy: Option<PathBuf>,

    /// JSON report output path
    #[arg(long, default_value = "artifacts/stability/report.json")]
    report: PathBuf,

    /// Guard added to |c(k)| in the condition estimate
    #[arg(long)]
    epsilon: Option<f64>,

    /// Error ratio below which one direction is recommended
    #[arg(long)]
    separation: Option<f64>,
}

#[derive(clap::Args)]
pub(super) struct SymbolArgs {
    /// Spins as integers, decimals or fractions (e.g. 3/2)
    #[arg(required = true, num_args = 1..)]
    spins: Vec<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct SymmetryArgs {
    /// Edge spins of the chain
    #[arg(required = true, num_args = 1..)]
    spins: Vec<String>,

    /// Comma-separated rho values (default: Fibonacci ratios)
    #[arg(long, value_delimiter = ',')]
    rhos: Option<Vec<f64>>,

    /// Largest |f(j) - f(reverse j)| accepted as symmetric
    #[arg(long, default_value_t = DEFAULT_SYMMETRY_TOLERANCE)]
    tolerance: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SymbolOutput {
    kind: &'static str,
    spins: Vec<String>,
    value: f64,
}

pub(super) fn run_stability_command(args: StabilityArgs) -> Result<i32, CliError> {
    let mut policy = load_policy(args.policy.as_deref())?;
    if let Some(epsilon) = positive_override("--epsilon", args.epsilon)? {
        policy.condition_epsilon = epsilon;
    }
    if let Some(separation) = positive_override("--separation", args.separation)? {
        policy.separation_factor = separation;
    }
    let cases = load_cases(args.cases.as_deref())?;

    let report = run_stability_survey(&cases, &policy);
    report.write_json(&args.report).map_err(CliError::compute)?;

    print!("{}", report.render_human_summary());
    println!("JSON report: {}", args.report.display());

    if report.passed() { Ok(0) } else { Ok(1) }
}

pub(super) fn run_symbol_command(args: SymbolArgs) -> Result<i32, CliError> {
    let spins = parse_spin_arguments(&args.spins)?;
    let symbol = evaluate_symbol(&RacahSummation, &spins).map_err(CliError::compute)?;
    tracing::debug!(kind = %symbol.kind, value = symbol.value, "symbol evaluated");

    if args.json {
        let output = SymbolOutput {
            kind: symbol.kind.as_str(),
            spins: spins.iter().map(ToString::to_string).collect(),
            value: symbol.value,
        };
        let rendered =
            serde_json::to_string_pretty(&output).context("failed to render symbol as JSON")?;
        println!("{rendered}");
    } else {
        println!(
            "{} = {}",
            format_symbol_layout(symbol.kind, &spins),
            format_numeric_for_policy(symbol.value)
        );
    }

    Ok(0)
}

pub(super) fn run_symmetry_command(args: SymmetryArgs) -> Result<i32, CliError> {
    let spins = parse_spin_arguments(&args.spins)?;
    let tolerance = positive_override("--tolerance", Some(args.tolerance))?
        .unwrap_or(DEFAULT_SYMMETRY_TOLERANCE);
    let check = check_reflection_symmetry(&spins, args.rhos.as_deref(), tolerance)
        .map_err(CliError::compute)?;

    println!(
        "Reflection symmetry: {}",
        if check.symmetric { "PASS" } else { "FAIL" }
    );
    println!("f(j)         = {}", format_numeric_for_policy(check.original));
    println!("f(reverse j) = {}", format_numeric_for_policy(check.reflected));
    println!("difference   = {}", format_numeric_for_policy(check.difference));

    if check.symmetric { Ok(0) } else { Ok(1) }
}
