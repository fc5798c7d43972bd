use clap::{Args, Parser, Subcommand};
use pv_core::{PvError, ensure_finite};
use pv_eos::{
    CubicEos, CubicKind, EosError, EosModel, FluidSolidModel, LogCompressibleSolid, Phase,
};
use pv_solver::{
    ChillConfig, ExecutionMode, SolverError, VolumeOptions, volume, volume_candidates,
    volume_chill, volume_virial,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pv-cli")]
#[command(about = "phasevol CLI - EoS volume roots and phase selection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve for the volume at (p, T, z)
    Volume {
        #[command(flatten)]
        model: ModelArgs,
        #[command(flatten)]
        state: StateArgs,
        /// Phase: unknown, stable, liquid, vapor, solid
        #[arg(long, default_value = "unknown")]
        phase: Phase,
        /// Starting volume [m³]; skips the phase search
        #[arg(long)]
        guess: Option<f64>,
    },
    /// Show every candidate root and the Gibbs selection
    Candidates {
        #[command(flatten)]
        model: ModelArgs,
        #[command(flatten)]
        state: StateArgs,
    },
    /// Truncated virial estimate of the vapor volume
    Virial {
        #[command(flatten)]
        model: ModelArgs,
        #[command(flatten)]
        state: StateArgs,
    },
    /// Carry a root along the isobar from one temperature to another
    Chill {
        #[command(flatten)]
        model: ModelArgs,
        #[command(flatten)]
        state: StateArgs,
        /// Target temperature [K]
        #[arg(long)]
        to: f64,
        /// Phase of the starting root
        #[arg(long, default_value = "unknown")]
        phase: Phase,
    },
}

#[derive(Args)]
struct ModelArgs {
    /// Cubic equation of state: pr, srk, vdw
    #[arg(long, default_value = "pr")]
    eos: CubicKind,
    /// Critical temperatures [K], one per component
    #[arg(long, value_delimiter = ',', required = true)]
    tc: Vec<f64>,
    /// Critical pressures [Pa], one per component
    #[arg(long, value_delimiter = ',', required = true)]
    pc: Vec<f64>,
    /// Acentric factors, one per component
    #[arg(long, value_delimiter = ',', required = true)]
    omega: Vec<f64>,
    /// Pair with a log-compressible solid: reference molar volume [m³/mol]
    #[arg(long, requires_all = ["solid_bulk_modulus", "solid_energy"])]
    solid_volume: Option<f64>,
    /// Solid bulk modulus [Pa]
    #[arg(long)]
    solid_bulk_modulus: Option<f64>,
    /// Solid cohesive energy [J/mol]
    #[arg(long)]
    solid_energy: Option<f64>,
}

#[derive(Args)]
struct StateArgs {
    /// Pressure [Pa]
    #[arg(short, long)]
    pressure: f64,
    /// Temperature [K]
    #[arg(short, long)]
    temperature: f64,
    /// Mole amounts [mol]; defaults to one mole of each component
    #[arg(short, long, value_delimiter = ',')]
    z: Vec<f64>,
    /// Solve candidates on the calling thread
    #[arg(long)]
    sequential: bool,
    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Input(#[from] PvError),

    #[error("Model error: {0}")]
    Eos(#[from] EosError),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

type CliResult<T> = Result<T, CliError>;

impl ModelArgs {
    fn build(&self) -> CliResult<Box<dyn EosModel>> {
        let fluid = CubicEos::new(self.eos, &self.tc, &self.pc, &self.omega)?;
        let model: Box<dyn EosModel> =
            match (self.solid_volume, self.solid_bulk_modulus, self.solid_energy) {
                (Some(v0), Some(k), Some(u0)) => {
                    let solid = LogCompressibleSolid::new(self.tc.len(), v0, k, u0)?;
                    Box::new(FluidSolidModel::new(fluid, solid)?)
                }
                _ => Box::new(fluid),
            };
        debug!(
            model = model.name(),
            components = model.num_components(),
            "built model"
        );
        Ok(model)
    }
}

impl StateArgs {
    fn validate(&self) -> CliResult<()> {
        ensure_finite(self.pressure, "pressure")?;
        ensure_finite(self.temperature, "temperature")?;
        if self.temperature <= 0.0 {
            return Err(PvError::NonPhysical {
                what: format!("temperature {} K", self.temperature),
            }
            .into());
        }
        Ok(())
    }

    fn amounts(&self, model: &dyn EosModel) -> Vec<f64> {
        if self.z.is_empty() {
            vec![1.0; model.num_components()]
        } else {
            self.z.clone()
        }
    }

    fn options(&self, phase: Phase) -> VolumeOptions {
        let mut options = VolumeOptions::default().with_phase(phase);
        if self.sequential {
            options.execution = ExecutionMode::Sequential;
        }
        options
    }
}

#[derive(Serialize)]
struct VolumeReport<'a> {
    model: &'a str,
    pressure_pa: f64,
    temperature_k: f64,
    phase: Phase,
    volume_m3: f64,
}

#[derive(Serialize)]
struct CandidateRow {
    phase: Phase,
    guess_m3: f64,
    volume_m3: f64,
    gibbs_j: f64,
    selected: bool,
}

#[derive(Serialize)]
struct VirialReport<'a> {
    model: &'a str,
    second_virial_m3: f64,
    volume_m3: f64,
}

#[derive(Serialize)]
struct ChillReport {
    temperature_from_k: f64,
    temperature_to_k: f64,
    volume_from_m3: f64,
    volume_to_m3: f64,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let state = match &cli.command {
        Commands::Volume { state, .. }
        | Commands::Candidates { state, .. }
        | Commands::Virial { state, .. }
        | Commands::Chill { state, .. } => state,
    };
    state.validate()?;

    match cli.command {
        Commands::Volume {
            model,
            state,
            phase,
            guess,
        } => cmd_volume(&model, &state, phase, guess),
        Commands::Candidates { model, state } => cmd_candidates(&model, &state),
        Commands::Virial { model, state } => cmd_virial(&model, &state),
        Commands::Chill {
            model,
            state,
            to,
            phase,
        } => cmd_chill(&model, &state, to, phase),
    }
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_volume(
    model_args: &ModelArgs,
    state: &StateArgs,
    phase: Phase,
    guess: Option<f64>,
) -> CliResult<()> {
    let model = model_args.build()?;
    let z = state.amounts(model.as_ref());
    let mut options = state.options(phase);
    options.initial_guess = guess;

    let v = volume(model.as_ref(), state.pressure, state.temperature, &z, &options)?;
    if v.is_nan() {
        warn!(model = model.name(), %phase, "no acceptable volume root");
    }

    if state.json {
        return print_json(&VolumeReport {
            model: model.name(),
            pressure_pa: state.pressure,
            temperature_k: state.temperature,
            phase,
            volume_m3: v,
        });
    }
    println!(
        "{} at p = {} Pa, T = {} K ({phase}): V = {v:.6e} m³",
        model.name(),
        state.pressure,
        state.temperature
    );
    Ok(())
}

fn cmd_candidates(model_args: &ModelArgs, state: &StateArgs) -> CliResult<()> {
    let model = model_args.build()?;
    let z = state.amounts(model.as_ref());
    let report = volume_candidates(
        model.as_ref(),
        state.pressure,
        state.temperature,
        &z,
        &state.options(Phase::Unknown),
    )?;

    let rows: Vec<CandidateRow> = report
        .candidates
        .iter()
        .enumerate()
        .map(|(i, c)| CandidateRow {
            phase: c.phase,
            guess_m3: c.guess,
            volume_m3: c.volume,
            gibbs_j: c.gibbs,
            selected: report.selection.index == Some(i),
        })
        .collect();

    if state.json {
        return print_json(&rows);
    }
    println!("{:<8} {:>14} {:>14} {:>16}", "phase", "guess [m³]", "V [m³]", "G [J]");
    for row in &rows {
        println!(
            "{:<8} {:>14.6e} {:>14.6e} {:>16.6e}{}",
            row.phase.key(),
            row.guess_m3,
            row.volume_m3,
            row.gibbs_j,
            if row.selected { "  *" } else { "" }
        );
    }
    Ok(())
}

fn cmd_virial(model_args: &ModelArgs, state: &StateArgs) -> CliResult<()> {
    let model = model_args.build()?;
    let z = state.amounts(model.as_ref());
    if z.len() != model.num_components() {
        return Err(EosError::ComponentMismatch {
            expected: model.num_components(),
            found: z.len(),
        }
        .into());
    }
    let b = model.second_virial_coefficient(state.temperature, &z);
    let v = volume_virial(model.as_ref(), state.pressure, state.temperature, &z);

    if state.json {
        return print_json(&VirialReport {
            model: model.name(),
            second_virial_m3: b,
            volume_m3: v,
        });
    }
    println!("B = {b:.6e} m³, V ≈ {v:.6e} m³");
    Ok(())
}

fn cmd_chill(model_args: &ModelArgs, state: &StateArgs, to: f64, phase: Phase) -> CliResult<()> {
    let model = model_args.build()?;
    let z = state.amounts(model.as_ref());
    let v0 = volume(
        model.as_ref(),
        state.pressure,
        state.temperature,
        &z,
        &state.options(phase),
    )?;
    let v = volume_chill(
        model.as_ref(),
        state.pressure,
        to,
        &z,
        v0,
        state.temperature,
        &ChillConfig::default(),
    );

    if state.json {
        return print_json(&ChillReport {
            temperature_from_k: state.temperature,
            temperature_to_k: to,
            volume_from_m3: v0,
            volume_to_m3: v,
        });
    }
    println!(
        "V({} K) = {v0:.6e} m³ → V({to} K) = {v:.6e} m³",
        state.temperature
    );
    Ok(())
}
