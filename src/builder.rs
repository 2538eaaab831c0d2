// [[file:../jdftx-tools.note::*docs][docs:1]]
//! Prepare a JDFTx job according to the run mode
// docs:1 ends here

// [[file:../jdftx-tools.note::*imports][imports:1]]
use crate::common::*;
use crate::geometry::GeometrySetup;
use crate::jdftx::{out, InputDeck};
use crate::options::{RerunStrategy, RunMode, RunOptions};
// imports:1 ends here

// [[file:../jdftx-tools.note::*base][base:1]]
/// What a build produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A deck was written or updated at this path.
    Deck(PathBuf),
    /// The previous run has converged; nothing was written.
    Converged,
    /// Only the geometry files were generated.
    Geometry,
    /// The last chemical potential found in the log.
    Mu(Option<f64>),
}

fn geometry_setup(options: &RunOptions) -> GeometrySetup {
    GeometrySetup::new(&options.converter, options.pad).with_env(&options.env)
}
// base:1 ends here

// [[file:../jdftx-tools.note::*render][render:1]]
/// Return the complete deck for a new run, assuming geometry files for
/// `options.source` are ready.
pub fn render_new(options: &RunOptions) -> Result<InputDeck> {
    let mut deck = InputDeck::new();
    deck.include_geometry(&options.source);
    deck.trailer(options)?;
    Ok(deck)
}

/// Return the complete deck restarting `options.job` from its last state.
pub fn render_rerun(options: &RunOptions) -> Result<InputDeck> {
    let mut deck = InputDeck::new();
    deck.include_geometry(&options.job);
    deck.initial_state(&options.job);
    deck.trailer(options)?;
    Ok(deck)
}
// render:1 ends here

// [[file:../jdftx-tools.note::*build][build:1]]
/// Prepare the job described by `options`.
pub fn build(options: &RunOptions) -> Result<Outcome> {
    match options.mode {
        RunMode::New => build_new(options),
        RunMode::Rerun => build_rerun(options),
        RunMode::GeometryOnly => {
            geometry_setup(options).setup_from_file(&options.structure_path(), &options.workdir, &options.source)?;
            Ok(Outcome::Geometry)
        }
        RunMode::ExtractMu => {
            let mu = out::extract_last_mu(&options.log_path())?;
            Ok(Outcome::Mu(mu))
        }
    }
}

fn build_new(options: &RunOptions) -> Result<Outcome> {
    // an unknown functional should fail before running the converter
    let deck = render_new(options)?;
    geometry_setup(options).setup_from_file(&options.structure_path(), &options.workdir, &options.source)?;

    let path = options.deck_path();
    crate::deck::write_deck(&path, &deck)?;
    Ok(Outcome::Deck(path))
}

fn build_rerun(options: &RunOptions) -> Result<Outcome> {
    let log = options.log_path();
    if out::is_converged(&log)? {
        info!("{}: converged", options.job);
        return Ok(Outcome::Converged);
    }
    info!("{}: not converged", options.job);

    let path = options.deck_path();
    match options.rerun {
        RerunStrategy::Append if path.is_file() => {
            crate::deck::append_restart_directive(&path, &options.job)?;
        }
        strategy => {
            if strategy == RerunStrategy::Append {
                warn!("{:?} not found, write a new one.", path);
            }
            let deck = render_rerun(options)?;
            crate::deck::write_deck(&path, &deck)?;
        }
    }

    Ok(Outcome::Deck(path))
}
// build:1 ends here

// test:1 ends here
