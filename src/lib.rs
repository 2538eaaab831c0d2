// [[file:../jdftx-tools.note::*mods][mods:1]]
mod builder;
mod cli;
mod deck;
mod error;
mod geometry;
mod jdftx;
mod options;

pub(crate) mod common {
    pub use gut::prelude::*;
    pub use std::path::{Path, PathBuf};
}
// mods:1 ends here

// [[file:../jdftx-tools.note::*pub][pub:1]]
pub use crate::builder::{build, render_new, render_rerun, Outcome};
pub use crate::cli::*;
pub use crate::deck::{append_restart_directive, write_deck};
pub use crate::error::SetupError;
pub use crate::geometry::{read_env_file, GeometrySetup};
pub use crate::jdftx::out::{extract_last_mu, extract_last_scalar, is_converged, MU_MARKER, MU_PATTERN};
pub use crate::jdftx::{needs_norm_conserving, resolve_functional, InputDeck};
pub use crate::options::*;
// pub:1 ends here
