// [[file:../jdftx-tools.note::*docs][docs:1]]
//! Failures that callers may want to tell apart.
// docs:1 ends here

// [[file:../jdftx-tools.note::*base][base:1]]
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    /// The engine log expected by a rerun or mu extraction is absent.
    #[error("JDFTx log file not found: {0:?} (has the job been run yet?)")]
    MissingLog(PathBuf),

    #[error("unknown functional {0:?}; choose one of PBE, PW, B3LYP, PBE0, HSE06, TPSS, rTPSS, HF or set --elec-ex-corr")]
    UnknownFunctional(String),

    #[error("structure file not found: {0:?}")]
    MissingStructure(PathBuf),

    #[error("geometry converter exited with {status}:\n{output}")]
    ConverterFailed { status: String, output: String },

    #[error("geometry converter did not produce {0:?}")]
    MissingConverterOutput(PathBuf),
}
// base:1 ends here
