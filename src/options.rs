// [[file:../jdftx-tools.note::*imports][imports:1]]
use crate::common::*;
// imports:1 ends here

// [[file:../jdftx-tools.note::*mode][mode:1]]
/// What to do with a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Build geometry files from the structure and write a fresh deck.
    New,
    /// Restart an unconverged job from its last state.
    Rerun,
    /// Only build the geometry files.
    GeometryOnly,
    /// Print the last chemical potential found in the job log.
    ExtractMu,
}

impl std::str::FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        let mode = match s.to_uppercase().as_str() {
            "NEW" => Self::New,
            "RERUN" => Self::Rerun,
            "GEOM" | "GEOMETRY" | "GEOMETRY_ONLY" => Self::GeometryOnly,
            "MU" | "EXTRACT_MU" => Self::ExtractMu,
            _ => return Err(format!("invalid run mode {:?}: expect NEW, RERUN, GEOM or MU", s)),
        };
        Ok(mode)
    }
}
// mode:1 ends here

// [[file:../jdftx-tools.note::*coords][coords:1]]
/// Coordinate frame for ionic positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordsType {
    Cartesian,
    Lattice,
}

impl Default for CoordsType {
    fn default() -> Self {
        Self::Cartesian
    }
}

impl std::str::FromStr for CoordsType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "cartesian" => Ok(Self::Cartesian),
            "lattice" => Ok(Self::Lattice),
            _ => Err(format!("invalid coords type {:?}: expect cartesian or lattice", s)),
        }
    }
}

impl std::fmt::Display for CoordsType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Cartesian => write!(f, "cartesian"),
            Self::Lattice => write!(f, "lattice"),
        }
    }
}
// coords:1 ends here

// [[file:../jdftx-tools.note::*charge][charge:1]]
/// How the electron count of the system is controlled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeMode {
    /// Fixed net charge
    Fixed(i64),
    /// Grand-canonical: electron count floats to match a target potential.
    GrandCanonical { charged: bool },
    /// Neither a number nor a GC sentinel: no charge directive.
    Unspecified(String),
}

impl Default for ChargeMode {
    fn default() -> Self {
        Self::Fixed(0)
    }
}

impl ChargeMode {
    /// Interpret a charge specifier like "0", "-1", "GC" or "GC-Charged".
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        let digits = s.strip_prefix('-').unwrap_or(s);
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(q) = s.parse() {
                return Self::Fixed(q);
            }
        }
        if s.contains("GC") {
            Self::GrandCanonical {
                charged: s.contains("Charged"),
            }
        } else {
            Self::Unspecified(s.to_owned())
        }
    }
}
// charge:1 ends here

// [[file:../jdftx-tools.note::*options][options:1]]
/// How an unconverged job is restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RerunStrategy {
    /// Regenerate the whole deck including the restart directive.
    Rewrite,
    /// Keep the existing deck and append the restart directive once.
    Append,
}

/// Structure file read when nothing else is given
pub const DEFAULT_STRUCTURE: &str = "start.xyz";

/// All knobs for one job, fixed before anything is built.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub mode: RunMode,
    /// Job name: stem of `<job>.in` and `<job>.out`
    pub job: String,
    /// Stem of the geometry files generated in NEW mode
    pub source: String,
    /// 0 for a single point, N > 0 for up to N relaxation steps
    pub max_iter: u32,
    pub coords_type: CoordsType,
    pub functional: String,
    /// Exchange-correlation tag used verbatim, bypassing the functional table
    pub elec_ex_corr: Option<String>,
    pub vdw: String,
    /// Extra arguments appended to the dump directive
    pub dump: String,
    pub charge: ChargeMode,
    /// Empty solvent disables the solvation block
    pub solvent: String,
    /// Electrolyte concentration in mol/L
    pub concentration: f64,
    /// Vacuum padding around the molecule in bohr
    pub pad: f64,
    /// Structure file given explicitly; see `structure_path`
    pub structure: Option<PathBuf>,
    pub converter: String,
    /// Extra environment for the converter subprocess
    pub env: Vec<(String, String)>,
    pub workdir: PathBuf,
    pub rerun: RerunStrategy,
}

impl RunOptions {
    pub fn new(mode: RunMode, job: &str) -> Self {
        Self {
            mode,
            job: job.into(),
            source: "start".into(),
            max_iter: 0,
            coords_type: CoordsType::default(),
            functional: "PBE".into(),
            elec_ex_corr: None,
            vdw: "D3".into(),
            dump: String::new(),
            charge: ChargeMode::default(),
            solvent: String::new(),
            concentration: 0.1,
            pad: 15.0,
            structure: None,
            converter: "xyzToIonposOpt".into(),
            env: vec![],
            workdir: ".".into(),
            rerun: RerunStrategy::Rewrite,
        }
    }

    /// Path to the deck `<job>.in`
    pub fn deck_path(&self) -> PathBuf {
        self.workdir.join(format!("{}.in", self.job))
    }

    /// Path to the engine log `<job>.out`
    pub fn log_path(&self) -> PathBuf {
        self.workdir.join(format!("{}.out", self.job))
    }

    /// Path to the structure for geometry setup. Without an explicit file, a
    /// solvated job reads `<source>.xyz`, otherwise the default `start.xyz`.
    pub fn structure_path(&self) -> PathBuf {
        match &self.structure {
            Some(f) => self.workdir.join(f),
            None if !self.solvent.is_empty() => self.workdir.join(format!("{}.xyz", self.source)),
            None => self.workdir.join(DEFAULT_STRUCTURE),
        }
    }
}
// options:1 ends here

// [[file:../jdftx-tools.note::*test][test:1]]
#[test]
fn test_charge_mode() {
    assert_eq!(ChargeMode::parse("0"), ChargeMode::Fixed(0));
    assert_eq!(ChargeMode::parse("-2"), ChargeMode::Fixed(-2));
    assert_eq!(ChargeMode::parse("GC"), ChargeMode::GrandCanonical { charged: false });
    assert_eq!(
        ChargeMode::parse("GC-Charged"),
        ChargeMode::GrandCanonical { charged: true }
    );
    assert_eq!(ChargeMode::parse("-"), ChargeMode::Unspecified("-".into()));
    assert_eq!(ChargeMode::parse("neutral"), ChargeMode::Unspecified("neutral".into()));
}

#[test]
fn test_run_mode() {
    assert_eq!("NEW".parse::<RunMode>(), Ok(RunMode::New));
    assert_eq!("rerun".parse::<RunMode>(), Ok(RunMode::Rerun));
    assert_eq!("GEOM".parse::<RunMode>(), Ok(RunMode::GeometryOnly));
    assert_eq!("EXTRACT_MU".parse::<RunMode>(), Ok(RunMode::ExtractMu));
    assert!("restart".parse::<RunMode>().is_err());
    assert_eq!("Lattice".parse::<CoordsType>(), Ok(CoordsType::Lattice));
}

#[test]
fn test_structure_path() {
    let mut options = RunOptions::new(RunMode::New, "run1");
    options.workdir = "/scratch/job".into();
    options.source = "vac".into();
    assert_eq!(options.structure_path(), Path::new("/scratch/job/start.xyz"));

    options.solvent = "H2O".into();
    assert_eq!(options.structure_path(), Path::new("/scratch/job/vac.xyz"));

    options.structure = Some("relaxed.xyz".into());
    assert_eq!(options.structure_path(), Path::new("/scratch/job/relaxed.xyz"));
}
// test:1 ends here
