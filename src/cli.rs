// [[file:../jdftx-tools.note::*imports][imports:1]]
use gut::prelude::*;
use std::path::PathBuf;
use structopt::*;

use crate::builder::Outcome;
use crate::options::*;
// imports:1 ends here

// [[file:../jdftx-tools.note::*setup-jdftx][setup-jdftx:1]]
/// Prepare input files for a JDFTx calculation, or check a finished one.
///
/// Modes: NEW builds geometry files and a fresh input deck; RERUN restarts an
/// unconverged job; GEOM only builds geometry files; MU prints the last
/// chemical potential found in the job log.
#[derive(Debug, StructOpt)]
#[structopt(setting = structopt::clap::AppSettings::AllowNegativeNumbers)]
struct SetupCli {
    #[structopt(flatten)]
    verbose: gut::cli::Verbosity,

    /// Run mode: NEW, RERUN, GEOM or MU
    mode: RunMode,

    /// Job name for `<job>.in` and `<job>.out`
    job: String,

    /// Stem of the generated geometry files
    #[structopt(default_value = "start")]
    source: String,

    /// Max ionic steps; 0 for a single point calculation
    #[structopt(default_value = "0")]
    max_iter: u32,

    /// Net charge, or GC / GC-Charged for grand-canonical calculation
    #[structopt(default_value = "0")]
    charge: String,

    /// Implicit solvent, e.g. H2O. No solvation if omitted.
    solvent: Option<String>,

    /// Short name of the exchange-correlation functional
    #[structopt(long, default_value = "PBE")]
    functional: String,

    /// JDFTx exchange-correlation tag used as is, overriding --functional
    #[structopt(long)]
    elec_ex_corr: Option<String>,

    /// Dispersion correction
    #[structopt(long, default_value = "D3")]
    vdw: String,

    /// Coordinate frame: cartesian or lattice
    #[structopt(long, default_value = "cartesian")]
    coords_type: CoordsType,

    /// Extra variables to dump at the end, e.g. "ElecDensity BoundCharge"
    #[structopt(long, default_value = "")]
    dump: String,

    /// Electrolyte concentration (mol/L)
    #[structopt(long, default_value = "0.1")]
    concentration: f64,

    /// Vacuum padding around the molecule (bohr)
    #[structopt(long, default_value = "15")]
    pad: f64,

    /// Structure file to build geometry from [default: <source>.xyz with
    /// solvent, start.xyz without]
    #[structopt(long)]
    structure: Option<PathBuf>,

    /// The command or the path to the geometry converter
    #[structopt(long, default_value = "xyzToIonposOpt")]
    converter: String,

    /// Environment file (KEY=VALUE lines) for the converter process
    #[structopt(long)]
    env_file: Option<PathBuf>,

    /// Working directory of the job
    #[structopt(short = "w", long, default_value = ".")]
    workdir: PathBuf,

    /// On RERUN, keep existing deck and only append the restart directive
    #[structopt(long)]
    append: bool,
}

impl SetupCli {
    fn run_options(&self) -> Result<RunOptions> {
        let mut options = RunOptions::new(self.mode, &self.job);
        options.source = self.source.clone();
        options.max_iter = self.max_iter;
        options.charge = ChargeMode::parse(&self.charge);
        options.solvent = self.solvent.clone().unwrap_or_default();
        options.functional = self.functional.clone();
        options.elec_ex_corr = self.elec_ex_corr.clone();
        options.vdw = self.vdw.clone();
        options.coords_type = self.coords_type;
        options.dump = self.dump.clone();
        options.concentration = self.concentration;
        options.pad = self.pad;
        options.structure = self.structure.clone();
        options.converter = self.converter.clone();
        options.workdir = self.workdir.clone();
        if let Some(f) = &self.env_file {
            options.env = crate::geometry::read_env_file(f)?;
        }
        if self.append {
            options.rerun = RerunStrategy::Append;
        }

        Ok(options)
    }
}

pub fn setup_jdftx_enter_main() -> Result<()> {
    let args = SetupCli::from_args();
    args.verbose.setup_logger();

    let options = args.run_options()?;
    debug!("{:?}", options);
    match crate::builder::build(&options)? {
        Outcome::Deck(path) => println!("wrote {}", path.display()),
        Outcome::Converged => println!("converged"),
        Outcome::Geometry => {
            println!("geometry files ready: {0}.lattice {0}.ionpos", options.source)
        }
        Outcome::Mu(Some(mu)) => println!("{}", mu),
        Outcome::Mu(None) => bail!("no chemical potential found in {:?}", options.log_path()),
    }

    Ok(())
}
// setup-jdftx:1 ends here

// test:1 ends here
