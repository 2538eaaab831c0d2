// [[file:../jdftx-tools.note::*docs][docs:1]]
//! Render JDFTx input decks
// docs:1 ends here

// [[file:../jdftx-tools.note::*imports][imports:1]]
use crate::common::*;
use crate::error::SetupError;
use crate::options::{ChargeMode, RunOptions};
// imports:1 ends here

// [[file:../jdftx-tools.note::*mods][mods:1]]
pub mod out;
// mods:1 ends here

// [[file:../jdftx-tools.note::*deck][deck:1]]
/// A JDFTx input file: one directive per line, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputDeck {
    lines: Vec<String>,
}

impl InputDeck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one directive line.
    pub fn push<S: Into<String>>(&mut self, line: S) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Return the deck as file content, newline terminated.
    pub fn render(&self) -> String {
        self.lines.iter().map(|line| format!("{}\n", line)).collect()
    }
}
// deck:1 ends here

// [[file:../jdftx-tools.note::*functional][functional:1]]
/// Exchange-correlation tags in JDFTx for short functional names.
const FUNCTIONALS: &[(&str, &str)] = &[
    ("PBE", "gga-PBE"),
    ("PW", "gga-PW91"),
    ("B3LYP", "hyb-gga-b3lyp"),
    ("PBE0", "hyb-PBE0"),
    ("HSE06", "hyb-HSE06"),
    ("TPSS", "mgga-TPSS"),
    ("rTPSS", "mgga-revTPSS"),
    ("HF", "Hartree-Fock"),
];

/// Return the `elec-ex-corr` tag for `functional`. A given `elec_ex_corr`
/// is used verbatim without looking at the table.
pub fn resolve_functional(functional: &str, elec_ex_corr: Option<&str>) -> Result<String> {
    if let Some(tag) = elec_ex_corr {
        return Ok(tag.to_owned());
    }
    let (_, tag) = FUNCTIONALS
        .iter()
        .find(|(name, _)| *name == functional)
        .ok_or_else(|| SetupError::UnknownFunctional(functional.to_owned()))?;
    Ok(tag.to_string())
}

/// Hybrid and exact-exchange functionals are only validated against
/// norm-conserving pseudopotentials.
pub fn needs_norm_conserving(xc_tag: &str) -> bool {
    xc_tag.contains("hyb-") || xc_tag.contains("Hartree-Fock")
}
// functional:1 ends here

// [[file:../jdftx-tools.note::*sections][sections:1]]
impl InputDeck {
    /// Include lattice and ionic positions from `<stem>.lattice` and `<stem>.ionpos`.
    pub fn include_geometry(&mut self, stem: &str) {
        self.push(format!("include {}.lattice", stem));
        self.push(format!("include {}.ionpos", stem));
    }

    /// Start from the last state written by a previous run of `job`.
    pub fn initial_state(&mut self, job: &str) {
        self.push(restart_directive(job));
    }

    /// Append everything after the geometry section.
    pub fn trailer(&mut self, options: &RunOptions) -> Result<()> {
        // isolated molecule in a periodic box
        self.push(format!("coords-type {}", options.coords_type));
        self.push("coulomb-interaction Isolated");
        self.push("coulomb-truncation-embed 0 0 0");

        let xc = resolve_functional(&options.functional, options.elec_ex_corr.as_deref())?;
        self.push(format!("van-der-waals {}", options.vdw));
        self.push(format!("elec-ex-corr {}", xc));

        if needs_norm_conserving(&xc) {
            self.push("ion-species SG15/$ID_ONCV_PBE.upf");
            self.push("elec-cutoff 30");
        } else {
            self.push("ion-species GBRV/$ID_pbe.uspp");
            self.push("elec-cutoff 20 100");
        }

        self.push(format!("dump-name {}.$VAR", options.job));
        let extra = options.dump.trim();
        if extra.is_empty() {
            self.push("dump End State Lattice");
        } else {
            self.push(format!("dump End State Lattice {}", extra));
        }

        // 0 means a single point calculation
        self.push(format!("ionic-minimize nIterations {}", options.max_iter));

        if !options.solvent.is_empty() {
            self.solvation(options);
        }

        Ok(())
    }

    fn solvation(&mut self, options: &RunOptions) {
        // NaF does not adsorb, so it only adds ionic screening
        self.push("fluid LinearPCM");
        self.push(format!("fluid-solvent {}", options.solvent));
        self.push(format!("fluid-cation Na+ {}", options.concentration));
        self.push(format!("fluid-anion F- {}", options.concentration));

        match &options.charge {
            ChargeMode::Fixed(q) => self.push(format!("elec-initial-charge {}", q)),
            ChargeMode::GrandCanonical { charged } => {
                self.push("elec-smearing Fermi 0.01");
                if *charged {
                    self.push("electronic-scf nIterations 100");
                    // substituted by the job script before running
                    self.push("target-mu ${mu}");
                }
            }
            ChargeMode::Unspecified(s) => {
                warn!("ignored charge specifier {:?}", s);
            }
        }
    }
}

pub(crate) fn restart_directive(job: &str) -> String {
    format!("initial-state {}.$VAR", job)
}
// sections:1 ends here

// [[file:../jdftx-tools.note::*test][test:1]]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RunMode;

    fn trailer_of(options: &RunOptions) -> Result<Vec<String>> {
        let mut deck = InputDeck::new();
        deck.trailer(options)?;
        Ok(deck.lines().to_vec())
    }

    #[test]
    fn test_resolve_functional() -> Result<()> {
        for (name, tag) in FUNCTIONALS {
            assert_eq!(&resolve_functional(name, None)?, tag);
        }
        assert_eq!(resolve_functional("PBE", Some("lda-PZ"))?, "lda-PZ");
        assert_eq!(resolve_functional("nonsense", Some("gga-PBEsol"))?, "gga-PBEsol");

        let e = resolve_functional("SCAN", None).unwrap_err();
        assert!(matches!(
            e.downcast_ref::<SetupError>(),
            Some(SetupError::UnknownFunctional(_))
        ));

        Ok(())
    }

    #[test]
    fn test_pseudopotentials() -> Result<()> {
        let mut options = RunOptions::new(RunMode::New, "run1");

        options.functional = "HF".into();
        let lines = trailer_of(&options)?;
        assert!(lines.contains(&"ion-species SG15/$ID_ONCV_PBE.upf".to_string()));
        assert!(lines.contains(&"elec-cutoff 30".to_string()));

        options.elec_ex_corr = Some("hyb-gga-x-custom".into());
        let lines = trailer_of(&options)?;
        assert!(lines.contains(&"elec-cutoff 30".to_string()));

        options.elec_ex_corr = None;
        for name in &["PBE", "PW", "TPSS", "rTPSS"] {
            options.functional = name.to_string();
            let lines = trailer_of(&options)?;
            assert!(lines.contains(&"ion-species GBRV/$ID_pbe.uspp".to_string()));
            assert!(lines.contains(&"elec-cutoff 20 100".to_string()));
        }

        Ok(())
    }

    #[test]
    fn test_ionic_minimize() -> Result<()> {
        let mut options = RunOptions::new(RunMode::New, "run1");
        assert!(trailer_of(&options)?.contains(&"ionic-minimize nIterations 0".to_string()));
        options.max_iter = 50;
        assert!(trailer_of(&options)?.contains(&"ionic-minimize nIterations 50".to_string()));

        Ok(())
    }

    #[test]
    fn test_dump() -> Result<()> {
        let mut options = RunOptions::new(RunMode::New, "run1");
        options.dump = "ElecDensity BoundCharge".into();
        let lines = trailer_of(&options)?;
        assert!(lines.contains(&"dump-name run1.$VAR".to_string()));
        assert!(lines.contains(&"dump End State Lattice ElecDensity BoundCharge".to_string()));

        Ok(())
    }

    #[test]
    fn test_solvation() -> Result<()> {
        let mut options = RunOptions::new(RunMode::New, "run1");
        options.charge = ChargeMode::GrandCanonical { charged: true };
        options.concentration = 0.5;
        let lines = trailer_of(&options)?;
        assert!(!lines.iter().any(|l| l.starts_with("fluid")));
        assert!(!lines.iter().any(|l| l.starts_with("elec-smearing")));

        options.solvent = "H2O".into();
        let lines = trailer_of(&options)?;
        let n = lines.iter().position(|l| l == "fluid LinearPCM").unwrap();
        assert_eq!(
            &lines[n..],
            &[
                "fluid LinearPCM",
                "fluid-solvent H2O",
                "fluid-cation Na+ 0.5",
                "fluid-anion F- 0.5",
                "elec-smearing Fermi 0.01",
                "electronic-scf nIterations 100",
                "target-mu ${mu}",
            ]
        );

        options.charge = ChargeMode::GrandCanonical { charged: false };
        let lines = trailer_of(&options)?;
        assert_eq!(lines.last().unwrap(), "elec-smearing Fermi 0.01");

        options.charge = ChargeMode::Fixed(-1);
        let lines = trailer_of(&options)?;
        assert_eq!(lines.last().unwrap(), "elec-initial-charge -1");

        Ok(())
    }

    #[test]
    fn test_deck_order() -> Result<()> {
        let options = RunOptions::new(RunMode::New, "run1");
        let mut deck = InputDeck::new();
        deck.include_geometry("start");
        deck.trailer(&options)?;

        let expected = "include start.lattice
include start.ionpos
coords-type cartesian
coulomb-interaction Isolated
coulomb-truncation-embed 0 0 0
van-der-waals D3
elec-ex-corr gga-PBE
ion-species GBRV/$ID_pbe.uspp
elec-cutoff 20 100
dump-name run1.$VAR
dump End State Lattice
ionic-minimize nIterations 0
";
        assert_eq!(deck.render(), expected);

        Ok(())
    }
}
// test:1 ends here
