// [[file:../jdftx-tools.note::*docs][docs:1]]
//! Generate JDFTx lattice and ionic position files from a molecule
// docs:1 ends here

// [[file:../jdftx-tools.note::*imports][imports:1]]
use crate::common::*;
use crate::error::SetupError;

use gchemol::prelude::*;
use gchemol::Molecule;
// imports:1 ends here

// [[file:../jdftx-tools.note::*base][base:1]]
/// Call an external converter (`xyzToIonposOpt` from JDFTx scripts) to put
/// a molecule into a padded box.
#[derive(Debug, Clone)]
pub struct GeometrySetup {
    /// The command or the path to the converter
    converter: String,
    /// Vacuum padding around the molecule in bohr
    pad: f64,
    /// Extra environment variables for the converter
    env: Vec<(String, String)>,
}

impl GeometrySetup {
    pub fn new(converter: &str, pad: f64) -> Self {
        Self {
            converter: converter.into(),
            pad,
            env: vec![],
        }
    }

    /// Set environment variables passed to the converter process.
    pub fn with_env(mut self, env: &[(String, String)]) -> Self {
        self.env = env.to_vec();
        self
    }
}
// base:1 ends here

// [[file:../jdftx-tools.note::*env][env:1]]
/// Read `KEY=VALUE` pairs from an env file, which replaces `module load`
/// for the converter process.
pub fn read_env_file(path: &Path) -> Result<Vec<(String, String)>> {
    let envfile = envfile::EnvFile::new(path).with_context(|| format!("read env file {:?}", path))?;
    let env = envfile.store.into_iter().collect();
    Ok(env)
}
// env:1 ends here

// [[file:../jdftx-tools.note::*core][core:1]]
impl GeometrySetup {
    /// Read the first molecule in `structure`, write it as `<stem>.xyz` in
    /// `wdir`, and convert it into `<stem>.lattice` and `<stem>.ionpos`.
    pub fn setup_from_file(&self, structure: &Path, wdir: &Path, stem: &str) -> Result<()> {
        if !structure.is_file() {
            return Err(SetupError::MissingStructure(structure.to_owned()).into());
        }
        let mol = Molecule::from_file(structure).with_context(|| format!("read molecule from {:?}", structure))?;
        self.setup(&mol, wdir, stem)
    }

    /// Convert `mol` into `<stem>.lattice` and `<stem>.ionpos` in `wdir`.
    pub fn setup(&self, mol: &Molecule, wdir: &Path, stem: &str) -> Result<()> {
        let xyz = format!("{}.xyz", stem);
        mol.to_file(wdir.join(&xyz))
            .with_context(|| format!("write molecule to {:?}", xyz))?;

        info!("run {} {} {} in {:?}", self.converter, xyz, self.pad, wdir);
        let mut expr = duct::cmd(self.converter.as_str(), vec![xyz.clone(), self.pad.to_string()])
            .dir(wdir)
            .stderr_to_stdout()
            .stdout_capture()
            .unchecked();
        for (k, v) in self.env.iter() {
            expr = expr.env(k, v);
        }
        // blocks until the converter exits
        let output = expr
            .run()
            .with_context(|| format!("failed to run geometry converter {:?}", self.converter))?;
        let out = String::from_utf8_lossy(&output.stdout).to_string();
        debug!("converter output:\n{}", out);
        if !output.status.success() {
            return Err(SetupError::ConverterFailed {
                status: output.status.to_string(),
                output: out,
            }
            .into());
        }

        for ext in &["lattice", "ionpos"] {
            let f = wdir.join(format!("{}.{}", stem, ext));
            if !f.is_file() {
                return Err(SetupError::MissingConverterOutput(f).into());
            }
        }

        Ok(())
    }
}
// core:1 ends here

// [[file:../jdftx-tools.note::*test][test:1]]
#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Write a stand-in for `xyzToIonposOpt` that only touches its outputs.
    pub fn fake_converter(dir: &Path) -> Result<String> {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("fake-xyz-to-ionpos");
        let txt = "#!/bin/sh\nstem=${1%.xyz}\necho \"pad = $2\"\ntouch \"$stem.lattice\" \"$stem.ionpos\"\n";
        gut::fs::write_to_file(&script, txt)?;
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))?;

        Ok(script.to_string_lossy().to_string())
    }

    #[test]
    fn test_geometry_setup() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let converter = fake_converter(dir.path())?;
        let setup = GeometrySetup::new(&converter, 15.0);
        setup.setup_from_file("./tests/files/start.xyz".as_ref(), dir.path(), "water")?;
        assert!(dir.path().join("water.xyz").is_file());
        assert!(dir.path().join("water.lattice").is_file());
        assert!(dir.path().join("water.ionpos").is_file());

        Ok(())
    }

    #[test]
    fn test_geometry_setup_failure() -> Result<()> {
        let dir = tempfile::tempdir()?;

        let e = GeometrySetup::new("false", 15.0)
            .setup_from_file("./tests/files/start.xyz".as_ref(), dir.path(), "water")
            .unwrap_err();
        assert!(matches!(
            e.downcast_ref::<SetupError>(),
            Some(SetupError::ConverterFailed { .. })
        ));

        let e = GeometrySetup::new("true", 15.0)
            .setup_from_file("./tests/files/start.xyz".as_ref(), dir.path(), "water")
            .unwrap_err();
        assert!(matches!(
            e.downcast_ref::<SetupError>(),
            Some(SetupError::MissingConverterOutput(_))
        ));

        let e = GeometrySetup::new("true", 15.0)
            .setup_from_file(&dir.path().join("missing.xyz"), dir.path(), "water")
            .unwrap_err();
        assert!(matches!(
            e.downcast_ref::<SetupError>(),
            Some(SetupError::MissingStructure(_))
        ));

        Ok(())
    }

    #[test]
    fn test_env_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let f = dir.path().join("jdftx.env");
        gut::fs::write_to_file(&f, "JDFTX_SCRIPTS=/opt/jdftx/scripts\nOMP_NUM_THREADS=4\n")?;
        let env = read_env_file(&f)?;
        assert!(env.contains(&("OMP_NUM_THREADS".to_string(), "4".to_string())));

        Ok(())
    }
}
// test:1 ends here
