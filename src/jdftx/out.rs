// [[file:../../jdftx-tools.note::*docs][docs:1]]
//! Read JDFTx log output (`<job>.out`)
// docs:1 ends here

// [[file:../../jdftx-tools.note::*imports][imports:1]]
use crate::common::*;
use crate::error::SetupError;

use bstr::ByteSlice;
use regex::Regex;
// imports:1 ends here

// [[file:../../jdftx-tools.note::*base][base:1]]
/// Written once when the ionic minimization has converged.
pub const CONVERGED_MARKER: &str = "IonicMinimize: Converged";

/// Lines reporting the chemical potential, like:
///
/// FillingsUpdate:  mu: -0.189954295  nElectrons: 8.000000
pub const MU_MARKER: &str = "FillingsUpdate:";

/// A signed decimal number, optionally with an exponent.
pub const MU_PATTERN: &str = r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?";

/// Read the whole log. Logs may be truncated in the middle of a multi-byte
/// character when the job was killed, so they are kept as bytes.
fn read_log(path: &Path) -> Result<Vec<u8>> {
    if !path.is_file() {
        return Err(SetupError::MissingLog(path.to_owned()).into());
    }
    let bytes = std::fs::read(path).with_context(|| format!("read {:?}", path))?;
    Ok(bytes)
}

/// Scan `bytes` from the last line backwards for a line containing `marker`.
fn last_line_containing<'a>(bytes: &'a [u8], marker: &str) -> Option<&'a [u8]> {
    let lines: Vec<&[u8]> = bytes.lines().collect();
    lines.into_iter().rev().find(|line| line.contains_str(marker))
}
// base:1 ends here

// [[file:../../jdftx-tools.note::*converged][converged:1]]
/// Return true if the log at `path` reports a converged ionic minimization.
pub fn is_converged(path: &Path) -> Result<bool> {
    let bytes = read_log(path)?;
    let converged = last_line_containing(&bytes, CONVERGED_MARKER).is_some();
    debug!("{:?}: converged = {}", path, converged);

    Ok(converged)
}
// converged:1 ends here

// [[file:../../jdftx-tools.note::*scalar][scalar:1]]
/// Return the number matching `pattern` after `marker` in the last line
/// containing `marker`. When `pattern` has a capture group, the first group
/// is taken as the number.
pub fn extract_last_scalar(path: &Path, marker: &str, pattern: &str) -> Result<Option<f64>> {
    let re = Regex::new(pattern).with_context(|| format!("invalid numeric pattern: {:?}", pattern))?;
    let bytes = read_log(path)?;
    let line = match last_line_containing(&bytes, marker) {
        Some(line) => line.to_str_lossy(),
        None => {
            trace!("no line matching {:?} in {:?}", marker, path);
            return Ok(None);
        }
    };

    Ok(parse::scalar_after(&line, marker, &re))
}

/// Return the last chemical potential (in Hartree) written in the log.
pub fn extract_last_mu(path: &Path) -> Result<Option<f64>> {
    extract_last_scalar(path, MU_MARKER, MU_PATTERN)
}

mod parse {
    use super::*;

    pub fn scalar_after(line: &str, marker: &str, re: &Regex) -> Option<f64> {
        let i = line.find(marker)?;
        let rest = &line[i + marker.len()..];
        let caps = re.captures(rest)?;
        let m = caps.get(1).or_else(|| caps.get(0))?;
        m.as_str().parse().ok()
    }

    #[test]
    fn test_scalar_after() -> Result<()> {
        let re = Regex::new(MU_PATTERN)?;
        let line = "FillingsUpdate:  mu: -0.1234 nElectrons: 8.000000  magneticMoment: [ Abs: 0.0 ]";
        assert_eq!(scalar_after(line, "FillingsUpdate:", &re), Some(-0.1234));
        assert_eq!(scalar_after("FillingsUpdate:  mu: +1.5e-2", "FillingsUpdate:", &re), Some(0.015));
        assert_eq!(scalar_after("FillingsUpdate: nothing", "FillingsUpdate:", &re), None);
        assert_eq!(scalar_after("mu: 0.1", "FillingsUpdate:", &re), None);

        let re = Regex::new(r"nElectrons:\s*(\d+\.\d+)")?;
        assert_eq!(scalar_after(line, "FillingsUpdate:", &re), Some(8.0));

        Ok(())
    }
}
// scalar:1 ends here

// [[file:../../jdftx-tools.note::*test][test:1]]
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_convergence() -> Result<()> {
        assert!(is_converged("./tests/files/jdftx/converged.out".as_ref())?);
        assert!(!is_converged("./tests/files/jdftx/unconverged.out".as_ref())?);

        let e = is_converged("./tests/files/jdftx/missing.out".as_ref()).unwrap_err();
        assert!(matches!(e.downcast_ref::<SetupError>(), Some(SetupError::MissingLog(_))));

        Ok(())
    }

    #[test]
    fn test_extract_mu() -> Result<()> {
        let mu = extract_last_mu("./tests/files/jdftx/converged.out".as_ref())?;
        assert_relative_eq!(mu.unwrap(), -0.1234);
        let mu = extract_last_mu("./tests/files/jdftx/unconverged.out".as_ref())?;
        assert_relative_eq!(mu.unwrap(), -0.187642101);

        let dir = tempfile::tempdir()?;
        let f = dir.path().join("empty.out");
        gut::fs::write_to_file(&f, "IonicMinimize: Iter:   0\n")?;
        assert_eq!(extract_last_mu(&f)?, None);
        assert!(extract_last_mu(&dir.path().join("missing.out")).is_err());

        Ok(())
    }

    #[test]
    fn test_extract_scalar_with_pattern() -> Result<()> {
        let f: &Path = "./tests/files/jdftx/converged.out".as_ref();
        // integers only
        assert_eq!(extract_last_scalar(f, "nElectrons:", r"\d+")?, Some(8.0));
        assert_eq!(extract_last_scalar(f, "IonicMinimize: Iter:", r"\d+")?, Some(1.0));
        assert_eq!(extract_last_scalar(f, "Done!", r"\d+")?, None);

        let e = extract_last_scalar(f, MU_MARKER, "(").unwrap_err();
        assert!(e.to_string().contains("invalid numeric pattern"));

        Ok(())
    }

    #[test]
    fn test_invalid_utf8_log() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let f = dir.path().join("killed.out");
        let mut bytes = b"FillingsUpdate:  mu: -0.25  nElectrons: 8.000000\n".to_vec();
        // truncated multi-byte character on the last marker line
        bytes.extend_from_slice(b"FillingsUpdate:  mu: -0.3125  \xe2\x82\n");
        std::fs::write(&f, &bytes)?;

        assert_eq!(extract_last_mu(&f)?, Some(-0.3125));
        assert!(!is_converged(&f)?);

        Ok(())
    }
}
// test:1 ends here
