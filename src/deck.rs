// [[file:../jdftx-tools.note::*docs][docs:1]]
//! Write and update `<job>.in` files on disk
// docs:1 ends here

// [[file:../jdftx-tools.note::*imports][imports:1]]
use crate::common::*;
use crate::jdftx::{restart_directive, InputDeck};
// imports:1 ends here

// [[file:../jdftx-tools.note::*write][write:1]]
/// Replace the content of `path` with `deck`. The deck is written into a
/// temporary file next to `path` first, so a failure never leaves a
/// half-written deck behind.
pub fn write_deck(path: &Path, deck: &InputDeck) -> Result<()> {
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).with_context(|| format!("create temp file in {:?}", dir))?;
    tmp.write_all(deck.render().as_bytes())?;
    tmp.flush()?;
    // temp files are owner-only; keep the mode of the deck being replaced
    let perms = match std::fs::metadata(path) {
        Ok(m) => m.permissions(),
        Err(_) => std::fs::Permissions::from_mode(0o644),
    };
    tmp.as_file().set_permissions(perms)?;
    tmp.persist(path).map_err(|e| e.error).with_context(|| format!("write {:?}", path))?;
    info!("wrote {} lines into {:?}", deck.lines().len(), path);

    Ok(())
}
// write:1 ends here

// [[file:../jdftx-tools.note::*restart][restart:1]]
/// Append the restart directive for `job` into the deck at `path`, unless
/// an `initial-state` directive is already there. Return true if appended.
pub fn append_restart_directive(path: &Path, job: &str) -> Result<bool> {
    // deck may contain invalid UTF-8 characters from hand editing, so we
    // handle it using byte string
    use bstr::ByteSlice;
    use fs2::FileExt;
    use std::io::{Read, Seek, SeekFrom, Write};

    let mut file = std::fs::OpenOptions::new()
        .read(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {:?}", path))?;
    file.lock_exclusive()
        .with_context(|| format!("Could not lock {:?}", path))?;

    let mut bytes = vec![];
    file.seek(SeekFrom::Start(0))?;
    file.read_to_end(&mut bytes)?;
    let found = bytes
        .lines()
        .any(|line| line.trim_start().starts_with_str("initial-state"));
    if found {
        info!("restart directive already in {:?}", path);
    } else {
        let mut txt = String::new();
        if !bytes.is_empty() && !bytes.ends_with(b"\n") {
            txt.push('\n');
        }
        txt.push_str(&restart_directive(job));
        txt.push('\n');
        file.write_all(txt.as_bytes())?;
        file.flush()?;
        info!("appended restart directive into {:?}", path);
    }
    file.unlock()?;

    Ok(!found)
}
// restart:1 ends here

// [[file:../jdftx-tools.note::*test][test:1]]
#[test]
fn test_append_restart_directive() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let f = dir.path().join("run2.in");
    gut::fs::write_to_file(&f, "include start.lattice\ninclude start.ionpos\nionic-minimize nIterations 10")?;

    assert!(append_restart_directive(&f, "run2")?);
    assert!(!append_restart_directive(&f, "run2")?);
    assert!(!append_restart_directive(&f, "run2")?);

    let s = gut::fs::read_file(&f)?;
    assert_eq!(s.matches("initial-state").count(), 1);
    assert!(s.ends_with("ionic-minimize nIterations 10\ninitial-state run2.$VAR\n"));

    Ok(())
}

#[test]
fn test_write_deck() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let f = dir.path().join("run1.in");
    gut::fs::write_to_file(&f, "stale content\nmore stale content\n")?;

    let mut deck = InputDeck::new();
    deck.push("include start.lattice");
    deck.push("include start.ionpos");
    write_deck(&f, &deck)?;
    assert_eq!(gut::fs::read_file(&f)?, "include start.lattice\ninclude start.ionpos\n");

    Ok(())
}

#[test]
fn test_write_deck_permissions() -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir()?;
    let mut deck = InputDeck::new();
    deck.push("ionic-minimize nIterations 0");

    let f = dir.path().join("new.in");
    write_deck(&f, &deck)?;
    assert_eq!(std::fs::metadata(&f)?.permissions().mode() & 0o777, 0o644);

    let f = dir.path().join("shared.in");
    gut::fs::write_to_file(&f, "stale\n")?;
    std::fs::set_permissions(&f, std::fs::Permissions::from_mode(0o664))?;
    write_deck(&f, &deck)?;
    assert_eq!(std::fs::metadata(&f)?.permissions().mode() & 0o777, 0o664);

    Ok(())
}
// test:1 ends here
