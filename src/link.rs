use std::{
    ffi::OsString,
    path::Path,
    process::Command,
};

use anyhow::{bail, Context, Result};
use tracing::info;

/// How a linker expects to be driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    /// A C compiler driver (`cc`, `gcc`, `clang`) that adds crt files and libc itself.
    Driver,
    /// A bare ELF linker.
    Ld,
    /// MSVC-compatible `link.exe`.
    Msvc,
}

fn flavor(linker: &Path) -> Flavor {
    let stem = linker
        .file_stem()
        .map(|s| s.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match stem.as_str() {
        "ld" | "ld.lld" | "ld.gold" | "ld.bfd" => Flavor::Ld,
        "link" | "lld-link" => Flavor::Msvc,
        _ => Flavor::Driver,
    }
}

fn link_args(linker: &Path, obj: &Path, out_exe: &Path) -> Vec<OsString> {
    match flavor(linker) {
        Flavor::Driver => vec![obj.into(), "-o".into(), out_exe.into()],
        Flavor::Ld => vec![obj.into(), "-o".into(), out_exe.into(), "-lc".into()],
        Flavor::Msvc => {
            let mut out = OsString::from("/OUT:");
            out.push(out_exe);
            vec![
                obj.into(),
                out,
                "msvcrt.lib".into(),
                "legacy_stdio_definitions.lib".into(),
            ]
        }
    }
}

/// Link `obj` against the C library into `out_exe`, waiting for the linker to finish.
pub fn link_exe(linker: &Path, obj: &Path, out_exe: &Path) -> Result<()> {
    let args = link_args(linker, obj, out_exe);
    info!(
        linker = %linker.display(),
        object = %obj.display(),
        path = %out_exe.display(),
        "linking executable"
    );

    let status = Command::new(linker)
        .args(&args)
        .status()
        .with_context(|| format!("running {}", linker.display()))?;
    if !status.success() {
        bail!("{} failed ({status})", linker.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_follow_the_linker_flavor() {
        let obj = Path::new("/tmp/prog.o");
        let exe = Path::new("/tmp/prog");

        let driver = link_args(Path::new("/usr/bin/cc"), obj, exe);
        assert_eq!(driver, vec![OsString::from("/tmp/prog.o"), "-o".into(), "/tmp/prog".into()]);

        let ld = link_args(Path::new("ld.lld"), obj, exe);
        assert_eq!(ld.last(), Some(&OsString::from("-lc")));

        let msvc = link_args(Path::new("C:/tools/link.exe"), obj, exe);
        assert_eq!(msvc[1], OsString::from("/OUT:/tmp/prog"));
    }

    #[test]
    fn missing_linker_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = link_exe(
            &dir.path().join("no-such-linker"),
            &dir.path().join("a.o"),
            &dir.path().join("a"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("no-such-linker"), "{err:#}");
    }
}
