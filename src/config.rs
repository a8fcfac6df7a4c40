use std::{env, fmt, path::PathBuf};

pub const LINKER_ENV: &str = "CMINUS_LINKER";
pub const TARGET_ENV: &str = "CMINUS_TARGET";
pub const LOG_ENV: &str = "CMINUS_LOG";

const DEFAULT_LOG_FILTER: &str = "warn";
/// Searched on `PATH` in this order when no linker is configured.
const LINKER_CANDIDATES: [&str; 5] = ["cc", "gcc", "clang", "ld.lld", "ld"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    CommandLine,
    Environment,
    PathSearch,
    Default,
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionSource::CommandLine => write!(f, "command line"),
            ResolutionSource::Environment => write!(f, "environment"),
            ResolutionSource::PathSearch => write!(f, "PATH search"),
            ResolutionSource::Default => write!(f, "default"),
        }
    }
}

/// Settings the driver needs besides the source file.
///
/// Each setting is resolved in this order:
///  1. Command-line flag (`--linker`, `--target`)
///  2. Environment (`CMINUS_LINKER`, `CMINUS_TARGET`, `CMINUS_LOG`)
///  3. For the linker only: the first of `cc`, `gcc`, `clang`, `ld.lld`, `ld` on `PATH`
///  4. Default: no linker, the host triple, log filter `warn`
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    linker: Option<PathBuf>,
    linker_source: ResolutionSource,
    target: Option<String>,
    target_source: ResolutionSource,
    log_filter: String,
    log_source: ResolutionSource,
}

impl CompilerConfig {
    pub fn detect() -> Self {
        Self::with_overrides(None, None)
    }

    pub fn with_overrides(linker: Option<PathBuf>, target: Option<String>) -> Self {
        let (linker, linker_source) = match linker {
            Some(path) => (Some(path), ResolutionSource::CommandLine),
            None => match env_value(LINKER_ENV) {
                Some(raw) => (Some(PathBuf::from(raw)), ResolutionSource::Environment),
                None => match search_linker() {
                    Some(path) => (Some(path), ResolutionSource::PathSearch),
                    None => (None, ResolutionSource::Default),
                },
            },
        };

        let target = target.map(|t| t.trim().to_owned()).filter(|t| !t.is_empty());
        let (target, target_source) = match target {
            Some(triple) => (Some(triple), ResolutionSource::CommandLine),
            None => match env_value(TARGET_ENV) {
                Some(triple) => (Some(triple), ResolutionSource::Environment),
                None => (None, ResolutionSource::Default),
            },
        };

        let (log_filter, log_source) = match env_value(LOG_ENV) {
            Some(filter) => (filter, ResolutionSource::Environment),
            None => (DEFAULT_LOG_FILTER.to_owned(), ResolutionSource::Default),
        };

        Self {
            linker,
            linker_source,
            target,
            target_source,
            log_filter,
            log_source,
        }
    }

    /// `None` when nothing was configured and nothing was found on `PATH`.
    pub fn linker(&self) -> Option<&PathBuf> {
        self.linker.as_ref()
    }

    pub fn linker_source(&self) -> ResolutionSource {
        self.linker_source
    }

    /// Explicit target triple; `None` means the host.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn target_source(&self) -> ResolutionSource {
        self.target_source
    }

    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    pub fn log_source(&self) -> ResolutionSource {
        self.log_source
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_owned())
        }
    })
}

fn search_linker() -> Option<PathBuf> {
    LINKER_CANDIDATES
        .iter()
        .find_map(|name| which::which(name).ok())
}
