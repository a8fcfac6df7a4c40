use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context;
use clap::Parser;
use cminus::{
    config::CompilerConfig,
    diagnostics::Diagnostics,
    error::CompileError,
    pipeline::{self, Emit},
};
use inkwell::context::Context as LlvmContext;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Compile a C-minus program to LLVM IR, an object file or an executable.
#[derive(Debug, Parser)]
#[command(name = "cminus", version)]
struct Cli {
    /// Source file
    input: PathBuf,

    /// Output path; defaults to the input path with an extension fitting `--emit`
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Emit::Exe)]
    emit: Emit,

    /// Print every token before parsing
    #[arg(long)]
    dump_tokens: bool,

    /// Print the concrete syntax tree
    #[arg(long)]
    dump_tree: bool,

    /// Print the abstract syntax tree
    #[arg(long)]
    dump_ast: bool,

    /// Linker program (overrides CMINUS_LINKER)
    #[arg(long)]
    linker: Option<PathBuf>,

    /// Target triple (overrides CMINUS_TARGET)
    #[arg(long)]
    target: Option<String>,

    /// Log as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = CompilerConfig::with_overrides(cli.linker.clone(), cli.target.clone());
    init_tracing(&config, cli.log_json);
    info!(
        linker = ?config.linker(),
        linker_resolution = %config.linker_source(),
        target = config.target().unwrap_or("host"),
        target_resolution = %config.target_source(),
        log_resolution = %config.log_source(),
        "configured"
    );

    let mut diagnostics = Diagnostics::new();
    let (lines, result) = match read_lines(&cli.input) {
        Ok(lines) => {
            let result = run(&cli, &config, &lines, &mut diagnostics);
            (lines, result)
        }
        Err(err) => (Vec::new(), Err(err)),
    };

    if !diagnostics.is_empty() {
        eprint!("{}", diagnostics.render(&lines));
    }

    match result {
        Ok(output) => {
            println!("Built {}", output.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            let code = err
                .downcast_ref::<CompileError>()
                .map_or(1, CompileError::exit_code);
            let category = err
                .downcast_ref::<CompileError>()
                .map_or("internal", CompileError::category);
            error!(category, error = ?err, "compilation failed");
            eprintln!("error: {err:#}");
            ExitCode::from(code as u8)
        }
    }
}

fn init_tracing(config: &CompilerConfig, json: bool) {
    let filter = EnvFilter::try_new(config.log_filter()).unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr);
    if json {
        subscriber.json().with_current_span(false).init();
    } else {
        subscriber.init();
    }
}

fn read_lines(path: &Path) -> anyhow::Result<Vec<String>> {
    let source = fs::read_to_string(path).map_err(|source| CompileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(source.lines().map(str::to_owned).collect())
}

fn run(cli: &Cli, config: &CompilerConfig, lines: &[String], diagnostics: &mut Diagnostics) -> anyhow::Result<PathBuf> {
    let tokens = pipeline::lex(lines, diagnostics)?;
    if cli.dump_tokens {
        for token in &tokens {
            println!("{:?} {} {}", token.kind, token, token.location());
        }
    }

    let tree = pipeline::parse(tokens, diagnostics)?;
    if cli.dump_tree {
        print!("{}", tree.render());
    }

    let ast = pipeline::lower(&tree);
    if cli.dump_ast {
        print!("{}", ast.render());
    }

    let output = cli.output.clone().unwrap_or_else(|| default_output(&cli.input, cli.emit));
    let module_name = cli
        .input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "main".into());

    let context = LlvmContext::create();
    let generator = pipeline::generate(&context, &module_name, &ast, diagnostics)?;
    pipeline::emit(&generator, cli.emit, &output, config)?;

    #[cfg(unix)]
    if cli.emit == Emit::Exe {
        use std::os::unix::fs::PermissionsExt;
        let mut perm = fs::metadata(&output)
            .with_context(|| format!("reading metadata of {}", output.display()))?
            .permissions();
        perm.set_mode(0o755);
        fs::set_permissions(&output, perm)
            .with_context(|| format!("making {} executable", output.display()))?;
    }

    Ok(output)
}

/// Input path with the extension for `emit`, never the input itself.
fn default_output(input: &Path, emit: Emit) -> PathBuf {
    let output = input.with_extension(emit.extension());
    if output == input {
        input.with_extension("out")
    } else {
        output
    }
}
