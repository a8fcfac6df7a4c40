#![cfg(feature = "llvm")]

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
};

use cminus::config::CompilerConfig;

const COMPILER: &str = env!("CARGO_BIN_EXE_cminus");

const GCD: &str = "
int gcd(int u, int v)
{
    if (v == 0) return u;
    else return gcd(v, u - u/v*v);
}

void main(void)
{
    int x; int y;
    x = input(); y = input();
    output(gcd(x, y));
}
";

const SORT: &str = "
/* selection sort of ten numbers */
int x[10];

int minloc(int a[], int low, int high)
{   int i; int x; int k;
    k = low;
    x = a[low];
    i = low + 1;
    while (i < high) {
        if (a[i] < x) { x = a[i]; k = i; }
        i = i + 1;
    }
    return k;
}

void sort(int a[], int low, int high)
{   int i; int k;
    i = low;
    while (i < high - 1) {
        int t;
        k = minloc(a, i, high);
        t = a[k];
        a[k] = a[i];
        a[i] = t;
        i = i + 1;
    }
}

void main(void)
{   int i;
    i = 0;
    while (i < 10) { x[i] = input(); i = i + 1; }
    sort(x, 0, 10);
    i = 0;
    while (i < 10) { output(x[i]); i = i + 1; }
}
";

fn compile(dir: &Path, source: &str, extra: &[&str]) -> (PathBuf, Output) {
    let input = dir.join("prog.cm");
    fs::write(&input, source).unwrap();
    let exe = dir.join("prog");
    let output = Command::new(COMPILER)
        .arg(&input)
        .arg("-o")
        .arg(&exe)
        .args(extra)
        .output()
        .unwrap();
    (exe, output)
}

fn run(exe: &Path, stdin: &str) -> String {
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(stdin.as_bytes()).unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success(), "{output:?}");
    String::from_utf8(output.stdout).unwrap()
}

fn linker_available() -> bool {
    if CompilerConfig::detect().linker().is_none() {
        eprintln!("skipping: no linker found");
        return false;
    }
    true
}

#[test]
fn gcd_of_twelve_and_eighteen() {
    if !linker_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let (exe, output) = compile(dir.path(), GCD, &[]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(run(&exe, "12\n18\n"), "6\n");
}

#[test]
fn selection_sort() {
    if !linker_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let (exe, output) = compile(dir.path(), SORT, &[]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(run(&exe, "5 3 8 1 9 2 7 4 6 0\n"), "0\n1\n2\n3\n4\n5\n6\n7\n8\n9\n");
}

#[test]
fn textual_ir_needs_no_linker() {
    let dir = tempfile::tempdir().unwrap();
    let (ir, output) = compile(dir.path(), GCD, &["--emit", "ir"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let ir = fs::read_to_string(ir).unwrap();
    assert!(ir.contains("define i32 @gcd(i32"), "{ir}");
    assert!(ir.contains("define i32 @main()"), "{ir}");
}

#[test]
fn missing_main_fails_with_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let (exe, output) = compile(dir.path(), "void main(void) { }\nint helper(void) { return 1; }\n", &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(!exe.exists());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let reported: Vec<&str> = stderr.lines().filter(|l| l.starts_with("SemanticError")).collect();
    assert_eq!(reported.len(), 1, "{stderr}");
    assert!(reported[0].contains("main") && reported[0].ends_with("at [-]"), "{stderr}");
}

#[test]
fn duplicate_global_is_reported_with_overlay() {
    let dir = tempfile::tempdir().unwrap();
    let (_, output) = compile(dir.path(), "int x;\nint x;\nvoid main(void) { }\n", &[]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("SemanticError: redefinition of variable `x` at [2:5]"), "{stderr}");
    assert!(stderr.contains("  2 | int x;\n    |     ^\n"), "{stderr}");
}
