use cminus::{
    ast,
    diagnostics::{DiagnosticKind, Diagnostics, TextLocation},
    lexer::{self, SyntaxKind, Token},
    parser, pipeline,
};
use proptest::prelude::*;

const PUNCTUATION: [&str; 19] = [
    "+", "-", "*", "/", "<", "<=", ">", ">=", "==", "!=", "=", ";", ",", "(", ")", "[", "]", "{", "}",
];

fn lexeme() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z]{1,8}",
        (0i32..100_000).prop_map(|n| n.to_string()),
        prop::sample::select(PUNCTUATION.to_vec()).prop_map(str::to_owned),
    ]
}

fn separator() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![" ", "  ", "\t", "\n"])
}

/// Join lexemes with the chosen separators, `\n` starting a new source line.
fn layout(lexemes: &[String], separators: &[&str]) -> Vec<String> {
    let mut source = String::new();
    for (idx, lexeme) in lexemes.iter().enumerate() {
        if idx > 0 {
            source.push_str(separators[idx % separators.len()]);
        }
        source.push_str(lexeme);
    }
    source.split('\n').map(str::to_owned).collect()
}

fn lex(lines: &[String]) -> (Vec<Token>, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let tokens = lexer::tokenize(lines, &mut diagnostics);
    (tokens, diagnostics)
}

fn shape(tokens: &[Token]) -> Vec<(SyntaxKind, String)> {
    tokens.iter().map(|t| (t.kind, t.text.clone())).collect()
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, ..ProptestConfig::default() })]

    #[test]
    fn tokens_reconstruct_the_lexemes(
        lexemes in prop::collection::vec(lexeme(), 1..40),
        separators in prop::collection::vec(separator(), 1..6),
    ) {
        let (tokens, diagnostics) = lex(&layout(&lexemes, &separators));
        prop_assert!(diagnostics.is_empty(), "{:?}", diagnostics);

        let (last, body) = tokens.split_last().unwrap();
        prop_assert!(last.is_end_of_file());
        prop_assert!(body.iter().all(|t| !t.is_end_of_file()));
        let texts: Vec<&str> = body.iter().map(|t| t.text.as_str()).collect();
        prop_assert_eq!(texts, lexemes.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn comments_are_transparent(
        lexemes in prop::collection::vec(lexeme(), 2..20),
        at in any::<prop::sample::Index>(),
        comment in "[a-z ]{0,12}",
    ) {
        let plain = layout(&lexemes, &[" "]);
        let split = 1 + at.index(lexemes.len() - 1);
        let mut commented = lexemes.clone();
        commented.insert(split, format!("/*{comment}*/"));
        let commented = layout(&commented, &[" "]);

        let (plain_tokens, plain_diags) = lex(&plain);
        let (commented_tokens, commented_diags) = lex(&commented);
        prop_assert!(plain_diags.is_empty() && commented_diags.is_empty());
        prop_assert_eq!(shape(&plain_tokens), shape(&commented_tokens));
    }

    #[test]
    fn front_end_is_deterministic(lines in prop::collection::vec("[ -~]{0,30}", 0..6)) {
        let run = || {
            let mut diagnostics = Diagnostics::new();
            let tokens = lexer::tokenize(&lines, &mut diagnostics);
            let tree = parser::parse(tokens, &mut diagnostics);
            let ast = ast::build(&tree);
            (tree, ast, diagnostics)
        };
        prop_assert_eq!(run(), run());
    }
}

#[test]
fn program_with_every_construct_parses_cleanly() {
    let source = [
        "/* selection sort */",
        "int x[10];",
        "int minloc(int a[], int low, int high)",
        "{ int i; int x; int k;",
        "  k = low; x = a[low]; i = low + 1;",
        "  while (i < high) { if (a[i] < x) { x = a[i]; k = i; } i = i + 1; }",
        "  return k;",
        "}",
        "void sort(int a[], int low, int high)",
        "{ int i; int k;",
        "  i = low;",
        "  while (i < high - 1) {",
        "    int t;",
        "    k = minloc(a, i, high);",
        "    t = a[k]; a[k] = a[i]; a[i] = t;",
        "    i = i + 1;",
        "  }",
        "}",
        "void main(void)",
        "{ int i;",
        "  i = 0; while (i < 10) { x[i] = input(); i = i + 1; }",
        "  sort(x, 0, 10);",
        "  i = 0; while (i < 10) { output(x[i]); i = i + 1; }",
        "}",
    ];
    let mut diagnostics = Diagnostics::new();
    let ast = pipeline::front_end(&source, &mut diagnostics).unwrap();
    assert!(diagnostics.is_empty(), "{diagnostics:?}");

    let names: Vec<&str> = ast.program.declarations.iter().map(|d| d.name()).collect();
    assert_eq!(names, ["x", "minloc", "sort", "main"]);
    let dump = ast.render();
    assert!(dump.contains("FunctionDeclaration int minloc(int[] a, int low, int high) [3:5]"), "{dump}");
    assert!(dump.contains("VariableDeclaration t: int [13:9]"), "{dump}");
}

#[test]
fn diagnostics_carry_positions_and_overlay() {
    let source = ["int x;", "void main(void) { x = 1 $ 2; }"];
    let mut diagnostics = Diagnostics::new();
    let _ = lexer::tokenize(&source, &mut diagnostics);

    let lexer_errors: Vec<_> = diagnostics.of_kind(DiagnosticKind::LexerError).collect();
    assert_eq!(lexer_errors.len(), 1);
    assert_eq!(lexer_errors[0].location, TextLocation::new(2, 25));

    let lines: Vec<String> = source.iter().map(|l| l.to_string()).collect();
    let overlay = diagnostics.render(&lines);
    assert!(overlay.contains("  2 | void main(void) { x = 1 $ 2; }\n"), "{overlay}");
    assert!(overlay.contains(&format!("    | {}^\n", " ".repeat(24))), "{overlay}");
}

#[test]
fn long_statement_lists_do_not_exhaust_the_stack() {
    let mut source = vec!["void main(void) { int x;".to_string()];
    source.extend((0..100_000).map(|n| format!("x = {n};")));
    source.push("}".to_string());

    let mut diagnostics = Diagnostics::new();
    let ast = pipeline::front_end(&source, &mut diagnostics).unwrap();
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.iter().next());

    let ast::Declaration::Function(main) = &ast.program.declarations[0] else {
        panic!("expected main");
    };
    assert_eq!(main.body.statements.len(), 100_000);
    assert_eq!(main.body.declarations.len(), 1);
}
