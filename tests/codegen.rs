#![cfg(feature = "llvm")]

use cminus::{
    ast::{
        BinaryOperator, BinaryOperatorKind, CompoundStatement, Declaration, Expr, FunctionDeclaration,
        IntegerLiteral, LiteralType, NodeId, Position, Program, Statement,
    },
    codegen::CodeGenerator,
    diagnostics::{DiagnosticKind, Diagnostics, TextLocation},
    pipeline,
};
use inkwell::context::Context;

/// Front end plus code generation; returns every diagnostic collected.
fn generate(lines: &[&str]) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    let ast = pipeline::front_end(lines, &mut diagnostics).expect("front end");
    let context = Context::create();
    let mut generator = CodeGenerator::new(&context, "test", &mut diagnostics).unwrap();
    generator.generate(&ast.program).unwrap();
    drop(generator);
    diagnostics
}

fn semantic_errors(diagnostics: &Diagnostics) -> Vec<String> {
    diagnostics
        .of_kind(DiagnosticKind::SemanticError)
        .map(|d| d.message.clone())
        .collect()
}

#[test]
fn terminating_branches_add_no_merge_block() {
    let mut diagnostics = Diagnostics::new();
    let ir = pipeline::compile_to_ir(
        &[
            "int pick(int c) { if (c) { return 1; } else { return 0; } }",
            "void main(void) { output(pick(input())); }",
        ],
        &mut diagnostics,
    )
    .unwrap();
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert!(!ir.contains("merge"), "{ir}");
}

/// Operand of `store i32 <value>, ptr <slot>` lines in `function`, in order.
fn store_targets(ir: &str, function: &str, value: i32) -> Vec<String> {
    let body = &ir[ir.find(&format!("@{function}(")).unwrap()..];
    let body = &body[..body.find("\n}").unwrap()];
    let prefix = format!("store i32 {value}, ptr ");
    body.lines()
        .filter_map(|line| line.trim_start().strip_prefix(prefix.as_str()))
        .map(|rest| rest.split(',').next().unwrap_or(rest).trim().to_string())
        .collect()
}

#[test]
fn inner_scopes_shadow_and_stay_isolated() {
    let mut diagnostics = Diagnostics::new();
    let ir = pipeline::compile_to_ir(
        &[
            "int x;",
            "void main(void) { int x; { int x; x = 1; } { x = 2; } x = 3; }",
        ],
        &mut diagnostics,
    )
    .unwrap();
    assert!(diagnostics.is_empty(), "{diagnostics:?}");

    let main = &ir[ir.find("define i32 @main").unwrap()..];
    let slots: Vec<&str> = main
        .lines()
        .filter(|line| line.contains("= alloca i32"))
        .filter_map(|line| line.trim_start().split(' ').next())
        .collect();
    assert_eq!(slots.len(), 2, "{main}");
    let (outer, inner) = (slots[0], slots[1]);
    assert_ne!(outer, inner);

    assert_eq!(store_targets(&ir, "main", 1), [inner]);
    assert_eq!(store_targets(&ir, "main", 2), [outer]);
    assert_eq!(store_targets(&ir, "main", 3), [outer]);
    assert!(!main.contains("ptr @x"), "{main}");

    let siblings = generate(&["void main(void) { { int y; y = 1; } { y = 2; } }"]);
    let errors = semantic_errors(&siblings);
    assert_eq!(errors, ["undefined variable `y`"]);
    assert_eq!(
        siblings.iter().next().unwrap().location,
        TextLocation::new(1, 39)
    );
}

#[test]
fn redefinition_in_one_scope_is_reported_once() {
    let diagnostics = generate(&["int x;", "int x;", "void main(void) { x = 1; }"]);
    let errors = semantic_errors(&diagnostics);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].contains("`x`"));
    assert_eq!(diagnostics.iter().next().unwrap().location, TextLocation::new(2, 5));

    let nested = generate(&["int x;", "void main(void) { int x; { int x; } }"]);
    assert!(nested.is_empty(), "{nested:?}");
}

#[test]
fn parameters_share_the_body_scope() {
    let diagnostics = generate(&["void f(int a, int a) { }", "void g(int b) { int b; }", "void main(void) { }"]);
    let errors = semantic_errors(&diagnostics);
    assert_eq!(errors.len(), 2, "{errors:?}");
    assert!(errors[0].contains("parameter `a`"));
    assert!(errors[1].contains("variable `b`"));
}

#[test]
fn calls_are_checked_per_argument() {
    let diagnostics = generate(&[
        "int sum(int a[], int n) { return a[0] + n; }",
        "void main(void) { int v[2]; int s; s = sum(v); s = sum(s, 2); s = sum(v, v); }",
    ]);
    let errors = semantic_errors(&diagnostics);
    assert_eq!(errors.len(), 3, "{errors:?}");
    assert!(errors[0].contains("`sum` expects 2 argument(s) but 1 were given"));
    assert!(errors[1].contains("argument 1 of `sum`"));
    assert!(errors[2].contains("argument 2 of `sum`"));
}

#[test]
fn main_must_be_the_last_function() {
    let diagnostics = generate(&["void main(void) { }", "void helper(void) { }"]);
    assert_eq!(diagnostics.len(), 1);
    let diagnostic = diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.kind, DiagnosticKind::SemanticError);
    assert_eq!(diagnostic.location, TextLocation::NoPosition);
    assert!(diagnostic.message.contains("main"));

    let globals_only = generate(&["int x;"]);
    assert_eq!(globals_only.len(), 1);
    assert_eq!(globals_only.iter().next().unwrap().location, TextLocation::NoPosition);
}

#[test]
fn invalid_declarations() {
    let diagnostics = generate(&[
        "void f(void) { void v; }",
        "void main(void) { }",
    ]);
    let errors = semantic_errors(&diagnostics);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].contains("`v` cannot have type `void`"), "{}", errors[0]);
}

fn at() -> Position {
    Position { line: 1, col: 1 }
}

fn integer(id: u32, value: i32) -> Box<Expr> {
    Box::new(Expr::Integer(IntegerLiteral {
        id: NodeId(id),
        position: at(),
        value,
    }))
}

/// `void main(void) { <expr>; }` built without the front end.
fn program_with(expr: Expr) -> Program {
    Program {
        id: NodeId(10),
        declarations: vec![Declaration::Function(FunctionDeclaration {
            id: NodeId(9),
            position: at(),
            name: "main".into(),
            function_type: vec![LiteralType::Void],
            parameters: Vec::new(),
            body: CompoundStatement {
                id: NodeId(8),
                position: at(),
                declarations: Vec::new(),
                statements: vec![Statement::Expression(expr)],
            },
        })],
    }
}

fn generate_program(program: &Program) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    let context = Context::create();
    let mut generator = CodeGenerator::new(&context, "handmade", &mut diagnostics).unwrap();
    generator.generate(program).unwrap();
    drop(generator);
    diagnostics
}

#[test]
fn missing_right_operand_is_a_codegen_error() {
    let program = program_with(Expr::Binary(BinaryOperator {
        id: NodeId(2),
        position: at(),
        kind: BinaryOperatorKind::Addition,
        left: integer(1, 1),
        right: None,
    }));
    let diagnostics = generate_program(&program);
    assert_eq!(diagnostics.len(), 1);
    let diagnostic = diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.kind, DiagnosticKind::CodeGenError);
    assert!(diagnostic.message.contains("right operand"));
}

#[test]
fn assigning_to_a_value_is_rejected() {
    let program = program_with(Expr::Binary(BinaryOperator {
        id: NodeId(3),
        position: at(),
        kind: BinaryOperatorKind::Assignment,
        left: integer(1, 1),
        right: Some(integer(2, 2)),
    }));
    let diagnostics = generate_program(&program);
    assert_eq!(semantic_errors(&diagnostics), ["`1` cannot be assigned to"]);
}
