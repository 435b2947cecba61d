use linkscope_common::diagnostics::diagnostic_codes;
use linkscope_common::{AnalysisOptions, Position, Range};
use linkscope_lsp::{DiagnosticSeverity, DocumentAnalysis, LspDiagnostic};
use linkscope_syntax::fixtures::{Fixture, leaf, node};
use linkscope_syntax::RawNode;

const URI: &str = "file:///test.links";

fn analyse(fx: &Fixture, statements: Vec<RawNode>, options: &AnalysisOptions) -> DocumentAnalysis {
    DocumentAnalysis::from_tree(URI, &fx.source, fx.tree(statements), options)
}

fn codes(diagnostics: &[LspDiagnostic]) -> Vec<u32> {
    diagnostics.iter().filter_map(|d| d.code).collect()
}

#[test]
fn test_forward_reference_and_unknown_function_are_undefined() {
    let fx = Fixture::new("var x = y;\nvar y = 1;\nfoo(x)\nprint(x)\n");
    let statements = vec![
        node(
            "Val",
            fx.span_between("var x", 0, ";", 0),
            vec![leaf("Binder: x", fx.word_span("x", 0)), leaf("Variable: y", fx.word_span("y", 0))],
        ),
        node(
            "Val",
            fx.span_between("var y", 0, ";", 1),
            vec![leaf("Binder: y", fx.word_span("y", 1)), leaf("Constant: 1", fx.word_span("1", 0))],
        ),
        node(
            "FunCall",
            fx.word_span("foo(x)", 0),
            vec![leaf("Variable: foo", fx.word_span("foo", 0)), leaf("Variable: x", fx.word_span("x", 1))],
        ),
        node(
            "FunCall",
            fx.word_span("print(x)", 0),
            vec![leaf("Variable: print", fx.word_span("print", 0)), leaf("Variable: x", fx.word_span("x", 2))],
        ),
    ];
    let analysis = analyse(&fx, statements, &AnalysisOptions::default());

    assert_eq!(
        codes(&analysis.diagnostics),
        vec![diagnostic_codes::UNDEFINED_VARIABLE, diagnostic_codes::UNDEFINED_FUNCTION]
    );
    let y = &analysis.diagnostics[0];
    assert_eq!(y.range, Range::on_line(0, 8, 1));
    assert_eq!(y.severity, Some(DiagnosticSeverity::Error));
    assert_eq!(y.message, "Variable 'y' is not defined.");

    let foo = &analysis.diagnostics[1];
    assert_eq!(foo.range, Range::on_line(2, 0, 3));
    let related = foo.related_information.as_ref().unwrap();
    assert_eq!(related.len(), 1);
    assert_eq!(related[0].location.uri, URI);
    assert_eq!(related[0].location.range, foo.range);
}

#[test]
fn test_every_duplicate_is_reported_and_resolved() {
    let fx = Fixture::new("var n = 1;\nvar n = 2;\nn\n");
    let statements = vec![
        node(
            "Val",
            fx.span_between("var n", 0, ";", 0),
            vec![leaf("Binder: n", fx.word_span("n", 0)), leaf("Constant: 1", fx.word_span("1", 0))],
        ),
        node(
            "Val",
            fx.span_between("var n", 1, ";", 1),
            vec![leaf("Binder: n", fx.word_span("n", 1)), leaf("Constant: 2", fx.word_span("2", 0))],
        ),
        leaf("Variable: n", fx.word_span("n", 2)),
    ];
    let analysis = analyse(&fx, statements, &AnalysisOptions::default());

    assert_eq!(
        codes(&analysis.diagnostics),
        vec![diagnostic_codes::DUPLICATE_DECLARATION, diagnostic_codes::DUPLICATE_DECLARATION]
    );
    assert_eq!(analysis.diagnostics[0].range, Range::on_line(0, 4, 1));
    assert_eq!(analysis.diagnostics[1].range, Range::on_line(1, 4, 1));
    assert!(
        analysis
            .diagnostics
            .iter()
            .all(|d| d.severity == Some(DiagnosticSeverity::Warning))
    );
}

fn two_parameter_function(fx: &Fixture) -> RawNode {
    node(
        "Fun: add",
        fx.span_between("fun", 0, "}", 0),
        vec![
            node(
                "Params",
                fx.word_span("(p, q)", 0),
                vec![leaf("Binder: p", fx.word_span("p", 0)), leaf("Binder: q", fx.word_span("q", 0))],
            ),
            leaf("Variable: p", fx.word_span("p", 1)),
        ],
    )
}

#[test]
fn test_argument_count_mismatch_is_reported_once() {
    let fx = Fixture::new("fun add(p, q) {\n  p\n}\nadd(1, 2, 3)\n");
    let statements = vec![
        two_parameter_function(&fx),
        node(
            "FunCall",
            fx.word_span("add(1, 2, 3)", 0),
            vec![
                leaf("Variable: add", fx.word_span("add", 1)),
                leaf("Constant: 1", fx.word_span("1", 0)),
                leaf("Constant: 2", fx.word_span("2", 0)),
                leaf("Constant: 3", fx.word_span("3", 0)),
            ],
        ),
    ];
    let analysis = analyse(&fx, statements, &AnalysisOptions::default());

    assert_eq!(analysis.diagnostics.len(), 1);
    let diagnostic = &analysis.diagnostics[0];
    assert_eq!(diagnostic.code, Some(diagnostic_codes::ARGUMENT_COUNT_MISMATCH));
    assert_eq!(
        diagnostic.message,
        "Function 'add' expects 2 argument(s) but was called with 3."
    );
    assert_eq!(diagnostic.range, Range::on_line(3, 0, 3));
}

#[test]
fn test_placement_handler_call_is_not_counted() {
    let fx = Fixture::new("fun add(p, q) {\n  p\n}\nvar f = 1;\nf => add(1)\n");
    let statements = vec![
        two_parameter_function(&fx),
        node(
            "Val",
            fx.span_between("var f", 0, ";", 0),
            vec![leaf("Binder: f", fx.word_span("f", 1)), leaf("Constant: 1", fx.word_span("1", 0))],
        ),
        node(
            "FormletPlacement",
            fx.span_between("f =>", 0, ")", 1),
            vec![
                leaf("Variable: f", fx.word_span("f", 2)),
                node(
                    "FunCall",
                    fx.word_span("add(1)", 0),
                    vec![
                        leaf("Variable: add", fx.word_span("add", 1)),
                        leaf("Constant: 1", fx.word_span("1", 1)),
                    ],
                ),
            ],
        ),
    ];
    let analysis = analyse(&fx, statements, &AnalysisOptions::default());
    assert!(analysis.diagnostics.is_empty(), "{:?}", analysis.diagnostics);
}

#[test]
fn test_builtins_and_extra_builtins_are_defined() {
    let fx = Fixture::new("mystery(1)\n");
    let statements = || {
        vec![node(
            "FunCall",
            fx.word_span("mystery(1)", 0),
            vec![
                leaf("Variable: mystery", fx.word_span("mystery", 0)),
                leaf("Constant: 1", fx.word_span("1", 0)),
            ],
        )]
    };

    let analysis = analyse(&fx, statements(), &AnalysisOptions::default());
    assert_eq!(codes(&analysis.diagnostics), vec![diagnostic_codes::UNDEFINED_FUNCTION]);

    let options = AnalysisOptions {
        extra_builtins: vec!["mystery".to_string()],
        ..AnalysisOptions::default()
    };
    let analysis = analyse(&fx, statements(), &options);
    assert!(analysis.diagnostics.is_empty());
}

#[test]
fn test_diagnostics_serialize_in_camel_case() {
    let fx = Fixture::new("ghost\n");
    let analysis = analyse(
        &fx,
        vec![leaf("Variable: ghost", fx.word_span("ghost", 0))],
        &AnalysisOptions::default(),
    );
    let json = serde_json::to_value(&analysis.diagnostics[0]).unwrap();
    assert_eq!(json["severity"], 1);
    assert_eq!(json["code"], 1001);
    assert_eq!(json["source"], "linkscope");
    assert_eq!(json["range"]["start"], serde_json::json!({"line": 0, "character": 0}));
    assert!(json["relatedInformation"].is_array());
    assert_eq!(analysis.diagnostics[0].range.start, Position::new(0, 0));
}

fn mutual_recursion(fx: &Fixture) -> Vec<RawNode> {
    let call = |callee: &str, nth: usize, arg: usize| {
        node(
            "FunCall",
            fx.word_span(&format!("{callee}(k)"), nth),
            vec![
                leaf(format!("Variable: {callee}"), fx.word_span(callee, nth)),
                leaf("Variable: k", fx.word_span("k", arg)),
            ],
        )
    };
    let fun = |name: &str, nth: usize, param: usize, body: RawNode| {
        node(
            format!("Fun: {name}"),
            fx.span_between("fun", nth, "}", nth),
            vec![
                node("Params", fx.word_span("(k)", param), vec![leaf("Binder: k", fx.word_span("k", param))]),
                body,
            ],
        )
    };
    vec![node(
        "Funs",
        fx.span_between("fun", 0, "}", 1),
        vec![fun("even", 0, 0, call("odd", 0, 1)), fun("odd", 1, 2, call("even", 1, 3))],
    )]
}

#[test]
fn test_forward_call_inside_funs_group_is_a_known_function() {
    let fx = Fixture::new("fun even(k) { odd(k) }\nfun odd(k) { even(k) }\n");
    let analysis = analyse(&fx, mutual_recursion(&fx), &AnalysisOptions::default());

    let odd_call = analysis.index.unresolved().find(|o| o.name == "odd");
    assert!(odd_call.is_some(), "the forward call stays unresolved");
    assert!(analysis.index.is_known_function("odd"));
    assert!(analysis.diagnostics.is_empty(), "{:?}", analysis.diagnostics);
}
