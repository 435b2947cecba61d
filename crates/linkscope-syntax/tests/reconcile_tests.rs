use linkscope_common::{NativePosition, NativeSpan, Position, Range};
use linkscope_syntax::fixtures::{Fixture, leaf, node};
use linkscope_syntax::{Classification, NodeIndex, NodeKind, PositionShift, SyntaxTree, narrow};

fn first(tree: &SyntaxTree, pred: impl Fn(&NodeKind) -> bool) -> NodeIndex {
    tree.arena
        .preorder(tree.root)
        .into_iter()
        .find(|&idx| tree.arena.kind(idx).is_some_and(&pred))
        .expect("node present")
}

#[test]
fn test_reconcile_is_single_shift() {
    let shift = PositionShift::default();
    let span = NativeSpan::new(NativePosition::new(3, 5), NativePosition::new(3, 9));
    let range = shift.reconcile_span(span);
    assert_eq!(range, Range::new(Position::new(2, 4), Position::new(2, 8)));
}

#[test]
fn test_custom_shift() {
    let shift = PositionShift::new(2, 0);
    assert_eq!(
        shift.reconcile(NativePosition::new(5, 7)),
        Position::new(3, 7)
    );
}

#[test]
fn test_narrow_function_name_skips_keyword() {
    let source = "fun greet(name) {\n  name\n}\n";
    let fx = Fixture::new(source);
    let tree = fx.tree(vec![node(
        "Fun: greet",
        fx.span_between("fun", 0, "}", 0),
        vec![
            node("Params", fx.word_span("(name)", 0), vec![leaf("Binder: name", fx.word_span("name", 0))]),
            leaf("Variable: name", fx.word_span("name", 1)),
        ],
    )]);
    let fun = first(&tree, |k| matches!(k, NodeKind::Fun { name } if name == "greet"));
    let ranges = narrow(&tree.arena, fun, Classification::UsedFunction, source, fx.shift);
    assert_eq!(ranges.as_slice(), &[Range::on_line(0, 4, 5)]);
}

#[test]
fn test_narrow_function_name_falls_back_to_search() {
    // Extra spacing after the keyword.
    let source = "fun   spaced() {\n  1\n}\n";
    let fx = Fixture::new(source);
    let tree = fx.tree(vec![node(
        "Fun: spaced",
        fx.span_between("fun", 0, "}", 0),
        vec![node("Params", fx.word_span("()", 0), vec![])],
    )]);
    let fun = first(&tree, |k| matches!(k, NodeKind::Fun { name } if name == "spaced"));
    let ranges = narrow(&tree.arena, fun, Classification::UnusedFunction, source, fx.shift);
    assert_eq!(ranges.as_slice(), &[Range::on_line(0, 6, 6)]);
}

#[test]
fn test_narrow_call_site_to_callee() {
    let source = "print(intToString(1))\n";
    let fx = Fixture::new(source);
    let tree = fx.tree(vec![node(
        "FunCall",
        fx.span_between("print", 0, "))", 0),
        vec![
            leaf("Variable: print", fx.word_span("print", 0)),
            node(
                "FunCall",
                fx.span_between("intToString", 0, "1)", 0),
                vec![
                    leaf("Variable: intToString", fx.word_span("intToString", 0)),
                    leaf("Constant: 1", fx.word_span("1", 0)),
                ],
            ),
        ],
    )]);
    let outer = first(&tree, |k| matches!(k, NodeKind::FunCall));
    let ranges = narrow(&tree.arena, outer, Classification::FunctionCall, source, fx.shift);
    assert_eq!(ranges.as_slice(), &[Range::on_line(0, 0, 5)]);

    let number = first(&tree, |k| matches!(k, NodeKind::Constant(_)));
    let ranges = narrow(&tree.arena, number, Classification::NumberConstant, source, fx.shift);
    assert_eq!(ranges.as_slice(), &[Range::on_line(0, 18, 1)]);
}

#[test]
fn test_narrow_string_constant_by_search() {
    let source = "var msg = \"hello\";\n";
    let fx = Fixture::new(source);
    // The parser reports the literal one column early.
    let reported = NativeSpan::new(NativePosition::new(1, 10), NativePosition::new(1, 18));
    let tree = fx.tree(vec![node(
        "Val",
        fx.span_between("var", 0, ";", 0),
        vec![
            leaf("Binder: msg", fx.word_span("msg", 0)),
            leaf("Constant: \"hello\"", reported),
        ],
    )]);
    let constant = first(&tree, |k| matches!(k, NodeKind::Constant(_)));
    let ranges = narrow(&tree.arena, constant, Classification::StringConstant, source, fx.shift);
    assert_eq!(ranges.as_slice(), &[Range::on_line(0, 10, 7)]);
}

#[test]
fn test_narrow_projection_to_field() {
    let source = "person.name\n";
    let fx = Fixture::new(source);
    let tree = fx.tree(vec![node(
        "Projection: name",
        fx.span_between("person", 0, "name", 0),
        vec![leaf("Variable: person", fx.word_span("person", 0))],
    )]);
    let projection = first(&tree, |k| matches!(k, NodeKind::Projection { .. }));
    let ranges = narrow(&tree.arena, projection, Classification::Projection, source, fx.shift);
    assert_eq!(ranges.as_slice(), &[Range::on_line(0, 7, 4)]);
}

#[test]
fn test_narrow_markup_open_and_close_tags() {
    let source = "<div class=\"box\">hi</div>\n";
    let fx = Fixture::new(source);
    let tree = fx.tree(vec![node(
        "Xml: div",
        fx.span_between("<div", 0, "</div>", 0),
        vec![
            node(
                "XmlAttr: class",
                fx.span_between("class", 0, "\"box\"", 0),
                vec![leaf("Constant: \"box\"", fx.word_span("box", 0))],
            ),
            leaf("TextNode: hi", fx.word_span("hi", 0)),
        ],
    )]);
    let xml = first(&tree, |k| matches!(k, NodeKind::Xml { .. }));
    let open = narrow(&tree.arena, xml, Classification::MarkupDeclaration, source, fx.shift);
    assert_eq!(open.as_slice(), &[Range::on_line(0, 1, 3)]);
    let close = narrow(&tree.arena, xml, Classification::MarkupTag, source, fx.shift);
    assert_eq!(close.as_slice(), &[Range::on_line(0, 21, 3)]);

    let attr = first(&tree, |k| matches!(k, NodeKind::XmlAttr { .. }));
    let name = narrow(&tree.arena, attr, Classification::MarkupAttribute, source, fx.shift);
    assert_eq!(name.as_slice(), &[Range::on_line(0, 5, 5)]);
}

#[test]
fn test_self_closing_markup_has_no_closing_tag() {
    let source = "<br/>\n";
    let fx = Fixture::new(source);
    let tree = fx.tree(vec![node("Xml: br", fx.word_span("<br/>", 0), vec![])]);
    let xml = first(&tree, |k| matches!(k, NodeKind::Xml { .. }));
    assert!(narrow(&tree.arena, xml, Classification::MarkupTag, source, fx.shift).is_empty());
}

#[test]
fn test_mismatched_classification_yields_nothing() {
    let source = "x\n";
    let fx = Fixture::new(source);
    let tree = fx.tree(vec![leaf("Variable: x", fx.word_span("x", 0))]);
    let var = first(&tree, |k| matches!(k, NodeKind::Variable { .. }));
    assert!(narrow(&tree.arena, var, Classification::StringConstant, source, fx.shift).is_empty());
    assert_eq!(
        narrow(&tree.arena, var, Classification::UsedVariable, source, fx.shift).as_slice(),
        &[Range::on_line(0, 0, 1)]
    );
}

#[test]
fn test_variant_tag() {
    let source = "Just(1)\n";
    let fx = Fixture::new(source);
    let tree = fx.tree(vec![node(
        "Constructor: Just",
        fx.span_between("Just", 0, ")", 0),
        vec![leaf("Constant: 1", fx.word_span("1", 0))],
    )]);
    let tag = first(&tree, |k| matches!(k, NodeKind::Constructor { .. }));
    let ranges = narrow(&tree.arena, tag, Classification::VariantTag, source, fx.shift);
    assert_eq!(ranges.as_slice(), &[Range::on_line(0, 0, 4)]);
}
