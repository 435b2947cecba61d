//! End-to-end: parser JSON in, diagnostics and navigation out.

use linkscope::lsp::{GoToDefinition, HoverProvider, SemanticTokensProvider};
use linkscope::{AnalysisOptions, Classification, Position, Range, TreeError, analyze_document};
use serde_json::json;

const URI: &str = "file:///greet.links";

const SOURCE: &str = "fun greet(name) {\n  \"Hello, \" ^^ name\n}\nvar msg = greet(\"Ada\");\nprint(mesg)\n";

fn tree_json() -> String {
    json!(["Interior", "Fun: dummy_wrapper", "0:1-7:2", [
        ["Interior", "Block", "0:1-7:2", [
            ["Interior", "Fun: greet", "1:1-3:2", [
                ["Interior", "Params", "1:10-1:16", [
                    ["Leaf", "Binder: name", "1:11-1:15"]
                ]],
                ["Interior", "InfixAppl: ^^", "2:3-2:20", [
                    ["Leaf", "Constant: \"Hello, \"", "2:3-2:12"],
                    ["Leaf", "Variable: name", "2:16-2:20"]
                ]]
            ]],
            ["Interior", "Val", "4:1-4:24", [
                ["Leaf", "Binder: msg", "4:5-4:8"],
                ["Interior", "FnAppl", "4:11-4:23", [
                    ["Leaf", "Variable: greet", "4:11-4:16"],
                    ["Leaf", "Constant: \"Ada\"", "4:17-4:22"]
                ]]
            ]],
            ["Interior", "FnAppl", "5:1-5:12", [
                ["Leaf", "Variable: print", "5:1-5:6"],
                ["Leaf", "Variable: mesg", "5:7-5:11"]
            ]]
        ]]
    ]])
    .to_string()
}

#[test]
fn test_typo_is_the_only_diagnostic() {
    let analysis = analyze_document(URI, SOURCE, &tree_json(), &AnalysisOptions::default()).unwrap();
    assert_eq!(analysis.diagnostics.len(), 1);
    let diagnostic = &analysis.diagnostics[0];
    assert_eq!(diagnostic.code, Some(1001));
    assert_eq!(diagnostic.range, Range::on_line(4, 6, 4));
    assert_eq!(diagnostic.message, "Variable 'mesg' is not defined.");
}

#[test]
fn test_navigation_over_parsed_tree() {
    let analysis = analyze_document(URI, SOURCE, &tree_json(), &AnalysisOptions::default()).unwrap();

    let definition = GoToDefinition::new(&analysis)
        .definition(Position::new(3, 11))
        .unwrap();
    assert_eq!(definition.range, Range::on_line(0, 4, 5));

    let hover = HoverProvider::new(&analysis)
        .hover(Position::new(1, 16))
        .unwrap();
    assert_eq!(hover.contents[1], "(parameter)");

    let classified = SemanticTokensProvider::new(&analysis).classify();
    assert!(classified.contains(&(Range::on_line(1, 2, 9), Classification::StringConstant)));
    assert!(classified.contains(&(Range::on_line(3, 4, 3), Classification::UnusedVariable)));
    assert!(classified.contains(&(Range::on_line(0, 4, 5), Classification::UsedFunction)));
}

#[test]
fn test_malformed_tree_is_an_error() {
    let result = analyze_document(URI, SOURCE, "[\"Leaf\"]", &AnalysisOptions::default());
    assert!(matches!(result, Err(TreeError::MalformedNode { .. })));
}
