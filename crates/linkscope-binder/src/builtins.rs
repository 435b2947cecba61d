//! Catalogue of Links library functions.
//!
//! Names in this table are never reported as undefined; hover shows their
//! signature.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

/// A library function and its type signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Builtin {
    pub name: &'static str,
    pub signature: &'static str,
}

const BUILTINS: &[Builtin] = &[
    // Output
    Builtin { name: "print", signature: "(String) ~> ()" },
    Builtin { name: "error", signature: "(String) ~> a" },
    Builtin { name: "debug", signature: "(String) ~> ()" },
    // Conversions
    Builtin { name: "intToString", signature: "(Int) -> String" },
    Builtin { name: "stringToInt", signature: "(String) -> Int" },
    Builtin { name: "intToFloat", signature: "(Int) -> Float" },
    Builtin { name: "floatToInt", signature: "(Float) -> Int" },
    Builtin { name: "floatToString", signature: "(Float) -> String" },
    Builtin { name: "stringToFloat", signature: "(String) -> Float" },
    Builtin { name: "intToXml", signature: "(Int) -> Xml" },
    Builtin { name: "floatToXml", signature: "(Float) -> Xml" },
    Builtin { name: "stringToXml", signature: "(String) -> Xml" },
    Builtin { name: "show", signature: "(a) -> String" },
    // Strings and characters
    Builtin { name: "explode", signature: "(String) -> [Char]" },
    Builtin { name: "implode", signature: "([Char]) -> String" },
    Builtin { name: "strlen", signature: "(String) -> Int" },
    Builtin { name: "strsub", signature: "(String, Int, Int) -> String" },
    Builtin { name: "strContains", signature: "(String, Char) -> Bool" },
    Builtin { name: "isAlpha", signature: "(Char) -> Bool" },
    Builtin { name: "isDigit", signature: "(Char) -> Bool" },
    Builtin { name: "isSpace", signature: "(Char) -> Bool" },
    Builtin { name: "toUpper", signature: "(Char) -> Char" },
    Builtin { name: "toLower", signature: "(Char) -> Char" },
    Builtin { name: "ord", signature: "(Char) -> Int" },
    Builtin { name: "chr", signature: "(Int) -> Char" },
    // Lists
    Builtin { name: "hd", signature: "([a]) ~> a" },
    Builtin { name: "tl", signature: "([a]) ~> [a]" },
    Builtin { name: "length", signature: "([a]) -> Int" },
    Builtin { name: "take", signature: "(Int, [a]) -> [a]" },
    Builtin { name: "drop", signature: "(Int, [a]) -> [a]" },
    Builtin { name: "map", signature: "((a) -e-> b, [a]) -e-> [b]" },
    Builtin { name: "filter", signature: "((a) -e-> Bool, [a]) -e-> [a]" },
    Builtin { name: "fold_left", signature: "((a, b) -e-> a, a, [b]) -e-> a" },
    Builtin { name: "fold_right", signature: "((a, b) -e-> b, b, [a]) -e-> b" },
    Builtin { name: "concat", signature: "([[a]]) -> [a]" },
    Builtin { name: "reverse", signature: "([a]) -> [a]" },
    Builtin { name: "zip", signature: "([a], [b]) -> [(a, b)]" },
    Builtin { name: "unzip", signature: "([(a, b)]) -> ([a], [b])" },
    Builtin { name: "elem", signature: "(a, [a]) -> Bool" },
    Builtin { name: "lookup", signature: "(a, [(a, b)]) -> Maybe(b)" },
    Builtin { name: "iter", signature: "((a) -e-> (), [a]) -e-> ()" },
    Builtin { name: "sum", signature: "([Int]) -> Int" },
    Builtin { name: "max", signature: "([a]) -> Maybe(a)" },
    Builtin { name: "min", signature: "([a]) -> Maybe(a)" },
    Builtin { name: "sortBy", signature: "((a) -> b, [a]) -> [a]" },
    Builtin { name: "range", signature: "(Int, Int) -> [Int]" },
    Builtin { name: "empty", signature: "([a]) -> Bool" },
    Builtin { name: "ignore", signature: "(a) -> ()" },
    Builtin { name: "fst", signature: "((a, b)) -> a" },
    Builtin { name: "snd", signature: "((a, b)) -> b" },
    // Maybe
    Builtin { name: "isJust", signature: "(Maybe(a)) -> Bool" },
    Builtin { name: "fromJust", signature: "(Maybe(a)) ~> a" },
    Builtin { name: "fromMaybe", signature: "(Maybe(a), a) -> a" },
    // Numbers
    Builtin { name: "abs", signature: "(Int) -> Int" },
    Builtin { name: "mod", signature: "(Int, Int) -> Int" },
    Builtin { name: "floor", signature: "(Float) -> Float" },
    Builtin { name: "ceiling", signature: "(Float) -> Float" },
    Builtin { name: "sqrt", signature: "(Float) -> Float" },
    Builtin { name: "random", signature: "() ~> Float" },
    Builtin { name: "not", signature: "(Bool) -> Bool" },
    // Web, sessions and DOM
    Builtin { name: "page", signature: "(Page) ~> Page" },
    Builtin { name: "render", signature: "(Formlet(a), (a) ~> Page) ~> Page" },
    Builtin { name: "addRoute", signature: "(String, (String) ~> Page) ~> ()" },
    Builtin { name: "addStaticRoute", signature: "(String, String, [(String, String)]) ~> ()" },
    Builtin { name: "serveThis", signature: "(() ~> Page) ~> ()" },
    Builtin { name: "servePages", signature: "() ~> ()" },
    Builtin { name: "redirect", signature: "(String) ~> ()" },
    Builtin { name: "getCookie", signature: "(String) ~> String" },
    Builtin { name: "setCookie", signature: "(String, String) ~> ()" },
    Builtin { name: "spawn", signature: "(() ~e~> ()) ~> Process" },
    Builtin { name: "spawnClient", signature: "(() ~e~> ()) ~> Process" },
    Builtin { name: "self", signature: "() ~> Process" },
    Builtin { name: "recv", signature: "() ~> a" },
    Builtin { name: "sleep", signature: "(Int) ~> ()" },
    Builtin { name: "domReplaceChildren", signature: "(Xml, DomNode) ~> ()" },
    Builtin { name: "getNodeById", signature: "(String) ~> DomNode" },
    Builtin { name: "getInputValue", signature: "(String) ~> String" },
    Builtin { name: "getValue", signature: "(DomNode) ~> Xml" },
    Builtin { name: "clientTime", signature: "() ~> Int" },
    Builtin { name: "serverTime", signature: "() ~> Int" },
    // Formlets
    Builtin { name: "input", signature: "Formlet(String)" },
    Builtin { name: "inputInt", signature: "Formlet(Int)" },
    Builtin { name: "inputFloat", signature: "Formlet(Float)" },
    Builtin { name: "textarea", signature: "(String) -> Formlet(String)" },
    Builtin { name: "button", signature: "(String) -> Formlet(())" },
    Builtin { name: "submit", signature: "(String) -> Formlet(())" },
    Builtin { name: "choice", signature: "([(a, String)]) -> Formlet(a)" },
    Builtin { name: "choiceDefault", signature: "([(a, String)], a) -> Formlet(a)" },
    Builtin { name: "checkbox", signature: "Formlet(Bool)" },
    Builtin { name: "formlets", signature: "([Formlet(a)]) -> Formlet([a])" },
    // Database
    Builtin { name: "database", signature: "(String) ~> Database" },
    Builtin { name: "asList", signature: "(TableHandle(r, w, n)) ~> [r]" },
    Builtin { name: "insert", signature: "(TableHandle(r, w, n), [r]) ~> ()" },
];

static BUILTIN_TABLE: Lazy<FxHashMap<&'static str, &'static Builtin>> =
    Lazy::new(|| BUILTINS.iter().map(|b| (b.name, b)).collect());

/// Look up a library function by name.
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTIN_TABLE.get(name).copied()
}

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_TABLE.contains_key(name)
}

/// All catalogue entries, in table order.
pub fn all() -> &'static [Builtin] {
    BUILTINS
}
