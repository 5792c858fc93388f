//! The formula grammar.
//!
//! Exactly one form is recognized: a single call `=Name(ref, ref, ...)`.
//! There is no nesting, no arithmetic and no literal arguments. Arguments are
//! kept as raw tokens here; resolving them to cells happens at evaluation time.

use regex::Regex;
use std::sync::OnceLock;

/// A successfully parsed model invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormulaCall {
    pub model_name: String,
    pub args: Vec<String>,
}

/// Outcome of parsing a cell's raw text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormulaParse {
    /// The text does not start with `=`; it is a literal.
    NotFormula,
    /// Starts with `=` but does not match the call grammar.
    Invalid,
    Call(FormulaCall),
}

fn call_re() -> &'static Regex {
    static CALL_RE: OnceLock<Regex> = OnceLock::new();
    CALL_RE.get_or_init(|| {
        Regex::new(r"^=([A-Za-z0-9_]+)\(([^)]*)\)$").expect("formula call regex must compile")
    })
}

/// True when the raw value denotes a formula.
pub fn is_formula(raw: &str) -> bool {
    raw.trim().starts_with('=')
}

/// Parse raw cell text against the call grammar.
///
/// An empty argument list yields a single empty-string token.
pub fn parse_formula(text: &str) -> FormulaParse {
    let text = text.trim();
    if !text.starts_with('=') {
        return FormulaParse::NotFormula;
    }
    let Some(caps) = call_re().captures(text) else {
        return FormulaParse::Invalid;
    };
    FormulaParse::Call(FormulaCall {
        model_name: caps[1].to_string(),
        args: caps[2].split(',').map(|a| a.trim().to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: &[&str]) -> FormulaParse {
        FormulaParse::Call(FormulaCall {
            model_name: name.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        })
    }

    #[test]
    fn test_parse_simple_call() {
        assert_eq!(parse_formula("=Foo(A1, B2)"), call("Foo", &["A1", "B2"]));
        assert_eq!(parse_formula("=price_v2(C3)"), call("price_v2", &["C3"]));
    }

    #[test]
    fn test_parse_trims_arguments_and_text() {
        assert_eq!(parse_formula("  =Foo( A1 ,B2 )  "), call("Foo", &["A1", "B2"]));
    }

    #[test]
    fn test_empty_argument_list_yields_one_empty_token() {
        assert_eq!(parse_formula("=Foo()"), call("Foo", &[""]));
    }

    #[test]
    fn test_arguments_are_not_validated_here() {
        assert_eq!(parse_formula("=Foo(A1,,zz)"), call("Foo", &["A1", "", "zz"]));
    }

    #[test]
    fn test_invalid_formulas() {
        assert_eq!(parse_formula("=Foo(A1,B2"), FormulaParse::Invalid);
        assert_eq!(parse_formula("=Foo(Bar(A1))"), FormulaParse::Invalid);
        assert_eq!(parse_formula("=A1+B1"), FormulaParse::Invalid);
        assert_eq!(parse_formula("=Foo (A1)"), FormulaParse::Invalid);
        assert_eq!(parse_formula("=Foo(A1) * 2"), FormulaParse::Invalid);
        assert_eq!(parse_formula("="), FormulaParse::Invalid);
    }

    #[test]
    fn test_not_a_formula() {
        assert_eq!(parse_formula("Foo(A1)"), FormulaParse::NotFormula);
        assert_eq!(parse_formula("42"), FormulaParse::NotFormula);
        assert_eq!(parse_formula(""), FormulaParse::NotFormula);
        assert!(!is_formula("hello"));
        assert!(is_formula(" =x"));
    }
}
