//! Signature discovery in raw C source text.
//!
//! A deliberately narrow, hand-written scanner recovers a function's
//! declared return type, ordered parameter type list and preceding block
//! comment from unpreprocessed source text. The supported grammar is ANSI
//! prototypes with bare parameter type lists:
//!
//! ```c
//! /* adds two integers */
//! int add(int, int);
//! ```
//!
//! Known limitations, kept narrow on purpose so failure modes stay
//! enumerable: no macros, typedefs, multi-line declarators or function
//! pointers; the return position captures one identifier token plus an
//! optional pointer suffix (`unsigned long f()` yields `long`); parameter
//! names are not stripped, so declarations must be bare type lists; only a
//! single `/* ... */` block immediately preceding the declaration is
//! recognized as documentation.

use cbridge_core::ScanError;

/// A function's declared shape as recovered from source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// The declared return type name (`int`, `char*`, ...).
    pub return_type: String,
    /// Parameter type names in declaration order, whitespace-normalized.
    pub params: Vec<String>,
    /// Documentation comment immediately preceding the declaration,
    /// delimiters stripped and whitespace-trimmed.
    pub doc: Option<String>,
}

/// Recover the declared shape of `function` from `source`.
///
/// The first occurrence of `function` that matches the declaration grammar
/// wins. Extraction is read-only and idempotent: the same source and name
/// always produce the same signature.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn extract(source: &str, function: &str) -> Result<Signature, ScanError> {
    if function.is_empty() {
        return Err(ScanError::FunctionNotFound {
            function: String::new(),
        });
    }

    let mut search_from = 0;
    while let Some(found) = source[search_from..].find(function) {
        let at = search_from + found;
        search_from = at + 1;
        if let Some(sig) = match_declaration(source, at, function.len()) {
            return Ok(sig);
        }
    }

    Err(ScanError::FunctionNotFound {
        function: function.to_string(),
    })
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Try to read a declaration whose name starts at byte `at`.
fn match_declaration(source: &str, at: usize, name_len: usize) -> Option<Signature> {
    let bytes = source.as_bytes();
    let name_end = at + name_len;

    // The name must be a whole identifier, not a substring of one.
    if at > 0 && is_ident_byte(bytes[at - 1]) {
        return None;
    }
    if name_end < bytes.len() && is_ident_byte(bytes[name_end]) {
        return None;
    }

    let (return_type, type_start) = return_token_before(source, at)?;
    let params = param_list_after(source, name_end)?;
    let doc = doc_before(source, type_start);

    Some(Signature {
        return_type,
        params,
        doc,
    })
}

/// Read the return-type token that must precede the function name:
/// one identifier, optionally followed by `*`s. Multi-word type names are
/// not captured in return position; `unsigned long f()` yields `long`.
fn return_token_before(source: &str, name_start: usize) -> Option<(String, usize)> {
    let bytes = source.as_bytes();
    let mut pos = name_start;
    while pos > 0 && bytes[pos - 1].is_ascii_whitespace() {
        pos -= 1;
    }

    let mut stars = 0usize;
    loop {
        if pos > 0 && bytes[pos - 1] == b'*' {
            stars += 1;
            pos -= 1;
            while pos > 0 && bytes[pos - 1].is_ascii_whitespace() {
                pos -= 1;
            }
        } else {
            break;
        }
    }

    let token_end = pos;
    while pos > 0 && is_ident_byte(bytes[pos - 1]) {
        pos -= 1;
    }
    if pos == token_end {
        return None;
    }

    let mut token = source[pos..token_end].to_string();
    for _ in 0..stars {
        token.push('*');
    }
    Some((token, pos))
}

/// Read the parenthesized parameter list that must follow the name.
/// Only identifier characters, whitespace, commas and `*` may appear
/// between the parentheses.
fn param_list_after(source: &str, name_end: usize) -> Option<Vec<String>> {
    let bytes = source.as_bytes();
    let mut pos = name_end;
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    if pos >= bytes.len() || bytes[pos] != b'(' {
        return None;
    }
    pos += 1;

    let inner_start = pos;
    while pos < bytes.len() && bytes[pos] != b')' {
        let b = bytes[pos];
        if !(is_ident_byte(b) || b.is_ascii_whitespace() || b == b',' || b == b'*') {
            return None;
        }
        pos += 1;
    }
    if pos >= bytes.len() {
        return None;
    }

    let inner = &source[inner_start..pos];
    if inner.trim().is_empty() {
        return Some(Vec::new());
    }
    Some(
        inner
            .split(',')
            .map(|decl| decl.split_whitespace().collect::<Vec<_>>().join(" "))
            .collect(),
    )
}

/// Read a `/* ... */` block whose closing delimiter is the last
/// non-whitespace text before the declaration.
fn doc_before(source: &str, decl_start: usize) -> Option<String> {
    let bytes = source.as_bytes();
    let mut pos = decl_start;
    while pos > 0 && bytes[pos - 1].is_ascii_whitespace() {
        pos -= 1;
    }
    if pos < 2 || &source[pos - 2..pos] != "*/" {
        return None;
    }
    let open = source[..pos - 2].rfind("/*")?;
    let body = source[open + 2..pos - 2].trim();
    if body.is_empty() {
        return None;
    }
    Some(body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_documented_two_parameter_function() {
        let source = "/* adds two integers */\nint add(int, int);\n";
        let sig = extract(source, "add").unwrap();
        assert_eq!(sig.return_type, "int");
        assert_eq!(sig.params, vec!["int", "int"]);
        assert_eq!(sig.doc.as_deref(), Some("adds two integers"));
    }

    #[test]
    fn zero_parameters_is_empty_not_error() {
        let sig = extract("long ticks();", "ticks").unwrap();
        assert_eq!(sig.return_type, "long");
        assert!(sig.params.is_empty());
        assert!(sig.doc.is_none());

        let sig = extract("long ticks(   );", "ticks").unwrap();
        assert!(sig.params.is_empty());
    }

    #[test]
    fn multi_word_parameter_types_are_kept_whole() {
        let sig = extract(
            "long long mix(unsigned long long, short int, double);",
            "mix",
        )
        .unwrap();
        assert_eq!(
            sig.params,
            vec!["unsigned long long", "short int", "double"]
        );
        // Single-token capture in return position: only `long` survives.
        assert_eq!(sig.return_type, "long");
    }

    #[test]
    fn pointer_return_types_are_captured() {
        let sig = extract("char* duplicate(const char*);", "duplicate").unwrap();
        assert_eq!(sig.return_type, "char*");
        assert_eq!(sig.params, vec!["const char*"]);

        let sig = extract("char *duplicate2(const char *);", "duplicate2").unwrap();
        assert_eq!(sig.return_type, "char*");
        assert_eq!(sig.params, vec!["const char *"]);
    }

    #[test]
    fn missing_function_is_an_error() {
        let err = extract("int add(int, int);", "sub").unwrap_err();
        assert_eq!(
            err,
            ScanError::FunctionNotFound {
                function: "sub".into()
            }
        );
    }

    #[test]
    fn name_must_be_whole_identifier() {
        // `add` occurs inside `madden` and `add2`; neither may match.
        let err = extract("int madden(int); int add2(int);", "add").unwrap_err();
        assert!(matches!(err, ScanError::FunctionNotFound { .. }));
    }

    #[test]
    fn first_matching_declaration_wins() {
        let source = "\
/* prototype */
int twice(int);

int twice(int x) { return x + x; }
";
        let sig = extract(source, "twice").unwrap();
        assert_eq!(sig.params, vec!["int"]);
        assert_eq!(sig.doc.as_deref(), Some("prototype"));
    }

    #[test]
    fn comment_must_be_adjacent() {
        let source = "/* about something else */\nint other();\n\nint lone(int);\n";
        let sig = extract(source, "lone").unwrap();
        assert!(sig.doc.is_none());
    }

    #[test]
    fn body_braces_do_not_match_as_parameters() {
        // The definition's parameter list contains a name; still a valid
        // match shape, and the brace body is never scanned as parameters.
        let sig = extract("int inc(int v) { return v + 1; }", "inc").unwrap();
        assert_eq!(sig.params, vec!["int v"]);
    }

    #[test]
    fn extraction_is_idempotent() {
        let source = "/* doc */\ndouble square(double);";
        let a = extract(source, "square").unwrap();
        let b = extract(source, "square").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_function_name_is_not_found() {
        assert!(extract("int f();", "").is_err());
    }
}
