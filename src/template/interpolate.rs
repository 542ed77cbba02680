//! Variable lookup and `{{placeholder}}` substitution

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

/// `{{ident}}`, `{{ ident }}` or `{{}}`; identifiers never span braces or whitespace
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([^{}\s]*)\s*\}\}").expect("placeholder pattern is valid")
});

/// Resolve an identifier against a variable context
///
/// The empty identifier is the whole context. An exact key wins over a
/// dotted path, so `{"a.b": 1}` still resolves `a.b`. Dotted paths walk
/// nested objects and index arrays with numeric segments.
pub fn lookup<'v>(variables: &'v Value, ident: &str) -> Option<&'v Value> {
    if ident.is_empty() {
        return Some(variables);
    }
    if let Some(value) = variables.as_object().and_then(|map| map.get(ident)) {
        return Some(value);
    }
    if !ident.contains('.') {
        return None;
    }
    ident
        .split('.')
        .try_fold(variables, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

/// Text form of a value as it appears in output
///
/// Strings are inserted raw; arrays and objects as compact JSON.
pub fn stringify(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Null => Cow::Borrowed("null"),
        Value::Bool(b) => Cow::Owned(b.to_string()),
        Value::Number(n) => Cow::Owned(n.to_string()),
        Value::Array(_) | Value::Object(_) => Cow::Owned(value.to_string()),
    }
}

/// Replace every resolvable placeholder in `text`
///
/// Placeholders are matched left to right without overlap and substituted
/// text is never scanned again. Unresolved placeholders are kept verbatim.
pub fn interpolate<'t>(text: &'t str, variables: &Value) -> Cow<'t, str> {
    substitute(text, variables, |value| stringify(value).into_owned())
}

/// Like [`interpolate`], but substitutes values as expression literals
///
/// Inside a quoted literal a string value is spliced in with its quotes and
/// backslashes escaped. Outside quotes it becomes a quoted literal of its
/// own, so a substituted value never reads as a variable path or keyword.
/// Numbers, booleans and null are emitted raw.
pub fn interpolate_for_expression<'t>(text: &'t str, variables: &Value) -> Cow<'t, str> {
    let mut out = String::with_capacity(text.len());
    let mut quote = QuoteState::default();
    let mut last = 0;
    let mut replaced = false;

    for caps in PLACEHOLDER.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let literal = &text[last..whole.start()];
        quote.advance(literal);
        out.push_str(literal);
        last = whole.end();

        match lookup(variables, &caps[1]) {
            Some(value) => {
                replaced = true;
                if quote.is_open() {
                    out.push_str(&escape_quotes(&stringify(value)));
                } else {
                    push_literal(&mut out, value);
                }
            }
            None => {
                quote.advance(whole.as_str());
                out.push_str(whole.as_str());
            }
        }
    }

    if !replaced {
        return Cow::Borrowed(text);
    }
    out.push_str(&text[last..]);
    Cow::Owned(out)
}

/// Quote tracking over the template-authored parts of a test
#[derive(Debug, Default)]
struct QuoteState {
    open: Option<char>,
    escaped: bool,
}

impl QuoteState {
    fn is_open(&self) -> bool {
        self.open.is_some()
    }

    fn advance(&mut self, text: &str) {
        for c in text.chars() {
            match self.open {
                Some(_) if self.escaped => self.escaped = false,
                Some(_) if c == '\\' => self.escaped = true,
                Some(q) if c == q => self.open = None,
                Some(_) => {}
                None if matches!(c, '\'' | '"') => self.open = Some(c),
                None => {}
            }
        }
    }
}

fn push_literal(out: &mut String, value: &Value) {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) => out.push_str(&stringify(value)),
        Value::String(_) | Value::Array(_) | Value::Object(_) => {
            out.push('\'');
            out.push_str(&escape_quotes(&stringify(value)));
            out.push('\'');
        }
    }
}

fn substitute<'t, F>(text: &'t str, variables: &Value, render: F) -> Cow<'t, str>
where
    F: Fn(&Value) -> String,
{
    PLACEHOLDER.replace_all(text, |caps: &Captures<'_>| match lookup(variables, &caps[1]) {
        Some(value) => render(value),
        None => caps[0].to_string(),
    })
}

fn escape_quotes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '\'' | '"') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_simple_substitution() {
        let vars = json!({"name": "World"});
        assert_eq!(interpolate("Hello, {{name}}!", &vars), "Hello, World!");
    }

    #[test]
    fn test_unresolved_stays_literal() {
        let vars = json!({"name": "World"});
        assert_eq!(
            interpolate("{{greeting}}, {{name}}", &vars),
            "{{greeting}}, World"
        );
    }

    #[test]
    fn test_adjacent_placeholders() {
        let vars = json!({"a": "1", "b": "2"});
        assert_eq!(interpolate("{{a}}{{b}}", &vars), "12");
    }

    #[test]
    fn test_substituted_text_not_rescanned() {
        let vars = json!({"a": "{{b}}", "b": "nope"});
        assert_eq!(interpolate("{{a}}", &vars), "{{b}}");
    }

    #[test]
    fn test_empty_identifier_is_whole_context() {
        assert_eq!(interpolate("<{{}}>", &json!("item")), "<item>");
        assert_eq!(interpolate("{{ }}", &json!(4)), "4");
    }

    #[test]
    fn test_dotted_paths() {
        let vars = json!({"user": {"name": "Ada", "tags": ["x", "y"]}, "a.b": "flat"});
        assert_eq!(interpolate("{{user.name}}", &vars), "Ada");
        assert_eq!(interpolate("{{user.tags.1}}", &vars), "y");
        assert_eq!(interpolate("{{a.b}}", &vars), "flat");
        assert_eq!(interpolate("{{user.missing}}", &vars), "{{user.missing}}");
    }

    #[test]
    fn test_stringify_values() {
        let vars = json!({"n": 3, "f": 1.5, "b": false, "z": null, "l": [1, 2], "o": {"k": "v"}});
        assert_eq!(
            interpolate("{{n}} {{f}} {{b}} {{z}} {{l}} {{o}}", &vars),
            r#"3 1.5 false null [1,2] {"k":"v"}"#
        );
    }

    #[test]
    fn test_non_object_context_has_no_keys() {
        assert_eq!(interpolate("{{name}}", &json!("plain")), "{{name}}");
    }

    #[test]
    fn test_borrowed_when_nothing_to_replace() {
        assert!(matches!(interpolate("static text", &json!({})), Cow::Borrowed(_)));
    }

    #[test]
    fn test_expression_escaping() {
        let vars = json!({"x": r#"it's "quoted" \ here"#, "n": 2});
        assert_eq!(
            interpolate_for_expression("'{{x}}' = {{n}}", &vars),
            r#"'it\'s \"quoted\" \\ here' = 2"#
        );
    }

    #[test]
    fn test_expression_bare_strings_become_literals() {
        let vars = json!({"x": "a", "city": "New York", "op": "or", "q": "it's"});
        assert_eq!(interpolate_for_expression("{{x}} = 'a'", &vars), "'a' = 'a'");
        assert_eq!(
            interpolate_for_expression("{{city}} != {{op}}", &vars),
            "'New York' != 'or'"
        );
        assert_eq!(interpolate_for_expression("{{q}}", &vars), r#"'it\'s'"#);
    }

    #[test]
    fn test_expression_scalars_stay_raw() {
        let vars = json!({"n": 3, "b": true, "z": null, "l": ["a"]});
        assert_eq!(
            interpolate_for_expression("{{n}} {{b}} {{z}} {{l}}", &vars),
            r#"3 true null '[\"a\"]'"#
        );
    }

    #[test]
    fn test_expression_quote_state_follows_template_text() {
        let vars = json!({"x": "v"});
        // The escaped quote does not close the literal
        assert_eq!(
            interpolate_for_expression(r#"'\'{{x}}' = "{{x}}" && {{x}}"#, &vars),
            r#"'\'v' = "v" && 'v'"#
        );
        // A value containing a quote does not open one
        let vars = json!({"x": "'", "y": "w"});
        assert_eq!(interpolate_for_expression("{{x}} {{y}}", &vars), r#"'\'' 'w'"#);
    }

    #[test]
    fn test_expression_unresolved_kept() {
        assert!(matches!(
            interpolate_for_expression("{{missing}} = 1", &json!({})),
            Cow::Borrowed("{{missing}} = 1")
        ));
    }
}
