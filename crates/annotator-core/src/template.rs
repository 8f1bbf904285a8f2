//! Message templating.
//!
//! A rule's message is produced by re-applying the rule's pattern once to the text it matched
//! and replacing that re-match with the expanded template, the way a single-shot string
//! `replace` does. Supported tokens:
//!
//! | token | expands to |
//! |---|---|
//! | `$$` | `$` |
//! | `$&`, `$0` | the whole re-match |
//! | `` $` `` / `$'` | matched text before / after the re-match |
//! | `$1` .. `$99` | capture group (two digits preferred when that group exists) |
//! | `$<name>` | named capture group |
//!
//! Numbered tokens naming groups the pattern does not have are copied literally, and so is
//! `$<name>` when the pattern has no named groups at all. Groups that did not take part in the
//! match (or unknown names in a pattern with named groups) expand to nothing.

use crate::error::TemplateMismatchError;
use crate::rule::CompiledRule;
use fancy_regex::Captures;
use regex::Regex as TokenRegex;
use std::sync::LazyLock;
use tracing::debug;

static TEMPLATE_TOKEN: LazyLock<TokenRegex> = LazyLock::new(|| {
    TokenRegex::new(r"\$(?:([$&`'])|<([^>]*)>|([0-9]{1,2}))").expect("valid template token regex")
});

/// Render the message for one match, falling back to the matched text if the pattern does not
/// re-match it.
pub fn render_message(rule: &CompiledRule, matched: &str) -> String {
    match try_render_message(rule, matched) {
        Ok(message) => message,
        Err(err) => {
            debug!(rule = rule.name(), %err, "message template fell back to matched text");
            matched.to_string()
        }
    }
}

/// Render the message for one match.
pub fn try_render_message(
    rule: &CompiledRule,
    matched: &str,
) -> Result<String, TemplateMismatchError> {
    let mismatch = || TemplateMismatchError {
        text: matched.to_string(),
    };

    let captures = match rule.regex().captures(matched) {
        Ok(Some(captures)) => captures,
        Ok(None) | Err(_) => return Err(mismatch()),
    };
    let Some(whole) = captures.get(0) else {
        return Err(mismatch());
    };

    let expansion = Expansion {
        captures: &captures,
        has_named_groups: rule.has_named_groups(),
        prefix: &matched[..whole.start()],
        whole: whole.as_str(),
        suffix: &matched[whole.end()..],
    };

    let mut out = String::with_capacity(matched.len() + rule.message().len());
    out.push_str(expansion.prefix);
    expansion.expand(rule.message(), &mut out);
    out.push_str(expansion.suffix);
    Ok(out)
}

struct Expansion<'a, 't> {
    captures: &'a Captures<'t>,
    has_named_groups: bool,
    prefix: &'a str,
    whole: &'a str,
    suffix: &'a str,
}

impl Expansion<'_, '_> {
    fn expand(&self, template: &str, out: &mut String) {
        let mut last = 0usize;
        for token in TEMPLATE_TOKEN.captures_iter(template) {
            let Some(all) = token.get(0) else {
                continue;
            };
            out.push_str(&template[last..all.start()]);
            last = all.end();

            let expanded = if let Some(symbol) = token.get(1) {
                self.push_symbol(symbol.as_str(), out);
                true
            } else if let Some(name) = token.get(2) {
                self.push_named(name.as_str(), out)
            } else if let Some(digits) = token.get(3) {
                self.push_numbered(digits.as_str(), out)
            } else {
                false
            };

            if !expanded {
                out.push_str(all.as_str());
            }
        }
        out.push_str(&template[last..]);
    }

    fn push_symbol(&self, symbol: &str, out: &mut String) {
        match symbol {
            "$" => out.push('$'),
            "&" => out.push_str(self.whole),
            "`" => out.push_str(self.prefix),
            _ => out.push_str(self.suffix),
        }
    }

    fn push_named(&self, name: &str, out: &mut String) -> bool {
        if !self.has_named_groups {
            return false;
        }
        if let Some(group) = self.captures.name(name) {
            out.push_str(group.as_str());
        }
        true
    }

    fn push_numbered(&self, digits: &str, out: &mut String) -> bool {
        let group_count = self.captures.len().saturating_sub(1);

        if digits.len() == 2
            && let Ok(index) = digits.parse::<usize>()
            && (1..=group_count).contains(&index)
        {
            self.push_group(index, out);
            return true;
        }

        let mut chars = digits.chars();
        let Some(first) = chars.next().and_then(|c| c.to_digit(10)) else {
            return false;
        };
        let first = first as usize;
        if first == 0 {
            out.push_str(self.whole);
        } else if first <= group_count {
            self.push_group(first, out);
        } else {
            return false;
        }
        out.extend(chars);
        true
    }

    fn push_group(&self, index: usize, out: &mut String) {
        if let Some(group) = self.captures.get(index) {
            out.push_str(group.as_str());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use annotator_rules::RuleDefinition;

    fn render(pattern: &str, message: &str, matched: &str) -> String {
        let rule =
            CompiledRule::compile(&RuleDefinition::new("t", pattern).with_message(message))
                .unwrap();
        render_message(&rule, matched)
    }

    #[test]
    fn test_numbered_groups() {
        assert_eq!(render(r"(\d+)px", "found $1 pixels", "10px"), "found 10 pixels");
        assert_eq!(render(r"(\w)(\w)", "$2$1", "ab"), "ba");
    }

    #[test]
    fn test_whole_match_tokens() {
        assert_eq!(render("TODO", "[$&] [$0]", "TODO"), "[TODO] [TODO]");
        assert_eq!(render("x", "cost: $$5", "x"), "cost: $5");
    }

    #[test]
    fn test_unknown_group_stays_literal() {
        assert_eq!(render("(a)", "$2 and $1", "a"), "$2 and a");
        // `$12` with one group: group 1 followed by a literal `2`.
        assert_eq!(render("(a)", "$12", "a"), "a2");
    }

    #[test]
    fn test_two_digit_group() {
        let pattern = "(a)(b)(c)(d)(e)(f)(g)(h)(i)(j)(k)";
        assert_eq!(render(pattern, "$11-$1", "abcdefghijk"), "k-a");
    }

    #[test]
    fn test_non_participating_group_is_empty() {
        assert_eq!(render("(a)|(b)", "<$2>", "a"), "<>");
    }

    #[test]
    fn test_named_groups() {
        assert_eq!(
            render(r"(?P<num>\d+)px", "px value $<num>", "12px"),
            "px value 12"
        );
        // Unknown name in a pattern that has named groups: empty.
        assert_eq!(render(r"(?P<num>\d+)", "[$<other>]", "1"), "[]");
        // No named groups at all: literal.
        assert_eq!(render(r"(\d+)", "[$<num>]", "1"), "[$<num>]");
    }

    #[test]
    fn test_prefix_and_suffix_tokens_on_partial_rematch() {
        // The re-match only covers part of the text handed in; the rest is kept around it.
        assert_eq!(render("b", "<$`|$'>", "abc"), "a<a|c>c");
    }

    #[test]
    fn test_mismatch_falls_back_to_matched_text() {
        let rule =
            CompiledRule::compile(&RuleDefinition::new("t", "^x$").with_message("msg")).unwrap();
        assert_eq!(render_message(&rule, "yyy"), "yyy");
        assert_eq!(
            try_render_message(&rule, "yyy"),
            Err(TemplateMismatchError {
                text: "yyy".to_string()
            })
        );
    }

    #[test]
    fn test_lone_dollar_is_literal() {
        assert_eq!(render("x", "costs $ and $<unclosed", "x"), "costs $ and $<unclosed");
    }
}
