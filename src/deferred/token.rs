//! Placeholder token grammar.
//!
//! ```text
//! token := "{_core_" type "_pattern_" [ ":" param ] "}"
//! type  := "node_id" | "backlinks" | "breadcrumbs" | "tags_footer" | "search_query"
//! param := { char - ( "}" | "\" | ">" | newline ) | "\}" | "\\" | "\>" | "\n" }
//! ```
//!
//! Tokens are single-line and never contain a bare `>`, so one can sit
//! inside an HTML comment. `search_query` carries `<qualifier>|-|<query>`.
//! Text written by users never contains a live token: the renderer passes
//! every user string through [`neutralize`] first.

use std::borrow::Cow;

pub const TOKEN_OPEN: &str = "{_core_";
const TYPE_END: &str = "_pattern_";
const QUERY_SEPARATOR: &str = "|-|";

/// What a search placeholder asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualifier {
    /// Pages carrying a tag.
    Tag,
    /// Full-text search.
    Content,
}

impl Qualifier {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Content => "content",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "tag" => Some(Self::Tag),
            "content" => Some(Self::Content),
            _ => None,
        }
    }
}

/// A parsed placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    NodeId(String),
    Backlinks,
    Breadcrumbs,
    TagsFooter,
    SearchQuery { qualifier: Qualifier, query: String },
}

impl Placeholder {
    /// Build a search placeholder from query block text.
    ///
    /// `tag:foo` selects the tag qualifier, anything else is full text.
    pub fn search(text: &str) -> Self {
        let text = text.trim();
        match text.strip_prefix("tag:") {
            Some(tag) => Self::SearchQuery {
                qualifier: Qualifier::Tag,
                query: tag.trim().trim_start_matches('#').to_string(),
            },
            None => Self::SearchQuery {
                qualifier: Qualifier::Content,
                query: text.to_string(),
            },
        }
    }

    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::NodeId(_) => "node_id",
            Self::Backlinks => "backlinks",
            Self::Breadcrumbs => "breadcrumbs",
            Self::TagsFooter => "tags_footer",
            Self::SearchQuery { .. } => "search_query",
        }
    }

    /// Serialize to the single-line token form.
    pub fn encode(&self) -> String {
        let param = match self {
            Self::NodeId(id) => Some(escape_param(id)),
            Self::SearchQuery { qualifier, query } => Some(format!(
                "{}{QUERY_SEPARATOR}{}",
                qualifier.as_str(),
                escape_param(query)
            )),
            _ => None,
        };
        match param {
            Some(param) => format!("{TOKEN_OPEN}{}{TYPE_END}:{param}}}", self.type_name()),
            None => format!("{TOKEN_OPEN}{}{TYPE_END}}}", self.type_name()),
        }
    }

    fn from_parts(type_name: &str, param: Option<String>) -> Option<Self> {
        match (type_name, param) {
            ("node_id", Some(id)) if !id.is_empty() => Some(Self::NodeId(id)),
            ("backlinks", None) => Some(Self::Backlinks),
            ("breadcrumbs", None) => Some(Self::Breadcrumbs),
            ("tags_footer", None) => Some(Self::TagsFooter),
            ("search_query", Some(param)) => {
                let (qualifier, query) = param.split_once(QUERY_SEPARATOR)?;
                Some(Self::SearchQuery {
                    qualifier: Qualifier::parse(qualifier)?,
                    query: query.to_string(),
                })
            }
            _ => None,
        }
    }
}

fn escape_param(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '}' => out.push_str("\\}"),
            '>' => out.push_str("\\>"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Make `{_core_` in user text inert by encoding its brace as an entity.
pub fn neutralize(text: &str) -> Cow<'_, str> {
    if text.contains(TOKEN_OPEN) {
        Cow::Owned(text.replace(TOKEN_OPEN, "&#123;_core_"))
    } else {
        Cow::Borrowed(text)
    }
}

// ============================================================================
// Scanner
// ============================================================================

/// Try to parse one token at the start of `text`.
///
/// Returns the placeholder and the token's byte length.
fn parse_token(text: &str) -> Option<(Placeholder, usize)> {
    let rest = text.strip_prefix(TOKEN_OPEN)?;
    let type_end = rest.find(TYPE_END)?;
    let type_name = &rest[..type_end];
    if type_name.is_empty() || !type_name.bytes().all(|b| b.is_ascii_lowercase() || b == b'_') {
        return None;
    }

    let after_type = &rest[type_end + TYPE_END.len()..];
    let consumed_before = TOKEN_OPEN.len() + type_end + TYPE_END.len();

    if after_type.starts_with('}') {
        let placeholder = Placeholder::from_parts(type_name, None)?;
        return Some((placeholder, consumed_before + 1));
    }

    let param_src = after_type.strip_prefix(':')?;
    let mut param = String::new();
    let mut chars = param_src.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '}' => {
                let placeholder = Placeholder::from_parts(type_name, Some(param))?;
                return Some((placeholder, consumed_before + 1 + i + 1));
            }
            '\\' => match chars.next() {
                Some((_, 'n')) => param.push('\n'),
                Some((_, escaped)) => param.push(escaped),
                None => return None,
            },
            '\n' => return None,
            _ => param.push(c),
        }
    }
    None
}

/// Rewrite every well-formed token in `text`.
///
/// `replace` returns the substitution, or `None` to keep the token as is.
/// Malformed tokens are ordinary text.
pub fn substitute(text: &str, mut replace: impl FnMut(&Placeholder) -> Option<String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(TOKEN_OPEN) {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];
        match parse_token(candidate) {
            Some((placeholder, len)) => {
                match replace(&placeholder) {
                    Some(replacement) => out.push_str(&replacement),
                    None => out.push_str(&candidate[..len]),
                }
                rest = &candidate[len..];
            }
            None => {
                out.push_str(TOKEN_OPEN);
                rest = &candidate[TOKEN_OPEN.len()..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// All well-formed tokens in `text`, in order.
pub fn tokens(text: &str) -> Vec<Placeholder> {
    let mut found = Vec::new();
    substitute(text, |placeholder| {
        found.push(placeholder.clone());
        None
    });
    found
}

/// The first node id token in `text`.
pub fn find_node_id(text: &str) -> Option<String> {
    tokens(text).into_iter().find_map(|placeholder| match placeholder {
        Placeholder::NodeId(id) => Some(id),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_forms() {
        assert_eq!(Placeholder::Backlinks.encode(), "{_core_backlinks_pattern_}");
        assert_eq!(
            Placeholder::NodeId("a/b".into()).encode(),
            "{_core_node_id_pattern_:a/b}"
        );
        assert_eq!(
            Placeholder::search("tag: #rust").encode(),
            "{_core_search_query_pattern_:tag|-|rust}"
        );
        assert_eq!(
            Placeholder::search("hello world").encode(),
            "{_core_search_query_pattern_:content|-|hello world}"
        );
    }

    #[test]
    fn test_escaped_params_survive() {
        let tricky = "weird}id\\with\nnewline";
        let token = Placeholder::NodeId(tricky.into()).encode();
        assert!(!token.contains('\n'));
        assert_eq!(find_node_id(&format!("x {token} y")).as_deref(), Some(tricky));

        let search = Placeholder::search("a } b |-| c");
        let text = format!("<div>{}</div>", search.encode());
        assert_eq!(tokens(&text), vec![search]);
    }

    #[test]
    fn test_params_cannot_close_a_comment() {
        let id = "a-->b --!> c";
        let token = Placeholder::NodeId(id.into()).encode();
        assert!(!token.contains('>'), "{token}");

        let page = format!("<!-- {token} -->\n<p>body</p>");
        assert_eq!(page.matches("-->").count(), 1);
        assert_eq!(find_node_id(&page).as_deref(), Some(id));
    }

    #[test]
    fn test_substitute_replaces_and_keeps() {
        let text = format!(
            "{}\n<main>{}</main>{}",
            Placeholder::NodeId("n".into()).encode(),
            Placeholder::Backlinks.encode(),
            Placeholder::TagsFooter.encode()
        );
        let out = substitute(&text, |p| match p {
            Placeholder::NodeId(_) => None,
            Placeholder::Backlinks => Some("<ul></ul>".into()),
            _ => Some(String::new()),
        });
        assert_eq!(out, "{_core_node_id_pattern_:n}\n<main><ul></ul></main>");
    }

    #[test]
    fn test_malformed_tokens_are_text() {
        for text in [
            "{_core_",
            "{_core_backlinks}",
            "{_core_unknown_pattern_}",
            "{_core_backlinks_pattern_:extra}",
            "{_core_node_id_pattern_}",
            "{_core_node_id_pattern_:unterminated",
            "{_core_node_id_pattern_:line\nbreak}",
            "{_core_search_query_pattern_:nope|-|x}",
        ] {
            assert_eq!(substitute(text, |_| Some("X".into())), text, "{text}");
        }
    }

    #[test]
    fn test_neutralize() {
        let user = "literal {_core_backlinks_pattern_} text";
        let safe = neutralize(user);
        assert!(tokens(&safe).is_empty());
        assert!(matches!(neutralize("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_adjacent_tokens() {
        let text = format!(
            "{}{}",
            Placeholder::Breadcrumbs.encode(),
            Placeholder::Backlinks.encode()
        );
        assert_eq!(
            tokens(&text),
            vec![Placeholder::Breadcrumbs, Placeholder::Backlinks]
        );
    }
}
