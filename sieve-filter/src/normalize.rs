//! String safety for SQL literals.
//!
//! Every string that ends up between single quotes in rendered SQL goes
//! through [`SqlValueNormalizer`]: the text is put in Unicode composed form
//! (NFC), typographic apostrophes (`’`) become plain ones, and every `'` is
//! doubled exactly once.
//!
//! ```rust
//! use sieve_filter::normalize::SqlValueNormalizer;
//!
//! let normalizer = SqlValueNormalizer::new();
//! assert_eq!(normalizer.literal("Jais'wal"), "'Jais''wal'");
//! assert_eq!(normalizer.handle("('O’Brien', 'Smith')"), "('O''Brien', 'Smith')");
//! ```

use std::fmt;
use std::sync::Arc;

use unicode_normalization::UnicodeNormalization;

const QUOTE: char = '\'';
const ESCAPED_QUOTE: &str = "''";
const RIGHT_SINGLE_QUOTATION_MARK: char = '\u{2019}';

/// Transform applied to the escaped content of every quoted literal.
pub type LiteralTransform = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Escapes and quotes string values for SQL output.
#[derive(Clone, Default)]
pub struct SqlValueNormalizer {
    transform: Option<LiteralTransform>,
}

impl fmt::Debug for SqlValueNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlValueNormalizer")
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

impl SqlValueNormalizer {
    /// Create a normalizer without a literal transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a normalizer that post-processes quoted content, e.g. for case folding.
    pub fn with_transform<F>(transform: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            transform: Some(Arc::new(transform)),
        }
    }

    /// NFC-normalize, straighten typographic apostrophes and double every `'`.
    pub fn escape(raw: &str) -> String {
        let composed: String = raw.nfc().collect();
        let mut escaped = String::with_capacity(composed.len() + 2);
        for c in composed.chars() {
            match c {
                QUOTE | RIGHT_SINGLE_QUOTATION_MARK => escaped.push_str(ESCAPED_QUOTE),
                c => escaped.push(c),
            }
        }
        escaped
    }

    /// Escape a raw value and wrap it in single quotes.
    pub fn literal(&self, raw: &str) -> String {
        self.quoted(Self::escape(raw))
    }

    /// Escape a raw value and wrap it in quotes with unescaped `prefix`/`suffix`
    /// around it, as used for `LIKE` patterns.
    pub fn pattern(&self, prefix: &str, raw: &str, suffix: &str) -> String {
        self.quoted(format!("{}{}{}", prefix, Self::escape(raw), suffix))
    }

    fn quoted(&self, content: String) -> String {
        let content = match &self.transform {
            Some(transform) => transform(&content),
            None => content,
        };
        format!("{QUOTE}{content}{QUOTE}")
    }

    /// Normalize raw value text in one of three shapes:
    ///
    /// - a parenthesized list `(a, 'b', c)`: each top-level item is normalized
    ///   on its own and the delimiters are kept,
    /// - a quoted value `'b'`: the content is escaped and transformed,
    /// - anything else is escaped as-is.
    pub fn handle(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        match text.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
            Some(inner) => {
                let items: Vec<String> = split_list(inner)
                    .into_iter()
                    .map(|item| self.sanitize_item(item))
                    .collect();
                format!("({})", items.join(","))
            }
            None => self.sanitize(text),
        }
    }

    fn sanitize_item(&self, item: &str) -> String {
        let core = item.trim();
        let start = item.len() - item.trim_start().len();
        let end = start + core.len();
        format!("{}{}{}", &item[..start], self.sanitize(core), &item[end..])
    }

    fn sanitize(&self, text: &str) -> String {
        match unquote(text) {
            Some(inner) => self.literal(inner),
            None => Self::escape(text),
        }
    }
}

/// Strip one pair of surrounding single quotes.
pub(crate) fn unquote(text: &str) -> Option<&str> {
    if text.len() >= 2 {
        text.strip_prefix(QUOTE).and_then(|rest| rest.strip_suffix(QUOTE))
    } else {
        None
    }
}

/// Split list content on top-level commas.
///
/// A `'` at the start of an item opens a quoted value. Inside it, a `'` only
/// closes the value when the next non-blank character is a `,` or the end of
/// the input, so commas and apostrophes within quoted text do not split.
/// Items are returned untrimmed.
pub fn split_list(inner: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut item_start = 0;
    let mut in_quote = false;
    let mut at_item_start = true;

    for (idx, c) in inner.char_indices() {
        if in_quote {
            if c == QUOTE && closes_quote(&inner[idx + 1..]) {
                in_quote = false;
            }
            continue;
        }
        match c {
            ',' => {
                items.push(&inner[item_start..idx]);
                item_start = idx + 1;
                at_item_start = true;
            }
            QUOTE if at_item_start => {
                in_quote = true;
                at_item_start = false;
            }
            c if c.is_whitespace() => {}
            _ => at_item_start = false,
        }
    }
    items.push(&inner[item_start..]);
    items
}

fn closes_quote(rest: &str) -> bool {
    let rest = rest.trim_start();
    rest.is_empty() || rest.starts_with(',')
}
