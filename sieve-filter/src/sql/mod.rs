//! SQL `WHERE` clause rendering.
//!
//! [`SqlRenderer`] walks an [`Expression`] and produces a fully parenthesized
//! boolean SQL expression, plus the literal values applied to each field.
//!
//! ```rust
//! use sieve_filter::{FilterArgument, FilterParser, SqlRenderer};
//!
//! let filter = FilterArgument::map_from_json(
//!     r#"{"or": [{"firstName": {"contains": "Saurabh"}}, {"lastName": {"equals": "Jaiswal"}}]}"#,
//! ).unwrap();
//! let tree = FilterParser::new().parse(&filter).unwrap().unwrap();
//!
//! let rendered = SqlRenderer::new().render(&tree).unwrap();
//! assert_eq!(
//!     rendered.sql,
//!     "WHERE ((firstName LIKE '%Saurabh%') OR (lastName = 'Jaiswal'))"
//! );
//! assert_eq!(rendered.metadata["filter.lastName"], vec!["Jaiswal".to_string()]);
//! ```
//!
//! A renderer holds no per-render state; it can be shared between threads and
//! used for any number of concurrent renders.

mod extension;
mod values;

pub use extension::{
    CustomExpressionResolver, CustomExpressions, CustomFieldExpression, FieldValueTransformer,
    LogicalOperator,
};
pub use values::{
    BetweenHandler, ContainsHandler, EndsHandler, InHandler, StartsHandler, ValueContext,
    ValueHandler, render_default,
};

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use smol_str::SmolStr;

use crate::ast::{BinaryExpression, CompoundExpression, Expression, Field, UnaryExpression, Value};
use crate::config::SieveConfig;
use crate::error::{FilterError, FilterResult};
use crate::normalize::{SqlValueNormalizer, unquote};
use crate::operator::{Operator, names};
use crate::visitor::ExpressionVisitor;

const RENDERER_NAME: &str = "sql";
const WHERE_PREFIX: &str = "WHERE ";

/// Default prefix of metadata keys.
pub const DEFAULT_METADATA_PREFIX: &str = "filter.";

/// Output of a render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderedFilter {
    /// The SQL text.
    pub sql: String,
    /// Literal values applied per field, keyed by `<prefix><field>`.
    pub metadata: IndexMap<String, Vec<String>>,
}

impl RenderedFilter {
    /// Check if nothing was rendered.
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

impl fmt::Display for RenderedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Renders expression trees as SQL.
#[derive(Clone)]
pub struct SqlRenderer {
    symbols: IndexMap<SmolStr, SmolStr>,
    handlers: IndexMap<SmolStr, Arc<dyn ValueHandler>>,
    field_map: IndexMap<String, String>,
    transformer: Option<Arc<dyn FieldValueTransformer>>,
    resolver: Option<Arc<dyn CustomExpressionResolver>>,
    normalizer: SqlValueNormalizer,
    where_prefix: bool,
    metadata_prefix: String,
    structured_payloads: bool,
}

impl fmt::Debug for SqlRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlRenderer")
            .field("symbols", &self.symbols)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("field_map", &self.field_map)
            .field("transformer", &self.transformer.is_some())
            .field("resolver", &self.resolver.is_some())
            .field("normalizer", &self.normalizer)
            .field("where_prefix", &self.where_prefix)
            .field("metadata_prefix", &self.metadata_prefix)
            .field("structured_payloads", &self.structured_payloads)
            .finish()
    }
}

impl Default for SqlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlRenderer {
    /// Create a renderer with the default symbol table and value handlers.
    pub fn new() -> Self {
        let symbols = [
            // Logical
            (names::AND, "AND"),
            (names::OR, "OR"),
            (names::NOT, "NOT"),
            // String
            (names::EQUALS, "="),
            (names::CONTAINS, "LIKE"),
            (names::STARTS, "LIKE"),
            (names::ENDS, "LIKE"),
            // Numeric
            (names::LT, "<"),
            (names::GT, ">"),
            (names::EQ, "="),
            (names::GTE, ">="),
            (names::LTE, "<="),
            // Range
            (names::IN, "IN"),
            (names::BETWEEN, "BETWEEN"),
        ]
        .into_iter()
        .map(|(name, symbol)| (SmolStr::new(name), SmolStr::new(symbol)))
        .collect();

        let mut handlers: IndexMap<SmolStr, Arc<dyn ValueHandler>> = IndexMap::new();
        handlers.insert(names::CONTAINS.into(), Arc::new(ContainsHandler));
        handlers.insert(names::STARTS.into(), Arc::new(StartsHandler));
        handlers.insert(names::ENDS.into(), Arc::new(EndsHandler));
        handlers.insert(names::BETWEEN.into(), Arc::new(BetweenHandler));
        handlers.insert(names::IN.into(), Arc::new(InHandler));

        Self {
            symbols,
            handlers,
            field_map: IndexMap::new(),
            transformer: None,
            resolver: None,
            normalizer: SqlValueNormalizer::new(),
            where_prefix: true,
            metadata_prefix: DEFAULT_METADATA_PREFIX.to_string(),
            structured_payloads: true,
        }
    }

    /// Create a renderer from the `[render]` section of a configuration.
    pub fn from_config(config: &SieveConfig) -> Self {
        let render = &config.render;
        let mut renderer = Self::new()
            .where_prefix(render.where_prefix)
            .metadata_prefix(render.metadata_prefix.clone())
            .structured_payloads(render.structured_payloads)
            .field_map(render.field_map.clone());
        for (name, symbol) in &render.operator_symbols {
            renderer = renderer.operator_symbol(name.as_str(), symbol.as_str());
        }
        renderer
    }

    /// Replace the field rename map. Renamed fields skip the transformer.
    pub fn field_map<I, K, V>(mut self, map: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.field_map = map.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    /// Rename one field.
    pub fn rename_field(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.field_map.insert(field.into(), column.into());
        self
    }

    /// Install a field/value transformer.
    pub fn field_value_transformer(mut self, transformer: impl FieldValueTransformer + 'static) -> Self {
        self.transformer = Some(Arc::new(transformer));
        self
    }

    /// Install a custom expression resolver.
    pub fn custom_expression_resolver(
        mut self,
        resolver: impl CustomExpressionResolver + 'static,
    ) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Replace the string normalizer.
    pub fn normalizer(mut self, normalizer: SqlValueNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Toggle the leading `WHERE `.
    pub fn where_prefix(mut self, enabled: bool) -> Self {
        self.where_prefix = enabled;
        self
    }

    /// Set the prefix of metadata keys.
    pub fn metadata_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.metadata_prefix = prefix.into();
        self
    }

    /// Toggle pass-through of JSON payloads to custom expressions.
    pub fn structured_payloads(mut self, enabled: bool) -> Self {
        self.structured_payloads = enabled;
        self
    }

    /// Add or replace the SQL symbol of an operator.
    pub fn operator_symbol(mut self, operator: impl Into<SmolStr>, symbol: impl Into<SmolStr>) -> Self {
        self.symbols.insert(operator.into(), symbol.into());
        self
    }

    /// Remove the SQL symbol of an operator; rendering it then fails.
    pub fn remove_operator_symbol(mut self, operator: &str) -> Self {
        self.symbols.shift_remove(operator);
        self
    }

    /// Install a value handler for an operator.
    pub fn value_handler(mut self, operator: impl Into<SmolStr>, handler: impl ValueHandler + 'static) -> Self {
        self.handlers.insert(operator.into(), Arc::new(handler));
        self
    }

    /// The SQL symbol of an operator, if it has one.
    pub fn symbol(&self, operator: &Operator) -> Option<&str> {
        self.symbols.get(operator.name()).map(SmolStr::as_str)
    }

    fn require_symbol(&self, operator: &Operator) -> FilterResult<&str> {
        self.symbol(operator)
            .ok_or_else(|| FilterError::unsupported_operator(operator.name(), RENDERER_NAME))
    }

    /// Render a tree.
    pub fn render(&self, tree: &Expression) -> FilterResult<RenderedFilter> {
        let mut traversal = SqlTraversal::new(self);
        let sql = traversal.render(tree)?;
        crate::sieve_debug!(sql = %sql, fields = traversal.metadata.len(), "Rendered SQL filter");
        Ok(RenderedFilter {
            sql,
            metadata: traversal.metadata,
        })
    }

    /// Render the result of a parse. No expression renders as empty output.
    pub fn render_optional(&self, tree: Option<&Expression>) -> FilterResult<RenderedFilter> {
        match tree {
            Some(tree) => self.render(tree),
            None => Ok(RenderedFilter::default()),
        }
    }
}

/// Field seen by the traversal, waiting for its value.
struct PendingField {
    name: String,
    transformed: bool,
}

/// State of one render call.
struct SqlTraversal<'r> {
    renderer: &'r SqlRenderer,
    operators: Vec<Operator>,
    fields: Vec<PendingField>,
    literals: Vec<String>,
    metadata: IndexMap<String, Vec<String>>,
}

impl<'r> SqlTraversal<'r> {
    fn new(renderer: &'r SqlRenderer) -> Self {
        Self {
            renderer,
            operators: Vec::new(),
            fields: Vec::new(),
            literals: Vec::new(),
            metadata: IndexMap::new(),
        }
    }

    fn record(&mut self, node: &BinaryExpression) {
        let key = format!("{}{}", self.renderer.metadata_prefix, node.field.name());
        self.metadata
            .entry(key)
            .or_default()
            .extend(node.value.scalars().iter().map(ToString::to_string));
    }

    /// Hand a comparison to a custom expression.
    ///
    /// `literals` holds each scalar of the (transformed) value rendered on its
    /// own, so a multi-value comparison calls the generator once per scalar.
    fn render_custom(
        &self,
        custom: &dyn CustomFieldExpression,
        node: &BinaryExpression,
        field: &str,
        symbol: &str,
        value: &str,
        literals: &[String],
    ) -> FilterResult<String> {
        if !node.value.is_list() || node.operator.is(names::BETWEEN) {
            return Ok(format!("({})", custom.generate_expression(node, field, value, symbol)));
        }

        if let [only] = literals {
            if self.renderer.structured_payloads && is_structured_payload(node.field.name(), only)? {
                crate::sieve_trace!(field = node.field.name(), "Passing structured payload through");
                return Ok(format!("({})", custom.generate_expression(node, field, value, symbol)));
            }
        }

        let fragments: Vec<String> = literals
            .iter()
            .map(|literal| format!("({})", custom.generate_expression(node, field, literal, symbol)))
            .collect();
        let joiner = format!(" {} ", custom.enclosing_logical_operator());
        Ok(format!("({})", fragments.join(&joiner)))
    }
}

impl ExpressionVisitor for SqlTraversal<'_> {
    type Output = String;

    fn seed(&self) -> String {
        if self.renderer.where_prefix {
            WHERE_PREFIX.to_string()
        } else {
            String::new()
        }
    }

    fn visit_compound(&mut self, node: &CompoundExpression, mut acc: String) -> FilterResult<String> {
        let renderer = self.renderer;
        let symbol = renderer.require_symbol(&node.operator)?;
        let left = node.left.accept(self, String::new())?;
        let right = node.right.accept(self, String::new())?;
        acc.push_str(&format!("({} {} {})", left, symbol, right));
        Ok(acc)
    }

    fn visit_binary(&mut self, node: &BinaryExpression, mut acc: String) -> FilterResult<String> {
        let renderer = self.renderer;
        let symbol = renderer.require_symbol(&node.operator)?;
        self.record(node);

        let field = node.field.accept(self, String::new())?;
        self.operators.push(node.operator.clone());
        let value = node.value.accept(self, String::new())?;
        let literals = std::mem::take(&mut self.literals);

        let custom = renderer
            .resolver
            .as_deref()
            .filter(|resolver| resolver.contains(node.field.name(), &node.operator))
            .and_then(|resolver| resolver.resolve(node.field.name(), &node.operator));

        let rendered = match custom {
            Some(custom) => self.render_custom(custom, node, &field, symbol, &value, &literals)?,
            None => format!("({} {} {})", field, symbol, value),
        };
        acc.push_str(&rendered);
        Ok(acc)
    }

    fn visit_unary(&mut self, node: &UnaryExpression, mut acc: String) -> FilterResult<String> {
        let renderer = self.renderer;
        let symbol = renderer.require_symbol(&node.operator)?;
        let operand = node.operand.accept(self, String::new())?;
        acc.push_str(&format!("( {} {})", symbol, operand));
        Ok(acc)
    }

    fn visit_field(&mut self, node: &Field, mut acc: String) -> FilterResult<String> {
        let name = node.name();
        let (column, transformed) = match self.renderer.field_map.get(name) {
            Some(column) => (column.clone(), false),
            None => match self
                .renderer
                .transformer
                .as_ref()
                .and_then(|transformer| transformer.transform_field(name))
            {
                Some(column) => (column, true),
                None => (name.to_string(), false),
            },
        };

        self.fields.push(PendingField {
            name: name.to_string(),
            transformed,
        });
        acc.push_str(&column);
        Ok(acc)
    }

    fn visit_value(&mut self, node: &Value, mut acc: String) -> FilterResult<String> {
        let (Some(operator), Some(field)) = (self.operators.pop(), self.fields.pop()) else {
            return Err(FilterError::UnsupportedValue {
                message: "value rendered outside of a comparison".to_string(),
            });
        };

        let mut value = Cow::Borrowed(node);
        if field.transformed {
            if let Some((_, replaced)) = self
                .renderer
                .transformer
                .as_ref()
                .and_then(|transformer| transformer.transform_value(&field.name, node))
            {
                value = Cow::Owned(replaced);
            }
        }

        let ctx = ValueContext::new(&operator, &field.name, &self.renderer.normalizer);
        if self.renderer.resolver.is_some() {
            self.literals = value.scalars().iter().map(|scalar| ctx.literal(scalar)).collect();
        }
        match self.renderer.handlers.get(operator.name()) {
            Some(handler) => handler.handle(&ctx, &value, &mut acc)?,
            None => render_default(&ctx, &value, &mut acc),
        }
        Ok(acc)
    }
}

fn strip_parens(text: &str) -> Option<&str> {
    text.strip_prefix('(').and_then(|rest| rest.strip_suffix(')'))
}

/// Check whether one rendered literal carries a JSON object or array.
///
/// Text that looks structured but does not parse is an error.
fn is_structured_payload(field: &str, text: &str) -> FilterResult<bool> {
    let candidate = strip_parens(text).unwrap_or(text).trim();
    let candidate = unquote(candidate).unwrap_or(candidate);
    let looks_structured = (candidate.starts_with('{') || candidate.starts_with('['))
        && (candidate.ends_with('}') || candidate.ends_with(']'));
    if !looks_structured {
        return Ok(false);
    }

    let payload = candidate.replace("''", "'");
    serde_json::from_str::<serde_json::Value>(&payload).map_err(|source| FilterError::MalformedPayload {
        field: field.to_string(),
        source,
    })?;
    Ok(true)
}
