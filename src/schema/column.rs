//! Column descriptors: how one schema attribute is found in the header and how its cells are
//! validated and converted.

use std::fmt;
use std::sync::Arc;

use regex::{Regex, RegexBuilder};

use crate::error::{BindError, BindResult};
use crate::types::{DataType, Value};

/// Validator callback. Must return [`Value::Bool`]; anything else is a configuration error.
pub type Validator = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// How a column recognizes its header cell.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Whole-cell text equality.
    Literal(String),
    /// Unanchored regex search within the cell text.
    Pattern(Regex),
}

/// Declaration of one schema column.
///
/// Columns are immutable once added to a [`super::Schema`]; the cell index a column binds to
/// lives in the resolution result, not here.
#[derive(Clone)]
pub struct Column {
    matcher: Matcher,
    /// Case-insensitive recompilation of a regex matcher, used while `ignore_case` is set.
    folded: Option<Regex>,
    /// Recompilation failure, reported by `SchemaBuilder::build`.
    fold_error: Option<regex::Error>,
    ignore_case: bool,
    required: bool,
    default: Option<Value>,
    skip_invalid_row: bool,
    validator: Option<Validator>,
    declared_type: Option<DataType>,
}

impl Column {
    /// A required column matched by exact header text.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_matcher(Matcher::Literal(name.into()))
    }

    /// A required column matched by a precompiled regex.
    pub fn regex(regex: Regex) -> Self {
        Self::with_matcher(Matcher::Pattern(regex))
    }

    /// A required column matched by a regex compiled from `pattern`.
    pub fn pattern(pattern: &str) -> BindResult<Self> {
        Ok(Self::regex(Regex::new(pattern)?))
    }

    fn with_matcher(matcher: Matcher) -> Self {
        Self {
            matcher,
            folded: None,
            fold_error: None,
            ignore_case: false,
            required: true,
            default: None,
            skip_invalid_row: false,
            validator: None,
            declared_type: None,
        }
    }

    /// Compare case-insensitively.
    ///
    /// Literal matchers compare case-folded text. Regex matchers get a case-insensitive copy;
    /// `false` leaves the caller's regex, and whatever flags it was built with, in charge.
    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self.folded = None;
        self.fold_error = None;
        if let (true, Matcher::Pattern(re)) = (ignore_case, &self.matcher) {
            match RegexBuilder::new(re.as_str()).case_insensitive(true).build() {
                Ok(folded) => self.folded = Some(folded),
                Err(e) => self.fold_error = Some(e),
            }
        }
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Shorthand for `required(false)`.
    pub fn optional(self) -> Self {
        self.required(false)
    }

    /// Value used when the column is unbound or the row has no value at its position.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Drop rows rejected by this column's validator instead of failing the read.
    pub fn skip_invalid_row(mut self, skip: bool) -> Self {
        self.skip_invalid_row = skip;
        self
    }

    /// Attach a raw validator. It must return [`Value::Bool`].
    pub fn validator<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(f));
        self
    }

    /// Attach a boolean predicate as validator.
    pub fn check<F>(self, f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.validator(move |v| Value::Bool(f(v)))
    }

    /// Convert bound cells into `data_type` using the schema's converter table.
    pub fn declared_type(mut self, data_type: DataType) -> Self {
        self.declared_type = Some(data_type);
        self
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_ignore_case(&self) -> bool {
        self.ignore_case
    }

    pub fn skips_invalid_row(&self) -> bool {
        self.skip_invalid_row
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn data_type(&self) -> Option<&DataType> {
        self.declared_type.as_ref()
    }

    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    /// The literal text or regex source, used to name the column in diagnostics.
    pub fn pattern_text(&self) -> &str {
        match &self.matcher {
            Matcher::Literal(name) => name,
            Matcher::Pattern(re) => re.as_str(),
        }
    }

    /// Error from recompiling the regex case-insensitively, if that failed.
    pub(crate) fn fold_error(&self) -> Option<&regex::Error> {
        self.fold_error.as_ref()
    }

    /// Whether a rendered header cell belongs to this column.
    pub fn matching(&self, cell_text: &str) -> bool {
        match &self.matcher {
            Matcher::Literal(name) if self.ignore_case => fold_case(cell_text) == fold_case(name),
            Matcher::Literal(name) => cell_text == name,
            Matcher::Pattern(re) => self.folded.as_ref().unwrap_or(re).is_match(cell_text),
        }
    }

    /// Run the validator, if any, against one cell.
    pub fn validate(&self, value: &Value) -> BindResult<bool> {
        let Some(validator) = &self.validator else {
            return Ok(true);
        };
        match validator(value) {
            Value::Bool(ok) => Ok(ok),
            other => Err(BindError::IncompatibleValidatorReturn {
                column: self.pattern_text().to_string(),
                returned: other.type_name().to_string(),
            }),
        }
    }
}

/// Caseless form of `text`: lowercase, with the full folds std's lowercasing leaves out
/// (`ß`/`ẞ` to `ss`, final sigma to `σ`, long s to `s`).
fn fold_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        match c {
            'ß' => out.push_str("ss"),
            'ς' => out.push('σ'),
            'ſ' => out.push('s'),
            other => out.push(other),
        }
    }
    out
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("matcher", &self.matcher)
            .field("ignore_case", &self.ignore_case)
            .field("folded", &self.folded.is_some())
            .field("required", &self.required)
            .field("default", &self.default)
            .field("skip_invalid_row", &self.skip_invalid_row)
            .field("validator_set", &self.validator.is_some())
            .field("declared_type", &self.declared_type)
            .finish()
    }
}
