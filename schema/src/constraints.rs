// schema/src/constraints.rs
use std::fmt;
use regex::Regex;
use serde_json::Value;
use once_cell::sync::Lazy;
use crate::errors::SchemaError;

/// Same pattern the portal uses everywhere an e-mail address is typed in.
pub static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern compiles")
});

/// A predicate over a JSON value, for checks no declarative constraint covers.
#[derive(Clone, Copy)]
pub struct CustomCheck(pub fn(&Value) -> bool);

impl fmt::Debug for CustomCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomCheck(..)")
    }
}

/// A single check applied to the value found at a field path.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Must be present: not null, not a blank string and not an empty list.
    Required,

    /// Minimum number of characters for strings.
    MinLength(usize),

    /// Maximum number of characters for strings.
    MaxLength(usize),

    /// Must match the regex. Numbers are matched against their decimal rendering.
    Format(Regex),

    /// Must be a valid e-mail address.
    ValidateEmail,

    /// Lower bound for numbers (inclusive). Numeric strings are accepted.
    Min(f64),

    /// Upper bound for numbers (inclusive).
    Max(f64),

    /// Lists must hold at least this many entries. A missing list counts as empty.
    MinItems(usize),

    /// Checkbox that has to be ticked.
    MustBeTrue,

    /// Only allows values from a predefined set.
    Enum(Vec<String>),

    /// A custom validation function, e.g. an identity number checksum.
    CustomValidator { name: &'static str, check: CustomCheck },
}

impl Constraint {
    pub fn format(pattern: &str) -> Result<Self, SchemaError> {
        Regex::new(pattern)
            .map(Constraint::Format)
            .map_err(|e| SchemaError::InvalidPattern(format!("{}: {}", pattern, e)))
    }

    /// Whether this constraint still has something to say about a blank value.
    fn applies_to_blank(&self) -> bool {
        matches!(self, Constraint::Required | Constraint::MinItems(_) | Constraint::MustBeTrue)
    }

    /// Returns the default message for a violation, or `None` when the value passes.
    pub fn check(&self, label: &str, value: Option<&Value>) -> Option<String> {
        if is_blank(value) && !self.applies_to_blank() {
            return None;
        }
        match self {
            Constraint::Required => is_blank(value).then(|| format!("{} is required", label)),
            Constraint::MinLength(min) => {
                let len = as_text(value).map(|s| s.trim().chars().count()).unwrap_or(0);
                (len < *min).then(|| format!("{} must be at least {} characters", label, min))
            }
            Constraint::MaxLength(max) => {
                let len = as_text(value).map(|s| s.chars().count()).unwrap_or(0);
                (len > *max).then(|| format!("{} must be at most {} characters", label, max))
            }
            Constraint::Format(re) => match as_text(value) {
                Some(text) if re.is_match(text.trim()) => None,
                _ => Some(format!("Invalid {} format", label.to_lowercase())),
            },
            Constraint::ValidateEmail => match as_text(value) {
                Some(text) if EMAIL_RE.is_match(text.trim()) => None,
                _ => Some("Invalid email format".to_string()),
            },
            Constraint::Min(min) => match as_number(value) {
                Some(n) if n >= *min => None,
                Some(_) => Some(format!("{} must be at least {}", label, min)),
                None => Some(format!("{} must be a number", label)),
            },
            Constraint::Max(max) => match as_number(value) {
                Some(n) if n <= *max => None,
                Some(_) => Some(format!("{} must be at most {}", label, max)),
                None => Some(format!("{} must be a number", label)),
            },
            Constraint::MinItems(min) => {
                let len = value.and_then(Value::as_array).map(Vec::len).unwrap_or(0);
                (len < *min).then(|| format!("{} requires at least {} entr{}", label, min, if *min == 1 { "y" } else { "ies" }))
            }
            Constraint::MustBeTrue => {
                (value != Some(&Value::Bool(true))).then(|| format!("{} must be accepted", label))
            }
            Constraint::Enum(allowed) => match as_text(value) {
                Some(text) if allowed.iter().any(|a| a.as_str() == text.as_ref()) => None,
                _ => Some(format!("{} must be one of: {}", label, allowed.join(", "))),
            },
            Constraint::CustomValidator { check, .. } => match value {
                Some(v) if (check.0)(v) => None,
                _ => Some(format!("Invalid {}", label.to_lowercase())),
            },
        }
    }
}

/// Null, missing, whitespace-only strings and empty lists are all "not filled in".
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        _ => false,
    }
}

fn as_text(value: Option<&Value>) -> Option<std::borrow::Cow<'_, str>> {
    match value? {
        Value::String(s) => Some(std::borrow::Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(std::borrow::Cow::Owned(n.to_string())),
        _ => None,
    }
}

fn as_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Turns `postalCode` into `Postal code`.
pub fn humanize(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len() + 4);
    for (i, ch) in segment.chars().enumerate() {
        if i == 0 {
            out.extend(ch.to_uppercase());
        } else if ch.is_ascii_uppercase() {
            out.push(' ');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// The rule for one field path, e.g. `personalInfo.address.postalCode` or
/// `emergencyContacts[].phoneNumber`. A `[]` suffix fans out over every list entry.
#[derive(Debug, Clone)]
pub struct FieldRule {
    /// Dotted camelCase path into the serialised form.
    pub path: String,
    /// Human label used in default messages.
    pub label: String,
    /// Checks in evaluation order; the first failure wins.
    pub constraints: Vec<Constraint>,
    /// Replaces the default message of any failing constraint.
    pub message: Option<String>,
    /// Path of a boolean flag; the rule only applies while that flag is `true`.
    pub when: Option<String>,
    /// Hard-stop rules surface as a blocking alert, not just inline text.
    pub hard_stop: bool,
}

impl FieldRule {
    pub fn new(path: &str) -> Self {
        let last = path.rsplit('.').next().unwrap_or(path).trim_end_matches("[]");
        FieldRule {
            path: path.to_string(),
            label: humanize(last),
            constraints: Vec::new(),
            message: None,
            when: None,
            hard_stop: false,
        }
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn with(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn required(self) -> Self {
        self.with(Constraint::Required)
    }

    pub fn min_length(self, min: usize) -> Self {
        self.with(Constraint::MinLength(min))
    }

    pub fn format(self, re: &Regex) -> Self {
        self.with(Constraint::Format(re.clone()))
    }

    pub fn email(self) -> Self {
        self.with(Constraint::ValidateEmail)
    }

    pub fn range(self, min: f64, max: f64) -> Self {
        self.with(Constraint::Min(min)).with(Constraint::Max(max))
    }

    pub fn min(self, min: f64) -> Self {
        self.with(Constraint::Min(min))
    }

    pub fn min_items(self, min: usize) -> Self {
        self.with(Constraint::MinItems(min))
    }

    pub fn must_be_true(self) -> Self {
        self.with(Constraint::MustBeTrue)
    }

    pub fn custom(self, name: &'static str, check: fn(&Value) -> bool) -> Self {
        self.with(Constraint::CustomValidator { name, check: CustomCheck(check) })
    }

    pub fn message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    pub fn when(mut self, flag_path: &str) -> Self {
        self.when = Some(flag_path.to_string());
        self
    }

    pub fn hard_stop(mut self) -> Self {
        self.hard_stop = true;
        self
    }

    /// Evaluates the rule against every concrete field its path resolves to.
    pub fn evaluate(&self, root: &Value) -> Vec<(String, Option<String>)> {
        if let Some(flag) = &self.when {
            let active = resolve(root, flag)
                .into_iter()
                .next()
                .map(|(_, v)| v == Some(&Value::Bool(true)))
                .unwrap_or(false);
            if !active {
                return Vec::new();
            }
        }

        resolve(root, &self.path)
            .into_iter()
            .map(|(concrete, value)| {
                let failure = self
                    .constraints
                    .iter()
                    .find_map(|c| c.check(&self.label, value))
                    .map(|default| self.message.clone().unwrap_or(default));
                (concrete, failure)
            })
            .collect()
    }
}

/// Resolves a rule path to `(concrete_path, value)` pairs. `[]` segments expand
/// to one pair per entry (`emergencyContacts.0.name`); a missing list expands to none.
pub fn resolve<'a>(root: &'a Value, path: &str) -> Vec<(String, Option<&'a Value>)> {
    let mut frontier: Vec<(String, Option<&'a Value>)> = vec![(String::new(), Some(root))];
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        let (key, fan_out) = match segment.strip_suffix("[]") {
            Some(key) => (key, true),
            None => (segment, false),
        };
        let mut next = Vec::new();
        for (prefix, value) in frontier {
            let child = value.and_then(|v| v.get(key));
            let child_path = if prefix.is_empty() { key.to_string() } else { format!("{}.{}", prefix, key) };
            if fan_out {
                if let Some(items) = child.and_then(Value::as_array) {
                    for (i, item) in items.iter().enumerate() {
                        next.push((format!("{}.{}", child_path, i), Some(item)));
                    }
                }
            } else {
                next.push((child_path, child));
            }
        }
        frontier = next;
    }
    frontier
}
