//! Rule definitions: descriptive metadata bundled with an executable check.
//!
//! A check is a plain function `fn(&TableStore) -> CheckResult<ErrorLocations>`.
//! Declaring it as a rule attaches a code, message and the fields and tables it
//! concerns without changing how it is called: [`RuleDefinition::run`] forwards
//! straight to the function, and [`RuleDefinition::check`] hands the function
//! back untouched.
//!
//! # Example
//!
//! ```
//! use lac_model::{CheckResult, ErrorLocations, RuleDefinition, TableStore, rule};
//!
//! fn validate_sex(store: &TableStore) -> CheckResult<ErrorLocations> {
//!     let Some(_header) = store.table("Header") else {
//!         return Ok(ErrorLocations::new());
//!     };
//!     Ok(ErrorLocations::new())
//! }
//!
//! const RULE_101: RuleDefinition = rule! {
//!     code: "101",
//!     message: "Gender code is not valid.",
//!     fields: ["SEX"],
//!     tables: ["Header"],
//!     check: validate_sex,
//! };
//!
//! assert_eq!(RULE_101.code(), "101");
//! assert!(RULE_101.affected_fields().contains("SEX"));
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::CheckResult;
use crate::locations::ErrorLocations;
use crate::store::TableStore;

/// Signature every rule check implements.
pub type CheckFn = fn(&TableStore) -> CheckResult<ErrorLocations>;

/// One validation rule: metadata plus the check that enforces it.
///
/// Immutable once built. Equality and hashing use the metadata only; the check
/// function is identified by the rule's code.
#[derive(Clone, Copy)]
pub struct RuleDefinition {
    code: &'static str,
    message: &'static str,
    affected_fields: &'static [&'static str],
    affected_tables: &'static [&'static str],
    source: &'static str,
    check: CheckFn,
}

impl RuleDefinition {
    /// Declare a rule.
    ///
    /// # Panics
    ///
    /// Panics when `code` is empty. In a `const` declaration this is a compile error.
    pub const fn new(code: &'static str, message: &'static str, check: CheckFn) -> Self {
        assert!(!code.is_empty(), "rule code must not be empty");
        Self {
            code,
            message,
            affected_fields: &[],
            affected_tables: &[],
            source: "",
            check,
        }
    }

    /// Fields the rule reports against.
    #[must_use]
    pub const fn affecting(mut self, fields: &'static [&'static str]) -> Self {
        self.affected_fields = fields;
        self
    }

    /// Tables the rule is about. Informational: the check may read others.
    #[must_use]
    pub const fn in_tables(mut self, tables: &'static [&'static str]) -> Self {
        self.affected_tables = tables;
        self
    }

    /// Where the rule was declared, used to name both sides of a code collision.
    #[must_use]
    pub const fn declared_in(mut self, source: &'static str) -> Self {
        self.source = source;
        self
    }

    pub const fn code(&self) -> &'static str {
        self.code
    }

    pub const fn message(&self) -> &'static str {
        self.message
    }

    pub fn affected_fields(&self) -> BTreeSet<&'static str> {
        self.affected_fields.iter().copied().collect()
    }

    pub fn affected_tables(&self) -> BTreeSet<&'static str> {
        self.affected_tables.iter().copied().collect()
    }

    pub const fn source(&self) -> &'static str {
        self.source
    }

    /// The undecorated check function.
    pub const fn check(&self) -> CheckFn {
        self.check
    }

    /// Invoke the check exactly as the bare function would be invoked.
    pub fn run(&self, store: &TableStore) -> CheckResult<ErrorLocations> {
        (self.check)(store)
    }

    /// Whether the rule declares any of the given tables.
    ///
    /// Rules without declared tables concern every table.
    pub fn concerns_any<'a>(&self, mut tables: impl Iterator<Item = &'a str>) -> bool {
        self.affected_tables.is_empty() || tables.any(|t| self.affected_tables.contains(&t))
    }
}

impl fmt::Debug for RuleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleDefinition")
            .field("code", &self.code)
            .field("message", &self.message)
            .field("affected_fields", &self.affected_fields)
            .field("affected_tables", &self.affected_tables)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl PartialEq for RuleDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
            && self.message == other.message
            && self.affected_fields() == other.affected_fields()
            && self.affected_tables() == other.affected_tables()
            && self.source == other.source
    }
}

impl Eq for RuleDefinition {}

impl Hash for RuleDefinition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
        self.message.hash(state);
        self.affected_fields().hash(state);
        self.affected_tables().hash(state);
        self.source.hash(state);
    }
}

impl fmt::Display for RuleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Declare a [`RuleDefinition`], recording the declaring module and check
/// function as its source (`crate::module::check_fn`).
///
/// `fields` and `tables` are optional and must appear in that order.
#[macro_export]
macro_rules! rule {
    (
        code: $code:expr,
        message: $message:expr,
        $(fields: [$($field:expr),* $(,)?],)?
        $(tables: [$($table:expr),* $(,)?],)?
        check: $check:expr $(,)?
    ) => {
        $crate::RuleDefinition::new($code, $message, $check)
            $(.affecting(&[$($field),*]))?
            $(.in_tables(&[$($table),*]))?
            .declared_in(::core::concat!(
                ::core::module_path!(),
                "::",
                ::core::stringify!($check)
            ))
    };
}
