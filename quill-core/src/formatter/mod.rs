mod standard;

pub use standard::*;

use crate::{Cache, Deferred, Result, SqlSegment, TypeKey, Visitor};
use std::{borrow::Cow, fmt, sync::LazyLock};

/// Reflection handle of a member access, `o.created_at.year` or `DateTime::now`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberInfo {
    pub declaring: TypeKey,
    pub name: Cow<'static, str>,
    pub is_static: bool,
}

/// Reflection handle of a method call, the parameter types tell overloads apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodInfo {
    pub declaring: TypeKey,
    pub name: Cow<'static, str>,
    pub is_static: bool,
    pub params: Vec<TypeKey>,
}

/// Arguments accepted by a formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Params {
    /// A member, or a method without arguments.
    None,
    Exact(&'static [TypeKey]),
    /// Any number of arguments, at least the given one.
    Variadic(usize),
}

impl Params {
    fn accepts(&self, params: &[TypeKey]) -> bool {
        match self {
            Params::None => params.is_empty(),
            Params::Exact(types) => {
                types.len() == params.len() && types.iter().zip(params).all(|(a, b)| a.accepts(b))
            }
            Params::Variadic(min) => params.len() >= *min,
        }
    }
}

/// Operands handed to a formatter.
#[derive(Debug)]
pub struct FormatCall {
    pub name: Cow<'static, str>,
    pub receiver: Option<SqlSegment>,
    pub args: Vec<SqlSegment>,
    /// Pending operators, non empty only for negatable formatters.
    pub deferred: Deferred,
}

impl FormatCall {
    /// Receiver followed by the arguments.
    pub fn operands(self) -> Vec<SqlSegment> {
        self.receiver.into_iter().chain(self.args).collect()
    }
}

pub type Formatter =
    Box<dyn Fn(&mut Visitor<'_>, FormatCall) -> Result<SqlSegment> + Send + Sync>;

pub struct FormatterEntry {
    pub declaring: TypeKey,
    pub name: &'static str,
    pub is_static: bool,
    pub params: Params,
    /// Consumes the pending NOT operators producing the negated SQL form.
    pub negatable: bool,
    pub format: Formatter,
}

impl FormatterEntry {
    pub fn method<F>(declaring: TypeKey, name: &'static str, params: Params, format: F) -> Self
    where
        F: Fn(&mut Visitor<'_>, FormatCall) -> Result<SqlSegment> + Send + Sync + 'static,
    {
        Self {
            declaring,
            name,
            is_static: false,
            params,
            negatable: false,
            format: Box::new(format),
        }
    }

    pub fn static_method<F>(
        declaring: TypeKey,
        name: &'static str,
        params: Params,
        format: F,
    ) -> Self
    where
        F: Fn(&mut Visitor<'_>, FormatCall) -> Result<SqlSegment> + Send + Sync + 'static,
    {
        Self {
            is_static: true,
            ..Self::method(declaring, name, params, format)
        }
    }

    pub fn member<F>(declaring: TypeKey, name: &'static str, format: F) -> Self
    where
        F: Fn(&mut Visitor<'_>, FormatCall) -> Result<SqlSegment> + Send + Sync + 'static,
    {
        Self::method(declaring, name, Params::None, format)
    }

    pub fn static_member<F>(declaring: TypeKey, name: &'static str, format: F) -> Self
    where
        F: Fn(&mut Visitor<'_>, FormatCall) -> Result<SqlSegment> + Send + Sync + 'static,
    {
        Self::static_method(declaring, name, Params::None, format)
    }

    pub fn negatable(mut self) -> Self {
        self.negatable = true;
        self
    }

    fn matches_member(&self, info: &MemberInfo) -> bool {
        self.params == Params::None
            && self.name == info.name
            && self.is_static == info.is_static
            && self.declares(info.declaring)
    }

    fn matches_method(&self, info: &MethodInfo) -> bool {
        self.name == info.name
            && self.is_static == info.is_static
            && self.declares(info.declaring)
            && self.params.accepts(&info.params)
    }

    fn declares(&self, declaring: TypeKey) -> bool {
        if self.is_static {
            self.declaring == declaring
        } else {
            self.declaring.accepts(&declaring)
        }
    }
}

impl fmt::Debug for FormatterEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatterEntry")
            .field("declaring", &self.declaring)
            .field("name", &self.name)
            .field("is_static", &self.is_static)
            .field("params", &self.params)
            .field("negatable", &self.negatable)
            .finish()
    }
}

/// Ordered table of formatters of one dialect.
///
/// The dialect entries come before the standard ones, the first structural match wins. Lookups
/// are memoized per reflection handle.
pub struct FormatterRegistry {
    entries: Vec<FormatterEntry>,
    members: Cache<MemberInfo, Option<usize>>,
    methods: Cache<MethodInfo, Option<usize>>,
}

impl FormatterRegistry {
    pub fn new(dialect: Vec<FormatterEntry>) -> Self {
        let mut entries = dialect;
        entries.extend(standard_entries());
        Self {
            entries,
            members: Cache::new(),
            methods: Cache::new(),
        }
    }

    pub fn entries(&self) -> &[FormatterEntry] {
        &self.entries
    }

    pub fn try_get_member_access_formatter(&self, info: &MemberInfo) -> Option<&FormatterEntry> {
        self.members
            .get_or_insert_with(info.clone(), || {
                Ok(self.entries.iter().position(|v| v.matches_member(info)))
            })
            .ok()
            .flatten()
            .map(|i| &self.entries[i])
    }

    /// Method formatter, a method without arguments also matches the member formatters.
    pub fn try_get_method_call_formatter(&self, info: &MethodInfo) -> Option<&FormatterEntry> {
        self.methods
            .get_or_insert_with(info.clone(), || {
                Ok(self.entries.iter().position(|v| v.matches_method(info)))
            })
            .ok()
            .flatten()
            .map(|i| &self.entries[i])
    }

    /// Number of memoized lookups.
    pub fn memoized(&self) -> usize {
        self.members.len() + self.methods.len()
    }
}

/// Registry holding only the standard formatters.
pub static STANDARD: LazyLock<FormatterRegistry> =
    LazyLock::new(|| FormatterRegistry::new(Vec::new()));
