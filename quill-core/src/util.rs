use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut first = true;
    for v in values {
        if !first {
            out.push_str(separator);
        }
        first = false;
        f(out, v);
    }
}

/// Hash any value with the standard hasher, used for cache keys.
pub fn hash_of<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Alias of the table at `index`: `a`, `b`, ..., `z`, `t26`, `t27`, ...
pub fn table_alias(index: usize) -> String {
    if index < 26 {
        ((b'a' + index as u8) as char).to_string()
    } else {
        format!("t{}", index)
    }
}

#[macro_export]
macro_rules! possibly_parenthesized {
    ($buff:ident, $cond:expr, $v:expr) => {
        if $cond {
            $buff.push('(');
            $v;
            $buff.push(')');
        } else {
            $v;
        }
    };
}

/// Largest char boundary of `value` not past `max`.
pub fn char_boundary(value: &str, max: usize) -> usize {
    if value.len() <= max {
        return value.len();
    }
    (0..=max).rev().find(|i| value.is_char_boundary(*i)).unwrap_or(0)
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {{
        let query: &str = &$query;
        let end = $crate::char_boundary(query, 497);
        format!(
            "{}{}",
            query[..end].trim_end(),
            if end < query.len() { "..." } else { "" }
        )
    }};
}
