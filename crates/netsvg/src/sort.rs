//! Reordering of layer elements.
//!
//! A [`SortSpec`] says how to order a layer: by a named attribute of the
//! bound entity, by a key extracted with a closure, or with a two-argument
//! comparator. Exactly one of the three must be given. Entities without a
//! sort value always go last, in either direction.

use std::{cmp::Ordering, fmt};

use crate::{error::NetSvgError, graph::AttrValue, resolve::AttributeSource, selection::Selection};

/// A sortable value extracted from an entity.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl SortKey {
    /// Converts an attribute value into a key. Lists sort by their text form.
    pub fn from_attr(value: &AttrValue) -> Self {
        match value {
            AttrValue::Bool(b) => Self::Bool(*b),
            AttrValue::Number(n) => Self::Number(*n),
            AttrValue::Text(s) => Self::Text(s.clone()),
            AttrValue::List(_) => Self::Text(value.to_string()),
        }
    }

    /// Total order over keys: booleans, then numbers, then text.
    pub fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Number(_) => 1,
            Self::Text(_) => 2,
        }
    }
}

impl From<f64> for SortKey {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<usize> for SortKey {
    fn from(value: usize) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for SortKey {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for SortKey {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SortKey {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

type KeyFn<'f, D> = Box<dyn Fn(&D) -> Option<SortKey> + 'f>;
type CmpFn<'f, D> = Box<dyn Fn(&D, &D) -> Ordering + 'f>;

/// How to order the elements of a layer.
///
/// # Examples
///
/// ```
/// use netsvg::sort::SortSpec;
/// use netsvg::graph::Attributes;
///
/// let by_size: SortSpec<'_, Attributes> = SortSpec::new().by("size").descending(true);
/// assert!(by_size.validate().is_ok());
///
/// let both: SortSpec<'_, Attributes> = SortSpec::new().by("size").key(|_| None);
/// assert!(both.validate().is_err());
/// ```
pub struct SortSpec<'f, D> {
    by: Option<String>,
    key: Option<KeyFn<'f, D>>,
    cmp: Option<CmpFn<'f, D>>,
    descending: bool,
}

impl<'f, D> SortSpec<'f, D> {
    /// Creates an empty spec. One ordering source must be set before use.
    pub fn new() -> Self {
        Self {
            by: None,
            key: None,
            cmp: None,
            descending: false,
        }
    }

    /// Orders by a named attribute of the bound entity.
    pub fn by(mut self, name: impl Into<String>) -> Self {
        self.by = Some(name.into());
        self
    }

    /// Orders by a key extracted from the bound entity.
    pub fn key<F>(mut self, f: F) -> Self
    where
        F: Fn(&D) -> Option<SortKey> + 'f,
    {
        self.key = Some(Box::new(f));
        self
    }

    /// Orders with a comparator over two bound entities.
    pub fn cmp<F>(mut self, f: F) -> Self
    where
        F: Fn(&D, &D) -> Ordering + 'f,
    {
        self.cmp = Some(Box::new(f));
        self
    }

    /// Reverses the order.
    pub fn descending(mut self, descending: bool) -> Self {
        self.descending = descending;
        self
    }

    /// Checks that exactly one ordering source is set.
    ///
    /// # Errors
    ///
    /// Returns [`NetSvgError::AmbiguousSortSpec`] otherwise.
    pub fn validate(&self) -> Result<(), NetSvgError> {
        let given = usize::from(self.by.is_some()) + usize::from(self.key.is_some()) + usize::from(self.cmp.is_some());
        if given == 1 {
            Ok(())
        } else {
            Err(NetSvgError::AmbiguousSortSpec { given })
        }
    }
}

impl<D> Default for SortSpec<'_, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> fmt::Debug for SortSpec<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortSpec")
            .field("by", &self.by)
            .field("key", &self.key.is_some())
            .field("cmp", &self.cmp.is_some())
            .field("descending", &self.descending)
            .finish()
    }
}

fn missing_last<T>(a: Option<T>, b: Option<T>, descending: bool, compare: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => {
            let order = compare(&a, &b);
            if descending { order.reverse() } else { order }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sorts a selection in place according to `spec` and reorders the document.
///
/// The sort is stable; only the order of elements changes, never which
/// entity an element is bound to.
///
/// # Errors
///
/// Returns [`NetSvgError::AmbiguousSortSpec`] if `spec` does not name exactly
/// one ordering source. The selection is left untouched in that case.
pub fn sort_selection<D>(selection: &mut Selection<D>, spec: &SortSpec<'_, D>) -> Result<(), NetSvgError>
where
    D: AttributeSource,
{
    spec.validate()?;
    let descending = spec.descending;

    if let Some(cmp) = &spec.cmp {
        selection.sort_by(|a, b| missing_last(a, b, descending, |a, b| cmp(*a, *b)));
    } else if let Some(key) = &spec.key {
        selection.sort_by(|a, b| {
            missing_last(a.and_then(|d| key(d)), b.and_then(|d| key(d)), descending, SortKey::compare)
        });
    } else if let Some(name) = &spec.by {
        let extract = |datum: Option<&D>| datum.and_then(|d| d.attribute(name)).map(SortKey::from_attr);
        selection.sort_by(|a, b| missing_last(extract(a), extract(b), descending, SortKey::compare));
    }
    Ok(())
}
