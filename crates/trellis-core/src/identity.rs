//! Value-comparable identity for one logical paginated query.

/// Identifies one logical paginated dataset: a query name plus the
/// serialized filter/sort/search parameters that shape the server query.
///
/// Two identities are equal iff they would produce the same server
/// query. Parameter segments are kept sorted by key, so equality does
/// not depend on the order the caller added them in.
///
/// # Example
///
/// ```
/// use trellis_core::QueryIdentity;
///
/// let a = QueryIdentity::new("maps")
///     .with_param("search", "dust")
///     .with_param("sort", "downloads");
/// let b = QueryIdentity::new("maps")
///     .with_param("sort", "downloads")
///     .with_param("search", "dust");
/// assert_eq!(a, b);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryIdentity {
    name: String,
    params: Vec<(String, String)>,
}

impl QueryIdentity {
    /// Creates an identity for the named query with no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Adds a serialized parameter segment, keeping segments sorted by
    /// key. Adding the same key twice keeps both segments; callers own
    /// parameter semantics, this type only compares them.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        let at = self
            .params
            .partition_point(|(existing, _)| existing.as_str() <= key.as_str());
        self.params.insert(at, (key, value));
        self
    }

    /// The logical query name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The serialized parameter segments, sorted by key.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

impl std::fmt::Display for QueryIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        for (key, value) in &self.params {
            write!(f, ";{key}={value}")?;
        }
        Ok(())
    }
}
