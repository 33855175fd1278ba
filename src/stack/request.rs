use std::collections::BTreeSet;

/// One listing invocation, as the caller asked for it
///
/// Built once at the entry point and only read afterwards. The namespace set
/// is ordered so that iterating it is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    pub namespaces: BTreeSet<String>,
    pub all_namespaces: bool,
    pub format: Option<String>,
}

impl ListRequest {
    pub fn new<I, S>(namespaces: I, all_namespaces: bool, format: Option<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            namespaces: namespaces.into_iter().map(Into::into).collect(),
            all_namespaces,
            format: format.filter(|f| !f.is_empty()),
        }
    }

    /// Copy of this request scoped to every namespace
    pub fn across_all_namespaces(&self) -> Self {
        Self {
            all_namespaces: true,
            ..self.clone()
        }
    }
}

/// A single backend query produced by namespace resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceQuery {
    AllNamespaces,
    Namespace(String),
}
