use super::request::{ListRequest, NamespaceQuery};

/// Turn a request into the sequence of backend queries to issue
///
/// An all-namespaces request is a single unscoped query. Otherwise there is
/// one query per distinct namespace, in lexicographic order. No namespaces
/// means no queries.
pub fn resolve(request: &ListRequest) -> Vec<NamespaceQuery> {
    if request.all_namespaces {
        return vec![NamespaceQuery::AllNamespaces];
    }

    request
        .namespaces
        .iter()
        .map(|ns| NamespaceQuery::Namespace(ns.clone()))
        .collect()
}
