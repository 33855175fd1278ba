use crate::StackError;
use kube::api::{ApiResource, DynamicObject, GroupVersionKind};
use stackls_common::StackEntry;

pub const STACK_GROUP: &str = "compose.docker.com";
pub const STACK_VERSION: &str = "v1beta2";
pub const STACK_KIND: &str = "Stack";

const FORBIDDEN: u16 = 403;

/// The `stacks.compose.docker.com` custom resource
pub fn stack_resource() -> ApiResource {
    ApiResource::from_gvk(&GroupVersionKind::gvk(STACK_GROUP, STACK_VERSION, STACK_KIND))
}

pub fn entry_from_stack(stack: &DynamicObject) -> StackEntry {
    let metadata = &stack.metadata;

    let services = stack
        .data
        .get("spec")
        .and_then(|spec| spec.get("services"))
        .and_then(|services| services.as_array())
        .map(|services| services.len())
        .unwrap_or(0);

    StackEntry::new(
        metadata.name.clone().unwrap_or_default(),
        services,
        metadata.namespace.clone().unwrap_or_default(),
    )
}

/// Map a Kubernetes API failure onto the listing error kinds
///
/// Only an HTTP 403 from the API server counts as an authorization denial.
pub fn classify_error(err: kube::Error, scope: &str) -> StackError {
    match err {
        kube::Error::Api(response) if response.code == FORBIDDEN => {
            StackError::AuthorizationDenied(response.message)
        }
        other => StackError::Backend(format!("Failed to list stacks {}: {}", scope, other)),
    }
}
