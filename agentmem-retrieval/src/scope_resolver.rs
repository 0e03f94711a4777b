//! Scope Resolver. Pure, non-suspending except for the
//! `parent_scope` lookup against the storage driver.

use agentmem_core::errors::{CoreError, CoreResult};
use agentmem_core::model::{Scope, ScopeChain};
use agentmem_core::traits::StorageDriver;
use tracing::debug;

/// Expands `requested` into the ordered chain `[s0, ..., s_global]` used by
/// the Entry Fetcher and by the scope-proximity scoring term. When
/// `inherit` is false the chain is the singleton `[requested]`. Fails with
/// `NotFound` if `requested` is not a known scope id, regardless of
/// `inherit`.
pub fn resolve_scope_chain(
    storage: &dyn StorageDriver,
    requested: &Scope,
    inherit: bool,
) -> CoreResult<ScopeChain> {
    if !storage.scope_exists(requested)? {
        return Err(CoreError::not_found(format!(
            "unknown scope: {requested:?}"
        )));
    }

    if !inherit {
        return Ok(vec![requested.clone()]);
    }

    let mut chain = vec![requested.clone()];
    let mut current = requested.clone();
    while current != Scope::Global {
        match storage.parent_scope(&current)? {
            Some(parent) => {
                chain.push(parent.clone());
                current = parent;
            }
            None => {
                if current != Scope::Global {
                    chain.push(Scope::Global);
                }
                break;
            }
        }
    }

    debug!(chain_len = chain.len(), "resolved scope chain");
    Ok(chain)
}
