use stacky_core::{Scope, Variable};
use stacky_dap::DebugGateway;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Local,
    Global,
    Other,
}

impl ScopeKind {
    /// Case-insensitive substring match; "local" is tested before "global".
    pub fn classify(name: &str) -> Self {
        let name = name.to_lowercase();
        if name.contains("local") {
            ScopeKind::Local
        } else if name.contains("global") {
            ScopeKind::Global
        } else {
            ScopeKind::Other
        }
    }
}

/// Variables of the first local and first global scope, when present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedVariables {
    pub local: Option<Vec<Variable>>,
    pub global: Option<Vec<Variable>>,
}

/// First scope of each kind, in the order the adapter sent them.
pub fn select_scopes(scopes: &[Scope]) -> (Option<&Scope>, Option<&Scope>) {
    let first = |kind| scopes.iter().find(|s| ScopeKind::classify(&s.name) == kind);
    (first(ScopeKind::Local), first(ScopeKind::Global))
}

/// Fetch the selected scopes' variables. A failed fetch leaves that list absent.
pub async fn resolve_variables(gateway: &dyn DebugGateway, scopes: &[Scope]) -> ResolvedVariables {
    let (local, global) = select_scopes(scopes);
    ResolvedVariables {
        local: fetch(gateway, local).await,
        global: fetch(gateway, global).await,
    }
}

async fn fetch(gateway: &dyn DebugGateway, scope: Option<&Scope>) -> Option<Vec<Variable>> {
    let scope = scope?;
    match gateway.fetch_variables(scope.variables_reference).await {
        Ok(vars) => Some(vars),
        Err(e) => {
            warn!(scope = %scope.name, "Failed to fetch variables: {}", e);
            None
        }
    }
}
