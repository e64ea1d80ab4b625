//! The three protocol requests the context pipeline depends on.

use async_trait::async_trait;
use stacky_core::{Scope, StackFrame, Variable};

use crate::client::DapClient;
use crate::error::Result;
use crate::protocol::{
    ScopesArguments, ScopesResponseBody, StackTraceArguments, StackTraceResponseBody,
    VariablesArguments, VariablesResponseBody,
};

/// A paused debug session seen as a request/response service.
///
/// Implementations must return frames and variables in the order the
/// adapter produced them.
#[async_trait]
pub trait DebugGateway: Send + Sync {
    async fn fetch_stack_trace(&self, thread_id: i64) -> Result<Vec<StackFrame>>;

    async fn fetch_scopes(&self, frame_id: i64) -> Result<Vec<Scope>>;

    async fn fetch_variables(&self, variables_reference: i64) -> Result<Vec<Variable>>;
}

#[async_trait]
impl DebugGateway for DapClient {
    async fn fetch_stack_trace(&self, thread_id: i64) -> Result<Vec<StackFrame>> {
        let args = StackTraceArguments {
            thread_id,
            start_frame: None,
            levels: None,
        };
        let body: StackTraceResponseBody = self
            .request("stackTrace", Some(serde_json::to_value(args)?))
            .await?;
        Ok(body.stack_frames)
    }

    async fn fetch_scopes(&self, frame_id: i64) -> Result<Vec<Scope>> {
        let body: ScopesResponseBody = self
            .request("scopes", Some(serde_json::to_value(ScopesArguments { frame_id })?))
            .await?;
        Ok(body.scopes)
    }

    async fn fetch_variables(&self, variables_reference: i64) -> Result<Vec<Variable>> {
        let args = VariablesArguments {
            variables_reference,
        };
        let body: VariablesResponseBody = self
            .request("variables", Some(serde_json::to_value(args)?))
            .await?;
        Ok(body.variables)
    }
}
