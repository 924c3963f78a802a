//! Tool service trait and request dispatch
//!
//! [`dispatch`] is transport-agnostic: the stdio loop and the SSE server
//! both feed parsed requests through it and deliver whatever response it
//! produces. Notifications (requests without an id) never produce one.

use crate::protocol::{
    InitializeResult, RpcRequest, RpcResponse, ServerInfo, ToolCallResult, ToolSpec,
    INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND, PROTOCOL_VERSION,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

/// A server-side tool catalogue
#[async_trait::async_trait]
pub trait ToolService: Send + Sync {
    /// Identification reported during initialize
    fn server_info(&self) -> ServerInfo;

    /// The published tool catalogue
    fn list_tools(&self) -> Vec<ToolSpec>;

    /// Invoke one tool by name.
    ///
    /// Failures are reported inside the result (`is_error`), never as a
    /// transport or protocol fault.
    async fn call_tool(&self, name: &str, arguments: Value) -> ToolCallResult;
}

#[derive(Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Dispatch one request against a service.
///
/// Returns `None` for notifications.
pub async fn dispatch(service: &dyn ToolService, request: RpcRequest) -> Option<RpcResponse> {
    let Some(id) = request.id else {
        debug!(method = %request.method, "Ignoring notification");
        return None;
    };

    let response = match request.method.as_str() {
        "initialize" => {
            let result = InitializeResult {
                protocol_version: PROTOCOL_VERSION.to_string(),
                capabilities: json!({"tools": {}}),
                server_info: Some(service.server_info()),
            };
            match serde_json::to_value(result) {
                Ok(value) => RpcResponse::success(id, value),
                Err(e) => RpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
            }
        }
        "tools/list" => RpcResponse::success(id, json!({"tools": service.list_tools()})),
        "tools/call" => {
            let params: CallParams =
                match serde_json::from_value(request.params.unwrap_or_else(|| json!({}))) {
                    Ok(params) => params,
                    Err(e) => {
                        return Some(RpcResponse::error(
                            id,
                            INVALID_PARAMS,
                            format!("invalid tools/call params: {e}"),
                        ))
                    }
                };
            let result = service.call_tool(&params.name, params.arguments).await;
            match serde_json::to_value(result) {
                Ok(value) => RpcResponse::success(id, value),
                Err(e) => RpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
            }
        }
        other => {
            warn!(method = %other, "Unknown method");
            RpcResponse::error(id, METHOD_NOT_FOUND, format!("unknown method '{other}'"))
        }
    };

    Some(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixtureService;

    #[async_trait::async_trait]
    impl ToolService for FixtureService {
        fn server_info(&self) -> ServerInfo {
            ServerInfo {
                name: "fixture".to_string(),
                version: Some("0.0.0".to_string()),
            }
        }

        fn list_tools(&self) -> Vec<ToolSpec> {
            vec![ToolSpec {
                name: "get_funds".to_string(),
                description: "Get funds".to_string(),
                input_schema: json!({"type": "object", "properties": {}}),
            }]
        }

        async fn call_tool(&self, name: &str, _arguments: Value) -> ToolCallResult {
            match name {
                "get_funds" => ToolCallResult::text(r#"{"status": "success"}"#),
                other => ToolCallResult::error(format!("tool '{other}' is not registered")),
            }
        }
    }

    #[tokio::test]
    async fn test_initialize() {
        let response = dispatch(&FixtureService, RpcRequest::new("initialize", 1))
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "fixture");
    }

    #[tokio::test]
    async fn test_tools_list() {
        let response = dispatch(&FixtureService, RpcRequest::new("tools/list", 2))
            .await
            .unwrap();
        let tools = &response.result.unwrap()["tools"];
        assert_eq!(tools[0]["name"], "get_funds");
    }

    #[tokio::test]
    async fn test_tools_call() {
        let request = RpcRequest::new("tools/call", 3)
            .with_params(json!({"name": "get_funds", "arguments": {}}));
        let response = dispatch(&FixtureService, request).await.unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["isError"], false);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_in_band_error() {
        let request = RpcRequest::new("tools/call", 4)
            .with_params(json!({"name": "nope", "arguments": {}}));
        let response = dispatch(&FixtureService, request).await.unwrap();
        // In-band tool failure, not a protocol error
        assert!(response.error.is_none());
        assert_eq!(response.result.unwrap()["isError"], true);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let response = dispatch(&FixtureService, RpcRequest::new("resources/list", 5))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_notification_gets_no_response() {
        let request = RpcRequest::notification("notifications/initialized");
        assert!(dispatch(&FixtureService, request).await.is_none());
    }
}
