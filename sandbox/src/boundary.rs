//! Message types for the isolation boundary.
//!
//! When executions are supervised from another thread or process, requests
//! and responses cross the boundary as plain serializable records. Faults
//! travel as `kind` + `message` descriptors, never as rich in-process error
//! objects.

use serde::{Deserialize, Serialize};

use crate::outcome::{ExecutionOutcome, Fault};
use crate::protocol::ExecutionProtocol;

/// A request to evaluate one program against one input set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalRequest {
    pub program_text: String,
    pub inputs: Vec<String>,
}

/// A fault flattened for the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultDescriptor {
    pub kind: String,
    pub message: String,
}

impl From<&Fault> for FaultDescriptor {
    fn from(fault: &Fault) -> Self {
        Self {
            kind: fault.kind().to_string(),
            message: fault.message(),
        }
    }
}

/// The evaluation result crossing back over the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalResponse {
    pub value: Option<serde_json::Value>,
    pub steps: u64,
    pub fault: Option<FaultDescriptor>,
}

impl From<ExecutionOutcome> for EvalResponse {
    fn from(outcome: ExecutionOutcome) -> Self {
        Self {
            value: outcome.value,
            fault: outcome.fault.as_ref().map(FaultDescriptor::from),
            steps: outcome.steps,
        }
    }
}

/// Serves one [`EvalRequest`]: runs the full two-phase protocol and flattens
/// the outcome for the wire.
pub fn handle_request(protocol: &ExecutionProtocol, request: &EvalRequest, budget: u64) -> EvalResponse {
    protocol
        .run(&request.program_text, &request.inputs, budget)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_serde_round_trip() {
        let response = EvalResponse {
            value: Some(serde_json::json!([1, 2])),
            steps: 9,
            fault: Some(FaultDescriptor {
                kind: "script_runtime_error".into(),
                message: "boom".into(),
            }),
        };
        let json = serde_json::to_string(&response).unwrap();
        let back: EvalResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back, response);
    }

    #[test]
    fn test_fault_descriptor_from_fault() {
        let descriptor = FaultDescriptor::from(&Fault::InputExhausted);
        assert_eq!(descriptor.kind, "input_exhausted");
        assert!(!descriptor.message.is_empty());
    }

    #[test]
    fn test_handle_request_runs_both_phases() {
        let protocol = ExecutionProtocol::default();
        let request = EvalRequest {
            program_text: "let x = 20\nx * 2 + 2".to_string(),
            inputs: vec![],
        };
        let response = handle_request(&protocol, &request, 1000);
        assert_eq!(response.value, Some(serde_json::json!(42)));
        assert!(response.fault.is_none());
        assert!(response.steps > 0);
    }
}
