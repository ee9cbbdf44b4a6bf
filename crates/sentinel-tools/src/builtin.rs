//! Built-in fiscal tools.
//!
//! These are the tools the planning stage can mark as required. They stand
//! in for the real SAT-facing integrations; swapping them for live
//! implementations only means registering different handlers under the
//! same names.
use serde_json::json;

use crate::registry::{Tool, ToolError};

pub fn builtin_tools() -> Vec<Tool> {
    vec![consultar_cfdi(), validar_rfc(), calcular_impuestos()]
}

fn consultar_cfdi() -> Tool {
    Tool::new(
        "consultar_cfdi",
        "Look up CFDI invoice guidance relevant to a question",
        json!({
            "type": "object",
            "properties": {
                "question": { "type": "string", "description": "The user's question" }
            },
            "required": ["question"]
        }),
        |params| {
            let question = params
                .get("question")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ToolError::InvalidParams("missing 'question'".to_string()))?;
            Ok(format!("CFDI lookup completed for: {question}"))
        },
    )
}

fn validar_rfc() -> Tool {
    Tool::new(
        "validar_rfc",
        "Validate the format of an RFC taxpayer id",
        json!({
            "type": "object",
            "properties": {
                "rfc": { "type": "string", "description": "RFC to validate" }
            },
            "required": ["rfc"]
        }),
        |params| {
            let rfc = params
                .get("rfc")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ToolError::InvalidParams("missing 'rfc'".to_string()))?;
            // Format check only: 12 chars for companies, 13 for individuals.
            let well_formed = (rfc.len() == 12 || rfc.len() == 13)
                && rfc.chars().all(|c| c.is_ascii_alphanumeric());
            if well_formed {
                Ok(format!("RFC {} is well-formed", rfc.to_uppercase()))
            } else {
                Ok(format!("RFC {rfc} is not well-formed"))
            }
        },
    )
}

fn calcular_impuestos() -> Tool {
    Tool::new(
        "calcular_impuestos",
        "Calculate IVA over a taxable amount",
        json!({
            "type": "object",
            "properties": {
                "amount": { "type": "number", "description": "Taxable amount in MXN" }
            },
            "required": ["amount"]
        }),
        |params| {
            let amount = params
                .get("amount")
                .and_then(|v| v.as_f64())
                .ok_or_else(|| ToolError::InvalidParams("missing 'amount'".to_string()))?;
            if amount < 0.0 {
                return Err(ToolError::ExecutionFailed(
                    "amount must be non-negative".to_string(),
                ));
            }
            let iva = amount * 0.16;
            Ok(format!("IVA at 16% over {amount:.2} MXN is {iva:.2} MXN"))
        },
    )
}
