use serde_json::{Value, json};

/// Build the chat-completion body sent by every call in a batch.
///
/// The `response_format` pins the model to a strict JSON schema with the
/// fields `value` (boolean), `reason` (nullable string) and `confidence`
/// (number 0-100 or null).
pub fn verdict_payload(model: &str, seed: u64, prompt: &str) -> Value {
    json!({
        "model": model,
        "seed": seed,
        "messages": [{"role": "user", "content": prompt}],
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": "value",
                "strict": true,
                "schema": verdict_schema(),
            }
        }
    })
}

fn verdict_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "value": {
                "type": "boolean",
                "description": "Whether the vat notice is relevant to the item description."
            },
            "reason": {
                "type": "string",
                "nullable": true,
                "description": "A very short description of the reason for your answer. It should be no more than 100 characters."
            },
            "confidence": {
                "anyOf": [
                    {"type": "number", "minimum": 0, "maximum": 100},
                    {"type": "null"}
                ],
                "description": "The confidence score of the answer. It should be a number between 0 and 100."
            }
        },
        "required": ["value", "reason", "confidence"],
        "additionalProperties": false,
        "$schema": "http://json-schema.org/draft-07/schema#"
    })
}
