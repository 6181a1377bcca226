//! Response body unwrapping.
//!
//! The API is inconsistent about envelopes: the same entity may arrive bare,
//! as `{data: T}`, as `{success, data: T}` or double wrapped as
//! `{data: {data: T}}`. Everything here peels those layers before decoding.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::entities::Page;
use crate::errors::{ClientError, ClientResult};

const MAX_ENVELOPE_DEPTH: usize = 2;

fn peel(body: Value) -> ClientResult<Value> {
    let mut current = body;
    for _ in 0..MAX_ENVELOPE_DEPTH {
        let inner = match &mut current {
            Value::Object(map) => {
                if let Some(Value::Bool(false)) = map.get("success") {
                    let message = map
                        .get("message")
                        .or_else(|| map.get("error"))
                        .and_then(Value::as_str)
                        .unwrap_or("request rejected by server")
                        .to_string();
                    return Err(ClientError::InvalidResponse(message));
                }
                let data = map.get("data");
                if matches!(data, Some(Value::Null)) {
                    return Err(ClientError::InvalidResponse(
                        "response envelope carries no data".into(),
                    ));
                }
                // a list page keeps its pagination next to the array
                if matches!(data, None | Some(Value::Array(_))) {
                    None
                } else {
                    map.remove("data")
                }
            }
            _ => None,
        };
        match inner {
            Some(inner) => current = inner,
            None => break,
        }
    }
    Ok(current)
}

/// Decodes a single entity. `context` names the call in the error message.
pub fn unwrap_entity<T: DeserializeOwned>(body: Value, context: &str) -> ClientResult<T> {
    let value = peel(body)?;
    serde_json::from_value(value).map_err(|e| {
        tracing::warn!(err = %e, context, "undecodable response body");
        ClientError::InvalidResponse(format!("Invalid response from server on {context}"))
    })
}

#[derive(Deserialize)]
struct RawPage<T> {
    #[serde(alias = "data", alias = "orders", alias = "results")]
    items: Vec<T>,
    #[serde(default, alias = "offset")]
    skip: Option<u64>,
    #[serde(default)]
    limit: Option<u64>,
    #[serde(default, alias = "count")]
    total: Option<u64>,
}

/// Decodes a list page, filling missing pagination from the request.
pub fn unwrap_page<T: DeserializeOwned>(
    body: Value,
    requested_skip: Option<u64>,
    requested_limit: Option<u64>,
    context: &str,
) -> ClientResult<Page<T>> {
    let value = peel(body)?;
    let invalid = |e: serde_json::Error| {
        tracing::warn!(err = %e, context, "undecodable list body");
        ClientError::InvalidResponse(format!("Invalid response from server on {context}"))
    };
    let raw = match value {
        Value::Array(_) => RawPage {
            items: serde_json::from_value(value).map_err(invalid)?,
            skip: None,
            limit: None,
            total: None,
        },
        other => serde_json::from_value::<RawPage<T>>(other).map_err(invalid)?,
    };
    let skip = raw.skip.or(requested_skip).unwrap_or(0);
    let count = raw.items.len() as u64;
    let limit = raw.limit.or(requested_limit).unwrap_or(count);
    let total = raw.total.unwrap_or(skip + count);
    Ok(Page::new(raw.items, skip, limit, total))
}
