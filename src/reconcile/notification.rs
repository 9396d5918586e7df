use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Payment { gateway_payment_id: String },
    MerchantOrder { order_id: String },
}

/// Decodes a raw webhook body into a notification. Gateway payloads are
/// loosely shaped: `data.id` arrives as a string or a number, and older
/// deliveries carry the id only in the top-level `resource` field. Anything
/// that does not yield an identifier is reported as `None` and dropped by
/// the caller.
pub fn parse(body: &Value) -> Option<Notification> {
    match body.get("topic").and_then(Value::as_str) {
        Some("payment") => {
            let gateway_payment_id = body
                .get("data")
                .and_then(|d| d.get("id"))
                .and_then(as_id_string)
                .or_else(|| body.get("resource").and_then(as_id_string))?;
            Some(Notification::Payment { gateway_payment_id })
        }
        Some("merchant_order") => {
            let resource = body.get("resource").and_then(Value::as_str)?;
            let order_id = resource.rsplit('/').next().filter(|s| !s.is_empty())?;
            Some(Notification::MerchantOrder {
                order_id: order_id.to_string(),
            })
        }
        _ => None,
    }
}

fn as_id_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
