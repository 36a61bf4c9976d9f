//! FX rate lookup and USD to local currency conversion.

use crate::domain::error::EtlError;
use serde_json::Value;

/// Units of target currency per one US dollar.
pub fn fx_rate(fx_document: &Value, target_currency: &str) -> Result<f64, EtlError> {
    let path = format!("fx.json.rates.{target_currency}");
    let raw = fx_document
        .get("rates")
        .and_then(|rates| rates.get(target_currency))
        .ok_or_else(|| EtlError::malformed(path.clone()))?;

    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| EtlError::malformed(path))
}

/// No rounding is applied.
pub fn to_local(price_usd: f64, fx_rate: f64) -> f64 {
    price_usd * fx_rate
}
