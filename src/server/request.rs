//! 生成请求体解析与参数规整

use serde_json::{Map, Value};

use crate::provider::ImageSize;

use super::error::GenerateError;

/// 宽高限制
#[derive(Debug, Clone, Copy)]
pub struct DimensionLimits {
    /// 上限，超过时截断（不设下限）
    pub max: i64,
    /// 缺省值
    pub default: i64,
}

impl Default for DimensionLimits {
    fn default() -> Self {
        Self {
            max: 1024,
            default: 512,
        }
    }
}

/// 校验后的生成请求
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// 已去除首尾空白，保证非空
    pub prompt: String,
    pub size: ImageSize,
}

impl GenerationRequest {
    /// 从原始请求体解析
    ///
    /// 顺序：JSON 解析 → prompt 存在性 → 宽高转换 → prompt 非空
    pub fn parse(body: &[u8], limits: DimensionLimits) -> Result<Self, GenerateError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| GenerateError::Internal(format!("Invalid JSON body: {}", e)))?;

        let fields = match value {
            Value::Object(map) if !map.is_empty() => map,
            _ => return Err(GenerateError::MissingPrompt),
        };

        let prompt = match fields.get("prompt") {
            None => return Err(GenerateError::MissingPrompt),
            Some(Value::String(s)) => s.trim().to_string(),
            Some(other) => {
                return Err(GenerateError::Internal(format!(
                    "prompt must be a string, got {}",
                    json_type_name(other)
                )));
            }
        };

        let width = dimension(&fields, "width", limits)?;
        let height = dimension(&fields, "height", limits)?;

        if prompt.is_empty() {
            return Err(GenerateError::EmptyPrompt);
        }

        Ok(Self {
            prompt,
            size: ImageSize { width, height },
        })
    }
}

/// 读取单个宽高字段并截断到上限
fn dimension(
    fields: &Map<String, Value>,
    key: &str,
    limits: DimensionLimits,
) -> Result<i64, GenerateError> {
    let raw = match fields.get(key) {
        None => limits.default,
        Some(value) => coerce_integer(key, value)?,
    };
    Ok(raw.min(limits.max))
}

/// 宽松的整数转换：整数、浮点（截断）、布尔、数字字符串
fn coerce_integer(key: &str, value: &Value) -> Result<i64, GenerateError> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.is_finite() => Ok(f.trunc() as i64),
                _ => Err(GenerateError::Internal(format!("{} is out of range: {}", key, n))),
            }
        }
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| {
            GenerateError::Internal(format!("invalid integer for {}: '{}'", key, s))
        }),
        other => Err(GenerateError::Internal(format!(
            "{} must be an integer, got {}",
            key,
            json_type_name(other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
