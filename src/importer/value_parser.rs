// ==========================================
// 传感器日志导入系统 - 字段值类型还原
// ==========================================
// 职责: 将原始文本字段还原为类型化的值
// 规则: 布尔字面量 → 整数 → 浮点 → 原样保留为字符串
// 红线: 永不失败, 无法解释的文本一律作为字符串保留
// ==========================================

use crate::domain::TypedValue;

/// 历史数据中 code_version 存在 "21.0" 之类的浮点写法, 统一截断为整数
pub const CODE_VERSION_FIELD: &str = "code_version";

/// 将原始文本字段还原为类型化的值
///
/// # 参数
/// - field_name: 字段名（code_version 走专用整数规则）
/// - raw: 原始文本
pub fn coerce(field_name: &str, raw: &str) -> TypedValue {
    if field_name == CODE_VERSION_FIELD {
        if let Some(v) = parse_integer_truncating(raw) {
            return TypedValue::Int(v);
        }
        // 不可解析的 code_version 退回通用规则（保留原文）
    }
    coerce_literal(raw)
}

/// 通用字面量规则
///
/// 布尔拼写大小写不敏感（"true" / "FALSE" / "True" 均可识别）;
/// "nan" / "inf" 在历史日志中是占位文本, 不还原为浮点数
fn coerce_literal(raw: &str) -> TypedValue {
    match raw.to_ascii_lowercase().as_str() {
        "true" => return TypedValue::Bool(true),
        "false" => return TypedValue::Bool(false),
        _ => {}
    }

    if let Ok(i) = raw.parse::<i64>() {
        return TypedValue::Int(i);
    }

    if let Ok(f) = raw.parse::<f64>() {
        if f.is_finite() {
            return TypedValue::Float(f);
        }
    }

    TypedValue::Text(raw.to_string())
}

/// 按整数解释文本, 浮点写法截断小数部分（"21.0" → 21）
pub fn parse_integer_truncating(raw: &str) -> Option<i64> {
    if let Ok(i) = raw.parse::<i64>() {
        return Some(i);
    }
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() => Some(f.trunc() as i64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_spellings() {
        assert_eq!(coerce("charging", "true"), TypedValue::Bool(true));
        assert_eq!(coerce("charging", "FALSE"), TypedValue::Bool(false));
        assert_eq!(coerce("charging", "True"), TypedValue::Bool(true));
        assert_eq!(coerce("charging", "fAlSe"), TypedValue::Bool(false));
    }

    #[test]
    fn test_numeric_literals() {
        assert_eq!(coerce("step_count", "42"), TypedValue::Int(42));
        assert_eq!(coerce("voltage", "3.7"), TypedValue::Float(3.7));
        assert_eq!(coerce("latitude", "-43.47"), TypedValue::Float(-43.47));
    }

    #[test]
    fn test_unparseable_text_kept_verbatim() {
        assert_eq!(
            coerce("phone_ip", "10.0.0.17.x"),
            TypedValue::Text("10.0.0.17.x".to_string())
        );
        // 占位文本不还原为浮点
        assert_eq!(coerce("voltage", "nan"), TypedValue::Text("nan".to_string()));
        assert_eq!(coerce("voltage", "inf"), TypedValue::Text("inf".to_string()));
    }

    #[test]
    fn test_code_version_truncates_fractional_literal() {
        assert_eq!(coerce(CODE_VERSION_FIELD, "21.0"), TypedValue::Int(21));
        assert_eq!(coerce(CODE_VERSION_FIELD, "21.9"), TypedValue::Int(21));
        assert_eq!(coerce(CODE_VERSION_FIELD, "19"), TypedValue::Int(19));
    }

    #[test]
    fn test_code_version_garbage_stays_text() {
        assert_eq!(
            coerce(CODE_VERSION_FIELD, "v21-dev"),
            TypedValue::Text("v21-dev".to_string())
        );
    }

    #[test]
    fn test_parse_integer_truncating() {
        assert_eq!(parse_integer_truncating("21"), Some(21));
        assert_eq!(parse_integer_truncating("21.0"), Some(21));
        assert_eq!(parse_integer_truncating("20.9"), Some(20));
        assert_eq!(parse_integer_truncating(""), None);
        assert_eq!(parse_integer_truncating("nan"), None);
        assert_eq!(parse_integer_truncating("starting service"), None);
    }
}
