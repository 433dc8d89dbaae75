use crate::runtime::value::Value;
use crate::types::types::GenericType;

/// Narrows an integer literal (parsed as `int64` by default) to the width
/// an implicit type asks for. Only literals are narrowed; computed values
/// never change width. Returns `None` when the target is not numeric.
pub fn convert_int64(n: i64, target: GenericType) -> Option<Value> {
    match target {
        GenericType::Int8 => Some(Value::Int8(n as i8)),
        GenericType::Int16 => Some(Value::Int16(n as i16)),
        GenericType::Int32 => Some(Value::Int32(n as i32)),
        GenericType::Int64 => Some(Value::Int64(n)),
        GenericType::Uint8 => Some(Value::Uint8(n as u8)),
        GenericType::Uint16 => Some(Value::Uint16(n as u16)),
        GenericType::Uint32 => Some(Value::Uint32(n as u32)),
        GenericType::Uint64 => Some(Value::Uint64(n as u64)),
        GenericType::Float32 => Some(Value::Float32(n as f32)),
        GenericType::Float64 => Some(Value::Float64(n as f64)),
        _ => None,
    }
}

/// Narrows a decimal literal (parsed as `float64` by default) to the float
/// width an implicit type asks for.
pub fn convert_float64(n: f64, target: GenericType) -> Option<Value> {
    match target {
        GenericType::Float32 => Some(Value::Float32(n as f32)),
        GenericType::Float64 => Some(Value::Float64(n)),
        _ => None,
    }
}
