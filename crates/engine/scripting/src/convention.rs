//! Script/native calling convention
//!
//! Scripts count from 1 and pass vectors as three loose numbers; native code
//! counts from 0 and uses `Vec3`. Everything crossing the boundary goes
//! through the helpers here so arity, type and range checks are uniform.

use crate::BindingError;
use glam::Vec3;
use mlua::prelude::*;

/// Arguments of one bound call, receiver already removed
pub(crate) struct Args {
    method: &'static str,
    values: Vec<LuaValue>,
}

impl Args {
    pub(crate) fn new(method: &'static str, values: Vec<LuaValue>) -> Self {
        Self { method, values }
    }

    /// Require exactly `count` arguments
    pub(crate) fn expect(&self, count: usize) -> Result<(), BindingError> {
        if self.values.len() == count {
            Ok(())
        } else {
            Err(BindingError::argument(
                self.method,
                format!("expected {} argument(s), got {}", count, self.values.len()),
            ))
        }
    }

    /// Number at `position` (0-based, after the receiver)
    pub(crate) fn number(&self, position: usize) -> Result<f32, BindingError> {
        let value = self.get(position)?;
        lua_value_to_f64(value)
            .map(|n| n as f32)
            .ok_or_else(|| self.bad_type(position, "number", value))
    }

    /// Three numbers starting at `position`
    pub(crate) fn vec3(&self, position: usize) -> Result<Vec3, BindingError> {
        Ok(Vec3::new(
            self.number(position)?,
            self.number(position + 1)?,
            self.number(position + 2)?,
        ))
    }

    /// 1-based script index at `position`, converted to a 0-based index into
    /// a collection of `len` items
    pub(crate) fn index(&self, position: usize, len: usize) -> Result<usize, BindingError> {
        let value = self.get(position)?;
        let index = lua_value_to_integer(value)
            .ok_or_else(|| self.bad_type(position, "integer", value))?;
        script_to_native_index(index, len).ok_or_else(|| {
            BindingError::argument(
                self.method,
                format!("index {} out of range [1, {}]", index, len),
            )
        })
    }

    /// String at `position`
    pub(crate) fn string(&self, position: usize) -> Result<String, BindingError> {
        match self.get(position)? {
            LuaValue::String(s) => s
                .to_str()
                .map(|s| s.to_string())
                .map_err(|_| BindingError::argument(self.method, "string is not valid UTF-8")),
            other => Err(self.bad_type(position, "string", other)),
        }
    }

    fn get(&self, position: usize) -> Result<&LuaValue, BindingError> {
        self.values.get(position).ok_or_else(|| {
            BindingError::argument(self.method, format!("missing argument #{}", position + 1))
        })
    }

    fn bad_type(&self, position: usize, expected: &str, actual: &LuaValue) -> BindingError {
        BindingError::argument(
            self.method,
            format!(
                "argument #{}: expected {}, got {}",
                position + 1,
                expected,
                actual.type_name()
            ),
        )
    }
}

/// Convert a 1-based script index into a 0-based native index
///
/// Returns `None` for `0`, negatives and anything past `len`.
pub fn script_to_native_index(index: i64, len: usize) -> Option<usize> {
    if index >= 1 && (index as u64) <= len as u64 {
        Some(index as usize - 1)
    } else {
        None
    }
}

/// Convert a 0-based native index into the 1-based script convention
pub fn native_to_script_index(index: usize) -> i64 {
    index as i64 + 1
}

/// Convert a Lua value to f64, handling both integers and numbers
pub fn lua_value_to_f64(val: &LuaValue) -> Option<f64> {
    match val {
        LuaValue::Number(n) => Some(*n),
        LuaValue::Integer(i) => Some(*i as f64),
        _ => None,
    }
}

/// Convert a Lua value to an integer, accepting integral floats
pub fn lua_value_to_integer(val: &LuaValue) -> Option<i64> {
    match val {
        LuaValue::Integer(i) => Some(*i),
        LuaValue::Number(n) if n.fract() == 0.0 && n.is_finite() => Some(*n as i64),
        _ => None,
    }
}

/// Vector as three script numbers
pub(crate) fn vec3_out(v: Vec3) -> (f64, f64, f64) {
    (v.x as f64, v.y as f64, v.z as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_conversion() {
        assert_eq!(script_to_native_index(1, 3), Some(0));
        assert_eq!(script_to_native_index(3, 3), Some(2));
        assert_eq!(script_to_native_index(0, 3), None);
        assert_eq!(script_to_native_index(4, 3), None);
        assert_eq!(script_to_native_index(-1, 3), None);
        assert_eq!(script_to_native_index(1, 0), None);
        assert_eq!(native_to_script_index(0), 1);
    }

    #[test]
    fn test_integer_coercion() {
        assert_eq!(lua_value_to_integer(&LuaValue::Integer(2)), Some(2));
        assert_eq!(lua_value_to_integer(&LuaValue::Number(2.0)), Some(2));
        assert_eq!(lua_value_to_integer(&LuaValue::Number(2.5)), None);
        assert_eq!(lua_value_to_integer(&LuaValue::Boolean(true)), None);
    }

    #[test]
    fn test_arity_and_types() {
        let args = Args::new(
            "SetLocalPosition",
            vec![LuaValue::Integer(1), LuaValue::Number(2.5), LuaValue::Nil],
        );
        assert!(args.expect(3).is_ok());
        assert!(args.expect(2).is_err());
        assert_eq!(args.number(0).unwrap(), 1.0);
        assert_eq!(args.number(1).unwrap(), 2.5);

        let err = args.vec3(0).unwrap_err();
        assert_eq!(
            err,
            BindingError::Argument {
                method: "SetLocalPosition",
                message: "argument #3: expected number, got nil".to_string(),
            }
        );
    }

    #[test]
    fn test_index_argument() {
        let args = Args::new("GetChild", vec![LuaValue::Integer(3)]);
        assert_eq!(args.index(0, 3).unwrap(), 2);
        assert!(args.index(0, 2).is_err());
    }
}
