//! Number converter
//!
//! Signed fields parse as `i64`, unsigned as `u64`, floats as `f64`, then
//! narrow to the field's width. Parsing is plain decimal, locale-free.

use super::Converter;
use crate::error::{BindError, Result};
use crate::field::{Field, Kind};
use crate::parameter::Parameter;

/// Parses integer and float fields, passes on everything else
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberConverter;

impl Converter for NumberConverter {
    fn convert(&self, param: &Parameter, field: &mut dyn Field) -> Result<bool> {
        let raw = param.value.as_str();
        match field.type_info().kind {
            Kind::Int => {
                let num: i64 = raw.parse().map_err(|e| BindError::parse(raw, "int", e))?;
                field.set_int(num)?;
            }
            Kind::Uint => {
                let num: u64 = raw.parse().map_err(|e| BindError::parse(raw, "uint", e))?;
                field.set_uint(num)?;
            }
            Kind::Float => {
                let num: f64 = raw.parse().map_err(|e| BindError::parse(raw, "float", e))?;
                field.set_float(num)?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}
