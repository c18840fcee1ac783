//! # Value conversion
//!
//! [`set_value`] writes one [`Parameter`] into one [`Field`]:
//!
//! 1. Each configured [`Converter`] is offered the value in registration
//!    order. The first that reports `true` (value assigned) or fails ends
//!    the chain.
//! 2. Otherwise the built-in rules apply by target kind:
//!    - string fields take `String` and `SecureString` parameters verbatim
//!    - `Vec<T>` fields take `StringList` parameters only; every element is
//!      converted recursively as a plain `String` parameter
//!    - anything else is unsupported
//!
//! Numbers, durations and timestamps are never guessed by the built-in
//! rules. They need the bundled converters:
//!
//! | Converter | Target | Builder option |
//! |-----------|--------|----------------|
//! | [`DurationConverter`] | `std::time::Duration` | `with_parse_duration` |
//! | [`TimeConverter`] | `chrono::DateTime<Utc>` | `with_parse_time` |
//! | [`NumberConverter`] | integers, floats | `with_parse_number` |

mod duration;
mod number;
mod time;

pub use duration::{parse_duration, DurationConverter};
pub use number::NumberConverter;
pub use time::{TimeConverter, TimeLayout};

use std::sync::Arc;

use crate::error::{BindError, Result};
use crate::field::{Field, Kind};
use crate::parameter::{Parameter, ParameterKind};

/// Pluggable conversion for types the built-in rules do not cover
///
/// Implementations decide applicability from the *target* type and return
/// `Ok(false)` to pass. Returning `Ok(true)` means the value was assigned.
pub trait Converter: Send + Sync {
    fn convert(&self, param: &Parameter, field: &mut dyn Field) -> Result<bool>;
}

impl<F> Converter for F
where
    F: Fn(&Parameter, &mut dyn Field) -> Result<bool> + Send + Sync,
{
    fn convert(&self, param: &Parameter, field: &mut dyn Field) -> Result<bool> {
        self(param, field)
    }
}

/// Shared, ordered converter chain
pub type Converters = [Arc<dyn Converter>];

/// Convert `param` into `field`, converters first, built-in rules second
pub fn set_value(converters: &Converters, param: &Parameter, field: &mut dyn Field) -> Result<()> {
    for converter in converters {
        if converter.convert(param, field)? {
            return Ok(());
        }
    }

    let info = field.type_info();
    match info.kind {
        Kind::String => match param.kind {
            ParameterKind::String | ParameterKind::SecureString => field.set_str(&param.value),
            other => Err(BindError::TypeMismatch {
                from: other,
                to: info.name,
            }),
        },
        Kind::Seq => {
            // No implicit single-element wrapping
            if param.kind != ParameterKind::StringList {
                return Err(BindError::TypeMismatch {
                    from: param.kind,
                    to: info.name,
                });
            }
            let parts = param.elements();
            field.set_seq(parts.len(), &mut |index, elem| {
                let elem_param = Parameter::string(param.name.as_str(), parts[index]);
                set_value(converters, &elem_param, elem).map_err(|e| BindError::Element {
                    index,
                    source: Box::new(e),
                })
            })
        }
        kind => Err(BindError::Unsupported {
            kind,
            type_name: info.name,
        }),
    }
}
