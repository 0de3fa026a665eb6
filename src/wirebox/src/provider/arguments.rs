use std::any;
use std::vec;

use snafu::prelude::*;

use crate::provider::Managed;
use crate::util::any::AsAny;

/// The dependencies resolved for one instantiation, consumed positionally in
/// ascending parameter order.
pub struct Arguments {
    values: vec::IntoIter<Box<dyn Managed>>,
    consumed: usize,
}

impl Arguments {
    pub(crate) fn new(values: Vec<Box<dyn Managed>>) -> Self {
        Self {
            values: values.into_iter(),
            consumed: 0,
        }
    }

    /// Takes the next argument, downcast to the parameter's declared type.
    pub fn take<T: Managed>(&mut self) -> Result<T, ArgumentError> {
        let index = self.consumed;
        let Some(value) = self.values.next() else {
            return Err(ArgumentError::Missing { index });
        };
        self.consumed += 1;
        match value.downcast::<T>() {
            Ok(object) => Ok(*object),
            Err(value) => Err(ArgumentError::Mismatched {
                index,
                expected: any::type_name::<T>(),
                actual: (*value).type_name(),
            }),
        }
    }

    /// Asserts every resolved argument was consumed.
    pub fn finish(self) -> Result<(), ArgumentError> {
        let remaining = self.values.len();
        if remaining == 0 {
            Ok(())
        } else {
            Err(ArgumentError::Surplus {
                index: self.consumed,
                remaining,
            })
        }
    }
}

/// Structural disagreement between a constructor and the annotations its
/// arguments were resolved from.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ArgumentError {
    #[snafu(display("no argument was resolved for parameter {index}"))]
    #[non_exhaustive]
    Missing { index: usize },
    #[snafu(display("parameter {index} expects a `{expected}`, got a `{actual}`"))]
    #[non_exhaustive]
    Mismatched {
        index: usize,
        expected: &'static str,
        actual: &'static str,
    },
    #[snafu(display("{remaining} surplus arguments were resolved past parameter {index}"))]
    #[non_exhaustive]
    Surplus { index: usize, remaining: usize },
}
