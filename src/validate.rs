use crate::{error::ValidationError, TypeDescriptor};

/// Checks that a mean can be computed over the given argument columns.
///
/// All arguments must be `int`, `float` or `double`, and they must all
/// share the exact same type.
///
/// Returns the number of accepted columns, which is used to size the accumulators.
///
/// # Errors
///
/// Returns the first problem found, scanning arguments from left to right.
pub fn validate(column_types: &[TypeDescriptor]) -> Result<usize, ValidationError> {
    if column_types.is_empty() {
        return Err(ValidationError::EmptyArguments);
    }

    let mut previous: Option<&TypeDescriptor> = None;

    for (index, ty) in column_types.iter().enumerate() {
        if !ty.is_mean_numeric() {
            return Err(ValidationError::NonPrimitiveType {
                index,
                actual: ty.clone(),
            });
        }

        if let Some(expected) = previous {
            if expected != ty {
                return Err(ValidationError::TypeMismatch {
                    index,
                    expected: expected.clone(),
                    actual: ty.clone(),
                });
            }
        }

        previous = Some(ty);
    }

    log::debug!(
        "accepted {} argument(s) of type {}",
        column_types.len(),
        column_types
            .first()
            .map(ToString::to_string)
            .unwrap_or_default()
    );

    Ok(column_types.len())
}
