//! Result type alias for docmask
//!
//! Uses [`DocmaskError`] as the error type for every fallible library operation.

use super::errors::DocmaskError;

/// Result type alias for docmask operations
///
/// # Examples
///
/// ```
/// use docmask::domain::result::Result;
/// use docmask::domain::errors::DocmaskError;
///
/// fn failing_function() -> Result<()> {
///     Err(DocmaskError::UnsupportedFormat("pdf".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, DocmaskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
