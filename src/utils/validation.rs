// file: src/utils/validation.rs
// description: tool argument validation helpers
// reference: input validation patterns

use crate::error::{AdapterError, Result};
use chrono::NaiveDate;
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d";
const MAX_DAYS: u32 = 36_500;

pub struct Validator;

impl Validator {
    /// Applies the default when absent and clamps to the ceiling.
    pub fn validate_max_results(
        requested: Option<i64>,
        default: usize,
        ceiling: usize,
    ) -> Result<usize> {
        let Some(n) = requested else {
            return Ok(default.min(ceiling));
        };

        if n <= 0 {
            return Err(AdapterError::InvalidRequest(format!(
                "max_results must be greater than 0, got {}",
                n
            )));
        }

        match usize::try_from(n) {
            Ok(n) if n <= ceiling => Ok(n),
            _ => {
                debug!("Clamping max_results {} to {}", n, ceiling);
                Ok(ceiling)
            }
        }
    }

    pub fn require_non_blank<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str> {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(AdapterError::InvalidRequest(format!(
                "{} must not be empty",
                name
            ))),
        }
    }

    /// Blank strings count as absent.
    pub fn non_blank(value: Option<&str>) -> Option<&str> {
        value.map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn parse_date(name: &str, value: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
            AdapterError::InvalidRequest(format!(
                "{} must be a date in YYYY-MM-DD form, got '{}': {}",
                name, value, e
            ))
        })
    }

    pub fn parse_optional_date(name: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
        Self::non_blank(value)
            .map(|v| Self::parse_date(name, v))
            .transpose()
    }

    pub fn validate_days(days: i64) -> Result<u32> {
        if days <= 0 {
            return Err(AdapterError::InvalidRequest(format!(
                "days must be greater than 0, got {}",
                days
            )));
        }

        match u32::try_from(days) {
            Ok(days) if days <= MAX_DAYS => Ok(days),
            _ => Err(AdapterError::InvalidRequest(format!(
                "days too large (max {})",
                MAX_DAYS
            ))),
        }
    }
}
