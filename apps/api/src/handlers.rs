use std::str::FromStr;

use rolegate_core::{AppError, AppResult};

pub mod authorization;
pub mod health;
pub mod permissions;
pub mod relations;
pub mod roles;
pub mod rpc;

/// Parses an optional transport id, treating blank input as absent.
fn parse_optional_id<T>(value: Option<&str>) -> AppResult<Option<T>>
where
    T: FromStr<Err = AppError>,
{
    value
        .filter(|value| !value.trim().is_empty())
        .map(str::parse::<T>)
        .transpose()
}

fn parse_ids<T>(values: &[String]) -> AppResult<Vec<T>>
where
    T: FromStr<Err = AppError>,
{
    values.iter().map(|value| value.parse::<T>()).collect()
}
