//! Dimension filters and `dimension=` parameter values.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::cell::{compare_cells, parse_boolean, parse_timestamp};
use crate::dimension::ORG_UNIT_DIMENSION;
use crate::{DimensionKey, ModelError, ValueType};

/// Token standing for "no value" in filter values.
pub const NULL_VALUE: &str = "NV";

const OPTION_SEPARATOR: char = ';';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Eq,
    Neq,
    Ieq,
    Nieq,
    Gt,
    Ge,
    Lt,
    Le,
    Like,
    Nlike,
    Ilike,
    Nilike,
    Sw,
    Ew,
    In,
    Nin,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "EQ",
            FilterOperator::Neq => "NEQ",
            FilterOperator::Ieq => "IEQ",
            FilterOperator::Nieq => "NIEQ",
            FilterOperator::Gt => "GT",
            FilterOperator::Ge => "GE",
            FilterOperator::Lt => "LT",
            FilterOperator::Le => "LE",
            FilterOperator::Like => "LIKE",
            FilterOperator::Nlike => "NLIKE",
            FilterOperator::Ilike => "ILIKE",
            FilterOperator::Nilike => "NILIKE",
            FilterOperator::Sw => "SW",
            FilterOperator::Ew => "EW",
            FilterOperator::In => "IN",
            FilterOperator::Nin => "NIN",
        }
    }

    /// Operators taking a `;`-separated value list.
    pub fn is_multi_value(&self) -> bool {
        matches!(self, FilterOperator::In | FilterOperator::Nin)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let operator = match s.trim().to_uppercase().as_str() {
            "EQ" => FilterOperator::Eq,
            "NEQ" | "NE" => FilterOperator::Neq,
            "IEQ" => FilterOperator::Ieq,
            "NIEQ" => FilterOperator::Nieq,
            "GT" => FilterOperator::Gt,
            "GE" => FilterOperator::Ge,
            "LT" => FilterOperator::Lt,
            "LE" => FilterOperator::Le,
            "LIKE" => FilterOperator::Like,
            "NLIKE" => FilterOperator::Nlike,
            "ILIKE" => FilterOperator::Ilike,
            "NILIKE" => FilterOperator::Nilike,
            "SW" => FilterOperator::Sw,
            "EW" => FilterOperator::Ew,
            "IN" => FilterOperator::In,
            "NIN" => FilterOperator::Nin,
            other => return Err(format!("Unknown filter operator: {other}")),
        };
        Ok(operator)
    }
}

/// One `OPERATOR:value` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryFilter {
    pub operator: FilterOperator,
    pub value: String,
}

impl QueryFilter {
    pub fn new(operator: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            operator,
            value: value.into(),
        }
    }

    /// Values of the filter; only list operators split on `;`.
    pub fn values(&self) -> Vec<&str> {
        if self.operator.is_multi_value() {
            self.value.split(OPTION_SEPARATOR).map(str::trim).collect()
        } else {
            vec![self.value.trim()]
        }
    }

    /// Check that typed operators receive values of the right type.
    pub fn validate(&self, dimension: &str, value_type: ValueType) -> Result<(), ModelError> {
        if self.value.trim().is_empty() {
            return Err(ModelError::filter(dimension, "missing filter value"));
        }
        let typed = matches!(
            self.operator,
            FilterOperator::Gt | FilterOperator::Ge | FilterOperator::Lt | FilterOperator::Le
        );
        for value in self.values() {
            if value == NULL_VALUE {
                if typed {
                    return Err(ModelError::filter(
                        dimension,
                        format!("{} does not accept {NULL_VALUE}", self.operator),
                    ));
                }
                continue;
            }
            let well_typed = if value_type.is_numeric() {
                value.parse::<f64>().is_ok()
            } else if value_type.is_boolean() {
                parse_boolean(value).is_some()
            } else if value_type.is_temporal() {
                parse_timestamp(value).is_some()
            } else {
                true
            };
            if !well_typed {
                return Err(ModelError::filter(
                    dimension,
                    format!("`{value}` is not a valid {value_type}"),
                ));
            }
        }
        Ok(())
    }

    /// Evaluate the filter against a rendered cell (`""` for no value).
    pub fn matches(&self, value_type: ValueType, cell: &str) -> bool {
        let values = self.values();
        match self.operator {
            FilterOperator::Eq => values.iter().any(|v| equals(value_type, cell, v)),
            FilterOperator::Neq => !values.iter().any(|v| equals(value_type, cell, v)),
            FilterOperator::Ieq => values.iter().any(|v| equals_ignore_case(cell, v)),
            FilterOperator::Nieq => !values.iter().any(|v| equals_ignore_case(cell, v)),
            FilterOperator::In => values.iter().any(|v| equals(value_type, cell, v)),
            FilterOperator::Nin => !values.iter().any(|v| equals(value_type, cell, v)),
            FilterOperator::Gt => compare(value_type, cell, &values) == Some(Ordering::Greater),
            FilterOperator::Ge => matches!(
                compare(value_type, cell, &values),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOperator::Lt => compare(value_type, cell, &values) == Some(Ordering::Less),
            FilterOperator::Le => matches!(
                compare(value_type, cell, &values),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOperator::Like => contains(cell, &values, false),
            FilterOperator::Nlike => !contains(cell, &values, false),
            FilterOperator::Ilike => contains(cell, &values, true),
            FilterOperator::Nilike => !contains(cell, &values, true),
            FilterOperator::Sw => {
                !cell.is_empty() && cell.to_lowercase().starts_with(&values[0].to_lowercase())
            }
            FilterOperator::Ew => {
                !cell.is_empty() && cell.to_lowercase().ends_with(&values[0].to_lowercase())
            }
        }
    }
}

impl fmt::Display for QueryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.operator, self.value)
    }
}

fn equals(value_type: ValueType, cell: &str, value: &str) -> bool {
    if value == NULL_VALUE {
        return cell.is_empty();
    }
    if cell.is_empty() {
        return false;
    }
    if value_type.is_boolean() {
        return parse_boolean(cell) == parse_boolean(value);
    }
    if value_type.is_numeric() || value_type.is_temporal() {
        return compare_cells(value_type, cell, value) == Ordering::Equal;
    }
    cell == value
}

fn equals_ignore_case(cell: &str, value: &str) -> bool {
    if value == NULL_VALUE {
        return cell.is_empty();
    }
    !cell.is_empty() && cell.to_lowercase() == value.to_lowercase()
}

fn compare(value_type: ValueType, cell: &str, values: &[&str]) -> Option<Ordering> {
    if cell.is_empty() {
        return None;
    }
    values
        .first()
        .map(|value| compare_cells(value_type, cell, value))
}

fn contains(cell: &str, values: &[&str], ignore_case: bool) -> bool {
    let Some(needle) = values.first() else {
        return false;
    };
    if *needle == NULL_VALUE {
        return cell.is_empty();
    }
    if ignore_case {
        cell.to_lowercase().contains(&needle.to_lowercase())
    } else {
        cell.contains(needle)
    }
}

/// A parsed `dimension=` entry: the key plus its filters, or for the
/// organisation unit dimension, the listed items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionSpec {
    pub key: DimensionKey,
    pub filters: Vec<QueryFilter>,
    pub items: Vec<String>,
}

impl DimensionSpec {
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        let raw = raw.trim();
        let (key_part, rest) = match raw.split_once(':') {
            Some((key, rest)) => (key, Some(rest)),
            None => (raw, None),
        };
        let key = DimensionKey::parse(key_part)?;
        let mut spec = Self {
            key,
            filters: Vec::new(),
            items: Vec::new(),
        };
        let Some(rest) = rest else {
            return Ok(spec);
        };
        if spec.key.is_restriction_only() {
            spec.items = rest
                .split(OPTION_SEPARATOR)
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect();
            if spec.items.is_empty() {
                return Err(ModelError::filter(
                    ORG_UNIT_DIMENSION,
                    "no organisation units listed",
                ));
            }
            return Ok(spec);
        }
        let parts: Vec<&str> = rest.split(':').collect();
        if parts.len() % 2 != 0 {
            return Err(ModelError::filter(key_part, "filter is missing a value"));
        }
        for pair in parts.chunks(2) {
            let operator = pair[0]
                .parse::<FilterOperator>()
                .map_err(|reason| ModelError::filter(key_part, reason))?;
            if pair[1].trim().is_empty() {
                return Err(ModelError::filter(key_part, "missing filter value"));
            }
            spec.filters.push(QueryFilter::new(operator, pair[1].trim()));
        }
        Ok(spec)
    }

    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }
}

impl FromStr for DimensionSpec {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
