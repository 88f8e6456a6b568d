//! Value types and their runtime representations.
//!
//! Every column declares a [`ValueType`]; the wire `type` of a header is the
//! [`ValueClass`] derived from it through a fixed table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declared value type of a data element, attribute or system column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ValueType {
    Text,
    LongText,
    MultiText,
    Letter,
    PhoneNumber,
    Email,
    Boolean,
    TrueOnly,
    Date,
    #[serde(rename = "DATETIME")]
    DateTime,
    Time,
    Number,
    UnitInterval,
    Percentage,
    Integer,
    IntegerPositive,
    IntegerNegative,
    IntegerZeroOrPositive,
    TrackerAssociate,
    Username,
    Coordinate,
    OrganisationUnit,
    Reference,
    Age,
    Url,
    #[serde(rename = "FILE_RESOURCE")]
    File,
    Image,
    #[serde(rename = "GEOJSON")]
    GeoJson,
}

impl ValueType {
    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Text => "TEXT",
            ValueType::LongText => "LONG_TEXT",
            ValueType::MultiText => "MULTI_TEXT",
            ValueType::Letter => "LETTER",
            ValueType::PhoneNumber => "PHONE_NUMBER",
            ValueType::Email => "EMAIL",
            ValueType::Boolean => "BOOLEAN",
            ValueType::TrueOnly => "TRUE_ONLY",
            ValueType::Date => "DATE",
            ValueType::DateTime => "DATETIME",
            ValueType::Time => "TIME",
            ValueType::Number => "NUMBER",
            ValueType::UnitInterval => "UNIT_INTERVAL",
            ValueType::Percentage => "PERCENTAGE",
            ValueType::Integer => "INTEGER",
            ValueType::IntegerPositive => "INTEGER_POSITIVE",
            ValueType::IntegerNegative => "INTEGER_NEGATIVE",
            ValueType::IntegerZeroOrPositive => "INTEGER_ZERO_OR_POSITIVE",
            ValueType::TrackerAssociate => "TRACKER_ASSOCIATE",
            ValueType::Username => "USERNAME",
            ValueType::Coordinate => "COORDINATE",
            ValueType::OrganisationUnit => "ORGANISATION_UNIT",
            ValueType::Reference => "REFERENCE",
            ValueType::Age => "AGE",
            ValueType::Url => "URL",
            ValueType::File => "FILE_RESOURCE",
            ValueType::Image => "IMAGE",
            ValueType::GeoJson => "GEOJSON",
        }
    }

    /// Runtime representation used for the header `type`.
    pub fn value_class(&self) -> ValueClass {
        match self {
            ValueType::Number | ValueType::UnitInterval | ValueType::Percentage => {
                ValueClass::Double
            }
            ValueType::Integer
            | ValueType::IntegerPositive
            | ValueType::IntegerNegative
            | ValueType::IntegerZeroOrPositive => ValueClass::Integer,
            ValueType::Boolean | ValueType::TrueOnly => ValueClass::Boolean,
            ValueType::Date | ValueType::Age => ValueClass::LocalDate,
            ValueType::DateTime => ValueClass::LocalDateTime,
            ValueType::Time => ValueClass::LocalTime,
            ValueType::Coordinate => ValueClass::Point,
            ValueType::GeoJson => ValueClass::Geometry,
            _ => ValueClass::String,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.value_class(), ValueClass::Double | ValueClass::Integer)
    }

    pub fn is_integer(&self) -> bool {
        self.value_class() == ValueClass::Integer
    }

    pub fn is_boolean(&self) -> bool {
        self.value_class() == ValueClass::Boolean
    }

    /// Date and date-time columns share the timestamp cell pattern.
    pub fn is_temporal(&self) -> bool {
        matches!(
            self.value_class(),
            ValueClass::LocalDate | ValueClass::LocalDateTime
        )
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        let value_type = match normalized.as_str() {
            "TEXT" => ValueType::Text,
            "LONG_TEXT" => ValueType::LongText,
            "MULTI_TEXT" => ValueType::MultiText,
            "LETTER" => ValueType::Letter,
            "PHONE_NUMBER" => ValueType::PhoneNumber,
            "EMAIL" => ValueType::Email,
            "BOOLEAN" => ValueType::Boolean,
            "TRUE_ONLY" => ValueType::TrueOnly,
            "DATE" => ValueType::Date,
            "DATETIME" => ValueType::DateTime,
            "TIME" => ValueType::Time,
            "NUMBER" => ValueType::Number,
            "UNIT_INTERVAL" => ValueType::UnitInterval,
            "PERCENTAGE" => ValueType::Percentage,
            "INTEGER" => ValueType::Integer,
            "INTEGER_POSITIVE" => ValueType::IntegerPositive,
            "INTEGER_NEGATIVE" => ValueType::IntegerNegative,
            "INTEGER_ZERO_OR_POSITIVE" => ValueType::IntegerZeroOrPositive,
            "TRACKER_ASSOCIATE" => ValueType::TrackerAssociate,
            "USERNAME" => ValueType::Username,
            "COORDINATE" => ValueType::Coordinate,
            "ORGANISATION_UNIT" => ValueType::OrganisationUnit,
            "REFERENCE" => ValueType::Reference,
            "AGE" => ValueType::Age,
            "URL" => ValueType::Url,
            "FILE_RESOURCE" => ValueType::File,
            "IMAGE" => ValueType::Image,
            "GEOJSON" => ValueType::GeoJson,
            _ => return Err(format!("Unknown value type: {s}")),
        };
        Ok(value_type)
    }
}

/// Canonical runtime representation of a column, serialized as the
/// fully qualified class name clients expect in the header `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueClass {
    #[serde(rename = "java.lang.String")]
    String,
    #[serde(rename = "java.lang.Double")]
    Double,
    #[serde(rename = "java.lang.Integer")]
    Integer,
    #[serde(rename = "java.lang.Boolean")]
    Boolean,
    #[serde(rename = "java.time.LocalDate")]
    LocalDate,
    #[serde(rename = "java.time.LocalDateTime")]
    LocalDateTime,
    #[serde(rename = "java.time.LocalTime")]
    LocalTime,
    #[serde(rename = "org.locationtech.jts.geom.Point")]
    Point,
    #[serde(rename = "org.locationtech.jts.geom.Geometry")]
    Geometry,
}

impl ValueClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueClass::String => "java.lang.String",
            ValueClass::Double => "java.lang.Double",
            ValueClass::Integer => "java.lang.Integer",
            ValueClass::Boolean => "java.lang.Boolean",
            ValueClass::LocalDate => "java.time.LocalDate",
            ValueClass::LocalDateTime => "java.time.LocalDateTime",
            ValueClass::LocalTime => "java.time.LocalTime",
            ValueClass::Point => "org.locationtech.jts.geom.Point",
            ValueClass::Geometry => "org.locationtech.jts.geom.Geometry",
        }
    }
}

impl fmt::Display for ValueClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregation applied to an item in aggregate analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AggregationType {
    Sum,
    Average,
    AverageSumOrgUnit,
    Count,
    Min,
    Max,
    Last,
    #[serde(rename = "NONE")]
    NoAggregation,
    Default,
}
