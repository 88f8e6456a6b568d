//! Query request parameters.

use chrono::NaiveDate;
use tea_model::{DimensionSpec, SortKey, Uid};
use tracing::debug;

use crate::config::DisplayProperty;
use crate::dataset::EnrollmentStatus;
use crate::error::{QueryError, Result};
use crate::period::PeriodFilter;

const LIST_SEPARATOR: char = ',';

/// `programStatus` entry: `<program>.<STATUS>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramStatusFilter {
    pub program: String,
    pub status: EnrollmentStatus,
}

/// A parsed tracked entity query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub tracked_entity_type: Uid,
    /// Requested columns, possibly carrying filters.
    pub dimensions: Vec<DimensionSpec>,
    /// Row restrictions that add no column.
    pub filters: Vec<DimensionSpec>,
    /// Explicit column selection; empty means the default columns.
    pub headers: Vec<String>,
    pub sort: Vec<SortKey>,
    pub page: u32,
    pub page_size: Option<u32>,
    pub paging: bool,
    pub total_pages: bool,
    pub row_context: bool,
    pub include_metadata_details: bool,
    pub display_property: Option<DisplayProperty>,
    pub programs: Vec<String>,
    pub program_status: Vec<ProgramStatusFilter>,
    pub enrollment_date: Vec<PeriodFilter>,
    pub last_updated: Vec<PeriodFilter>,
    pub created: Vec<PeriodFilter>,
    pub relative_period_date: Option<NaiveDate>,
}

impl QueryRequest {
    pub fn new(tracked_entity_type: Uid) -> Self {
        Self {
            tracked_entity_type,
            dimensions: Vec::new(),
            filters: Vec::new(),
            headers: Vec::new(),
            sort: Vec::new(),
            page: 1,
            page_size: None,
            paging: true,
            total_pages: false,
            row_context: false,
            include_metadata_details: false,
            display_property: None,
            programs: Vec::new(),
            program_status: Vec::new(),
            enrollment_date: Vec::new(),
            last_updated: Vec::new(),
            created: Vec::new(),
            relative_period_date: None,
        }
    }

    /// Build a request from `name=value` pairs in their original order.
    ///
    /// Sort keys keep the order in which `asc` and `desc` appear.
    /// Unknown parameters are ignored.
    pub fn from_params<I, K, V>(tracked_entity_type: Uid, params: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut request = Self::new(tracked_entity_type);
        for (name, value) in params {
            request.apply(name.as_ref(), value.as_ref())?;
        }
        Ok(request)
    }

    /// Parse an unencoded query string such as `dimension=a,b&pageSize=10`.
    pub fn from_query_string(tracked_entity_type: Uid, query: &str) -> Result<Self> {
        let params = query
            .trim_start_matches('?')
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| pair.split_once('=').unwrap_or((pair, "")));
        Self::from_params(tracked_entity_type, params)
    }

    fn apply(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "dimension" => {
                for item in split_list(value) {
                    self.dimensions.push(DimensionSpec::parse(item)?);
                }
            }
            "filter" => {
                for item in split_list(value) {
                    self.filters.push(DimensionSpec::parse(item)?);
                }
            }
            "headers" => {
                for header in split_list(value) {
                    if !self.headers.iter().any(|existing| existing == header) {
                        self.headers.push(header.to_string());
                    }
                }
            }
            "asc" => self.sort.extend(split_list(value).map(SortKey::asc)),
            "desc" => self.sort.extend(split_list(value).map(SortKey::desc)),
            "page" => {
                self.page = parse_number(name, value)?;
                if self.page == 0 {
                    return Err(QueryError::parameter(name, value));
                }
            }
            "pageSize" => self.page_size = Some(parse_number(name, value)?),
            "paging" => self.paging = parse_flag(name, value)?,
            "totalPages" => self.total_pages = parse_flag(name, value)?,
            "rowContext" => self.row_context = parse_flag(name, value)?,
            "includeMetadataDetails" => self.include_metadata_details = parse_flag(name, value)?,
            "displayProperty" => {
                self.display_property = Some(
                    DisplayProperty::parse(value)
                        .ok_or_else(|| QueryError::parameter(name, value))?,
                );
            }
            "program" => self
                .programs
                .extend(split_list(value).map(str::to_string)),
            "programStatus" | "enrollmentStatus" => {
                for item in split_list(value) {
                    let (program, status) = item
                        .split_once('.')
                        .ok_or_else(|| QueryError::parameter(name, item))?;
                    let status = EnrollmentStatus::parse(status)
                        .ok_or_else(|| QueryError::parameter(name, item))?;
                    self.program_status.push(ProgramStatusFilter {
                        program: program.to_string(),
                        status,
                    });
                }
            }
            "enrollmentDate" => self.enrollment_date.push(PeriodFilter::parse(value)?),
            "lastUpdated" => self.last_updated.push(PeriodFilter::parse(value)?),
            "created" => self.created.push(PeriodFilter::parse(value)?),
            "relativePeriodDate" => {
                let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                    .map_err(|_| QueryError::parameter(name, value))?;
                self.relative_period_date = Some(date);
            }
            _ => debug!(parameter = name, "ignoring unknown query parameter"),
        }
        Ok(())
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

fn parse_number(name: &str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| QueryError::parameter(name, value))
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(QueryError::parameter(name, value)),
    }
}
