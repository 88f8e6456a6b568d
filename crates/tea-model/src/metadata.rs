//! Response metadata: pager, item descriptors and resolved dimensions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{AggregationType, ValueType};

/// Pagination state of a response page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pager {
    pub page: u32,
    pub page_size: u32,
    pub is_last_page: bool,
    /// Total matching rows; only when total pages were requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u64>,
}

impl Pager {
    pub fn new(page: u32, page_size: u32, is_last_page: bool) -> Self {
        Self {
            page,
            page_size,
            is_last_page,
            total: None,
            page_count: None,
        }
    }

    /// Attach totals; the page count rounds up and is zero for a zero page size.
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self.page_count = Some(if self.page_size == 0 {
            0
        } else {
            total.div_ceil(u64::from(self.page_size))
        });
        self
    }

    /// Zero-based index of the first row on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DimensionItemType {
    DataElement,
    ProgramAttribute,
    ProgramDataElement,
    OrganisationUnit,
    Period,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DimensionType {
    OrganisationUnit,
    Period,
    ProgramAttribute,
    ProgramDataElement,
}

/// Option reference inside an option set descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionRef {
    pub uid: String,
    pub code: String,
}

/// Descriptor of a metadata item. Only `name` is guaranteed; the other
/// fields appear with metadata details or for specific item kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension_item_type: Option<DimensionItemType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension_type: Option<DimensionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation_type: Option<AggregationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_aggregation_type: Option<AggregationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<OptionRef>>,
}

impl MetadataItem {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn with_code(mut self, code: Option<String>) -> Self {
        self.code = code;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }
}

/// The `metaData` block of a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub pager: Pager,
    #[serde(default)]
    pub items: BTreeMap<String, MetadataItem>,
    #[serde(default)]
    pub dimensions: BTreeMap<String, Vec<String>>,
}

impl Metadata {
    pub fn new(pager: Pager) -> Self {
        Self {
            pager,
            items: BTreeMap::new(),
            dimensions: BTreeMap::new(),
        }
    }
}
