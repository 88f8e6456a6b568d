//! Column descriptors.

use serde::{Deserialize, Serialize};

use crate::{ValueClass, ValueType};

/// Descriptor of one response column.
///
/// `name` is the stable key a client uses to address the column;
/// `display_name` (wire key `column`) is the human readable label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridHeader {
    pub name: String,
    #[serde(rename = "column")]
    pub display_name: String,
    pub value_type: ValueType,
    #[serde(rename = "type")]
    pub value_class: ValueClass,
    pub hidden: bool,
    pub meta: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeatable_stage_params: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_offset: Option<i32>,
}

impl GridHeader {
    /// Visible metadata column; the runtime class follows from `value_type`.
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        value_type: ValueType,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            value_type,
            value_class: value_type.value_class(),
            hidden: false,
            meta: true,
            option_set: None,
            program_stage: None,
            repeatable_stage_params: None,
            stage_offset: None,
        }
    }

    pub fn with_option_set(mut self, option_set: impl Into<String>) -> Self {
        self.option_set = Some(option_set.into());
        self
    }

    pub fn with_program_stage(mut self, program_stage: impl Into<String>) -> Self {
        self.program_stage = Some(program_stage.into());
        self
    }

    pub fn with_repeatable_stage_params(mut self, params: impl Into<String>) -> Self {
        self.repeatable_stage_params = Some(params.into());
        self
    }

    pub fn with_stage_offset(mut self, offset: i32) -> Self {
        self.stage_offset = Some(offset);
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// True when the declared class agrees with the value type table.
    pub fn is_consistent(&self) -> bool {
        self.value_type.value_class() == self.value_class
    }
}
