//! Metadata catalog: the objects dimension keys refer to.

use serde::{Deserialize, Serialize};
use tea_model::{AggregationType, Uid, ValueType};

use crate::config::DisplayProperty;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedEntityType {
    pub uid: Uid,
    pub name: String,
    /// Attributes shown by default, in display order.
    #[serde(default)]
    pub attributes: Vec<Uid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub uid: Uid,
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub tracked_entity_type: Uid,
    #[serde(default)]
    pub enrollment_date_label: Option<String>,
    #[serde(default)]
    pub incident_date_label: Option<String>,
    #[serde(default)]
    pub attributes: Vec<Uid>,
    #[serde(default)]
    pub stages: Vec<ProgramStage>,
}

impl Program {
    pub fn stage(&self, uid: &Uid) -> Option<&ProgramStage> {
        self.stages.iter().find(|stage| &stage.uid == uid)
    }

    pub fn display_name(&self, property: DisplayProperty) -> &str {
        display(&self.name, self.short_name.as_deref(), property)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramStage {
    pub uid: Uid,
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub repeatable: bool,
    #[serde(default)]
    pub execution_date_label: Option<String>,
    #[serde(default)]
    pub data_elements: Vec<Uid>,
}

impl ProgramStage {
    pub fn display_name(&self, property: DisplayProperty) -> &str {
        display(&self.name, self.short_name.as_deref(), property)
    }
}

/// A data element or tracked entity attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryItem {
    pub uid: Uid,
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub value_type: ValueType,
    #[serde(default = "default_aggregation")]
    pub aggregation_type: AggregationType,
    #[serde(default)]
    pub option_set: Option<Uid>,
}

fn default_aggregation() -> AggregationType {
    AggregationType::NoAggregation
}

impl QueryItem {
    pub fn display_name(&self, property: DisplayProperty) -> &str {
        display(&self.name, self.short_name.as_deref(), property)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionItem {
    pub uid: Uid,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionSet {
    pub uid: Uid,
    pub name: String,
    #[serde(default)]
    pub options: Vec<OptionItem>,
}

impl OptionSet {
    pub fn by_code(&self, code: &str) -> Option<&OptionItem> {
        self.options.iter().find(|option| option.code == code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgUnit {
    pub uid: Uid,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    /// Ancestor chain including self, e.g. `/ImspTQPwCqd/O6uvpzGd5pu`.
    pub path: String,
    #[serde(default)]
    pub groups: Vec<Uid>,
}

impl OrgUnit {
    /// Depth in the hierarchy, the root being level 1.
    pub fn level(&self) -> usize {
        self.ancestors().count()
    }

    /// Uids along the path, root first, self last.
    pub fn ancestors(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|segment| !segment.is_empty())
    }

    /// True if `uid` is this unit or one of its ancestors.
    pub fn is_within(&self, uid: &str) -> bool {
        self.ancestors().any(|ancestor| ancestor == uid)
    }

    pub fn parent(&self) -> Option<&str> {
        let ancestors: Vec<&str> = self.ancestors().collect();
        ancestors.len().checked_sub(2).map(|index| ancestors[index])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub tracked_entity_types: Vec<TrackedEntityType>,
    #[serde(default)]
    pub programs: Vec<Program>,
    #[serde(default)]
    pub data_elements: Vec<QueryItem>,
    #[serde(default)]
    pub attributes: Vec<QueryItem>,
    #[serde(default)]
    pub option_sets: Vec<OptionSet>,
    #[serde(default)]
    pub org_units: Vec<OrgUnit>,
}

impl Catalog {
    pub fn tracked_entity_type(&self, uid: &Uid) -> Option<&TrackedEntityType> {
        self.tracked_entity_types.iter().find(|t| &t.uid == uid)
    }

    pub fn program(&self, uid: &Uid) -> Option<&Program> {
        self.programs.iter().find(|p| &p.uid == uid)
    }

    pub fn data_element(&self, uid: &Uid) -> Option<&QueryItem> {
        self.data_elements.iter().find(|d| &d.uid == uid)
    }

    pub fn attribute(&self, uid: &Uid) -> Option<&QueryItem> {
        self.attributes.iter().find(|a| &a.uid == uid)
    }

    pub fn option_set(&self, uid: &Uid) -> Option<&OptionSet> {
        self.option_sets.iter().find(|o| &o.uid == uid)
    }

    pub fn org_unit(&self, uid: &str) -> Option<&OrgUnit> {
        self.org_units.iter().find(|o| o.uid.as_str() == uid)
    }

    /// Programs enrolling entities of the given type.
    pub fn programs_for_type<'a>(
        &'a self,
        tracked_entity_type: &'a Uid,
    ) -> impl Iterator<Item = &'a Program> {
        self.programs
            .iter()
            .filter(move |program| &program.tracked_entity_type == tracked_entity_type)
    }

    /// Program owning a stage, with the stage itself.
    pub fn stage_owner(&self, stage: &Uid) -> Option<(&Program, &ProgramStage)> {
        self.programs
            .iter()
            .find_map(|program| program.stage(stage).map(|found| (program, found)))
    }

    /// Names of the unit's ancestors and itself joined root first.
    pub fn org_unit_name_hierarchy(&self, unit: &OrgUnit) -> Option<String> {
        let names = unit
            .ancestors()
            .map(|uid| self.org_unit(uid).map(|ancestor| ancestor.name.as_str()))
            .collect::<Option<Vec<_>>>()?;
        Some(names.join(" / "))
    }
}

fn display<'a>(name: &'a str, short_name: Option<&'a str>, property: DisplayProperty) -> &'a str {
    match property {
        DisplayProperty::Shortname => short_name.unwrap_or(name),
        DisplayProperty::Name => name,
    }
}
