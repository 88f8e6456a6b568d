//! Metadata resolver: pager, item descriptors and resolved dimensions.

use std::collections::BTreeMap;

use tea_model::dimension::{ORG_UNIT_DIMENSION, PERIOD_DIMENSION};
use tea_model::{
    AggregationType, DimensionItemType, DimensionKey, DimensionType, Metadata, MetadataItem,
    OptionRef, Pager, ProgramItem, QueryFilter, StageItem, Uid, ValueType,
};

use crate::catalog::{
    Catalog, OptionSet, OrgUnit, Program, ProgramStage, QueryItem, TrackedEntityType,
};
use crate::columns::Column;
use crate::config::DisplayProperty;
use crate::orgunit::OrgUnitSelection;

const ORG_UNIT_NAME: &str = "Organisation unit";

/// A column named by `dimension=` or `filter=` with its filters.
#[derive(Debug, Clone, Copy)]
pub struct RequestedItem<'q> {
    pub column: &'q Column,
    pub filters: &'q [QueryFilter],
}

pub struct MetadataResolver<'a> {
    catalog: &'a Catalog,
    tracked_entity_type: &'a TrackedEntityType,
    display_property: DisplayProperty,
    include_details: bool,
}

impl<'a> MetadataResolver<'a> {
    pub fn new(
        catalog: &'a Catalog,
        tracked_entity_type: &'a TrackedEntityType,
        display_property: DisplayProperty,
        include_details: bool,
    ) -> Self {
        Self {
            catalog,
            tracked_entity_type,
            display_property,
            include_details,
        }
    }

    pub fn resolve(
        &self,
        pager: Pager,
        columns: &[Column],
        requested: &[RequestedItem<'_>],
        org_units: Option<&OrgUnitSelection<'_>>,
    ) -> Metadata {
        let mut metadata = Metadata::new(pager);
        self.add_items(&mut metadata.items, columns, requested, org_units);
        metadata.dimensions = self.dimensions(requested, org_units);
        metadata
    }

    fn add_items(
        &self,
        items: &mut BTreeMap<String, MetadataItem>,
        columns: &[Column],
        requested: &[RequestedItem<'_>],
        org_units: Option<&OrgUnitSelection<'_>>,
    ) {
        for uid in &self.tracked_entity_type.attributes {
            if let Some(attribute) = self.catalog.attribute(uid) {
                items.insert(
                    uid.to_string(),
                    self.query_item(attribute, DimensionItemType::ProgramAttribute),
                );
                self.add_option_set(items, attribute.option_set.as_ref());
            }
        }

        let keys = columns
            .iter()
            .chain(requested.iter().map(|item| item.column));
        for column in keys {
            if let Some(program) = column.key.program()
                && let Some(program) = self.catalog.program(&program.uid)
            {
                items.insert(program.uid.to_string(), self.program_item(program));
                if let DimensionKey::Stage { stage, .. } = &column.key
                    && let Some(stage) = program.stage(&stage.uid)
                {
                    items.insert(stage.uid.to_string(), self.stage_item(stage));
                }
            }
            if let Some((item, item_type)) = self.column_item(&column.key) {
                let descriptor = self.query_item(item, item_type);
                items.insert(item.uid.to_string(), descriptor.clone());
                let qualified = column.key.to_string();
                if qualified != column.name() {
                    items.insert(qualified, descriptor.clone());
                }
                if column.name() != item.uid.as_str() {
                    items.insert(column.name().to_string(), descriptor);
                }
                self.add_option_set(items, item.option_set.as_ref());
            }
        }

        if let Some(selection) = org_units {
            let mut descriptor = MetadataItem::named(ORG_UNIT_NAME).with_uid(ORG_UNIT_DIMENSION);
            descriptor.dimension_type = Some(DimensionType::OrganisationUnit);
            items.insert(ORG_UNIT_DIMENSION.to_string(), descriptor);
            for unit in &selection.units {
                items.insert(unit.uid.to_string(), self.org_unit_item(unit));
            }
        }
    }

    fn dimensions(
        &self,
        requested: &[RequestedItem<'_>],
        org_units: Option<&OrgUnitSelection<'_>>,
    ) -> BTreeMap<String, Vec<String>> {
        let mut dimensions = BTreeMap::new();
        dimensions.insert(PERIOD_DIMENSION.to_string(), Vec::new());
        for uid in &self.tracked_entity_type.attributes {
            let options = self
                .catalog
                .attribute(uid)
                .and_then(|attribute| attribute.option_set.as_ref())
                .and_then(|option_set| self.catalog.option_set(option_set))
                .map(|option_set| option_uids(option_set, &[]))
                .unwrap_or_default();
            dimensions.insert(uid.to_string(), options);
        }
        for item in requested {
            let options = item
                .column
                .option_set
                .as_ref()
                .and_then(|option_set| self.catalog.option_set(option_set))
                .filter(|_| !item.filters.is_empty())
                .map(|option_set| option_uids(option_set, item.filters))
                .unwrap_or_default();
            dimensions.insert(item.column.name().to_string(), options);
        }
        if let Some(selection) = org_units {
            dimensions.insert(ORG_UNIT_DIMENSION.to_string(), selection.uids());
        }
        dimensions
    }

    fn column_item(&self, key: &DimensionKey) -> Option<(&'a QueryItem, DimensionItemType)> {
        match key {
            DimensionKey::Attribute(uid)
            | DimensionKey::Program {
                item: ProgramItem::Attribute(uid),
                ..
            } => self
                .catalog
                .attribute(uid)
                .map(|item| (item, DimensionItemType::ProgramAttribute)),
            DimensionKey::Stage {
                item: StageItem::DataElement(uid),
                ..
            } => self
                .catalog
                .data_element(uid)
                .map(|item| (item, DimensionItemType::DataElement)),
            _ => None,
        }
    }

    fn query_item(&self, item: &QueryItem, item_type: DimensionItemType) -> MetadataItem {
        let descriptor = MetadataItem::named(item.display_name(self.display_property));
        if !self.include_details {
            return descriptor;
        }
        let mut descriptor = descriptor
            .with_uid(item.uid.as_str())
            .with_code(item.code.clone())
            .with_description(item.description.clone());
        descriptor.dimension_item_type = Some(item_type);
        descriptor.value_type = Some(item.value_type);
        descriptor.aggregation_type = Some(item.aggregation_type);
        descriptor.total_aggregation_type = Some(if item.value_type.is_numeric() {
            AggregationType::Sum
        } else {
            AggregationType::NoAggregation
        });
        descriptor
    }

    fn program_item(&self, program: &Program) -> MetadataItem {
        let descriptor = MetadataItem::named(program.display_name(self.display_property));
        if !self.include_details {
            return descriptor;
        }
        descriptor
            .with_uid(program.uid.as_str())
            .with_code(program.code.clone())
            .with_description(program.description.clone())
    }

    fn stage_item(&self, stage: &ProgramStage) -> MetadataItem {
        let descriptor = MetadataItem::named(stage.display_name(self.display_property));
        if self.include_details {
            descriptor.with_uid(stage.uid.as_str())
        } else {
            descriptor
        }
    }

    fn org_unit_item(&self, unit: &OrgUnit) -> MetadataItem {
        let descriptor = MetadataItem::named(unit.name.as_str());
        if !self.include_details {
            return descriptor;
        }
        let mut descriptor = descriptor
            .with_uid(unit.uid.as_str())
            .with_code(unit.code.clone());
        descriptor.dimension_item_type = Some(DimensionItemType::OrganisationUnit);
        descriptor
    }

    fn add_option_set(
        &self,
        items: &mut BTreeMap<String, MetadataItem>,
        option_set: Option<&Uid>,
    ) {
        let Some(option_set) = option_set.and_then(|uid| self.catalog.option_set(uid)) else {
            return;
        };
        let mut descriptor =
            MetadataItem::named(option_set.name.as_str()).with_uid(option_set.uid.as_str());
        descriptor.options = Some(
            option_set
                .options
                .iter()
                .map(|option| OptionRef {
                    uid: option.uid.to_string(),
                    code: option.code.clone(),
                })
                .collect(),
        );
        items.insert(option_set.uid.to_string(), descriptor);
        for option in &option_set.options {
            items.insert(
                option.uid.to_string(),
                MetadataItem::named(option.name.as_str()).with_code(Some(option.code.clone())),
            );
        }
    }
}

/// Uids of the options whose code passes every filter; all options when
/// there are no filters.
fn option_uids(option_set: &OptionSet, filters: &[QueryFilter]) -> Vec<String> {
    option_set
        .options
        .iter()
        .filter(|option| {
            filters
                .iter()
                .all(|filter| filter.matches(ValueType::Text, &option.code))
        })
        .map(|option| option.uid.to_string())
        .collect()
}
