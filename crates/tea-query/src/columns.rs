//! Header descriptor builder.
//!
//! Resolves dimension keys against the catalog and produces the header of
//! each column. Labels of program and stage scoped items join the item
//! label with the program and stage names; a non-zero offset appends
//! ` (n)` to the name of the segment carrying it.
//!
//! Keys naming a stage without its program (`A03MvHHogjR.eventdate`) are
//! qualified with the owning program first. The header keeps the name the
//! caller used.

use tea_model::{
    DimensionKey, GridHeader, OffsetUid, ProgramColumn, ProgramItem, StageColumn, StageItem,
    SystemColumn, Uid, ValueType,
};

use crate::catalog::{Catalog, Program, ProgramStage, QueryItem, TrackedEntityType};
use crate::config::DisplayProperty;
use crate::error::{QueryError, Result};

/// A resolved column: the parsed key, its header and its option set.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub key: DimensionKey,
    pub header: GridHeader,
    pub option_set: Option<Uid>,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn value_type(&self) -> ValueType {
        self.header.value_type
    }

    /// Program or stage scoped columns can be qualified in the row context.
    pub fn is_scoped(&self) -> bool {
        matches!(
            self.key,
            DimensionKey::Program { .. } | DimensionKey::Stage { .. }
        )
    }

    fn new(key: DimensionKey, header: GridHeader) -> Self {
        Self {
            key,
            header,
            option_set: None,
        }
    }

    fn with_option_set(mut self, option_set: Option<&Uid>) -> Self {
        if let Some(uid) = option_set {
            self.header = self.header.with_option_set(uid.as_str());
            self.option_set = Some(uid.clone());
        }
        self
    }
}

pub struct ColumnResolver<'a> {
    catalog: &'a Catalog,
    tracked_entity_type: &'a TrackedEntityType,
    display_property: DisplayProperty,
}

impl<'a> ColumnResolver<'a> {
    pub fn new(
        catalog: &'a Catalog,
        tracked_entity_type: &'a TrackedEntityType,
        display_property: DisplayProperty,
    ) -> Self {
        Self {
            catalog,
            tracked_entity_type,
            display_property,
        }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn tracked_entity_type(&self) -> &'a TrackedEntityType {
        self.tracked_entity_type
    }

    pub fn display_property(&self) -> DisplayProperty {
        self.display_property
    }

    /// System columns in default order.
    pub fn system_columns(&self, spatial_support: bool) -> Vec<Column> {
        SystemColumn::ALL
            .into_iter()
            .filter(|column| spatial_support || !column.is_spatial())
            .map(|column| self.system_column(column))
            .collect()
    }

    /// Attributes of the tracked entity type in display order.
    pub fn type_attribute_columns(&self) -> Result<Vec<Column>> {
        self.tracked_entity_type
            .attributes
            .iter()
            .map(|uid| self.resolve(&DimensionKey::Attribute(uid.clone())))
            .collect()
    }

    pub fn resolve(&self, key: &DimensionKey) -> Result<Column> {
        let qualified = self.qualify(key)?;
        let mut column = self.resolve_qualified(&qualified)?;
        if &qualified != key {
            column.header.name = key.to_string();
        }
        Ok(column)
    }

    /// Rewrite a `<stage>.<item>` key into `<program>.<stage>.<item>`.
    ///
    /// Two segment keys whose first segment is a stage of a program enrolling
    /// this entity type are stage keys. `ou` and `ouname` then refer to the
    /// event org unit and a uid to a data element. Enrollment columns have no
    /// stage counterpart and are rejected. Every other key is returned as is.
    pub fn qualify(&self, key: &DimensionKey) -> Result<DimensionKey> {
        let (stage, item) = match key {
            DimensionKey::StageOnly { stage, item } => (stage, item.clone()),
            DimensionKey::Program { program, item } if self.is_stage_reference(program) => {
                let item = match item {
                    ProgramItem::Attribute(uid) => StageItem::DataElement(uid.clone()),
                    ProgramItem::Column(ProgramColumn::OrgUnitName) => {
                        StageItem::Column(StageColumn::OrgUnitName)
                    }
                    ProgramItem::Column(column) => {
                        return Err(QueryError::StageScopeNotSupported {
                            dimension: column.key().to_string(),
                            stage: program.uid.to_string(),
                        });
                    }
                };
                (program, item)
            }
            _ => return Ok(key.clone()),
        };
        let (owner, _) = self
            .stage_owner(&stage.uid)
            .ok_or_else(|| QueryError::UnknownDimension(key.to_string()))?;
        Ok(DimensionKey::Stage {
            program: OffsetUid::new(owner.uid.clone()),
            stage: stage.clone(),
            item,
        })
    }

    /// Program and stage of a stage uid, limited to this entity type.
    pub fn stage_owner(&self, stage: &Uid) -> Option<(&'a Program, &'a ProgramStage)> {
        self.catalog
            .stage_owner(stage)
            .filter(|(program, _)| program.tracked_entity_type == self.tracked_entity_type.uid)
    }

    /// A first segment that names a stage rather than a program.
    fn is_stage_reference(&self, reference: &OffsetUid) -> bool {
        self.catalog.program(&reference.uid).is_none()
            && self.stage_owner(&reference.uid).is_some()
    }

    fn resolve_qualified(&self, key: &DimensionKey) -> Result<Column> {
        match key {
            DimensionKey::System(column) => Ok(self.system_column(*column)),
            DimensionKey::OrgUnit { .. } | DimensionKey::StageOnly { .. } => {
                Err(QueryError::UnknownDimension(key.to_string()))
            }
            DimensionKey::Attribute(uid) => {
                let attribute = self.type_attribute(uid, None, key)?;
                let header = GridHeader::new(
                    key.to_string(),
                    attribute.display_name(self.display_property),
                    attribute.value_type,
                );
                Ok(Column::new(key.clone(), header)
                    .with_option_set(attribute.option_set.as_ref()))
            }
            DimensionKey::Program { program, item } => {
                let program_meta = self.program(program)?;
                let program_label =
                    scoped_name(program_meta.display_name(self.display_property), program);
                match item {
                    ProgramItem::Column(column) => {
                        let label = format!(
                            "{}, {program_label}",
                            program_column_label(program_meta, *column)
                        );
                        let header = GridHeader::new(key.to_string(), label, column.value_type());
                        Ok(Column::new(key.clone(), header))
                    }
                    ProgramItem::Attribute(uid) => {
                        let attribute = self.type_attribute(uid, Some(program_meta), key)?;
                        let label = format!(
                            "{}, {program_label}",
                            attribute.display_name(self.display_property)
                        );
                        let header = GridHeader::new(key.to_string(), label, attribute.value_type);
                        Ok(Column::new(key.clone(), header)
                            .with_option_set(attribute.option_set.as_ref()))
                    }
                }
            }
            DimensionKey::Stage {
                program,
                stage,
                item,
            } => {
                let program_meta = self.program(program)?;
                let stage_meta = program_meta.stage(&stage.uid).ok_or_else(|| {
                    QueryError::StageNotInProgram {
                        stage: stage.uid.to_string(),
                        program: program.uid.to_string(),
                    }
                })?;
                let prefix = format!(
                    "{}, {}",
                    scoped_name(program_meta.display_name(self.display_property), program),
                    scoped_name(stage_meta.display_name(self.display_property), stage)
                );
                let mut column = match item {
                    StageItem::Column(column) => {
                        let label =
                            format!("{}, {prefix}", stage_column_label(stage_meta, *column));
                        Column::new(
                            key.clone(),
                            GridHeader::new(key.to_string(), label, column.value_type()),
                        )
                    }
                    StageItem::DataElement(uid) => {
                        let data_element = self.stage_data_element(stage_meta, uid, key)?;
                        let label = format!(
                            "{}, {prefix}",
                            data_element.display_name(self.display_property)
                        );
                        let mut header =
                            GridHeader::new(key.to_string(), label, data_element.value_type);
                        if stage_meta.repeatable {
                            header = header.with_repeatable_stage_params(format!(
                                "startIndex:{} count:1 startDate:null endDate: null dimension: {uid}",
                                stage.effective_offset()
                            ));
                        }
                        Column::new(key.clone(), header)
                            .with_option_set(data_element.option_set.as_ref())
                    }
                };
                column.header = column.header.with_program_stage(stage.uid.as_str());
                if let Some(offset) = stage.offset {
                    column.header = column.header.with_stage_offset(offset);
                }
                Ok(column)
            }
        }
    }

    /// Resolve a program reference, which must enroll this entity type.
    pub fn program(&self, program: &OffsetUid) -> Result<&'a Program> {
        self.program_by_uid(program.uid.as_str())
    }

    pub fn program_by_uid(&self, uid: &str) -> Result<&'a Program> {
        let program = Uid::new(uid)
            .ok()
            .and_then(|uid| self.catalog.program(&uid))
            .ok_or_else(|| QueryError::ProgramNotFound(uid.to_string()))?;
        if program.tracked_entity_type != self.tracked_entity_type.uid {
            return Err(QueryError::UnknownDimension(uid.to_string()));
        }
        Ok(program)
    }

    fn system_column(&self, column: SystemColumn) -> Column {
        Column::new(
            DimensionKey::System(column),
            GridHeader::new(column.key(), column.label(), column.value_type()),
        )
    }

    /// Attributes are reachable if the type or, for program scoped keys, the
    /// program declares them.
    fn type_attribute(
        &self,
        uid: &Uid,
        program: Option<&Program>,
        key: &DimensionKey,
    ) -> Result<&'a QueryItem> {
        let declared = self.tracked_entity_type.attributes.contains(uid)
            || match program {
                Some(program) => program.attributes.contains(uid),
                None => self
                    .catalog
                    .programs_for_type(&self.tracked_entity_type.uid)
                    .any(|program| program.attributes.contains(uid)),
            };
        if !declared {
            return Err(QueryError::UnknownDimension(key.to_string()));
        }
        self.catalog
            .attribute(uid)
            .ok_or_else(|| QueryError::UnknownDimension(key.to_string()))
    }

    fn stage_data_element(
        &self,
        stage: &ProgramStage,
        uid: &Uid,
        key: &DimensionKey,
    ) -> Result<&'a QueryItem> {
        if !stage.data_elements.contains(uid) {
            return Err(QueryError::UnknownDimension(key.to_string()));
        }
        self.catalog
            .data_element(uid)
            .ok_or_else(|| QueryError::UnknownDimension(key.to_string()))
    }
}

fn scoped_name(name: &str, reference: &OffsetUid) -> String {
    match reference.offset {
        Some(offset) if offset != 0 => format!("{name} ({offset})"),
        _ => name.to_string(),
    }
}

fn program_column_label(program: &Program, column: ProgramColumn) -> &str {
    let custom = match column {
        ProgramColumn::EnrollmentDate => program.enrollment_date_label.as_deref(),
        ProgramColumn::IncidentDate => program.incident_date_label.as_deref(),
        _ => None,
    };
    custom.unwrap_or(column.default_label())
}

fn stage_column_label(stage: &ProgramStage, column: StageColumn) -> &str {
    let custom = match column {
        StageColumn::OccurredDate | StageColumn::EventDate => {
            stage.execution_date_label.as_deref()
        }
        _ => None,
    };
    custom.unwrap_or(column.default_label())
}
