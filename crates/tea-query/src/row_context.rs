//! Cell resolution and row context qualifiers.
//!
//! A program or stage scoped cell is read in two steps. The enrollment
//! (and event) the key points at is located first; when none exists the
//! cell is `NS`. Only then is the value looked up; a missing value is `ND`.
//! Unscoped columns are never qualified.

use tea_model::cell::{format_number, format_timestamp};
use tea_model::{
    DimensionKey, OffsetUid, ProgramColumn, ProgramItem, StageColumn, StageItem, SystemColumn,
    ValueStatus, render_cell,
};

use crate::catalog::{Catalog, OrgUnit};
use crate::columns::Column;
use crate::dataset::{Enrollment, Event, TrackedEntity, select_occurrence};
use crate::error::{QueryError, Result};

/// A resolved cell: display text, comparable code and qualifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    /// Stored option code when the display text is an option name.
    pub code: Option<String>,
    pub status: Option<ValueStatus>,
}

impl Cell {
    pub fn value(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code: None,
            status: None,
        }
    }

    pub fn qualified(status: ValueStatus) -> Self {
        Self {
            text: String::new(),
            code: None,
            status: Some(status),
        }
    }

    /// Text compared by filters: the option code when there is one.
    pub fn filter_text(&self) -> &str {
        self.code.as_deref().unwrap_or(&self.text)
    }
}

impl AsRef<str> for Cell {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Outcome of locating a scoped value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopedValue {
    /// No enrollment or event the key applies to.
    NoOccurrence,
    /// The occurrence exists but holds no value.
    NotCaptured,
    Captured(String),
}

impl ScopedValue {
    fn from_option(value: Option<String>) -> Self {
        match value {
            Some(value) if !value.trim().is_empty() => ScopedValue::Captured(value),
            _ => ScopedValue::NotCaptured,
        }
    }
}

pub struct CellResolver<'a> {
    catalog: &'a Catalog,
}

impl<'a> CellResolver<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    pub fn resolve(&self, entity: &TrackedEntity, column: &Column) -> Result<Cell> {
        match &column.key {
            DimensionKey::System(system) => self.system_cell(entity, *system).map(Cell::value),
            DimensionKey::Attribute(uid) => {
                self.render(column, entity.attributes.get(uid).map(String::as_str))
            }
            DimensionKey::OrgUnit { .. } => Err(QueryError::resolution(
                column.name(),
                "organisation unit dimension has no cell",
            )),
            DimensionKey::StageOnly { .. } => Err(QueryError::resolution(
                column.name(),
                "stage key is not qualified with its program",
            )),
            DimensionKey::Program { .. } | DimensionKey::Stage { .. } => {
                match self.scoped_value(entity, &column.key)? {
                    ScopedValue::NoOccurrence => Ok(Cell::qualified(ValueStatus::NotSupported)),
                    ScopedValue::NotCaptured => Ok(Cell::qualified(ValueStatus::NotDetermined)),
                    ScopedValue::Captured(value) => {
                        let cell = self.render(column, Some(&value))?;
                        if cell.text.is_empty() {
                            Ok(Cell::qualified(ValueStatus::NotDetermined))
                        } else {
                            Ok(cell)
                        }
                    }
                }
            }
        }
    }

    /// Locate the value of a program or stage scoped key.
    pub fn scoped_value(&self, entity: &TrackedEntity, key: &DimensionKey) -> Result<ScopedValue> {
        match key {
            DimensionKey::Program { program, item } => {
                let Some(enrollment) = select_enrollment(entity, program) else {
                    return Ok(ScopedValue::NoOccurrence);
                };
                let value = match item {
                    ProgramItem::Attribute(uid) => entity.attributes.get(uid).cloned(),
                    ProgramItem::Column(column) => self.program_column(enrollment, *column)?,
                };
                Ok(ScopedValue::from_option(value))
            }
            DimensionKey::Stage {
                program,
                stage,
                item,
            } => {
                let Some(enrollment) = select_enrollment(entity, program) else {
                    return Ok(ScopedValue::NoOccurrence);
                };
                let events = enrollment.stage_events(&stage.uid);
                let Some(event) = select_occurrence(&events, stage.effective_offset()) else {
                    return Ok(ScopedValue::NoOccurrence);
                };
                let value = match item {
                    StageItem::DataElement(uid) => event.data_values.get(uid).cloned(),
                    StageItem::Column(column) => self.stage_column(event, *column)?,
                };
                Ok(ScopedValue::from_option(value))
            }
            _ => Err(QueryError::resolution(key.to_string(), "key is not scoped")),
        }
    }

    fn render(&self, column: &Column, raw: Option<&str>) -> Result<Cell> {
        let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Ok(Cell::value(""));
        };
        if let Some(option_set_uid) = &column.option_set {
            let option_set = self.catalog.option_set(option_set_uid).ok_or_else(|| {
                QueryError::resolution(
                    column.name(),
                    format!("option set {option_set_uid} is not in the catalog"),
                )
            })?;
            let text = option_set
                .by_code(raw)
                .map_or_else(|| raw.to_string(), |option| option.name.clone());
            return Ok(Cell {
                text,
                code: Some(raw.to_string()),
                status: None,
            });
        }
        let text = render_cell(column.value_type(), raw).map_err(|error| {
            QueryError::resolution(column.name(), error.to_string())
        })?;
        Ok(Cell::value(text))
    }

    fn system_cell(&self, entity: &TrackedEntity, column: SystemColumn) -> Result<String> {
        let text = match column {
            SystemColumn::TrackedEntity => entity.uid.to_string(),
            SystemColumn::LastUpdated => format_timestamp(entity.last_updated),
            SystemColumn::LastUpdatedBy => entity
                .last_updated_by
                .as_ref()
                .map(|user| user.display_name())
                .unwrap_or_default(),
            SystemColumn::Created => format_timestamp(entity.created),
            SystemColumn::CreatedBy => entity
                .created_by
                .as_ref()
                .map(|user| user.display_name())
                .unwrap_or_default(),
            SystemColumn::StoredBy => entity.stored_by.clone().unwrap_or_default(),
            SystemColumn::Geometry => entity
                .geometry
                .map(|point| point.to_geojson())
                .unwrap_or_default(),
            SystemColumn::Longitude => entity
                .geometry
                .map(|point| format_number(point.longitude))
                .unwrap_or_default(),
            SystemColumn::Latitude => entity
                .geometry
                .map(|point| format_number(point.latitude))
                .unwrap_or_default(),
            SystemColumn::OrgUnitName => self.org_unit(entity.org_unit.as_str())?.name.clone(),
            SystemColumn::OrgUnitCode => self
                .org_unit(entity.org_unit.as_str())?
                .code
                .clone()
                .unwrap_or_default(),
            SystemColumn::OrgUnitNameHierarchy => {
                let unit = self.org_unit(entity.org_unit.as_str())?;
                self.catalog.org_unit_name_hierarchy(unit).ok_or_else(|| {
                    QueryError::resolution(column.key(), format!("broken path {}", unit.path))
                })?
            }
        };
        Ok(text)
    }

    fn program_column(
        &self,
        enrollment: &Enrollment,
        column: ProgramColumn,
    ) -> Result<Option<String>> {
        let value = match column {
            ProgramColumn::EnrollmentDate => Some(format_timestamp(enrollment.enrollment_date)),
            ProgramColumn::IncidentDate => enrollment.incident_date.map(format_timestamp),
            ProgramColumn::ProgramStatus | ProgramColumn::EnrollmentStatus => {
                Some(enrollment.status.as_str().to_string())
            }
            ProgramColumn::OrgUnitName => {
                Some(self.org_unit(enrollment.org_unit.as_str())?.name.clone())
            }
        };
        Ok(value)
    }

    fn stage_column(&self, event: &Event, column: StageColumn) -> Result<Option<String>> {
        let value = match column {
            StageColumn::OccurredDate | StageColumn::EventDate => {
                event.occurred_date.map(format_timestamp)
            }
            StageColumn::ScheduledDate => event.scheduled_date.map(format_timestamp),
            StageColumn::EventStatus => Some(event.status.as_str().to_string()),
            StageColumn::OrgUnitName => {
                Some(self.org_unit(event.org_unit.as_str())?.name.clone())
            }
        };
        Ok(value)
    }

    fn org_unit(&self, uid: &str) -> Result<&'a OrgUnit> {
        self.catalog.org_unit(uid).ok_or_else(|| {
            QueryError::resolution("organisation unit", format!("{uid} is not in the catalog"))
        })
    }
}

/// Enrollment a program reference points at.
pub fn select_enrollment<'e>(
    entity: &'e TrackedEntity,
    program: &OffsetUid,
) -> Option<&'e Enrollment> {
    let enrollments = entity.program_enrollments(&program.uid);
    select_occurrence(&enrollments, program.effective_offset())
}

