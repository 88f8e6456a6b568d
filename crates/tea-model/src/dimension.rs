//! Dimension keys.
//!
//! A dimension key names one column (or restriction) of a query:
//!
//! - a system column such as `created` or `ouname`,
//! - a tracked entity attribute `cejWyOfXge6`,
//! - a program scoped item `IpHINAT79UW.enrollmentdate` or
//!   `IpHINAT79UW.w75KJ2mc4zz`,
//! - a stage scoped item `IpHINAT79UW.A03MvHHogjR.a3kGcGDCuk6`, or the
//!   same item with the program left out, `A03MvHHogjR.a3kGcGDCuk6`,
//! - the organisation unit restriction `ou` or `IpHINAT79UW.ou`.
//!
//! Program and stage segments may carry a signed occurrence offset in
//! brackets, e.g. `IpHINAT79UW[-1].A03MvHHogjR[2].a3kGcGDCuk6`.

use std::fmt;
use std::str::FromStr;

use crate::ids::is_valid_uid;
use crate::{ModelError, Uid, ValueType};

/// Key of the organisation unit dimension.
pub const ORG_UNIT_DIMENSION: &str = "ou";

/// Key of the period dimension, always listed in response dimensions.
pub const PERIOD_DIMENSION: &str = "pe";

/// Fixed columns available on every tracked entity row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SystemColumn {
    TrackedEntity,
    LastUpdated,
    LastUpdatedBy,
    Created,
    CreatedBy,
    StoredBy,
    Geometry,
    Longitude,
    Latitude,
    OrgUnitName,
    OrgUnitCode,
    OrgUnitNameHierarchy,
}

impl SystemColumn {
    /// Default column order.
    pub const ALL: [SystemColumn; 12] = [
        SystemColumn::TrackedEntity,
        SystemColumn::LastUpdated,
        SystemColumn::LastUpdatedBy,
        SystemColumn::Created,
        SystemColumn::CreatedBy,
        SystemColumn::StoredBy,
        SystemColumn::Geometry,
        SystemColumn::Longitude,
        SystemColumn::Latitude,
        SystemColumn::OrgUnitName,
        SystemColumn::OrgUnitCode,
        SystemColumn::OrgUnitNameHierarchy,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            SystemColumn::TrackedEntity => "trackedentity",
            SystemColumn::LastUpdated => "lastupdated",
            SystemColumn::LastUpdatedBy => "lastupdatedbydisplayname",
            SystemColumn::Created => "created",
            SystemColumn::CreatedBy => "createdbydisplayname",
            SystemColumn::StoredBy => "storedby",
            SystemColumn::Geometry => "geometry",
            SystemColumn::Longitude => "longitude",
            SystemColumn::Latitude => "latitude",
            SystemColumn::OrgUnitName => "ouname",
            SystemColumn::OrgUnitCode => "oucode",
            SystemColumn::OrgUnitNameHierarchy => "ounamehierarchy",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SystemColumn::TrackedEntity => "Tracked entity",
            SystemColumn::LastUpdated => "Last updated",
            SystemColumn::LastUpdatedBy => "Last updated by",
            SystemColumn::Created => "Created",
            SystemColumn::CreatedBy => "Created by",
            SystemColumn::StoredBy => "Stored by",
            SystemColumn::Geometry => "Geometry",
            SystemColumn::Longitude => "Longitude",
            SystemColumn::Latitude => "Latitude",
            SystemColumn::OrgUnitName => "Organisation unit name",
            SystemColumn::OrgUnitCode => "Organisation unit code",
            SystemColumn::OrgUnitNameHierarchy => "Organisation unit hierarchy",
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            SystemColumn::LastUpdated | SystemColumn::Created => ValueType::DateTime,
            SystemColumn::Longitude | SystemColumn::Latitude => ValueType::Number,
            _ => ValueType::Text,
        }
    }

    /// Columns dropped when spatial support is disabled.
    pub fn is_spatial(&self) -> bool {
        matches!(
            self,
            SystemColumn::Geometry | SystemColumn::Longitude | SystemColumn::Latitude
        )
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.key() == key)
    }
}

/// Enrollment level columns addressed as `<program>.<column>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramColumn {
    EnrollmentDate,
    IncidentDate,
    ProgramStatus,
    EnrollmentStatus,
    OrgUnitName,
}

impl ProgramColumn {
    pub const ALL: [ProgramColumn; 5] = [
        ProgramColumn::EnrollmentDate,
        ProgramColumn::IncidentDate,
        ProgramColumn::ProgramStatus,
        ProgramColumn::EnrollmentStatus,
        ProgramColumn::OrgUnitName,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ProgramColumn::EnrollmentDate => "enrollmentdate",
            ProgramColumn::IncidentDate => "incidentdate",
            ProgramColumn::ProgramStatus => "programstatus",
            ProgramColumn::EnrollmentStatus => "enrollmentstatus",
            ProgramColumn::OrgUnitName => "ouname",
        }
    }

    /// Label used when the program does not define its own.
    pub fn default_label(&self) -> &'static str {
        match self {
            ProgramColumn::EnrollmentDate => "Date of enrollment",
            ProgramColumn::IncidentDate => "Incident date",
            ProgramColumn::ProgramStatus => "Program Status",
            ProgramColumn::EnrollmentStatus => "Enrollment Status",
            ProgramColumn::OrgUnitName => "Organisation Unit Name",
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            ProgramColumn::EnrollmentDate | ProgramColumn::IncidentDate => ValueType::DateTime,
            _ => ValueType::Text,
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.key() == key)
    }
}

/// Event level columns addressed as `<program>.<stage>.<column>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageColumn {
    OccurredDate,
    EventDate,
    ScheduledDate,
    EventStatus,
    OrgUnitName,
}

impl StageColumn {
    pub const ALL: [StageColumn; 5] = [
        StageColumn::OccurredDate,
        StageColumn::EventDate,
        StageColumn::ScheduledDate,
        StageColumn::EventStatus,
        StageColumn::OrgUnitName,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            StageColumn::OccurredDate => "occurreddate",
            StageColumn::EventDate => "eventdate",
            StageColumn::ScheduledDate => "scheduleddate",
            StageColumn::EventStatus => "eventstatus",
            StageColumn::OrgUnitName => "ouname",
        }
    }

    pub fn default_label(&self) -> &'static str {
        match self {
            StageColumn::OccurredDate | StageColumn::EventDate => "Report date",
            StageColumn::ScheduledDate => "Scheduled date",
            StageColumn::EventStatus => "Event Status",
            StageColumn::OrgUnitName => "Organisation Unit Name",
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            StageColumn::OccurredDate | StageColumn::EventDate | StageColumn::ScheduledDate => {
                ValueType::DateTime
            }
            _ => ValueType::Text,
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.key() == key)
    }
}

/// A program or stage reference with its optional occurrence offset.
///
/// Offset semantics: absent or `0` is the most recent occurrence, `-k` is
/// `k` occurrences before it, and a positive `n` is the n-th occurrence
/// counting from the oldest.
/// Positive offsets count forward from the oldest, so `[1]` is the first
/// occurrence and not the most recent one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OffsetUid {
    pub uid: Uid,
    pub offset: Option<i32>,
}

impl OffsetUid {
    pub fn new(uid: Uid) -> Self {
        Self { uid, offset: None }
    }

    pub fn with_offset(uid: Uid, offset: i32) -> Self {
        Self {
            uid,
            offset: Some(offset),
        }
    }

    /// Offset value, zero when absent.
    pub fn effective_offset(&self) -> i32 {
        self.offset.unwrap_or(0)
    }

    fn parse(segment: &str, key: &str) -> Result<Self, ModelError> {
        let Some(open) = segment.find('[') else {
            return Ok(Self::new(parse_uid(segment, key)?));
        };
        let Some(inner) = segment[open + 1..].strip_suffix(']') else {
            return Err(ModelError::dimension(key, "unterminated offset bracket"));
        };
        let offset = inner
            .trim()
            .parse::<i32>()
            .map_err(|_| ModelError::dimension(key, format!("invalid offset `{inner}`")))?;
        Ok(Self::with_offset(parse_uid(&segment[..open], key)?, offset))
    }
}

impl FromStr for OffsetUid {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.trim(), s)
    }
}

impl fmt::Display for OffsetUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "{}[{offset}]", self.uid),
            None => write!(f, "{}", self.uid),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProgramItem {
    Column(ProgramColumn),
    /// Tracked entity attribute read through the program.
    Attribute(Uid),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StageItem {
    Column(StageColumn),
    DataElement(Uid),
}

/// Parsed dimension key. Parsing is purely syntactic; whether the
/// referenced items exist is decided against a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DimensionKey {
    System(SystemColumn),
    OrgUnit {
        program: Option<OffsetUid>,
    },
    Attribute(Uid),
    Program {
        program: OffsetUid,
        item: ProgramItem,
    },
    Stage {
        program: OffsetUid,
        stage: OffsetUid,
        item: StageItem,
    },
    /// Event column addressed as `<stage>.<column>`. The owning program is
    /// looked up in the catalog.
    StageOnly {
        stage: OffsetUid,
        item: StageItem,
    },
}

impl DimensionKey {
    pub fn parse(key: &str) -> Result<Self, ModelError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ModelError::dimension(key, "empty key"));
        }
        let segments: Vec<&str> = key.split('.').collect();
        match segments.as_slice() {
            [single] => {
                if *single == ORG_UNIT_DIMENSION {
                    return Ok(DimensionKey::OrgUnit { program: None });
                }
                if let Some(column) = SystemColumn::from_key(single) {
                    return Ok(DimensionKey::System(column));
                }
                Ok(DimensionKey::Attribute(parse_uid(single, key)?))
            }
            [program, item] => {
                let program = OffsetUid::parse(program, key)?;
                if *item == ORG_UNIT_DIMENSION {
                    return Ok(DimensionKey::OrgUnit {
                        program: Some(program),
                    });
                }
                // `<stage>.ou`, `<stage>.ouname` and `<stage>.<data element>`
                // read like program keys and are told apart by the catalog.
                if let Some(column) = ProgramColumn::from_key(item) {
                    return Ok(DimensionKey::Program {
                        program,
                        item: ProgramItem::Column(column),
                    });
                }
                if let Some(column) = StageColumn::from_key(item) {
                    return Ok(DimensionKey::StageOnly {
                        stage: program,
                        item: StageItem::Column(column),
                    });
                }
                Ok(DimensionKey::Program {
                    program,
                    item: ProgramItem::Attribute(parse_uid(item, key)?),
                })
            }
            [program, stage, item] => {
                let program = OffsetUid::parse(program, key)?;
                let stage = OffsetUid::parse(stage, key)?;
                let item = match StageColumn::from_key(item) {
                    Some(column) => StageItem::Column(column),
                    None => StageItem::DataElement(parse_uid(item, key)?),
                };
                Ok(DimensionKey::Stage {
                    program,
                    stage,
                    item,
                })
            }
            _ => Err(ModelError::dimension(key, "too many segments")),
        }
    }

    /// Program the key is scoped to, if any.
    pub fn program(&self) -> Option<&OffsetUid> {
        match self {
            DimensionKey::OrgUnit { program } => program.as_ref(),
            DimensionKey::Program { program, .. } | DimensionKey::Stage { program, .. } => {
                Some(program)
            }
            DimensionKey::System(_)
            | DimensionKey::Attribute(_)
            | DimensionKey::StageOnly { .. } => None,
        }
    }

    /// True for keys that only restrict rows and never add a column.
    pub fn is_restriction_only(&self) -> bool {
        matches!(self, DimensionKey::OrgUnit { .. })
    }

    /// True when any segment carries an explicit offset.
    pub fn has_offset(&self) -> bool {
        match self {
            DimensionKey::Program { program, .. } => program.offset.is_some(),
            DimensionKey::Stage { program, stage, .. } => {
                program.offset.is_some() || stage.offset.is_some()
            }
            DimensionKey::OrgUnit { program } => {
                program.as_ref().is_some_and(|p| p.offset.is_some())
            }
            DimensionKey::StageOnly { stage, .. } => stage.offset.is_some(),
            DimensionKey::System(_) | DimensionKey::Attribute(_) => false,
        }
    }
}

impl fmt::Display for DimensionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionKey::System(column) => f.write_str(column.key()),
            DimensionKey::OrgUnit { program: None } => f.write_str(ORG_UNIT_DIMENSION),
            DimensionKey::OrgUnit {
                program: Some(program),
            } => write!(f, "{program}.{ORG_UNIT_DIMENSION}"),
            DimensionKey::Attribute(uid) => write!(f, "{uid}"),
            DimensionKey::Program { program, item } => match item {
                ProgramItem::Column(column) => write!(f, "{program}.{}", column.key()),
                ProgramItem::Attribute(uid) => write!(f, "{program}.{uid}"),
            },
            DimensionKey::Stage {
                program,
                stage,
                item,
            } => match item {
                StageItem::Column(column) => write!(f, "{program}.{stage}.{}", column.key()),
                StageItem::DataElement(uid) => write!(f, "{program}.{stage}.{uid}"),
            },
            DimensionKey::StageOnly { stage, item } => match item {
                StageItem::Column(column) => write!(f, "{stage}.{}", column.key()),
                StageItem::DataElement(uid) => write!(f, "{stage}.{uid}"),
            },
        }
    }
}

impl FromStr for DimensionKey {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_uid(segment: &str, key: &str) -> Result<Uid, ModelError> {
    if is_valid_uid(segment) {
        Uid::new(segment)
    } else {
        Err(ModelError::dimension(
            key,
            format!("`{segment}` is not a valid identifier"),
        ))
    }
}
