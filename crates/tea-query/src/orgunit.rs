//! Organisation unit restriction.

use tea_model::{DimensionKey, OffsetUid};

use crate::catalog::{Catalog, OrgUnit};
use crate::dataset::{TrackedEntity, select_occurrence};
use crate::error::{QueryError, Result};
use crate::row_context::select_enrollment;

const USER_ORGUNIT: &str = "USER_ORGUNIT";
const USER_ORGUNIT_CHILDREN: &str = "USER_ORGUNIT_CHILDREN";
const USER_ORGUNIT_GRANDCHILDREN: &str = "USER_ORGUNIT_GRANDCHILDREN";
const LEVEL_PREFIX: &str = "LEVEL-";
const GROUP_PREFIX: &str = "OU_GROUP-";

/// Units selected by an `ou` dimension, in resolution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgUnitSelection<'a> {
    /// Program whose enrollment org unit is tested instead of the entity's.
    pub program: Option<OffsetUid>,
    /// Stage whose event org unit is tested, within `program`.
    pub stage: Option<OffsetUid>,
    pub units: Vec<&'a OrgUnit>,
}

impl<'a> OrgUnitSelection<'a> {
    /// Resolve the items of an `ou` dimension.
    pub fn resolve(
        catalog: &'a Catalog,
        key: &DimensionKey,
        items: &[String],
        user_org_units: &[String],
    ) -> Result<Self> {
        let (program, stage) = scope(catalog, key);
        let mut units: Vec<&'a OrgUnit> = Vec::new();
        for item in items {
            for unit in resolve_item(catalog, item, user_org_units)? {
                if !units.iter().any(|known| known.uid == unit.uid) {
                    units.push(unit);
                }
            }
        }
        Ok(Self {
            program,
            stage,
            units,
        })
    }

    pub fn uids(&self) -> Vec<String> {
        self.units.iter().map(|unit| unit.uid.to_string()).collect()
    }

    /// True when the relevant org unit lies within one of the selected units.
    ///
    /// For a program or stage scoped selection an entity without an
    /// enrollment or event there never matches.
    pub fn matches(&self, catalog: &Catalog, entity: &TrackedEntity) -> bool {
        let org_unit = match (&self.program, &self.stage) {
            (Some(program), stage) => {
                let Some(enrollment) = select_enrollment(entity, program) else {
                    return false;
                };
                match stage {
                    Some(stage) => {
                        let events = enrollment.stage_events(&stage.uid);
                        match select_occurrence(&events, stage.effective_offset()) {
                            Some(event) => &event.org_unit,
                            None => return false,
                        }
                    }
                    None => &enrollment.org_unit,
                }
            }
            (None, _) => &entity.org_unit,
        };
        let Some(unit) = catalog.org_unit(org_unit.as_str()) else {
            return false;
        };
        self.units
            .iter()
            .any(|selected| unit.is_within(selected.uid.as_str()))
    }
}

/// Program and stage an `ou` key is scoped to. A `<stage>.ou` key tests the
/// event org unit within the program owning the stage.
fn scope(catalog: &Catalog, key: &DimensionKey) -> (Option<OffsetUid>, Option<OffsetUid>) {
    let Some(reference) = key.program() else {
        return (None, None);
    };
    if catalog.program(&reference.uid).is_some() {
        return (Some(reference.clone()), None);
    }
    match catalog.stage_owner(&reference.uid) {
        Some((owner, _)) => (
            Some(OffsetUid::new(owner.uid.clone())),
            Some(reference.clone()),
        ),
        None => (Some(reference.clone()), None),
    }
}

fn resolve_item<'a>(
    catalog: &'a Catalog,
    item: &str,
    user_org_units: &[String],
) -> Result<Vec<&'a OrgUnit>> {
    let lookup = |uid: &str| {
        catalog
            .org_unit(uid)
            .ok_or_else(|| QueryError::UnknownDimension(format!("ou:{uid}")))
    };
    match item {
        USER_ORGUNIT => user_org_units.iter().map(|uid| lookup(uid)).collect(),
        USER_ORGUNIT_CHILDREN | USER_ORGUNIT_GRANDCHILDREN => {
            let depth = if item == USER_ORGUNIT_CHILDREN { 1 } else { 2 };
            let mut units = Vec::new();
            for uid in user_org_units {
                let root = lookup(uid)?;
                units.extend(catalog.org_units.iter().filter(|unit| {
                    unit.is_within(root.uid.as_str()) && unit.level() == root.level() + depth
                }));
            }
            Ok(units)
        }
        _ => {
            if let Some(level) = item.strip_prefix(LEVEL_PREFIX) {
                let level: usize = level
                    .parse()
                    .map_err(|_| QueryError::UnknownDimension(format!("ou:{item}")))?;
                return Ok(catalog
                    .org_units
                    .iter()
                    .filter(|unit| unit.level() == level)
                    .collect());
            }
            if let Some(group) = item.strip_prefix(GROUP_PREFIX) {
                return Ok(catalog
                    .org_units
                    .iter()
                    .filter(|unit| unit.groups.iter().any(|g| g.as_str() == group))
                    .collect());
            }
            Ok(vec![lookup(item)?])
        }
    }
}
