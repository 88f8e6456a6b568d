//! Response envelope builder.
//!
//! Executes a [`QueryRequest`] against a [`TrackedEntityStore`]:
//! 1. Validates the tracked entity type and referenced programs
//! 2. Plans the columns: output columns, sort columns and filter columns
//! 3. Restricts entities by org unit, program status, periods and filters
//! 4. Sorts with a stable composite sort and takes the requested page
//! 5. Projects the output columns, the row context and the metadata

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use tea_model::{
    DimensionKey, Pager, QueryFilter, ResponseEnvelope, RowContext, SortSpec, ValueType,
    compare_rows,
};
use tracing::{debug, info, info_span, warn};

use crate::catalog::Catalog;
use crate::columns::{Column, ColumnResolver};
use crate::config::QueryConfig;
use crate::dataset::{EnrollmentStatus, TrackedEntity};
use crate::error::{QueryError, Result};
use crate::metadata::{MetadataResolver, RequestedItem};
use crate::orgunit::OrgUnitSelection;
use crate::paging::{Page, paginate, unpaged};
use crate::period::{DateRange, PeriodFilter};
use crate::request::QueryRequest;
use crate::row_context::{Cell, CellResolver, select_enrollment};
use crate::store::TrackedEntityStore;

/// Runs tracked entity queries against a store.
pub struct QueryEngine<'a, S: TrackedEntityStore + ?Sized> {
    store: &'a S,
    config: &'a QueryConfig,
}

impl<'a, S: TrackedEntityStore + ?Sized> QueryEngine<'a, S> {
    pub fn new(store: &'a S, config: &'a QueryConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &QueryConfig {
        self.config
    }

    pub fn execute(&self, request: &QueryRequest) -> Result<ResponseEnvelope> {
        let span = info_span!(
            "tracked_entity_query",
            tracked_entity_type = %request.tracked_entity_type
        );
        let _guard = span.enter();
        let start = Instant::now();

        let catalog = self.store.catalog();
        let tracked_entity_type = catalog
            .tracked_entity_type(&request.tracked_entity_type)
            .ok_or_else(|| {
                QueryError::TrackedEntityTypeNotFound(request.tracked_entity_type.to_string())
            })?;
        let display_property = request
            .display_property
            .unwrap_or(self.config.display_property);
        let resolver = ColumnResolver::new(catalog, tracked_entity_type, display_property);

        let plan =
            info_span!("plan").in_scope(|| QueryPlan::build(&resolver, request, self.config))?;
        debug!(
            columns = plan.columns.len(),
            output_columns = plan.output.len(),
            sort_keys = plan.sort.len(),
            filters = plan.filters.len(),
            "query planned"
        );

        let entities = self.store.tracked_entities(&tracked_entity_type.uid)?;
        let fetched = entities.len();
        let live: Vec<&TrackedEntity> = entities
            .into_iter()
            .filter(|entity| !entity.deleted)
            .collect();
        if live.len() < fetched {
            warn!(
                excluded = fetched - live.len(),
                "excluding deleted tracked entities"
            );
        }

        let reference = request
            .relative_period_date
            .unwrap_or_else(|| Local::now().date_naive());
        let restrictions = Restrictions::build(&plan, request, reference)?;

        let cells = CellResolver::new(catalog);
        let mut rows: Vec<Vec<Cell>> = Vec::new();
        for entity in live {
            if !restrictions.admits(catalog, entity) {
                continue;
            }
            let row = plan
                .columns
                .iter()
                .map(|column| cells.resolve(entity, column))
                .collect::<Result<Vec<Cell>>>()?;
            if plan.passes_filters(&row) {
                rows.push(row);
            }
        }
        let total = rows.len();

        rows.sort_by(|left, right| compare_rows(left, right, &plan.sort));

        let page_size = request
            .page_size
            .unwrap_or(self.config.default_page_size)
            .min(self.config.max_page_size);
        let (page, pager) = if request.paging {
            let page = paginate(rows, request.page, page_size);
            let pager = Pager::new(request.page, page_size, page.is_last_page);
            (page, pager)
        } else {
            let page = unpaged(rows);
            let size = u32::try_from(page.items.len()).unwrap_or(u32::MAX);
            (page, Pager::new(1, size, true))
        };
        let pager = if request.total_pages {
            pager.with_total(total as u64)
        } else {
            pager
        };
        debug!(
            total,
            page = pager.page,
            page_size = pager.page_size,
            height = page.items.len(),
            is_last_page = pager.is_last_page,
            "page selected"
        );

        let (output_rows, row_context) = plan.project(page, request.row_context);
        if let Some(context) = &row_context {
            debug!(qualified_cells = context.len(), "row context resolved");
        }

        let output_columns: Vec<Column> = plan
            .output
            .iter()
            .map(|index| plan.columns[*index].clone())
            .collect();
        let requested: Vec<RequestedItem<'_>> = plan
            .requested
            .iter()
            .map(|(index, filters)| RequestedItem {
                column: &plan.columns[*index],
                filters,
            })
            .collect();
        let selection = merged_selection(&restrictions.org_units);
        let metadata = MetadataResolver::new(
            catalog,
            tracked_entity_type,
            display_property,
            request.include_metadata_details,
        )
        .resolve(pager, &output_columns, &requested, selection.as_ref());

        let headers = output_columns
            .into_iter()
            .map(|column| column.header)
            .collect();
        let envelope = ResponseEnvelope::new(headers, output_rows, metadata, row_context);
        info!(
            height = envelope.height,
            header_width = envelope.header_width,
            duration_ms = start.elapsed().as_millis(),
            "tracked entity query complete"
        );
        Ok(envelope)
    }
}

/// Columns a query reads, with the output, sort and filter bindings.
struct QueryPlan<'a> {
    /// Every column resolved per row; output columns come first.
    columns: Vec<Column>,
    output: Vec<usize>,
    sort: Vec<SortSpec>,
    filters: Vec<(usize, QueryFilter)>,
    /// Columns named by `dimension=` and `filter=` with their filters.
    requested: Vec<(usize, Vec<QueryFilter>)>,
    org_units: Vec<OrgUnitSelection<'a>>,
    program_status: BTreeMap<String, Vec<EnrollmentStatus>>,
}

impl<'a> QueryPlan<'a> {
    fn build(
        resolver: &ColumnResolver<'a>,
        request: &QueryRequest,
        config: &QueryConfig,
    ) -> Result<Self> {
        for program in &request.programs {
            resolver.program_by_uid(program)?;
        }
        let mut program_status: BTreeMap<String, Vec<EnrollmentStatus>> = BTreeMap::new();
        for filter in &request.program_status {
            let program = resolver.program_by_uid(&filter.program)?;
            program_status
                .entry(program.uid.to_string())
                .or_default()
                .push(filter.status);
        }
        for filter in &request.enrollment_date {
            if let Some(program) = &filter.program {
                resolver.program(program)?;
            }
        }

        let mut plan = Self {
            columns: Vec::new(),
            output: Vec::new(),
            sort: Vec::new(),
            filters: Vec::new(),
            requested: Vec::new(),
            org_units: Vec::new(),
            program_status,
        };

        let mut defaults = resolver.system_columns(config.spatial_support);
        defaults.extend(resolver.type_attribute_columns()?);
        for spec in request.dimensions.iter().chain(&request.filters) {
            if spec.key.is_restriction_only() {
                plan.org_units.push(OrgUnitSelection::resolve(
                    resolver.catalog(),
                    &spec.key,
                    &spec.items,
                    &config.user_org_units,
                )?);
                continue;
            }
            let key = resolver.qualify(&spec.key)?;
            if let Some(program) = key.program() {
                resolver.program(program)?;
            }
        }
        for spec in &request.dimensions {
            if spec.key.is_restriction_only() {
                continue;
            }
            let column = resolver.resolve(&spec.key)?;
            if !defaults.iter().any(|known| known.name() == column.name()) {
                defaults.push(column);
            }
        }

        if request.headers.is_empty() {
            for column in defaults {
                let index = plan.push_column(column);
                plan.output.push(index);
            }
        } else {
            for header in &request.headers {
                let column = match defaults.iter().find(|known| known.name() == header) {
                    Some(known) => known.clone(),
                    None => resolver.resolve(&DimensionKey::parse(header)?)?,
                };
                let index = plan.push_column(column);
                plan.output.push(index);
            }
        }

        for key in &request.sort {
            let column = match plan.find(&key.name) {
                Some(index) => index,
                None => {
                    let column = DimensionKey::parse(&key.name)
                        .ok()
                        .and_then(|parsed| resolver.resolve(&parsed).ok())
                        .ok_or_else(|| QueryError::UnknownSortKey(key.name.clone()))?;
                    plan.push_column(column)
                }
            };
            plan.sort.push(SortSpec {
                column,
                value_type: comparison_type(&plan.columns[column]),
                direction: key.direction,
            });
        }

        for spec in request.dimensions.iter().chain(&request.filters) {
            if spec.key.is_restriction_only() {
                continue;
            }
            let column = resolver.resolve(&spec.key)?;
            let value_type = comparison_type(&column);
            for filter in &spec.filters {
                filter.validate(column.name(), value_type)?;
            }
            let index = match plan.find(column.name()) {
                Some(index) => index,
                None => plan.push_column(column),
            };
            plan.filters
                .extend(spec.filters.iter().map(|filter| (index, filter.clone())));
            plan.requested.push((index, spec.filters.clone()));
        }
        Ok(plan)
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name() == name)
    }

    fn push_column(&mut self, column: Column) -> usize {
        self.columns.push(column);
        self.columns.len() - 1
    }

    fn passes_filters(&self, row: &[Cell]) -> bool {
        self.filters.iter().all(|(index, filter)| {
            let column = &self.columns[*index];
            filter.matches(comparison_type(column), row[*index].filter_text())
        })
    }

    fn project(
        &self,
        page: Page<Vec<Cell>>,
        with_context: bool,
    ) -> (Vec<Vec<String>>, Option<RowContext>) {
        let mut context = RowContext::new();
        let rows = page
            .items
            .into_iter()
            .enumerate()
            .map(|(row_index, mut cells)| {
                self.output
                    .iter()
                    .enumerate()
                    .map(|(column_index, source)| {
                        let cell = std::mem::replace(&mut cells[*source], Cell::value(""));
                        if let Some(status) = cell.status {
                            context.insert(row_index, column_index, status);
                        }
                        cell.text
                    })
                    .collect()
            })
            .collect();
        (rows, with_context.then_some(context))
    }
}

/// Option set backed cells compare as text on their codes or names.
fn comparison_type(column: &Column) -> ValueType {
    if column.option_set.is_some() {
        ValueType::Text
    } else {
        column.value_type()
    }
}

/// Entity level restrictions evaluated before cells are resolved.
struct Restrictions<'p, 'a> {
    org_units: &'p [OrgUnitSelection<'a>],
    program_status: &'p BTreeMap<String, Vec<EnrollmentStatus>>,
    enrollment_date: Vec<(&'p PeriodFilter, Vec<DateRange>)>,
    created: Vec<Vec<DateRange>>,
    last_updated: Vec<Vec<DateRange>>,
}

impl<'p, 'a> Restrictions<'p, 'a> {
    fn build(
        plan: &'p QueryPlan<'a>,
        request: &'p QueryRequest,
        reference: NaiveDate,
    ) -> Result<Self> {
        let ranges = |filters: &[PeriodFilter]| {
            filters
                .iter()
                .map(|filter| filter.date_ranges(reference))
                .collect::<Result<Vec<_>>>()
        };
        Ok(Self {
            org_units: &plan.org_units,
            program_status: &plan.program_status,
            enrollment_date: request
                .enrollment_date
                .iter()
                .map(|filter| filter.date_ranges(reference).map(|ranges| (filter, ranges)))
                .collect::<Result<Vec<_>>>()?,
            created: ranges(&request.created)?,
            last_updated: ranges(&request.last_updated)?,
        })
    }

    fn admits(&self, catalog: &Catalog, entity: &TrackedEntity) -> bool {
        self.org_units
            .iter()
            .all(|selection| selection.matches(catalog, entity))
            && self.program_status.iter().all(|(program, statuses)| {
                entity.enrollments.iter().any(|enrollment| {
                    !enrollment.deleted
                        && enrollment.program.as_str() == program
                        && statuses.contains(&enrollment.status)
                })
            })
            && self
                .created
                .iter()
                .all(|ranges| ranges.iter().any(|range| range.contains(entity.created)))
            && self
                .last_updated
                .iter()
                .all(|ranges| ranges.iter().any(|range| range.contains(entity.last_updated)))
            && self.enrollment_date.iter().all(|(filter, ranges)| {
                let in_range = |date| ranges.iter().any(|range| range.contains(date));
                match &filter.program {
                    Some(program) => select_enrollment(entity, program)
                        .is_some_and(|enrollment| in_range(enrollment.enrollment_date)),
                    None => entity.enrollments.iter().any(|enrollment| {
                        !enrollment.deleted && in_range(enrollment.enrollment_date)
                    }),
                }
            })
    }
}

/// All selected org units as one selection for the metadata block.
fn merged_selection<'a>(selections: &[OrgUnitSelection<'a>]) -> Option<OrgUnitSelection<'a>> {
    let (first, rest) = selections.split_first()?;
    let mut merged = OrgUnitSelection {
        program: None,
        stage: None,
        units: first.units.clone(),
    };
    for unit in rest
        .iter()
        .flat_map(|selection| selection.units.iter().copied())
    {
        if !merged.units.iter().any(|known| known.uid == unit.uid) {
            merged.units.push(unit);
        }
    }
    Some(merged)
}
