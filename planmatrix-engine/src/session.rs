//! A comparison session wiring plan storage and local preferences to the
//! matrix pipeline.
//!
//! The view is re-derived from scratch on every call. Local order changes are
//! applied before they are persisted; a failed persist leaves the local state
//! in place and reports the divergence instead of rolling back.

use serde::{Deserialize, Serialize};

use crate::cells::{CellView, row_cells};
use crate::config::MatrixConfig;
use crate::constants::{LOG_EDIT_PARTIAL, LOG_PERSIST_FAILED, LOG_PIPELINE_BUILT};
use crate::data::Plan;
use crate::edit::{EditDraft, EditOutcome, UpdateResult, diff_edit};
use crate::filter::{FilterState, filter_rows};
use crate::matrix::{Row, aggregate, extract_sticky};
use crate::ordering::{
    known_sections, move_section, reorder_section_records, resolve_section_order, sort_rows,
};
use crate::prefs::PreferenceStore;
use crate::store::PlanStore;

/// A row together with its per-plan cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowView {
    #[serde(flatten)]
    pub row: Row,
    pub cells: Vec<CellView>,
}

impl RowView {
    fn build(row: Row, config: &MatrixConfig) -> Self {
        let cells = row_cells(&row, config);
        Self { row, cells }
    }
}

/// Everything needed to render the matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixView {
    pub plans: Vec<String>,
    /// Pinned rows, primary first; never filtered.
    pub sticky: Vec<RowView>,
    pub rows: Vec<RowView>,
    /// Resolved section order.
    pub sections: Vec<String>,
}

/// Run the full pipeline over a plan list.
#[must_use]
pub fn build_view(
    plans: &[Plan],
    filter: &FilterState,
    section_preference: Option<&[String]>,
    config: &MatrixConfig,
) -> MatrixView {
    let split = extract_sticky(aggregate(plans), &config.sticky);
    let sections = resolve_section_order(&known_sections(plans), section_preference);
    let rows = sort_rows(filter_rows(split.rest, filter), &sections);

    log::debug!(
        "{LOG_PIPELINE_BUILT}: plans={} sticky={} rows={} sections={} filters={}",
        plans.len(),
        split.sticky.len(),
        rows.len(),
        sections.len(),
        filter.active_count()
    );

    MatrixView {
        plans: plans.iter().map(|plan| plan.name.clone()).collect(),
        sticky: split
            .sticky
            .into_iter()
            .map(|row| RowView::build(row, config))
            .collect(),
        rows: rows
            .into_iter()
            .map(|row| RowView::build(row, config))
            .collect(),
        sections,
    }
}

/// Result of an optimistic command.
#[derive(Debug)]
pub enum CommandOutcome<E> {
    /// Nothing to do; local and remote state are untouched.
    Unchanged,
    /// Applied locally and persisted.
    Persisted,
    /// Applied locally, but persisting failed. The local state is kept.
    Diverged(E),
}

impl<E> CommandOutcome<E> {
    #[must_use]
    pub const fn is_diverged(&self) -> bool {
        matches!(self, Self::Diverged(_))
    }

    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted)
    }
}

/// Session state for one consumer of the matrix.
pub struct ComparisonSession<S, P>
where
    S: PlanStore,
    P: PreferenceStore,
{
    store: S,
    prefs: P,
    config: MatrixConfig,
    plans: Vec<Plan>,
    filter: FilterState,
    section_order: Option<Vec<String>>,
    diverged: bool,
}

impl<S, P> ComparisonSession<S, P>
where
    S: PlanStore,
    P: PreferenceStore,
{
    /// Open a session: load plans and the saved section order.
    ///
    /// An unreadable section order is ignored with a warning, since it is
    /// only a hint.
    ///
    /// # Errors
    ///
    /// Returns an error if the plans cannot be loaded.
    pub fn open(store: S, prefs: P, config: MatrixConfig) -> Result<Self, S::Error> {
        let section_order = match prefs.load_section_order() {
            Ok(order) => order,
            Err(err) => {
                log::warn!("ignoring unreadable section order: {err}");
                None
            }
        };
        let mut session = Self {
            store,
            prefs,
            config,
            plans: Vec::new(),
            filter: FilterState::default(),
            section_order,
            diverged: false,
        };
        session.refresh()?;
        Ok(session)
    }

    /// Reload plans from storage, discarding any local characteristic order.
    ///
    /// # Errors
    ///
    /// Returns an error if the plans cannot be loaded; the previous plans are
    /// kept in that case.
    pub fn refresh(&mut self) -> Result<(), S::Error> {
        self.plans = self.store.list_plans()?;
        self.diverged = false;
        Ok(())
    }

    #[must_use]
    pub fn view(&self) -> MatrixView {
        build_view(
            &self.plans,
            &self.filter,
            self.section_order.as_deref(),
            &self.config,
        )
    }

    #[must_use]
    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    #[must_use]
    pub const fn config(&self) -> &MatrixConfig {
        &self.config
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: FilterState) {
        self.filter = filter;
    }

    pub fn filter_mut(&mut self) -> &mut FilterState {
        &mut self.filter
    }

    /// Section order as currently applied, including sections not yet in
    /// the saved preference.
    #[must_use]
    pub fn section_order(&self) -> Vec<String> {
        resolve_section_order(&known_sections(&self.plans), self.section_order.as_deref())
    }

    /// Whether local characteristic order differs from what storage holds,
    /// because a reorder failed to persist since the last refresh.
    #[must_use]
    pub const fn is_diverged(&self) -> bool {
        self.diverged
    }

    /// Move `dragged` into `target`'s position and save the new order.
    pub fn reorder_sections(&mut self, dragged: &str, target: &str) -> CommandOutcome<P::Error> {
        let current = self.section_order();
        let next = move_section(&current, dragged, target);
        if next == current {
            return CommandOutcome::Unchanged;
        }
        self.section_order = Some(next.clone());
        match self.prefs.save_section_order(&next) {
            Ok(()) => CommandOutcome::Persisted,
            Err(err) => {
                log::warn!("{LOG_PERSIST_FAILED}: section order not saved: {err}");
                CommandOutcome::Diverged(err)
            }
        }
    }

    /// Reorder the characteristics of a section locally, then persist it.
    pub fn reorder_characteristics(
        &mut self,
        section: &str,
        names: &[String],
    ) -> CommandOutcome<S::Error> {
        if names.is_empty() {
            return CommandOutcome::Unchanged;
        }
        for plan in &mut self.plans {
            reorder_section_records(plan, section, names);
        }
        match self.store.reorder_characteristics(section, names) {
            Ok(()) => CommandOutcome::Persisted,
            Err(err) => {
                log::warn!("{LOG_PERSIST_FAILED}: characteristic order of {section:?} not saved: {err}");
                self.diverged = true;
                CommandOutcome::Diverged(err)
            }
        }
    }

    /// Find the aggregated row for `(section, characteristic)`.
    #[must_use]
    pub fn row(&self, section: &str, characteristic: &str) -> Option<Row> {
        aggregate(&self.plans)
            .into_iter()
            .find(|row| row.section == section && row.characteristic == characteristic)
    }

    /// Start editing a row.
    #[must_use]
    pub fn draft_for(&self, row: &Row) -> EditDraft {
        EditDraft::from_row(row, &self.config.sticky)
    }

    /// Save an edit: one write per changed field, each result reported.
    ///
    /// Writes are independent, so a failure does not stop later writes.
    /// Plans are reloaded when at least one write landed.
    pub fn save_edit(&mut self, row: &Row, draft: &EditDraft) -> EditOutcome<S::Error> {
        let plan_names: Vec<String> = self.plans.iter().map(|plan| plan.name.clone()).collect();
        let results: Vec<UpdateResult<S::Error>> = diff_edit(row, draft, &plan_names)
            .into_iter()
            .map(|request| {
                let result = self.store.update_value(&request);
                UpdateResult { request, result }
            })
            .collect();
        let outcome = EditOutcome { results };

        if !outcome.is_complete() {
            log::warn!(
                "{LOG_EDIT_PARTIAL}: {} of {} writes failed for {}/{}",
                outcome.failures().len(),
                outcome.results.len(),
                row.section,
                row.characteristic
            );
        }
        if outcome.applied() > 0
            && let Err(err) = self.refresh()
        {
            log::warn!("{LOG_PERSIST_FAILED}: reload after edit failed: {err}");
        }
        outcome
    }
}
