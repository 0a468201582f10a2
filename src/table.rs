//! Table rendering: columns, local sorting, and control enablement.
//!
//! Sorting is a display concern over already-fetched rows; the source does
//! not support server-side sort, so toggling never triggers a refetch.

use std::cmp::Ordering;

use tabled::builder::Builder;
use tabled::settings::Style;

use crate::query::{QuerySnapshot, QueryStatus};
use crate::types::Team;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Abbreviation,
    FullName,
    City,
    Conference,
    Division,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Id,
        Column::Abbreviation,
        Column::FullName,
        Column::City,
        Column::Conference,
        Column::Division,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Column::Id => "ID",
            Column::Abbreviation => "Abbreviation",
            Column::FullName => "Full Name",
            Column::City => "City",
            Column::Conference => "Conference",
            Column::Division => "Division",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "id" => Some(Column::Id),
            "abbreviation" | "abbr" => Some(Column::Abbreviation),
            "full_name" | "name" => Some(Column::FullName),
            "city" => Some(Column::City),
            "conference" | "conf" => Some(Column::Conference),
            "division" | "div" => Some(Column::Division),
            _ => None,
        }
    }

    fn cell(&self, team: &Team) -> String {
        match self {
            Column::Id => team.id.to_string(),
            Column::Abbreviation => team.abbreviation.clone(),
            Column::FullName => team.full_name.clone(),
            Column::City => team.city.clone(),
            Column::Conference => team.conference.clone(),
            Column::Division => team.division.clone(),
        }
    }

    fn compare(&self, a: &Team, b: &Team) -> Ordering {
        match self {
            Column::Id => a.id.cmp(&b.id),
            Column::Abbreviation => a.abbreviation.cmp(&b.abbreviation),
            Column::FullName => a.full_name.cmp(&b.full_name),
            Column::City => a.city.cmp(&b.city),
            Column::Conference => a.conference.cmp(&b.conference),
            Column::Division => a.division.cmp(&b.division),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Sortable view over a page of teams. At most one column is sorted at a
/// time; toggling cycles none -> ascending -> descending -> none.
#[derive(Debug, Default, Clone, Copy)]
pub struct TableView {
    sort: Option<(Column, SortOrder)>,
}

impl TableView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort(&self) -> Option<(Column, SortOrder)> {
        self.sort
    }

    pub fn toggle_sort(&mut self, column: Column) {
        self.sort = match self.sort {
            Some((current, SortOrder::Ascending)) if current == column => {
                Some((column, SortOrder::Descending))
            }
            Some((current, SortOrder::Descending)) if current == column => None,
            _ => Some((column, SortOrder::Ascending)),
        };
    }

    /// Sort without the tri-state cycle, for one-shot listings.
    pub fn set_sort(&mut self, column: Column, order: SortOrder) {
        self.sort = Some((column, order));
    }

    fn header(&self, column: Column) -> String {
        match self.sort {
            Some((sorted, SortOrder::Ascending)) if sorted == column => {
                format!("{} ▲", column.label())
            }
            Some((sorted, SortOrder::Descending)) if sorted == column => {
                format!("{} ▼", column.label())
            }
            _ => column.label().to_string(),
        }
    }

    fn sorted<'a>(&self, teams: &'a [Team]) -> Vec<&'a Team> {
        let mut rows: Vec<&Team> = teams.iter().collect();
        if let Some((column, order)) = self.sort {
            rows.sort_by(|a, b| {
                let ordering = column.compare(a, b);
                match order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            });
        }
        rows
    }

    pub fn render(&self, teams: &[Team]) -> String {
        let mut builder = Builder::default();
        builder.push_record(Column::ALL.map(|c| self.header(c)));
        for team in self.sorted(teams) {
            builder.push_record(Column::ALL.map(|c| c.cell(team)));
        }
        builder.build().with(Style::rounded()).to_string()
    }
}

/// Enablement of the Next control, derived from the snapshot being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextControl {
    Enabled,
    /// Latest metadata says there is no further page.
    NoMorePages,
    /// The key changed, its fetch has not resolved, and no page beyond the
    /// current one is confirmed.
    FetchInFlight,
}

impl NextControl {
    pub fn from_snapshot(snapshot: &QuerySnapshot) -> Self {
        match &snapshot.data {
            // the latest displayed metadata governs, in-flight or not
            Some(page) if !page.has_next() => NextControl::NoMorePages,
            Some(_) if !snapshot.is_previous => NextControl::Enabled,
            Some(_) => match snapshot.status {
                // previous key's data on screen while the new key resolves
                QueryStatus::Loading | QueryStatus::Idle => NextControl::FetchInFlight,
                // error keeps the last valid enablement
                _ => NextControl::Enabled,
            },
            None => NextControl::FetchInFlight,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, NextControl::Enabled)
    }
}

/// Previous is purely positional.
pub fn previous_enabled(page_index: u32) -> bool {
    page_index > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responses::{PageMeta, TeamsPage};

    fn team(id: u64, city: &str, name: &str) -> Team {
        Team {
            id,
            abbreviation: name[..3].to_uppercase(),
            city: city.to_string(),
            conference: "East".to_string(),
            division: "Atlantic".to_string(),
            full_name: format!("{city} {name}"),
            name: name.to_string(),
        }
    }

    fn page_with_next(next_page: Option<u32>) -> TeamsPage {
        TeamsPage {
            data: vec![
                team(2, "Boston", "Celtics"),
                team(1, "Atlanta", "Hawks"),
                team(3, "Brooklyn", "Nets"),
            ],
            meta: PageMeta {
                current_page: 1,
                next_page,
                per_page: 5,
                total_count: 30,
                total_pages: 6,
            },
        }
    }

    fn snapshot(status: QueryStatus, data: Option<TeamsPage>, is_previous: bool) -> QuerySnapshot {
        QuerySnapshot {
            status,
            data,
            error: None,
            is_previous,
        }
    }

    #[test]
    fn toggle_cycles_through_three_states() {
        let mut view = TableView::new();
        view.toggle_sort(Column::City);
        assert_eq!(view.sort(), Some((Column::City, SortOrder::Ascending)));
        view.toggle_sort(Column::City);
        assert_eq!(view.sort(), Some((Column::City, SortOrder::Descending)));
        view.toggle_sort(Column::City);
        assert_eq!(view.sort(), None);
    }

    #[test]
    fn toggling_another_column_resets_to_ascending() {
        let mut view = TableView::new();
        view.toggle_sort(Column::City);
        view.toggle_sort(Column::City);
        view.toggle_sort(Column::Id);
        assert_eq!(view.sort(), Some((Column::Id, SortOrder::Ascending)));
    }

    #[test]
    fn sorted_rows_follow_sort_state() {
        let page = page_with_next(Some(2));
        let mut view = TableView::new();

        view.toggle_sort(Column::Id);
        let ids: Vec<u64> = view.sorted(&page.data).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        view.toggle_sort(Column::Id);
        let ids: Vec<u64> = view.sorted(&page.data).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn unsorted_rows_keep_fetch_order() {
        let page = page_with_next(Some(2));
        let view = TableView::new();
        let ids: Vec<u64> = view.sorted(&page.data).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn render_marks_sorted_header() {
        let page = page_with_next(Some(2));
        let mut view = TableView::new();
        view.toggle_sort(Column::City);
        let rendered = view.render(&page.data);
        assert!(rendered.contains("City ▲"));
        view.toggle_sort(Column::City);
        let rendered = view.render(&page.data);
        assert!(rendered.contains("City ▼"));
    }

    #[test]
    fn first_page_with_next_enables_next_only() {
        let snap = snapshot(QueryStatus::Success, Some(page_with_next(Some(2))), false);
        assert_eq!(NextControl::from_snapshot(&snap), NextControl::Enabled);
        assert!(!previous_enabled(0));
    }

    #[test]
    fn null_next_page_disables_next_even_in_flight() {
        let snap = snapshot(QueryStatus::Loading, Some(page_with_next(None)), true);
        assert_eq!(NextControl::from_snapshot(&snap), NextControl::NoMorePages);
    }

    #[test]
    fn pending_changed_key_disables_next() {
        let snap = snapshot(QueryStatus::Loading, Some(page_with_next(Some(2))), true);
        assert_eq!(NextControl::from_snapshot(&snap), NextControl::FetchInFlight);
    }

    #[test]
    fn error_keeps_last_enablement() {
        let snap = snapshot(QueryStatus::Error, Some(page_with_next(Some(2))), true);
        assert_eq!(NextControl::from_snapshot(&snap), NextControl::Enabled);
    }

    #[test]
    fn no_data_at_all_disables_next() {
        let snap = snapshot(QueryStatus::Loading, None, false);
        assert_eq!(NextControl::from_snapshot(&snap), NextControl::FetchInFlight);
    }
}
