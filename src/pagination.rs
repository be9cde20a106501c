//! Pagination planner
//!
//! Chooses which page links to show for a table given the current page, the
//! last page and how many links fit in the available width. Page 1, the last
//! page and the current page are always present; the rest are sampled
//! backward and forward from the current page with growing, rounded steps so
//! distant pages land on readable numbers (…, 300, 400, 480, 510, 525, 534, 536, 537).

use std::collections::BTreeSet;

/// Never plan fewer links than this, however narrow the container.
pub const MIN_SLOTS: usize = 5;

/// Unit of the width handed to [`available_slots`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidthUnit {
    /// Browser container width in CSS pixels.
    Pixels,
    /// Terminal columns.
    Cells,
}

pub fn digit_count(n: u32) -> u32 {
    n.max(1).ilog10() + 1
}

/// Average width of one page link, tiered by the digits of the largest page.
pub fn estimate_slot_width(last_page: u32, unit: WidthUnit) -> u32 {
    let digits = digit_count(last_page);
    match unit {
        WidthUnit::Pixels => match digits {
            0..=2 => 36,
            3 => 44,
            4 => 52,
            5 => 60,
            _ => 68,
        },
        // digits, the trailing space and a possible `… ` gap marker
        WidthUnit::Cells => digits + 3,
    }
}

pub fn available_slots(width: u32, last_page: u32, unit: WidthUnit) -> usize {
    let slot = estimate_slot_width(last_page, unit).max(1);
    ((width / slot) as usize).max(MIN_SLOTS)
}

/// Step sizes to walk away from the current page. Fewer slots get coarser
/// series; the table always ends with a step of at least `last_page`.
pub fn step_table(slots: usize, last_page: u32) -> Vec<u32> {
    let series: &[u32] = if slots < 8 {
        &[1]
    } else if slots < 12 {
        &[1, 5]
    } else {
        &[1, 2, 5]
    };

    let mut steps = Vec::new();
    let mut decade: u32 = 1;
    loop {
        for &m in series {
            let step = m.saturating_mul(decade);
            steps.push(step);
            if step >= last_page || step == u32::MAX {
                return steps;
            }
        }
        decade = match decade.checked_mul(10) {
            Some(d) => d,
            None => return steps,
        };
    }
}

fn round_down(value: u32, step: u32) -> u32 {
    value - value % step
}

/// Pages below `current`, nearest first, strictly decreasing and above 1.
fn walk_back(current: u32, steps: &[u32]) -> Vec<u32> {
    let mut out = Vec::new();
    let mut prev = current;
    for &step in steps {
        if prev <= step {
            break;
        }
        let value = round_down(prev - step, step);
        if value <= 1 {
            break;
        }
        out.push(value);
        prev = value;
    }
    out
}

/// Pages above `current`, nearest first, strictly increasing and below `last`.
fn walk_forward(current: u32, last: u32, steps: &[u32]) -> Vec<u32> {
    let mut out = Vec::new();
    let mut prev = current;
    for &step in steps {
        let Some(next) = prev.checked_add(step) else {
            break;
        };
        let value = round_down(next, step);
        if value >= last {
            break;
        }
        out.push(value);
        prev = value;
    }
    out
}

/// Ordered page numbers to render as links.
///
/// `current` is clamped into `1..=last`. The result is strictly increasing,
/// starts with 1, ends with `last` and contains `current`. It holds at most
/// `max(slots, 3)` entries.
pub fn plan_pages(current: u32, last: u32, slots: usize) -> Vec<u32> {
    let last = last.max(1);
    let current = current.clamp(1, last);
    if last as usize <= slots {
        return (1..=last).collect();
    }

    let steps = step_table(slots, last);
    let mut back = walk_back(current, &steps).into_iter();
    let mut forward = walk_forward(current, last, &steps).into_iter();

    let mut pages = BTreeSet::from([1, current, last]);
    let mut budget = slots.saturating_sub(pages.len());
    let mut take_back = true;
    while budget > 0 {
        // alternate sides; when one side is exhausted the other takes the rest
        let next = if take_back {
            back.next().or_else(|| forward.next())
        } else {
            forward.next().or_else(|| back.next())
        };
        match next {
            Some(page) => {
                if pages.insert(page) {
                    budget -= 1;
                }
            }
            None => break,
        }
        take_back = !take_back;
    }
    pages.into_iter().collect()
}

pub fn total_pages(total_rows: u64, rows_per_page: u32) -> u32 {
    let rows = u64::from(rows_per_page.max(1));
    let pages = total_rows.div_ceil(rows).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// A planned pagination bar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub current: u32,
    pub last: u32,
    pub pages: Vec<u32>,
}

impl Pagination {
    pub fn plan(current: u32, last: u32, width: u32, unit: WidthUnit) -> Self {
        let last = last.max(1);
        let current = current.clamp(1, last);
        let slots = available_slots(width, last, unit);
        Self {
            current,
            last,
            pages: plan_pages(current, last, slots),
        }
    }

    pub fn prev(&self) -> Option<u32> {
        (self.current > 1).then(|| self.current - 1)
    }

    pub fn next(&self) -> Option<u32> {
        (self.current < self.last).then(|| self.current + 1)
    }

    /// Links plus `None` wherever consecutive links skip pages.
    pub fn with_gaps(&self) -> Vec<Option<u32>> {
        let mut out = Vec::with_capacity(self.pages.len() * 2);
        let mut prev: Option<u32> = None;
        for &page in &self.pages {
            if let Some(p) = prev {
                if page > p + 1 {
                    out.push(None);
                }
            }
            out.push(Some(page));
            prev = Some(page);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_page_counts_list_everything() {
        assert_eq!(plan_pages(1, 5, 7), vec![1, 2, 3, 4, 5]);
        assert_eq!(plan_pages(3, 1, 7), vec![1]);
        assert_eq!(plan_pages(1, 0, 7), vec![1]);
    }

    #[test]
    fn middle_page_plan() {
        // slots 9 → 1-5 series: steps 1, 5, 10, 50, 100
        assert_eq!(
            plan_pages(50, 100, 9),
            vec![1, 30, 40, 49, 50, 51, 55, 60, 100]
        );
    }

    #[test]
    fn first_page_gives_slots_to_forward_walk() {
        let pages = plan_pages(1, 1000, 7);
        assert_eq!(pages.first(), Some(&1));
        assert_eq!(pages.last(), Some(&1000));
        assert_eq!(pages.len(), 5); // 1-series forward: 2, 10, 100
        assert_eq!(pages, vec![1, 2, 10, 100, 1000]);
    }

    #[test]
    fn current_is_kept_verbatim() {
        let pages = plan_pages(537, 2000, 15);
        assert!(pages.contains(&537));
        assert!(pages.contains(&536));
        assert!(pages.contains(&534));
        assert!(pages.contains(&525));
    }

    #[test]
    fn step_tables_by_slot_budget() {
        assert_eq!(step_table(5, 1000), vec![1, 10, 100, 1000]);
        assert_eq!(step_table(9, 80), vec![1, 5, 10, 50, 100]);
        assert_eq!(step_table(15, 30), vec![1, 2, 5, 10, 20, 50]);
        assert_eq!(step_table(15, 1), vec![1]);
    }

    #[test]
    fn slot_width_tiers() {
        assert_eq!(estimate_slot_width(9, WidthUnit::Pixels), 36);
        assert_eq!(estimate_slot_width(99, WidthUnit::Pixels), 36);
        assert_eq!(estimate_slot_width(100, WidthUnit::Pixels), 44);
        assert_eq!(estimate_slot_width(1000, WidthUnit::Pixels), 52);
        assert_eq!(estimate_slot_width(123_456, WidthUnit::Pixels), 68);
        assert_eq!(estimate_slot_width(12_345, WidthUnit::Cells), 8);
    }

    #[test]
    fn available_slots_has_floor() {
        assert_eq!(available_slots(400, 1000, WidthUnit::Pixels), 7);
        assert_eq!(available_slots(80, 12_345, WidthUnit::Cells), 10);
        assert_eq!(available_slots(10, 12_345, WidthUnit::Cells), MIN_SLOTS);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 100), 1);
        assert_eq!(total_pages(100, 100), 1);
        assert_eq!(total_pages(101, 100), 2);
        assert_eq!(total_pages(5, 0), 5);
    }

    #[test]
    fn gaps_and_neighbours() {
        let p = Pagination {
            current: 3,
            last: 10,
            pages: vec![1, 2, 3, 4, 10],
        };
        assert_eq!(
            p.with_gaps(),
            vec![Some(1), Some(2), Some(3), Some(4), None, Some(10)]
        );
        assert_eq!(p.prev(), Some(2));
        assert_eq!(p.next(), Some(4));
    }
}
