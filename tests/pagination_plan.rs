//! Pagination planner properties over a grid of positions and widths

use ecashx::pagination::{
    available_slots, plan_pages, total_pages, Pagination, WidthUnit, MIN_SLOTS,
};

fn check_plan(current: u32, last: u32, slots: usize) {
    let pages = plan_pages(current, last, slots);
    let ctx = format!("current={current} last={last} slots={slots} pages={pages:?}");

    assert_eq!(pages.first(), Some(&1), "{ctx}");
    assert_eq!(pages.last(), Some(&last.max(1)), "{ctx}");
    assert!(pages.contains(&current.clamp(1, last.max(1))), "{ctx}");
    assert!(pages.windows(2).all(|w| w[0] < w[1]), "{ctx}");
    assert!(pages.len() <= slots.max(3), "{ctx}");
    if (last as usize) <= slots {
        assert_eq!(pages, (1..=last.max(1)).collect::<Vec<_>>(), "{ctx}");
    }
}

#[test]
fn plans_hold_for_small_tables() {
    for last in 1..=40 {
        for current in 1..=last {
            for slots in [MIN_SLOTS, 7, 9, 12, 15] {
                check_plan(current, last, slots);
            }
        }
    }
}

#[test]
fn plans_hold_for_deep_tables() {
    for last in [99, 100, 101, 537, 1_000, 9_999, 123_456] {
        for current in [1, 2, 3, last / 3, last / 2, last - 1, last] {
            for slots in [MIN_SLOTS, 8, 11, 12, 20, 40] {
                check_plan(current, last, slots);
            }
        }
    }
}

#[test]
fn bars_fit_their_width() {
    let last = 5_000;
    for width in (0..=400).step_by(20) {
        for unit in [WidthUnit::Cells, WidthUnit::Pixels] {
            let p = Pagination::plan(2_500, last, width, unit);
            let slots = available_slots(width, last, unit);
            assert!(slots >= MIN_SLOTS);
            assert!(p.pages.len() <= slots.max(3), "width {width}: {:?}", p.pages);
            assert!(p.pages.contains(&2_500));
        }
    }
}

#[test]
fn bar_neighbours_and_gaps() {
    let p = Pagination::plan(50, 100, 60, WidthUnit::Cells);
    assert_eq!(p.prev(), Some(49));
    assert_eq!(p.next(), Some(51));
    let gaps = p.with_gaps();
    assert_eq!(gaps.first(), Some(&Some(1)));
    assert_eq!(gaps.last(), Some(&Some(100)));
    // a gap marker never sits next to another one
    assert!(gaps.windows(2).all(|w| w[0].is_some() || w[1].is_some()));
}

#[test]
fn total_pages_from_rows() {
    assert_eq!(total_pages(0, 25), 1);
    assert_eq!(total_pages(250, 25), 10);
    assert_eq!(total_pages(251, 25), 11);
}
