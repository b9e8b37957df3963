//! Terminal rendering for cases, reports, and the claims table.
//!
//! The case card renders a one-row summary RecordBatch grouped by section,
//! followed by the evidence list and the timeline from the record itself.

use arrow::array::Array;
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use chrono::{DateTime, Utc};
use recoverly_core::case::token;
use recoverly_core::claim::{count_by_status, total_approved};
use recoverly_core::{
    Case, Claim, ClaimPage, ClaimStatus, Completeness, DeadlineState, cases, deadline_state,
};
use recoverly_store::{CaseSet, UndoWindow};

const MAX_LIST_ITEMS: usize = 10;

// ── Summary section groupings ──

const IDENTITY: &[&str] = &["id", "status", "lane", "carrier", "customer"];
const RECOVERY: &[&str] = &["amount", "deadline", "confidence", "held"];

// ── Public API ──

/// Print the summary rows as an Arrow table.
pub fn print_case_table(rows: &[Case], active_filters: usize) -> anyhow::Result<()> {
    if rows.is_empty() {
        println!("No cases match.");
        return Ok(());
    }
    let batch = cases::to_record_batch(rows)?;
    arrow::util::pretty::print_batches(&[batch])?;
    println!("{}", table_footer(rows.len(), active_filters));
    Ok(())
}

/// Print a single case as a vertical card.
pub fn print_case_card(
    case: &Case,
    completeness: &Completeness,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let batch = cases::to_record_batch(std::slice::from_ref(case))?;

    println!("=== {} ===", case.id);
    println!("{} via {}", case.lane.label(), case.service);
    println!();

    print_section(&batch, "Identity", IDENTITY)?;
    print_section(&batch, "Recovery", RECOVERY)?;

    println!("Deadline");
    println!("  {:<26} {}", "urgency", deadline_text(deadline_state(case.deadline, now)));
    println!();

    println!("Confidence");
    println!("  {:<26} {}", "reason", case.confidence_reason);
    println!("  {:<26} {}", "route", token(&case.submission_route));
    println!();

    print_evidence(case, completeness);
    print_timeline(case);

    let shipment = &case.shipstation_shipment;
    println!("Shipment");
    println!("  {:<26} {}", "order", case.shopify_order.order_number);
    println!("  {:<26} {}", "tracking", case.tracking_number);
    println!("  {:<26} {}", "ship date", shipment.ship_date);
    println!("  {:<26} {} oz, {}", "declared", shipment.weight_oz, shipment.dimensions);
    if let Some(billed) = shipment.billed_weight_oz {
        let dims = shipment
            .billed_dimensions
            .as_ref()
            .map(|d| format!(", {d}"))
            .unwrap_or_default();
        println!("  {:<26} {} oz{}", "billed", billed, dims);
    }
    println!("  {:<26} {}", "shipping cost", shipment.shipping_cost);
    println!();
    Ok(())
}

/// Totals, per-carrier breakdown and denial reasons.
pub fn print_report(set: &CaseSet) {
    println!("Totals");
    println!("  {:<26} {}", "recovered", set.total_recovered());
    println!("  {:<26} {}", "in pipeline", set.pipeline_total());
    println!("  {:<26} {}", "denied", set.total_denied());
    println!("  {:<26} {}", "ready to file", set.ready_cases().len());
    println!("  {:<26} {}", "needs attention", set.needs_attention().len());
    println!();

    println!("By carrier");
    println!(
        "  {:<10} {:>12} {:>12} {:>12}",
        "carrier", "total", "approved", "denied"
    );
    for row in set.carrier_breakdown() {
        println!(
            "  {:<10} {:>12} {:>12} {:>12}",
            row.carrier.label(),
            row.total.to_string(),
            row.approved.to_string(),
            row.denied.to_string()
        );
    }
    println!();

    let denials = set.denial_reasons();
    if !denials.is_empty() {
        println!("Denial reasons");
        for d in denials {
            println!("  {:<10} {:>10}  {}", d.id, d.amount.to_string(), d.reason);
        }
        println!();
    }
}

/// The legacy claims table: one page plus a status tally over all claims.
pub fn print_claims(page: &ClaimPage, all: &[Claim]) {
    if page.items.is_empty() {
        println!("No claims match.");
    } else {
        println!(
            "  {:<9} {:<22} {:<6} {:<18} {:>10}  {:<9} {}",
            "id", "tracking", "carrier", "issue", "amount", "status", "deadline"
        );
        for c in &page.items {
            println!(
                "  {:<9} {:<22} {:<6} {:<18} {:>10}  {:<9} {}",
                c.id,
                truncate(&c.tracking, 22),
                c.carrier.label(),
                c.issue,
                c.amount.to_string(),
                c.status.label(),
                c.date
            );
        }
        println!(
            "page {} of {} ({} matching)",
            page.page,
            page.total_pages.max(1),
            page.total_matches
        );
    }
    println!();
    let tally: Vec<String> = ClaimStatus::ALL
        .iter()
        .map(|&s| format!("{} {}", s.label(), count_by_status(all, s)))
        .collect();
    println!("  {}", tally.join(" | "));
    println!("  {:<26} {}", "total approved", total_approved(all));
}

/// The toast shown after a mutation.
pub fn print_undo(window: &UndoWindow) {
    println!("{}", undo_toast(window));
}

// ── Sections ──

fn print_section(batch: &RecordBatch, header: &str, cols: &[&str]) -> anyhow::Result<()> {
    let options = FormatOptions::default();
    println!("{header}");
    for &col_name in cols {
        let Ok(idx) = batch.schema().index_of(col_name) else {
            continue;
        };
        let col = batch.column(idx);
        if col.is_null(0) {
            continue;
        }
        let formatter = ArrayFormatter::try_new(col.as_ref(), &options)?;
        println!("  {:<26} {}", col_name, formatter.value(0));
    }
    println!();
    Ok(())
}

fn print_evidence(case: &Case, completeness: &Completeness) {
    println!(
        "Evidence ({} of {} expected)",
        completeness.present,
        completeness.expected()
    );
    for e in &case.evidence {
        println!("  {:<26} {}", e.kind.label(), e.summary);
    }
    if !completeness.missing.is_empty() {
        let missing: Vec<&str> = completeness.missing.iter().map(|t| t.label()).collect();
        println!("  {:<26} {}", "missing", missing.join(", "));
    }
    let sources = case.source_summary();
    if !sources.is_empty() {
        println!("  {:<26} {}", "sources", sources);
    }
    println!();
}

fn print_timeline(case: &Case) {
    let len = case.timeline.len();
    if len == 0 {
        return;
    }
    println!("Timeline ({len}):");
    // Newest first.
    for event in case.timeline.iter().rev().take(MAX_LIST_ITEMS) {
        println!(
            "    {}  {:<28} {}",
            event.ts.format("%Y-%m-%d %H:%M"),
            event.event,
            event.note
        );
    }
    if len > MAX_LIST_ITEMS {
        println!("    ... and {} more", len - MAX_LIST_ITEMS);
    }
    println!();
}

// ── Helpers ──

fn deadline_text(state: DeadlineState) -> String {
    match state {
        DeadlineState::Passed => "deadline passed".to_string(),
        DeadlineState::Urgent { hours_left } => format!("{hours_left}h left"),
        DeadlineState::Upcoming { days_left, soon } => {
            let days = if days_left == 1 { "day" } else { "days" };
            if soon {
                format!("{days_left} {days} left (soon)")
            } else {
                format!("{days_left} {days} left")
            }
        }
    }
}

fn table_footer(count: usize, active_filters: usize) -> String {
    match active_filters {
        0 => format!("{count} case(s)"),
        n => format!("{count} case(s), {n} filter(s) active"),
    }
}

const TOAST_BAR_WIDTH: usize = 20;

/// Message, time left out of the full window, and a bar of the remaining share.
fn undo_toast(window: &UndoWindow) -> String {
    let filled = (window.progress() * TOAST_BAR_WIDTH as f64).ceil() as usize;
    let filled = filled.min(TOAST_BAR_WIDTH);
    format!(
        "{} Undo available for {}s of {}s [{}{}]",
        window.message(),
        window.seconds_left(),
        window.duration().as_secs(),
        "#".repeat(filled),
        "-".repeat(TOAST_BAR_WIDTH - filled)
    )
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn deadline_text_variants() {
        assert_eq!(deadline_text(DeadlineState::Passed), "deadline passed");
        assert_eq!(deadline_text(DeadlineState::Urgent { hours_left: 5 }), "5h left");
        assert_eq!(
            deadline_text(DeadlineState::Upcoming {
                days_left: 1,
                soon: true
            }),
            "1 day left (soon)"
        );
        assert_eq!(
            deadline_text(DeadlineState::Upcoming {
                days_left: 20,
                soon: false
            }),
            "20 days left"
        );
    }

    #[test]
    fn table_footer_counts_filters() {
        assert_eq!(table_footer(10, 0), "10 case(s)");
        assert_eq!(table_footer(3, 2), "3 case(s), 2 filter(s) active");
    }

    #[test]
    fn undo_toast_shows_time_left_and_bar() {
        let mut window = UndoWindow::new(
            "Case RC-1002 approved.",
            CaseSet::new(Vec::new()),
            Duration::from_secs(30),
        );
        assert_eq!(
            undo_toast(&window),
            "Case RC-1002 approved. Undo available for 30s of 30s [####################]"
        );

        // 15 s in: half the window left.
        for _ in 0..150 {
            window.tick();
        }
        assert_eq!(
            undo_toast(&window),
            "Case RC-1002 approved. Undo available for 15s of 30s [##########----------]"
        );

        for _ in 0..150 {
            window.tick();
        }
        assert_eq!(
            undo_toast(&window),
            "Case RC-1002 approved. Undo available for 0s of 30s [--------------------]"
        );
    }

    #[test]
    fn truncate_long_tracking() {
        assert_eq!(truncate("1Z999AA10123456784", 22), "1Z999AA10123456784");
        assert_eq!(truncate("abcdefghij", 6), "abc...");
    }
}
