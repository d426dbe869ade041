//! Read-only rendering of a ledger for in-world inspection
//!
//! Pages hold at most [`LINES_PER_PAGE`] fixed-width lines, matching a book
//! page. Entry pages carry one column header and [`ENTRIES_PER_PAGE`] rows.

use crate::core::time::format_minutes;
use crate::ledger::vendor_ledger::Ledger;
use crate::models::entry::LedgerEntry;
use crate::models::simulation::DailySimulation;
use serde::Serialize;
use std::fmt;

pub const LINES_PER_PAGE: usize = 9;
pub const ENTRIES_PER_PAGE: usize = LINES_PER_PAGE - 1;

const ENTRY_COLUMNS: &str = "   Trans Time   |Amount|Balance";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayPage {
    pub lines: Vec<String>,
}

impl DisplayPage {
    fn new(lines: Vec<String>) -> Self {
        debug_assert!(lines.len() <= LINES_PER_PAGE);
        Self { lines }
    }
}

impl fmt::Display for DisplayPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

fn entry_row(entry: &LedgerEntry) -> String {
    format!(
        "{:<16}|{:>6}|{:>7}",
        format_minutes(&entry.timestamp()),
        entry.amount(),
        entry.running_balance()
    )
}

fn simulation_page(sim: &DailySimulation) -> DisplayPage {
    DisplayPage::new(vec![
        "== Cash Sim. ==".to_string(),
        "Start time:".to_string(),
        format!("    {}", format_minutes(&sim.start_time())),
        "End time:".to_string(),
        format!("    {}", format_minutes(&sim.end_time())),
        format!("Start Cash: {}", sim.starting_cash()),
        format!("# of Trans: {}", sim.transaction_count()),
        format!("Rand Seed: {:X}", sim.seed()),
    ])
}

impl Ledger {
    /// Header page, simulation page (if any), then the entries eight a page.
    pub fn to_display_pages(&self) -> Vec<DisplayPage> {
        let mut pages = vec![DisplayPage::new(vec![
            "== Ledger Header ==".to_string(),
            "Starting balance:".to_string(),
            format!("    {} gp", self.starting_balance()),
            "Max cash on hand:".to_string(),
            format!("    {} gp", self.current_max_cash()),
            "Max cash resets on:".to_string(),
            format!("  {}", format_minutes(&self.next_max_cash_reset())),
            match self.simulation() {
                Some(_) => String::new(),
                None => "No cash simulation.".to_string(),
            },
        ])];

        if let Some(sim) = self.simulation() {
            pages.push(simulation_page(sim));
        }

        for chunk in self.entries().chunks(ENTRIES_PER_PAGE) {
            let mut lines = Vec::with_capacity(chunk.len() + 1);
            lines.push(ENTRY_COLUMNS.to_string());
            lines.extend(chunk.iter().map(entry_row));
            pages.push(DisplayPage::new(lines));
        }
        pages
    }
}

impl fmt::Display for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Ledger Header ==")?;
        writeln!(f, "Vendor = {}", self.vendor_id())?;
        writeln!(f, "Starting Balance = {}", self.starting_balance())?;
        writeln!(f, "Max cash on hand = {}", self.current_max_cash())?;
        writeln!(f, "Max cash reset = {}", format_minutes(&self.next_max_cash_reset()))?;
        writeln!(f)?;
        writeln!(f, "-- Cash Flow Simulation --")?;
        match self.simulation() {
            Some(sim) => write!(f, "{}", sim)?,
            None => writeln!(f, "No cash simulation.")?,
        }
        writeln!(f)?;
        writeln!(f, "{}", ENTRY_COLUMNS)?;
        writeln!(f, "----------------+------+-------")?;
        for entry in self.entries() {
            writeln!(f, "{}", entry_row(entry))?;
        }
        Ok(())
    }
}
