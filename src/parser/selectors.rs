//! CSS selectors for the all-time toplist results table

use lazy_static::lazy_static;
use scraper::Selector;

// Helper macro to parse selectors safely at compile time
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

lazy_static! {
    static ref RECORDS_TABLE: Selector = parse_selector!("table.records-table");
    static ref TABLE_BODY: Selector = parse_selector!("tbody");
    static ref TABLE_ROW: Selector = parse_selector!("tr");
    static ref TABLE_CELL: Selector = parse_selector!("td");
}

/// Selectors for the `records-table` toplist layout
pub struct RecordsTableSelectors {
    pub table: &'static Selector,
    pub body: &'static Selector,
    pub row: &'static Selector,
    pub cell: &'static Selector,
}

impl RecordsTableSelectors {
    pub fn new() -> Self {
        Self {
            table: &RECORDS_TABLE,
            body: &TABLE_BODY,
            row: &TABLE_ROW,
            cell: &TABLE_CELL,
        }
    }
}

impl Default for RecordsTableSelectors {
    fn default() -> Self {
        Self::new()
    }
}

/// Positional layout of a toplist row. Column 7 is not exported.
pub mod columns {
    pub const RANK: usize = 0;
    pub const MARK: usize = 1;
    pub const WIND: usize = 2;
    pub const COMPETITOR: usize = 3;
    pub const DOB: usize = 4;
    pub const NATIONALITY: usize = 5;
    pub const POSITION: usize = 6;
    pub const VENUE: usize = 8;
    pub const DATE: usize = 9;
    pub const RESULT_SCORE: usize = 10;

    /// Rows with fewer cells are dropped
    pub const MIN_CELLS: usize = 11;
}
