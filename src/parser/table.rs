//! Toplist page extraction
//!
//! Turns one results page into a [`PageResult`]. The page structure is fixed:
//! a `table.records-table` whose body rows carry the columns listed in
//! [`columns`](crate::parser::selectors::columns).

use scraper::{ElementRef, Html};

use crate::models::{PageResult, ResultRow, ScrapeJob};
use crate::parser::selectors::{columns, RecordsTableSelectors};
use crate::utils::normalize_whitespace;

/// Extractor for toplist result tables
pub struct RecordsTableParser {
    selectors: RecordsTableSelectors,
}

impl RecordsTableParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            selectors: RecordsTableSelectors::new(),
        }
    }

    /// Parse one page for `job`.
    ///
    /// A missing table, a table without a body, or a body without rows yields
    /// [`PageResult::End`]. Rows with fewer than eleven cells are dropped, so a
    /// page whose rows are all malformed yields `Rows` with an empty vector and
    /// pagination continues.
    pub fn parse_page(&self, html: &str, job: &ScrapeJob) -> PageResult {
        let document = Html::parse_document(html);

        let Some(table) = document.select(self.selectors.table).next() else {
            return PageResult::End;
        };
        let Some(body) = table.select(self.selectors.body).next() else {
            return PageResult::End;
        };

        let rows: Vec<ElementRef<'_>> = body.select(self.selectors.row).collect();
        if rows.is_empty() {
            return PageResult::End;
        }

        let parsed: Vec<ResultRow> = rows
            .into_iter()
            .filter_map(|row| self.parse_row(row, job))
            .collect();

        PageResult::Rows(parsed)
    }

    fn parse_row(&self, row: ElementRef<'_>, job: &ScrapeJob) -> Option<ResultRow> {
        let cells: Vec<String> = row
            .select(self.selectors.cell)
            .map(|cell| normalize_whitespace(&cell.text().collect::<String>()))
            .collect();

        if cells.len() < columns::MIN_CELLS {
            return None;
        }

        Some(ResultRow {
            rank: cells[columns::RANK].clone(),
            mark: cells[columns::MARK].clone(),
            wind: cells[columns::WIND].clone(),
            competitor: cells[columns::COMPETITOR].clone(),
            dob: cells[columns::DOB].clone(),
            nationality: cells[columns::NATIONALITY].clone(),
            position: cells[columns::POSITION].clone(),
            venue: cells[columns::VENUE].clone(),
            event_date: cells[columns::DATE].clone(),
            result_score: cells[columns::RESULT_SCORE].clone(),
            discipline: job.discipline_slug.clone(),
            event_type: job.event_type_slug.clone(),
            gender: job.gender.clone(),
            age_category: job.age_category.clone(),
        })
    }
}

impl Default for RecordsTableParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> ScrapeJob {
        ScrapeJob::new("men", "senior", "100-metres", "sprints", "out/men")
    }

    const ROW: &str = r#"<tr>
        <td>1</td><td>9.58</td><td>+0.9</td>
        <td><a href="/athletes/jam/usain-bolt">Usain   BOLT</a></td>
        <td>21 AUG 1986</td><td>JAM</td><td>1f1</td><td></td>
        <td>Olympiastadion, Berlin (GER)</td><td>16 AUG 2009</td><td>1356</td>
    </tr>"#;

    fn page(body: &str) -> String {
        format!(
            r#"<html><body><table class="records-table"><thead><tr><th>Rank</th></tr></thead><tbody>{body}</tbody></table></body></html>"#
        )
    }

    #[test]
    fn test_parse_full_row() {
        let parser = RecordsTableParser::new();
        let result = parser.parse_page(&page(ROW), &job());

        let PageResult::Rows(rows) = result else {
            panic!("expected rows");
        };
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.rank, "1");
        assert_eq!(row.mark, "9.58");
        assert_eq!(row.wind, "+0.9");
        assert_eq!(row.competitor, "Usain BOLT");
        assert_eq!(row.dob, "21 AUG 1986");
        assert_eq!(row.nationality, "JAM");
        assert_eq!(row.position, "1f1");
        assert_eq!(row.venue, "Olympiastadion, Berlin (GER)");
        assert_eq!(row.event_date, "16 AUG 2009");
        assert_eq!(row.result_score, "1356");
        assert_eq!(row.discipline, "100-metres");
        assert_eq!(row.event_type, "sprints");
        assert_eq!(row.gender, "men");
        assert_eq!(row.age_category, "senior");
    }

    #[test]
    fn test_missing_table_ends_pagination() {
        let parser = RecordsTableParser::new();
        let html = "<html><body><p>No results</p></body></html>";
        assert_eq!(parser.parse_page(html, &job()), PageResult::End);
    }

    #[test]
    fn test_empty_body_ends_pagination() {
        let parser = RecordsTableParser::new();
        assert_eq!(parser.parse_page(&page(""), &job()), PageResult::End);
    }

    #[test]
    fn test_short_rows_dropped() {
        let parser = RecordsTableParser::new();
        let short = "<tr><td>2</td><td>9.63</td></tr>";
        let html = page(&format!("{ROW}{short}{ROW}"));

        let PageResult::Rows(rows) = parser.parse_page(&html, &job()) else {
            panic!("expected rows");
        };
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_all_short_rows_is_not_end() {
        let parser = RecordsTableParser::new();
        let html = page("<tr><td>ad</td></tr>");
        assert_eq!(parser.parse_page(&html, &job()), PageResult::Rows(vec![]));
    }

    #[test]
    fn test_row_order_preserved() {
        let parser = RecordsTableParser::new();
        let second = ROW.replace("<td>1</td>", "<td>2</td>");
        let html = page(&format!("{ROW}{second}"));

        let PageResult::Rows(rows) = parser.parse_page(&html, &job()) else {
            panic!("expected rows");
        };
        assert_eq!(rows[0].rank, "1");
        assert_eq!(rows[1].rank, "2");
    }
}
