//! Toplist page URL construction
//!
//! Format:
//! `{base}/records/all-time-toplists/{type}/{discipline}/all/{gender}/{age}?regionType=world&page={page}&...`

use url::Url;

use crate::models::ScrapeJob;
use crate::utils::error::FetchError;

/// Earliest date of the all-time window
const FIRST_DAY: &str = "1900-01-01";

/// URL builder for all-time toplist pages
#[derive(Debug, Clone)]
pub struct ToplistUrlBuilder {
    base: Url,
}

impl ToplistUrlBuilder {
    /// Create a builder for the given site root (scheme + host, optional path prefix)
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` if `base_url` cannot be parsed
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let base = Url::parse(base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self { base })
    }

    /// Build the URL of one page of a job's toplist
    ///
    /// `last_day` is the end of the date window, in `YYYY-MM-DD` format.
    ///
    /// # Examples
    ///
    /// ```
    /// use toplists::crawler::url::ToplistUrlBuilder;
    /// use toplists::models::ScrapeJob;
    ///
    /// let builder = ToplistUrlBuilder::new("https://worldathletics.org").unwrap();
    /// let job = ScrapeJob::new("women", "u20", "high-jump", "jumps", "out/women");
    /// let url = builder.page_url(&job, 2, "2024-06-01");
    /// assert!(url.starts_with(
    ///     "https://worldathletics.org/records/all-time-toplists/jumps/high-jump/all/women/u20?"
    /// ));
    /// assert!(url.contains("page=2"));
    /// ```
    #[must_use]
    pub fn page_url(&self, job: &ScrapeJob, page: u32, last_day: &str) -> String {
        let mut url = self.base.clone();

        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                "records",
                "all-time-toplists",
                job.event_type_slug.as_str(),
                job.discipline_slug.as_str(),
                "all",
                job.gender.as_str(),
                job.age_category.as_str(),
            ]);
        }

        url.query_pairs_mut()
            .clear()
            .append_pair("regionType", "world")
            .append_pair("page", &page.to_string())
            .append_pair("bestResultsOnly", "false")
            .append_pair("firstDay", FIRST_DAY)
            .append_pair("lastDay", last_day)
            .append_pair("maxResultsByCountry", "all")
            .append_pair("ageCategory", &job.age_category);

        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> ScrapeJob {
        ScrapeJob::new("men", "senior", "shot-put", "throws", "out/men")
    }

    #[test]
    fn test_page_url_full() {
        let builder = ToplistUrlBuilder::new("https://worldathletics.org").unwrap();
        let url = builder.page_url(&job(), 1, "2024-12-15");
        assert_eq!(
            url,
            "https://worldathletics.org/records/all-time-toplists/throws/shot-put/all/men/senior\
             ?regionType=world&page=1&bestResultsOnly=false&firstDay=1900-01-01\
             &lastDay=2024-12-15&maxResultsByCountry=all&ageCategory=senior"
        );
    }

    #[test]
    fn test_page_number_changes() {
        let builder = ToplistUrlBuilder::new("https://worldathletics.org").unwrap();
        assert!(builder.page_url(&job(), 7, "2024-12-15").contains("page=7"));
    }

    #[test]
    fn test_base_with_trailing_slash() {
        let builder = ToplistUrlBuilder::new("http://127.0.0.1:8080/").unwrap();
        let url = builder.page_url(&job(), 1, "2024-12-15");
        assert!(url.starts_with("http://127.0.0.1:8080/records/all-time-toplists/throws/"));
    }

    #[test]
    fn test_invalid_base_rejected() {
        assert!(ToplistUrlBuilder::new("not a url").is_err());
        assert!(ToplistUrlBuilder::new("mailto:someone@example.com").is_err());
    }
}
