//! Discipline mapping loading and scrape job enumeration
//!
//! The mapping document is a JSON array of option groups. The group named
//! `disciplineCode` lists, per (gender, age category), the discipline and
//! event-type slugs that have a toplist:
//!
//! ```json
//! [
//!   {
//!     "name": "disciplineCode",
//!     "cases": [
//!       {
//!         "gender": "women",
//!         "ageCategory": "senior",
//!         "values": [
//!           { "disciplineNameUrlSlug": "100-metres", "typeNameUrlSlug": "sprints" }
//!         ]
//!       }
//!     ]
//!   }
//! ]
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::models::ScrapeJob;
use crate::utils::error::ParseError;

/// Name of the option group holding the discipline mapping
pub const DISCIPLINE_GROUP: &str = "disciplineCode";

#[derive(Debug, Deserialize)]
struct OptionGroup {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    cases: Vec<OptionCase>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionCase {
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    age_category: Option<String>,
    #[serde(default)]
    values: Vec<OptionValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionValue {
    #[serde(default)]
    discipline_name_url_slug: Option<String>,
    #[serde(default)]
    type_name_url_slug: Option<String>,
}

/// Disciplines available for one (gender, age category)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    pub gender: String,
    pub age_category: String,
    /// (discipline slug, event type slug) pairs in document order
    pub disciplines: Vec<(String, String)>,
}

/// Discipline/type mapping keyed by (gender, age category), in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisciplineMapping {
    entries: Vec<MappingEntry>,
}

impl DisciplineMapping {
    /// Parse the mapping from the options JSON document
    ///
    /// Values lacking either slug are skipped. A repeated (gender, age
    /// category) case replaces the earlier one.
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        let groups: Vec<OptionGroup> = serde_json::from_str(json)?;
        let mut mapping = Self::default();

        for group in groups
            .into_iter()
            .filter(|g| g.name.as_deref() == Some(DISCIPLINE_GROUP))
        {
            for case in group.cases {
                let disciplines = case
                    .values
                    .into_iter()
                    .filter_map(|v| Some((v.discipline_name_url_slug?, v.type_name_url_slug?)))
                    .collect();

                mapping.insert(MappingEntry {
                    gender: case.gender.unwrap_or_default(),
                    age_category: case.age_category.unwrap_or_default(),
                    disciplines,
                });
            }
        }

        Ok(mapping)
    }

    /// Load the mapping from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read discipline mapping: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse discipline mapping: {}", path.display()))
    }

    fn insert(&mut self, entry: MappingEntry) {
        match self
            .entries
            .iter_mut()
            .find(|e| e.gender == entry.gender && e.age_category == entry.age_category)
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    /// Number of jobs the mapping expands to
    pub fn job_count(&self) -> usize {
        self.entries.iter().map(|e| e.disciplines.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.job_count() == 0
    }
}

/// Expand the mapping into one job per (gender, age category, discipline,
/// type), writing under `<scrape_root>/<gender>`. Nothing is deduplicated.
pub fn enumerate_jobs(mapping: &DisciplineMapping, scrape_root: &Path) -> Vec<ScrapeJob> {
    let mut jobs = Vec::with_capacity(mapping.job_count());

    for entry in mapping.entries() {
        let output_dir = scrape_root.join(&entry.gender);
        for (discipline, event_type) in &entry.disciplines {
            jobs.push(ScrapeJob::new(
                entry.gender.as_str(),
                entry.age_category.as_str(),
                discipline.as_str(),
                event_type.as_str(),
                output_dir.clone(),
            ));
        }
    }

    jobs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const OPTIONS: &str = r#"[
        { "name": "regionType", "cases": [] },
        {
            "name": "disciplineCode",
            "cases": [
                {
                    "gender": "women",
                    "ageCategory": "senior",
                    "values": [
                        { "disciplineNameUrlSlug": "100-metres", "typeNameUrlSlug": "sprints", "disciplineCode": "100" },
                        { "disciplineNameUrlSlug": "high-jump", "typeNameUrlSlug": "jumps" },
                        { "disciplineNameUrlSlug": "orphan" }
                    ]
                },
                {
                    "gender": "men",
                    "ageCategory": "u20",
                    "values": [
                        { "disciplineNameUrlSlug": "shot-put-6kg", "typeNameUrlSlug": "throws" }
                    ]
                }
            ]
        }
    ]"#;

    #[test]
    fn test_mapping_skips_incomplete_values() {
        let mapping = DisciplineMapping::from_json(OPTIONS).unwrap();
        assert_eq!(mapping.entries().len(), 2);
        assert_eq!(mapping.entries()[0].disciplines.len(), 2);
        assert_eq!(mapping.job_count(), 3);
    }

    #[test]
    fn test_other_groups_ignored() {
        let json = r#"[{ "name": "regionType", "cases": [{ "gender": "men", "ageCategory": "senior",
            "values": [{ "disciplineNameUrlSlug": "x", "typeNameUrlSlug": "y" }] }] }]"#;
        let mapping = DisciplineMapping::from_json(json).unwrap();
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_enumerate_cross_product() {
        let mapping = DisciplineMapping::from_json(OPTIONS).unwrap();
        let jobs = enumerate_jobs(&mapping, Path::new("processing/output"));

        assert_eq!(jobs.len(), 3);
        assert_eq!(
            jobs[0],
            ScrapeJob::new(
                "women",
                "senior",
                "100-metres",
                "sprints",
                "processing/output/women"
            )
        );
        assert_eq!(jobs[2].gender, "men");
        assert_eq!(jobs[2].age_category, "u20");
        assert_eq!(jobs[2].output_dir, PathBuf::from("processing/output/men"));
    }

    #[test]
    fn test_duplicates_not_removed() {
        let json = r#"[{ "name": "disciplineCode", "cases": [{ "gender": "men", "ageCategory": "senior",
            "values": [
                { "disciplineNameUrlSlug": "mile", "typeNameUrlSlug": "middlelong" },
                { "disciplineNameUrlSlug": "mile", "typeNameUrlSlug": "middlelong" }
            ] }] }]"#;
        let mapping = DisciplineMapping::from_json(json).unwrap();
        assert_eq!(enumerate_jobs(&mapping, Path::new("out")).len(), 2);
    }

    #[test]
    fn test_malformed_document() {
        assert!(DisciplineMapping::from_json("{ not json").is_err());
    }
}
