//! Expands a free-text specialization (as suggested by the triage model or
//! typed by a user) into the set of terms stored doctors may be listed under.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info};

/// Similarity on a 0..=100 scale at or above which two terms match.
pub const DEFAULT_SIMILARITY_THRESHOLD: u32 = 80;

#[derive(Debug, Clone, Copy)]
pub struct SpecializationGroup {
    pub primary: &'static str,
    pub aliases: &'static [&'static str],
    pub keywords: &'static [&'static str],
}

const GROUPS: &[SpecializationGroup] = &[
    SpecializationGroup {
        primary: "cardiology",
        aliases: &["cardiologist", "heart specialist", "heart doctor", "cardiac specialist"],
        keywords: &["heart", "cardiac", "cardiovascular", "chest", "heart disease"],
    },
    SpecializationGroup {
        primary: "neurology",
        aliases: &["neurologist", "brain specialist", "nerve specialist", "brain doctor"],
        keywords: &["brain", "nerve", "neural", "nervous system", "headache", "migraine"],
    },
    SpecializationGroup {
        primary: "dermatology",
        aliases: &["dermatologist", "skin specialist", "skin doctor"],
        keywords: &["skin", "dermal", "cutaneous", "acne", "rash"],
    },
    SpecializationGroup {
        primary: "gastroenterology",
        aliases: &["gastroenterologist", "digestive specialist", "gi doctor"],
        keywords: &["stomach", "digestive", "intestine", "gi tract", "gut"],
    },
    SpecializationGroup {
        primary: "orthopedics",
        aliases: &["orthopedist", "bone specialist", "joint specialist", "orthopedic surgeon"],
        keywords: &["bone", "joint", "skeletal", "fracture", "spine"],
    },
    SpecializationGroup {
        primary: "pediatrics",
        aliases: &["pediatrician", "child specialist", "child doctor"],
        keywords: &["child", "infant", "baby", "pediatric", "children"],
    },
    SpecializationGroup {
        primary: "psychiatry",
        aliases: &["psychiatrist", "mental health specialist", "mental health doctor"],
        keywords: &["mental", "psychiatric", "psychological", "behavior", "mood"],
    },
    SpecializationGroup {
        primary: "pulmonology",
        aliases: &["pulmonologist", "lung specialist", "respiratory doctor"],
        keywords: &["lung", "respiratory", "breathing", "pulmonary", "chest"],
    },
    SpecializationGroup {
        primary: "endocrinology",
        aliases: &["endocrinologist", "hormone specialist", "diabetes doctor"],
        keywords: &["hormone", "thyroid", "diabetes", "endocrine", "metabolic"],
    },
    SpecializationGroup {
        primary: "ophthalmology",
        aliases: &["ophthalmologist", "eye specialist", "eye doctor"],
        keywords: &["eye", "vision", "ocular", "blurry vision", "eye pain", "eye infection"],
    },
    SpecializationGroup {
        primary: "nephrology",
        aliases: &["nephrologist", "kidney specialist", "renal doctor"],
        keywords: &["kidney", "renal", "urine", "kidney stones", "renal failure"],
    },
    SpecializationGroup {
        primary: "gynecology",
        aliases: &["gynecologist", "women's health specialist", "female health doctor"],
        keywords: &["female", "reproductive", "pelvic", "menstrual", "ovarian", "uterus"],
    },
    SpecializationGroup {
        primary: "urology",
        aliases: &["urologist", "urinary tract specialist", "bladder specialist"],
        keywords: &["urinary", "bladder", "kidney", "prostate", "urine", "urination problems"],
    },
    SpecializationGroup {
        primary: "allergology",
        aliases: &["allergist", "allergy specialist", "immune system doctor"],
        keywords: &["allergy", "immune", "asthma", "rash", "swelling", "sneezing"],
    },
    SpecializationGroup {
        primary: "obstetrics",
        aliases: &["obstetrician", "pregnancy specialist", "childbirth doctor"],
        keywords: &["pregnancy", "childbirth", "labor", "prenatal", "pregnant"],
    },
];

/// General-practice terms never expand into a specialist group.
const EXCLUDED: &[&str] = &[
    "general practitioner",
    "gp",
    "general doctor",
    "mbbs",
    "general medicine",
];

pub struct SpecializationMapper {
    groups: &'static [SpecializationGroup],
    alias_to_primary: HashMap<&'static str, usize>,
    threshold: u32,
}

impl Default for SpecializationMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl SpecializationMapper {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_SIMILARITY_THRESHOLD)
    }

    pub fn with_threshold(threshold: u32) -> Self {
        let mut alias_to_primary = HashMap::new();
        for (index, group) in GROUPS.iter().enumerate() {
            alias_to_primary.insert(group.primary, index);
            for alias in group.aliases {
                alias_to_primary.insert(*alias, index);
            }
        }

        Self {
            groups: GROUPS,
            alias_to_primary,
            threshold,
        }
    }

    pub fn groups(&self) -> &[SpecializationGroup] {
        self.groups
    }

    fn similarity(a: &str, b: &str) -> u32 {
        (strsim::normalized_levenshtein(a, b) * 100.0).round() as u32
    }

    fn group_matches(&self, target: &str, group: &SpecializationGroup) -> bool {
        if Self::similarity(target, group.primary) >= self.threshold {
            return true;
        }
        if group
            .aliases
            .iter()
            .any(|alias| Self::similarity(target, alias) >= self.threshold)
        {
            return true;
        }
        group
            .keywords
            .iter()
            .any(|keyword| keyword.contains(target) || target.contains(keyword))
    }

    /// Every primary name and alias of each group the target matches.
    ///
    /// A target that matches no group is returned as-is so unusual
    /// specializations can still be searched verbatim.
    pub fn find_matching_specializations(&self, target: &str) -> Vec<String> {
        let target = target.trim().to_lowercase();
        if target.is_empty() {
            return Vec::new();
        }
        if EXCLUDED.contains(&target.as_str()) {
            debug!("'{}' is a general-practice term, not expanding", target);
            return vec![target];
        }

        let mut matched: BTreeSet<usize> = BTreeSet::new();
        if let Some(index) = self.alias_to_primary.get(target.as_str()) {
            matched.insert(*index);
        }
        for (index, group) in self.groups.iter().enumerate() {
            if self.group_matches(&target, group) {
                matched.insert(index);
            }
        }

        if matched.is_empty() {
            debug!("No specialization group matched '{}'", target);
            return vec![target];
        }

        let terms: BTreeSet<String> = matched
            .into_iter()
            .flat_map(|index| {
                let group = &self.groups[index];
                std::iter::once(group.primary)
                    .chain(group.aliases.iter().copied())
                    .map(str::to_string)
            })
            .collect();

        info!("Found matching specializations for '{}': {:?}", target, terms);
        terms.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_expands_to_whole_group() {
        let mapper = SpecializationMapper::new();
        let terms = mapper.find_matching_specializations("Cardiologist");

        assert!(terms.contains(&"cardiology".to_string()));
        assert!(terms.contains(&"heart specialist".to_string()));
        assert!(!terms.contains(&"neurology".to_string()));
    }

    #[test]
    fn misspelling_matches_fuzzily() {
        let mapper = SpecializationMapper::new();
        let terms = mapper.find_matching_specializations("dermatolgy");

        assert!(terms.contains(&"dermatology".to_string()));
    }

    #[test]
    fn keyword_pulls_in_every_group_that_lists_it() {
        let mapper = SpecializationMapper::new();
        let terms = mapper.find_matching_specializations("chest");

        assert!(terms.contains(&"cardiology".to_string()));
        assert!(terms.contains(&"pulmonology".to_string()));
    }

    #[test]
    fn kidney_keyword_spans_nephrology_and_urology() {
        let mapper = SpecializationMapper::new();
        let terms = mapper.find_matching_specializations("kidney");

        assert!(terms.contains(&"nephrology".to_string()));
        assert!(terms.contains(&"urology".to_string()));
    }

    #[test]
    fn general_practice_is_not_expanded() {
        let mapper = SpecializationMapper::new();
        assert_eq!(
            mapper.find_matching_specializations("General Practitioner"),
            vec!["general practitioner".to_string()]
        );
    }

    #[test]
    fn unknown_term_falls_back_to_itself() {
        let mapper = SpecializationMapper::new();
        assert_eq!(
            mapper.find_matching_specializations("Podiatry"),
            vec!["podiatry".to_string()]
        );
        assert!(mapper.find_matching_specializations("   ").is_empty());
    }

    #[test]
    fn near_spelling_expands_into_that_group() {
        // Two edits against "cardiology" score exactly the default threshold.
        let terms = SpecializationMapper::new().find_matching_specializations("radiology");
        assert!(terms.contains(&"cardiology".to_string()));
        assert!(terms.contains(&"heart specialist".to_string()));
        assert!(!terms.contains(&"radiology".to_string()));
    }

    #[test]
    fn fifteen_groups_are_known() {
        assert_eq!(SpecializationMapper::new().groups().len(), 15);
    }
}
