use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use super::super::domain::DegreeType;

/// Degree vocabulary, matched against lowercased text. Every alternative is anchored on
/// word boundaries so "md" never fires inside "maryland" and "ma" never fires at all
/// without the dotted form. Dotted short forms must not follow another dotted letter, so
/// "m.b.a." is never read as "b.a." and "d.m.d." never as "m.d.".
const DEGREE_PATTERNS: &[(DegreeType, &str)] = &[
    (
        DegreeType::Jd,
        r"(?:^|[^\w.])j\.\s?d\b|\bjd\b|\bjuris\s+doctor(?:ate)?\b",
    ),
    (
        DegreeType::Md,
        r"(?:^|[^\w.])m\.\s?d\b|\bmd\b|\bdoctor\s+of\s+medicine\b|\bmedical\s+doctor\b",
    ),
    (
        DegreeType::Phd,
        r"(?:^|[^\w.])ph\.?\s?d\b|\bd\.?phil\b|\bdoctorate\b|\bdoctoral\b|\bdoctor\s+of\s+philosophy\b",
    ),
    (
        DegreeType::Mba,
        r"(?:^|[^\w.])m\.?b\.?a\b|\bmaster\s+of\s+business\s+administration\b",
    ),
    (
        DegreeType::Llm,
        r"(?:^|[^\w.])l\.\s?l\.?\s?m\b|(?:^|[^\w.])ll\.\s?m\b|\bllm\s+(?:in|degree)\b|\bmaster\s+of\s+laws\b",
    ),
    (
        DegreeType::Master,
        r"(?:^|[^\w.])m\.\s?(?:sc|s|a)\b|\bmsc\b|(?:^|[^\w.])m\.?\s?eng\b|\bmaster(?:'s|s)?\s+(?:of|in|degree)\b|\bmaster's\b|\bmasters\b",
    ),
    (
        DegreeType::Bachelor,
        r"(?:^|[^\w.])b\.\s?(?:s|a)\b|\bbs\b|\bba\b|(?:^|[^\w.])b\.?\s?(?:sc|eng|tech)\b|\bbachelor(?:'s|s)?\b",
    ),
    (
        DegreeType::Other,
        r"\bassociate(?:'s)?\s+(?:degree|of)\b|(?:^|[^\w.])a\.a\.s\b|(?:^|[^\w.])d\.d\.s\b|\bdds\b|(?:^|[^\w.])d\.m\.d\b|\bpharm\.?\s?d\b|(?:^|[^\w.])ed\.\s?d\b",
    ),
];

/// Degrees that also count as a master's-level qualification.
const IMPLIES_MASTER: &[DegreeType] = &[DegreeType::Mba, DegreeType::Llm];

static MATCHERS: OnceLock<Vec<(DegreeType, Regex)>> = OnceLock::new();

fn matchers() -> &'static [(DegreeType, Regex)] {
    MATCHERS.get_or_init(|| {
        DEGREE_PATTERNS
            .iter()
            .map(|(degree, pattern)| {
                let regex = Regex::new(pattern).expect("degree pattern compiles");
                (*degree, regex)
            })
            .collect()
    })
}

/// Collect every degree mentioned in the normalised text.
pub(crate) fn detect_degrees(text: &str) -> BTreeSet<DegreeType> {
    let mut degrees: BTreeSet<DegreeType> = matchers()
        .iter()
        .filter(|(_, regex)| regex.is_match(text))
        .map(|(degree, _)| *degree)
        .collect();

    if IMPLIES_MASTER.iter().any(|degree| degrees.contains(degree)) {
        degrees.insert(DegreeType::Master);
    }

    degrees
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(text: &str) -> Vec<DegreeType> {
        detect_degrees(&text.to_lowercase()).into_iter().collect()
    }

    #[test]
    fn recognises_abbreviations_and_full_names() {
        assert_eq!(detect("J.D., Harvard Law School"), vec![DegreeType::Jd]);
        assert_eq!(detect("Doctor of Medicine, UCSF"), vec![DegreeType::Md]);
        assert_eq!(detect("Ph.D. in Molecular Biology"), vec![DegreeType::Phd]);
        assert_eq!(
            detect("B.S. Mechanical Engineering"),
            vec![DegreeType::Bachelor]
        );
        assert_eq!(detect("M.S. Statistics"), vec![DegreeType::Master]);
    }

    #[test]
    fn md_does_not_match_inside_words() {
        assert!(detect("University of Maryland, College Park").is_empty());
        assert!(detect("Worked with cmd tooling").is_empty());
    }

    #[test]
    fn two_letter_master_abbreviations_need_dots() {
        assert!(detect("Boston, MA; proficient in MS Office").is_empty());
    }

    #[test]
    fn mba_and_llm_imply_master() {
        assert_eq!(
            detect("MBA, Wharton"),
            vec![DegreeType::Mba, DegreeType::Master]
        );
        assert_eq!(
            detect("LL.M. in Taxation, NYU"),
            vec![DegreeType::Llm, DegreeType::Master]
        );
    }

    #[test]
    fn dotted_abbreviations_do_not_leak_shorter_forms() {
        assert_eq!(
            detect("M.B.A., Wharton"),
            vec![DegreeType::Mba, DegreeType::Master]
        );
        assert_eq!(detect("D.M.D., Harvard"), vec![DegreeType::Other]);
        assert_eq!(
            detect("B.A. Economics; M.B.A. Finance"),
            vec![DegreeType::Mba, DegreeType::Master, DegreeType::Bachelor]
        );
    }

    #[test]
    fn overlapping_mentions_are_all_recorded() {
        assert_eq!(
            detect("JD/MBA joint degree; BA Economics"),
            vec![
                DegreeType::Jd,
                DegreeType::Mba,
                DegreeType::Master,
                DegreeType::Bachelor
            ]
        );
    }

    #[test]
    fn other_degrees_fall_into_other() {
        assert_eq!(detect("Associate degree in nursing"), vec![DegreeType::Other]);
        assert_eq!(detect("PharmD"), vec![DegreeType::Other]);
    }
}
