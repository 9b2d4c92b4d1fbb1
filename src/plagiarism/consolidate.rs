use crate::models::{PairwiseMatch, ReportBucket, SuspicionFinding};

pub const DEFAULT_MIN_SIMILARITY: u8 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsolidationOptions {
    /// Matches below this percentage are dropped.
    pub min_similarity: u8,
    /// Keep only matches between contestants of two different known schools.
    pub cross_school_only: bool,
}

impl Default for ConsolidationOptions {
    fn default() -> Self {
        Self {
            min_similarity: DEFAULT_MIN_SIMILARITY,
            cross_school_only: false,
        }
    }
}

/// Consolidated matches, per report and overall.
#[derive(Debug, Clone, PartialEq)]
pub struct Consolidated {
    pub buckets: Vec<ReportBucket>,
    pub ranked: Vec<PairwiseMatch>,
}

fn is_cross_school(m: &PairwiseMatch) -> bool {
    match (m.sides[0].author.school(), m.sides[1].author.school()) {
        (Some(first), Some(second)) => first != second,
        _ => false,
    }
}

/// Filter by author, threshold and school, then rank by similarity, highest first.
///
/// The sort is stable, so equal similarities keep parser order.
pub fn consolidate(
    matches: impl IntoIterator<Item = PairwiseMatch>,
    options: ConsolidationOptions,
) -> Vec<PairwiseMatch> {
    let mut kept: Vec<PairwiseMatch> = matches
        .into_iter()
        .filter(|m| !m.is_same_author() && m.similarity >= options.min_similarity)
        .filter(|m| !options.cross_school_only || is_cross_school(m))
        .collect();
    kept.sort_by(|a, b| b.similarity.cmp(&a.similarity));
    kept
}

/// Consolidate every report on its own and all of them together.
pub fn consolidate_buckets(
    buckets: Vec<ReportBucket>,
    options: ConsolidationOptions,
) -> Consolidated {
    let ranked = consolidate(
        buckets.iter().flat_map(|bucket| bucket.matches.iter().cloned()),
        options,
    );
    let buckets = buckets
        .into_iter()
        .map(|bucket| ReportBucket {
            matches: consolidate(bucket.matches, options),
            ..bucket
        })
        .collect();
    Consolidated { buckets, ranked }
}

/// One finding for each contestant of the match, naming the other one.
pub fn expand(m: &PairwiseMatch) -> [SuspicionFinding; 2] {
    let finding = |own: usize, other: usize| SuspicionFinding {
        author: m.sides[own].author.clone(),
        problem: m.problem.clone(),
        similarity: Some(m.similarity),
        reason: format!(
            "Code is {}% similar to the code from {}",
            m.similarity,
            m.sides[other].author.display_name()
        ),
        details: m.results_url.clone(),
    };
    [finding(0, 1), finding(1, 0)]
}

pub fn expand_all(matches: &[PairwiseMatch]) -> Vec<SuspicionFinding> {
    matches.iter().flat_map(expand).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::models::{Author, MatchSide};
    use pretty_assertions::assert_eq;

    fn side(id: &str, name: Option<&str>) -> MatchSide {
        MatchSide {
            author: Author::new(id, name.map(str::to_string)),
            file_name: format!("00_{}.py", id),
        }
    }

    fn pair(a: MatchSide, b: MatchSide, similarity: u8) -> PairwiseMatch {
        PairwiseMatch {
            sides: [a, b],
            results_url: format!("http://moss/results/{}", similarity),
            problem: "sum".to_string(),
            language: Language::Python,
            status: format!("({}%)", similarity),
            similarity,
        }
    }

    fn similarities(matches: &[PairwiseMatch]) -> Vec<u8> {
        matches.iter().map(|m| m.similarity).collect()
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let matches = vec![
            pair(side("a", None), side("b", None), 29),
            pair(side("a", None), side("c", None), 30),
            pair(side("b", None), side("c", None), 75),
        ];
        let kept = consolidate(matches, ConsolidationOptions::default());
        assert_eq!(similarities(&kept), vec![75, 30]);
    }

    #[test]
    fn test_no_match_below_any_threshold() {
        let matches: Vec<PairwiseMatch> = (0..=100u8)
            .step_by(7)
            .map(|s| pair(side("a", None), side("b", None), s))
            .collect();
        for threshold in [0u8, 1, 30, 49, 50, 99, 100] {
            let options = ConsolidationOptions {
                min_similarity: threshold,
                cross_school_only: false,
            };
            let kept = consolidate(matches.clone(), options);
            assert!(kept.iter().all(|m| m.similarity >= threshold));
        }
    }

    #[test]
    fn test_ties_keep_parser_order() {
        let matches = vec![
            pair(side("a", None), side("b", None), 50),
            pair(side("c", None), side("d", None), 80),
            pair(side("e", None), side("f", None), 50),
        ];
        let kept = consolidate(matches, ConsolidationOptions::default());
        let firsts: Vec<&str> = kept.iter().map(|m| m.sides[0].author.id.as_str()).collect();
        assert_eq!(firsts, vec!["c", "a", "e"]);
    }

    #[test]
    fn test_same_author_never_kept() {
        let matches = vec![
            pair(side("a", None), side("a", None), 99),
            pair(side("a", None), side("b", None), 40),
        ];
        let kept = consolidate(matches, ConsolidationOptions::default());
        assert_eq!(similarities(&kept), vec![40]);
    }

    #[test]
    fn test_cross_school_filter() {
        let matches = vec![
            pair(side("a", Some("Ana-SchoolA")), side("b", Some("Beto-SchoolA")), 90),
            pair(side("a", Some("Ana-SchoolA")), side("c", Some("Carl-SchoolB")), 80),
            pair(side("a", Some("Ana-SchoolA")), side("d", Some("Dora")), 70),
            pair(side("e", None), side("f", None), 60),
        ];
        let options = ConsolidationOptions {
            min_similarity: 0,
            cross_school_only: true,
        };
        let kept = consolidate(matches.clone(), options);
        assert_eq!(similarities(&kept), vec![80]);

        let all = consolidate(matches, ConsolidationOptions::default());
        assert_eq!(similarities(&all), vec![90, 80, 70, 60]);
    }

    #[test]
    fn test_expand_names_the_other_party() {
        let m = pair(side("a", Some("Ana-SchoolA")), side("b", None), 64);
        let [first, second] = expand(&m);

        assert_eq!(first.author.id, "a");
        assert_eq!(first.reason, "Code is 64% similar to the code from b");
        assert_eq!(first.similarity, Some(64));
        assert_eq!(first.details, "http://moss/results/64");

        assert_eq!(second.author.id, "b");
        assert_eq!(
            second.reason,
            "Code is 64% similar to the code from Ana-SchoolA"
        );
        assert_eq!(second.problem, "sum");
    }

    #[test]
    fn test_consolidate_buckets() {
        let python = ReportBucket {
            problem: "sum".to_string(),
            language: Language::Python,
            matches: vec![
                pair(side("a", None), side("b", None), 40),
                pair(side("a", None), side("c", None), 10),
            ],
        };
        let cpp = ReportBucket {
            problem: "sum".to_string(),
            language: Language::Cpp,
            matches: vec![pair(side("d", None), side("e", None), 90)],
        };
        let consolidated = consolidate_buckets(vec![python, cpp], ConsolidationOptions::default());

        assert_eq!(similarities(&consolidated.ranked), vec![90, 40]);
        assert_eq!(consolidated.buckets.len(), 2);
        assert_eq!(similarities(&consolidated.buckets[0].matches), vec![40]);
        assert_eq!(consolidated.buckets[1].language, Language::Cpp);
        assert_eq!(expand_all(&consolidated.ranked).len(), 4);
    }
}
