//! Synthetic research data for seeding simulations and tests.
//!
//! Papers are drawn from fixed vocabularies of ML methods, datasets, metrics
//! and venues. A paper's claims reuse the method and dataset picked for its
//! title and abstract, so generated records stay internally consistent.

use serde::{Deserialize, Serialize};

use crate::constants::{
    PAPER_AUTHORS_COUNT_MAX, PAPER_AUTHORS_COUNT_MIN, PAPER_DATASET_COUNT_DEFAULT, PAPER_YEAR_MAX,
    PAPER_YEAR_MIN,
};
use crate::dst::DeterministicRng;

const METHODS: &[&str] = &[
    "BERT",
    "GPT",
    "ViT",
    "ResNet",
    "Transformer",
    "CLIP",
    "DeiT",
    "Swin",
];

const DATASETS: &[&str] = &["ImageNet", "COCO", "SQuAD", "GLUE", "WikiText", "CIFAR-10"];

const METRICS: &[&str] = &["accuracy", "F1", "perplexity", "mAP", "BLEU", "FID"];

const VENUES: &[&str] = &["ICLR", "NeurIPS", "ICML", "CVPR", "ACL", "EMNLP"];

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Barbara", "Claude", "Donald", "Edsger", "Frances", "Grace", "John", "Katherine",
    "Leslie", "Margaret", "Niklaus", "Radia", "Shafi", "Tony",
];

const LAST_NAMES: &[&str] = &[
    "Allen", "Hamilton", "Hinton", "Hopper", "Knuth", "Lamport", "Liskov", "Lovelace", "McCarthy",
    "Perlman", "Shannon", "Turing", "Wirth", "Goldwasser", "Hoare", "Dijkstra",
];

const PHRASE_ADJECTIVES: &[&str] = &[
    "Adaptive",
    "Robust",
    "Scalable",
    "Efficient",
    "Multi-layered",
    "Self-supervised",
    "Hierarchical",
    "Sparse",
];

const PHRASE_NOUNS: &[&str] = &[
    "Representations",
    "Pretraining",
    "Alignment",
    "Fine-tuning",
    "Distillation",
    "Benchmarks",
    "Generalization",
    "Scaling",
];

const WORDS: &[&str] = &[
    "gated", "linear", "local", "global", "dynamic", "spectral", "relative", "cross", "layer",
    "token", "rotary", "residual",
];

/// A quantitative result reported by a synthesized paper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimRecord {
    /// Metric name (e.g. "F1")
    pub metric: String,
    /// Dataset the metric was measured on
    pub dataset: String,
    /// Method the paper proposes
    pub method: String,
    /// Reported value
    pub value: f64,
}

/// A generated paper record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesizedPaper {
    /// Paper identifier (`test_p_{n}`)
    pub id: String,
    /// Title
    pub title: String,
    /// Abstract text
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Publication year
    pub year: i64,
    /// Publication venue
    pub venue: String,
    /// Author names
    pub authors: Vec<String>,
    /// Claims made by the paper
    pub claims: Vec<ClaimRecord>,
}

/// Deterministic generator of synthetic papers.
///
/// # Example
///
/// ```rust
/// use leibniz_core::fixtures::PaperGenerator;
///
/// let mut generator = PaperGenerator::with_seed(42);
/// let paper = generator.generate_paper(1);
/// assert_eq!(paper.id, "test_p_1");
/// assert_eq!(paper.claims[0].method, paper.title.split(' ').next().unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct PaperGenerator {
    rng: DeterministicRng,
}

impl PaperGenerator {
    /// Create a generator with the given seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: DeterministicRng::new(seed),
        }
    }

    /// Create a generator from an existing RNG.
    #[must_use]
    pub fn from_rng(rng: DeterministicRng) -> Self {
        Self { rng }
    }

    /// Seed the generator was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Generate one paper with id `test_p_{paper_id}`.
    pub fn generate_paper(&mut self, paper_id: usize) -> SynthesizedPaper {
        let method = *self.rng.choose(METHODS);
        let dataset = *self.rng.choose(DATASETS);

        let title = format!(
            "{method} Improvements on {dataset}: {}",
            self.catch_phrase()
        );
        let abstract_text = self.generate_abstract(method, dataset);
        let year = self.rng.next_int(PAPER_YEAR_MIN, PAPER_YEAR_MAX);
        let venue = (*self.rng.choose(VENUES)).to_string();

        let author_count = self
            .rng
            .next_usize(PAPER_AUTHORS_COUNT_MIN, PAPER_AUTHORS_COUNT_MAX);
        let authors = (0..author_count).map(|_| self.person_name()).collect();

        let claims = self.generate_claims(method, dataset);

        SynthesizedPaper {
            id: format!("test_p_{paper_id}"),
            title,
            abstract_text,
            year,
            venue,
            authors,
            claims,
        }
    }

    /// Generate `n_papers` papers with ids `test_p_0..test_p_{n-1}`.
    pub fn generate_dataset(&mut self, n_papers: usize) -> Vec<SynthesizedPaper> {
        let papers: Vec<SynthesizedPaper> =
            (0..n_papers).map(|i| self.generate_paper(i)).collect();

        // Postcondition
        debug_assert_eq!(papers.len(), n_papers, "must generate requested papers");
        papers
    }

    /// Generate the default-sized dataset.
    pub fn generate_default_dataset(&mut self) -> Vec<SynthesizedPaper> {
        self.generate_dataset(PAPER_DATASET_COUNT_DEFAULT)
    }

    fn generate_abstract(&mut self, method: &str, dataset: &str) -> String {
        if self.rng.next_usize(0, 1) == 0 {
            let attention = *self.rng.choose(WORDS);
            let regularization = *self.rng.choose(WORDS);
            let gain = self.rng.next_int(2, 10);
            format!(
                "We propose improvements to {method} that achieve state-of-the-art results on {dataset}. \
                 Our approach combines {attention} attention with {regularization} regularization. \
                 Experiments show {gain}% improvement over baselines."
            )
        } else {
            let prefix = *self.rng.choose(WORDS);
            let accuracy = self.rng.next_float_range(85.0, 99.0);
            let pooling = *self.rng.choose(WORDS);
            let normalization = *self.rng.choose(WORDS);
            format!(
                "This paper introduces {prefix}-{method}, a novel variant achieving \
                 {accuracy:.1}% accuracy on {dataset}. \
                 Key innovations include {pooling} pooling and {normalization} normalization."
            )
        }
    }

    fn generate_claims(&mut self, method: &str, dataset: &str) -> Vec<ClaimRecord> {
        let metric = *self.rng.choose(METRICS);
        let value = self.rng.next_float_range(70.0, 99.0);

        vec![ClaimRecord {
            metric: metric.to_string(),
            dataset: dataset.to_string(),
            method: method.to_string(),
            value,
        }]
    }

    fn person_name(&mut self) -> String {
        let first = *self.rng.choose(FIRST_NAMES);
        let last = *self.rng.choose(LAST_NAMES);
        format!("{first} {last}")
    }

    fn catch_phrase(&mut self) -> String {
        let adjective = *self.rng.choose(PHRASE_ADJECTIVES);
        let noun = *self.rng.choose(PHRASE_NOUNS);
        format!("{adjective} {noun}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_papers() {
        let a = PaperGenerator::with_seed(42).generate_dataset(10);
        let b = PaperGenerator::with_seed(42).generate_dataset(10);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_different_papers() {
        let a = PaperGenerator::with_seed(1).generate_dataset(10);
        let b = PaperGenerator::with_seed(2).generate_dataset(10);
        assert_ne!(a, b);
    }

    #[test]
    fn test_paper_fields_within_vocabulary() {
        let mut generator = PaperGenerator::with_seed(7);

        for paper in generator.generate_dataset(50) {
            assert!((PAPER_YEAR_MIN..=PAPER_YEAR_MAX).contains(&paper.year));
            assert!(VENUES.contains(&paper.venue.as_str()));
            assert!(
                (PAPER_AUTHORS_COUNT_MIN..=PAPER_AUTHORS_COUNT_MAX).contains(&paper.authors.len())
            );
            assert_eq!(paper.claims.len(), 1);
        }
    }

    #[test]
    fn test_claims_consistent_with_abstract() {
        let mut generator = PaperGenerator::with_seed(99);

        for paper in generator.generate_dataset(50) {
            let claim = &paper.claims[0];
            assert!(METHODS.contains(&claim.method.as_str()));
            assert!(METRICS.contains(&claim.metric.as_str()));
            assert!(paper.abstract_text.contains(&claim.method));
            assert!(paper.abstract_text.contains(&claim.dataset));
            assert!(paper.title.starts_with(&claim.method));
            assert!((70.0..99.0).contains(&claim.value));
        }
    }

    #[test]
    fn test_dataset_ids_sequential() {
        let papers = PaperGenerator::with_seed(3).generate_dataset(5);
        let ids: Vec<&str> = papers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["test_p_0", "test_p_1", "test_p_2", "test_p_3", "test_p_4"]);
    }

    #[test]
    fn test_default_dataset_size() {
        let papers = PaperGenerator::with_seed(3).generate_default_dataset();
        assert_eq!(papers.len(), PAPER_DATASET_COUNT_DEFAULT);
    }

    #[test]
    fn test_paper_serializes_abstract_key() {
        let paper = PaperGenerator::with_seed(5).generate_paper(0);
        let value = serde_json::to_value(&paper).unwrap();
        assert!(value.get("abstract").is_some());
        assert!(value.get("abstract_text").is_none());
    }
}
