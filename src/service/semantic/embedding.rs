//! Embedding-mode classification
//!
//! [`EmbeddingClassifier`] turns any [`TextEmbedder`] into a [`TextClassifier`]
//! by comparing the message embedding with one anchor embedding per label. The
//! anchors are computed once, when the classifier is built.

use async_trait::async_trait;
use std::sync::Arc;

use crate::model::LabelScore;
use crate::service::semantic::classifier::{TextClassifier, TextEmbedder};
use crate::service::semantic::error::SemanticError;
use crate::service::semantic::prompts::{SAFE_LABEL, label_phrase};

const DEFAULT_DIMENSIONS: usize = 512;
const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Function words shared by almost every message; hashing them drowns the signal
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "been", "by", "for", "from", "has", "have", "i",
    "in", "is", "it", "its", "me", "my", "of", "on", "or", "our", "so", "that", "the", "their",
    "this", "to", "us", "was", "we", "were", "will", "with", "you", "your", "yours",
];
const MIN_WORD_CHARS: usize = 3;

/// Offline embedder: character trigrams hashed into a fixed-size vector
///
/// Deterministic and dependency-free; it captures surface vocabulary overlap
/// rather than meaning.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions];
        let lower = text.to_lowercase();

        let words = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() >= MIN_WORD_CHARS && !STOP_WORDS.contains(w));
        for word in words {
            let padded: Vec<char> = format!(" {} ", word).chars().collect();
            for gram in padded.windows(3) {
                let bucket = fnv1a(gram) % self.dimensions as u64;
                vector[bucket as usize] += 1.0;
            }
        }

        normalize(&mut vector);
        vector
    }
}

#[async_trait]
impl TextEmbedder for HashingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, SemanticError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

fn fnv1a(chars: &[char]) -> u64 {
    let mut hash = FNV_OFFSET;
    for c in chars {
        let mut buf = [0u8; 4];
        for byte in c.encode_utf8(&mut buf).bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    }
    hash
}

fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|v| *v /= norm);
    }
}

/// Cosine similarity; zero when either vector is empty, zero-length or the
/// dimensions disagree
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum();
    let norm_a = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Zero-shot classification by similarity to per-label anchor embeddings
///
/// Risk labels are scored by how far they beat the `safe` anchor:
/// `(sim - safe) / (1 - safe)`, floored at zero. The `safe` label itself
/// reports its raw similarity.
pub struct EmbeddingClassifier {
    embedder: Arc<dyn TextEmbedder>,
    anchors: Vec<(String, Vec<f32>)>,
}

impl EmbeddingClassifier {
    /// Embed the anchor phrase of every label up front
    pub async fn new(
        embedder: Arc<dyn TextEmbedder>,
        labels: &[&str],
    ) -> Result<Self, SemanticError> {
        let phrases: Vec<String> = labels
            .iter()
            .map(|label| match label_phrase(label) {
                "" => label.to_string(),
                phrase => phrase.to_string(),
            })
            .collect();

        let vectors = embedder.embed(&phrases).await?;
        if vectors.len() != labels.len() {
            return Err(SemanticError::InvalidOutput(format!(
                "expected {} label embeddings, got {}",
                labels.len(),
                vectors.len()
            )));
        }

        tracing::info!(
            embedder = embedder.name(),
            labels = labels.len(),
            "Computed label anchor embeddings"
        );

        Ok(Self {
            anchors: labels.iter().map(|l| l.to_string()).zip(vectors).collect(),
            embedder,
        })
    }
}

#[async_trait]
impl TextClassifier for EmbeddingClassifier {
    async fn classify(
        &self,
        text: &str,
        labels: &[&str],
    ) -> Result<Vec<LabelScore>, SemanticError> {
        let mut vectors = self.embedder.embed(&[text.to_string()]).await?;
        let Some(embedding) = vectors.pop() else {
            return Err(SemanticError::InvalidOutput(
                "embedder returned no vector".to_string(),
            ));
        };

        let similarity =
            |anchor: &[f32]| cosine_similarity(&embedding, anchor).clamp(0.0, 1.0);
        let baseline = self
            .anchors
            .iter()
            .find(|(label, _)| label == SAFE_LABEL)
            .map(|(_, anchor)| similarity(anchor))
            .unwrap_or(0.0);

        let scores = self
            .anchors
            .iter()
            .filter(|(label, _)| labels.contains(&label.as_str()))
            .map(|(label, anchor)| {
                let raw = similarity(anchor);
                let confidence = if label == SAFE_LABEL {
                    raw
                } else if baseline >= 1.0 {
                    0.0
                } else {
                    ((raw - baseline) / (1.0 - baseline)).clamp(0.0, 1.0)
                };
                LabelScore::new(label.clone(), confidence)
            })
            .collect();
        Ok(scores)
    }

    fn name(&self) -> &str {
        self.embedder.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::semantic::prompts::LABELS;

    #[tokio::test]
    async fn test_hashing_embedder_is_deterministic_and_normalised() {
        let embedder = HashingEmbedder::default();
        let texts = vec!["Verify your account now".to_string()];
        let first = embedder.embed(&texts).await.unwrap();
        let second = embedder.embed(&texts).await.unwrap();
        assert_eq!(first, second);

        let norm: f32 = first[0].iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_cosine_similarity_edges() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 2.0], &[2.0, 4.0]) - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_embedding_classifier_ranks_matching_label_higher() {
        let classifier = EmbeddingClassifier::new(Arc::new(HashingEmbedder::default()), LABELS)
            .await
            .unwrap();
        let scores = classifier
            .classify(
                "You won the lottery! Claim your prize reward by wire transfer today",
                LABELS,
            )
            .await
            .unwrap();
        assert_eq!(scores.len(), LABELS.len());

        let confidence = |name: &str| {
            scores
                .iter()
                .find(|s| s.label == name)
                .map(|s| s.confidence)
                .unwrap()
        };
        assert!(confidence("financial scam") > confidence("safe"));
        assert!(confidence("financial scam") > confidence("urgent"));
        assert!(scores.iter().all(|s| (0.0..=1.0).contains(&s.confidence)));
    }

    #[tokio::test]
    async fn test_everyday_text_does_not_beat_safe_anchor() {
        let classifier = EmbeddingClassifier::new(Arc::new(HashingEmbedder::default()), LABELS)
            .await
            .unwrap();
        for text in [
            "Are we still on for lunch on Friday?",
            "Happy birthday! Hope you have a great day with the family.",
            "The build is green again, merging the fix after lunch.",
        ] {
            let scores = classifier.classify(text, LABELS).await.unwrap();
            assert!(
                scores
                    .iter()
                    .filter(|s| s.label != SAFE_LABEL)
                    .all(|s| s.confidence == 0.0),
                "{}: {:?}",
                text,
                scores
            );
        }
    }

    #[test]
    fn test_stop_words_are_not_hashed() {
        let embedder = HashingEmbedder::default();
        assert!(embedder.embed_one("you and the of to").iter().all(|v| *v == 0.0));
        assert_eq!(embedder.embed_one("prize"), embedder.embed_one("the prize for you"));
    }
}
