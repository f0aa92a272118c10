//! Word vectors for phrase embedding
//!
//! Two sources are supported:
//! - fastText binary models (`.bin`), which keep the character n-gram
//!   buckets and so can build vectors for words they have never seen
//! - the fastText text format (`.vec`): a `<count> <dim>` header line, then
//!   one `<word> <v1> ... <vdim>` line per word; unknown words map to zeros

use anyhow::{bail, Context, Result};
use finalfusion::compat::fasttext::ReadFastText;
use finalfusion::embeddings::Embeddings;
use finalfusion::storage::{NdArray, Storage};
use finalfusion::vocab::{FastTextSubwordVocab, Vocab, WordIndex};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{info, warn};

type SubwordEmbeddings = Embeddings<FastTextSubwordVocab, NdArray>;

enum Table {
    Text(HashMap<String, Vec<f32>>),
    Subword(SubwordEmbeddings),
}

/// In-memory word vector table
pub struct WordVectors {
    dim: usize,
    table: Table,
}

impl Default for WordVectors {
    fn default() -> Self {
        Self {
            dim: 0,
            table: Table::Text(HashMap::new()),
        }
    }
}

impl WordVectors {
    /// Load a fastText model: `.bin` files as binary models with subword
    /// information, anything else as the text format
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading word vectors from {}", path.display());
        let file =
            File::open(path).with_context(|| format!("Failed to open word vectors: {}", path.display()))?;
        let mut reader = BufReader::new(file);

        let vectors = if path.extension().is_some_and(|ext| ext == "bin") {
            Self::read_fasttext(&mut reader)
        } else {
            Self::from_reader(reader)
        }
        .with_context(|| format!("Failed to parse word vectors: {}", path.display()))?;

        info!(
            "Loaded {} word vectors (dim={}, subwords={})",
            vectors.len(),
            vectors.dim,
            vectors.has_subwords()
        );
        Ok(vectors)
    }

    /// Read a fastText binary model
    pub fn read_fasttext<R: BufRead>(reader: &mut R) -> Result<Self> {
        let embeddings =
            SubwordEmbeddings::read_fasttext(reader).context("Invalid fastText model")?;
        Ok(Self {
            dim: embeddings.dims(),
            table: Table::Subword(embeddings),
        })
    }

    /// Parse the fastText text format from any buffered reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines();

        let header = lines.next().context("Missing header line")??;
        let mut fields = header.split_whitespace();
        let (Some(count), Some(dim), None) = (fields.next(), fields.next(), fields.next()) else {
            bail!("Header must be `<count> <dim>`, got: {header}");
        };
        let count: usize = count.parse().context("Invalid word count in header")?;
        let dim: usize = dim.parse().context("Invalid dimension in header")?;

        let mut vectors = HashMap::with_capacity(count);
        for (idx, line) in lines.enumerate() {
            let line_no = idx + 2;
            let line = line.with_context(|| format!("Failed to read line {line_no}"))?;
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }

            let mut fields = line.split(' ');
            let word = fields.next().unwrap_or_default().to_string();
            let values = fields
                .filter(|f| !f.is_empty())
                .map(str::parse::<f32>)
                .collect::<std::result::Result<Vec<f32>, _>>()
                .with_context(|| format!("Invalid float on line {line_no}"))?;
            if values.len() != dim {
                bail!(
                    "Line {line_no} has {} values, expected {dim}",
                    values.len()
                );
            }
            vectors.insert(word, values);
        }

        if vectors.len() != count {
            warn!(
                "Header declares {} words but {} were read",
                count,
                vectors.len()
            );
        }

        Ok(Self {
            dim,
            table: Table::Text(vectors),
        })
    }

    /// Build a text table from explicit vectors, all of length `dim`
    pub fn from_entries(
        dim: usize,
        entries: impl IntoIterator<Item = (String, Vec<f32>)>,
    ) -> Result<Self> {
        let mut vectors = HashMap::new();
        for (word, vector) in entries {
            if vector.len() != dim {
                bail!("Vector for {word:?} has {} values, expected {dim}", vector.len());
            }
            vectors.insert(word, vector);
        }
        Ok(Self {
            dim,
            table: Table::Text(vectors),
        })
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of in-vocabulary words
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.table {
            Table::Text(vectors) => vectors.len(),
            Table::Subword(embeddings) => embeddings.vocab().words_len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether unknown words are built from character n-grams
    #[must_use]
    pub fn has_subwords(&self) -> bool {
        matches!(self.table, Table::Subword(_))
    }

    /// Vector of `word`
    ///
    /// Binary models compose unknown words from their n-gram buckets, the
    /// same way fastText's `get_word_vector` does. Words with no known
    /// pieces, and unknown words of a text table, are zeros.
    #[must_use]
    pub fn word_vector(&self, word: &str) -> Vec<f32> {
        let vector = match &self.table {
            Table::Text(vectors) => vectors.get(word).cloned(),
            Table::Subword(embeddings) => subword_vector(embeddings, word),
        };
        vector.unwrap_or_else(|| vec![0.0; self.dim])
    }

    /// Element-wise mean of the word vectors of `text.split(' ')`
    #[must_use]
    pub fn phrase_vector(&self, text: &str) -> Vec<f32> {
        let mut sum = vec![0.0_f32; self.dim];
        let mut n = 0_usize;
        for word in text.split(' ') {
            for (acc, v) in sum.iter_mut().zip(self.word_vector(word)) {
                *acc += v;
            }
            n += 1;
        }
        let n = n as f32;
        sum.iter_mut().for_each(|v| *v /= n);
        sum
    }
}

/// Unnormalized fastText vector of `word`
///
/// In-vocabulary rows are stored l2-normalized next to their norms. Bucket
/// rows are stored as trained, so an unknown word is the plain mean of its
/// n-gram rows.
fn subword_vector(embeddings: &SubwordEmbeddings, word: &str) -> Option<Vec<f32>> {
    match embeddings.vocab().idx(word)? {
        WordIndex::Word(_) => {
            let stored = embeddings.embedding_with_norm(word)?;
            Some(stored.embedding.iter().map(|v| v * stored.norm).collect())
        }
        WordIndex::Subword(indices) => {
            if indices.is_empty() {
                return None;
            }
            let mut sum = vec![0.0_f32; embeddings.dims()];
            for idx in &indices {
                for (acc, v) in sum.iter_mut().zip(embeddings.storage().embedding(*idx).iter()) {
                    *acc += v;
                }
            }
            let n = indices.len() as f32;
            Some(sum.into_iter().map(|v| v / n).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VEC_FILE: &str = "3 2\nsale 1.0 2.0\nof 3.0 4.0\ncompany -1.0 0.5\n";

    fn vectors() -> WordVectors {
        WordVectors::from_reader(VEC_FILE.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_vec_format() {
        let vectors = vectors();
        assert_eq!(vectors.dim(), 2);
        assert_eq!(vectors.len(), 3);
        assert_eq!(vectors.word_vector("of"), vec![3.0, 4.0]);
    }

    #[test]
    fn test_unknown_word_is_zero() {
        assert_eq!(vectors().word_vector("musk"), vec![0.0, 0.0]);
    }

    #[test]
    fn test_phrase_vector_is_mean() {
        assert_eq!(vectors().phrase_vector("sale of"), vec![2.0, 3.0]);
    }

    #[test]
    fn test_phrase_vector_counts_unknown_words() {
        assert_eq!(vectors().phrase_vector("sale unknown"), vec![0.5, 1.0]);
    }

    #[test]
    fn test_single_word_phrase() {
        assert_eq!(vectors().phrase_vector("company"), vec![-1.0, 0.5]);
    }

    #[test]
    fn test_bad_header() {
        assert!(WordVectors::from_reader("not a header line\n".as_bytes()).is_err());
    }

    #[test]
    fn test_wrong_dimension() {
        let err = WordVectors::from_reader("1 3\nsale 1.0 2.0\n".as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("Line 2"));
    }

    #[test]
    fn test_from_entries_checks_dim() {
        assert!(WordVectors::from_entries(2, [("a".to_string(), vec![1.0])]).is_err());
        let vectors = WordVectors::from_entries(1, [("a".to_string(), vec![1.0])]).unwrap();
        assert_eq!(vectors.word_vector("a"), vec![1.0]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(VEC_FILE.as_bytes()).unwrap();
        let vectors = WordVectors::load(file.path()).unwrap();
        assert_eq!(vectors.len(), 3);
    }

    const BUCKETS: usize = 8;

    /// Serialize a fastText binary model with `dim = 2` and 3-gram buckets
    ///
    /// Every input row (words and buckets) is `row`, so any word that has at
    /// least one 3-gram comes out as `row`.
    fn fasttext_model(words: &[&str], row: [f32; 2]) -> Vec<u8> {
        let mut buf = Vec::new();
        let i32s = |buf: &mut Vec<u8>, values: &[i32]| {
            for v in values {
                buf.extend_from_slice(&v.to_le_bytes());
            }
        };

        // magic, version
        i32s(&mut buf, &[793_712_314, 12]);
        // dim, ws, epoch, min_count, neg, word_ngrams, loss (ns), model (cbow),
        // bucket, minn, maxn, lr_update_rate
        i32s(&mut buf, &[2, 5, 5, 1, 5, 1, 2, 1, BUCKETS as i32, 3, 3, 100]);
        buf.extend_from_slice(&1e-4_f64.to_le_bytes());

        // dictionary: size, nwords, nlabels, ntokens, pruneidx_size
        let nwords = words.len() as i32;
        i32s(&mut buf, &[nwords, nwords, 0]);
        buf.extend_from_slice(&(words.len() as i64 * 10).to_le_bytes());
        buf.extend_from_slice(&(-1_i64).to_le_bytes());
        for word in words {
            buf.extend_from_slice(word.as_bytes());
            buf.push(0);
            buf.extend_from_slice(&10_i64.to_le_bytes());
            buf.push(0);
        }

        // input matrix, not quantized
        buf.push(0);
        let rows = words.len() + BUCKETS;
        buf.extend_from_slice(&(rows as i64).to_le_bytes());
        buf.extend_from_slice(&2_i64.to_le_bytes());
        for _ in 0..rows {
            for v in row {
                buf.extend_from_slice(&v.to_le_bytes());
            }
        }

        // output matrix, not quantized
        buf.push(0);
        buf.extend_from_slice(&(words.len() as i64).to_le_bytes());
        buf.extend_from_slice(&2_i64.to_le_bytes());
        buf.extend(std::iter::repeat(0_u8).take(words.len() * 2 * 4));
        buf
    }

    fn subword_vectors() -> WordVectors {
        let model = fasttext_model(&["sale", "sales"], [0.5, -1.5]);
        WordVectors::read_fasttext(&mut model.as_slice()).unwrap()
    }

    fn assert_close(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-5, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn test_read_fasttext_model() {
        let vectors = subword_vectors();
        assert!(vectors.has_subwords());
        assert_eq!(vectors.dim(), 2);
        assert_eq!(vectors.len(), 2);
        assert_close(&vectors.word_vector("sale"), &[0.5, -1.5]);
    }

    #[test]
    fn test_unknown_word_built_from_ngrams() {
        let vectors = subword_vectors();
        assert_close(&vectors.word_vector("salesman"), &[0.5, -1.5]);
        assert_close(&vectors.phrase_vector("sale salesman"), &[0.5, -1.5]);
    }

    #[test]
    fn test_word_without_ngrams_is_zero() {
        // "<>" is shorter than the minimum n-gram length
        assert_eq!(subword_vectors().word_vector(""), vec![0.0, 0.0]);
        assert_close(&subword_vectors().phrase_vector("sale  sale"), &[1.0 / 3.0, -1.0]);
    }

    #[test]
    fn test_text_table_has_no_subwords() {
        let vectors = vectors();
        assert!(!vectors.has_subwords());
        assert_eq!(vectors.word_vector("salesman"), vec![0.0, 0.0]);
    }

    #[test]
    fn test_load_bin_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
        file.write_all(&fasttext_model(&["sale"], [1.0, 2.0])).unwrap();
        let vectors = WordVectors::load(file.path()).unwrap();
        assert!(vectors.has_subwords());
        assert_close(&vectors.word_vector("purchase"), &[1.0, 2.0]);
    }

    #[test]
    fn test_truncated_fasttext_model() {
        let model = fasttext_model(&["sale"], [1.0, 2.0]);
        let mut truncated = &model[..model.len() / 2];
        assert!(WordVectors::read_fasttext(&mut truncated).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(WordVectors::load(Path::new("/nonexistent/vectors.vec")).is_err());
    }
}
