//! Batch partitioning and result reassembly
//!
//! A batch is split into blank items (which map straight to the empty
//! result) and non-blank items (which go through the model stages). The
//! `blank` markers remember the original positions so the stage outputs can
//! be merged back in request order.

use nlp_serve_common::{NomSrlRequest, Result, ServiceError};

/// Anything that carries a sentence to annotate
pub trait HasSentence {
    fn sentence(&self) -> &str;
}

impl HasSentence for NomSrlRequest {
    fn sentence(&self) -> &str {
        &self.sentence
    }
}

/// A sentence is blank when nothing is left after trimming whitespace
#[must_use]
pub fn is_blank(sentence: &str) -> bool {
    sentence.trim().is_empty()
}

/// Batch split into blank markers and the non-blank subset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPartition<T> {
    /// One marker per original position, `true` where the sentence is blank
    pub blank: Vec<bool>,
    /// Non-blank items in their original relative order
    pub non_blank: Vec<T>,
}

impl<T> BatchPartition<T> {
    /// Size of the original batch
    #[must_use]
    pub fn len(&self) -> usize {
        self.blank.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blank.is_empty()
    }

    /// Number of blank items
    #[must_use]
    pub fn blank_count(&self) -> usize {
        self.blank.iter().filter(|&&b| b).count()
    }
}

/// Split `items` into blank markers and the non-blank subset
pub fn partition<T: HasSentence>(items: Vec<T>) -> BatchPartition<T> {
    let mut blank = Vec::with_capacity(items.len());
    let mut non_blank = Vec::with_capacity(items.len());

    for item in items {
        if is_blank(item.sentence()) {
            blank.push(true);
        } else {
            blank.push(false);
            non_blank.push(item);
        }
    }

    BatchPartition { blank, non_blank }
}

/// Merge pipeline results back into the original batch order
///
/// Blank positions receive `T::default()`; every other position takes the
/// next unconsumed entry of `results`. The results must be used up exactly.
pub fn reassemble<T: Default>(blank: &[bool], results: Vec<T>) -> Result<Vec<T>> {
    let mut remaining = results.into_iter();
    let mut merged = Vec::with_capacity(blank.len());
    for (position, &is_blank) in blank.iter().enumerate() {
        if is_blank {
            merged.push(T::default());
        } else {
            let result = remaining.next().ok_or_else(|| {
                ServiceError::Consistency(format!("no result left for position {position}"))
            })?;
            merged.push(result);
        }
    }

    let leftover = remaining.count();
    if leftover > 0 {
        return Err(ServiceError::Consistency(format!(
            "{leftover} results left over after reassembly"
        )));
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requests(sentences: &[&str]) -> Vec<NomSrlRequest> {
        sentences.iter().map(|s| NomSrlRequest::new(*s)).collect()
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank("   "));
        assert!(is_blank("\t\n "));
        assert!(!is_blank(" sale "));
    }

    #[test]
    fn test_partition_mixed_batch() {
        let partition = partition(requests(&["", "The sale closed.", "  ", "Sales rose."]));

        assert_eq!(partition.blank, vec![true, false, true, false]);
        assert_eq!(partition.non_blank, requests(&["The sale closed.", "Sales rose."]));
        assert_eq!(partition.len(), 4);
        assert_eq!(partition.blank_count(), 2);
        assert_eq!(
            partition.non_blank.len() + partition.blank_count(),
            partition.len()
        );
    }

    #[test]
    fn test_partition_keeps_original_text() {
        let partition = partition(requests(&["  padded sentence "]));
        assert_eq!(partition.non_blank, requests(&["  padded sentence "]));
    }

    #[test]
    fn test_partition_empty_batch() {
        let partition = partition(Vec::<NomSrlRequest>::new());
        assert!(partition.is_empty());
        assert!(partition.non_blank.is_empty());
    }

    #[test]
    fn test_reassemble_restores_order() {
        let merged = reassemble(&[true, false, true, false], vec![10, 20]).unwrap();
        assert_eq!(merged, vec![0, 10, 0, 20]);
    }

    #[test]
    fn test_reassemble_all_blank() {
        let merged: Vec<u32> = reassemble(&[true, true], Vec::new()).unwrap();
        assert_eq!(merged, vec![0, 0]);
    }

    #[test]
    fn test_reassemble_shortfall() {
        let err = reassemble(&[false, false], vec![1]).unwrap_err();
        assert!(matches!(err, ServiceError::Consistency(_)));
    }

    #[test]
    fn test_reassemble_leftover() {
        let err = reassemble(&[true, false], vec![1, 2]).unwrap_err();
        assert!(matches!(err, ServiceError::Consistency(_)));
    }
}
