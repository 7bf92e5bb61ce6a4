use serde::{Deserialize, Serialize};

/// A named reference sequence (e.g., one transposable-element copy)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSequence {
    /// Sequence identifier (FASTA record name, without description)
    pub id: String,

    /// Residues as read from the file; case is preserved
    pub sequence: Vec<u8>,
}

impl ReferenceSequence {
    pub fn new(id: impl Into<String>, sequence: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            sequence: sequence.into(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Number of length-`width` windows in this sequence (0 if it is shorter)
    #[must_use]
    pub fn window_count(&self, width: usize) -> usize {
        if width == 0 || self.sequence.len() < width {
            0
        } else {
            self.sequence.len() - width + 1
        }
    }
}
