//! Fixed labels used by the first-stage category classifier.

use std::sync::Arc;

/// The ordered label set of the category classifier.
///
/// The order is the index mapping into the model's output vector and must not
/// be changed independently of the trained artifact.
pub const LESION_CATEGORY_LABELS: [&str; 4] = ["benign", "malignant", "insect_bite", "no_bites"];

/// The category label that triggers second-stage species refinement.
pub const INSECT_BITE_LABEL: &str = "insect_bite";

/// Returns the category labels as shared strings, in model output order.
pub fn lesion_category_labels() -> Vec<Arc<str>> {
    LESION_CATEGORY_LABELS.iter().map(|&s| Arc::from(s)).collect()
}
