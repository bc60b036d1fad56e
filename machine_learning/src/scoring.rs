use serde::{Deserialize, Serialize};

/// The evaluation metric of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scorer {
    Accuracy,
    MacroF1,
}

impl Scorer {
    /// The name used as suffix in metric keys, e.g. `val_acc`.
    pub fn name(self) -> &'static str {
        match self {
            Scorer::Accuracy => "acc",
            Scorer::MacroF1 => "f1",
        }
    }

    /// Scores `preds` against `labels`, both holding one class per node.
    ///
    /// # Returns
    /// A value in `[0, 1]`, zero for an empty input.
    pub fn score(self, preds: &[usize], labels: &[usize]) -> f64 {
        match self {
            Scorer::Accuracy => accuracy(preds, labels),
            Scorer::MacroF1 => macro_f1(preds, labels),
        }
    }
}

fn accuracy(preds: &[usize], labels: &[usize]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }

    let hits = preds.iter().zip(labels).filter(|(p, y)| p == y).count();
    hits as f64 / labels.len() as f64
}

/// Unweighted mean of the per-class F1 over the classes present in either
/// the predictions or the labels.
fn macro_f1(preds: &[usize], labels: &[usize]) -> f64 {
    let classes = preds.iter().chain(labels).max().map_or(0, |&c| c + 1);
    let mut tp = vec![0usize; classes];
    let mut fp = vec![0usize; classes];
    let mut fn_ = vec![0usize; classes];

    for (&p, &y) in preds.iter().zip(labels) {
        if p == y {
            tp[y] += 1;
        } else {
            fp[p] += 1;
            fn_[y] += 1;
        }
    }

    let f1s: Vec<f64> = (0..classes)
        .filter_map(|c| {
            let denom = 2 * tp[c] + fp[c] + fn_[c];
            (denom > 0).then(|| 2.0 * tp[c] as f64 / denom as f64)
        })
        .collect();

    if f1s.is_empty() {
        return 0.0;
    }

    f1s.iter().sum::<f64>() / f1s.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_counts_hits() {
        assert_eq!(Scorer::Accuracy.score(&[0, 1, 1, 2], &[0, 1, 2, 2]), 0.75);
        assert_eq!(Scorer::Accuracy.score(&[], &[]), 0.0);
    }

    #[test]
    fn macro_f1_averages_over_present_classes() {
        // class 0: tp 1, fn 1 -> 2/3; class 1: tp 1, fp 1 -> 2/3; class 2 absent.
        let f1 = Scorer::MacroF1.score(&[0, 1, 1], &[0, 0, 1]);
        assert!((f1 - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn macro_f1_is_one_for_perfect_predictions() {
        assert_eq!(Scorer::MacroF1.score(&[3, 1, 3], &[3, 1, 3]), 1.0);
    }

    #[test]
    fn names_are_metric_suffixes() {
        assert_eq!(Scorer::Accuracy.name(), "acc");
        assert_eq!(Scorer::MacroF1.name(), "f1");
    }
}
