use std::fmt::{self, Display};

use machine_learning::scoring::Scorer;
use serde::{Deserialize, Serialize};

/// The benchmarks a run can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Cora,
    Pubmed,
    Arxiv,
    Products,
}

impl Dataset {
    /// The metric a dataset is scored with. The OGB benchmarks are scored
    /// by accuracy, the Planetoid ones by macro F1.
    pub fn scorer(self) -> Scorer {
        match self {
            Dataset::Arxiv | Dataset::Products => Scorer::Accuracy,
            Dataset::Cora | Dataset::Pubmed => Scorer::MacroF1,
        }
    }
}

impl Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dataset::Cora => "cora",
            Dataset::Pubmed => "pubmed",
            Dataset::Arxiv => "arxiv",
            Dataset::Products => "products",
        };

        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ogb_datasets_use_accuracy() {
        assert_eq!(Dataset::Arxiv.scorer(), Scorer::Accuracy);
        assert_eq!(Dataset::Products.scorer(), Scorer::Accuracy);
        assert_eq!(Dataset::Cora.scorer(), Scorer::MacroF1);
        assert_eq!(Dataset::Pubmed.scorer(), Scorer::MacroF1);
    }

    #[test]
    fn unknown_names_do_not_parse() {
        assert!(serde_json::from_str::<Dataset>("\"pubmed\"").is_ok());
        assert!(serde_json::from_str::<Dataset>("\"citeseer\"").is_err());
    }
}
