//! Strategies: which checkers run, in what order, with what weight.

use std::path::Path;

use marcsim_core::StrategyItem;
use serde::{Deserialize, Serialize};

use crate::checkers::CheckerKind;
use crate::error::{Result, SimilarityError};

const BUILTIN_STRATEGY: &str = include_str!("../strategies/default.toml");

/// A checker resolved against the registry, with its weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrategyEntry {
    pub checker: CheckerKind,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Strategy {
    entries: Vec<StrategyEntry>,
}

/// On-disk form: `[[checker]]` tables.
#[derive(Debug, Deserialize)]
struct StrategyFile {
    #[serde(default)]
    checker: Vec<StrategyItem>,
}

impl Strategy {
    /// Resolve names and validate weights. Fails on the first bad item.
    pub fn resolve(items: &[StrategyItem]) -> Result<Self> {
        let entries = items
            .iter()
            .map(|item| {
                let checker: CheckerKind = item.name.parse()?;
                if !item.weight.is_finite() || item.weight <= 0.0 {
                    return Err(SimilarityError::InvalidWeight {
                        name: item.name.clone(),
                        weight: item.weight,
                    });
                }
                Ok(StrategyEntry {
                    checker,
                    weight: item.weight,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: StrategyFile = toml::from_str(contents)?;
        Self::resolve(&file.checker)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let strategy = Self::from_toml(&contents)?;
        tracing::debug!(path = %path.display(), checkers = strategy.entries.len(), "loaded strategy");
        Ok(strategy)
    }

    /// Every registered checker at weight 1.
    pub fn builtin() -> Result<Self> {
        Self::from_toml(BUILTIN_STRATEGY)
    }

    /// Just one checker, for inspecting it in isolation.
    pub fn single(name: &str) -> Result<Self> {
        Self::resolve(&[StrategyItem::new(name, 1.0)])
    }

    pub fn entries(&self) -> &[StrategyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn builtin_covers_every_checker_in_order() {
        let strategy = Strategy::builtin().unwrap();
        let kinds: Vec<CheckerKind> = strategy.entries().iter().map(|e| e.checker).collect();
        assert_eq!(kinds, CheckerKind::ALL.to_vec());
        assert!(strategy.entries().iter().all(|e| e.weight == 1.0));
    }

    #[test]
    fn weight_defaults_to_one() {
        let strategy = Strategy::from_toml(
            "[[checker]]\nname = \"title\"\nweight = 2.5\n\n[[checker]]\nname = \"ISBN\"\n",
        )
        .unwrap();
        assert_eq!(
            strategy.entries(),
            &[
                StrategyEntry { checker: CheckerKind::Title, weight: 2.5 },
                StrategyEntry { checker: CheckerKind::Isbn, weight: 1.0 },
            ]
        );
    }

    #[test]
    fn unknown_checker_fails_at_load() {
        let err = Strategy::from_toml("[[checker]]\nname = \"isbn13\"\n").unwrap_err();
        assert!(matches!(err, SimilarityError::UnknownChecker(name) if name == "isbn13"));
    }

    #[test]
    fn rejects_bad_weights() {
        for weight in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = Strategy::resolve(&[StrategyItem::new("title", weight)]).unwrap_err();
            assert!(matches!(err, SimilarityError::InvalidWeight { .. }));
        }
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            Strategy::from_toml("[[checker]\nname ="),
            Err(SimilarityError::Toml(_))
        ));
    }

    #[test]
    fn single_checker() {
        let strategy = Strategy::single("years").unwrap();
        assert_eq!(strategy.len(), 1);
        assert_eq!(strategy.entries()[0].checker, CheckerKind::Years);
        assert!(Strategy::single("nope").is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("strategy.toml");
        std::fs::write(&path, "[[checker]]\nname = \"sarjat\"\nweight = 0.5\n").unwrap();

        let strategy = Strategy::load(&path).unwrap();
        assert_eq!(strategy.entries()[0].weight, 0.5);
        assert!(matches!(
            Strategy::load(&dir.path().join("missing.toml")),
            Err(SimilarityError::Io(_))
        ));
    }
}
