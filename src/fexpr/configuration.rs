//! Signal assignments and configuration spaces.

use super::error::FExprError;
use super::FExpr;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Source of signal values for guard evaluation.
///
/// `None` means the signal is unknown to the source.
pub trait SignalSource {
    fn signal(&self, name: &str) -> Option<bool>;
}

impl SignalSource for BTreeMap<String, bool> {
    fn signal(&self, name: &str) -> Option<bool> {
        self.get(name).copied()
    }
}

impl SignalSource for std::collections::HashMap<String, bool> {
    fn signal(&self, name: &str) -> Option<bool> {
        self.get(name).copied()
    }
}

/// An assignment of boolean values to features.
///
/// Ordered by feature name so that printing and serialization are stable.
///
/// # Example
///
/// ```rust
/// use ftsmind::fexpr::Configuration;
///
/// let config = Configuration::parse_assignments("mapping=false, lidar=1").unwrap();
/// assert_eq!(config.get("mapping"), Some(false));
/// assert_eq!(config.get("lidar"), Some(true));
/// assert_eq!(config.get("camera"), None);
/// assert_eq!(config.to_string(), "lidar=true,mapping=false");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration {
    values: BTreeMap<String, bool>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style assignment.
    pub fn with(mut self, name: impl Into<String>, value: bool) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: bool) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<bool> {
        self.values.get(name).copied()
    }

    /// Features assigned `true`.
    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.values
            .iter()
            .filter(|(_, value)| **value)
            .map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether every feature in `features` has a value.
    pub fn covers<'a>(&self, features: impl IntoIterator<Item = &'a String>) -> bool {
        features.into_iter().all(|f| self.values.contains_key(f))
    }

    /// Restrict the configuration to the given features.
    pub fn restrict<'a>(&self, features: impl IntoIterator<Item = &'a String>) -> Self {
        let values = features
            .into_iter()
            .filter_map(|f| self.values.get(f).map(|v| (f.clone(), *v)))
            .collect();
        Self { values }
    }

    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, bool)>,
        K: Into<String>,
    {
        Self {
            values: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Parse `name=value` pairs separated by commas.
    ///
    /// Values are `true`/`false`, `1`/`0` or `on`/`off`. A bare name means
    /// `true`, a name prefixed with `!` means `false`.
    pub fn parse_assignments(text: &str) -> Result<Self, FExprError> {
        let mut config = Self::new();
        for part in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, value) = match part.split_once('=') {
                Some((name, value)) => {
                    let value = match value.trim().to_ascii_lowercase().as_str() {
                        "true" | "1" | "on" => true,
                        "false" | "0" | "off" => false,
                        _ => return Err(FExprError::InvalidAssignment(part.to_string())),
                    };
                    (name.trim(), value)
                }
                None => match part.strip_prefix('!') {
                    Some(name) => (name.trim(), false),
                    None => (part, true),
                },
            };
            if !is_identifier(name) {
                return Err(FExprError::InvalidAssignment(part.to_string()));
            }
            config.set(name, value);
        }
        Ok(config)
    }

    /// Enumerate all total assignments over `features`.
    ///
    /// The first configuration assigns `false` to everything; the feature at
    /// index `i` toggles with period `2^(i+1)`. At most
    /// [`MAX_ENUMERATED_FEATURES`] features can be enumerated; see
    /// [`ConfigurationSpace`] for a variant with a configurable limit.
    pub fn enumerate(
        features: &[String],
    ) -> Result<impl Iterator<Item = Configuration> + '_, FExprError> {
        if features.len() > MAX_ENUMERATED_FEATURES {
            return Err(FExprError::TooManyFeatures {
                count: features.len(),
                limit: MAX_ENUMERATED_FEATURES,
            });
        }
        let total: u64 = 1u64 << features.len();
        Ok((0..total).map(move |bits| Configuration {
            values: features
                .iter()
                .enumerate()
                .map(|(i, f)| (f.clone(), bits & (1u64 << i) != 0))
                .collect(),
        }))
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

impl SignalSource for Configuration {
    fn signal(&self, name: &str) -> Option<bool> {
        self.get(name)
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

impl FromIterator<(String, bool)> for Configuration {
    fn from_iter<T: IntoIterator<Item = (String, bool)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Default cap on the number of features a space may enumerate.
pub const DEFAULT_FEATURE_LIMIT: usize = 16;

/// Largest feature list [`Configuration::enumerate`] accepts.
pub const MAX_ENUMERATED_FEATURES: usize = 63;

/// The set of total configurations over some features, optionally
/// restricted by a constraint formula.
///
/// The constraint plays the role of a flat feature model: only
/// configurations satisfying it belong to the space.
#[derive(Clone, Debug)]
pub struct ConfigurationSpace {
    features: Vec<String>,
    constraint: FExpr,
    limit: usize,
}

impl ConfigurationSpace {
    pub fn new<I, K>(features: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let features: BTreeSet<String> = features.into_iter().map(Into::into).collect();
        Self {
            features: features.into_iter().collect(),
            constraint: FExpr::true_value(),
            limit: DEFAULT_FEATURE_LIMIT,
        }
    }

    /// Restrict the space; the constraint's features join the space.
    pub fn constrained_by(mut self, constraint: FExpr) -> Self {
        let mut features: BTreeSet<String> = self.features.into_iter().collect();
        features.extend(constraint.features());
        self.features = features.into_iter().collect();
        self.constraint = constraint;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn constraint(&self) -> &FExpr {
        &self.constraint
    }

    fn check_limit(&self) -> Result<(), FExprError> {
        if self.features.len() > self.limit.min(MAX_ENUMERATED_FEATURES) {
            return Err(FExprError::TooManyFeatures {
                count: self.features.len(),
                limit: self.limit,
            });
        }
        Ok(())
    }

    /// Iterate over the configurations of the space.
    pub fn iter(&self) -> Result<impl Iterator<Item = Configuration> + '_, FExprError> {
        self.check_limit()?;
        let constraint = &self.constraint;
        Ok(Configuration::enumerate(&self.features)?
            .filter(move |config| constraint.evaluate(config).unwrap_or(false)))
    }

    pub fn count(&self) -> Result<usize, FExprError> {
        Ok(self.iter()?.count())
    }

    /// Whether some configuration of the space satisfies `expr`.
    pub fn satisfies(&self, expr: &FExpr) -> Result<bool, FExprError> {
        let extended = self.clone().with_features(expr.features());
        extended.check_limit()?;
        for config in extended.iter()? {
            if expr.evaluate(&config)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn with_features(mut self, extra: BTreeSet<String>) -> Self {
        let mut features: BTreeSet<String> = self.features.into_iter().collect();
        features.extend(extra);
        self.features = features.into_iter().collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fexpr::parse;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn builder_assigns_values() {
        let config = Configuration::new().with("a", true).with("b", false);
        assert_eq!(config.get("a"), Some(true));
        assert_eq!(config.get("b"), Some(false));
        assert_eq!(config.get("c"), None);
        assert_eq!(config.len(), 2);
        assert_eq!(config.selected().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn parse_assignments_accepts_shorthand() {
        let config = Configuration::parse_assignments("mapping, !lidar, camera=off").unwrap();
        assert_eq!(config.get("mapping"), Some(true));
        assert_eq!(config.get("lidar"), Some(false));
        assert_eq!(config.get("camera"), Some(false));
    }

    #[test]
    fn parse_assignments_rejects_garbage() {
        assert!(matches!(
            Configuration::parse_assignments("mapping=maybe"),
            Err(FExprError::InvalidAssignment(_))
        ));
        assert!(matches!(
            Configuration::parse_assignments("1abc=true"),
            Err(FExprError::InvalidAssignment(_))
        ));
        assert!(Configuration::parse_assignments("").unwrap().is_empty());
    }

    #[test]
    fn display_matches_parse_format() {
        let config = Configuration::new().with("b", false).with("a", true);
        let text = config.to_string();
        assert_eq!(text, "a=true,b=false");
        assert_eq!(Configuration::parse_assignments(&text).unwrap(), config);
    }

    #[test]
    fn enumerate_yields_every_assignment_once() {
        let features = names(&["a", "b", "c"]);
        let all: Vec<Configuration> = Configuration::enumerate(&features).unwrap().collect();
        assert_eq!(all.len(), 8);

        let unique: BTreeSet<String> = all.iter().map(|c| c.to_string()).collect();
        assert_eq!(unique.len(), 8);

        assert_eq!(all[0].selected().count(), 0);
        assert_eq!(all[7].selected().count(), 3);
    }

    #[test]
    fn enumerate_over_no_features_yields_empty_configuration() {
        let all: Vec<Configuration> = Configuration::enumerate(&[]).unwrap().collect();
        assert_eq!(all, vec![Configuration::new()]);
    }

    #[test]
    fn enumerate_refuses_more_features_than_it_can_index() {
        let features: Vec<String> = (0..70).map(|i| format!("f{i}")).collect();
        assert!(matches!(
            Configuration::enumerate(&features),
            Err(FExprError::TooManyFeatures { count: 70, limit: MAX_ENUMERATED_FEATURES })
        ));
        assert!(Configuration::enumerate(&features[..MAX_ENUMERATED_FEATURES]).is_ok());
    }

    #[test]
    fn restrict_keeps_only_requested_features() {
        let config = Configuration::new().with("a", true).with("b", false);
        let features = names(&["b", "z"]);
        let restricted = config.restrict(&features);
        assert_eq!(restricted, Configuration::new().with("b", false));
        assert!(!restricted.covers(&features));
    }

    #[test]
    fn space_respects_constraint() {
        let space = ConfigurationSpace::new(["lidar", "camera"])
            .constrained_by(parse("lidar || camera").unwrap());
        assert_eq!(space.count().unwrap(), 3);
        assert!(space.iter().unwrap().all(|c| c.get("lidar") == Some(true)
            || c.get("camera") == Some(true)));
    }

    #[test]
    fn space_enforces_feature_limit() {
        let space = ConfigurationSpace::new(["a", "b", "c"]).with_limit(2);
        assert!(matches!(
            space.count(),
            Err(FExprError::TooManyFeatures { count: 3, limit: 2 })
        ));
    }

    #[test]
    fn satisfies_detects_contradictions() {
        let space = ConfigurationSpace::new(["mapping"]);
        assert!(space.satisfies(&parse("mapping && lidar").unwrap()).unwrap());
        assert!(!space.satisfies(&parse("mapping && !mapping").unwrap()).unwrap());

        let constrained = ConfigurationSpace::new(Vec::<String>::new())
            .constrained_by(parse("!mapping").unwrap());
        assert!(!constrained.satisfies(&parse("mapping").unwrap()).unwrap());
    }
}
