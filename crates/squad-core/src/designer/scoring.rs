//! Traceable confidence scores

use serde::Serialize;

/// One weighted input to a confidence score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    pub rule: &'static str,
    pub weight: f64,
    /// Rule outcome in `0.0..=1.0`
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfidenceScore {
    contributions: Vec<Contribution>,
}

impl ConfidenceScore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, rule: &'static str, weight: f64, value: f64) -> Self {
        self.contributions.push(Contribution {
            rule,
            weight,
            value: value.clamp(0.0, 1.0),
        });
        self
    }

    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    /// Weighted sum clamped to `0.0..=1.0`, rounded to two decimals
    pub fn total(&self) -> f64 {
        let sum: f64 = self.contributions.iter().map(|c| c.weight * c.value).sum();
        round2(sum.clamp(0.0, 1.0))
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_is_weighted_and_clamped() {
        let score = ConfidenceScore::new()
            .add("cohesion", 0.5, 1.0)
            .add("support", 0.5, 0.5);
        assert_eq!(score.total(), 0.75);
        assert_eq!(score.contributions().len(), 2);

        let over = ConfidenceScore::new().add("a", 0.8, 1.0).add("b", 0.8, 1.0);
        assert_eq!(over.total(), 1.0);

        let clamped = ConfidenceScore::new().add("c", 1.0, 7.0);
        assert_eq!(clamped.contributions()[0].value, 1.0);
    }
}
