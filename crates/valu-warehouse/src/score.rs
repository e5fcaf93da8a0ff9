use crate::fundamentals::{Field, FundamentalsRecord};
use crate::normalize::normalize;

/// One heuristic: a predicate over a single normalised field, worth `points` when met.
#[derive(Clone, Copy, Debug)]
pub struct ScoreRule {
    pub field: Field,
    pub points: u8,
    pub condition: &'static str,
    test: fn(f64) -> bool,
}

impl ScoreRule {
    pub fn apply(&self, value: Option<f64>) -> u8 {
        match value {
            Some(value) if (self.test)(value) => self.points,
            _ => 0,
        }
    }
}

fn low_leverage(v: f64) -> bool {
    v < 1.0
}

fn high_return_on_equity(v: f64) -> bool {
    v > 15.0
}

fn healthy_margin(v: f64) -> bool {
    v > 10.0
}

fn growing_revenue(v: f64) -> bool {
    v > 5.0
}

fn balanced_liquidity(v: f64) -> bool {
    (1.0..=2.0).contains(&v)
}

pub const RULES: [ScoreRule; 5] = [
    ScoreRule {
        field: Field::DebtToEquity,
        points: 2,
        condition: "< 1.0",
        test: low_leverage,
    },
    ScoreRule {
        field: Field::ReturnOnEquity,
        points: 2,
        condition: "> 15",
        test: high_return_on_equity,
    },
    ScoreRule {
        field: Field::ProfitMargin,
        points: 2,
        condition: "> 10",
        test: healthy_margin,
    },
    ScoreRule {
        field: Field::RevenueGrowth,
        points: 2,
        condition: "> 5",
        test: growing_revenue,
    },
    ScoreRule {
        field: Field::CurrentRatio,
        points: 2,
        condition: "between 1 and 2",
        test: balanced_liquidity,
    },
];

/// Sum of every rule met by `record`; 0 to 10 in steps of 2.
pub fn score(record: &FundamentalsRecord) -> u8 {
    RULES
        .iter()
        .map(|rule| rule.apply(normalize(record.get(rule.field))))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticker::Ticker;

    const GOOD: [(Field, &str); 5] = [
        (Field::DebtToEquity, "0.5"),
        (Field::ReturnOnEquity, "20"),
        (Field::ProfitMargin, "12"),
        (Field::RevenueGrowth, "8"),
        (Field::CurrentRatio, "1.5"),
    ];

    fn record(fields: &[(Field, &str)]) -> FundamentalsRecord {
        fields.iter().fold(
            FundamentalsRecord::new(Ticker::parse("TEST").unwrap()),
            |record, (field, value)| record.with(*field, *value),
        )
    }

    #[test]
    fn perfect_record_scores_ten() {
        assert_eq!(score(&record(&GOOD)), 10);
    }

    #[test]
    fn unavailable_record_scores_zero() {
        assert_eq!(score(&record(&[])), 0);
        let all_na: Vec<(Field, &str)> = Field::ALL.iter().map(|f| (*f, "N/A")).collect();
        assert_eq!(score(&record(&all_na)), 0);
    }

    #[test]
    fn each_satisfied_rule_adds_exactly_two() {
        for mask in 0u8..32 {
            let fields: Vec<(Field, &str)> = GOOD
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << *i) != 0)
                .map(|(_, pair)| *pair)
                .collect();
            assert_eq!(score(&record(&fields)), 2 * mask.count_ones() as u8);
        }
    }

    #[test]
    fn thresholds_are_strict_except_current_ratio() {
        let edges = record(&[
            (Field::DebtToEquity, "1.0"),
            (Field::ReturnOnEquity, "15%"),
            (Field::ProfitMargin, "10%"),
            (Field::RevenueGrowth, "5%"),
            (Field::CurrentRatio, "2"),
        ]);
        assert_eq!(score(&edges), 2);
        assert_eq!(score(&record(&[(Field::CurrentRatio, "1.00")])), 2);
        assert_eq!(score(&record(&[(Field::CurrentRatio, "2.01")])), 0);
    }

    #[test]
    fn formatted_values_still_score() {
        let formatted = record(&[
            (Field::ReturnOnEquity, "1,560.2%"),
            (Field::ProfitMargin, "25.31%"),
        ]);
        assert_eq!(score(&formatted), 4);
    }
}
