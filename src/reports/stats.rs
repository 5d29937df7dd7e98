use serde::Serialize;

/// Letter grades from best to worst with their minimum percentage
pub const GRADE_CUTOFFS: [(&str, f64); 8] = [
    ("A+", 90.0),
    ("A", 80.0),
    ("B+", 75.0),
    ("B", 70.0),
    ("C+", 65.0),
    ("C", 60.0),
    ("D", 50.0),
    ("F", f64::NEG_INFINITY),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    pub std_dev: f64,
}

impl Summary {
    /// Population statistics; an empty slice yields all zeros.
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                count: 0,
                mean: 0.0,
                max: 0.0,
                min: 0.0,
                std_dev: 0.0,
            };
        }

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);

        Self {
            count,
            mean,
            max,
            min,
            std_dev: variance.sqrt(),
        }
    }
}

pub fn grade(percentage: f64) -> &'static str {
    GRADE_CUTOFFS
        .iter()
        .find(|(_, cutoff)| percentage >= *cutoff)
        .map_or("F", |(grade, _)| grade)
}

/// Count of percentages per grade, in `GRADE_CUTOFFS` order including empty grades
pub fn grade_distribution(percentages: &[f64]) -> Vec<(&'static str, usize)> {
    let mut counts: Vec<(&'static str, usize)> =
        GRADE_CUTOFFS.iter().map(|(g, _)| (*g, 0)).collect();
    for p in percentages {
        let g = grade(*p);
        if let Some(entry) = counts.iter_mut().find(|(name, _)| *name == g) {
            entry.1 += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_uses_population_deviation() {
        let s = Summary::of(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(s.count, 8);
        assert_eq!(s.mean, 5.0);
        assert_eq!(s.std_dev, 2.0);
        assert_eq!(s.max, 9.0);
        assert_eq!(s.min, 2.0);
    }

    #[test]
    fn empty_summary_is_zeroed() {
        let s = Summary::of(&[]);
        assert_eq!(s.count, 0);
        assert_eq!(s.mean, 0.0);
        assert_eq!(s.max, 0.0);
    }

    #[test]
    fn grade_boundaries() {
        assert_eq!(grade(100.0), "A+");
        assert_eq!(grade(90.0), "A+");
        assert_eq!(grade(89.99), "A");
        assert_eq!(grade(75.0), "B+");
        assert_eq!(grade(70.0), "B");
        assert_eq!(grade(65.0), "C+");
        assert_eq!(grade(60.0), "C");
        assert_eq!(grade(50.0), "D");
        assert_eq!(grade(49.9), "F");
        assert_eq!(grade(0.0), "F");
    }

    #[test]
    fn distribution_keeps_every_grade() {
        let dist = grade_distribution(&[95.0, 91.0, 55.0, 10.0]);
        assert_eq!(dist.len(), GRADE_CUTOFFS.len());
        assert_eq!(dist[0], ("A+", 2));
        assert_eq!(dist[6], ("D", 1));
        assert_eq!(dist[7], ("F", 1));
        assert_eq!(dist.iter().map(|(_, n)| n).sum::<usize>(), 4);
    }
}
