use serde::Serialize;

/// Life-stage bucket derived from `AGE_GRP_CD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AgeBand {
    Child,
    Adult,
    Senior,
}

impl AgeBand {
    /// Display order of the band columns.
    pub const ALL: [AgeBand; 3] = [AgeBand::Child, AgeBand::Adult, AgeBand::Senior];

    pub fn label(&self) -> &'static str {
        match self {
            AgeBand::Child => "0-18",
            AgeBand::Adult => "19-64",
            AgeBand::Senior => "65+",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            AgeBand::Child => 0,
            AgeBand::Adult => 1,
            AgeBand::Senior => 2,
        }
    }

    /// Bucket an age group code using the half-open bins `[0,5) [5,8) [8,∞)`.
    ///
    /// Codes 1-4 are 0-18, 5-7 are 19-64, 8 and up are 65+. Negative codes
    /// and NaN fall in no band.
    pub fn classify(code: f64) -> Option<AgeBand> {
        if code.is_nan() || code < 0.0 {
            None
        } else if code < 5.0 {
            Some(AgeBand::Child)
        } else if code < 8.0 {
            Some(AgeBand::Adult)
        } else {
            Some(AgeBand::Senior)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_codes() {
        for code in 1..=4 {
            assert_eq!(AgeBand::classify(code as f64), Some(AgeBand::Child));
        }
        for code in 5..=7 {
            assert_eq!(AgeBand::classify(code as f64), Some(AgeBand::Adult));
        }
        for code in 8..=10 {
            assert_eq!(AgeBand::classify(code as f64), Some(AgeBand::Senior));
        }
    }

    #[test]
    fn test_bin_edges() {
        assert_eq!(AgeBand::classify(0.0), Some(AgeBand::Child));
        assert_eq!(AgeBand::classify(4.99), Some(AgeBand::Child));
        assert_eq!(AgeBand::classify(7.5), Some(AgeBand::Adult));
        assert_eq!(AgeBand::classify(99.0), Some(AgeBand::Senior));
        assert_eq!(AgeBand::classify(-1.0), None);
        assert_eq!(AgeBand::classify(f64::NAN), None);
    }
}
