//! Elector counts per state for the two supported census apportionments.
//!
//! Both tables include the District of Columbia (3 electors) and total 538.
//! Maine and Nebraska are allocated winner-take-all.

use serde::{Deserialize, Serialize};

/// Which census apportionment converts state results to electors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Apportionment {
    /// 2010 census, used for the 2012 through 2020 elections.
    Census2010,
    /// 2020 census, used from the 2024 election onward.
    #[default]
    Census2020,
}

const CENSUS_2010: [(&str, u32); 51] = [
    ("AL", 9),
    ("AK", 3),
    ("AZ", 11),
    ("AR", 6),
    ("CA", 55),
    ("CO", 9),
    ("CT", 7),
    ("DE", 3),
    ("DC", 3),
    ("FL", 29),
    ("GA", 16),
    ("HI", 4),
    ("ID", 4),
    ("IL", 20),
    ("IN", 11),
    ("IA", 6),
    ("KS", 6),
    ("KY", 8),
    ("LA", 8),
    ("ME", 4),
    ("MD", 10),
    ("MA", 11),
    ("MI", 16),
    ("MN", 10),
    ("MS", 6),
    ("MO", 10),
    ("MT", 3),
    ("NE", 5),
    ("NV", 6),
    ("NH", 4),
    ("NJ", 14),
    ("NM", 5),
    ("NY", 29),
    ("NC", 15),
    ("ND", 3),
    ("OH", 18),
    ("OK", 7),
    ("OR", 7),
    ("PA", 20),
    ("RI", 4),
    ("SC", 9),
    ("SD", 3),
    ("TN", 11),
    ("TX", 38),
    ("UT", 6),
    ("VT", 3),
    ("VA", 13),
    ("WA", 12),
    ("WV", 5),
    ("WI", 10),
    ("WY", 3),
];

const CENSUS_2020: [(&str, u32); 51] = [
    ("AL", 9),
    ("AK", 3),
    ("AZ", 11),
    ("AR", 6),
    ("CA", 54),
    ("CO", 10),
    ("CT", 7),
    ("DE", 3),
    ("DC", 3),
    ("FL", 30),
    ("GA", 16),
    ("HI", 4),
    ("ID", 4),
    ("IL", 19),
    ("IN", 11),
    ("IA", 6),
    ("KS", 6),
    ("KY", 8),
    ("LA", 8),
    ("ME", 4),
    ("MD", 10),
    ("MA", 11),
    ("MI", 15),
    ("MN", 10),
    ("MS", 6),
    ("MO", 10),
    ("MT", 4),
    ("NE", 5),
    ("NV", 6),
    ("NH", 4),
    ("NJ", 14),
    ("NM", 5),
    ("NY", 28),
    ("NC", 16),
    ("ND", 3),
    ("OH", 17),
    ("OK", 7),
    ("OR", 8),
    ("PA", 19),
    ("RI", 4),
    ("SC", 9),
    ("SD", 3),
    ("TN", 11),
    ("TX", 40),
    ("UT", 6),
    ("VT", 3),
    ("VA", 13),
    ("WA", 12),
    ("WV", 4),
    ("WI", 10),
    ("WY", 3),
];

impl Apportionment {
    /// `(state code, electors)` pairs in alphabetical order of state name.
    pub fn entries(&self) -> &'static [(&'static str, u32)] {
        match self {
            Self::Census2010 => &CENSUS_2010,
            Self::Census2020 => &CENSUS_2020,
        }
    }

    pub fn electors(
        &self,
        state: &str,
    ) -> Option<u32> {
        self.entries()
            .iter()
            .find(|(code, _)| code.eq_ignore_ascii_case(state))
            .map(|&(_, electors)| electors)
    }

    pub fn total_electors(&self) -> u32 {
        self.entries().iter().map(|&(_, electors)| electors).sum()
    }

    /// Electors needed to win outright.
    pub fn majority(&self) -> u32 {
        self.total_electors() / 2 + 1
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::Census2010 => Self::Census2020,
            Self::Census2020 => Self::Census2010,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Census2010 => "2010",
            Self::Census2020 => "2020",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "2010" | "census2010" => Some(Self::Census2010),
            "2020" | "census2020" => Some(Self::Census2020),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn both_tables_total_538() {
        assert_eq!(Apportionment::Census2010.total_electors(), 538);
        assert_eq!(Apportionment::Census2020.total_electors(), 538);
        assert_eq!(Apportionment::Census2020.majority(), 270);
    }

    #[test]
    fn both_tables_cover_the_same_states() {
        let old: Vec<_> = Apportionment::Census2010
            .entries()
            .iter()
            .map(|(code, _)| *code)
            .collect();
        let new: Vec<_> = Apportionment::Census2020
            .entries()
            .iter()
            .map(|(code, _)| *code)
            .collect();

        assert_eq!(old.len(), 51);
        assert_eq!(old, new);
    }

    #[test]
    fn electors_reflect_reapportionment() {
        assert_eq!(Apportionment::Census2010.electors("TX"), Some(38));
        assert_eq!(Apportionment::Census2020.electors("TX"), Some(40));
        assert_eq!(Apportionment::Census2010.electors("ca"), Some(55));
        assert_eq!(Apportionment::Census2020.electors("CA"), Some(54));
        assert_eq!(Apportionment::Census2020.electors("XX"), None);
    }

    #[test]
    fn parse_and_toggle() {
        assert_eq!(Apportionment::parse("2010"), Some(Apportionment::Census2010));
        assert_eq!(
            Apportionment::parse("Census2020"),
            Some(Apportionment::Census2020)
        );
        assert_eq!(Apportionment::parse("1990"), None);
        assert_eq!(
            Apportionment::Census2010.toggled(),
            Apportionment::Census2020
        );
    }
}
