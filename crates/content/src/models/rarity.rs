use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use super::sanitize;
use crate::error::{Error, ErrorKind};

/// Rarity tier of swimsuits, items and accessories.
///
/// Ordered by rank, so `Rarity::N < Rarity::Ssr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rarity {
    N,
    R,
    Sr,
    Ssr,
}
impl Rarity {
    /// Every tier, highest first, as listed in filter menus.
    pub const ALL: [Rarity; 4] = [Self::Ssr, Self::Sr, Self::R, Self::N];

    /// Numeric rank, `1` for N up to `4` for SSR.
    pub fn rank(&self) -> u8 {
        match self {
            Rarity::N => 1,
            Rarity::R => 2,
            Rarity::Sr => 3,
            Rarity::Ssr => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::N => "N",
            Rarity::R => "R",
            Rarity::Sr => "SR",
            Rarity::Ssr => "SSR",
        }
    }
}
impl TryFrom<String> for Rarity {
    type Error = Error;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.as_str().parse()
    }
}
impl FromStr for Rarity {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sanitized = sanitize(s);
        Ok(match sanitized.as_str() {
            "n" | "normal" => Self::N,
            "r" | "rare" => Self::R,
            "sr" | "superrare" => Self::Sr,
            "ssr" | "supersuperrare" | "specialsuperrare" => Self::Ssr,
            _ => exn::bail!(ErrorKind::ParseError {
                field: "rarity",
                value: s.to_string(),
            }),
        })
    }
}

impl Display for Rarity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("SSR", Rarity::Ssr)]
    #[case("ssr", Rarity::Ssr)]
    #[case(" Sr ", Rarity::Sr)]
    #[case("Super Rare", Rarity::Sr)]
    #[case("R", Rarity::R)]
    #[case("n", Rarity::N)]
    fn test_parse(#[case] input: &str, #[case] expected: Rarity) {
        assert_eq!(input.parse::<Rarity>().unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("UR")]
    #[case("S")]
    fn test_parse_invalid(#[case] input: &str) {
        assert!(input.parse::<Rarity>().is_err());
    }

    #[test]
    fn test_ordering_follows_rank() {
        let mut tiers = vec![Rarity::R, Rarity::Ssr, Rarity::N, Rarity::Sr];
        tiers.sort();
        assert_eq!(tiers, vec![Rarity::N, Rarity::R, Rarity::Sr, Rarity::Ssr]);
        assert!(tiers.windows(2).all(|w| w[0].rank() < w[1].rank()));
    }

    #[test]
    fn test_display_round_trips() {
        for rarity in Rarity::ALL {
            assert_eq!(rarity.to_string().parse::<Rarity>().unwrap(), rarity);
        }
    }
}
