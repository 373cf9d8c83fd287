use super::*;

const SI_PREFIXES: &[(&str, f64)] = &[
    ("", 1.0),
    ("K", 1e3),
    ("M", 1e6),
    ("G", 1e9),
    ("T", 1e12),
    ("P", 1e15),
    ("E", 1e18),
];

/// Hashes per second, displayed with an SI prefix.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct HashRate(pub f64);

impl HashRate {
    pub const ZERO: Self = Self(0.0);
}

impl Display for HashRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let value = self.0.max(0.0);

        let (prefix, scale) = SI_PREFIXES
            .iter()
            .rev()
            .find(|(_, scale)| value >= *scale)
            .copied()
            .unwrap_or(SI_PREFIXES[0]);

        write!(f, "{:.2} {prefix}H/s", value / scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_scales() {
        assert_eq!(HashRate::ZERO.to_string(), "0.00 H/s");
        assert_eq!(HashRate(999.0).to_string(), "999.00 H/s");
        assert_eq!(HashRate(1_234.0).to_string(), "1.23 KH/s");
        assert_eq!(HashRate(5e9).to_string(), "5.00 GH/s");
        assert_eq!(HashRate(2.5e18).to_string(), "2.50 EH/s");
    }
}
