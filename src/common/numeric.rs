// src/common/numeric.rs

use rust_decimal::Decimal;

/// Faixa de uma coluna `NUMERIC(precision, scale)` do Postgres.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericColumn {
    pub precision: u32,
    pub scale: u32,
}

impl NumericColumn {
    pub const fn new(precision: u32, scale: u32) -> Self {
        Self { precision, scale }
    }

    /// `true` se o valor cabe na coluna sem arredondar nem estourar.
    /// O Postgres arredondaria casas a mais em silêncio (0.001 em NUMERIC(12,2) vira 0).
    pub fn fits(&self, value: Decimal) -> bool {
        if value.normalize().scale() > self.scale {
            return false;
        }
        let limit = Decimal::from(10u64.pow(self.precision - self.scale));
        value.trunc().abs() < limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn extra_decimal_places_do_not_fit() {
        let area = NumericColumn::new(12, 2);
        assert!(area.fits(dec("12.50")));
        assert!(area.fits(dec("12.5000")));
        assert!(!area.fits(dec("0.001")));
    }

    #[test]
    fn integer_part_is_bounded_by_precision() {
        let dose = NumericColumn::new(14, 4);
        assert!(dose.fits(dec("9999999999.9999")));
        assert!(!dose.fits(dec("10000000000")));
        assert!(!dose.fits(dec("-10000000000")));
    }
}
