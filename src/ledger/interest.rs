use rust_decimal::Decimal;

use super::account::AccountKind;

/// Per-period interest rate for an account category. Savings and Checking
/// earn interest; Loan interest is charged and grows the owed amount.
pub fn interest_rate(kind: AccountKind) -> Decimal {
    match kind {
        AccountKind::Savings => Decimal::new(2, 2),  // 2%
        AccountKind::Checking => Decimal::new(1, 3), // 0.1%
        AccountKind::Loan => Decimal::new(5, 2),     // 5%
    }
}
