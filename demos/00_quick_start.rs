/// quick start - the three calculator functions
use coop_loan_calculator::{
    compute_loanable_amount, compute_max_units, compute_monthly_payment, LoanCategory, Money,
    Rate, StatementOfPurpose,
};
use rust_decimal_macros::dec;

fn main() {
    let payment = compute_monthly_payment(Money::from_major(240_000), Rate::from_percentage(10), 36);
    println!("monthly payment: {}", payment.round_currency());

    let amount = compute_loanable_amount(Some(Money::from_major(500)), Some(10), Some(dec!(70)));
    println!("loanable amount for 10 sacks: {}", amount);

    for capital in [19_999, 20_000, 20_001] {
        let sacks = compute_max_units(
            Money::from_major(capital),
            LoanCategory::Feeds,
            StatementOfPurpose::Personal,
        );
        println!("feeds limit at share capital {}: {} sacks", capital, sacks);
    }
}
