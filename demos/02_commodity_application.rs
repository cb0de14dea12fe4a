/// rice loan application with sack clamping
use coop_loan_calculator::{
    CalculatorConfig, CommodityLoanParameters, LoanApplicationForm, LoanTypeRecord, Money, Rate,
    SafeTimeProvider, StatementOfPurpose, TimeSource,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let time = SafeTimeProvider::new(TimeSource::System);
    let rice = LoanTypeRecord::rice(
        "Rice Loan",
        Rate::from_percentage(12),
        6,
        CommodityLoanParameters::new(Money::from_major(2_400), 50, dec!(80)),
    )
    .with_id(7);

    let mut form = LoanApplicationForm::new(rice, &CalculatorConfig::default());
    form.set_applicant("M-0042", "Dela Cruz, Juan", &time)?;
    form.set_term_months(6, &time)?;
    form.set_purpose(StatementOfPurpose::Personal, &time)?;
    form.set_share_capital(Money::from_major(6_000), &time)?;

    let entry = form.enter_units(10, &time)?;
    println!("asked for 10 sacks, form now shows {} (limit {})", entry.units(), form.max_units());
    println!("loanable amount: {}", form.loanable_amount());

    let (application, request) = form.submit(&time)?;
    println!("{:?} {}", request.method, request.path);
    println!("{}", serde_json::to_string_pretty(&application)?);

    form.complete(Ok(()), &time)?;
    Ok(())
}
