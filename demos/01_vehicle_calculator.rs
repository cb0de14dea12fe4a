/// vehicle loan calculator widget with a printed schedule
use coop_loan_calculator::{CalculatorConfig, LoanCalculatorWidget, SafeTimeProvider, TimeSource};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let time = SafeTimeProvider::new(TimeSource::System);
    let mut widget = LoanCalculatorWidget::new(&CalculatorConfig::default());

    widget.set_vehicle_price("300,000", &time)?;
    widget.set_trade_in_value("40,000", &time)?;
    widget.set_down_payment("20,000", &time)?;
    widget.set_term_months("24", &time)?;

    let result = widget.calculate(&time)?;
    println!("financed:        {}", result.quote.principal());
    println!("monthly payment: {}", result.monthly_payment());
    println!("total interest:  {}", result.total_interest());

    for payment in result.schedule(time.now()).payments.iter().take(3) {
        println!(
            "#{:>2} {} interest {} principal {} balance {}",
            payment.payment_number,
            payment.payment_date.date_naive(),
            payment.interest_portion,
            payment.principal_portion,
            payment.ending_balance,
        );
    }

    Ok(())
}
