//! Loan Simulator CLI
//!
//! Runs one simulation per invocation and prints a table, or JSON with --json

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use loan_simulator::amortization::AmortizationRow;
use loan_simulator::products::{
    Currency, ExpressRequest, ExpressResult, MortgageRequest, MortgageResult, PersonalRequest,
    RefinancingRequest, RefinancingResult, UvaRequest, UvaResult,
};
use loan_simulator::{
    InstallmentPlan, InstallmentRequest, InvestmentParameters, InvestmentResult, Purchase,
    RateTables, ScenarioRunner, SimulationOutcome, SimulationRequest, SimulationResult, TaxKind,
    TaxSelection,
};

#[derive(Parser, Debug)]
#[command(name = "loan_simulator")]
#[command(about = "Argentine loan and investment simulators")]
struct Cli {
    /// Print the result as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Write the amortization schedule to a CSV file
    #[arg(long, global = true)]
    csv: Option<PathBuf>,

    /// Directory with tax_rules.csv and iibb_provinces.csv (default: built-in rates)
    #[arg(long, global = true)]
    tables: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Simulate(Simulation),
    /// Refinancing savings over a range of offered rates
    Sweep {
        #[arg(long)]
        principal: f64,
        /// Current TNA in percent
        #[arg(long)]
        current_tna: f64,
        #[arg(long)]
        years: f64,
        /// Lowest offered TNA in percent
        #[arg(long)]
        from: f64,
        /// Highest offered TNA in percent
        #[arg(long)]
        to: f64,
        #[arg(long, default_value_t = 5.0)]
        step: f64,
    },
}

/// Single-simulation subcommands
#[derive(Subcommand, Debug)]
enum Simulation {
    /// Compare current debt against a refinanced loan
    Refinance {
        #[arg(long)]
        principal: f64,
        /// Current TNA in percent
        #[arg(long)]
        current_tna: f64,
        /// Offered TNA in percent
        #[arg(long)]
        new_tna: f64,
        #[arg(long)]
        years: f64,
        /// IIBB rate in percent (3 to 9)
        #[arg(long)]
        iibb: Option<f64>,
        /// Province for the IIBB rate
        #[arg(long)]
        province: Option<String>,
        /// Tax to leave out, e.g. check_tax (repeatable)
        #[arg(long, value_parser = parse_tax_kind)]
        exclude: Vec<TaxKind>,
    },
    /// 45-day express loan
    Express {
        #[arg(long)]
        amount: f64,
        /// TNA in percent
        #[arg(long)]
        tna: f64,
    },
    /// Personal loan in pesos
    Personal {
        #[arg(long)]
        amount: f64,
        /// TNA in percent
        #[arg(long)]
        tna: f64,
        #[arg(long)]
        months: u32,
    },
    /// UVA-indexed personal loan
    Uva {
        #[arg(long)]
        amount: f64,
        /// Pesos per UVA today
        #[arg(long)]
        uva_value: f64,
        #[arg(long)]
        months: u32,
        /// TNA in percent (default: product rate)
        #[arg(long)]
        tna: Option<f64>,
    },
    /// Mortgage in dollars or pesos
    Mortgage {
        #[arg(long)]
        property_value: f64,
        #[arg(long)]
        down_payment: f64,
        #[arg(long, value_enum, default_value_t = CurrencyArg::Usd)]
        currency: CurrencyArg,
        /// Dollar TNA in percent
        #[arg(long, default_value_t = 4.5)]
        usd_tna: f64,
        /// Peso TNA in percent
        #[arg(long, default_value_t = 12.0)]
        ars_tna: f64,
        #[arg(long)]
        years: u32,
    },
    /// Fixed-term deposit ("frasco")
    Frasco {
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        days: u32,
        /// TNA in percent (default: the term's rate)
        #[arg(long)]
        tna: Option<f64>,
        /// Start date, YYYY-MM-DD
        #[arg(long)]
        start: Option<NaiveDate>,
    },
    /// Foreign-currency purchases converted to installments
    Installments {
        /// Purchase as name=amount (repeatable)
        #[arg(long = "purchase", value_parser = parse_purchase, required = true)]
        purchases: Vec<Purchase>,
        #[arg(long)]
        installments: u32,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CurrencyArg {
    Usd,
    Ars,
}

impl From<CurrencyArg> for Currency {
    fn from(arg: CurrencyArg) -> Self {
        match arg {
            CurrencyArg::Usd => Currency::Usd,
            CurrencyArg::Ars => Currency::Ars,
        }
    }
}

fn parse_tax_kind(s: &str) -> Result<TaxKind, String> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|_| format!("unknown tax {}", s))
}

fn parse_purchase(s: &str) -> Result<Purchase, String> {
    let (name, amount) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected name=amount, got {}", s))?;
    let amount: f64 = amount
        .trim()
        .parse()
        .map_err(|_| format!("invalid amount in {}", s))?;
    Ok(Purchase::new(name.trim(), amount).selected())
}

fn pct(value: f64) -> f64 {
    value / 100.0
}

fn sweep_base(principal: f64, current_tna: f64, years: f64, new_tna: f64) -> RefinancingRequest {
    RefinancingRequest {
        principal,
        current_rate: pct(current_tna),
        new_rate: pct(new_tna),
        term_years: years,
        gross_receipts_rate: None,
        province: None,
        taxes: TaxSelection::all(),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let runner = match &cli.tables {
        Some(dir) => ScenarioRunner::with_tables(
            RateTables::from_csv_path(dir)
                .map_err(|e| anyhow!("failed to load rate tables from {}: {}", dir.display(), e))?,
        ),
        None => ScenarioRunner::new(),
    };

    match cli.command {
        Command::Sweep {
            principal,
            current_tna,
            years,
            from,
            to,
            step,
        } => {
            if step <= 0.0 || from > to {
                bail!("sweep needs from <= to and a positive step");
            }
            let base = sweep_base(principal, current_tna, years, from);
            let steps = ((to - from) / step).floor() as usize;
            let rates: Vec<f64> = (0..=steps).map(|i| pct(from + step * i as f64)).collect();
            let results = runner.rate_sweep(&base, &rates);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_sweep(&results);
            }
            Ok(())
        }
        Command::Simulate(simulation) => {
            run_single(&runner, build_request(simulation), cli.csv.as_deref(), cli.json)
        }
    }
}

fn run_single(
    runner: &ScenarioRunner,
    request: SimulationRequest,
    csv_path: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let outcome = runner.run(&request);

    if let Some(path) = csv_path {
        write_schedule(path, schedule_of(&outcome))?;
        println!("Schedule written to: {}", path.display());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    print_outcome(&outcome);
    if !outcome.is_valid() {
        bail!("simulation rejected");
    }
    Ok(())
}

fn build_request(simulation: Simulation) -> SimulationRequest {
    match simulation {
        Simulation::Refinance {
            principal,
            current_tna,
            new_tna,
            years,
            iibb,
            province,
            exclude,
        } => SimulationRequest::Refinancing(RefinancingRequest {
            principal,
            current_rate: pct(current_tna),
            new_rate: pct(new_tna),
            term_years: years,
            gross_receipts_rate: iibb.map(pct),
            province,
            taxes: exclude
                .into_iter()
                .fold(TaxSelection::all(), |sel, kind| sel.with(kind, false)),
        }),
        Simulation::Express { amount, tna } => SimulationRequest::Express(ExpressRequest {
            amount,
            nominal_annual_rate: pct(tna),
        }),
        Simulation::Personal { amount, tna, months } => SimulationRequest::Personal(PersonalRequest {
            amount,
            nominal_annual_rate: pct(tna),
            term_months: months,
        }),
        Simulation::Uva {
            amount,
            uva_value,
            months,
            tna,
        } => SimulationRequest::PersonalUva(UvaRequest {
            amount,
            index_value: uva_value,
            term_months: months,
            nominal_annual_rate: tna.map(pct),
        }),
        Simulation::Mortgage {
            property_value,
            down_payment,
            currency,
            usd_tna,
            ars_tna,
            years,
        } => SimulationRequest::Mortgage(MortgageRequest {
            property_value,
            down_payment,
            currency: currency.into(),
            usd_rate: pct(usd_tna),
            ars_rate: pct(ars_tna),
            term_years: years,
            closing_costs: TaxSelection::all(),
        }),
        Simulation::Frasco {
            amount,
            days,
            tna,
            start,
        } => SimulationRequest::Deposit(InvestmentParameters {
            amount,
            term_days: days,
            tna_pct: tna,
            start_date: start,
        }),
        Simulation::Installments {
            purchases,
            installments,
        } => SimulationRequest::Installments(InstallmentRequest {
            purchases,
            installments,
            taxes: TaxSelection::all(),
        }),
    }
}

fn schedule_of(outcome: &SimulationOutcome) -> &[AmortizationRow] {
    match outcome {
        SimulationOutcome::Refinancing(r) => &r.refinanced.schedule,
        SimulationOutcome::Express(r) => &r.simulation.schedule,
        SimulationOutcome::Personal(r) => &r.schedule,
        SimulationOutcome::PersonalUva(r) => &r.simulation.schedule,
        SimulationOutcome::Mortgage(r) => &r.simulation.schedule,
        SimulationOutcome::Deposit(_) | SimulationOutcome::Installments(_) => &[],
    }
}

fn write_schedule(path: &Path, rows: &[AmortizationRow]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("unable to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn print_outcome(outcome: &SimulationOutcome) {
    match outcome {
        SimulationOutcome::Refinancing(r) => print_refinancing(r),
        SimulationOutcome::Express(r) => print_express(r),
        SimulationOutcome::Personal(r) => print_loan("Personal loan", r),
        SimulationOutcome::PersonalUva(r) => print_uva(r),
        SimulationOutcome::Mortgage(r) => print_mortgage(r),
        SimulationOutcome::Deposit(r) => print_deposit(r),
        SimulationOutcome::Installments(r) => print_installments(r),
    }
}

fn print_rejection(message: Option<String>) {
    println!("Rejected: {}", message.unwrap_or_else(|| "invalid data".to_string()));
}

fn print_schedule(rows: &[AmortizationRow], limit: usize) {
    println!(
        "{:>6} {:>14} {:>14} {:>14} {:>16} {:>12} {:>14}",
        "Period", "Installment", "Interest", "Principal", "Balance", "VAT", "Total due"
    );
    println!("{}", "-".repeat(96));
    for row in rows.iter().take(limit) {
        println!(
            "{:>6} {:>14.2} {:>14.2} {:>14.2} {:>16.2} {:>12.2} {:>14.2}",
            row.period,
            row.installment,
            row.interest,
            row.principal,
            row.balance,
            row.vat_on_interest,
            row.total_due,
        );
    }
    if rows.len() > limit {
        println!("... ({} more periods)", rows.len() - limit);
    }
}

fn print_loan(title: &str, result: &SimulationResult) {
    println!("{}", title);
    println!("{}", "=".repeat(title.len()));
    if !result.is_valid {
        print_rejection(result.message());
        return;
    }

    let s = &result.summary;
    println!("  Principal:      ${:.2}", result.params.principal);
    println!("  Installment:    ${:.2}", s.installment);
    println!("  Total interest: ${:.2}", s.total_interest);
    println!("  Total paid:     ${:.2}", s.total_paid);
    for (kind, amount) in result.taxes.charged() {
        println!("  {:<28} ${:.2}", kind.label(), amount);
    }
    println!("  Total taxes:    ${:.2}", s.total_taxes);
    println!("  Total cost:     ${:.2}", s.total_cost);
    println!("  CFT ({:?}): {:.2}%", s.strategy, s.cost_rate_pct);
    if let Some(effective) = s.effective_cft_pct {
        println!("  Effective CFT:  {:.2}%", effective);
    }
    println!();
    print_schedule(&result.schedule, 12);
    println!();
}

fn print_refinancing(result: &RefinancingResult) {
    if !result.is_valid {
        print_rejection(result.error.as_ref().map(|e| e.to_string()));
        return;
    }
    print_loan("Current debt", &result.current);
    print_loan("Refinanced", &result.refinanced);

    let c = &result.comparison;
    println!("Savings over {:.1} months:", result.term_months);
    println!("  Total:     ${:.2}", c.total_savings);
    println!("  Monthly:   ${:.2}", c.monthly_savings);
    println!("  Interest:  ${:.2} ({:.2}%)", c.interest_savings, c.interest_savings_pct);
    println!("  Taxes:     ${:.2}", c.tax_savings);
    println!(
        "  Tax impact: {:.2}% -> {:.2}%",
        c.current_tax_impact_pct, c.new_tax_impact_pct
    );
}

fn print_express(result: &ExpressResult) {
    print_loan("Express loan", &result.simulation);
    if result.is_valid() {
        println!("  Term:         {} days", result.term_days);
        println!("  Total to pay: ${:.2}", result.total_to_pay);
        println!("  Nominal CFT:  {:.2}%", result.nominal_cft_pct);
    }
}

fn print_uva(result: &UvaResult) {
    print_loan("UVA personal loan", &result.simulation);
    if let Some(uva) = &result.uva {
        println!("  Loan in UVA:        {:.4}", uva.loan_uva);
        println!("  Installment in UVA: {:.4}", uva.installment_uva());
        println!("  UVA value:          ${:.2}", uva.index_value);
    }
}

fn print_mortgage(result: &MortgageResult) {
    print_loan("Mortgage", &result.simulation);
    if result.is_valid() {
        println!("  Currency:      {}", result.currency);
        println!("  Down payment:  {:.2} ({:.1}%)", result.down_payment, result.down_payment_pct());
        println!("  Total payment: {:.2}", result.total_payment);
    }
}

fn print_deposit(result: &InvestmentResult) {
    println!("Frasco");
    println!("======");
    if !result.is_valid {
        print_rejection(result.error.as_ref().map(|e| e.to_string()));
        return;
    }
    println!("  Amount:         ${:.2}", result.amount);
    println!("  Term:           {} days at {:.2}% TNA", result.term_days, result.tna_pct);
    println!("  Earnings:       ${:.2}", result.earnings);
    println!("  Daily earnings: ${:.2}", result.daily_earnings);
    println!("  Final amount:   ${:.2}", result.final_amount);
    if let Some(date) = result.maturity_date {
        println!("  Matures on:     {}", date);
    }
    println!("\n  {}", result.early_withdrawal_explanation);
}

fn print_installments(plan: &InstallmentPlan) {
    println!("Installment plan");
    println!("================");
    if !plan.is_valid {
        print_rejection(plan.error.as_ref().map(|e| e.to_string()));
        return;
    }
    for purchase in &plan.purchases {
        println!("  {:<28} ${:.2}", purchase.name, purchase.amount);
    }
    println!("  Subtotal: ${:.2}", plan.subtotal);
    for (kind, amount) in plan.taxes.charged() {
        println!("  {:<28} ${:.2}", kind.label(), amount);
    }
    println!("  Total:    ${:.2}", plan.total);
    println!("  {} installments of ${:.2}", plan.installments, plan.per_installment);
    println!("  Options for this amount: {:?}", plan.options);
}

fn print_sweep(results: &[RefinancingResult]) {
    println!(
        "{:>10} {:>12} {:>12} {:>16} {:>14}",
        "New TNA", "CFT", "Eff. CFT", "Total savings", "Monthly"
    );
    println!("{}", "-".repeat(68));
    for result in results {
        let new = &result.refinanced;
        if !result.is_valid {
            println!("{:>9.2}% rejected", new.params.nominal_annual_rate * 100.0);
            continue;
        }
        println!(
            "{:>9.2}% {:>11.2}% {:>11.2}% {:>16.2} {:>14.2}",
            new.params.nominal_annual_rate * 100.0,
            new.summary.cost_rate_pct,
            new.summary.effective_cft_pct.unwrap_or(0.0),
            result.comparison.total_savings,
            result.comparison.monthly_savings,
        );
    }
}
