//! MAS-compliant mortgage arithmetic.
//!
//! All rounding is client-protective: loan amounts round down to the nearest $1,000,
//! payments round up to the dollar and funds required round up to the nearest $1,000.

use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};

const TDSR_LIMIT: f64 = 0.55;
const MSR_LIMIT: f64 = 0.30;
const STRESS_RATE_RESIDENTIAL: f64 = 4.0;
const STRESS_RATE_COMMERCIAL: f64 = 5.0;
const EXTENDED_TENURE_PENALTY: f64 = 5.0;
const MIN_CASH_PERCENT_STANDARD: f64 = 5.0;
const MIN_CASH_PERCENT_PENALTY: f64 = 10.0;
const MAX_TENURE_YEARS: i32 = 35;
const MIN_BORROWER_AGE: i32 = 18;

/// (tier width, rate)
const BSD_TIERS: [(f64, f64); 5] = [
    (180_000.0, 0.01),
    (180_000.0, 0.02),
    (640_000.0, 0.03),
    (500_000.0, 0.04),
    (f64::INFINITY, 0.05),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    #[serde(rename = "HDB", alias = "hdb")]
    Hdb,
    #[serde(rename = "EC", alias = "ec")]
    Ec,
    #[serde(rename = "Private", alias = "private")]
    Private,
    #[serde(rename = "Commercial", alias = "commercial")]
    Commercial,
}

impl PropertyType {
    fn is_public_housing(self) -> bool {
        matches!(self, PropertyType::Hdb | PropertyType::Ec)
    }

    fn stress_test_rate(self) -> f64 {
        match self {
            PropertyType::Commercial => STRESS_RATE_COMMERCIAL,
            _ => STRESS_RATE_RESIDENTIAL,
        }
    }

    fn age_limit(self) -> i32 {
        if self.is_public_housing() {
            65
        } else {
            75
        }
    }

    fn tenure_limit(self) -> i32 {
        if self.is_public_housing() {
            25
        } else {
            35
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Citizenship {
    #[serde(rename = "Citizen", alias = "citizen")]
    Citizen,
    #[serde(rename = "PR", alias = "pr")]
    PermanentResident,
    #[serde(rename = "Foreigner", alias = "foreigner")]
    Foreigner,
}

impl Citizenship {
    /// ABSD percentage for the nth property
    fn absd_rate(self, property_count: u32) -> f64 {
        let (first, second, third) = match self {
            Citizenship::Citizen => (0.0, 20.0, 30.0),
            Citizenship::PermanentResident => (5.0, 30.0, 35.0),
            Citizenship::Foreigner => (60.0, 60.0, 60.0),
        };
        match property_count {
            0 | 1 => first,
            2 => second,
            _ => third,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LimitingFactor {
    #[serde(rename = "TDSR")]
    Tdsr,
    #[serde(rename = "MSR")]
    Msr,
    #[serde(rename = "LTV")]
    Ltv,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPayment {
    pub monthly_payment: f64,
    pub total_payment: f64,
    pub total_interest: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TdsrAssessment {
    pub ratio_percent: f64,
    /// Monthly headroom under the 55% limit after existing commitments
    pub available: f64,
    pub compliant: bool,
    pub stress_test_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MsrAssessment {
    pub applicable: bool,
    pub limit: Option<f64>,
    pub ratio_percent: Option<f64>,
    pub compliant: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StampDuty {
    pub bsd: f64,
    pub absd: f64,
    pub total: f64,
    pub breakdown: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoApplicant {
    pub monthly_income: f64,
    pub age: i32,
    #[serde(default)]
    pub existing_commitments: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanInputs {
    pub property_price: f64,
    pub property_type: PropertyType,
    pub monthly_income: f64,
    #[serde(default)]
    pub existing_commitments: f64,
    pub age: i32,
    pub citizenship: Citizenship,
    #[serde(default = "default_property_count")]
    pub property_count: u32,
    pub co_applicant: Option<CoApplicant>,
}

fn default_property_count() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxLoanAssessment {
    pub max_loan: f64,
    pub ltv_applied: f64,
    pub ltv_penalty: bool,
    pub monthly_payment: f64,
    pub tdsr_used: f64,
    pub msr_used: Option<f64>,
    pub limiting_factor: LimitingFactor,
    pub down_payment: f64,
    pub min_cash_required: f64,
    pub cpf_allowed: f64,
    pub stamp_duty: f64,
    pub total_funds_required: f64,
    pub max_tenure: i32,
    pub recommended_tenure: i32,
    pub mas_compliant: bool,
    pub reasoning: Vec<String>,
    pub warnings: Vec<String>,
}

fn round_loan_down(amount: f64) -> f64 {
    (amount / 1000.0).floor() * 1000.0
}

fn round_funds_up(amount: f64) -> f64 {
    (amount / 1000.0).ceil() * 1000.0
}

fn round_percent(percent: f64) -> f64 {
    (percent * 100.0).round() / 100.0
}

fn require_finite(field: &str, value: f64) -> DomainResult<()> {
    if !value.is_finite() {
        return Err(DomainError::ValidationError(format!(
            "{} must be a finite number",
            field
        )));
    }
    Ok(())
}

fn require_non_negative(field: &str, value: f64) -> DomainResult<()> {
    require_finite(field, value)?;
    if value < 0.0 {
        return Err(DomainError::ValidationError(format!(
            "{} cannot be negative",
            field
        )));
    }
    Ok(())
}

fn require_positive(field: &str, value: f64) -> DomainResult<()> {
    require_finite(field, value)?;
    if value <= 0.0 {
        return Err(DomainError::ValidationError(format!(
            "{} must be greater than zero",
            field
        )));
    }
    Ok(())
}

fn require_adult(field: &str, age: i32) -> DomainResult<()> {
    if age < MIN_BORROWER_AGE {
        return Err(DomainError::ValidationError(format!(
            "{} must be at least {}",
            field, MIN_BORROWER_AGE
        )));
    }
    Ok(())
}

/// Present value of `n` monthly payments of 1 at monthly rate `r`
fn annuity_factor(monthly_rate: f64, payments: f64) -> f64 {
    if monthly_rate == 0.0 {
        return payments;
    }
    let growth = (1.0 + monthly_rate).powf(payments);
    (growth - 1.0) / (monthly_rate * growth)
}

/// Standard amortised payment `M = P·r(1+r)^n / ((1+r)^n − 1)`, rounded up to the dollar
pub fn monthly_payment(
    principal: f64,
    annual_rate_percent: f64,
    tenure_years: i32,
) -> DomainResult<MonthlyPayment> {
    require_non_negative("loanAmount", principal)?;
    require_non_negative("interestRate", annual_rate_percent)?;
    if !(1..=MAX_TENURE_YEARS).contains(&tenure_years) {
        return Err(DomainError::ValidationError(format!(
            "tenureYears must be between 1 and {}",
            MAX_TENURE_YEARS
        )));
    }

    let monthly_rate = annual_rate_percent / 100.0 / 12.0;
    let payments = f64::from(tenure_years * 12);
    let exact = principal / annuity_factor(monthly_rate, payments);

    let monthly = exact.ceil();
    let total_payment = monthly * payments;

    Ok(MonthlyPayment {
        monthly_payment: monthly,
        total_payment: total_payment.round(),
        total_interest: (total_payment - principal).round(),
    })
}

/// MAS Notice 645: total debt servicing must stay within 55% of gross income
pub fn tdsr(
    monthly_income: f64,
    existing_commitments: f64,
    proposed_payment: f64,
    property_type: PropertyType,
) -> DomainResult<TdsrAssessment> {
    require_positive("monthlyIncome", monthly_income)?;
    require_non_negative("existingCommitments", existing_commitments)?;
    require_non_negative("proposedPayment", proposed_payment)?;

    let ratio = (proposed_payment + existing_commitments) / monthly_income * 100.0;
    let available = monthly_income * TDSR_LIMIT - existing_commitments;

    Ok(TdsrAssessment {
        ratio_percent: round_percent(ratio),
        available: available.floor(),
        compliant: ratio <= TDSR_LIMIT * 100.0,
        stress_test_rate: property_type.stress_test_rate(),
    })
}

/// MAS Notice 632: mortgage servicing capped at 30% of income for HDB and EC flats
pub fn msr(
    monthly_income: f64,
    proposed_payment: f64,
    property_type: PropertyType,
) -> DomainResult<MsrAssessment> {
    require_positive("monthlyIncome", monthly_income)?;
    require_non_negative("proposedPayment", proposed_payment)?;

    if !property_type.is_public_housing() {
        return Ok(MsrAssessment {
            applicable: false,
            limit: None,
            ratio_percent: None,
            compliant: true,
        });
    }

    let ratio = proposed_payment / monthly_income * 100.0;
    Ok(MsrAssessment {
        applicable: true,
        limit: Some((monthly_income * MSR_LIMIT).floor()),
        ratio_percent: Some(round_percent(ratio)),
        compliant: ratio <= MSR_LIMIT * 100.0,
    })
}

/// Buyer's stamp duty on progressive tiers plus ABSD for private and commercial purchases
pub fn stamp_duty(
    property_price: f64,
    citizenship: Citizenship,
    property_count: u32,
    property_type: PropertyType,
) -> DomainResult<StampDuty> {
    require_non_negative("propertyPrice", property_price)?;

    let mut breakdown = Vec::new();
    let mut bsd = 0.0;
    let mut remaining = property_price;

    for (width, rate) in BSD_TIERS {
        if remaining <= 0.0 {
            break;
        }
        let taxable = remaining.min(width);
        let tax = taxable * rate;
        bsd += tax;
        remaining -= taxable;
        if tax > 0.0 {
            breakdown.push(format!(
                "BSD: ${:.0} @ {}% = ${:.0}",
                taxable,
                rate * 100.0,
                tax.round()
            ));
        }
    }
    let bsd = bsd.round();

    let mut absd = 0.0;
    if !property_type.is_public_housing() {
        let rate = citizenship.absd_rate(property_count);
        absd = (property_price * rate / 100.0).round();
        if absd > 0.0 {
            breakdown.push(format!(
                "ABSD: ${:.0} @ {}% = ${:.0}",
                property_price, rate, absd
            ));
        }
    }

    Ok(StampDuty {
        bsd,
        absd,
        total: bsd + absd,
        breakdown,
    })
}

/// Income-weighted average age, rounded up
fn income_weighted_age(applicants: &[(i32, f64)]) -> i32 {
    let total_income: f64 = applicants.iter().map(|(_, income)| income).sum();
    if total_income <= 0.0 {
        return applicants.iter().map(|(age, _)| *age).max().unwrap_or(0);
    }
    let weighted: f64 = applicants
        .iter()
        .map(|(age, income)| f64::from(*age) * income)
        .sum();
    (weighted / total_income).ceil() as i32
}

/// Maximum loan under LTV, TDSR and MSR limits
pub fn max_loan(inputs: &LoanInputs) -> DomainResult<MaxLoanAssessment> {
    require_positive("propertyPrice", inputs.property_price)?;
    require_positive("monthlyIncome", inputs.monthly_income)?;
    require_non_negative("existingCommitments", inputs.existing_commitments)?;
    require_adult("age", inputs.age)?;

    let mut reasoning = Vec::new();
    let mut warnings = Vec::new();

    let mut income = inputs.monthly_income;
    let mut commitments = inputs.existing_commitments;
    let mut age = inputs.age;
    if let Some(co) = &inputs.co_applicant {
        require_adult("coApplicant.age", co.age)?;
        require_non_negative("coApplicant.monthlyIncome", co.monthly_income)?;
        require_non_negative("coApplicant.existingCommitments", co.existing_commitments)?;
        income += co.monthly_income;
        commitments += co.existing_commitments;
        age = income_weighted_age(&[
            (inputs.age, inputs.monthly_income),
            (co.age, co.monthly_income),
        ]);
        reasoning.push(format!("Income-weighted average age: {}", age));
    }

    let property_count = inputs.property_count.max(1);
    let base_ltv = match property_count {
        1 => 75.0,
        2 => 45.0,
        _ => 35.0,
    };
    reasoning.push(format!(
        "Base LTV: {}% for {} property",
        base_ltv,
        match property_count {
            1 => "first",
            2 => "second",
            _ => "third+",
        }
    ));

    let age_limit = inputs.property_type.age_limit();
    let tenure_limit = inputs.property_type.tenure_limit();
    let max_tenure = tenure_limit.min(age_limit.saturating_sub(age));
    if max_tenure <= 0 {
        return Err(DomainError::ValidationError(format!(
            "age {} leaves no loan tenure before the age limit of {}",
            age, age_limit
        )));
    }
    reasoning.push(format!(
        "Max tenure: {} years (limit: {}, age: {})",
        max_tenure, tenure_limit, age
    ));

    let mut effective_ltv = base_ltv;
    let mut min_cash_percent = MIN_CASH_PERCENT_STANDARD;
    let mut ltv_penalty = false;
    if max_tenure > 30 || age + max_tenure > age_limit {
        effective_ltv = base_ltv - EXTENDED_TENURE_PENALTY;
        min_cash_percent = MIN_CASH_PERCENT_PENALTY;
        ltv_penalty = true;
        warnings.push(format!(
            "Extended tenure penalty: -5% LTV ({}% -> {}%)",
            base_ltv, effective_ltv
        ));
        reasoning.push("MAS Notice 632: Extended tenure penalty applied".to_string());
    }

    let tdsr_limit = tdsr(income, commitments, 0.0, inputs.property_type)?;
    let msr_limit = msr(income, 0.0, inputs.property_type)?;

    let mut monthly_limit = tdsr_limit.available;
    let mut limiting_factor = LimitingFactor::Tdsr;
    if let Some(limit) = msr_limit.limit {
        if limit < tdsr_limit.available {
            monthly_limit = limit;
            limiting_factor = LimitingFactor::Msr;
            reasoning.push(format!(
                "MSR limit (${}) is more restrictive than TDSR (${})",
                limit, tdsr_limit.available
            ));
        } else {
            reasoning.push(format!(
                "TDSR limit (${}) is more restrictive than MSR (${})",
                tdsr_limit.available, limit
            ));
        }
    }

    let monthly_rate = tdsr_limit.stress_test_rate / 100.0 / 12.0;
    let payments = f64::from(max_tenure * 12);
    let from_payment = round_loan_down(monthly_limit.max(0.0) * annuity_factor(monthly_rate, payments));
    let from_ltv = round_loan_down(inputs.property_price * effective_ltv / 100.0);

    let loan = from_payment.min(from_ltv);
    if loan == from_ltv {
        limiting_factor = LimitingFactor::Ltv;
        reasoning.push(format!("LTV limit (${:.0}) is more restrictive", from_ltv));
    }

    let payment = monthly_payment(loan, tdsr_limit.stress_test_rate, max_tenure)?;

    let down_payment = inputs.property_price - loan;
    let min_cash_required = round_funds_up(inputs.property_price * min_cash_percent / 100.0);
    let cpf_allowed = (down_payment - min_cash_required).max(0.0);

    let duty = stamp_duty(
        inputs.property_price,
        inputs.citizenship,
        property_count,
        inputs.property_type,
    )?;

    let final_tdsr = tdsr(
        income,
        commitments,
        payment.monthly_payment,
        inputs.property_type,
    )?;
    let mas_compliant = final_tdsr.compliant && loan > 0.0;
    if !mas_compliant {
        warnings.push("TDSR exceeds 55% limit - loan may not be approved".to_string());
    }

    Ok(MaxLoanAssessment {
        max_loan: loan,
        ltv_applied: effective_ltv,
        ltv_penalty,
        monthly_payment: payment.monthly_payment,
        tdsr_used: final_tdsr.ratio_percent,
        msr_used: msr_limit
            .applicable
            .then(|| round_percent(payment.monthly_payment / income * 100.0)),
        limiting_factor,
        down_payment: round_funds_up(down_payment),
        min_cash_required,
        cpf_allowed,
        stamp_duty: duty.total,
        total_funds_required: round_funds_up(min_cash_required + duty.total),
        max_tenure,
        recommended_tenure: max_tenure.min(30),
        mas_compliant,
        reasoning,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_payment_rounds_up_to_dollar() {
        // exact value is ~2639.19
        let result = monthly_payment(500_000.0, 4.0, 25).unwrap();
        assert_eq!(result.monthly_payment, 2640.0);
        assert_eq!(result.total_payment, 2640.0 * 300.0);
        assert_eq!(result.total_interest, 2640.0 * 300.0 - 500_000.0);
    }

    #[test]
    fn test_monthly_payment_zero_rate() {
        let result = monthly_payment(120_000.0, 0.0, 10).unwrap();
        assert_eq!(result.monthly_payment, 1000.0);
        assert_eq!(result.total_interest, 0.0);
    }

    #[test]
    fn test_monthly_payment_rejects_bad_tenure() {
        assert!(matches!(
            monthly_payment(100_000.0, 3.0, 0),
            Err(DomainError::ValidationError(_))
        ));
        assert!(monthly_payment(-1.0, 3.0, 10).is_err());
    }

    #[test]
    fn test_monthly_payment_rejects_tenure_beyond_limit() {
        assert!(monthly_payment(500_000.0, 4.0, 35).is_ok());
        assert!(matches!(
            monthly_payment(500_000.0, 4.0, 36),
            Err(DomainError::ValidationError(_))
        ));
        assert!(matches!(
            monthly_payment(500_000.0, 4.0, 200_000_000),
            Err(DomainError::ValidationError(_))
        ));
    }

    #[test]
    fn test_tdsr_compliant_ratio() {
        let result = tdsr(10_000.0, 1_000.0, 3_000.0, PropertyType::Private).unwrap();
        assert_eq!(result.ratio_percent, 40.0);
        assert_eq!(result.available, 4_500.0);
        assert!(result.compliant);
        assert_eq!(result.stress_test_rate, 4.0);
    }

    #[test]
    fn test_tdsr_breach_and_commercial_stress_rate() {
        let result = tdsr(10_000.0, 2_000.0, 4_000.0, PropertyType::Commercial).unwrap();
        assert_eq!(result.ratio_percent, 60.0);
        assert!(!result.compliant);
        assert_eq!(result.stress_test_rate, 5.0);
    }

    #[test]
    fn test_tdsr_requires_income() {
        assert!(tdsr(0.0, 0.0, 1_000.0, PropertyType::Hdb).is_err());
    }

    #[test]
    fn test_msr_only_for_public_housing() {
        let hdb = msr(10_000.0, 3_500.0, PropertyType::Hdb).unwrap();
        assert!(hdb.applicable);
        assert_eq!(hdb.limit, Some(3_000.0));
        assert_eq!(hdb.ratio_percent, Some(35.0));
        assert!(!hdb.compliant);

        let private = msr(10_000.0, 3_500.0, PropertyType::Private).unwrap();
        assert!(!private.applicable);
        assert_eq!(private.limit, None);
        assert!(private.compliant);
    }

    #[test]
    fn test_bsd_progressive_tiers() {
        let duty = stamp_duty(1_000_000.0, Citizenship::Citizen, 1, PropertyType::Private).unwrap();
        assert_eq!(duty.bsd, 24_600.0);
        assert_eq!(duty.absd, 0.0);

        let duty = stamp_duty(2_000_000.0, Citizenship::Citizen, 1, PropertyType::Private).unwrap();
        assert_eq!(duty.bsd, 69_600.0);
    }

    #[test]
    fn test_absd_skips_public_housing() {
        let private =
            stamp_duty(1_000_000.0, Citizenship::Citizen, 2, PropertyType::Private).unwrap();
        assert_eq!(private.absd, 200_000.0);
        assert_eq!(private.total, 224_600.0);

        let hdb = stamp_duty(1_000_000.0, Citizenship::PermanentResident, 2, PropertyType::Hdb)
            .unwrap();
        assert_eq!(hdb.absd, 0.0);
    }

    #[test]
    fn test_max_loan_hdb_bound_by_ltv() {
        let inputs = LoanInputs {
            property_price: 500_000.0,
            property_type: PropertyType::Hdb,
            monthly_income: 8_000.0,
            existing_commitments: 0.0,
            age: 35,
            citizenship: Citizenship::Citizen,
            property_count: 1,
            co_applicant: None,
        };
        let result = max_loan(&inputs).unwrap();
        assert_eq!(result.max_loan, 375_000.0);
        assert_eq!(result.limiting_factor, LimitingFactor::Ltv);
        assert_eq!(result.max_tenure, 25);
        assert!(!result.ltv_penalty);
        assert!(result.msr_used.is_some());
        assert!(result.mas_compliant);
        assert_eq!(result.min_cash_required, 25_000.0);
    }

    #[test]
    fn test_max_loan_private_extended_tenure_bound_by_tdsr() {
        let inputs = LoanInputs {
            property_price: 2_000_000.0,
            property_type: PropertyType::Private,
            monthly_income: 10_000.0,
            existing_commitments: 2_000.0,
            age: 30,
            citizenship: Citizenship::Citizen,
            property_count: 1,
            co_applicant: None,
        };
        let result = max_loan(&inputs).unwrap();
        assert!(result.ltv_penalty);
        assert_eq!(result.ltv_applied, 70.0);
        assert_eq!(result.max_tenure, 35);
        assert_eq!(result.recommended_tenure, 30);
        assert_eq!(result.limiting_factor, LimitingFactor::Tdsr);
        assert!(result.max_loan < 1_400_000.0);
        assert_eq!(result.max_loan % 1000.0, 0.0);
        assert!(result.msr_used.is_none());
    }

    #[test]
    fn test_max_loan_rejects_age_past_limit() {
        let inputs = LoanInputs {
            property_price: 400_000.0,
            property_type: PropertyType::Hdb,
            monthly_income: 5_000.0,
            existing_commitments: 0.0,
            age: 66,
            citizenship: Citizenship::Citizen,
            property_count: 1,
            co_applicant: None,
        };
        assert!(matches!(
            max_loan(&inputs),
            Err(DomainError::ValidationError(_))
        ));
    }

    #[test]
    fn test_max_loan_rejects_underage_co_applicant() {
        let mut inputs = LoanInputs {
            property_price: 800_000.0,
            property_type: PropertyType::Private,
            monthly_income: 6_000.0,
            existing_commitments: 0.0,
            age: 40,
            citizenship: Citizenship::Citizen,
            property_count: 1,
            co_applicant: Some(CoApplicant {
                monthly_income: 4_000.0,
                age: i32::MIN,
                existing_commitments: 0.0,
            }),
        };
        match max_loan(&inputs) {
            Err(DomainError::ValidationError(msg)) => assert!(msg.contains("coApplicant.age")),
            other => panic!("expected validation error, got {:?}", other),
        }

        if let Some(co) = inputs.co_applicant.as_mut() {
            co.age = 17;
        }
        assert!(matches!(
            max_loan(&inputs),
            Err(DomainError::ValidationError(_))
        ));
    }

    #[test]
    fn test_max_loan_rejects_extreme_age() {
        let inputs = LoanInputs {
            property_price: 400_000.0,
            property_type: PropertyType::Private,
            monthly_income: 5_000.0,
            existing_commitments: 0.0,
            age: i32::MAX,
            citizenship: Citizenship::Citizen,
            property_count: 1,
            co_applicant: None,
        };
        assert!(matches!(
            max_loan(&inputs),
            Err(DomainError::ValidationError(_))
        ));
    }

    #[test]
    fn test_income_weighted_age_rounds_up() {
        assert_eq!(income_weighted_age(&[(30, 6_000.0), (41, 4_000.0)]), 35);
        assert_eq!(income_weighted_age(&[(40, 0.0), (50, 0.0)]), 50);
    }
}
