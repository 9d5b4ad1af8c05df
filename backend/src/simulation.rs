//! Illustrative investment-growth projection.
//!
//! The projection compounds a fixed monthly return and perturbs every step
//! with a random shock scaled by the asset's risk tier. Two runs with the same
//! request are expected to differ; the RNG is a parameter so callers decide
//! where randomness comes from.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest horizon accepted, fifty years.
pub const MAX_MONTHS: i64 = 600;

/// Smallest principal accepted. Projections are reported in cents, so
/// anything below one cent would round away.
pub const MIN_AMOUNT: f64 = 0.01;

/// Largest principal accepted. Keeps the cent rounding of a fifty-year
/// aggressive projection well inside `f64` range.
pub const MAX_AMOUNT: f64 = 1e15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskTier {
    pub fn annual_rate(self) -> f64 {
        match self {
            RiskTier::Conservative => 0.06,
            RiskTier::Moderate => 0.10,
            RiskTier::Aggressive => 0.15,
        }
    }

    /// Half-width of the monthly shock band.
    pub fn volatility(self) -> f64 {
        match self {
            RiskTier::Conservative => 0.01,
            RiskTier::Moderate => 0.03,
            RiskTier::Aggressive => 0.06,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentAsset {
    MoneyMarketFund,
    Deposit,
    BondFund,
    Gold,
    EquityFund,
    Stock,
}

impl InvestmentAsset {
    pub fn risk_tier(self) -> RiskTier {
        match self {
            InvestmentAsset::MoneyMarketFund | InvestmentAsset::Deposit => RiskTier::Conservative,
            InvestmentAsset::BondFund | InvestmentAsset::Gold => RiskTier::Moderate,
            InvestmentAsset::EquityFund | InvestmentAsset::Stock => RiskTier::Aggressive,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("investment amount must be between 0.01 and 1000000000000000")]
    InvalidAmount,

    #[error("period must be between 1 and 600 months")]
    InvalidPeriod,

    #[error("an asset must be selected")]
    MissingAsset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub amount: f64,
    pub months: i64,
    pub asset: Option<InvestmentAsset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationPoint {
    pub month: u32,
    pub projected_value: f64,
    pub invested_amount: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationOutcome {
    pub asset: InvestmentAsset,
    pub risk_tier: RiskTier,
    pub annual_rate: f64,
    pub points: Vec<SimulationPoint>,
    pub final_value: f64,
    pub total_profit: f64,
    pub return_percentage: f64,
}

/// Checks a request and returns the asset and horizon it selects.
fn validate(request: &SimulationRequest) -> Result<(InvestmentAsset, u32), SimulationError> {
    if !(MIN_AMOUNT..=MAX_AMOUNT).contains(&request.amount) {
        return Err(SimulationError::InvalidAmount);
    }
    if request.months <= 0 || request.months > MAX_MONTHS {
        return Err(SimulationError::InvalidPeriod);
    }
    let asset = request.asset.ok_or(SimulationError::MissingAsset)?;
    Ok((asset, request.months as u32))
}

/// Projects month-by-month values for `request`, months `0..=months`.
///
/// Month 0 is the principal with no profit. The principal is never topped up,
/// so `invested_amount` is the same on every point.
pub fn simulate<R>(request: &SimulationRequest, rng: &mut R) -> Result<Vec<SimulationPoint>, SimulationError>
where
    R: Rng + ?Sized,
{
    let (asset, months) = validate(request)?;
    Ok(project(request.amount, asset.risk_tier(), months, rng))
}

/// Runs [`simulate`] and attaches the headline figures.
pub fn run<R>(request: &SimulationRequest, rng: &mut R) -> Result<SimulationOutcome, SimulationError>
where
    R: Rng + ?Sized,
{
    let (asset, months) = validate(request)?;
    let tier = asset.risk_tier();
    let points = project(request.amount, tier, months, rng);

    let last = points[months as usize];
    let return_percentage = round_cents(last.profit / request.amount * 100.0);

    Ok(SimulationOutcome {
        asset,
        risk_tier: tier,
        annual_rate: tier.annual_rate(),
        final_value: last.projected_value,
        total_profit: last.profit,
        return_percentage,
        points,
    })
}

fn project<R>(principal: f64, tier: RiskTier, months: u32, rng: &mut R) -> Vec<SimulationPoint>
where
    R: Rng + ?Sized,
{
    let monthly_rate = tier.annual_rate() / 12.0;
    let volatility = tier.volatility();

    let mut points = Vec::with_capacity(months as usize + 1);
    points.push(SimulationPoint {
        month: 0,
        projected_value: principal,
        invested_amount: principal,
        profit: 0.0,
    });

    let mut value = principal;
    for month in 1..=months {
        let shock: f64 = rng.random_range(-1.0..1.0);
        value *= 1.0 + monthly_rate + shock * volatility;

        let projected_value = round_cents(value);
        points.push(SimulationPoint {
            month,
            projected_value,
            invested_amount: principal,
            profit: round_cents(projected_value - principal),
        });
    }

    points
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn request(amount: f64, months: i64, asset: Option<InvestmentAsset>) -> SimulationRequest {
        SimulationRequest {
            amount,
            months,
            asset,
        }
    }

    #[test]
    fn test_structure_for_every_asset() {
        let assets = [
            InvestmentAsset::MoneyMarketFund,
            InvestmentAsset::Deposit,
            InvestmentAsset::BondFund,
            InvestmentAsset::Gold,
            InvestmentAsset::EquityFund,
            InvestmentAsset::Stock,
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for asset in assets {
            for months in [1, 12, 120] {
                let amount = 1_000_000.0;
                let points = simulate(&request(amount, months, Some(asset)), &mut rng)
                    .expect("valid request");

                assert_eq!(points.len(), months as usize + 1);
                assert_eq!(points[0].month, 0);
                assert_eq!(points[0].projected_value, amount);
                assert_eq!(points[0].profit, 0.0);
                for (k, point) in points.iter().enumerate() {
                    assert_eq!(point.month as usize, k);
                    assert_eq!(point.invested_amount, amount);
                    assert!(point.projected_value > 0.0);
                }
            }
        }
    }

    #[test]
    fn test_profit_tracks_projected_value() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let points = simulate(&request(2_500.0, 24, Some(InvestmentAsset::Stock)), &mut rng)
            .expect("valid request");

        for point in &points {
            let expected = point.projected_value - point.invested_amount;
            assert!((point.profit - expected).abs() < 0.011);
        }
    }

    #[test]
    fn test_steps_stay_within_volatility_band() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let tier = RiskTier::Moderate;
        let points = simulate(&request(10_000.0, 36, Some(InvestmentAsset::Gold)), &mut rng)
            .expect("valid request");

        let low = 1.0 + tier.annual_rate() / 12.0 - tier.volatility();
        let high = 1.0 + tier.annual_rate() / 12.0 + tier.volatility();
        for pair in points.windows(2) {
            let ratio = pair[1].projected_value / pair[0].projected_value;
            // Rounding to cents leaves a little slack on either side.
            assert!(ratio > low - 0.001 && ratio < high + 0.001, "ratio {ratio}");
        }
    }

    #[test]
    fn test_rejects_invalid_amount() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = simulate(&request(amount, 12, Some(InvestmentAsset::Deposit)), &mut rng)
                .expect_err("amount must be rejected");
            assert_eq!(err, SimulationError::InvalidAmount);
        }
    }

    #[test]
    fn test_amount_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for amount in [0.004, MIN_AMOUNT - 0.001, 1e307, MAX_AMOUNT * 10.0, f64::MAX] {
            let err = run(&request(amount, 12, Some(InvestmentAsset::Stock)), &mut rng)
                .expect_err("amount must be rejected");
            assert_eq!(err, SimulationError::InvalidAmount);
        }

        for amount in [MIN_AMOUNT, MAX_AMOUNT] {
            let outcome = run(&request(amount, MAX_MONTHS, Some(InvestmentAsset::Stock)), &mut rng)
                .expect("amount within bounds");
            for point in &outcome.points {
                assert!(point.projected_value.is_finite());
                assert!(point.profit.is_finite());
                assert_eq!(point.invested_amount, amount);
            }
            assert!(outcome.return_percentage.is_finite());
        }
    }

    #[test]
    fn test_rejects_invalid_period() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for months in [0, -1, MAX_MONTHS + 1] {
            let err = simulate(&request(100.0, months, Some(InvestmentAsset::Deposit)), &mut rng)
                .expect_err("period must be rejected");
            assert_eq!(err, SimulationError::InvalidPeriod);
        }
    }

    #[test]
    fn test_rejects_missing_asset() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = simulate(&request(100.0, 12, None), &mut rng).expect_err("asset required");
        assert_eq!(err, SimulationError::MissingAsset);
    }

    #[test]
    fn test_run_summarises_last_point() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let outcome = run(&request(5_000.0, 60, Some(InvestmentAsset::BondFund)), &mut rng)
            .expect("valid request");

        let last = outcome.points.last().expect("points");
        assert_eq!(outcome.risk_tier, RiskTier::Moderate);
        assert_eq!(outcome.annual_rate, 0.10);
        assert_eq!(outcome.final_value, last.projected_value);
        assert_eq!(outcome.total_profit, last.profit);
        assert_eq!(outcome.points.len(), 61);
    }

    #[test]
    fn test_asset_tiers() {
        assert_eq!(InvestmentAsset::Deposit.risk_tier(), RiskTier::Conservative);
        assert_eq!(InvestmentAsset::Gold.risk_tier(), RiskTier::Moderate);
        assert_eq!(InvestmentAsset::Stock.risk_tier(), RiskTier::Aggressive);
        assert!(RiskTier::Conservative.annual_rate() < RiskTier::Moderate.annual_rate());
        assert!(RiskTier::Moderate.annual_rate() < RiskTier::Aggressive.annual_rate());
    }
}
