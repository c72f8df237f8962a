mod common;

use common::*;
use lending_pool::{InterestRateModel, LiquidationEngine};
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_borrow_rate_is_monotonic(
        a in 0u64..=10_000,
        b in 0u64..=10_000,
    ) {
        let model = InterestRateModel::default();
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(model.borrow_rate(low).unwrap() <= model.borrow_rate(high).unwrap());
    }

    #[test]
    fn test_supply_rate_never_exceeds_borrow_rate(
        utilization in 0u64..=10_000,
        fee_bps in 0u16..=500,
    ) {
        let model = InterestRateModel::default();
        let borrow = model.borrow_rate(utilization).unwrap();
        let supply = model.supply_rate(utilization, fee_bps).unwrap();
        prop_assert!(supply <= borrow);
    }

    #[test]
    fn test_max_borrow_is_never_liquidatable(
        value in 0u64..1_000_000_000_000_000,
        threshold in 10_000u16..=30_000,
    ) {
        let max_borrow = (value as u128 * 10_000 / threshold as u128) as u64;
        prop_assert!(!LiquidationEngine::is_liquidatable(value, threshold, max_borrow).unwrap());
        prop_assert!(LiquidationEngine::health_factor(value, threshold, max_borrow).unwrap() >= 10_000);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_deposit_withdraw_restores_balances(amount in 1u64..=pyusd(1_000_000)) {
        let ctx = TestContext::new();
        let before = ctx.pyusd_balance(&ctx.alice);

        ctx.deposit(&ctx.alice, amount);
        prop_assert_eq!(ctx.pool.total_liquidity(), amount);
        ctx.pool.withdraw(&ctx.alice, amount, &ctx.clock()).unwrap();

        prop_assert_eq!(ctx.pool.total_liquidity(), 0);
        prop_assert_eq!(ctx.pyusd_balance(&ctx.alice), before);
        prop_assert!(ctx.pool.deposits(&ctx.alice).is_none());
    }

    #[test]
    fn test_borrowing_the_max_stays_healthy(collateral in 1_000u64..=weth(100)) {
        let ctx = TestContext::new();
        ctx.deposit(&ctx.alice, pyusd(1_000_000));

        let max = ctx
            .pool
            .get_max_borrow_amount(&ctx.weth, collateral, &ctx.clock())
            .unwrap();
        prop_assume!(max > 0);

        let loan_id = ctx.borrow(&ctx.bob, max, collateral);
        prop_assert!(!ctx.pool.is_liquidatable(loan_id, &ctx.clock()).unwrap());
    }
}
