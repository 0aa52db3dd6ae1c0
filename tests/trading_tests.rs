// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveDateTime};
use masteryhub::cli;
use masteryhub::commands::{Ctx, accounts, strategies, trades};
use masteryhub::config::AppConfig;
use masteryhub::metrics::{
    ProjectionView, TradingMood, account_stats, compounding_projection, evaluate_strategies,
    greeting, monthly_stats, trading_mood, weekly_stats, win_rate,
};
use masteryhub::models::{
    AccountKind, Direction, Phase, Strategy, Trade, TradeStatus, TradingAccount,
};
use masteryhub::risk::{
    Band, LotRequest, LotSizeError, LotWarning, MAX_LOT, MIN_LOT, lot_size, overall_drawdown,
    prop_firm_intel,
};
use masteryhub::state::AppState;
use masteryhub::storage::MemoryStorage;
use masteryhub::store::Store;
use rust_decimal::Decimal;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 20)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

fn run(store: &mut Store, args: &[&str]) -> anyhow::Result<()> {
    let storage = MemoryStorage::new();
    let config = AppConfig::default();
    let ctx = Ctx::new(&storage, &config, now());
    let mut argv = vec!["masteryhub"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("trade", m)) => trades::handle(store, &ctx, m),
        Some(("account", m)) => accounts::handle(store, &ctx, m),
        Some(("strategy", m)) => strategies::handle(store, &ctx, m),
        _ => panic!("command not parsed"),
    }
}

fn trade(id: &str, pnl: &str, day: u32) -> Trade {
    let pnl = dec(pnl);
    Trade {
        id: id.into(),
        pair: "EURUSD".into(),
        r#type: Direction::Long,
        entry: Decimal::ONE,
        pnl,
        duration: None,
        time: NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap(),
        rr: "1:2".into(),
        status: TradeStatus::from_pnl(pnl),
        mood: None,
        session: None,
        notes: None,
        reflection: None,
        chart_link: None,
        image: None,
        strategy_id: None,
        account_id: None,
    }
}

#[test]
fn win_rate_is_a_ratio_and_zero_without_trades() {
    assert_eq!(win_rate(&Vec::<Trade>::new()), 0.0);
    let ts = vec![trade("a", "10", 1), trade("b", "-5", 2), trade("c", "3", 3)];
    assert!((win_rate(&ts) - 2.0 / 3.0).abs() < 1e-9);
    let be = vec![trade("z", "0", 1)];
    assert_eq!(win_rate(&be), 0.0);
}

#[test]
fn monthly_stats_track_best_and_worst_day() {
    let ts = vec![
        trade("a", "100", 2),
        trade("b", "-40", 2),
        trade("c", "-90", 3),
        trade("d", "500", 1),
    ];
    let refs: Vec<&Trade> = ts.iter().collect();
    let s = monthly_stats(&refs, 2024, 5);
    assert_eq!(s.total_trades, 4);
    assert_eq!(s.total_pnl, dec("470"));
    assert_eq!(s.best_day_pnl, dec("500"));
    assert_eq!(s.worst_day_pnl, dec("-90"));
    // two wins at 2R, two losses at -1R
    assert!((s.avg_r - 0.5).abs() < 1e-9);
    assert_eq!(monthly_stats(&refs, 2024, 6).total_trades, 0);
}

#[test]
fn logging_a_trade_moves_the_primary_balance() {
    let mut store = Store::new(AppState::default());
    let before = store.state().account("acc_1").unwrap().balance;
    run(
        &mut store,
        &[
            "trade", "add", "--pair", "xauusd", "--type", "short", "--pnl=-75.5", "--rr", "1:2",
            "--session", "new york", "--mood", "disciplined",
        ],
    )
    .unwrap();
    let st = store.state();
    let t = &st.trades[0];
    assert_eq!(t.pair, "XAUUSD");
    assert_eq!(t.status, TradeStatus::Loss);
    assert_eq!(t.account_id.as_deref(), Some("acc_1"));
    assert_eq!(t.time, now());
    assert_eq!(st.account("acc_1").unwrap().balance, before - dec("75.5"));
}

#[test]
fn unknown_account_rejects_the_trade() {
    let mut store = Store::new(AppState::default());
    let snapshot = store.state().clone();
    let res = run(
        &mut store,
        &[
            "trade", "add", "--pair", "NAS100", "--type", "LONG", "--pnl", "10", "--rr", "1:1",
            "--account", "ghost",
        ],
    );
    assert!(res.is_err());
    assert_eq!(store.state(), &snapshot);
}

#[test]
fn deleting_a_trade_reverts_its_pnl() {
    let mut store = Store::new(AppState::default());
    let before = store.state().account("acc_1").unwrap().balance;
    // tr1 is a +450 seed trade on acc_1
    run(&mut store, &["trade", "delete", "--id", "tr1"]).unwrap();
    assert_eq!(
        store.state().account("acc_1").unwrap().balance,
        before - Decimal::from(450)
    );
    assert!(store.state().trades.iter().all(|t| t.id != "tr1"));
}

#[test]
fn deleting_the_primary_account_cascades_and_reassigns() {
    let mut store = Store::new(AppState::default());
    assert!(store.state().account("acc_1").unwrap().is_primary);
    assert!(store
        .state()
        .trades
        .iter()
        .any(|t| t.account_id.as_deref() == Some("acc_1")));

    run(&mut store, &["account", "delete", "--id", "acc_1"]).unwrap();

    let st = store.state();
    assert!(st.account("acc_1").is_none());
    assert!(st.trades.iter().all(|t| t.account_id.as_deref() != Some("acc_1")));
    assert!(st.account("acc_2").unwrap().is_primary);
    assert_eq!(st.primary_account().unwrap().id, "acc_2");
}

#[test]
fn account_add_validates_percentages_atomically() {
    let mut store = Store::new(AppState::empty());
    let res = run(
        &mut store,
        &[
            "account", "add", "--name", "Eval", "--type", "prop", "--balance", "50000",
            "--daily-dd", "150",
        ],
    );
    assert!(res.is_err());
    assert!(store.state().accounts.is_empty());

    run(
        &mut store,
        &["account", "add", "--name", "Eval", "--type", "prop", "--balance", "50000"],
    )
    .unwrap();
    let acc = &store.state().accounts[0];
    // The first account always becomes primary.
    assert!(acc.is_primary);
    assert_eq!(acc.phase, Some(Phase::Phase1));
    assert_eq!(acc.initial_phase_balance, Some(Decimal::from(50_000)));
}

#[test]
fn strategy_crud_keeps_newest_first() {
    let mut store = Store::new(AppState::empty());
    run(&mut store, &["strategy", "add", "--title", "Breakout", "--timeframe", "M15"]).unwrap();
    run(&mut store, &["strategy", "add", "--title", "Reversal"]).unwrap();
    let st = store.state();
    assert_eq!(st.strategies[0].title, "Reversal");
    assert_eq!(st.strategies[1].timeframe.as_deref(), Some("M15"));
    let id = st.strategies[1].id.clone();
    run(&mut store, &["strategy", "update", "--id", &id, "--tag", "Momentum"]).unwrap();
    assert_eq!(store.state().strategies[1].tag, "Momentum");
    run(&mut store, &["strategy", "delete", "--id", &id]).unwrap();
    assert_eq!(store.state().strategies.len(), 1);
}

fn live(balance: i64) -> TradingAccount {
    TradingAccount::new("l", "Live", AccountKind::Live, Decimal::from(balance), "$")
}

fn req(symbol: &str, risk: &str, sl: &str) -> LotRequest {
    LotRequest {
        instrument: symbol.into(),
        risk_pct: Some(dec(risk)),
        stop_loss: Some(dec(sl)),
        use_equity: false,
    }
}

#[test]
fn lot_size_stays_within_broker_bounds() {
    let acc = live(5000);

    // 1% of 5000 over a 1 point forex stop at 10/point
    let mid = lot_size(Some(&acc), &req("EURUSD", "1", "1")).unwrap();
    assert_eq!(mid.lot, dec("5"));
    assert_eq!(mid.risk_amount, dec("50"));
    assert!(mid.warning.is_none());

    let tiny = lot_size(Some(&acc), &req("EURUSD", "1", "1000")).unwrap();
    assert_eq!(tiny.lot, MIN_LOT);
    assert_eq!(tiny.warning, Some(LotWarning::RaisedToMinimum));

    let huge = lot_size(Some(&acc), &req("NAS100", "2", "0.01")).unwrap();
    assert_eq!(huge.lot, MAX_LOT);
    assert_eq!(huge.warning, Some(LotWarning::ClampedToMaximum));
}

#[test]
fn lot_size_rejects_bad_inputs() {
    let acc = live(5000);
    assert_eq!(
        lot_size(None, &req("EURUSD", "1", "1")),
        Err(LotSizeError::MissingParameters)
    );
    assert_eq!(
        lot_size(Some(&acc), &req("EURUSD", "1", "0")),
        Err(LotSizeError::StopLossNotPositive)
    );

    let mut prop = TradingAccount::new(
        "p",
        "Challenge",
        AccountKind::PropFirm,
        Decimal::from(100_000),
        "$",
    );
    prop.phase = Some(Phase::Phase1);
    prop.initial_phase_balance = Some(Decimal::from(100_000));
    let err = lot_size(Some(&prop), &req("EURUSD", "1.5", "10")).unwrap_err();
    assert_eq!(err, LotSizeError::ExceedsPhaseLimit(Decimal::ONE));
    assert_eq!(err.to_string(), "Exceeds Phase Limit (1%)");

    // Daily window already spent: 5% of 100k lost since the start of day.
    prop.start_of_day_balance = Some(Decimal::from(100_000));
    prop.equity = Some(Decimal::from(95_000));
    assert_eq!(
        lot_size(Some(&prop), &req("EURUSD", "0.5", "10")),
        Err(LotSizeError::DailyDrawdownReached)
    );
}

fn on(mut t: Trade, month: u32, day: u32) -> Trade {
    t.time = NaiveDate::from_ymd_opt(2024, month, day)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    t
}

fn strategy(id: &str) -> Strategy {
    Strategy {
        id: id.into(),
        title: id.to_uppercase(),
        description: String::new(),
        tag: "ICT".into(),
        image: String::new(),
        model_image: None,
        notes: None,
        market_condition: None,
        timeframe: None,
        entry_criteria: None,
        risk_model: None,
    }
}

#[test]
fn daily_projection_compounds_and_tracks_actuals() {
    let ts = vec![trade("a", "100", 1), trade("b", "-50", 2), trade("c", "200", 3)];
    let refs: Vec<&Trade> = ts.iter().collect();
    let p = compounding_projection(&refs, None, Some(Decimal::from(1000)), 2.0, ProjectionView::Daily);

    // max(28, 3 + 5) steps after the starting point
    assert_eq!(p.points.len(), 29);
    let projected: Vec<i64> = p.points[..4].iter().map(|x| x.projected).collect();
    assert_eq!(projected, vec![1000, 1020, 1040, 1061]);
    let actual: Vec<Option<i64>> = p.points[..5].iter().map(|x| x.actual).collect();
    assert_eq!(actual, vec![Some(1000), Some(1100), Some(1050), Some(1250), None]);
    assert_eq!(p.current_actual, Decimal::from(1250));
    assert!(p.is_on_track);
    assert_eq!(p.today_target, 25);

    let many: Vec<Trade> = (0..24).map(|i| trade(&format!("t{i}"), "1", 1)).collect();
    let refs: Vec<&Trade> = many.iter().collect();
    let p = compounding_projection(&refs, None, None, 1.0, ProjectionView::Daily);
    assert_eq!(p.base_capital, Decimal::from(5000));
    assert_eq!(p.points.len(), 30);
}

#[test]
fn projection_flags_falling_behind() {
    let ts = vec![trade("a", "-50", 1)];
    let refs: Vec<&Trade> = ts.iter().collect();
    let mut acc = TradingAccount::new("acc", "Live", AccountKind::Live, dec("950"), "$");
    acc.is_primary = true;
    let p = compounding_projection(&refs, Some(&acc), None, 2.0, ProjectionView::Daily);
    assert_eq!(p.base_capital, Decimal::from(1000));
    assert!(!p.is_on_track);
}

#[test]
fn monthly_projection_compounds_twenty_trading_days() {
    let ts = vec![
        trade("a", "100", 1),
        trade("b", "-50", 2),
        trade("c", "200", 3),
        on(trade("d", "100", 1), 6, 4),
    ];
    let refs: Vec<&Trade> = ts.iter().collect();
    let p = compounding_projection(&refs, None, Some(Decimal::from(1000)), 2.0, ProjectionView::Monthly);
    let names: Vec<&str> = p.points.iter().map(|x| x.name.as_str()).collect();
    assert_eq!(names, vec!["Start", "May 24", "Jun 24"]);
    assert_eq!(p.points[1].projected, 1486);
    assert_eq!(p.points[1].actual, Some(1250));
    assert_eq!(p.points[2].projected, 2208);
    assert_eq!(p.points[2].actual, Some(1350));
    assert!(!p.is_on_track);
}

#[test]
fn weekly_stats_cover_four_weeks_and_count_trading_days() {
    // May 2024 starts on a Wednesday, so the 26th falls in week 5.
    let ts = vec![
        trade("a", "100", 1),
        trade("b", "50", 1),
        trade("c", "-30", 5),
        trade("d", "10", 20),
        trade("e", "500", 26),
        on(trade("f", "999", 30), 4, 30),
    ];
    let refs: Vec<&Trade> = ts.iter().collect();
    let w = weekly_stats(&refs, 2024, 5);
    assert_eq!(w.weeks.len(), 4);
    let rows: Vec<(u32, Decimal, usize)> = w.weeks.iter().map(|x| (x.week, x.pnl, x.days)).collect();
    assert_eq!(
        rows,
        vec![
            (1, dec("150"), 1),
            (2, dec("-30"), 1),
            (3, Decimal::ZERO, 0),
            (4, dec("10"), 1),
        ]
    );
    assert_eq!(w.total_pnl, dec("630"));
    assert_eq!(w.total_days, 4);
}

#[test]
fn account_progress_is_measured_against_the_profit_target() {
    let up = TradingAccount::new("up", "Up", AccountKind::Live, dec("10500"), "$");
    let down = TradingAccount::new("down", "Down", AccountKind::Demo, dec("900"), "$");
    let mut ts = vec![trade("a", "300", 1), trade("b", "200", 2), trade("c", "-100", 3)];
    ts[0].account_id = Some("up".into());
    ts[1].account_id = Some("up".into());
    ts[2].account_id = Some("down".into());

    let stats = account_stats(&[down, up], &ts);
    assert_eq!(stats[0].account_id, "up");
    assert_eq!(stats[0].net_profit, dec("500"));
    // 10% of the 10_000 starting balance
    assert_eq!(stats[0].progress, 50.0);
    assert_eq!(stats[0].trade_count, 2);
    assert_eq!(stats[1].progress, 0.0);
    assert_eq!(stats[1].win_rate, 0.0);
}

#[test]
fn losing_strategies_need_review_after_three_trades() {
    let mut ts = vec![
        trade("a", "-10", 1),
        trade("b", "-10", 2),
        trade("c", "-10", 3),
        trade("d", "-100", 4),
        trade("e", "-100", 5),
        trade("f", "300", 6),
    ];
    for (t, s) in ts.iter_mut().zip(["s1", "s1", "s1", "s2", "s2", "s3"]) {
        t.strategy_id = Some(s.into());
    }
    ts[5].image = Some("chart.png".into());

    let eval = evaluate_strategies(&[strategy("s1"), strategy("s2"), strategy("s3")], &ts);
    let order: Vec<(&str, &str)> = eval
        .iter()
        .map(|e| (e.strategy_id.as_str(), e.status))
        .collect();
    assert_eq!(
        order,
        vec![("s3", "Optimal"), ("s1", "Needs Review"), ("s2", "Optimal")]
    );
    assert_eq!(eval[0].screenshots, 1);
    assert_eq!(eval[1].average_return, dec("-10"));
    assert_eq!(eval[1].avg_r, 2.0);
    assert_eq!(eval[2].worst_trade, dec("-100"));
}

#[test]
fn overall_drawdown_runs_from_peak_equity() {
    let mut live = TradingAccount::new("l", "Live", AccountKind::Live, dec("10000"), "$");
    live.highest_equity = Some(dec("10500"));
    live.equity = Some(dec("9800"));
    let dd = overall_drawdown(&live);
    assert_eq!(dd.limit, dec("2000"));
    assert_eq!(dd.used, dec("700"));
    assert_eq!(dd.used_pct, 35.0);
    assert_eq!(dd.band, Band::Safe);

    let mut prop = TradingAccount::new("p", "Prop", AccountKind::PropFirm, dec("100000"), "$");
    prop.phase = Some(Phase::Phase1);
    prop.initial_phase_balance = Some(dec("100000"));
    prop.highest_equity = Some(dec("104000"));
    prop.equity = Some(dec("96000"));
    let dd = overall_drawdown(&prop);
    assert_eq!(dd.limit, dec("10000"));
    assert_eq!(dd.remaining, dec("2000"));
    assert_eq!(dd.band, Band::Caution);
    assert!(!dd.is_breached());

    prop.equity = Some(dec("94000"));
    assert!(overall_drawdown(&prop).is_breached());
}

#[test]
fn prop_intel_tracks_target_and_limits() {
    let mut prop = TradingAccount::new("p", "Prop", AccountKind::PropFirm, dec("101500"), "$");
    prop.phase = Some(Phase::Phase1);
    prop.initial_phase_balance = Some(dec("100000"));
    prop.daily_drawdown_pct = Some(dec("5"));
    prop.max_drawdown_pct = Some(dec("10"));
    let ts = vec![trade("a", "3000", 10), trade("b", "-1000", 20), trade("c", "-500", 20)];
    let refs: Vec<&Trade> = ts.iter().collect();

    let intel = prop_firm_intel(&prop, &refs, now().date(), 1.0).unwrap();
    assert_eq!(intel.target_profit_amount, dec("10000"));
    assert_eq!(intel.today_pnl, dec("-1500"));
    assert_eq!(intel.total_pnl, dec("1500"));
    assert_eq!(intel.profit_progress, 15.0);
    assert_eq!(intel.daily_consumed, 30.0);
    assert_eq!(intel.daily_band, Band::Safe);
    assert_eq!(intel.max_consumed, 0.0);
    assert_eq!(intel.remaining_to_target, dec("8500"));
    assert_eq!(intel.goal_value, dec("110000"));
    // ln(110000 / 101500) / ln(1.01) = 8.08
    assert_eq!(intel.estimated_days, 9);

    let live = TradingAccount::new("l", "Live", AccountKind::Live, dec("5000"), "$");
    assert!(prop_firm_intel(&live, &refs, now().date(), 1.0).is_none());
}

#[test]
fn greeting_follows_todays_pnl() {
    let today = now().date();
    assert_eq!(trading_mood(&[], today), TradingMood::NoTrades);
    assert_eq!(trading_mood(&[trade("a", "50", 20)], today), TradingMood::Green);
    assert_eq!(
        trading_mood(&[trade("a", "50", 20), trade("b", "-80", 20)], today),
        TradingMood::Drawdown
    );
    assert_eq!(
        trading_mood(&[trade("a", "0", 20), trade("b", "900", 19)], today),
        TradingMood::Flat
    );

    assert_eq!(greeting(TradingMood::Green, 1, Some("Ada")), "Clean execution, Ada");
    assert_eq!(greeting(TradingMood::Flat, 3, None), "Patience wins, PDTrades");
    // standard, then languages, then flat
    assert_eq!(greeting(TradingMood::NoTrades, 5, Some("Ada")), "Hola, Ada 🇪🇸");
    assert_eq!(greeting(TradingMood::NoTrades, 13, Some("Ada")), "Patience wins, Ada");
}
