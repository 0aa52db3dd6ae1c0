// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Starter data a fresh hub opens with.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;

use crate::models::*;

pub const CURRENCY_OPTIONS: &[(&str, &str)] = &[
    ("USD", "$"),
    ("EUR", "€"),
    ("GBP", "£"),
    ("JPY", "¥"),
    ("INR", "₹"),
    ("ZAR", "R"),
    ("CAD", "C$"),
    ("AUD", "A$"),
];

/// Resolves an ISO code or a bare symbol to the symbol stored in state.
pub fn currency_symbol(code_or_symbol: &str) -> Option<&'static str> {
    let needle = code_or_symbol.trim();
    CURRENCY_OPTIONS
        .iter()
        .find(|(code, sym)| code.eq_ignore_ascii_case(needle) || *sym == needle)
        .map(|(_, sym)| *sym)
}

pub const ENVELOPE_COUNT: u32 = 100;

pub const DEFAULT_MANTRA: &str = "This budget builds my financial freedom.";

const DEVOTION_DATA: &[(&str, &str, &str)] = &[
    (
        "Joshua 1:9",
        "Have I not commanded you? Be strong and courageous. Do not be afraid; do not be discouraged, for the Lord your God will be with you wherever you go.",
        "True courage isn't the absence of fear, but the decision to move forward despite it. Today, approach your tasks with a quiet confidence, knowing you are not navigating this path alone. Strength is built in the steady, faithful iterations of daily discipline.",
    ),
    (
        "Proverbs 16:3",
        "Commit to the Lord whatever you do, and he will establish your plans.",
        "When we align our ambitions with a higher purpose, our steps become lighter and our focus sharper. Success isn't just about the outcome, but the integrity of the effort. Entrust your goals to God today and work with a heart of service.",
    ),
    (
        "2 Timothy 1:7",
        "For the Spirit God gave us does not make us timid, but gives us power, love and self-discipline.",
        "Self-discipline is a gift that allows us to master our environment and our minds. You have been equipped with everything necessary to remain calm under pressure. Breathe deeply and lean into the sound mind that has been promised to you.",
    ),
];

pub fn devotions() -> Vec<Devotion> {
    DEVOTION_DATA
        .iter()
        .map(|(r, v, refl)| Devotion {
            reference: r.to_string(),
            verse: v.to_string(),
            reflection: refl.to_string(),
        })
        .collect()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn clock(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default()
}

fn win(id: &str, label: &str, icon: &str, color: &str) -> Win {
    Win {
        id: id.into(),
        label: label.into(),
        icon: icon.into(),
        completed: false,
        color: color.into(),
        streak: 0,
        custom_icon: None,
        completion_history: Vec::new(),
    }
}

pub fn wins() -> Vec<Win> {
    vec![
        win("1", "60m Deep Work Block", "bolt", "blue"),
        win("2", "Morning Market Review", "monitoring", "orange"),
        win("3", "15m Scripture Study", "menu_book", "emerald"),
        win("4", "Workout / Physical Reps", "fitness_center", "purple"),
    ]
}

pub fn mastery_habits() -> Vec<MasteryHabit> {
    vec![
        MasteryHabit {
            id: "m1".into(),
            label: "Skill Practice".into(),
            icon: "layers".into(),
            tags: vec!["Growth".into()],
            progress: 3,
            total: 5,
            color: "blue".into(),
            subject: Some("System Architecture".into()),
            duration: Some(45),
        },
        MasteryHabit {
            id: "m2".into(),
            label: "Trade Journaling".into(),
            icon: "history_edu".into(),
            tags: vec!["Discipline".into()],
            progress: 1,
            total: 3,
            color: "amber".into(),
            subject: Some("NAS100 Backtesting".into()),
            duration: Some(30),
        },
    ]
}

fn bucket(
    id: &str,
    label: &str,
    icon: &str,
    remaining: i64,
    total: i64,
    color: &str,
    priority: Priority,
    kind: BucketType,
    category: BucketCategory,
) -> BudgetBucket {
    BudgetBucket {
        id: id.into(),
        label: label.into(),
        icon: icon.into(),
        remaining: Decimal::from(remaining),
        total: Decimal::from(total),
        color: color.into(),
        priority,
        r#type: kind,
        category,
        custom_icon: None,
        sub_allocations: Vec::new(),
    }
}

pub fn buckets() -> Vec<BudgetBucket> {
    vec![
        bucket(
            "b1",
            "Core Needs",
            "home_work",
            450,
            1200,
            "emerald",
            Priority::Urgent,
            BucketType::Need,
            BucketCategory::Stability,
        ),
        bucket(
            "b2",
            "Wealth Growth",
            "trending_up",
            800,
            1000,
            "blue",
            Priority::High,
            BucketType::Want,
            BucketCategory::WealthGrowth,
        ),
        bucket(
            "b3",
            "Lifestyle / Fun",
            "auto_awesome",
            120,
            300,
            "purple",
            Priority::Medium,
            BucketType::Want,
            BucketCategory::Lifestyle,
        ),
    ]
}

pub fn tasks() -> Vec<ScheduleTask> {
    let task = |id: &str, title: &str, start: NaiveTime, end: NaiveTime, p: Priority, done: bool, cat: &str| {
        ScheduleTask {
            id: id.into(),
            title: title.into(),
            time_start: start,
            time_end: Some(end),
            priority: p,
            completed: done,
            category: cat.into(),
            date: None,
        }
    };
    vec![
        task("t1", "London Open Focus", clock(8, 0), clock(10, 0), Priority::Urgent, true, "Trading"),
        task("t2", "Deep Work: Feature Prep", clock(11, 0), clock(13, 0), Priority::High, false, "Coding"),
        task("t3", "System Maintenance", clock(15, 0), clock(16, 0), Priority::Medium, false, "Admin"),
    ]
}

pub fn accounts() -> Vec<TradingAccount> {
    let mut live = TradingAccount::new("acc_1", "Master Live", AccountKind::Live, Decimal::from(5000), "$");
    live.is_primary = true;

    let mut prop = TradingAccount::new(
        "acc_2",
        "FTMO Challenge",
        AccountKind::PropFirm,
        Decimal::from(100_000),
        "$",
    );
    prop.phase = Some(Phase::Phase1);
    prop.target_profit_pct = Some(Decimal::from(10));
    prop.daily_drawdown_pct = Some(Decimal::from(5));
    prop.max_drawdown_pct = Some(Decimal::from(10));
    prop.initial_phase_balance = Some(Decimal::from(100_000));

    vec![live, prop]
}

pub fn trades() -> Vec<Trade> {
    let at = |d: NaiveDate, h: u32, m: u32| d.and_hms_opt(h, m, 0).unwrap_or_default();
    vec![
        Trade {
            id: "tr1".into(),
            pair: "NAS100".into(),
            r#type: Direction::Long,
            entry: Decimal::new(184505, 1),
            pnl: Decimal::from(450),
            duration: Some("45m".into()),
            time: at(date(2024, 10, 24), 9, 15),
            rr: "1:3".into(),
            status: TradeStatus::Win,
            mood: Some(Mood::Confident),
            session: None,
            notes: None,
            reflection: Some(Reflection {
                wrong: "None".into(),
                right: "Patience at support".into(),
                improve: "Slightly better exit".into(),
                additional: String::new(),
            }),
            chart_link: None,
            image: None,
            strategy_id: Some("s1".into()),
            account_id: Some("acc_1".into()),
        },
        Trade {
            id: "tr2".into(),
            pair: "XAUUSD".into(),
            r#type: Direction::Short,
            entry: Decimal::new(23451, 1),
            pnl: Decimal::from(-120),
            duration: Some("15m".into()),
            time: at(date(2024, 10, 24), 14, 30),
            rr: "1:1.5".into(),
            status: TradeStatus::Loss,
            mood: Some(Mood::Disciplined),
            session: None,
            notes: None,
            reflection: Some(Reflection {
                wrong: "Early entry".into(),
                right: "Stopped out as planned".into(),
                improve: "Wait for confirmation".into(),
                additional: String::new(),
            }),
            chart_link: None,
            image: None,
            strategy_id: Some("s1".into()),
            account_id: Some("acc_1".into()),
        },
    ]
}

pub fn strategies() -> Vec<Strategy> {
    vec![Strategy {
        id: "s1".into(),
        title: "Silver Bullet v2".into(),
        description: "ICT Silver Bullet logic modified for indices.".into(),
        tag: "Scalp".into(),
        image: String::new(),
        model_image: None,
        notes: Some("Look for FVG in the 10am-11am window.".into()),
        market_condition: None,
        timeframe: None,
        entry_criteria: None,
        risk_model: None,
    }]
}

pub fn envelopes() -> Vec<Envelope> {
    (1..=ENVELOPE_COUNT)
        .map(|i| Envelope {
            id: i,
            value: Decimal::from(i * 10),
            completed: false,
        })
        .collect()
}

pub fn letters() -> Vec<FutureLetter> {
    vec![
        FutureLetter {
            id: "1".into(),
            title: "To my version in 6 months".into(),
            content: "You have mastered the edge. Remember why you started: to build a life of total freedom. The NAS100 discipline was the key. Keep scaling.".into(),
            created_at: date(2024, 8, 1),
            unlock_date: date(2025, 2, 1),
            is_locked: false,
        },
        FutureLetter {
            id: "2".into(),
            title: "End of Year Reflection".into(),
            content: "The discipline paid off. You managed to complete the 100 envelope challenge and your trading psychology is rock solid.".into(),
            created_at: date(2025, 1, 15),
            unlock_date: date(2025, 12, 31),
            is_locked: true,
        },
    ]
}

pub fn skills() -> Vec<Skill> {
    let entry = |id: &str, d: NaiveDate, notes: &str, mins: u32, ach: &str| PracticeEntry {
        id: id.into(),
        date: d,
        notes: notes.into(),
        time_spent: mins,
        achievements: ach.into(),
    };
    vec![
        Skill {
            id: "sk1".into(),
            skill_name: "Technical Analysis".into(),
            target_time: 1200,
            start_date: date(2023, 1, 1),
            goal: Some("Institutional Level Flow".into()),
            streak: 15,
            practice_log: vec![
                entry("pl1", date(2024, 7, 20), "Reviewed support and resistance.", 45, "Identified key levels"),
                entry("pl2", date(2024, 7, 21), "Backtested Silver Bullet strategy.", 60, "Found 3 high-probability setups"),
            ],
            icon: "monitoring".into(),
            color: "primary".into(),
        },
        Skill {
            id: "sk2".into(),
            skill_name: "React Engineering".into(),
            target_time: 600,
            start_date: date(2022, 6, 1),
            goal: Some("Senior Mastery".into()),
            streak: 42,
            practice_log: vec![entry(
                "pl3",
                date(2024, 7, 22),
                "Refactored state management.",
                90,
                "Reduced component complexity",
            )],
            icon: "terminal".into(),
            color: "emerald".into(),
        },
    ]
}

pub fn projects() -> Vec<PipelineProject> {
    vec![PipelineProject {
        id: "p1".into(),
        title: "JournalX v2".into(),
        description: "Real-time trading analytics engine.".into(),
        status: ProjectStatus::Active,
        category: "Dev".into(),
        progress: 65,
    }]
}
