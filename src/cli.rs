// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version};

fn flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).action(ArgAction::SetTrue).help(help)
}

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn req(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).required(true).help(help)
}

fn id_arg() -> Arg {
    req("id", "Record id")
}

fn listing(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(flag("json", "Output as pretty JSON"))
        .arg(flag("jsonl", "Output one JSON object per line"))
}

fn habit_cmd() -> Command {
    Command::new("habit")
        .about("Daily wins and their streaks")
        .subcommand(listing("list", "List daily wins"))
        .subcommand(
            Command::new("add")
                .about("Add a daily win")
                .arg(req("label", "What counts as the win"))
                .arg(opt("icon", "Icon name").default_value("check_circle"))
                .arg(opt("color", "Accent color").default_value("blue")),
        )
        .subcommand(
            Command::new("toggle")
                .about("Mark or unmark a win for a day")
                .arg(id_arg())
                .arg(opt("date", "Day to toggle, YYYY-MM-DD (default today)"))
                .arg(flag("coach", "Ask the coach for a check-in afterwards")),
        )
        .subcommand(
            Command::new("update")
                .about("Edit a daily win")
                .arg(id_arg())
                .arg(opt("label", "New label"))
                .arg(opt("icon", "New icon"))
                .arg(opt("color", "New color"))
                .arg(opt("custom-icon", "Custom icon image")),
        )
        .subcommand(Command::new("delete").about("Remove a daily win").arg(id_arg()))
        .subcommand(listing("week", "Completion for the current week"))
}

fn mastery_cmd() -> Command {
    Command::new("mastery")
        .about("Counted mastery habits")
        .subcommand(listing("list", "List mastery habits"))
        .subcommand(
            Command::new("add")
                .about("Add a mastery habit")
                .arg(req("label", "Habit label"))
                .arg(req("total", "Repetitions per cycle").value_parser(clap::value_parser!(u32)))
                .arg(opt("icon", "Icon name").default_value("bolt"))
                .arg(opt("color", "Accent color").default_value("indigo"))
                .arg(opt("subject", "Subject studied"))
                .arg(opt("duration", "Minutes per session").value_parser(clap::value_parser!(u32)))
                .arg(opt("tags", "Comma separated tags")),
        )
        .subcommand(Command::new("inc").about("Count one repetition").arg(id_arg()))
        .subcommand(
            Command::new("update")
                .about("Edit a mastery habit")
                .arg(id_arg())
                .arg(opt("label", "New label"))
                .arg(opt("subject", "New subject"))
                .arg(opt("duration", "Minutes per session").value_parser(clap::value_parser!(u32)))
                .arg(opt("total", "Repetitions per cycle").value_parser(clap::value_parser!(u32))),
        )
        .subcommand(Command::new("delete").about("Remove a mastery habit").arg(id_arg()))
}

fn trade_cmd() -> Command {
    Command::new("trade")
        .about("Trading journal")
        .subcommand(
            listing("list", "List trades, newest first")
                .arg(opt("account", "Only trades of this account"))
                .arg(opt("limit", "Show at most N trades").value_parser(clap::value_parser!(usize))),
        )
        .subcommand(
            Command::new("add")
                .about("Journal a trade")
                .arg(req("pair", "Instrument, e.g. NAS100"))
                .arg(req("type", "LONG or SHORT"))
                .arg(req("pnl", "Profit or loss").allow_negative_numbers(true))
                .arg(req("rr", "Risk/reward, e.g. 1:3"))
                .arg(opt("entry", "Entry price"))
                .arg(opt("time", "When, YYYY-MM-DD HH:MM (default now)"))
                .arg(opt("account", "Account id (default primary)"))
                .arg(opt("strategy", "Strategy id"))
                .arg(opt("mood", "Confident, Hesitant, Overconfident, Disciplined, Emotional"))
                .arg(opt("session", "London, New York, Asia, Sydney"))
                .arg(opt("duration", "How long the trade ran"))
                .arg(opt("notes", "Free notes"))
                .arg(opt("chart", "Chart link")),
        )
        .subcommand(Command::new("delete").about("Remove a trade").arg(id_arg()))
        .subcommand(
            Command::new("reflect")
                .about("Attach a reflection to a trade")
                .arg(id_arg())
                .arg(req("wrong", "What went wrong"))
                .arg(req("right", "What went right"))
                .arg(req("improve", "What to improve"))
                .arg(opt("additional", "Anything else")),
        )
        .subcommand(
            listing("stats", "Monthly performance")
                .arg(opt("month", "YYYY-MM (default current month)"))
                .arg(opt("account", "Account id (default primary)")),
        )
        .subcommand(
            listing("accounts", "Win rate and progress per account"),
        )
        .subcommand(
            listing("project", "Compounding projection against actual P&L")
                .arg(opt("account", "Account id (default primary)"))
                .arg(opt("capital", "Starting capital"))
                .arg(opt("rate", "Daily compounding rate in percent").default_value("1"))
                .arg(
                    opt("view", "daily or monthly")
                        .default_value("daily")
                        .value_parser(["daily", "monthly"]),
                ),
        )
}

fn account_cmd() -> Command {
    let pct_args = |c: Command| {
        c.arg(opt("phase", "Phase 1, Phase 2 or Funded"))
            .arg(opt("target", "Profit target percent"))
            .arg(opt("daily-dd", "Daily drawdown percent"))
            .arg(opt("max-dd", "Max drawdown percent"))
            .arg(opt("initial", "Initial phase balance"))
            .arg(opt("equity", "Current equity"))
            .arg(opt("start-of-day", "Balance at the start of the day"))
            .arg(opt("peak", "Highest equity reached"))
    };
    Command::new("account")
        .about("Trading accounts")
        .subcommand(listing("list", "List trading accounts"))
        .subcommand(pct_args(
            Command::new("add")
                .about("Add a trading account")
                .arg(req("name", "Account name"))
                .arg(req("type", "live, prop or demo"))
                .arg(req("balance", "Current balance"))
                .arg(opt("currency", "Currency symbol").default_value("$"))
                .arg(flag("primary", "Make this the primary account")),
        ))
        .subcommand(pct_args(
            Command::new("update")
                .about("Edit a trading account")
                .arg(id_arg())
                .arg(opt("name", "New name"))
                .arg(opt("balance", "New balance"))
                .arg(opt("currency", "Currency symbol")),
        ))
        .subcommand(Command::new("select").about("Set the primary account").arg(id_arg()))
        .subcommand(
            Command::new("delete")
                .about("Remove an account and its trades")
                .arg(id_arg()),
        )
}

fn strategy_cmd() -> Command {
    let detail = |c: Command| {
        c.arg(opt("notes", "Notes"))
            .arg(opt("market", "Market condition"))
            .arg(opt("timeframe", "Timeframe"))
            .arg(opt("entry", "Entry criteria"))
            .arg(opt("risk-model", "Risk model"))
    };
    Command::new("strategy")
        .about("Strategy playbook")
        .subcommand(listing("list", "List strategies"))
        .subcommand(detail(
            Command::new("add")
                .about("Add a strategy")
                .arg(req("title", "Strategy title"))
                .arg(opt("description", "What it does"))
                .arg(opt("tag", "Short tag").default_value("Setup")),
        ))
        .subcommand(detail(
            Command::new("update")
                .about("Edit a strategy")
                .arg(id_arg())
                .arg(opt("title", "New title"))
                .arg(opt("description", "New description"))
                .arg(opt("tag", "New tag")),
        ))
        .subcommand(Command::new("delete").about("Remove a strategy").arg(id_arg()))
        .subcommand(listing("evaluate", "Performance per strategy"))
}

fn risk_cmd() -> Command {
    Command::new("risk")
        .about("Drawdown limits and position sizing")
        .subcommand(
            listing("status", "Drawdown usage and prop-firm progress")
                .arg(opt("account", "Account id (default primary)"))
                .arg(opt("rate", "Daily target rate in percent for the estimate").default_value("1")),
        )
        .subcommand(
            listing("lot", "Position size for a stop loss")
                .arg(req("symbol", "Instrument, e.g. XAUUSD"))
                .arg(opt("risk", "Risk percent of capital"))
                .arg(opt("sl", "Stop loss in points"))
                .arg(opt("account", "Account id (default primary)"))
                .arg(flag("equity", "Size from equity instead of balance")),
        )
}

fn envelope_cmd() -> Command {
    Command::new("envelope")
        .about("100-envelope savings challenge")
        .subcommand(listing("list", "Show envelopes"))
        .subcommand(
            Command::new("toggle")
                .about("Fill or empty an envelope")
                .arg(req("id", "Envelope number 1..=100").value_parser(clap::value_parser!(u32))),
        )
        .subcommand(Command::new("reset").about("Empty every envelope"))
        .subcommand(listing("garden", "Savings garden progress"))
}

fn budget_cmd() -> Command {
    let bucket_fields = |c: Command| {
        c.arg(opt("icon", "Icon name"))
            .arg(opt("color", "Accent color"))
            .arg(opt("priority", "urgent, high, medium or low"))
            .arg(opt("type", "need or want"))
            .arg(opt("category", "wealth, stability, lifestyle or learning"))
    };
    Command::new("budget")
        .about("Budget buckets, spending and income")
        .subcommand(listing("buckets", "List buckets"))
        .subcommand(bucket_fields(
            Command::new("add-bucket")
                .about("Add a bucket")
                .arg(req("label", "Bucket label"))
                .arg(req("total", "Monthly amount")),
        ))
        .subcommand(bucket_fields(
            Command::new("update-bucket")
                .about("Edit a bucket")
                .arg(id_arg())
                .arg(opt("label", "New label"))
                .arg(opt("total", "New total"))
                .arg(opt("remaining", "New remaining amount")),
        ))
        .subcommand(Command::new("delete-bucket").about("Remove a bucket").arg(id_arg()))
        .subcommand(
            Command::new("allocate")
                .about("Earmark part of a bucket")
                .arg(req("bucket", "Bucket id"))
                .arg(req("name", "Allocation name"))
                .arg(req("amount", "Amount")),
        )
        .subcommand(
            Command::new("unallocate")
                .about("Remove an earmark")
                .arg(req("bucket", "Bucket id"))
                .arg(id_arg()),
        )
        .subcommand(
            Command::new("spend")
                .about("Record an expense against a bucket")
                .arg(req("bucket", "Bucket id"))
                .arg(req("amount", "Amount spent"))
                .arg(opt("description", "What for"))
                .arg(opt("date", "YYYY-MM-DD (default today)"))
                .arg(opt("payment", "Payment type").default_value("Card"))
                .arg(flag("planned", "The expense was planned")),
        )
        .subcommand(listing("expenses", "List expenses"))
        .subcommand(Command::new("delete-expense").about("Remove an expense").arg(id_arg()))
        .subcommand(
            Command::new("income")
                .about("Record income")
                .arg(req("amount", "Amount received"))
                .arg(opt("note", "Source"))
                .arg(opt("date", "YYYY-MM-DD (default today)"))
                .arg(flag("advise", "Ask the coach where to put it")),
        )
        .subcommand(listing("incomes", "List income records"))
        .subcommand(Command::new("delete-income").about("Remove an income record").arg(id_arg()))
        .subcommand(
            Command::new("currency")
                .about("Set the display currency")
                .arg(req("symbol", "Symbol or code, e.g. € or EUR")),
        )
        .subcommand(Command::new("mantra").about("Set the budget mantra").arg(req("text", "Mantra")))
        .subcommand(listing("report", "Allocation and spending summary"))
        .subcommand(Command::new("insights").about("Coach insights on the budget"))
}

fn task_cmd() -> Command {
    Command::new("task")
        .about("Schedule")
        .subcommand(listing("list", "Tasks of a day").arg(opt("date", "YYYY-MM-DD (default today)")))
        .subcommand(
            Command::new("add")
                .about("Schedule a task")
                .arg(req("title", "Task title"))
                .arg(req("start", "Start time HH:MM"))
                .arg(opt("end", "End time HH:MM"))
                .arg(opt("priority", "urgent, high, medium or low").default_value("medium"))
                .arg(opt("category", "Category").default_value("General"))
                .arg(opt("date", "YYYY-MM-DD (default: every view of today)")),
        )
        .subcommand(Command::new("toggle").about("Complete or reopen a task").arg(id_arg()))
        .subcommand(Command::new("delete").about("Remove a task").arg(id_arg()))
        .subcommand(listing("agenda", "Active and next task"))
        .subcommand(listing("strip", "Task counts for the fourteen-day strip"))
}

fn letter_cmd() -> Command {
    Command::new("letter")
        .about("Letters to your future self")
        .subcommand(listing("list", "List letters"))
        .subcommand(
            Command::new("add")
                .about("Write a letter")
                .arg(req("title", "Title"))
                .arg(req("content", "Letter body"))
                .arg(req("unlock", "Unlock date YYYY-MM-DD")),
        )
        .subcommand(Command::new("read").about("Open an unlocked letter").arg(id_arg()))
        .subcommand(Command::new("delete").about("Remove a letter").arg(id_arg()))
}

fn skill_cmd() -> Command {
    Command::new("skill")
        .about("Deliberate practice log")
        .subcommand(listing("list", "Skills and progress"))
        .subcommand(
            Command::new("add")
                .about("Track a skill")
                .arg(req("name", "Skill name"))
                .arg(req("target", "Target minutes").value_parser(clap::value_parser!(u32)))
                .arg(opt("goal", "Goal"))
                .arg(opt("start", "Start date YYYY-MM-DD (default today)"))
                .arg(opt("icon", "Icon name").default_value("school"))
                .arg(opt("color", "Accent color").default_value("emerald")),
        )
        .subcommand(
            Command::new("log")
                .about("Log a practice session")
                .arg(id_arg())
                .arg(req("minutes", "Minutes practiced").value_parser(clap::value_parser!(u32)))
                .arg(opt("notes", "Session notes"))
                .arg(opt("achievements", "Breakthroughs"))
                .arg(opt("date", "YYYY-MM-DD (default today)")),
        )
        .subcommand(
            Command::new("goal")
                .about("Set or clear the goal")
                .arg(id_arg())
                .arg(opt("text", "Goal text; omit to clear")),
        )
        .subcommand(listing("show", "Practice log of one skill").arg(id_arg()))
        .subcommand(Command::new("delete").about("Remove a skill").arg(id_arg()))
}

fn project_cmd() -> Command {
    Command::new("project")
        .about("Project pipeline")
        .subcommand(listing("list", "List projects"))
        .subcommand(
            Command::new("add")
                .about("Add a project")
                .arg(req("title", "Title"))
                .arg(opt("description", "Description"))
                .arg(opt("category", "Category").default_value("General"))
                .arg(opt("status", "idea, active or done").default_value("idea"))
                .arg(opt("progress", "Percent complete").value_parser(clap::value_parser!(u32))),
        )
        .subcommand(
            Command::new("update")
                .about("Move or progress a project")
                .arg(id_arg())
                .arg(opt("status", "idea, active or done"))
                .arg(opt("progress", "Percent complete").value_parser(clap::value_parser!(u32))),
        )
        .subcommand(Command::new("delete").about("Remove a project").arg(id_arg()))
}

fn scripture_cmd() -> Command {
    Command::new("scripture")
        .about("Daily devotion and bookmarks")
        .subcommand(listing("today", "Today's devotion"))
        .subcommand(listing("list", "All devotions"))
        .subcommand(
            Command::new("heart")
                .about("Bookmark or unbookmark a verse")
                .arg(req("ref", "Reference, e.g. \"Joshua 1:9\"")),
        )
        .subcommand(listing("hearted", "Bookmarked verses"))
}

pub fn build_cli() -> Command {
    Command::new("masteryhub")
        .about("MasteryHub: habits, trading journal, savings and coaching from the terminal")
        .version(crate_version!())
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log progress to stderr"),
        )
        .subcommand(
            Command::new("init")
                .about("Create the data store with seed data")
                .arg(flag("force", "Overwrite existing state"))
                .arg(flag("empty", "Start from an empty state instead of the seed")),
        )
        .subcommand(
            Command::new("profile")
                .about("Display name and output preferences")
                .subcommand(Command::new("show").about("Show the profile"))
                .subcommand(Command::new("set-name").about("Set display name").arg(req("name", "Display name")))
                .subcommand(Command::new("clear-name").about("Forget the display name"))
                .subcommand(
                    Command::new("compact")
                        .about("Borderless tables")
                        .arg(
                            Arg::new("mode")
                                .required(true)
                                .value_parser(["on", "off"])
                                .help("on or off"),
                        ),
                ),
        )
        .subcommand(habit_cmd())
        .subcommand(mastery_cmd())
        .subcommand(trade_cmd())
        .subcommand(account_cmd())
        .subcommand(strategy_cmd())
        .subcommand(risk_cmd())
        .subcommand(envelope_cmd())
        .subcommand(budget_cmd())
        .subcommand(task_cmd())
        .subcommand(letter_cmd())
        .subcommand(skill_cmd())
        .subcommand(project_cmd())
        .subcommand(scripture_cmd())
        .subcommand(
            Command::new("stats")
                .about("Dashboard numbers")
                .subcommand(listing("dashboard", "Level, XP, habits and the day clock"))
                .subcommand(
                    listing("calendar", "Month grid with trade P&L")
                        .arg(opt("month", "YYYY-MM (default current month)")),
                ),
        )
        .subcommand(
            Command::new("coach")
                .about("AI coach")
                .subcommand(Command::new("checkin").about("Check-in on today's wins"))
                .subcommand(
                    listing("memory", "Conversation memory")
                        .arg(flag("clear", "Forget every remembered turn")),
                )
                .subcommand(Command::new("context").about("Instruction the live coach starts with"))
                .subcommand(
                    Command::new("speak")
                        .about("Read a line aloud into a WAV file (defaults to today's check-in)")
                        .arg(opt("text", "What to say"))
                        .arg(opt("out", "Output WAV path").default_value("coach.wav")),
                ),
        )
        .subcommand(
            Command::new("sync")
                .about("Backup to a private GitHub gist")
                .subcommand(Command::new("link").about("Store a token with gist scope").arg(req("token", "GitHub token")))
                .subcommand(Command::new("unlink").about("Forget the token"))
                .subcommand(Command::new("status").about("Link status and last sync"))
                .subcommand(Command::new("push").about("Upload the current state"))
                .subcommand(Command::new("restore").about("Replace local state with the backup")),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(
                    Command::new("trades")
                        .about("Export the trading journal")
                        .arg(
                            opt("format", "csv or json")
                                .default_value("csv")
                                .value_parser(["csv", "json"]),
                        )
                        .arg(req("path", "Output file")),
                )
                .subcommand(
                    Command::new("state")
                        .about("Export the full state blob")
                        .arg(req("path", "Output file")),
                ),
        )
        .subcommand(Command::new("doctor").about("Check stored data for dangling references"))
}
