//! Wiring demo: a score, a rendered label, an activity log, and two guarded
//! commands coordinated through one context.
//!
//! Run with `cargo run --example scoreboard`.

use axon::{
    Action, Command, Guard, Members, Property, ReactiveContext, ReactiveHost, ReadHook, WriteHook,
    action, guard, read_hook, write_hook,
};

struct Scoreboard {
    score: Property<i32>,
    label: Property<String>,
    log: Property<String>,
    add_point: Command,
    clear_log: Command,
    // Strong callback handles; the members above hold them weakly.
    _hooks: (ReadHook<String>, WriteHook<i32>),
    _actions: (Action, Action),
    _guards: (Guard,),
}

impl Scoreboard {
    fn new() -> Self {
        let log = Property::new(String::new());

        let record = {
            let log = log.clone();
            write_hook(move |v: &i32| {
                let v = *v;
                log.set_with(move |entries| format!("{entries}score set to {v}\n"));
            })
        };
        let score = Property::builder(0i32)
            .group("score")
            .set_hook(&record)
            .build();

        let render = {
            let score = score.clone();
            read_hook(move |_: &String| format!("Score: {}", score.get()))
        };
        let label = Property::builder(String::new())
            .group("score")
            .read_hook(&render)
            .build();

        let add = {
            let score = score.clone();
            action(move || score.set_with(|s| s + 1))
        };
        let add_point = Command::builder(&add).group("score").build();

        let clear = {
            let log = log.clone();
            action(move || log.set(String::new()))
        };
        let can_clear = {
            let log = log.clone();
            guard(move || !log.get().is_empty())
        };
        let clear_log = Command::builder(&clear).guard(&can_clear).build();

        Self {
            score,
            label,
            log,
            add_point,
            clear_log,
            _hooks: (render, record),
            _actions: (add, clear),
            _guards: (can_clear,),
        }
    }
}

impl ReactiveHost for Scoreboard {
    fn reactive_members(&self, members: &mut Members) {
        members
            .value(&self.score)
            .value(&self.label)
            .value(&self.log)
            .command(&self.add_point)
            .command(&self.clear_log);
    }
}

fn main() {
    let context = ReactiveContext::new();
    let board = Scoreboard::new();
    context.attach_all(&board);

    let label = board.label.clone();
    board
        .label
        .subscribe(move || println!("label refreshed -> {}", label.get()))
        .forget();

    println!("initial: {}", board.label.get());

    for _ in 0..3 {
        board.add_point.invoke();
        context.notify_group(&board.score, true);
    }

    println!("log:\n{}", board.log.get());
    println!("clear allowed: {}", board.clear_log.can_invoke());

    board.clear_log.invoke();
    println!("log cleared, clear allowed: {}", board.clear_log.can_invoke());
}
