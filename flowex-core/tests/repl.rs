//! End-to-end scenario: a tiny REPL-style command loop, demonstrating
//! that a [`Driver`] can be built once and run repeatedly against a
//! sequence of independent inputs — the same tree, fresh context each
//! time, the way a line-oriented REPL would reuse its parser.

mod support;

use std::cell::RefCell;
use std::rc::Rc;

use flowex_core::{Builder, Driver, ValueSlot};
use support::Scanner;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Quit,
    Echo(String),
}

fn build_driver(log: Rc<RefCell<Vec<Command>>>) -> Driver<Scanner> {
    let mut builder: Builder<Scanner> = Builder::new();
    builder.one_of(|alts| {
        let log_quit = Rc::clone(&log);
        alts.alt(move |b| {
            let log_quit = Rc::clone(&log_quit);
            b.op(|ctx: &mut Scanner, _slot: &mut ValueSlot| {
                "quit".chars().all(|c| ctx.match_char(c))
            })
            .act(move |_ctx: &mut Scanner| log_quit.borrow_mut().push(Command::Quit));
        });

        let log_echo = Rc::clone(&log);
        alts.alt(move |b| {
            let word = Rc::new(RefCell::new(String::new()));
            let log_echo = Rc::clone(&log_echo);

            b.op(|ctx: &mut Scanner, _slot: &mut ValueSlot| {
                "echo ".chars().all(|c| ctx.match_char(c))
            });

            let word_inner = Rc::clone(&word);
            b.repeat(1, move |b| {
                let word_inner = Rc::clone(&word_inner);
                b.op(|ctx: &mut Scanner, slot: &mut ValueSlot| match ctx.match_alpha() {
                    Some(c) => slot.set(true, c),
                    None => false,
                })
                .act_value(move |_ctx: &mut Scanner, c: char| word_inner.borrow_mut().push(c));
            });

            b.act(move |_ctx: &mut Scanner| {
                log_echo.borrow_mut().push(Command::Echo(word.take()));
            });
        });
    });
    Driver::new(builder.build())
}

#[test]
fn runs_the_same_tree_against_a_stream_of_lines() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let driver = build_driver(Rc::clone(&log));

    for line in ["quit", "echo hello", "nonsense"] {
        let mut scanner = Scanner::new(line);
        driver.run(&mut scanner);
    }

    assert_eq!(
        *log.borrow(),
        vec![Command::Quit, Command::Echo("hello".to_string())]
    );
}

#[test]
fn rejects_unrecognised_commands_without_panicking() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let driver = build_driver(log);

    let mut scanner = Scanner::new("unknown");
    assert!(!driver.run(&mut scanner));
}
