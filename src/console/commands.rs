//! Command registry and the built-in terminal commands.
//!
//! Each entry pairs a matcher with a plain `fn` handler. Exact names win over
//! prefix families; among prefixes the longest match wins, so `cat <file>` and a
//! bare `cat` can live side by side.

use rand::Rng;

use super::{Console, Effect};
use crate::modes::Mode;
use crate::prefs::{KEY_COMMAND_COUNT, KEY_USER_NAME};

/// What a handler gets to see of the submitted line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Invocation<'a> {
    /// Canonical (trimmed, lower-cased) command line.
    pub command: &'a str,
    /// Text after a prefix match; empty for exact matches.
    pub args: &'a str,
}

pub type Handler = fn(&mut Console, Invocation<'_>);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Matcher {
    Exact(&'static str),
    /// Matches `name` followed by a space; the remainder becomes `args`.
    Prefix(&'static str),
}

#[derive(Clone, Copy)]
pub struct Command {
    pub matcher: Matcher,
    pub handler: Handler,
    /// Shown by `help`.
    pub listed: bool,
}

impl Command {
    pub const fn exact(name: &'static str, handler: Handler) -> Self {
        Self { matcher: Matcher::Exact(name), handler, listed: true }
    }

    pub const fn prefix(name: &'static str, handler: Handler) -> Self {
        Self { matcher: Matcher::Prefix(name), handler, listed: true }
    }

    pub const fn hidden(mut self) -> Self {
        self.listed = false;
        self
    }
}

/// Words that sound dangerous. They always get a polite refusal.
pub const DENIED: &[&str] = &["rm", "sudo", "shutdown", "reboot", "format", "kill", "exit"];

pub const FILES: &[(&str, &str)] = &[
    ("index.html", "HTML document"),
    ("script.js", "JavaScript code"),
    ("style.css", "CSS styles"),
];

pub struct Registry {
    commands: Vec<Command>,
}

impl Registry {
    pub fn empty() -> Self {
        Self { commands: Vec::new() }
    }

    pub fn builtin() -> Self {
        let mut r = Self::empty();
        r.register(Command::exact("help", help));
        r.register(Command::exact("status", status));
        r.register(Command::exact("time", time));
        r.register(Command::exact("clear", clear));
        r.register(Command::exact("matrix", matrix));
        r.register(Command::exact("particles", particles));
        r.register(Command::exact("hud", hud));
        r.register(Command::exact("admin", admin));
        r.register(Command::exact("ping", ping));
        r.register(Command::exact("whoami", whoami));
        r.register(Command::exact("ls", ls));
        r.register(Command::exact("cat", cat_usage));
        r.register(Command::prefix("cat", cat));
        r.register(Command::prefix("echo", echo));
        r.register(Command::exact("history", history));
        r.register(Command::exact("scan", scan));
        r.register(Command::exact("trace", trace_usage));
        r.register(Command::prefix("trace", trace));
        r.register(Command::exact("calc", calc_usage));
        r.register(Command::prefix("calc", calc));
        r.register(Command::exact("name", name_usage));
        r.register(Command::prefix("name", name));
        for &word in DENIED {
            r.register(Command::exact(word, deny).hidden());
            r.register(Command::prefix(word, deny).hidden());
        }
        r
    }

    pub fn register(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Find the handler for a canonical command line.
    pub fn resolve<'a>(&self, line: &'a str) -> Option<(Handler, Invocation<'a>)> {
        let exact = self.commands.iter().find(|c| matches!(c.matcher, Matcher::Exact(n) if n == line));
        if let Some(c) = exact {
            return Some((c.handler, Invocation { command: line, args: "" }));
        }
        self.commands
            .iter()
            .filter_map(|c| match c.matcher {
                Matcher::Prefix(name) => line
                    .strip_prefix(name)
                    .and_then(|rest| rest.strip_prefix(' '))
                    .map(|args| (name.len(), c.handler, args)),
                Matcher::Exact(_) => None,
            })
            .max_by_key(|(len, _, _)| *len)
            .map(|(_, handler, args)| (handler, Invocation { command: line, args }))
    }

    /// Listed command names in registration order, without duplicates.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Vec::new();
        for c in self.commands.iter().filter(|c| c.listed) {
            let name = match c.matcher {
                Matcher::Exact(n) | Matcher::Prefix(n) => n,
            };
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

fn help(con: &mut Console, _: Invocation<'_>) {
    let names = con.registry.names().join(", ");
    con.log(format!("available commands: {names}"));
}

fn status(con: &mut Console, _: Invocation<'_>) {
    let state = con.status.strip_prefix("status: ").unwrap_or(&con.status).to_string();
    con.log(format!("current status: {state}"));
}

fn time(con: &mut Console, _: Invocation<'_>) {
    let clock = con.clock.clone();
    con.log(clock);
}

fn clear(con: &mut Console, _: Invocation<'_>) {
    con.reset_scrollback();
}

fn matrix(con: &mut Console, _: Invocation<'_>) {
    con.toggle_mode(Mode::Matrix);
}

fn particles(con: &mut Console, _: Invocation<'_>) {
    con.toggle_mode(Mode::Particles);
}

fn hud(con: &mut Console, _: Invocation<'_>) {
    con.effects.push(Effect::ToggleHud);
    con.log("HUD toggled");
}

fn admin(con: &mut Console, _: Invocation<'_>) {
    if !con.enable_admin_mode() {
        con.log("admin mode already active");
    }
}

fn ping(con: &mut Console, _: Invocation<'_>) {
    con.log("pong");
}

fn whoami(con: &mut Console, _: Invocation<'_>) {
    let user = con.store.get(KEY_USER_NAME).unwrap_or_else(|| "anonymous".to_string());
    let level = if con.admin { "admin" } else { "observer" };
    let count = con.store.get_count(KEY_COMMAND_COUNT);
    con.log(format!("user: {user}"));
    con.log(format!("level: {level}"));
    con.log(format!("commands run: {count}"));
}

fn ls(con: &mut Console, _: Invocation<'_>) {
    let files: Vec<&str> = FILES.iter().map(|(f, _)| *f).collect();
    con.log(format!("files: {}", files.join(", ")));
    con.log("directories: none");
}

fn cat_usage(con: &mut Console, _: Invocation<'_>) {
    con.log("usage: cat <filename>");
}

fn cat(con: &mut Console, inv: Invocation<'_>) {
    let file = inv.args.trim();
    match FILES.iter().find(|(f, _)| *f == file) {
        Some((_, desc)) => con.log(format!("file contents: {desc}")),
        None => con.log(format!("file not found: {file}")),
    }
}

fn echo(con: &mut Console, inv: Invocation<'_>) {
    con.log(inv.args);
}

fn history(con: &mut Console, _: Invocation<'_>) {
    let lines: Vec<String> = con
        .history
        .iter()
        .enumerate()
        .map(|(i, cmd)| format!("{:>3}  {cmd}", i + 1))
        .collect();
    for line in lines {
        con.log(line);
    }
}

fn scan(con: &mut Console, _: Invocation<'_>) {
    con.log("scanning network...");
    con.log_after(2_000.0, "scan complete - no threats detected");
}

fn trace_usage(con: &mut Console, _: Invocation<'_>) {
    con.log("usage: trace <host>");
}

/// Fake traceroute: one hop every 400ms, then a summary.
fn trace(con: &mut Console, inv: Invocation<'_>) {
    let host = inv.args.trim().to_string();
    con.log(format!("tracing route to {host}..."));
    let hops = con.rng.gen_range(3..=6);
    let mut total = 0;
    for hop in 1..=hops {
        let latency: u32 = con.rng.gen_range(2..40) * hop;
        total = latency;
        let addr = if hop == hops {
            host.clone()
        } else {
            format!("10.{}.{}.1", con.rng.gen_range(0..=255), hop)
        };
        con.log_after(400.0 * hop as f64, format!("{hop:>2}  {addr}  {latency}ms"));
    }
    con.log_after(400.0 * (hops + 1) as f64, format!("trace complete: {hops} hops, {total}ms"));
}

fn calc_usage(con: &mut Console, _: Invocation<'_>) {
    con.log("usage: calc <expression>");
}

fn calc(con: &mut Console, inv: Invocation<'_>) {
    match super::calc::evaluate(inv.args) {
        Ok(v) => con.log(format!("{} = {}", inv.args.trim(), super::calc::format_result(v))),
        Err(e) => con.log(format!("calc: {e}")),
    }
}

fn name_usage(con: &mut Console, _: Invocation<'_>) {
    con.log("usage: name <display name>");
}

fn name(con: &mut Console, inv: Invocation<'_>) {
    let name = inv.args.trim();
    if name.is_empty() {
        return name_usage(con, inv);
    }
    match con.store.set(KEY_USER_NAME, name) {
        Ok(()) => con.log(format!("display name set: {name}")),
        Err(e) => {
            log::warn!("name not saved: {e}");
            con.log("display name could not be saved");
        }
    }
}

fn deny(con: &mut Console, inv: Invocation<'_>) {
    con.log(format!("permission denied: {}", inv.command));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut Console, _: Invocation<'_>) {}

    #[test]
    fn exact_beats_prefix() {
        let r = Registry::builtin();
        let (h, inv) = r.resolve("cat").unwrap();
        assert_eq!(h as usize, cat_usage as Handler as usize);
        assert_eq!(inv.args, "");
        let (h, inv) = r.resolve("cat style.css").unwrap();
        assert_eq!(h as usize, cat as Handler as usize);
        assert_eq!(inv.args, "style.css");
    }

    #[test]
    fn prefix_needs_a_space() {
        let r = Registry::builtin();
        assert!(r.resolve("echoes").is_none());
        assert_eq!(r.resolve("echo  two spaces").unwrap().1.args, " two spaces");
        assert!(r.resolve("zzqq").is_none());
    }

    #[test]
    fn longest_prefix_wins() {
        let mut r = Registry::empty();
        r.register(Command::prefix("net", noop));
        r.register(Command::prefix("net scan", deny));
        let (h, inv) = r.resolve("net scan 10.0.0.1").unwrap();
        assert_eq!(h as usize, deny as Handler as usize);
        assert_eq!(inv.args, "10.0.0.1");
    }

    #[test]
    fn help_lists_each_visible_name_once() {
        let names = Registry::builtin().names();
        assert_eq!(names.iter().filter(|n| **n == "cat").count(), 1);
        assert!(names.contains(&"help") && names.contains(&"echo"));
        assert!(!names.contains(&"rm"));
    }

    #[test]
    fn destructive_words_resolve_to_deny() {
        let r = Registry::builtin();
        for line in ["rm", "rm -rf /", "sudo make me a sandwich", "shutdown now"] {
            let (h, _) = r.resolve(line).unwrap();
            assert_eq!(h as usize, deny as Handler as usize, "{line}");
        }
    }
}
