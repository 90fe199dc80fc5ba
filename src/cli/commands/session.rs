//! session command - Line-oriented shell over one in-memory engine
//!
//! Every other command reseeds the hierarchy per process; a session keeps
//! one store and one request queue alive until `quit` or end of input.
//! Command errors are reported and the shell keeps going.

use std::io::{BufRead, IsTerminal, Write};

use anyhow::{anyhow, bail, Result};

use super::seeded_engine;
use crate::core::request::{RequestId, TransferRequest};
use crate::core::types::NodeId;
use crate::engine::{Context, Engine};
use crate::ui::output::format_request;
use crate::ui::prompts::{PromptError, Prompter};
use crate::ui::tree_view::{describe, render, TreeViewOptions};

const HELP: &str = "\
commands:
  tree [ID] [DEPTH]                        show the hierarchy
  show ID                                  show one location
  submit SOURCE TARGET [--resources] REASON...
  pending                                  list pending requests
  requests                                 list every request
  approve REQ                              approve by id or id prefix
  reject REQ                               reject by id or id prefix
  verify                                   check hierarchy invariants
  help                                     show this text
  quit                                     leave the session";

/// Whether the shell should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Continue,
    Quit,
}

/// A running session.
pub struct Session<'c, R, W> {
    ctx: &'c Context,
    engine: Engine,
    prompter: Prompter<R, W>,
}

impl<'c, R: BufRead, W: Write> Session<'c, R, W> {
    pub fn new(ctx: &'c Context, engine: Engine, prompter: Prompter<R, W>) -> Self {
        Self {
            ctx,
            engine,
            prompter,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Read and execute lines until `quit` or end of input.
    pub fn run(&mut self) -> Result<()> {
        loop {
            let line = match self.prompter.read_line("cad> ") {
                Ok(line) => line,
                Err(PromptError::Cancelled) => return Ok(()),
                Err(err) => return Err(err.into()),
            };
            match self.execute(&line) {
                Ok(SessionOutcome::Quit) => return Ok(()),
                Ok(SessionOutcome::Continue) => {}
                Err(err) => writeln!(self.prompter.output(), "error: {err:#}")?,
            }
        }
    }

    /// Execute one command line.
    pub fn execute(&mut self, line: &str) -> Result<SessionOutcome> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, rest)) = words.split_first() else {
            return Ok(SessionOutcome::Continue);
        };

        match command {
            "quit" | "exit" => return Ok(SessionOutcome::Quit),
            "help" => self.say(HELP)?,
            "tree" => self.tree(rest)?,
            "show" => self.show(rest)?,
            "submit" => self.submit(rest)?,
            "pending" => {
                let requests = self.engine.workflow.list_pending();
                self.list(&requests, "no pending requests")?;
            }
            "requests" => {
                let requests = self.engine.workflow.list_all();
                self.list(&requests, "no requests")?;
            }
            "approve" => {
                let id = self.request_arg(rest)?;
                let request = self.engine.workflow.approve(&id)?;
                self.say(&format_request(&request))?;
            }
            "reject" => {
                let id = self.request_arg(rest)?;
                let request = self.engine.workflow.reject(&id)?;
                self.say(&format_request(&request))?;
            }
            "verify" => {
                let result = self.engine.verify();
                if result.ok {
                    self.say("ok")?;
                } else {
                    for err in &result.errors {
                        self.say(&err.to_string())?;
                    }
                }
            }
            other => bail!("unknown command '{}' (try 'help')", other),
        }
        Ok(SessionOutcome::Continue)
    }

    fn say(&mut self, text: &str) -> Result<()> {
        if !self.ctx.quiet {
            writeln!(self.prompter.output(), "{}", text)?;
        }
        Ok(())
    }

    fn tree(&mut self, args: &[&str]) -> Result<()> {
        let root = args.first().map(|s| s.parse::<NodeId>()).transpose()?;
        let depth = args.get(1).map(|s| s.parse::<usize>()).transpose()?;
        let snapshot = self.engine.store.snapshot();
        if let Some(id) = &root {
            if !snapshot.tree.contains(id) {
                bail!("location '{}' not found", id);
            }
        }
        let lines = render(
            &snapshot.tree,
            &TreeViewOptions {
                root,
                depth,
                codes: false,
            },
        );
        self.say(&lines.join("\n"))
    }

    fn show(&mut self, args: &[&str]) -> Result<()> {
        let id: NodeId = args
            .first()
            .ok_or_else(|| anyhow!("usage: show ID"))?
            .parse()?;
        let snapshot = self.engine.store.snapshot();
        let node = snapshot
            .tree
            .find_node(&id)
            .ok_or_else(|| anyhow!("location '{}' not found", id))?;
        let mut text = describe(&snapshot.tree, node, true);
        if let Some(parent) = snapshot.tree.find_parent(&id) {
            text.push_str(&format!("\n  parent: {} ({})", parent.name, parent.id));
        }
        self.say(&text)
    }

    fn submit(&mut self, args: &[&str]) -> Result<()> {
        let [source, target, rest @ ..] = args else {
            bail!("usage: submit SOURCE TARGET [--resources] REASON...");
        };
        let source: NodeId = source.parse()?;
        let target: NodeId = target.parse()?;

        let mut resources = self.ctx.config.transfer_resources();
        let mut reason_words = Vec::new();
        for word in rest {
            if *word == "--resources" {
                resources = true;
            } else {
                reason_words.push(*word);
            }
        }
        let mut reason = reason_words.join(" ");
        if reason.is_empty() {
            reason = match self.prompter.input("Reason", None) {
                Ok(answer) => answer,
                Err(PromptError::NotInteractive) => String::new(),
                Err(err) => return Err(err.into()),
            };
        }

        let request = self.engine.workflow.submit_request(
            &source,
            &target,
            self.ctx.config.requested_by(),
            &reason,
            resources,
        )?;
        self.say(&format_request(&request))
    }

    fn request_arg(&self, args: &[&str]) -> Result<RequestId> {
        let prefix = args
            .first()
            .ok_or_else(|| anyhow!("a request id is required"))?;
        self.engine
            .workflow
            .find_by_prefix(prefix)
            .map(|r| r.id)
            .ok_or_else(|| anyhow!("no single request matches '{}'", prefix))
    }

    fn list(&mut self, requests: &[TransferRequest], empty: &str) -> Result<()> {
        if requests.is_empty() {
            return self.say(empty);
        }
        for request in requests {
            self.say(&format_request(request))?;
        }
        Ok(())
    }
}

/// Run a session on stdin and stdout.
pub fn session(ctx: &Context) -> Result<()> {
    let stdin = std::io::stdin();
    let interactive = stdin.is_terminal() && !ctx.quiet;
    let prompter = Prompter::new(stdin.lock(), std::io::stdout(), interactive);
    let mut session = Session::new(ctx, seeded_engine(ctx), prompter);
    session.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;

    use crate::core::request::RequestStatus;
    use crate::engine::NullSink;

    fn run_script(script: &str) -> (Engine, String) {
        let ctx = Context::default();
        let engine = Engine::seeded(&ctx.config, Arc::new(NullSink));
        let prompter = Prompter::new(Cursor::new(script.as_bytes().to_vec()), Vec::new(), false);
        let mut session = Session::new(&ctx, engine, prompter);
        session.run().unwrap();
        let Session {
            engine, mut prompter, ..
        } = session;
        let out = String::from_utf8(prompter.output().clone()).unwrap();
        (engine, out)
    }

    #[test]
    fn submit_then_approve_by_prefix() {
        let (engine, _) = run_script("submit s-c1-1 c2 --resources rebalance now\n");
        let request = engine.workflow.list_pending().pop().unwrap();
        assert_eq!(request.reason, "rebalance now");
        assert!(request.transfer_resources);

        let ctx = Context::default();
        let prompter = Prompter::new(
            Cursor::new(format!("approve {}\nquit\n", request.id.short()).into_bytes()),
            Vec::new(),
            false,
        );
        let mut session = Session::new(&ctx, engine, prompter);
        session.run().unwrap();
        let id = NodeId::new("s-c1-1").unwrap();
        assert_eq!(
            session.engine().store.find_parent(&id).unwrap().id.as_str(),
            "c2"
        );
        assert_eq!(
            session.engine().workflow.get(&request.id).unwrap().status,
            RequestStatus::Approved
        );
    }

    #[test]
    fn errors_do_not_end_the_session() {
        let (engine, out) = run_script("bogus\nsubmit s-c1-1 c2\npending\nverify\n");
        assert!(out.contains("unknown command 'bogus'"));
        assert!(out.contains("error: validation failed: a reason is required"));
        assert!(out.contains("no pending requests"));
        assert!(out.contains("ok"));
        assert!(engine.workflow.list_all().is_empty());
    }

    #[test]
    fn quit_stops_reading() {
        let (_, out) = run_script("quit\nhelp\n");
        assert!(out.is_empty());
    }

    #[test]
    fn tree_and_show() {
        let (_, out) = run_script("tree c1 0\nshow s-c1-1\n");
        assert!(out.contains("Country 1 (c1) country, food 1000, 5 states"));
        assert!(out.contains("State 1.1 (s-c1-1) state, food 100, 3 cities #1010000000"));
        assert!(out.contains("parent: Country 1 (c1)"));
    }

    #[test]
    fn reject_leaves_tree_alone() {
        let (engine, _) = run_script("submit s-c1-1 c2 x\n");
        let request = engine.workflow.list_pending().pop().unwrap();
        let before = engine.store.snapshot().fingerprint();

        let ctx = Context::default();
        let prompter = Prompter::new(
            Cursor::new(format!("reject {}\n", request.id).into_bytes()),
            Vec::new(),
            false,
        );
        let mut session = Session::new(&ctx, engine, prompter);
        session.run().unwrap();

        assert_eq!(session.engine().store.snapshot().fingerprint(), before);
        assert_eq!(
            session.engine().workflow.list_by_status(RequestStatus::Rejected).len(),
            1
        );
    }
}
