//! Interactive review loop: ask for a layout, show it, let the user prune it,
//! and hand back the tree to create.

use std::io::{BufRead, Write};

use anyhow::Result;
use owo_colors::OwoColorize;
use thiserror::Error;
use tracing::debug;

use crate::llm::LayoutSource;
use crate::node::{delete_node, Node, NodeId};
use crate::normalize::normalize_or_raw;
use crate::parser::parse;
use crate::render::{render, render_colored};

/// How a session ended.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The user accepted this tree for creation.
    Create(Node),
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Blank input: create if there is something to create.
    Proceed,
    Create,
    Delete(NodeId),
    Reprompt,
    Abort,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("Usage: d <item_id_to_delete>")]
    MissingId,
    #[error("Invalid ID. Please enter a number.")]
    InvalidId,
    #[error("Invalid action.")]
    Unknown,
}

impl Action {
    pub fn parse(input: &str) -> Result<Action, ActionError> {
        let input = input.trim().to_lowercase();
        let mut parts = input.split_whitespace();
        let Some(action) = parts.next() else {
            return Ok(Action::Proceed);
        };
        match action {
            "c" | "create" => Ok(Action::Create),
            "d" | "delete" => {
                let id = parts.next().ok_or(ActionError::MissingId)?;
                id.parse::<NodeId>()
                    .map(Action::Delete)
                    .map_err(|_| ActionError::InvalidId)
            }
            "r" | "re-prompt" => Ok(Action::Reprompt),
            "a" | "abort" => Ok(Action::Abort),
            _ => Err(ActionError::Unknown),
        }
    }
}

enum Review {
    Done(Outcome),
    Reprompt(String),
}

/// Terminal session over any line reader and writer.
pub struct Session<R, W> {
    input: R,
    output: W,
    color: bool,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W, color: bool) -> Self {
        Session {
            input,
            output,
            color,
        }
    }

    /// Drive the whole prompt → parse → review cycle.
    pub fn run(
        &mut self,
        source: &dyn LayoutSource,
        description: Option<&str>,
    ) -> Result<Outcome> {
        let mut description = match description.map(str::trim).filter(|d| !d.is_empty()) {
            Some(d) => d.to_string(),
            None => {
                self.say("No initial prompt provided. Please describe your project.")?;
                match self.ask("Prompt: ")? {
                    Some(d) if !d.is_empty() => d,
                    _ => {
                        self.say("No prompt entered. Exiting.")?;
                        return Ok(Outcome::Aborted);
                    }
                }
            }
        };

        loop {
            let root = match self.propose(source, &description)? {
                Some(root) => root,
                None => match self.retry_description()? {
                    Some(d) => {
                        description = d;
                        continue;
                    }
                    None => return Ok(Outcome::Aborted),
                },
            };

            match self.review(root)? {
                Review::Done(outcome) => return Ok(outcome),
                Review::Reprompt(d) => description = d,
            }
        }
    }

    /// Fetch, normalize and parse one layout. `None` means the user should retry.
    fn propose(
        &mut self,
        source: &dyn LayoutSource,
        description: &str,
    ) -> Result<Option<Node>> {
        let raw = match source.propose_layout(description) {
            Ok(raw) if !raw.trim().is_empty() => raw,
            Ok(_) => {
                self.say("No layout returned from LLM.")?;
                return Ok(None);
            }
            Err(e) => {
                self.error(&format!("No layout returned from LLM: {e}"))?;
                return Ok(None);
            }
        };
        debug!(raw = %raw, "raw layout");

        let layout = normalize_or_raw(&raw);
        match parse(&layout) {
            Ok(root) => Ok(Some(root)),
            Err(e) => {
                self.error(&format!("Error parsing project layout: {e}"))?;
                self.say(&format!(
                    "Problematic layout snippet:\n{}",
                    first_lines(&layout, 5)
                ))?;
                Ok(None)
            }
        }
    }

    fn retry_description(&mut self) -> Result<Option<String>> {
        if !self.ask_yes_no("Would you like to try a different prompt? (y/N): ")? {
            self.error("Aborted by user.")?;
            return Ok(None);
        }
        match self.ask("New prompt: ")? {
            Some(d) if !d.is_empty() => Ok(Some(d)),
            _ => {
                self.error("No prompt entered.")?;
                Ok(None)
            }
        }
    }

    fn review(&mut self, root: Node) -> Result<Review> {
        let mut tree = Some(root);
        loop {
            self.heading("\nCurrent Project Structure:")?;
            let rendered = if self.color {
                render_colored(tree.as_ref())
            } else {
                render(tree.as_ref())
            };
            write!(self.output, "{rendered}")?;

            let prompt = if tree.is_some() {
                "\nActions: [c]reate, [d <id>]elete, [r]e-prompt, [a]bort: "
            } else {
                "\nActions: [r]e-prompt LLM, [a]bort: "
            };
            let Some(input) = self.ask(prompt)? else {
                return Ok(Review::Done(Outcome::Aborted));
            };

            match Action::parse(&input) {
                Ok(Action::Proceed) => {
                    if let Some(root) = tree.take() {
                        return Ok(Review::Done(Outcome::Create(root)));
                    }
                }
                Ok(Action::Create) => match tree.take() {
                    Some(root) => return Ok(Review::Done(Outcome::Create(root))),
                    None => self.error(
                        "Cannot create: project structure is empty. Try re-prompting.",
                    )?,
                },
                Ok(Action::Delete(_)) | Err(ActionError::MissingId | ActionError::InvalidId)
                    if tree.is_none() =>
                {
                    self.error("Structure is already empty.")?;
                }
                Ok(Action::Delete(id)) => {
                    let (next, found) = delete_node(tree.take(), id);
                    tree = next;
                    if found {
                        self.success(&format!("Item ID {id} (and its children) deleted."))?;
                    } else {
                        self.error(&format!("Item ID {id} not found."))?;
                    }
                }
                Ok(Action::Reprompt) => match self.ask("Enter new prompt for LLM: ")? {
                    Some(d) if !d.is_empty() => return Ok(Review::Reprompt(d)),
                    _ => self.say("No prompt entered. Keeping current structure.")?,
                },
                Ok(Action::Abort) => {
                    self.error("Aborted by user.")?;
                    return Ok(Review::Done(Outcome::Aborted));
                }
                Err(e) => self.error(&e.to_string())?,
            }
        }
    }

    /// Prompt and read one trimmed line; `None` at end of input.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        if self.color {
            write!(self.output, "{}", prompt.yellow().bold())?;
        } else {
            write!(self.output, "{prompt}")?;
        }
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn ask_yes_no(&mut self, prompt: &str) -> Result<bool> {
        Ok(self
            .ask(prompt)?
            .is_some_and(|answer| answer.eq_ignore_ascii_case("y")))
    }

    fn say(&mut self, msg: &str) -> Result<()> {
        writeln!(self.output, "{msg}")?;
        Ok(())
    }

    fn heading(&mut self, msg: &str) -> Result<()> {
        if self.color {
            writeln!(self.output, "{}", msg.cyan().bold())?;
        } else {
            writeln!(self.output, "{msg}")?;
        }
        Ok(())
    }

    fn success(&mut self, msg: &str) -> Result<()> {
        if self.color {
            writeln!(self.output, "{}", msg.green().bold())?;
        } else {
            writeln!(self.output, "{msg}")?;
        }
        Ok(())
    }

    fn error(&mut self, msg: &str) -> Result<()> {
        if self.color {
            writeln!(self.output, "{}", msg.red().bold())?;
        } else {
            writeln!(self.output, "{msg}")?;
        }
        Ok(())
    }
}

fn first_lines(s: &str, n: usize) -> String {
    let lines: Vec<&str> = s.lines().collect();
    if lines.len() > n {
        format!("{}\n...", lines[..n].join("\n"))
    } else {
        s.to_string()
    }
}
