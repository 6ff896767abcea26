//! Interactive control surface for a reading session.
//!
//! Stands in for the excluded renderer: commands come from stdin, route
//! through the session's transition methods, and "rendering" a side means
//! printing the description of its current unit. Everything with actual
//! alignment logic lives in `session`, `mapper` and `classifier`; this
//! module is wiring.

use crate::config::AppConfig;
use crate::document::{Document, Side};
use crate::session::{Direction, Effect, NavOutcome, Session};
use crate::store;
use crate::sync::{self, SyncPoint};
use anyhow::{Result, bail};
use std::io::{self, BufRead};
use tracing::info;

pub struct App {
    pub session: Session,
    pub original: Document,
    pub translation: Document,
    pub config: AppConfig,
}

impl App {
    pub fn run(mut self) -> Result<()> {
        let effects = self.session.begin_reading()?;
        self.apply_effects(&effects);
        println!("{}", self.session.mapping_summary());
        print_help();

        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if matches!(line, "q" | "quit") {
                info!("Closing session");
                break;
            }
            if let Err(err) = self.handle_command(line) {
                println!("{err}");
            }
        }
        Ok(())
    }

    fn handle_command(&mut self, line: &str) -> Result<()> {
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default();
        match command {
            "n" | "next" => self.advance(Direction::Forward),
            "p" | "prev" => self.advance(Direction::Backward),
            "g" | "go" => {
                let target = parse_location_arg(words.next())?;
                let effects = self.session.jump_to(target)?;
                self.apply_effects(&effects);
                Ok(())
            }
            "sync" => {
                let original = parse_location_arg(words.next())?;
                let translation = parse_location_arg(words.next())?;
                let effects = self.session.add_sync_point(SyncPoint {
                    original,
                    translation,
                })?;
                self.apply_effects(&effects);
                println!("{}", self.session.mapping_summary());
                Ok(())
            }
            "unsync" => {
                let idx: usize = match words.next().and_then(|w| w.parse().ok()) {
                    Some(n) if n >= 1 => n,
                    _ => bail!("Usage: unsync <point-number>"),
                };
                let effects = self.session.remove_sync_point(idx - 1)?;
                self.apply_effects(&effects);
                println!("{}", self.session.mapping_summary());
                Ok(())
            }
            "points" => {
                self.print_points();
                Ok(())
            }
            "+" | "-" => {
                let delta = if command == "+" { 1 } else { -1 };
                let effects = self.session.nudge_offset(delta)?;
                self.apply_effects(&effects);
                println!("{}", self.session.mapping_summary());
                Ok(())
            }
            "status" => {
                println!("{}", self.session.position_info());
                println!("{}", self.session.mapping_summary());
                Ok(())
            }
            "h" | "help" => {
                print_help();
                Ok(())
            }
            _ => bail!("Unknown command {command:?}; try 'help'"),
        }
    }

    fn advance(&mut self, direction: Direction) -> Result<()> {
        match self.session.advance(direction)? {
            NavOutcome::Moved(effects) => self.apply_effects(&effects),
            NavOutcome::AtBoundary => match direction {
                Direction::Forward => println!("Already at the end"),
                Direction::Backward => println!("Already at the beginning"),
            },
        }
        Ok(())
    }

    fn apply_effects(&mut self, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::Render { side, position } => self.render(*side, *position),
                Effect::SaveSyncPoints => store::save_sync_points(
                    &self.config.cache_dir,
                    &self.session.original().name,
                    &self.session.translation().name,
                    self.session.sync_points(),
                ),
            }
        }
    }

    fn render(&self, side: Side, position: u32) {
        let document = match side {
            Side::Original => &self.original,
            Side::Translation => &self.translation,
        };
        println!("[{side}] {}", document.unit_description(position));
    }

    fn print_points(&self) {
        let points = self.session.sync_points();
        if points.is_empty() {
            println!("{}", self.session.mapping_summary());
            return;
        }
        for (idx, point) in points.iter().enumerate() {
            println!(
                "{}. {} <-> {}",
                idx + 1,
                self.session.original().kind.format_location(point.original),
                self.session
                    .translation()
                    .kind
                    .format_location(point.translation),
            );
        }
    }
}

fn parse_location_arg(word: Option<&str>) -> Result<u32> {
    match word.and_then(sync::parse_location) {
        Some(position) => Ok(position),
        None => bail!("Invalid location; use a number like 1, 5 or 23"),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  n / p        next / previous unit");
    println!("  g <pos>      jump to a position on the original side");
    println!("  sync <a> <b> anchor original position a to translation position b");
    println!("  unsync <i>   remove sync point i (see 'points')");
    println!("  points       list sync points");
    println!("  + / -        adjust the chapter offset (offset mode)");
    println!("  status       show positions and mapping");
    println!("  q            quit");
}
