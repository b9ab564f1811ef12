//! Command layer for front ends. Each function maps onto one core operation
//! and turns its error into a display string.

use std::str::FromStr;

use crate::{
    error::AlarmError,
    models::{Alarm, Difficulty},
    session::{SessionSnapshot, SubmitOutcome},
    AppState,
};

pub async fn set_alarm(state: &AppState, time: &str, difficulty: &str) -> Result<Alarm, String> {
    let (hour, minute) = parse_clock_time(time).map_err(|e| e.to_string())?;
    let difficulty: Difficulty = difficulty.parse().map_err(|e: AlarmError| e.to_string())?;
    state
        .scheduler
        .schedule(hour, minute, difficulty)
        .await
        .map_err(|e| e.to_string())
}

pub async fn list_alarms(state: &AppState) -> Vec<String> {
    state
        .scheduler
        .list()
        .await
        .iter()
        .map(Alarm::label)
        .collect()
}

/// `position` is 1-based, as shown by [`list_alarms`].
pub async fn delete_alarm(state: &AppState, position: usize) -> Result<Alarm, String> {
    let index = position
        .checked_sub(1)
        .ok_or_else(|| "alarm positions start at 1".to_string())?;
    state
        .scheduler
        .cancel_at(index)
        .await
        .map_err(|e| e.to_string())
}

pub async fn try_random_puzzle(state: &AppState) -> Result<SessionSnapshot, String> {
    state
        .puzzles
        .start_practice()
        .await
        .map_err(|e| e.to_string())
}

pub async fn submit_move(state: &AppState, text: &str) -> SubmitOutcome {
    state.puzzles.submit_move(text).await
}

pub async fn get_puzzle(state: &AppState) -> SessionSnapshot {
    state.puzzles.snapshot().await
}

/// Persists the volume and applies it to the running bell.
pub fn set_volume(state: &AppState, volume: u8) -> Result<(), String> {
    let volume = volume.min(100);
    state
        .settings
        .update_volume(volume)
        .map_err(|e| format!("{e:#}"))?;
    state.bell.set_volume(volume);
    Ok(())
}

/// `HH:MM` with a 24-hour clock.
pub fn parse_clock_time(text: &str) -> Result<(u32, u32), AlarmError> {
    let invalid = || {
        AlarmError::InvalidInput(format!(
            "'{text}' is not a time; use HH:MM, e.g. 07:30"
        ))
    };
    let (hour, minute) = text.trim().split_once(':').ok_or_else(invalid)?;
    let hour: u32 = hour.trim().parse().map_err(|_| invalid())?;
    let minute: u32 = minute.trim().parse().map_err(|_| invalid())?;
    if hour > 23 || minute > 59 {
        return Err(AlarmError::InvalidTime { hour, minute });
    }
    Ok((hour, minute))
}

/// One line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    SetAlarm { time: String, difficulty: String },
    ListAlarms,
    DeleteAlarm(usize),
    Practice,
    Move(String),
    Board,
    Volume(u8),
    Help,
    Quit,
}

impl FromStr for ConsoleCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let verb = parts.next().ok_or_else(|| "empty command".to_string())?;
        let rest: Vec<&str> = parts.collect();

        match (verb.to_ascii_lowercase().as_str(), rest.as_slice()) {
            ("alarm" | "set", [time]) => Ok(ConsoleCommand::SetAlarm {
                time: time.to_string(),
                difficulty: Difficulty::default().to_string(),
            }),
            ("alarm" | "set", [time, difficulty]) => Ok(ConsoleCommand::SetAlarm {
                time: time.to_string(),
                difficulty: difficulty.to_string(),
            }),
            ("list" | "ls", []) => Ok(ConsoleCommand::ListAlarms),
            ("delete" | "rm", [position]) => position
                .parse()
                .map(ConsoleCommand::DeleteAlarm)
                .map_err(|_| format!("'{position}' is not an alarm position")),
            ("practice" | "puzzle", []) => Ok(ConsoleCommand::Practice),
            ("move" | "m", [text]) => Ok(ConsoleCommand::Move(text.to_string())),
            ("board", []) => Ok(ConsoleCommand::Board),
            ("volume", [level]) => level
                .parse()
                .map(ConsoleCommand::Volume)
                .map_err(|_| format!("'{level}' is not a volume between 0 and 100")),
            ("help" | "?", []) => Ok(ConsoleCommand::Help),
            ("quit" | "exit", []) => Ok(ConsoleCommand::Quit),
            _ => Err(format!("unrecognised command '{}'; try 'help'", line.trim())),
        }
    }
}

pub const HELP: &str = "\
alarm HH:MM [easy|medium|hard]  set an alarm
list                            show pending alarms
delete N                        delete alarm N from the list
practice                        load a random puzzle
move TEXT                       submit a move (e2e4, e2xe4 or Nf3)
board                           show the current puzzle
volume 0-100                    set the alarm volume
quit                            exit";

/// Runs one console command and renders the reply.
pub async fn execute(state: &AppState, command: ConsoleCommand) -> Result<String, String> {
    match command {
        ConsoleCommand::SetAlarm { time, difficulty } => {
            let alarm = set_alarm(state, &time, &difficulty).await?;
            Ok(format!("Alarm set for {}", alarm.fire_at.format("%H:%M")))
        }
        ConsoleCommand::ListAlarms => {
            let labels = list_alarms(state).await;
            if labels.is_empty() {
                return Ok("No alarms set".to_string());
            }
            Ok(labels
                .iter()
                .enumerate()
                .map(|(i, label)| format!("{}. {label}", i + 1))
                .collect::<Vec<_>>()
                .join("\n"))
        }
        ConsoleCommand::DeleteAlarm(position) => {
            let alarm = delete_alarm(state, position).await?;
            Ok(format!("Deleted alarm {}", alarm.label()))
        }
        ConsoleCommand::Practice => {
            let snapshot = try_random_puzzle(state).await?;
            Ok(render_snapshot(&snapshot))
        }
        ConsoleCommand::Move(text) => {
            let outcome = submit_move(state, &text).await;
            let reply = outcome.message().to_string();
            if outcome.is_accepted() {
                Ok(reply)
            } else {
                Err(reply)
            }
        }
        ConsoleCommand::Board => Ok(render_snapshot(&get_puzzle(state).await)),
        ConsoleCommand::Volume(level) => {
            set_volume(state, level)?;
            Ok(format!("Volume set to {}", level.min(100)))
        }
        ConsoleCommand::Help => Ok(HELP.to_string()),
        ConsoleCommand::Quit => Ok("Bye".to_string()),
    }
}

pub fn render_snapshot(snapshot: &SessionSnapshot) -> String {
    match (&snapshot.description, &snapshot.board) {
        (Some(description), Some(board)) => format!("{description}\n{board}"),
        _ => "No active puzzle".to_string(),
    }
}
