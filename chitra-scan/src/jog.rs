//! Manual jog front end
//!
//! Maps the four direction buttons and the center button of the operator
//! console onto the controller. Buttons arrive as text lines so the same
//! loop works on a terminal and on a serial console.
//!
//! | Input | Action |
//! |-------|--------|
//! | `left` / `l` | X + one step |
//! | `right` / `r` | X - one step |
//! | `up` / `u` | Y + one step |
//! | `down` / `d` | Y - one step |
//! | `center` / `c` | Home, then scan |
//! | `pos` / `p` | Print position |
//! | `quit` / `q` | Exit |

use crate::core::types::{Position, ScanOutcome};
use crate::error::Result;
use crate::scan::ScanController;
use std::str::FromStr;

/// One console button press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JogCommand {
    Left,
    Right,
    Up,
    Down,
    Center,
    Position,
    Quit,
}

impl FromStr for JogCommand {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(JogCommand::Left),
            "right" | "r" => Ok(JogCommand::Right),
            "up" | "u" => Ok(JogCommand::Up),
            "down" | "d" => Ok(JogCommand::Down),
            "center" | "c" => Ok(JogCommand::Center),
            "pos" | "p" => Ok(JogCommand::Position),
            "quit" | "q" | "exit" => Ok(JogCommand::Quit),
            other => Err(format!("unknown command '{}'", other)),
        }
    }
}

/// What a command did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JogEvent {
    Moved(Position),
    Scanned(ScanOutcome),
    Position(Position),
    Quit,
}

/// Apply one command to the controller
pub fn apply(controller: &mut ScanController, command: JogCommand) -> Result<JogEvent> {
    let step = controller.jog_step();
    let event = match command {
        JogCommand::Left => JogEvent::Moved(controller.move_x(step)?),
        JogCommand::Right => JogEvent::Moved(controller.move_x(-step)?),
        JogCommand::Up => JogEvent::Moved(controller.move_y(step)?),
        JogCommand::Down => JogEvent::Moved(controller.move_y(-step)?),
        JogCommand::Center => {
            controller.home()?;
            JogEvent::Scanned(controller.scan()?)
        }
        JogCommand::Position => JogEvent::Position(controller.get_position()),
        JogCommand::Quit => JogEvent::Quit,
    };
    Ok(event)
}
