//! Keyboard input for the scene window.
//!
//! Key presses are turned into [`Command`]s. A held key fires once: the OS
//! auto-repeat is ignored, and the key must be released before it fires
//! again.
//!
//! | Key            | Command                         |
//! |----------------|---------------------------------|
//! | Up arrow       | spawn a batch of particles      |
//! | Down arrow     | clear all particles             |
//! | G              | Gouraud shading                 |
//! | P              | Phong shading                   |
//! | Escape         | quit                            |
//! | 1 to 9         | set the spawn batch size        |

use std::collections::HashSet;

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::frame::ControlRequest;
use crate::shader::ShadingModel;

/// What a key press asks the application to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Scene(ControlRequest),
    Quit,
}

/// Keys bound to each command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBindings {
    pub spawn: KeyCode,
    pub clear: KeyCode,
    pub gouraud: KeyCode,
    pub phong: KeyCode,
    pub quit: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            spawn: KeyCode::ArrowUp,
            clear: KeyCode::ArrowDown,
            gouraud: KeyCode::KeyG,
            phong: KeyCode::KeyP,
            quit: KeyCode::Escape,
        }
    }
}

impl KeyBindings {
    pub fn command(&self, key: KeyCode) -> Option<Command> {
        let command = if key == self.spawn {
            Command::Scene(ControlRequest::Spawn)
        } else if key == self.clear {
            Command::Scene(ControlRequest::Clear)
        } else if key == self.gouraud {
            Command::Scene(ControlRequest::SetShading(ShadingModel::Gouraud))
        } else if key == self.phong {
            Command::Scene(ControlRequest::SetShading(ShadingModel::Phong))
        } else if key == self.quit {
            Command::Quit
        } else {
            return digit(key).map(|n| Command::Scene(ControlRequest::SetSpawnBatch(n)));
        };
        Some(command)
    }
}

fn digit(key: KeyCode) -> Option<usize> {
    let n = match key {
        KeyCode::Digit1 | KeyCode::Numpad1 => 1,
        KeyCode::Digit2 | KeyCode::Numpad2 => 2,
        KeyCode::Digit3 | KeyCode::Numpad3 => 3,
        KeyCode::Digit4 | KeyCode::Numpad4 => 4,
        KeyCode::Digit5 | KeyCode::Numpad5 => 5,
        KeyCode::Digit6 | KeyCode::Numpad6 => 6,
        KeyCode::Digit7 | KeyCode::Numpad7 => 7,
        KeyCode::Digit8 | KeyCode::Numpad8 => 8,
        KeyCode::Digit9 | KeyCode::Numpad9 => 9,
        _ => return None,
    };
    Some(n)
}

/// Tracks held keys and maps fresh presses to commands.
#[derive(Debug, Default)]
pub struct Input {
    bindings: KeyBindings,
    held: HashSet<KeyCode>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bindings(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            held: HashSet::new(),
        }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn key_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) -> Option<Command> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => match event.physical_key {
                PhysicalKey::Code(key) => self.key(key, event.state),
                PhysicalKey::Unidentified(_) => None,
            },
            WindowEvent::Focused(false) => {
                self.held.clear();
                None
            }
            _ => None,
        }
    }

    /// Record a key transition, returning the command of a fresh press.
    pub fn key(&mut self, key: KeyCode, state: ElementState) -> Option<Command> {
        match state {
            ElementState::Pressed => {
                // Auto-repeat arrives as more presses while held
                if !self.held.insert(key) {
                    return None;
                }
                let command = self.bindings.command(key);
                if let Some(command) = command {
                    log::debug!("{:?} -> {:?}", key, command);
                }
                command
            }
            ElementState::Released => {
                self.held.remove(&key);
                None
            }
        }
    }
}
