//=========================================================================
// Director Commands
//=========================================================================
//
// Deferred scene-stack requests.
//
// Scenes and tasks cannot reach the director while they are being stepped,
// so they send commands instead. The host drains the queue after the
// scheduler advance and applies each command in FIFO order.
//
// Architecture:
//   Sender<DirectorCommand<S>> (cloned into scenes/tasks)
//        → CommandQueue::drain() → SceneDirector::apply()
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use log::warn;

//=== Internal Dependencies ===============================================

use super::SceneKey;

//=== DirectorCommand =====================================================

/// Scene stack operation requested from inside a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorCommand<S: SceneKey> {
    /// Destroys the active scene and constructs the given one on top.
    Push(S),

    /// Destroys the active scene and reconstructs the one beneath it.
    Pop,
}

//=== CommandQueue ========================================================

/// Unbounded command channel owned by the host context.
pub(crate) struct CommandQueue<S: SceneKey> {
    sender: Sender<DirectorCommand<S>>,
    receiver: Receiver<DirectorCommand<S>>,
}

impl<S: SceneKey> CommandQueue<S> {
    /// Upper bound of commands applied per frame; the rest wait a frame.
    pub(crate) const MAX_COMMANDS_PER_FRAME: usize = 32;

    pub(crate) fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    pub(crate) fn sender(&self) -> Sender<DirectorCommand<S>> {
        self.sender.clone()
    }

    /// Takes pending commands (bounded to prevent starvation).
    pub(crate) fn drain(&self) -> Vec<DirectorCommand<S>> {
        let mut commands = Vec::new();

        while commands.len() < Self::MAX_COMMANDS_PER_FRAME {
            match self.receiver.try_recv() {
                Ok(command) => commands.push(command),
                // The queue holds its own sender, so it never disconnects.
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        if commands.len() >= Self::MAX_COMMANDS_PER_FRAME {
            warn!(
                target: "scene",
                "Director command backlog: {} pending after draining {}",
                self.pending(),
                commands.len()
            );
        }

        commands
    }

    pub(crate) fn pending(&self) -> usize {
        self.receiver.len()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Key {
        A,
        B,
    }

    impl SceneKey for Key {}

    #[test]
    fn drain_handles_empty_queue() {
        let queue = CommandQueue::<Key>::new();
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn drain_preserves_send_order() {
        let queue = CommandQueue::new();
        let sender = queue.sender();

        sender.send(DirectorCommand::Push(Key::A)).unwrap();
        sender.send(DirectorCommand::Pop).unwrap();
        queue.sender().send(DirectorCommand::Push(Key::B)).unwrap();

        assert_eq!(
            queue.drain(),
            vec![
                DirectorCommand::Push(Key::A),
                DirectorCommand::Pop,
                DirectorCommand::Push(Key::B),
            ]
        );
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn drain_is_bounded_per_frame() {
        let queue = CommandQueue::<Key>::new();
        let sender = queue.sender();
        let total = CommandQueue::<Key>::MAX_COMMANDS_PER_FRAME + 5;

        for _ in 0..total {
            sender.send(DirectorCommand::Pop).unwrap();
        }

        assert_eq!(queue.drain().len(), CommandQueue::<Key>::MAX_COMMANDS_PER_FRAME);
        assert_eq!(queue.pending(), 5, "Backlog waits for the next frame");
        assert_eq!(queue.drain().len(), 5);
    }
}
