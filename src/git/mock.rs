use crate::git::{CommandError, CommandRunner};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

/// What a scripted command answers with
pub type Reply = Result<String, CommandError>;

struct Rule {
    needle: String,
    queued: VecDeque<Reply>,
    fallback: Reply,
}

#[derive(Default)]
struct ScriptState {
    rules: Vec<Rule>,
    history: Vec<String>,
    env: HashMap<String, String>,
}

/// Scripted runner for testing without a git binary or a remote
///
/// Replies are chosen by the most recently registered rule whose needle is a
/// substring of the command. Queued replies are consumed first, then the
/// rule's fallback repeats. Unmatched commands succeed with empty output.
/// Clones share the same script and history.
#[derive(Clone, Default)]
pub struct ScriptedRunner {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedRunner {
    /// Create a runner where every command succeeds silently
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Always answer commands containing `needle` with `output`
    pub fn succeed(&self, needle: &str, output: &str) -> &Self {
        self.script(needle, Vec::new(), Ok(output.to_string()))
    }

    /// Always fail commands containing `needle`
    pub fn fail(&self, needle: &str, message: &str, output: &str) -> &Self {
        self.script(
            needle,
            Vec::new(),
            Err(CommandError::new(needle, message, output)),
        )
    }

    /// Answer commands containing `needle` with `replies` in order, then `fallback`
    pub fn script(&self, needle: &str, replies: Vec<Reply>, fallback: Reply) -> &Self {
        self.lock().rules.push(Rule {
            needle: needle.to_string(),
            queued: replies.into(),
            fallback,
        });
        self
    }

    /// Every command run so far, in order
    pub fn commands(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    /// Number of commands run so far that contain `needle`
    pub fn count(&self, needle: &str) -> usize {
        self.lock()
            .history
            .iter()
            .filter(|command| command.contains(needle))
            .count()
    }

    /// Environment override recorded through [CommandRunner::set_env]
    pub fn env_var(&self, key: &str) -> Option<String> {
        self.lock().env.get(key).cloned()
    }
}

impl CommandRunner for ScriptedRunner {
    fn set_env(&mut self, key: &str, value: &str) {
        self.lock().env.insert(key.to_string(), value.to_string());
    }

    fn run(&self, command: &str) -> Result<String, CommandError> {
        let mut state = self.lock();
        state.history.push(command.to_string());

        let reply = match state
            .rules
            .iter_mut()
            .rev()
            .find(|rule| command.contains(&rule.needle))
        {
            Some(rule) => rule.queued.pop_front().unwrap_or_else(|| rule.fallback.clone()),
            None => Ok(String::new()),
        };

        reply.map_err(|mut err| {
            err.command = command.to_string();
            err
        })
    }
}
