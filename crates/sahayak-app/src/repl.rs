//! Interactive terminal chat.
//!
//! Reads lines from stdin, forwards them to a [`ChatController`] and prints
//! new log entries as they arrive. Lines starting with `/` are commands.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

use sahayak_chat::{ChatController, ChatEvent, Message, VoiceInput};
use sahayak_client::AnswerService;
use sahayak_core::{AuthGate, Author, Feature};

const HELP: &str = "\
Commands:
  /voice <transcript>       submit text as a voice transcript
  /clear                    start a new conversation
  /login <email> <password> sign in
  /logout                   sign out
  /whoami                   show the signed-in teacher
  /features                 list dashboard features
  /help                     show this help
  /quit                     exit";

/// One parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input<'a> {
    Empty,
    Message(&'a str),
    Voice(&'a str),
    Clear,
    Login { email: &'a str, password: &'a str },
    Logout,
    WhoAmI,
    Features,
    Help,
    Quit,
    Unknown(&'a str),
}

pub fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Message(line);
    };
    let (name, rest) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };
    match name {
        "voice" => Input::Voice(rest),
        "clear" | "new" => Input::Clear,
        "login" => {
            let mut parts = rest.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some(email), Some(password)) => Input::Login { email, password },
                _ => Input::Unknown(line),
            }
        }
        "logout" => Input::Logout,
        "whoami" => Input::WhoAmI,
        "features" => Input::Features,
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        _ => Input::Unknown(line),
    }
}

/// Render one log entry for the terminal.
pub fn render_message(message: &Message) -> String {
    match message.author {
        Author::User => format!("you> {}", message.text),
        Author::Assistant => {
            let avatar = message.avatar.as_deref().unwrap_or("sahayak");
            format!("{avatar} {}", message.text)
        }
    }
}

/// Tracks how much of the log has already been printed.
#[derive(Debug, Default)]
struct Printer {
    generation: u64,
    printed: usize,
}

impl Printer {
    fn flush(&mut self, messages: &[Message], generation: u64) {
        if generation != self.generation {
            self.generation = generation;
            self.printed = 0;
        }
        for message in messages.iter().skip(self.printed) {
            // The user's own line is already on screen.
            if message.author == Author::Assistant {
                println!("{}", render_message(message));
            }
        }
        self.printed = messages.len();
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

/// Role and language the chat falls back to when nobody is signed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatDefaults {
    pub role: String,
    pub language: String,
    /// Set when the language came from the command line; profiles then leave it alone.
    pub language_pinned: bool,
}

impl ChatDefaults {
    /// Copy the signed-in identity's role and profile language into the session.
    pub fn apply<S: AnswerService + 'static>(
        &self,
        controller: &ChatController<S>,
        auth: &dyn AuthGate,
    ) {
        let role = auth
            .current()
            .identity()
            .map(|identity| identity.role.clone())
            .unwrap_or_else(|| self.role.clone());
        controller.set_user_role(&role);

        if !self.language_pinned {
            let language = auth
                .profile()
                .filter(|profile| profile.language.is_some())
                .map(|profile| profile.language().to_string())
                .unwrap_or_else(|| self.language.clone());
            controller.set_language(&language);
        }
    }
}

/// Log chat events until the session goes away.
async fn log_events(mut events: broadcast::Receiver<ChatEvent>) {
    loop {
        match events.recv().await {
            Ok(ChatEvent::RequestFailed {
                generation, kind, ..
            }) => {
                tracing::debug!(generation, kind = %kind, "Answer request failed");
            }
            Ok(event) => tracing::trace!(event = ?event, "Chat event"),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Chat event listener lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Run the chat loop until `/quit` or end of input.
///
/// When `require_sign_in` is set, questions are refused until the auth gate
/// reports a signed-in identity. Signing in or out re-applies `defaults`.
pub async fn run<S: AnswerService + 'static>(
    controller: ChatController<S>,
    auth: Arc<dyn AuthGate>,
    defaults: ChatDefaults,
    require_sign_in: bool,
) -> std::io::Result<()> {
    let events = tokio::spawn(log_events(controller.subscribe()));
    defaults.apply(&controller, auth.as_ref());
    let mut voice = VoiceInput::default();
    let mut printer = Printer::default();

    let snapshot = controller.snapshot();
    printer.flush(&snapshot.messages, snapshot.generation);
    if let Some(identity) = auth.current().identity() {
        println!("Signed in as {}.", identity.greeting_name());
    } else if require_sign_in {
        println!("Sign in with /login <email> <password> to start asking questions.");
    }
    println!("Type /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();
    while let Some(line) = lines.next_line().await? {
        let handle = match parse_input(&line) {
            Input::Empty => None,
            Input::Quit => break,
            Input::Help => {
                println!("{HELP}");
                None
            }
            Input::Features => {
                for route in Feature::routes() {
                    println!("  {:<20} {:<14} {}", route.tag, route.path, route.title);
                }
                None
            }
            Input::Clear => {
                controller.clear();
                voice.cancel();
                None
            }
            Input::Login { email, password } => {
                match auth.sign_in(email, password) {
                    Ok(identity) => {
                        defaults.apply(&controller, auth.as_ref());
                        println!("Welcome, {}.", identity.greeting_name());
                    }
                    Err(e) => println!("Sign-in failed: {e}"),
                }
                None
            }
            Input::Logout => {
                auth.sign_out();
                defaults.apply(&controller, auth.as_ref());
                println!("Signed out.");
                None
            }
            Input::WhoAmI => {
                match auth.current().identity() {
                    Some(identity) => println!("{} ({})", identity.email, identity.role),
                    None => println!("Not signed in."),
                }
                None
            }
            Input::Unknown(text) => {
                println!("Unknown command: {text}. Type /help for commands.");
                None
            }
            Input::Message(_) | Input::Voice(_)
                if require_sign_in && !auth.current().is_authenticated() =>
            {
                println!("Please /login first.");
                None
            }
            Input::Message(text) => controller.send_user_message(text),
            Input::Voice(transcript) => {
                let accepted = voice.start().and_then(|()| voice.finish(transcript));
                match accepted {
                    Ok(text) => controller.submit_voice_transcript(&text),
                    Err(e) => {
                        println!("Voice input: {e}");
                        None
                    }
                }
            }
        };

        if let Some(handle) = handle {
            if controller.is_pending() {
                println!("Sahayak is thinking...");
            }
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Answer task failed");
            }
        }

        let snapshot = controller.snapshot();
        printer.flush(&snapshot.messages, snapshot.generation);
        prompt();
    }

    drop(controller);
    let _ = events.await;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
