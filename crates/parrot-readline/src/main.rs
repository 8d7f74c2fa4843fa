use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::mpsc;

use parrot_core::app_state::{AnalysisTab, PanelShell};
use parrot_core::config::RootConfig;
use parrot_core::context::ContextCard;
use parrot_core::secret::SecretStorage;
use parrot_core::session::{MessageId, MessageRole, NoticeKind, SessionEvent};
use parrot_core::thought::{sample_steps, ThoughtStep};
use parrot_interaction::{
    platform_recognizer, CardElement, CardGenerator, CaptureState, ConversationController,
    RecognizerConfig, ScriptedRecognizer, SpeechRecognizer, VoiceCapture,
};

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: vec![
                "/settings".to_string(),
                "/analysis".to_string(),
                "/context".to_string(),
                "/theme".to_string(),
                "/voice".to_string(),
                "/generate".to_string(),
                "/good".to_string(),
                "/bad".to_string(),
            ],
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// Live side-panel snapshots kept current by the event printer task.
#[derive(Default)]
struct PanelView {
    thoughts: Vec<ThoughtStep>,
    card: Option<ContextCard>,
    voice_hypothesis: Option<String>,
}

fn print_thought_steps(steps: &[ThoughtStep]) {
    for (index, step) in steps.iter().enumerate() {
        println!("  {}", format!("{}. {}", index + 1, step.step).bold());
        println!("     {}", step.thought);
        if let Some(action) = &step.action {
            println!("     {}", format!("Action: {action}").bright_black());
        }
    }
}

fn print_context_card(card: Option<&ContextCard>) {
    match card {
        Some(card) => {
            println!("{}", format!("=== {} ===", card.title).bright_magenta());
            println!("{}", card.description);
            if !card.links.is_empty() {
                println!("{}", "Related Links:".bold());
                for link in &card.links {
                    println!("  {} <{}>", link.text, link.url.bright_cyan());
                }
            }
        }
        None => println!("{}", "No contextual info for the current message.".bright_black()),
    }
}

fn print_settings_panel(shell: &PanelShell) {
    println!("{}", "=== Settings ===".bright_magenta());
    println!("  Theme:                 {}", if shell.dark_mode { "dark" } else { "light" });
    let template = if shell.settings.prompt_template.is_empty() {
        "(default)".to_string()
    } else {
        shell.settings.prompt_template.clone()
    };
    println!("  Prompt Template:       {template}");
    println!("  Temperature:           {}", shell.settings.temperature);
    println!("  Use Semantic Ranker:   {}", shell.settings.use_semantic_ranker);
    println!("  Use Semantic Captions: {}", shell.settings.use_semantic_captions);
}

fn print_analysis_panel(tab: AnalysisTab) {
    println!("{}", "=== Analysis ===".bright_magenta());
    println!(
        "{}",
        "Tabs: thought | content | citation (select with /analysis <tab>)".bright_black()
    );
    match tab {
        AnalysisTab::Thought => {
            println!("{}", "Thought Process".bold());
            // The analysis panel has always shown this canned example rather
            // than the live snapshot (/context and the live thought feed
            // carry the real state).
            print_thought_steps(&sample_steps());
        }
        AnalysisTab::Content => {
            println!("{}", "Supporting Content".bold());
            println!("This is where supporting content would be displayed.");
        }
        AnalysisTab::Citation => {
            println!("{}", "Citation".bold());
            println!("This is where citation information would be displayed.");
        }
    }
}

fn print_generated_card(card: &parrot_interaction::CardSpec) {
    println!("{}", format!("=== {} ===", card.title).bright_magenta());
    for element in &card.elements {
        match element {
            CardElement::Heading { text } => println!("{}", text.bold()),
            CardElement::Paragraph { text } => println!("{text}"),
            CardElement::Link { text, url } => {
                println!("  {} <{}>", text, url.bright_cyan())
            }
            CardElement::Divider => println!("{}", "---".bright_black()),
        }
    }
}

fn parse_message_id(argument: Option<&str>) -> Option<MessageId> {
    argument?.parse::<u64>().ok().map(MessageId)
}

/// The main entry point for the Parrot readline chat application.
///
/// Sets up a rustyline-based REPL that:
/// 1. Initializes the conversation controller and its event channel
/// 2. Provides command completion for the slash commands
/// 3. Prints transcript messages, notices, and side-panel updates with color
/// 4. Offers voice dictation (simulated unless a platform recognizer exists)
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // ===== Backend Initialization =====
    let config = RootConfig::load_or_default();
    let (event_tx, mut event_rx) = mpsc::channel::<SessionEvent>(64);
    let controller = Arc::new(ConversationController::new(event_tx.clone(), &config.chat));
    tracing::info!(session = %controller.session_id(), "session started");

    let mut shell = PanelShell {
        settings: config.settings.clone(),
        ..PanelShell::default()
    };

    // Card generation is disabled unless a completion API key is configured.
    let generator = SecretStorage::new()
        .and_then(|storage| CardGenerator::try_from_secrets(&storage))
        .ok();

    // ===== Voice Capture Setup =====
    let panels = Arc::new(Mutex::new(PanelView::default()));
    let recognizer: Option<Arc<dyn SpeechRecognizer>> = if config.chat.simulate_voice {
        Some(Arc::new(ScriptedRecognizer::new(vec![
            "what".to_string(),
            "is".to_string(),
            "typescript".to_string(),
        ])))
    } else {
        platform_recognizer()
    };
    let voice_panels = Arc::clone(&panels);
    let voice = VoiceCapture::new(
        recognizer,
        RecognizerConfig::new(config.chat.language.clone()),
        event_tx.clone(),
        move |hypothesis| {
            println!("{}", format!("voice> {hypothesis}").bright_black());
            voice_panels.lock().unwrap().voice_hypothesis = Some(hypothesis);
        },
    );

    // ===== Event Printer Task =====
    let printer_panels = Arc::clone(&panels);
    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                SessionEvent::MessageAppended { message } => match message.role {
                    MessageRole::User => {
                        println!(
                            "{}",
                            format!("[{}] you: {}", message.id, message.content).green()
                        );
                    }
                    MessageRole::Assistant => {
                        println!(
                            "{}",
                            format!("[{}] ai:  {}", message.id, message.content).bright_blue()
                        );
                    }
                },
                SessionEvent::ThoughtsUpdated { steps } => {
                    printer_panels.lock().unwrap().thoughts = steps;
                }
                SessionEvent::ContextUpdated { card } => {
                    if let Some(card) = &card {
                        println!(
                            "{}",
                            format!("(contextual info: {} - try /context)", card.title)
                                .bright_black()
                        );
                    }
                    printer_panels.lock().unwrap().card = card;
                }
                SessionEvent::Notice { notice } => {
                    let line = match notice.kind {
                        NoticeKind::Info => notice.text.bright_yellow(),
                        NoticeKind::Error => notice.text.red(),
                        NoticeKind::Ack => notice.text.bright_green(),
                    };
                    println!("{line}");
                }
            }
        }
    });

    // ===== REPL Setup =====
    let helper = CliHelper::new();
    let mut rl: Editor<CliHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(helper));

    println!("{}", "=== Parrot ===".bright_magenta().bold());
    println!(
        "{}",
        "Type a message and it will be echoed back. Slash commands: /settings, /analysis, \
         /context, /theme, /voice, /generate, /good <id>, /bad <id>. 'quit' to exit."
            .bright_black()
    );
    println!();

    // ===== Main REPL Loop =====
    loop {
        let readline = rl.readline(">> ");

        match readline {
            Ok(line) => {
                let trimmed = line.trim();

                if trimmed == "quit" || trimmed == "exit" {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }

                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&line);

                let mut parts = trimmed.splitn(2, ' ');
                let command = parts.next().unwrap_or_default();
                let argument = parts.next().map(str::trim);

                match command {
                    "/settings" => {
                        shell.toggle_settings();
                        if shell.settings_open {
                            print_settings_panel(&shell);
                        } else {
                            println!("{}", "Settings panel closed.".bright_black());
                        }
                    }
                    "/theme" => {
                        let dark = shell.toggle_dark_mode();
                        println!(
                            "{}",
                            format!("Theme: {}", if dark { "dark" } else { "light" })
                                .bright_yellow()
                        );
                    }
                    "/analysis" => {
                        match argument {
                            Some(name) => match name.parse::<AnalysisTab>() {
                                Ok(tab) => shell.select_analysis_tab(tab),
                                Err(_) => {
                                    println!(
                                        "{}",
                                        "Unknown tab; use thought, content, or citation.".red()
                                    );
                                    continue;
                                }
                            },
                            None => {
                                shell.toggle_analysis();
                            }
                        }
                        if shell.analysis_open {
                            print_analysis_panel(shell.analysis_tab);
                        } else {
                            println!("{}", "Analysis panel closed.".bright_black());
                        }
                    }
                    "/context" => {
                        let view = panels.lock().unwrap();
                        print_context_card(view.card.as_ref());
                        if !view.thoughts.is_empty() {
                            println!("{}", "AI Thought Process".bold());
                            print_thought_steps(&view.thoughts);
                        }
                    }
                    "/voice" => {
                        if argument == Some("send") {
                            let hypothesis =
                                panels.lock().unwrap().voice_hypothesis.take();
                            match hypothesis {
                                Some(text) => {
                                    if let Err(err) = controller.submit(&text).await {
                                        eprintln!("{}", format!("Error: {err}").red());
                                    }
                                }
                                None => println!(
                                    "{}",
                                    "No dictated text to send yet.".bright_black()
                                ),
                            }
                            continue;
                        }
                        match voice.toggle() {
                            Ok(CaptureState::Listening) => println!(
                                "{}",
                                "Listening... (/voice to stop, /voice send to submit)"
                                    .bright_yellow()
                            ),
                            Ok(CaptureState::Idle) => {
                                println!("{}", "Stopped listening.".bright_yellow())
                            }
                            Err(err) => println!("{}", err.to_string().red()),
                        }
                    }
                    "/generate" => match (&generator, argument) {
                        (None, _) => println!(
                            "{}",
                            "Card generation is disabled (no completion API key configured)."
                                .bright_black()
                        ),
                        (Some(_), None) => {
                            println!("{}", "Usage: /generate <description>".bright_black())
                        }
                        (Some(generator), Some(description)) => {
                            match generator.generate(description).await {
                                Ok(card) => print_generated_card(&card),
                                Err(err) => println!("{}", err.to_string().red()),
                            }
                        }
                    },
                    "/good" | "/bad" => match parse_message_id(argument) {
                        Some(id) => {
                            let is_positive = command == "/good";
                            if !controller.record_feedback(id, is_positive).await {
                                println!(
                                    "{}",
                                    "Feedback was already recorded for that message."
                                        .bright_black()
                                );
                            }
                        }
                        None => println!("{}", format!("Usage: {command} <message id>").red()),
                    },
                    _ if command.starts_with('/') => {
                        println!("{}", "Unknown command".bright_black());
                    }
                    _ => {
                        if let Err(err) = controller.submit(trimmed).await {
                            eprintln!("{}", format!("Error: {err}").red());
                        }
                    }
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        }
    }

    // Cancel pending echo replies, then close the channel so the printer
    // drains and exits.
    controller.shutdown();
    drop(event_tx);
    drop(voice);
    drop(controller);

    let _ = printer.await;

    Ok(())
}
