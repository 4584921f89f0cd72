use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use rustyline::Editor;
use tracing_subscriber::EnvFilter;

use rpl_core::{Interp, InterruptFlag, PromptHandle, Value};
use rpl_std::{startup, stdlib};

const PROMPT: &str = ">> ";
const SUMMARY_ITEMS: usize = 8;

/// Everything one command produced, posted back after it completes.
struct Report {
    output: String,
    error: Option<String>,
    summary: String,
    edit_line: Option<String>,
    edit_file: Option<PathBuf>,
}

enum Reply {
    Report(Report),
    Quit(String),
}

fn main() {
    init_tracing();

    // capacity-1 command channel: the UI feeds one line at a time, FIFO
    let (command_tx, command_rx) = mpsc::sync_channel::<String>(1);
    let (reply_tx, reply_rx) = mpsc::channel::<Reply>();
    let (boot_tx, boot_rx) = mpsc::channel::<(InterruptFlag, PromptHandle, String)>();

    // The interpreter is built and owned inside its worker thread; only
    // the interrupt flag and the prompt handle come back out.
    thread::spawn(move || worker(command_rx, reply_tx, boot_tx));

    let (interrupt, prompt, startup_output) = match boot_rx.recv() {
        Ok(boot) => boot,
        Err(_) => {
            eprintln!("interpreter failed to start");
            return;
        }
    };
    watch_sigint(interrupt);

    println!(
        "RPL v{} - a concatenative RPN interpreter.",
        env!("CARGO_PKG_VERSION")
    );
    println!("Type 'exit', 'quit' or 'bye' to leave.");
    println!();
    if !startup_output.is_empty() {
        print!("{}", startup_output);
    }

    let mut rl = Editor::<()>::new();
    let mut summary = String::from("[]");
    let mut prefill: Option<String> = None;

    loop {
        println!("{}", summary);
        let line = match prefill.take() {
            Some(text) => rl.readline_with_initial(PROMPT, (&text, "")),
            None => rl.readline(PROMPT),
        };
        let line = match line {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => continue,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }
        rl.add_history_entry(line.as_str());

        if command_tx.send(line).is_err() {
            break;
        }
        match wait_for_reply(&reply_rx, &prompt, &mut rl) {
            Some(Reply::Report(report)) => {
                print!("{}", report.output);
                if let Some(error_line) = report.error {
                    eprintln!("{}", error_line);
                }
                if let Some(path) = report.edit_file {
                    println!("-- edit {} with your editor, then 'import' it", path.display());
                }
                prefill = report.edit_line;
                summary = report.summary;
            }
            Some(Reply::Quit(output)) => {
                print!("{}", output);
                break;
            }
            None => break,
        }
    }
    println!("bye.");
}

/// Wait for the running command to finish. While it runs, a `prompt`
/// opcode may activate the rendezvous; then the next line read goes to
/// the interpreter's input channel instead of the command channel.
fn wait_for_reply(
    reply_rx: &Receiver<Reply>,
    prompt: &PromptHandle,
    rl: &mut Editor<()>,
) -> Option<Reply> {
    loop {
        match reply_rx.recv_timeout(Duration::from_millis(50)) {
            Ok(reply) => return Some(reply),
            Err(RecvTimeoutError::Timeout) => {
                if prompt.is_active() {
                    let label = prompt.take_message().unwrap_or_default();
                    match rl.readline(&format!("{} ", label)) {
                        Ok(answer) => {
                            prompt.respond(answer);
                        }
                        Err(_) => {
                            prompt.respond(String::new());
                        }
                    }
                }
            }
            Err(RecvTimeoutError::Disconnected) => return None,
        }
    }
}

fn worker(
    command_rx: Receiver<String>,
    reply_tx: mpsc::Sender<Reply>,
    boot_tx: mpsc::Sender<(InterruptFlag, PromptHandle, String)>,
) {
    let mut interp = Interp::new();
    if let Err(e) = stdlib(&mut interp) {
        tracing::warn!(error = %e, "failed to install the standard vocabulary");
    }
    startup(&mut interp);
    let startup_output = interp.take_output();

    if boot_tx
        .send((interp.interrupt_flag(), interp.prompt_handle(), startup_output))
        .is_err()
    {
        return;
    }

    for line in command_rx {
        let trimmed = line.trim();
        if matches!(trimmed, "exit" | "quit" | "bye") {
            if interp.boolean_flag("_exit_save") {
                if let Err(e) = interp.save_state("default.json") {
                    tracing::warn!(error = %e, "exit save failed");
                }
            }
            let _ = reply_tx.send(Reply::Quit(interp.take_output()));
            return;
        }

        let mut output = String::new();
        if interp.boolean_flag("_echo_mode") {
            output.push_str(PROMPT);
            output.push_str(&line);
            output.push('\n');
        }

        let error = match interp.eval(&line) {
            Ok(()) => None,
            Err(e) => Some(format!("error {}: {}", e.code(), e)),
        };
        output.push_str(&interp.take_output());
        if !output.is_empty() && !output.ends_with('\n') {
            output.push('\n');
        }

        let report = Report {
            output,
            error,
            summary: stack_summary(&interp),
            edit_line: interp.take_pending_edit(),
            edit_file: interp.take_pending_edit_file(),
        };
        if reply_tx.send(Reply::Report(report)).is_err() {
            return;
        }
    }
}

/// One-line view of the stack top, honoring `_stack_type`.
fn stack_summary(interp: &Interp) -> String {
    let show_types = interp.boolean_flag("_stack_type");
    let mut items: Vec<String> = interp
        .stack
        .iter()
        .rev()
        .take(SUMMARY_ITEMS)
        .map(|value| {
            if show_types {
                value.type_name().to_string()
            } else {
                clip(value)
            }
        })
        .collect();
    items.reverse();
    if interp.depth() > SUMMARY_ITEMS {
        format!("[.., {}]", items.join(", "))
    } else {
        format!("[{}]", items.join(", "))
    }
}

fn clip(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() > 24 {
        let short: String = text.chars().take(21).collect();
        format!("{}...", short)
    } else {
        text
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("RPL_LOG")
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

// Ctrl-C during a running command arrives as SIGINT (the terminal is in
// cooked mode between readline calls); translate it into the
// interpreter's interrupt flag instead of dying.
#[cfg(unix)]
fn watch_sigint(interrupt: InterruptFlag) {
    use std::sync::atomic::{AtomicBool, Ordering};

    static SIGINT_HIT: AtomicBool = AtomicBool::new(false);

    extern "C" fn on_sigint(_sig: libc::c_int) {
        SIGINT_HIT.store(true, Ordering::SeqCst);
    }

    unsafe {
        libc::signal(libc::SIGINT, on_sigint as libc::sighandler_t);
    }
    thread::spawn(move || loop {
        if SIGINT_HIT.swap(false, Ordering::SeqCst) {
            interrupt.raise();
        }
        thread::sleep(Duration::from_millis(25));
    });
}

#[cfg(not(unix))]
fn watch_sigint(_interrupt: InterruptFlag) {}
